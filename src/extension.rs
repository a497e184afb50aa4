//! Lossless capture of element subtrees the ACL grammar does not recognize.
//!
//! CMIS repositories are free to embed vendor extensions anywhere inside an
//! ACL document. Anything unrecognized is buffered verbatim as a small tree
//! so it survives a parse/serialize round trip.

use serde::{Deserialize, Serialize};

use crate::delegate::{Control, ElementDelegate, Outcome};
use crate::error::AclError;
use crate::events::{Attribute, QName, XmlEvent};

/// One captured element: its name, attributes, accumulated character data
/// and nested children, in document order.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ExtensionElement {
    pub name: QName,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<Attribute>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ExtensionElement>,
}

impl ExtensionElement {
    pub fn named(name: impl Into<String>) -> Self {
        ExtensionElement {
            name: QName::new(name),
            attributes: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }
}

/// Buffers one unrecognized subtree, event by event.
///
/// The capture is fed every event from the opening tag of the unrecognized
/// element onwards. Elements with the same name may nest arbitrarily; the
/// build stack tracks depth, so the capture knows exactly which closing tag
/// ends it. It runs in two harnesses: pushed onto the delegate stack as a
/// delegate in its own right, or composed inline by a parser that cannot
/// give up its place on the stack.
#[derive(Debug, Default)]
pub struct ExtensionCapture {
    open: Vec<ExtensionElement>,
}

impl ExtensionCapture {
    pub fn new() -> Self {
        ExtensionCapture { open: Vec::new() }
    }

    /// True from the first fed element-open until the subtree completes.
    pub fn is_active(&self) -> bool {
        !self.open.is_empty()
    }

    /// Feeds one event. Returns the completed subtree when the originally
    /// captured element closes; `None` while the capture is still open.
    pub fn feed(&mut self, event: &XmlEvent) -> Option<ExtensionElement> {
        match event {
            XmlEvent::StartElement { name, attributes } => {
                self.open.push(ExtensionElement {
                    name: name.clone(),
                    attributes: attributes.clone(),
                    text: None,
                    children: Vec::new(),
                });
                None
            }
            XmlEvent::Text(content) => {
                if let Some(current) = self.open.last_mut() {
                    match &mut current.text {
                        Some(text) => text.push_str(content),
                        None => current.text = Some(content.clone()),
                    }
                }
                None
            }
            XmlEvent::EndElement { .. } => {
                let closed = self.open.pop()?;
                match self.open.last_mut() {
                    Some(parent) => {
                        parent.children.push(closed);
                        None
                    }
                    None => Some(closed),
                }
            }
        }
    }
}

impl ElementDelegate for ExtensionCapture {
    fn handle_event(&mut self, event: &XmlEvent) -> Result<Control, AclError> {
        Ok(match self.feed(event) {
            Some(subtree) => Control::Complete(Outcome::Extension(subtree)),
            None => Control::Continue,
        })
    }

    fn child_completed(&mut self, _outcome: Outcome) -> Result<(), AclError> {
        Err(AclError::State(
            "extension capture never delegates to a child".to_string(),
        ))
    }
}
