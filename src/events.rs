//! Typed parse events decoded from the quick-xml token stream.
//!
//! The state machines in this crate consume these owned events rather than
//! quick-xml's borrowed ones. That keeps every transition reproducible in a
//! unit test without standing up a live tokenizer.

use std::fmt;
use std::str::from_utf8;

use quick_xml::escape::resolve_predefined_entity;
use quick_xml::events::{BytesEnd, BytesRef, BytesStart};
use quick_xml::name::QName as RawQName;
use serde::{Deserialize, Serialize};

use crate::error::AclError;

/// A qualified element or attribute name, split into an optional prefix and
/// a local part. Matching throughout the crate is on the local part only, so
/// `cmis:acl` and `acl` are the same element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QName {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    pub local_name: String,
}

impl QName {
    pub fn new(local_name: impl Into<String>) -> Self {
        QName {
            prefix: None,
            local_name: local_name.into(),
        }
    }

    pub fn with_prefix(prefix: impl Into<String>, local_name: impl Into<String>) -> Self {
        QName {
            prefix: Some(prefix.into()),
            local_name: local_name.into(),
        }
    }

    fn from_raw(raw: RawQName<'_>) -> Result<Self, AclError> {
        let prefix = match raw.prefix() {
            Some(p) => Some(from_utf8(p.as_ref())?.to_string()),
            None => None,
        };
        Ok(QName {
            prefix,
            local_name: from_utf8(raw.local_name().as_ref())?.to_string(),
        })
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

/// One decoded attribute. The value is fully unescaped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

/// The event alphabet the delegate machinery runs on.
///
/// Self-closing elements never appear as a distinct case: the driver expands
/// them into a `StartElement` immediately followed by its `EndElement`, so
/// handlers only ever deal with these three shapes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XmlEvent {
    StartElement {
        name: QName,
        attributes: Vec<Attribute>,
    },
    EndElement {
        name: QName,
    },
    Text(String),
}

impl XmlEvent {
    pub fn element_name(&self) -> Option<&QName> {
        match self {
            XmlEvent::StartElement { name, .. } | XmlEvent::EndElement { name } => Some(name),
            XmlEvent::Text(_) => None,
        }
    }

    pub fn is_start_element(&self) -> bool {
        matches!(self, XmlEvent::StartElement { .. })
    }

    pub fn is_end_element(&self) -> bool {
        matches!(self, XmlEvent::EndElement { .. })
    }
}

/// Decodes a `Start` token into an owned event, unescaping every attribute
/// value.
pub fn open_event(e: &BytesStart<'_>) -> Result<XmlEvent, AclError> {
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let value = attr
            .unescape_value()
            .map_err(|err| AclError::Escape(err.to_string()))?
            .into_owned();
        attributes.push(Attribute {
            name: QName::from_raw(attr.key)?,
            value,
        });
    }
    Ok(XmlEvent::StartElement {
        name: QName::from_raw(e.name())?,
        attributes,
    })
}

/// Decodes an `End` token into an owned event.
pub fn close_event(e: &BytesEnd<'_>) -> Result<XmlEvent, AclError> {
    Ok(XmlEvent::EndElement {
        name: QName::from_raw(e.name())?,
    })
}

/// Builds the synthetic `EndElement` for a self-closing tag.
pub fn close_event_for(e: &BytesStart<'_>) -> Result<XmlEvent, AclError> {
    Ok(XmlEvent::EndElement {
        name: QName::from_raw(e.name())?,
    })
}

/// Resolves a `GeneralRef` token (`&amp;`, `&#38;`, `&#x26;`) into the text
/// it stands for. The documents this crate reads carry no DTD, so the only
/// named entities with a definition are the five predefined ones; anything
/// else fails the parse.
pub fn resolve_reference(e: &BytesRef<'_>) -> Result<String, AclError> {
    if let Some(ch) = e.resolve_char_ref()? {
        return Ok(ch.to_string());
    }
    let name = e.decode().map_err(quick_xml::Error::from)?;
    match resolve_predefined_entity(&name) {
        Some(text) => Ok(text.to_string()),
        None => Err(AclError::Escape(format!("unknown entity &{};", name))),
    }
}
