//! The root `<acl>` parser.

use crate::delegate::{Control, ElementDelegate, Outcome};
use crate::error::AclError;
use crate::events::XmlEvent;
use crate::extension::ExtensionCapture;
use crate::model::Acl;
use crate::parser::ParseConfig;

use super::ace::AceParser;
use super::parse_xml_bool;

/// Elements that belong inside an ACE, not directly inside `<acl>`. Seen at
/// the ACL level they indicate a structurally damaged document.
const ACE_MEMBER_TAGS: [&str; 3] = ["principal", "principalId", "direct"];

/// Position inside the `<acl>` subtree. `InExtension` remembers the state
/// to restore once the pushed capture pops.
enum AclState {
    Idle,
    InAcl,
    InAce,
    InExact(String),
    InExtension(Box<AclState>),
    Done,
}

/// Parses the `<acl>` root element and assembles the final [`Acl`].
///
/// ACE wrappers and unrecognized subtrees are handed to child delegates;
/// this parser only ever sees events of its own level plus the completion
/// outcomes the stack delivers. Once the closing tag has been consumed the
/// parser is spent and rejects further events.
pub struct AclParser {
    state: AclState,
    acl: Acl,
    strict: bool,
}

impl AclParser {
    pub fn new() -> Self {
        AclParser::with_config(ParseConfig::default())
    }

    pub fn with_config(config: ParseConfig) -> Self {
        AclParser {
            state: AclState::Idle,
            acl: Acl::default(),
            strict: config.strict,
        }
    }
}

impl Default for AclParser {
    fn default() -> Self {
        AclParser::new()
    }
}

impl ElementDelegate for AclParser {
    fn handle_event(&mut self, event: &XmlEvent) -> Result<Control, AclError> {
        let state = std::mem::replace(&mut self.state, AclState::Done);
        match (state, event) {
            (AclState::Idle, XmlEvent::StartElement { name, attributes }) => {
                if name.local_name != "acl" {
                    return Err(AclError::UnexpectedRoot(name.to_string()));
                }
                if let Some(attr) = attributes.iter().find(|a| a.name.local_name == "exact") {
                    if let Some(value) = parse_xml_bool(attr.value.trim()) {
                        self.acl.is_exact = Some(value);
                    }
                }
                self.state = AclState::InAcl;
                Ok(Control::Continue)
            }
            (AclState::Idle, XmlEvent::Text(_)) => {
                self.state = AclState::Idle;
                Ok(Control::Continue)
            }
            (AclState::Idle, XmlEvent::EndElement { name }) => Err(AclError::State(format!(
                "closing </{}> arrived before an <acl> was opened",
                name
            ))),

            (AclState::InAcl, XmlEvent::StartElement { name, .. }) => {
                match name.local_name.as_str() {
                    "permission" => {
                        self.state = AclState::InAce;
                        Ok(Control::Delegate(Box::new(AceParser::new())))
                    }
                    "exact" => {
                        self.state = AclState::InExact(String::new());
                        Ok(Control::Continue)
                    }
                    other => {
                        if ACE_MEMBER_TAGS.contains(&other) {
                            log::warn!(
                                "element <{}> is not valid directly inside <acl>; capturing it as an extension",
                                name
                            );
                        } else {
                            log::debug!("capturing unrecognized element <{}> inside <acl>", name);
                        }
                        self.state = AclState::InExtension(Box::new(AclState::InAcl));
                        Ok(Control::Delegate(Box::new(ExtensionCapture::new())))
                    }
                }
            }
            (AclState::InAcl, XmlEvent::Text(_)) => {
                // Character data between ACL children carries no meaning.
                self.state = AclState::InAcl;
                Ok(Control::Continue)
            }
            (AclState::InAcl, XmlEvent::EndElement { .. }) => {
                self.state = AclState::Done;
                log::debug!("parsed ACL with {} entries", self.acl.entries.len());
                Ok(Control::Complete(Outcome::Acl(std::mem::take(&mut self.acl))))
            }

            (AclState::InExact(mut buf), XmlEvent::Text(content)) => {
                buf.push_str(content);
                self.state = AclState::InExact(buf);
                Ok(Control::Continue)
            }
            (AclState::InExact(buf), XmlEvent::EndElement { .. }) => {
                if let Some(value) = parse_xml_bool(buf.trim()) {
                    self.acl.is_exact = Some(value);
                }
                self.state = AclState::InAcl;
                Ok(Control::Continue)
            }
            (AclState::InExact(buf), XmlEvent::StartElement { name, .. }) => {
                log::warn!("unexpected element <{}> inside <exact>", name);
                self.state = AclState::InExtension(Box::new(AclState::InExact(buf)));
                Ok(Control::Delegate(Box::new(ExtensionCapture::new())))
            }

            // These states exist only while a child owns the top of the
            // stack; the stack never routes events here.
            (AclState::InAce, _) | (AclState::InExtension(_), _) => Err(AclError::State(
                "ACL parser received an event while a child delegate was active".to_string(),
            )),

            (AclState::Done, _) => Err(AclError::State(
                "ACL parser received an event after completion".to_string(),
            )),
        }
    }

    fn child_completed(&mut self, outcome: Outcome) -> Result<(), AclError> {
        let state = std::mem::replace(&mut self.state, AclState::Done);
        match (state, outcome) {
            (AclState::InAce, Outcome::Ace(ace)) => {
                self.acl.entries.push(ace);
                self.state = AclState::InAcl;
                Ok(())
            }
            (AclState::InAce, Outcome::InvalidAce(reason)) => {
                if self.strict {
                    return Err(AclError::InvalidAce(reason));
                }
                log::warn!("skipping invalid ACE: {}", reason);
                self.state = AclState::InAcl;
                Ok(())
            }
            (AclState::InExtension(resume), Outcome::Extension(element)) => {
                self.acl.extensions.push(element);
                self.state = *resume;
                Ok(())
            }
            (_, outcome) => Err(AclError::State(format!(
                "ACL parser received a child outcome it did not ask for: {:?}",
                outcome
            ))),
        }
    }
}
