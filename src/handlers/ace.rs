//! Parser for one `<permission>` wrapper element, i.e. a single ACE.

use std::collections::BTreeSet;

use crate::delegate::{Control, ElementDelegate, Outcome};
use crate::error::AclError;
use crate::events::XmlEvent;
use crate::extension::{ExtensionCapture, ExtensionElement};
use crate::model::Ace;

use super::parse_xml_bool;

/// Position inside the ACE subtree. Leaf states carry the character data
/// accumulated so far; `InExtension` remembers where to resume once the
/// unrecognized subtree closes.
enum AceState {
    Idle,
    Body,
    InPrincipal,
    InPrincipalId(String),
    InPermission(String),
    InDirect(String),
    InExtension {
        capture: ExtensionCapture,
        resume: Box<AceState>,
    },
    Done,
}

/// Parses one ACE.
///
/// The ACE wrapper and the permission-name leaf share the tag name
/// `permission`; position in the state machine tells them apart, so no
/// lookahead is needed. Validation happens once the wrapper closes: an ACE
/// without a non-empty principal id completes as `Outcome::InvalidAce` and
/// the parent decides what to do with it.
pub struct AceParser {
    state: AceState,
    principal_id: Option<String>,
    permissions: BTreeSet<String>,
    is_direct: bool,
    extensions: Vec<ExtensionElement>,
}

impl AceParser {
    pub fn new() -> Self {
        AceParser {
            state: AceState::Idle,
            principal_id: None,
            permissions: BTreeSet::new(),
            is_direct: false,
            extensions: Vec::new(),
        }
    }

    /// Starts an inline capture with `event` as the unrecognized opening
    /// tag. The capture shares this parser's place on the delegate stack.
    fn capture_from(&mut self, event: &XmlEvent, resume: AceState) {
        let mut capture = ExtensionCapture::new();
        capture.feed(event);
        self.state = AceState::InExtension {
            capture,
            resume: Box::new(resume),
        };
    }

    fn finish(&mut self) -> Outcome {
        self.state = AceState::Done;
        match self.principal_id.take() {
            Some(id) if !id.is_empty() => Outcome::Ace(Ace {
                principal_id: id,
                permissions: std::mem::take(&mut self.permissions),
                is_direct: self.is_direct,
                extensions: std::mem::take(&mut self.extensions),
            }),
            _ => Outcome::InvalidAce("the ACE has no principalId".to_string()),
        }
    }
}

impl Default for AceParser {
    fn default() -> Self {
        AceParser::new()
    }
}

impl ElementDelegate for AceParser {
    fn handle_event(&mut self, event: &XmlEvent) -> Result<Control, AclError> {
        // The state is moved out so leaf buffers and captures can transition
        // without cloning. Every arm puts a state back.
        let state = std::mem::replace(&mut self.state, AceState::Done);
        match (state, event) {
            (AceState::Idle, XmlEvent::StartElement { .. }) => {
                self.state = AceState::Body;
                Ok(Control::Continue)
            }
            (AceState::Idle, _) => Err(AclError::State(
                "ACE parser expected its opening element first".to_string(),
            )),

            (AceState::Body, XmlEvent::StartElement { name, .. }) => {
                match name.local_name.as_str() {
                    "principal" => self.state = AceState::InPrincipal,
                    "permission" => self.state = AceState::InPermission(String::new()),
                    "direct" => self.state = AceState::InDirect(String::new()),
                    _ => self.capture_from(event, AceState::Body),
                }
                Ok(Control::Continue)
            }
            (AceState::Body, XmlEvent::Text(_)) => {
                self.state = AceState::Body;
                Ok(Control::Continue)
            }
            (AceState::Body, XmlEvent::EndElement { .. }) => {
                Ok(Control::Complete(self.finish()))
            }

            (AceState::InPrincipal, XmlEvent::StartElement { name, .. }) => {
                match name.local_name.as_str() {
                    "principalId" => self.state = AceState::InPrincipalId(String::new()),
                    _ => self.capture_from(event, AceState::InPrincipal),
                }
                Ok(Control::Continue)
            }
            (AceState::InPrincipal, XmlEvent::Text(_)) => {
                self.state = AceState::InPrincipal;
                Ok(Control::Continue)
            }
            (AceState::InPrincipal, XmlEvent::EndElement { .. }) => {
                self.state = AceState::Body;
                Ok(Control::Continue)
            }

            (AceState::InPrincipalId(mut buf), XmlEvent::Text(content)) => {
                buf.push_str(content);
                self.state = AceState::InPrincipalId(buf);
                Ok(Control::Continue)
            }
            (AceState::InPrincipalId(buf), XmlEvent::EndElement { .. }) => {
                self.principal_id = Some(buf.trim().to_string());
                self.state = AceState::InPrincipal;
                Ok(Control::Continue)
            }
            (AceState::InPrincipalId(buf), XmlEvent::StartElement { .. }) => {
                self.capture_from(event, AceState::InPrincipalId(buf));
                Ok(Control::Continue)
            }

            (AceState::InPermission(mut buf), XmlEvent::Text(content)) => {
                buf.push_str(content);
                self.state = AceState::InPermission(buf);
                Ok(Control::Continue)
            }
            (AceState::InPermission(buf), XmlEvent::EndElement { .. }) => {
                let name = buf.trim();
                if !name.is_empty() {
                    self.permissions.insert(name.to_string());
                }
                self.state = AceState::Body;
                Ok(Control::Continue)
            }
            (AceState::InPermission(buf), XmlEvent::StartElement { .. }) => {
                self.capture_from(event, AceState::InPermission(buf));
                Ok(Control::Continue)
            }

            (AceState::InDirect(mut buf), XmlEvent::Text(content)) => {
                buf.push_str(content);
                self.state = AceState::InDirect(buf);
                Ok(Control::Continue)
            }
            (AceState::InDirect(buf), XmlEvent::EndElement { .. }) => {
                self.is_direct = parse_xml_bool(buf.trim()).unwrap_or(false);
                self.state = AceState::Body;
                Ok(Control::Continue)
            }
            (AceState::InDirect(buf), XmlEvent::StartElement { .. }) => {
                self.capture_from(event, AceState::InDirect(buf));
                Ok(Control::Continue)
            }

            (AceState::InExtension { mut capture, resume }, event) => {
                match capture.feed(event) {
                    Some(subtree) => {
                        self.extensions.push(subtree);
                        self.state = *resume;
                    }
                    None => {
                        self.state = AceState::InExtension { capture, resume };
                    }
                }
                Ok(Control::Continue)
            }

            (AceState::Done, _) => Err(AclError::State(
                "ACE parser received an event after completion".to_string(),
            )),
        }
    }

    fn child_completed(&mut self, _outcome: Outcome) -> Result<(), AclError> {
        Err(AclError::State(
            "ACE parser never delegates to a child".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::QName;

    fn start(name: &str) -> XmlEvent {
        XmlEvent::StartElement {
            name: QName::new(name),
            attributes: vec![],
        }
    }

    fn end(name: &str) -> XmlEvent {
        XmlEvent::EndElement {
            name: QName::new(name),
        }
    }

    fn text(content: &str) -> XmlEvent {
        XmlEvent::Text(content.to_string())
    }

    fn drive(events: &[XmlEvent]) -> Outcome {
        let mut parser = AceParser::new();
        let (last, rest) = events.split_last().unwrap();
        for event in rest {
            match parser.handle_event(event).unwrap() {
                Control::Continue => {}
                _ => panic!("unexpected control flow before the final event"),
            }
        }
        match parser.handle_event(last).unwrap() {
            Control::Complete(outcome) => outcome,
            _ => panic!("expected completion on the final event"),
        }
    }

    #[test]
    fn test_parses_complete_ace() {
        let outcome = drive(&[
            start("permission"),
            start("principal"),
            start("principalId"),
            text("alice"),
            end("principalId"),
            end("principal"),
            start("permission"),
            text("cmis:read"),
            end("permission"),
            start("permission"),
            text("cmis:write"),
            end("permission"),
            start("direct"),
            text("true"),
            end("direct"),
            end("permission"),
        ]);

        match outcome {
            Outcome::Ace(ace) => {
                assert_eq!(ace.principal_id, "alice");
                assert!(ace.is_direct);
                assert_eq!(
                    ace.permissions.iter().cloned().collect::<Vec<_>>(),
                    vec!["cmis:read".to_string(), "cmis:write".to_string()]
                );
            }
            other => panic!("expected a valid ACE, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_permissions_collapse() {
        let outcome = drive(&[
            start("permission"),
            start("principal"),
            start("principalId"),
            text("bob"),
            end("principalId"),
            end("principal"),
            start("permission"),
            text("cmis:read"),
            end("permission"),
            start("permission"),
            text("cmis:read"),
            end("permission"),
            end("permission"),
        ]);

        match outcome {
            Outcome::Ace(ace) => assert_eq!(ace.permissions.len(), 1),
            other => panic!("expected a valid ACE, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_principal_is_invalid() {
        let outcome = drive(&[
            start("permission"),
            start("permission"),
            text("cmis:read"),
            end("permission"),
            end("permission"),
        ]);
        assert!(matches!(outcome, Outcome::InvalidAce(_)));
    }

    #[test]
    fn test_blank_principal_id_is_invalid() {
        let outcome = drive(&[
            start("permission"),
            start("principal"),
            start("principalId"),
            text("   "),
            end("principalId"),
            end("principal"),
            end("permission"),
        ]);
        assert!(matches!(outcome, Outcome::InvalidAce(_)));
    }

    #[test]
    fn test_direct_accepts_numeric_boolean_and_defaults_false() {
        let numeric = drive(&[
            start("permission"),
            start("principal"),
            start("principalId"),
            text("carol"),
            end("principalId"),
            end("principal"),
            start("direct"),
            text("1"),
            end("direct"),
            end("permission"),
        ]);
        match numeric {
            Outcome::Ace(ace) => assert!(ace.is_direct),
            other => panic!("expected a valid ACE, got {:?}", other),
        }

        let garbage = drive(&[
            start("permission"),
            start("principal"),
            start("principalId"),
            text("carol"),
            end("principalId"),
            end("principal"),
            start("direct"),
            text("maybe"),
            end("direct"),
            end("permission"),
        ]);
        match garbage {
            Outcome::Ace(ace) => assert!(!ace.is_direct),
            other => panic!("expected a valid ACE, got {:?}", other),
        }
    }

    #[test]
    fn test_unrecognized_child_is_captured_and_parsing_resumes() {
        let vendor = |local: &str| XmlEvent::StartElement {
            name: QName::with_prefix("vendor", local),
            attributes: vec![],
        };
        let vendor_end = |local: &str| XmlEvent::EndElement {
            name: QName::with_prefix("vendor", local),
        };
        let outcome = drive(&[
            start("permission"),
            start("principal"),
            start("principalId"),
            text("dave"),
            end("principalId"),
            end("principal"),
            vendor("flags"),
            vendor("flag"),
            text("audit"),
            vendor_end("flag"),
            vendor_end("flags"),
            start("permission"),
            text("cmis:read"),
            end("permission"),
            end("permission"),
        ]);

        match outcome {
            Outcome::Ace(ace) => {
                assert_eq!(ace.extensions.len(), 1);
                assert_eq!(ace.extensions[0].name.to_string(), "vendor:flags");
                assert_eq!(ace.extensions[0].children.len(), 1);
                assert_eq!(ace.extensions[0].children[0].text.as_deref(), Some("audit"));
                assert!(ace.grants("cmis:read"));
            }
            other => panic!("expected a valid ACE, got {:?}", other),
        }
    }

    #[test]
    fn test_split_principal_id_text_is_joined() {
        let outcome = drive(&[
            start("permission"),
            start("principal"),
            start("principalId"),
            text("GROUP_"),
            text("EVERYONE"),
            end("principalId"),
            end("principal"),
            end("permission"),
        ]);
        match outcome {
            Outcome::Ace(ace) => assert_eq!(ace.principal_id, "GROUP_EVERYONE"),
            other => panic!("expected a valid ACE, got {:?}", other),
        }
    }

    #[test]
    fn test_events_after_completion_are_rejected() {
        let mut parser = AceParser::new();
        for event in [start("permission"), end("permission")] {
            parser.handle_event(&event).unwrap();
        }
        assert!(matches!(
            parser.handle_event(&start("permission")),
            Err(AclError::State(_))
        ));
    }
}
