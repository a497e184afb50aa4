//! A "dumb" XML driver that decodes quick-xml tokens and feeds them to the
//! delegate stack. All grammar knowledge lives in the delegates; this layer
//! only tokenizes, decodes and stops at the right place.

use std::io::BufRead;
use std::str::from_utf8;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::delegate::{DelegateStack, Outcome};
use crate::error::AclError;
use crate::events::{self, XmlEvent};
use crate::handlers::acl::AclParser;
use crate::model::Acl;

/// Parse-time options.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParseConfig {
    /// Fail the whole parse when an ACE is structurally invalid instead of
    /// skipping the entry.
    pub strict: bool,
}

/// Parses a complete ACL document held in memory.
pub fn parse_acl(source: &str) -> Result<Acl, AclError> {
    parse_acl_with(source, ParseConfig::default())
}

pub fn parse_acl_with(source: &str, config: ParseConfig) -> Result<Acl, AclError> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(false);
    read_acl(&mut reader, config)
}

/// Drives a caller-owned reader until the `<acl>` subtree has been
/// consumed.
///
/// Reading stops at the event that closes the ACL, so when the ACL is
/// embedded in a larger document (an AtomPub entry, say) the caller keeps
/// the reader and continues with whatever follows. A stream that ends
/// before the ACL closes fails with [`AclError::UnexpectedEof`].
pub fn read_acl<B: BufRead>(reader: &mut Reader<B>, config: ParseConfig) -> Result<Acl, AclError> {
    let mut stack = DelegateStack::new(Box::new(AclParser::with_config(config)));
    let mut buf = Vec::new();
    // The tokenizer splits character data around `&amp;` and friends and
    // around CDATA boundaries. Adjacent pieces are stitched back into one
    // run here, so handlers see a single text event per gap between tags.
    let mut pending_text = String::new();

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                flush_text(&mut stack, &mut pending_text)?;
                stack.dispatch(&events::open_event(&e)?)?;
            }
            Event::Empty(e) => {
                // Handlers never see self-closing tags; expand to a
                // start/end pair.
                flush_text(&mut stack, &mut pending_text)?;
                stack.dispatch(&events::open_event(&e)?)?;
                stack.dispatch(&events::close_event_for(&e)?)?;
            }
            Event::End(e) => {
                flush_text(&mut stack, &mut pending_text)?;
                stack.dispatch(&events::close_event(&e)?)?;
            }
            Event::Text(e) => pending_text.push_str(from_utf8(e.as_ref())?),
            Event::GeneralRef(e) => pending_text.push_str(&events::resolve_reference(&e)?),
            Event::CData(e) => pending_text.push_str(from_utf8(e.as_ref())?),
            Event::Eof => break,
            _ => (),
        }
        buf.clear();
        if stack.is_complete() {
            break;
        }
    }

    match stack.take_outcome() {
        Some(Outcome::Acl(acl)) => Ok(acl),
        Some(other) => Err(AclError::State(format!(
            "root delegate completed with a non-ACL outcome: {:?}",
            other
        ))),
        None => Err(AclError::UnexpectedEof("acl".to_string())),
    }
}

/// Dispatches the accumulated character data, if any. Runs that are pure
/// whitespace are indentation between elements and are dropped whole.
fn flush_text(stack: &mut DelegateStack, pending: &mut String) -> Result<(), AclError> {
    if pending.trim().is_empty() {
        pending.clear();
    } else {
        stack.dispatch(&XmlEvent::Text(std::mem::take(pending)))?;
    }
    Ok(())
}
