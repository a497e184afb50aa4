use thiserror::Error;

/// Errors surfaced by the ACL reader and writer.
///
/// Recoverable conditions (unrecognized elements, misplaced elements,
/// invalid ACEs in the default lenient mode) are absorbed by the parsers
/// and never reach this enum; everything here is fatal to the current
/// parse or write.
#[derive(Error, Debug)]
pub enum AclError {
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("invalid character escape: {0}")]
    Escape(String),

    #[error("UTF-8 encoding error: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    #[error("UTF-8 string error: {0}")]
    Utf8Str(#[from] std::str::Utf8Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document ended before <{0}> was closed")]
    UnexpectedEof(String),

    #[error("expected an <acl> element, found <{0}>")]
    UnexpectedRoot(String),

    #[error("invalid ACE: {0}")]
    InvalidAce(String),

    #[error("parser state error: {0}")]
    State(String),
}

impl From<quick_xml::events::attributes::AttrError> for AclError {
    fn from(e: quick_xml::events::attributes::AttrError) -> Self {
        AclError::Xml(quick_xml::Error::InvalidAttr(e))
    }
}
