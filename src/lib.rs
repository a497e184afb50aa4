//! Streaming parser and writer for CMIS AtomPub access control lists.
//!
//! This crate reconstructs the ACL of a managed object from its AtomPub XML
//! representation in a single forward pass. Element parsers live on a
//! delegate stack, one per open subtree, and anything the grammar does not
//! recognize is captured losslessly as extension data.

pub mod delegate;
pub mod error;
pub mod events;
pub mod extension;
pub mod model;
pub mod parser;
pub mod writer;

pub mod handlers;

pub use delegate::{Control, DelegateStack, ElementDelegate, Outcome};
pub use error::AclError;
pub use events::{Attribute, QName, XmlEvent};
pub use extension::{ExtensionCapture, ExtensionElement};
pub use handlers::ace::AceParser;
pub use handlers::acl::AclParser;
pub use model::{Ace, Acl};
pub use parser::{ParseConfig, parse_acl, parse_acl_with, read_acl};
pub use writer::acl_to_xml;
