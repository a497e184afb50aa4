//! Element parsers for the ACL grammar, one per subtree kind.

pub mod ace;
pub mod acl;

/// Parses the xsd:boolean lexical space. Repositories usually emit `true`
/// or `false`, but `1` and `0` are equally valid.
pub(crate) fn parse_xml_bool(text: &str) -> Option<bool> {
    match text {
        "true" | "1" => Some(true),
        "false" | "0" => Some(false),
        _ => None,
    }
}
