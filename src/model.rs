//! The ACL domain model reconstructed from an AtomPub document. This is the
//! **output** representation; parse state never leaks into it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::extension::ExtensionElement;

/// An access control list: the ordered ACEs of a managed object plus any
/// repository extension subtrees that rode along in the document.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Acl {
    /// Entries in document order.
    pub entries: Vec<Ace>,
    /// Whether the list is the complete set of permissions for the object.
    /// `None` when the repository did not say.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_exact: Option<bool>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionElement>,
}

impl Acl {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A single access control entry: one principal and the permissions granted
/// to it.
#[derive(Deserialize, Serialize, Debug, Default, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Ace {
    pub principal_id: String,
    /// Permission names, deduplicated and ordered for stable comparison.
    pub permissions: BTreeSet<String>,
    /// True when the ACE was applied directly to the object rather than
    /// inherited. Absent or unparseable markup reads as `false`.
    #[serde(default)]
    pub is_direct: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub extensions: Vec<ExtensionElement>,
}

impl Ace {
    pub fn new(
        principal_id: impl Into<String>,
        permissions: impl IntoIterator<Item = impl Into<String>>,
        is_direct: bool,
    ) -> Self {
        Ace {
            principal_id: principal_id.into(),
            permissions: permissions.into_iter().map(Into::into).collect(),
            is_direct,
            extensions: Vec::new(),
        }
    }

    pub fn grants(&self, permission: &str) -> bool {
        self.permissions.contains(permission)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ace_deduplicates_permissions() {
        let ace = Ace::new("alice", ["cmis:read", "cmis:write", "cmis:read"], true);
        assert_eq!(ace.permissions.len(), 2);
        assert!(ace.grants("cmis:read"));
        assert!(!ace.grants("cmis:all"));
    }

    #[test]
    fn test_acl_serializes_without_empty_optionals() {
        let acl = Acl {
            entries: vec![Ace::new("bob", ["cmis:read"], false)],
            is_exact: None,
            extensions: Vec::new(),
        };
        let json = serde_json::to_value(&acl).unwrap();
        assert!(json.get("isExact").is_none());
        assert!(json.get("extensions").is_none());
        assert_eq!(json["entries"][0]["principalId"], "bob");
        assert_eq!(json["entries"][0]["isDirect"], false);
    }

    #[test]
    fn test_extension_names_serialize_with_camel_case_keys() {
        let mut acl = Acl::default();
        acl.extensions.push(ExtensionElement::named("vendorBoost"));

        let json = serde_json::to_value(&acl).unwrap();
        let name = &json["extensions"][0]["name"];
        assert_eq!(name["localName"], "vendorBoost");
        assert!(name.get("local_name").is_none());
        // An unprefixed name serializes without a prefix key at all.
        assert!(name.get("prefix").is_none());
    }
}
