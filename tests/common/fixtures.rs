/// Builds the XML for one ACE wrapper element.
pub fn ace_xml(principal_id: &str, permissions: &[&str], direct: bool) -> String {
    let mut xml = String::from("<permission>");
    xml.push_str("<principal><principalId>");
    xml.push_str(principal_id);
    xml.push_str("</principalId></principal>");
    for permission in permissions {
        xml.push_str("<permission>");
        xml.push_str(permission);
        xml.push_str("</permission>");
    }
    xml.push_str(if direct {
        "<direct>true</direct>"
    } else {
        "<direct>false</direct>"
    });
    xml.push_str("</permission>");
    xml
}

/// Wraps ACE fragments in an `<acl>` document.
pub fn acl_xml(aces: &[String]) -> String {
    format!("<acl>{}</acl>", aces.concat())
}

/// A repository-style response: three principals, mixed permissions, with
/// the indentation a real server would emit.
pub fn sample_repository_acl() -> &'static str {
    r#"<cmis:acl xmlns:cmis="http://docs.oasis-open.org/ns/cmis/core/200908/">
  <cmis:permission>
    <cmis:principal>
      <cmis:principalId>admin</cmis:principalId>
    </cmis:principal>
    <cmis:permission>cmis:all</cmis:permission>
    <cmis:direct>true</cmis:direct>
  </cmis:permission>
  <cmis:permission>
    <cmis:principal>
      <cmis:principalId>GROUP_EVERYONE</cmis:principalId>
    </cmis:principal>
    <cmis:permission>cmis:read</cmis:permission>
    <cmis:direct>false</cmis:direct>
  </cmis:permission>
  <cmis:permission>
    <cmis:principal>
      <cmis:principalId>reviewers</cmis:principalId>
    </cmis:principal>
    <cmis:permission>cmis:read</cmis:permission>
    <cmis:permission>cmis:write</cmis:permission>
    <cmis:direct>true</cmis:direct>
  </cmis:permission>
  <cmis:exact>true</cmis:exact>
</cmis:acl>"#
}
