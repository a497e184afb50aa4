//! Serializes [`Acl`] values back to the AtomPub ACL element grammar.

use std::io::Write;

use quick_xml::Writer;
use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};

use crate::error::AclError;
use crate::extension::ExtensionElement;
use crate::model::{Ace, Acl};

/// Renders the `<acl>` element for an ACL, including captured extension
/// subtrees. Text and attribute values are escaped on the way out, so a
/// parse of the result reconstructs an equal [`Acl`].
pub fn acl_to_xml(acl: &Acl) -> Result<String, AclError> {
    let mut out = Vec::new();
    let mut writer = Writer::new(&mut out);

    writer.write_event(Event::Start(BytesStart::new("acl")))?;
    for ace in &acl.entries {
        write_ace(&mut writer, ace)?;
    }
    if let Some(exact) = acl.is_exact {
        write_leaf(&mut writer, "exact", bool_text(exact))?;
    }
    for extension in &acl.extensions {
        write_extension(&mut writer, extension)?;
    }
    writer.write_event(Event::End(BytesEnd::new("acl")))?;

    drop(writer);
    Ok(String::from_utf8(out)?)
}

fn write_ace<W: Write>(writer: &mut Writer<W>, ace: &Ace) -> Result<(), AclError> {
    writer.write_event(Event::Start(BytesStart::new("permission")))?;

    writer.write_event(Event::Start(BytesStart::new("principal")))?;
    write_leaf(writer, "principalId", &ace.principal_id)?;
    writer.write_event(Event::End(BytesEnd::new("principal")))?;

    for permission in &ace.permissions {
        write_leaf(writer, "permission", permission)?;
    }
    write_leaf(writer, "direct", bool_text(ace.is_direct))?;
    for extension in &ace.extensions {
        write_extension(writer, extension)?;
    }

    writer.write_event(Event::End(BytesEnd::new("permission")))?;
    Ok(())
}

fn write_leaf<W: Write>(writer: &mut Writer<W>, tag: &str, text: &str) -> Result<(), AclError> {
    writer.write_event(Event::Start(BytesStart::new(tag)))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new(tag)))?;
    Ok(())
}

fn write_extension<W: Write>(
    writer: &mut Writer<W>,
    element: &ExtensionElement,
) -> Result<(), AclError> {
    let name = element.name.to_string();
    let mut start = BytesStart::new(name.as_str());
    for attr in &element.attributes {
        let attr_name = attr.name.to_string();
        start.push_attribute((attr_name.as_str(), attr.value.as_str()));
    }
    writer.write_event(Event::Start(start))?;

    if let Some(text) = &element.text {
        writer.write_event(Event::Text(BytesText::new(text)))?;
    }
    for child in &element.children {
        write_extension(writer, child)?;
    }

    writer.write_event(Event::End(BytesEnd::new(name.as_str())))?;
    Ok(())
}

fn bool_text(value: bool) -> &'static str {
    if value { "true" } else { "false" }
}
