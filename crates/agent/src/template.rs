//! Value templates for elements the agent creates.

use crate::identity::ensure_id;
use crate::markers::{INSERTED, ORIGIN_ID, RUNTIME_ID};
use css::{set_inline_style, to_css_property};
use html::{Document, DomError, NodeKey};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionElement {
    pub tag_name: String,
    pub attributes: BTreeMap<String, String>,
    /// camelCase property names.
    pub styles: BTreeMap<String, String>,
    pub text_content: Option<String>,
    pub children: Vec<ActionElement>,
    /// Runtime id to assign, so the host can track the node before it is rendered.
    pub dom_id: Option<String>,
    pub oid: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupContainer {
    pub tag_name: String,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub dom_id: String,
    #[serde(default)]
    pub oid: Option<String>,
}

/// Build a detached live subtree from `template`.
pub fn build_element(doc: &mut Document, template: &ActionElement) -> Result<NodeKey, DomError> {
    let key = doc.create_element(&template.tag_name);
    for (name, value) in &template.attributes {
        doc.set_attribute(key, name, value)?;
    }
    if let Some(id) = &template.dom_id {
        doc.set_attribute(key, RUNTIME_ID, id)?;
    }
    if let Some(oid) = &template.oid {
        doc.set_attribute(key, ORIGIN_ID, oid)?;
    }
    for (name, value) in &template.styles {
        set_inline_style(doc, key, &to_css_property(name), value)?;
    }
    if let Some(text) = template.text_content.as_deref().filter(|t| !t.is_empty()) {
        let text = doc.create_text(text);
        doc.append_child(key, text)?;
    }
    for child in &template.children {
        let child = build_element(doc, child)?;
        doc.append_child(key, child)?;
    }
    Ok(key)
}

/// Detached, provisional container element.
pub fn build_container(
    doc: &mut Document,
    container: &GroupContainer,
) -> Result<NodeKey, DomError> {
    let key = doc.create_element(&container.tag_name);
    for (name, value) in &container.attributes {
        doc.set_attribute(key, name, value)?;
    }
    if container.dom_id.is_empty() {
        ensure_id(doc, key)?;
    } else {
        doc.set_attribute(key, RUNTIME_ID, &container.dom_id)?;
    }
    if let Some(oid) = &container.oid {
        doc.set_attribute(key, ORIGIN_ID, oid)?;
    }
    doc.set_attribute(key, INSERTED, "true")?;
    Ok(key)
}
