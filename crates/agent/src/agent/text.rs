use super::Agent;
use crate::descriptor::ElementDescriptor;
use crate::markers::EDITING_TEXT;
use html::{Document, DomError, NodeKey, NodeKind};
use serde::Serialize;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEditStart {
    pub original_content: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TextEditStop {
    pub new_content: String,
    pub element: ElementDescriptor,
}

/// Empty, text only, or text broken by `<br>`.
fn is_simple_text(doc: &Document, key: NodeKey) -> bool {
    doc.children(key).iter().all(|child| match doc.kind(*child) {
        Some(NodeKind::Text { .. }) => true,
        Some(NodeKind::Element { name, .. }) => name == "br",
        _ => false,
    })
}

/// Text content with `<br>` as newlines.
fn editable_text(doc: &Document, key: NodeKey) -> String {
    doc.children(key)
        .iter()
        .map(|child| doc.text(*child).unwrap_or("\n"))
        .collect()
}

fn write_lines(doc: &mut Document, key: NodeKey, content: &str) -> Result<(), DomError> {
    doc.clear_children(key)?;
    for (i, line) in content.split('\n').enumerate() {
        if i > 0 {
            let br = doc.create_element("br");
            doc.append_child(key, br)?;
        }
        if !line.is_empty() {
            let text = doc.create_text(line);
            doc.append_child(key, text)?;
        }
    }
    Ok(())
}

impl Agent {
    pub fn start_editing_text(&mut self, id: &str) -> Option<TextEditStart> {
        self.require_frame("startEditingText")?;
        let key = self.resolve("startEditingText", id)?;
        if !is_simple_text(&self.doc, key) {
            log::warn!("startEditingText: {id:?} has element children");
            return None;
        }
        let original_content = editable_text(&self.doc, key);
        if let Err(err) = self.doc.set_attribute(key, EDITING_TEXT, "true") {
            Self::warn_dom("startEditingText", err);
            return None;
        }
        Some(TextEditStart { original_content })
    }

    /// Replace the content; newlines become `<br>`.
    pub fn edit_text(&mut self, id: &str, content: &str) -> Option<ElementDescriptor> {
        self.require_frame("editText")?;
        let key = self.resolve("editText", id)?;
        if !is_simple_text(&self.doc, key) {
            log::warn!("editText: {id:?} is not a plain text element");
            return None;
        }
        if let Err(err) = write_lines(&mut self.doc, key, content) {
            Self::warn_dom("editText", err);
            return None;
        }
        self.describe(key, false)
    }

    pub fn stop_editing_text(&mut self, id: &str) -> Option<TextEditStop> {
        self.require_frame("stopEditingText")?;
        let key = self.resolve("stopEditingText", id)?;
        if let Err(err) = self.doc.remove_attribute(key, EDITING_TEXT) {
            Self::warn_dom("stopEditingText", err);
            return None;
        }
        let new_content = editable_text(&self.doc, key);
        let element = self.describe(key, false)?;
        Some(TextEditStop {
            new_content,
            element,
        })
    }
}
