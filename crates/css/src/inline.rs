//! Reading and writing the inline `style` attribute.

use crate::syntax::{Declaration, parse_declarations};
use html::{Document, DomError, NodeKey};

pub fn inline_declarations(doc: &Document, key: NodeKey) -> Vec<Declaration> {
    doc.attribute(key, "style")
        .map(parse_declarations)
        .unwrap_or_default()
}

pub fn inline_style_value(doc: &Document, key: NodeKey, name: &str) -> Option<String> {
    inline_declarations(doc, key)
        .into_iter()
        .rev()
        .find(|d| d.name == name)
        .map(|d| d.value)
}

/// Set one inline declaration, replacing earlier ones of the same name in place.
/// An empty `value` removes the declaration.
pub fn set_inline_style(
    doc: &mut Document,
    key: NodeKey,
    name: &str,
    value: &str,
) -> Result<(), DomError> {
    let mut decls = inline_declarations(doc, key);
    if value.is_empty() {
        decls.retain(|d| d.name != name);
        return write_inline(doc, key, &decls);
    }
    match decls.iter().position(|d| d.name == name) {
        Some(first) => {
            decls[first].value = value.to_string();
            decls[first].important = false;
            let mut seen = false;
            decls.retain(|d| {
                if d.name != name {
                    return true;
                }
                let keep = !seen;
                seen = true;
                keep
            });
        }
        None => decls.push(Declaration {
            name: name.to_string(),
            value: value.to_string(),
            important: false,
        }),
    }
    write_inline(doc, key, &decls)
}

/// Returns whether anything was removed.
pub fn remove_inline_style(doc: &mut Document, key: NodeKey, name: &str) -> Result<bool, DomError> {
    let mut decls = inline_declarations(doc, key);
    let before = decls.len();
    decls.retain(|d| d.name != name);
    if decls.len() == before {
        return Ok(false);
    }
    write_inline(doc, key, &decls)?;
    Ok(true)
}

fn write_inline(doc: &mut Document, key: NodeKey, decls: &[Declaration]) -> Result<(), DomError> {
    if decls.is_empty() {
        doc.remove_attribute(key, "style")?;
        return Ok(());
    }
    let text = decls
        .iter()
        .map(|d| d.to_string())
        .collect::<Vec<_>>()
        .join("; ");
    doc.set_attribute(key, "style", &text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place_and_empty_removes() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        doc.set_attribute(body, "style", "color: red; width: 10px; color: blue")
            .unwrap();

        set_inline_style(&mut doc, body, "color", "green").unwrap();
        assert_eq!(doc.attribute(body, "style"), Some("color: green; width: 10px"));

        set_inline_style(&mut doc, body, "width", "").unwrap();
        assert_eq!(doc.attribute(body, "style"), Some("color: green"));

        assert!(remove_inline_style(&mut doc, body, "color").unwrap());
        assert_eq!(doc.attribute(body, "style"), None);
    }
}
