//! Identity & addressing of live nodes.

use crate::markers::{CLONE_STRIPPED, INSTANCE_ID, ORIGIN_ID, RUNTIME_ID};
use html::{Document, DomError, NodeKey};
use uuid::Uuid;

/// Runtime id of `key`, assigning a fresh random one if absent.
pub fn ensure_id(doc: &mut Document, key: NodeKey) -> Result<String, DomError> {
    if let Some(id) = read_id(doc, key) {
        return Ok(id.to_string());
    }
    let id = Uuid::new_v4().to_string();
    doc.set_attribute(key, RUNTIME_ID, &id)?;
    Ok(id)
}

pub fn read_id(doc: &Document, key: NodeKey) -> Option<&str> {
    non_empty(doc.attribute(key, RUNTIME_ID))
}

pub fn read_oid(doc: &Document, key: NodeKey) -> Option<&str> {
    non_empty(doc.attribute(key, ORIGIN_ID))
}

pub fn read_instance_id(doc: &Document, key: NodeKey) -> Option<&str> {
    non_empty(doc.attribute(key, INSTANCE_ID))
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Managed-stylesheet selector addressing exactly the node with runtime id `id`.
pub fn selector_for(id: &str) -> String {
    let mut escaped = String::with_capacity(id.len());
    for c in id.chars() {
        if matches!(c, '"' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    format!("[{RUNTIME_ID}=\"{escaped}\"]")
}

/// The connected element carrying runtime id `id`.
pub fn find_by_id(doc: &Document, id: &str) -> Option<NodeKey> {
    if id.is_empty() {
        return None;
    }
    doc.find_element(doc.root(), |d, k| d.attribute(k, RUNTIME_ID) == Some(id))
}

/// Remove the agent's identity and session markers from `key` and its descendants.
pub fn strip_identity(doc: &mut Document, key: NodeKey) -> Result<(), DomError> {
    let mut nodes = vec![key];
    nodes.extend(doc.descendants(key));
    for node in nodes {
        if !doc.is_element(node) {
            continue;
        }
        for marker in CLONE_STRIPPED {
            doc.remove_attribute(node, marker)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attached(doc: &mut Document) -> NodeKey {
        let body = doc.body().unwrap();
        let key = doc.create_element("div");
        doc.append_child(body, key).unwrap();
        key
    }

    #[test]
    fn ensure_id_is_idempotent_and_unique() {
        let mut doc = Document::new();
        let a = attached(&mut doc);
        let b = attached(&mut doc);
        let first = ensure_id(&mut doc, a).unwrap();
        assert_eq!(ensure_id(&mut doc, a).unwrap(), first);
        assert_ne!(ensure_id(&mut doc, b).unwrap(), first);
        assert_eq!(find_by_id(&doc, &first), Some(a));
    }

    #[test]
    fn empty_markers_read_as_absent() {
        let mut doc = Document::new();
        let a = attached(&mut doc);
        doc.set_attribute(a, ORIGIN_ID, "").unwrap();
        doc.set_attribute(a, INSTANCE_ID, "i1").unwrap();
        assert_eq!(read_oid(&doc, a), None);
        assert_eq!(read_instance_id(&doc, a), Some("i1"));
    }

    #[test]
    fn selector_escapes_quotes() {
        assert_eq!(selector_for("n1"), "[data-odid=\"n1\"]");
        assert_eq!(selector_for("a\"b"), "[data-odid=\"a\\\"b\"]");
    }

    #[test]
    fn detached_nodes_are_not_found() {
        let mut doc = Document::new();
        let a = attached(&mut doc);
        let id = ensure_id(&mut doc, a).unwrap();
        doc.detach(a).unwrap();
        assert_eq!(find_by_id(&doc, &id), None);
    }

    #[test]
    fn strip_identity_keeps_origin_id() {
        let mut doc = Document::new();
        let a = attached(&mut doc);
        let inner = doc.create_element("span");
        doc.append_child(a, inner).unwrap();
        doc.set_attribute(a, ORIGIN_ID, "o1").unwrap();
        ensure_id(&mut doc, a).unwrap();
        ensure_id(&mut doc, inner).unwrap();
        strip_identity(&mut doc, a).unwrap();
        assert_eq!(read_id(&doc, a), None);
        assert_eq!(read_id(&doc, inner), None);
        assert_eq!(read_oid(&doc, a), Some("o1"));
    }
}
