//! Arena-backed live document.
//!
//! This is the tree the agent inspects and edits. Page code mutates it through the same API
//! between agent calls, so nothing outside this module may hold on to child lists.
//!
//! Invariants:
//! - A node has at most one parent, and parent/children links are always symmetric.
//! - Element and attribute names are ASCII-lowercase.
//! - Removed nodes stay in the arena as dead records; their keys never resolve again.
//! - Detached nodes are alive but unreachable from the root.
//! - Every structural change appends a `MutationRecord`; every change of any kind bumps
//!   `version`.

use thiserror::Error;

/// Opaque arena key. Stable for the lifetime of the document.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeKey(pub u32);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomError {
    #[error("no live node {0:?}")]
    MissingNode(NodeKey),
    #[error("node {0:?} has the wrong kind for this operation")]
    WrongNodeKind(NodeKey),
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    CycleDetected { parent: NodeKey, child: NodeKey },
    #[error("{before:?} is not a child of {parent:?}")]
    InvalidSibling { parent: NodeKey, before: NodeKey },
    #[error("{0:?} cannot have children")]
    InvalidParent(NodeKey),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element {
        name: String,
        attributes: Vec<(String, String)>,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

/// One structural change, in the spirit of a DOM `MutationRecord` of type `childList`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MutationRecord {
    pub target: NodeKey,
    pub added: Vec<NodeKey>,
    pub removed: Vec<NodeKey>,
}

struct NodeRecord {
    kind: NodeKind,
    parent: Option<NodeKey>,
    children: Vec<NodeKey>,
    alive: bool,
}

impl NodeRecord {
    fn allows_children(&self) -> bool {
        matches!(self.kind, NodeKind::Document | NodeKind::Element { .. })
    }
}

pub struct Document {
    nodes: Vec<NodeRecord>,
    root: NodeKey,
    version: u64,
    records: Vec<MutationRecord>,
}

impl Document {
    /// A document with the usual `<html><head></head><body></body></html>` skeleton.
    pub fn new() -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            root: NodeKey(0),
            version: 0,
            records: Vec::new(),
        };
        doc.root = doc.push(NodeKind::Document);
        let html = doc.create_element("html");
        let head = doc.create_element("head");
        let body = doc.create_element("body");
        doc.link(doc.root, html, None);
        doc.link(html, head, None);
        doc.link(html, body, None);
        doc.records.clear();
        doc
    }

    pub fn root(&self) -> NodeKey {
        self.root
    }

    pub fn document_element(&self) -> Option<NodeKey> {
        self.element_children(self.root).next()
    }

    pub fn head(&self) -> Option<NodeKey> {
        self.document_child("head")
    }

    pub fn body(&self) -> Option<NodeKey> {
        self.document_child("body")
    }

    fn document_child(&self, tag: &str) -> Option<NodeKey> {
        let html = self.document_element()?;
        self.element_children(html)
            .find(|k| self.tag_name(*k) == Some(tag))
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Drain the structural change records accumulated since the last call.
    pub fn take_records(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.records)
    }

    // ---- creation ----

    pub fn create_element(&mut self, name: &str) -> NodeKey {
        self.push(NodeKind::Element {
            name: name.to_ascii_lowercase(),
            attributes: Vec::new(),
        })
    }

    pub fn create_text(&mut self, text: &str) -> NodeKey {
        self.push(NodeKind::Text {
            text: text.to_string(),
        })
    }

    pub fn create_comment(&mut self, text: &str) -> NodeKey {
        self.push(NodeKind::Comment {
            text: text.to_string(),
        })
    }

    fn push(&mut self, kind: NodeKind) -> NodeKey {
        let key = NodeKey(self.nodes.len() as u32);
        self.nodes.push(NodeRecord {
            kind,
            parent: None,
            children: Vec::new(),
            alive: true,
        });
        self.version += 1;
        key
    }

    /// Copy `key` and its subtree into new detached nodes.
    pub fn deep_clone(&mut self, key: NodeKey) -> Result<NodeKey, DomError> {
        let kind = self.record(key)?.kind.clone();
        let children = self.record(key)?.children.clone();
        let copy = self.push(kind);
        for child in children {
            let child_copy = self.deep_clone(child)?;
            self.link(copy, child_copy, None);
        }
        Ok(copy)
    }

    // ---- structure ----

    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), DomError> {
        self.insert_before(parent, child, None)
    }

    /// Insert `child` under `parent` before `before`, or at the end when `before` is `None`.
    /// A child that already has a parent is moved.
    pub fn insert_before(
        &mut self,
        parent: NodeKey,
        child: NodeKey,
        before: Option<NodeKey>,
    ) -> Result<(), DomError> {
        if !self.record(parent)?.allows_children() {
            return Err(DomError::InvalidParent(parent));
        }
        self.record(child)?;
        if child == parent || self.contains(child, parent) {
            return Err(DomError::CycleDetected { parent, child });
        }
        if let Some(before) = before {
            if self.record(before)?.parent != Some(parent) {
                return Err(DomError::InvalidSibling { parent, before });
            }
            if before == child {
                return Ok(());
            }
        }
        self.detach(child)?;
        self.link(parent, child, before);
        Ok(())
    }

    fn link(&mut self, parent: NodeKey, child: NodeKey, before: Option<NodeKey>) {
        let siblings = &mut self.nodes[parent.0 as usize].children;
        let pos = before
            .and_then(|b| siblings.iter().position(|k| *k == b))
            .unwrap_or(siblings.len());
        siblings.insert(pos, child);
        self.nodes[child.0 as usize].parent = Some(parent);
        self.version += 1;
        self.records.push(MutationRecord {
            target: parent,
            added: vec![child],
            removed: Vec::new(),
        });
    }

    /// Unlink `key` from its parent. The subtree stays alive and can be reinserted.
    pub fn detach(&mut self, key: NodeKey) -> Result<(), DomError> {
        let Some(parent) = self.record(key)?.parent else {
            return Ok(());
        };
        self.nodes[parent.0 as usize].children.retain(|k| *k != key);
        self.nodes[key.0 as usize].parent = None;
        self.version += 1;
        self.records.push(MutationRecord {
            target: parent,
            added: Vec::new(),
            removed: vec![key],
        });
        Ok(())
    }

    /// Detach `key` and kill its whole subtree.
    pub fn remove(&mut self, key: NodeKey) -> Result<(), DomError> {
        if key == self.root {
            return Err(DomError::InvalidParent(key));
        }
        self.detach(key)?;
        let mut stack = vec![key];
        while let Some(current) = stack.pop() {
            let record = &mut self.nodes[current.0 as usize];
            record.alive = false;
            stack.extend(record.children.iter().copied());
        }
        Ok(())
    }

    pub fn clear_children(&mut self, key: NodeKey) -> Result<(), DomError> {
        let children = self.record(key)?.children.clone();
        for child in children {
            self.remove(child)?;
        }
        Ok(())
    }

    // ---- queries ----

    fn record(&self, key: NodeKey) -> Result<&NodeRecord, DomError> {
        match self.nodes.get(key.0 as usize) {
            Some(record) if record.alive => Ok(record),
            _ => Err(DomError::MissingNode(key)),
        }
    }

    pub fn is_alive(&self, key: NodeKey) -> bool {
        self.record(key).is_ok()
    }

    /// Alive and reachable from the document root.
    pub fn is_connected(&self, key: NodeKey) -> bool {
        let mut current = key;
        loop {
            if current == self.root {
                return true;
            }
            match self.record(current).ok().and_then(|r| r.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    /// True when `node` is a strict descendant of `ancestor`.
    pub fn contains(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = self.parent(node);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.parent(key);
        }
        false
    }

    pub fn kind(&self, key: NodeKey) -> Option<&NodeKind> {
        self.record(key).ok().map(|r| &r.kind)
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        self.record(key).ok().and_then(|r| r.parent)
    }

    /// Closest ancestor that is an element.
    pub fn parent_element(&self, key: NodeKey) -> Option<NodeKey> {
        self.parent(key).filter(|p| self.is_element(*p))
    }

    pub fn children(&self, key: NodeKey) -> &[NodeKey] {
        self.record(key).map(|r| r.children.as_slice()).unwrap_or(&[])
    }

    pub fn element_children(&self, key: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        self.children(key)
            .iter()
            .copied()
            .filter(|k| self.is_element(*k))
    }

    /// Pre-order descendants of `key`, excluding `key` itself.
    pub fn descendants(&self, key: NodeKey) -> Vec<NodeKey> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeKey> = self.children(key).iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        out
    }

    pub fn is_element(&self, key: NodeKey) -> bool {
        matches!(self.kind(key), Some(NodeKind::Element { .. }))
    }

    pub fn tag_name(&self, key: NodeKey) -> Option<&str> {
        match self.kind(key)? {
            NodeKind::Element { name, .. } => Some(name.as_str()),
            _ => None,
        }
    }

    pub fn attributes(&self, key: NodeKey) -> &[(String, String)] {
        match self.kind(key) {
            Some(NodeKind::Element { attributes, .. }) => attributes,
            _ => &[],
        }
    }

    pub fn attribute(&self, key: NodeKey, name: &str) -> Option<&str> {
        self.attributes(key)
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_attribute(&self, key: NodeKey, name: &str) -> bool {
        self.attribute(key, name).is_some()
    }

    pub fn text(&self, key: NodeKey) -> Option<&str> {
        match self.kind(key)? {
            NodeKind::Text { text } => Some(text.as_str()),
            _ => None,
        }
    }

    /// Concatenated text of all descendant text nodes.
    pub fn text_content(&self, key: NodeKey) -> String {
        if let Some(text) = self.text(key) {
            return text.to_string();
        }
        self.descendants(key)
            .into_iter()
            .filter_map(|k| self.text(k))
            .collect()
    }

    /// First element in document order (starting at `from`, inclusive) matching `pred`.
    pub fn find_element(
        &self,
        from: NodeKey,
        mut pred: impl FnMut(&Document, NodeKey) -> bool,
    ) -> Option<NodeKey> {
        std::iter::once(from)
            .chain(self.descendants(from))
            .find(|k| self.is_element(*k) && pred(self, *k))
    }

    // ---- content mutation ----

    pub fn set_attribute(&mut self, key: NodeKey, name: &str, value: &str) -> Result<(), DomError> {
        self.record(key)?;
        let NodeKind::Element { attributes, .. } = &mut self.nodes[key.0 as usize].kind else {
            return Err(DomError::WrongNodeKind(key));
        };
        let name = name.to_ascii_lowercase();
        match attributes.iter_mut().find(|(k, _)| *k == name) {
            Some((_, v)) => {
                v.clear();
                v.push_str(value);
            }
            None => attributes.push((name, value.to_string())),
        }
        self.version += 1;
        Ok(())
    }

    /// Returns whether the attribute was present.
    pub fn remove_attribute(&mut self, key: NodeKey, name: &str) -> Result<bool, DomError> {
        self.record(key)?;
        let NodeKind::Element { attributes, .. } = &mut self.nodes[key.0 as usize].kind else {
            return Err(DomError::WrongNodeKind(key));
        };
        let before = attributes.len();
        attributes.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        let removed = attributes.len() != before;
        if removed {
            self.version += 1;
        }
        Ok(removed)
    }

    pub fn set_text(&mut self, key: NodeKey, value: &str) -> Result<(), DomError> {
        self.record(key)?;
        let NodeKind::Text { text } = &mut self.nodes[key.0 as usize].kind else {
            return Err(DomError::WrongNodeKind(key));
        };
        text.clear();
        text.push_str(value);
        self.version += 1;
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn div(doc: &mut Document, parent: NodeKey) -> NodeKey {
        let key = doc.create_element("div");
        doc.append_child(parent, key).unwrap();
        key
    }

    #[test]
    fn new_document_has_skeleton() {
        let doc = Document::new();
        let html = doc.document_element().unwrap();
        assert_eq!(doc.tag_name(html), Some("html"));
        assert_eq!(doc.parent(doc.head().unwrap()), Some(html));
        assert_eq!(doc.parent(doc.body().unwrap()), Some(html));
    }

    #[test]
    fn insert_before_orders_children_and_moves_existing_child() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let a = div(&mut doc, body);
        let b = div(&mut doc, body);
        let c = doc.create_element("p");
        doc.insert_before(body, c, Some(b)).unwrap();
        assert_eq!(doc.children(body), &[a, c, b]);

        doc.insert_before(body, b, Some(a)).unwrap();
        assert_eq!(doc.children(body), &[b, a, c]);
    }

    #[test]
    fn rejects_cycles_and_foreign_siblings() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let outer = div(&mut doc, body);
        let inner = div(&mut doc, outer);
        assert_eq!(
            doc.append_child(inner, outer),
            Err(DomError::CycleDetected {
                parent: inner,
                child: outer
            })
        );
        let loose = doc.create_element("span");
        assert_eq!(
            doc.insert_before(body, loose, Some(inner)),
            Err(DomError::InvalidSibling {
                parent: body,
                before: inner
            })
        );
    }

    #[test]
    fn remove_kills_subtree_and_records_change() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let outer = div(&mut doc, body);
        let inner = div(&mut doc, outer);
        doc.take_records();

        doc.remove(outer).unwrap();
        assert!(!doc.is_alive(outer));
        assert!(!doc.is_alive(inner));
        assert_eq!(
            doc.take_records(),
            vec![MutationRecord {
                target: body,
                added: Vec::new(),
                removed: vec![outer],
            }]
        );
    }

    #[test]
    fn detached_nodes_stay_alive_but_disconnected() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let a = div(&mut doc, body);
        doc.detach(a).unwrap();
        assert!(doc.is_alive(a));
        assert!(!doc.is_connected(a));
        doc.append_child(body, a).unwrap();
        assert!(doc.is_connected(a));
    }

    #[test]
    fn deep_clone_copies_attributes_and_text() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let a = div(&mut doc, body);
        doc.set_attribute(a, "Class", "card").unwrap();
        let t = doc.create_text("hi");
        doc.append_child(a, t).unwrap();

        let copy = doc.deep_clone(a).unwrap();
        assert_ne!(copy, a);
        assert_eq!(doc.attribute(copy, "class"), Some("card"));
        assert_eq!(doc.text_content(copy), "hi");
        assert!(!doc.is_connected(copy));
    }

    #[test]
    fn attribute_changes_bump_version_without_records() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        doc.take_records();
        let before = doc.version();
        doc.set_attribute(body, "data-x", "1").unwrap();
        assert!(doc.version() > before);
        assert!(doc.remove_attribute(body, "data-x").unwrap());
        assert!(!doc.remove_attribute(body, "data-x").unwrap());
        assert!(doc.take_records().is_empty());
    }
}
