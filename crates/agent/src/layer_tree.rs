//! Layer tree builder.
//!
//! The only producer of tree shape: every snapshot, full or partial, comes from re-running
//! [`build_layer_tree`] on a subtree root. Ineligible nodes prune their whole subtree; their
//! eligible descendants are never spliced up to a grandparent.

use crate::config::AgentConfig;
use crate::identity::{ensure_id, read_id, read_instance_id, read_oid};
use crate::markers::{COMPONENT_NAME, CORE_ELEMENT_TYPE, DRAG_STUB, DYNAMIC_TYPE, IGNORE};
use core_types::{CoreElementType, DynamicType, LayerMap, LayerNode};
use css::{Display, StyleMap};
use html::{Document, DomError, NodeKey};
use std::collections::HashMap;

pub struct LayerTree {
    pub root: String,
    pub layers: LayerMap,
    /// Arena key of every layer, so removals can be reported after the node is gone.
    pub keys: HashMap<NodeKey, String>,
}

pub struct BuildContext<'a> {
    pub styles: &'a StyleMap,
    pub frame_id: &'a str,
    pub config: &'a AgentConfig,
}

/// Whether `key` is mirrored into the layer tree on its own merits. Ancestors are not
/// consulted.
pub fn is_eligible(doc: &Document, styles: &StyleMap, config: &AgentConfig, key: NodeKey) -> bool {
    let Some(tag) = doc.tag_name(key) else {
        return false;
    };
    if config.is_ignored_tag(tag)
        || doc.has_attribute(key, IGNORE)
        || doc.has_attribute(key, DRAG_STUB)
    {
        return false;
    }
    styles
        .get(&key)
        .is_some_and(|style| style.display() != Display::None)
}

/// Layers for `root` and its eligible descendants, or `None` when `root` itself is not
/// eligible.
pub fn build_layer_tree(
    doc: &mut Document,
    cx: &BuildContext<'_>,
    root: NodeKey,
) -> Result<Option<LayerTree>, DomError> {
    if !is_eligible(doc, cx.styles, cx.config, root) {
        return Ok(None);
    }
    let parent = doc
        .parent_element(root)
        .and_then(|p| read_id(doc, p))
        .map(str::to_string);
    let mut tree = LayerTree {
        root: String::new(),
        layers: LayerMap::new(),
        keys: HashMap::new(),
    };
    tree.root = visit(doc, cx, root, parent, &mut tree)?;
    Ok(Some(tree))
}

fn visit(
    doc: &mut Document,
    cx: &BuildContext<'_>,
    key: NodeKey,
    parent: Option<String>,
    tree: &mut LayerTree,
) -> Result<String, DomError> {
    let id = ensure_id(doc, key)?;
    let view: &Document = doc;
    let children: Vec<NodeKey> = view
        .element_children(key)
        .filter(|k| is_eligible(view, cx.styles, cx.config, *k))
        .collect();
    let mut child_ids = Vec::with_capacity(children.len());
    for child in children {
        child_ids.push(visit(doc, cx, child, Some(id.clone()), tree)?);
    }

    let node = LayerNode {
        dom_id: id.clone(),
        oid: read_oid(doc, key).map(str::to_string),
        instance_id: read_instance_id(doc, key).map(str::to_string),
        frame_id: cx.frame_id.to_string(),
        tag_name: doc.tag_name(key).unwrap_or_default().to_string(),
        text_content: text_preview(doc, key, cx.config.text_preview_len),
        is_visible: cx.styles.get(&key).is_some_and(|s| s.is_visible()),
        component: doc.attribute(key, COMPONENT_NAME).map(str::to_string),
        parent,
        children: Some(child_ids),
        dynamic_type: doc.attribute(key, DYNAMIC_TYPE).and_then(parse_dynamic_type),
        core_element_type: doc
            .attribute(key, CORE_ELEMENT_TYPE)
            .and_then(parse_core_element_type),
    };
    tree.keys.insert(key, id.clone());
    tree.layers.insert(id.clone(), node);
    Ok(id)
}

/// Direct text children only, trimmed and capped at `max_chars`.
pub fn text_preview(doc: &Document, key: NodeKey, max_chars: usize) -> String {
    let direct: String = doc
        .children(key)
        .iter()
        .filter_map(|k| doc.text(*k))
        .collect();
    direct.trim().chars().take(max_chars).collect()
}

fn parse_dynamic_type(value: &str) -> Option<DynamicType> {
    match value {
        "array" => Some(DynamicType::Array),
        "conditional" => Some(DynamicType::Conditional),
        "unknown" => Some(DynamicType::Unknown),
        _ => None,
    }
}

fn parse_core_element_type(value: &str) -> Option<CoreElementType> {
    match value {
        "component-root" => Some(CoreElementType::ComponentRoot),
        "body-tag" => Some(CoreElementType::BodyTag),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use css::compute_styles;

    fn el(doc: &mut Document, parent: NodeKey, tag: &str) -> NodeKey {
        let key = doc.create_element(tag);
        doc.append_child(parent, key).unwrap();
        key
    }

    fn build(doc: &mut Document, root: NodeKey) -> Option<LayerTree> {
        let styles = compute_styles(doc);
        let config = AgentConfig::default();
        let cx = BuildContext {
            styles: &styles,
            frame_id: "f1",
            config: &config,
        };
        build_layer_tree(doc, &cx, root).unwrap()
    }

    #[test]
    fn ineligible_subtree_is_pruned_not_spliced() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let a = el(&mut doc, body, "div");
        let hidden = el(&mut doc, body, "div");
        doc.set_attribute(hidden, "style", "display: none").unwrap();
        let grandchild = el(&mut doc, hidden, "p");
        let script = el(&mut doc, body, "script");
        let b = el(&mut doc, body, "section");

        let tree = build(&mut doc, body).unwrap();
        let body_id = read_id(&doc, body).unwrap().to_string();
        let a_id = read_id(&doc, a).unwrap().to_string();
        let b_id = read_id(&doc, b).unwrap().to_string();
        assert_eq!(tree.root, body_id);
        assert_eq!(
            tree.layers[&body_id].children.as_deref(),
            Some(&[a_id.clone(), b_id][..])
        );
        assert_eq!(tree.layers[&a_id].parent.as_deref(), Some(body_id.as_str()));
        assert_eq!(tree.layers.len(), 3);
        for key in [hidden, grandchild, script] {
            assert_eq!(read_id(&doc, key), None);
        }
    }

    #[test]
    fn ignored_root_yields_none() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let skipped = el(&mut doc, body, "div");
        doc.set_attribute(skipped, IGNORE, "true").unwrap();
        assert!(build(&mut doc, skipped).is_none());
        let head = doc.head().unwrap();
        assert!(build(&mut doc, head).is_none());
    }

    #[test]
    fn preview_uses_direct_text_only() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let p = el(&mut doc, body, "p");
        let t = doc.create_text("  Hello ");
        doc.append_child(p, t).unwrap();
        let b = el(&mut doc, p, "b");
        let inner = doc.create_text("nested");
        doc.append_child(b, inner).unwrap();
        let t2 = doc.create_text("world  ");
        doc.append_child(p, t2).unwrap();
        assert_eq!(text_preview(&doc, p, 50), "Hello world");
        assert_eq!(text_preview(&doc, p, 4), "Hell");
    }

    #[test]
    fn layer_carries_metadata() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let card = el(&mut doc, body, "div");
        doc.set_attribute(card, "data-oid", "o1").unwrap();
        doc.set_attribute(card, COMPONENT_NAME, "Card").unwrap();
        doc.set_attribute(card, DYNAMIC_TYPE, "array").unwrap();
        doc.set_attribute(card, "style", "visibility: hidden").unwrap();
        let tree = build(&mut doc, card).unwrap();
        let layer = &tree.layers[&tree.root];
        assert_eq!(layer.oid.as_deref(), Some("o1"));
        assert_eq!(layer.component.as_deref(), Some("Card"));
        assert_eq!(layer.dynamic_type, Some(DynamicType::Array));
        assert_eq!(layer.frame_id, "f1");
        assert!(!layer.is_visible);
        assert_eq!(layer.parent, None);
        assert_eq!(tree.keys[&card], tree.root);
    }
}
