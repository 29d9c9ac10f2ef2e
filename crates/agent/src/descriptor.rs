//! Point-in-time descriptions of live nodes returned to the host.

use crate::identity::{read_id, read_instance_id, read_oid};
use core_types::{FrameId, LayerMap};
use css::{ComputedStyle, inline_declarations, to_js_property};
use html::{Document, NodeKey};
use layout::Rect;
use serde::Serialize;
use std::collections::BTreeMap;

/// Defaults every element reports before inline and managed values are layered on.
const DEFINED_BASELINE: &[(&str, &str)] = &[("width", "auto"), ("height", "auto")];

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementDescriptor {
    pub dom_id: String,
    pub oid: Option<String>,
    pub frame_id: FrameId,
    pub instance_id: Option<String>,
    pub rect: Rect,
    pub tag_name: String,
    pub parent: Option<ParentDescriptor>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub styles: Option<StyleFacts>,
}

/// Shallow: never recurses further up.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentDescriptor {
    pub dom_id: String,
    pub frame_id: FrameId,
    pub oid: Option<String>,
    pub instance_id: Option<String>,
    pub rect: Rect,
}

/// Result of a mutation: the touched element, plus a fresh snapshot when structure changed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementUpdate {
    pub element: ElementDescriptor,
    pub layer_map: Option<LayerMap>,
}

/// camelCase property maps.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct StyleFacts {
    pub defined: BTreeMap<String, String>,
    pub computed: BTreeMap<String, String>,
}

pub fn parent_descriptor(
    doc: &Document,
    key: NodeKey,
    frame_id: &str,
    rect: Rect,
) -> Option<ParentDescriptor> {
    Some(ParentDescriptor {
        dom_id: read_id(doc, key)?.to_string(),
        frame_id: frame_id.to_string(),
        oid: read_oid(doc, key).map(str::to_string),
        instance_id: read_instance_id(doc, key).map(str::to_string),
        rect,
    })
}

/// Baseline, then inline, then managed-rule values; later layers win.
pub fn style_facts(
    doc: &Document,
    key: NodeKey,
    computed: &ComputedStyle,
    managed: BTreeMap<String, String>,
) -> StyleFacts {
    let mut defined: BTreeMap<String, String> = DEFINED_BASELINE
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    for d in inline_declarations(doc, key) {
        defined.insert(to_js_property(&d.name), d.value);
    }
    defined.extend(managed);

    let computed = computed
        .properties()
        .iter()
        .map(|(k, v)| (to_js_property(k), v.clone()))
        .collect();
    StyleFacts { defined, computed }
}

#[cfg(test)]
mod tests {
    use super::*;
    use css::compute_style;

    #[test]
    fn managed_values_override_inline_and_baseline() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        let div = doc.create_element("div");
        doc.append_child(body, div).unwrap();
        doc.set_attribute(div, "style", "width: 10px; background-color: red")
            .unwrap();
        let managed = BTreeMap::from([("backgroundColor".to_string(), "blue".to_string())]);
        let facts = style_facts(&doc, div, &compute_style("div", &[], None), managed);
        assert_eq!(facts.defined["width"], "10px");
        assert_eq!(facts.defined["height"], "auto");
        assert_eq!(facts.defined["backgroundColor"], "blue");
        assert_eq!(facts.computed["display"], "block");
        assert!(facts.computed.contains_key("flexDirection"));
    }

    #[test]
    fn parent_descriptor_requires_runtime_id() {
        let mut doc = Document::new();
        let body = doc.body().unwrap();
        assert!(parent_descriptor(&doc, body, "f", Rect::default()).is_none());
        doc.set_attribute(body, "data-odid", "b1").unwrap();
        let parent = parent_descriptor(&doc, body, "f", Rect::default()).unwrap();
        assert_eq!(parent.dom_id, "b1");
    }
}
