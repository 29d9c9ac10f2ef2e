use crate::FrameId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Structural role the host recognizes on a layer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DynamicType {
    Array,
    Conditional,
    Unknown,
}

/// Semantic role of a layer within its component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CoreElementType {
    ComponentRoot,
    BodyTag,
}

/// Serializable mirror of one eligible element.
///
/// `children` order matches live order at capture time, and `parent` agrees with the parent's
/// `children`. Layers are replaced wholesale on every resync.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerNode {
    pub dom_id: String,
    pub oid: Option<String>,
    pub instance_id: Option<String>,
    pub frame_id: FrameId,
    pub tag_name: String,
    pub text_content: String,
    pub is_visible: bool,
    pub component: Option<String>,
    pub parent: Option<String>,
    pub children: Option<Vec<String>>,
    pub dynamic_type: Option<DynamicType>,
    pub core_element_type: Option<CoreElementType>,
}

/// Layers keyed by runtime id.
pub type LayerMap = HashMap<String, LayerNode>;
