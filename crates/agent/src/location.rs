//! Logical addresses of mutation targets.
//!
//! Positions count element children of the target, skipping drag stubs. Hidden (removed) nodes
//! still count, so a location computed before a remove stays valid for undo.

use crate::identity::{ensure_id, find_by_id};
use crate::markers::DRAG_STUB;
use html::{Document, DomError, NodeKey};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ActionLocation {
    Append {
        target_id: String,
    },
    Prepend {
        target_id: String,
    },
    Index {
        target_id: String,
        index: usize,
        /// Index when the location was computed; `index` is the one replayed.
        original_index: usize,
    },
}

impl ActionLocation {
    pub fn target_id(&self) -> &str {
        match self {
            ActionLocation::Append { target_id }
            | ActionLocation::Prepend { target_id }
            | ActionLocation::Index { target_id, .. } => target_id,
        }
    }

    pub fn at(target_id: impl Into<String>, index: usize) -> Self {
        ActionLocation::Index {
            target_id: target_id.into(),
            index,
            original_index: index,
        }
    }
}

/// One element addressed by id within a frame.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionTarget {
    pub dom_id: String,
    #[serde(default)]
    pub oid: Option<String>,
    #[serde(default)]
    pub frame_id: Option<String>,
}

/// Element children that count as positions.
pub fn child_elements(doc: &Document, parent: NodeKey) -> Vec<NodeKey> {
    doc.element_children(parent)
        .filter(|k| !doc.has_attribute(*k, DRAG_STUB))
        .collect()
}

pub fn index_in_parent(doc: &Document, key: NodeKey) -> Option<(NodeKey, usize)> {
    let parent = doc.parent_element(key)?;
    let index = child_elements(doc, parent).iter().position(|k| *k == key)?;
    Some((parent, index))
}

/// `key`'s current position as an index location. Assigns the parent an id if needed.
pub fn element_location(
    doc: &mut Document,
    key: NodeKey,
) -> Result<Option<ActionLocation>, DomError> {
    let Some((parent, index)) = index_in_parent(doc, key) else {
        return Ok(None);
    };
    let target_id = ensure_id(doc, parent)?;
    Ok(Some(ActionLocation::at(target_id, index)))
}

/// The existing child a location points at: last for append, first for prepend.
/// An out-of-range index resolves to nothing.
pub fn resolve_child(doc: &Document, location: &ActionLocation) -> Option<NodeKey> {
    let parent = find_by_id(doc, location.target_id())?;
    let children = child_elements(doc, parent);
    match location {
        ActionLocation::Append { .. } => children.last().copied(),
        ActionLocation::Prepend { .. } => children.first().copied(),
        ActionLocation::Index { index, .. } => children.get(*index).copied(),
    }
}

/// Where a new child goes: `(parent, before)`, with `before == None` meaning append.
/// An index past the end clamps to append.
pub fn resolve_insertion(
    doc: &Document,
    location: &ActionLocation,
) -> Option<(NodeKey, Option<NodeKey>)> {
    let parent = find_by_id(doc, location.target_id())?;
    let children = child_elements(doc, parent);
    let before = match location {
        ActionLocation::Append { .. } => None,
        ActionLocation::Prepend { .. } => children.first().copied(),
        ActionLocation::Index { index, .. } => children.get(*index).copied(),
    };
    Some((parent, before))
}
