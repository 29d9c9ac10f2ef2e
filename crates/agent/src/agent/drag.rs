//! Drag sessions: start, repeated moves, end.
//!
//! While dragging, the element is offset with `position: relative` and a same-sized stub marks
//! the drop position among its siblings. The element's own inline style is saved on the node and
//! restored on drop.

use super::Agent;
use crate::descriptor::ElementDescriptor;
use crate::identity::read_id;
use crate::location::{child_elements, index_in_parent};
use crate::markers::{DRAG_SAVED_STYLE, DRAG_STUB, DRAGGING, IGNORE};
use css::{Position, set_inline_style};
use html::{DomError, NodeKey};
use serde::Serialize;

pub(crate) struct DragState {
    parent: NodeKey,
    original_index: usize,
    stub: NodeKey,
    offset: (f32, f32),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragEnd {
    pub new_index: usize,
    pub child: ElementDescriptor,
    pub parent: ElementDescriptor,
}

fn px(value: f32) -> String {
    format!("{value}px")
}

impl Agent {
    /// Begin dragging `id`. Returns its index among its siblings.
    pub fn start_drag(&mut self, id: &str) -> Option<usize> {
        self.require_frame("startDrag")?;
        let key = self.resolve("startDrag", id)?;
        if let Some(state) = self.drags.get(&key) {
            return Some(state.original_index);
        }
        let Some((parent, original_index)) = index_in_parent(&self.doc, key) else {
            log::warn!("startDrag: {id:?} has no parent");
            return None;
        };
        match self.begin_drag(key) {
            Ok(stub) => {
                self.drags.insert(
                    key,
                    DragState {
                        parent,
                        original_index,
                        stub,
                        offset: (0.0, 0.0),
                    },
                );
                Some(original_index)
            }
            Err(err) => {
                Self::warn_dom("startDrag", err);
                None
            }
        }
    }

    fn begin_drag(&mut self, key: NodeKey) -> Result<NodeKey, DomError> {
        let position = self.computed(key).position();
        let rect = self.render.boxes.get(&key).copied().unwrap_or_default();

        let saved = self.doc.attribute(key, "style").unwrap_or_default().to_string();
        self.doc.set_attribute(key, DRAG_SAVED_STYLE, &saved)?;
        self.doc.set_attribute(key, DRAGGING, "true")?;
        if position == Position::Static {
            set_inline_style(&mut self.doc, key, "position", "relative")?;
        }

        let stub = self.doc.create_element("div");
        self.doc.set_attribute(stub, DRAG_STUB, "true")?;
        self.doc.set_attribute(stub, IGNORE, "true")?;
        let style = format!(
            "width: {}; height: {}; opacity: 0.4; background-color: rgba(0, 0, 0, 0.2)",
            px(rect.width),
            px(rect.height)
        );
        self.doc.set_attribute(stub, "style", &style)?;
        Ok(stub)
    }

    /// Offset the dragged element by `(dx, dy)` and move the stub to the drop position under
    /// the cursor `(x, y)`.
    pub fn drag(&mut self, id: &str, dx: f32, dy: f32, x: f32, y: f32) -> bool {
        let Some(key) = self.resolve("drag", id) else {
            return false;
        };
        let Some(state) = self.drags.get_mut(&key) else {
            log::warn!("drag: {id:?} is not being dragged");
            return false;
        };
        state.offset.0 += dx;
        state.offset.1 += dy;
        let (parent, stub, (left, top)) = (state.parent, state.stub, state.offset);

        let result = set_inline_style(&mut self.doc, key, "left", &px(left))
            .and_then(|()| set_inline_style(&mut self.doc, key, "top", &px(top)));
        if let Err(err) = result {
            Self::warn_dom("drag", err);
            return false;
        }

        let index = self.drop_index(parent, Some(key), x, y);
        let before = child_elements(&self.doc, parent)
            .into_iter()
            .filter(|k| *k != key)
            .nth(index);
        match self.doc.insert_before(parent, stub, before) {
            Ok(()) => true,
            Err(err) => {
                Self::warn_dom("drag", err);
                false
            }
        }
    }

    /// Place an absolutely positioned element at `(x, y)` within its offset parent.
    pub fn drag_absolute(&mut self, id: &str, x: f32, y: f32) -> bool {
        let Some(key) = self.resolve("dragAbsolute", id) else {
            return false;
        };
        if let Some(state) = self.drags.get_mut(&key) {
            state.offset = (x, y);
        }
        let result = set_inline_style(&mut self.doc, key, "left", &px(x))
            .and_then(|()| set_inline_style(&mut self.doc, key, "top", &px(y)));
        match result {
            Ok(()) => true,
            Err(err) => {
                Self::warn_dom("dragAbsolute", err);
                false
            }
        }
    }

    /// Drop `id` where its stub is and restore its style.
    pub fn end_drag(&mut self, id: &str) -> Option<DragEnd> {
        self.require_frame("endDrag")?;
        let key = self.resolve("endDrag", id)?;
        let Some(state) = self.drags.remove(&key) else {
            log::warn!("endDrag: {id:?} is not being dragged");
            return None;
        };
        if let Err(err) = self.finish_drag(key, &state) {
            Self::warn_dom("endDrag", err);
            return None;
        }
        let (_, new_index) = index_in_parent(&self.doc, key)?;
        let child = self.describe(key, false)?;
        let parent = self.describe(state.parent, false)?;
        Some(DragEnd {
            new_index,
            child,
            parent,
        })
    }

    fn finish_drag(&mut self, key: NodeKey, state: &DragState) -> Result<(), DomError> {
        let saved = self
            .doc
            .attribute(key, DRAG_SAVED_STYLE)
            .unwrap_or_default()
            .to_string();
        if saved.is_empty() {
            self.doc.remove_attribute(key, "style")?;
        } else {
            self.doc.set_attribute(key, "style", &saved)?;
        }
        self.doc.remove_attribute(key, DRAG_SAVED_STYLE)?;
        self.doc.remove_attribute(key, DRAGGING)?;

        if self.doc.parent(state.stub) == Some(state.parent) {
            self.doc.insert_before(state.parent, key, Some(state.stub))?;
        }
        if self.doc.is_alive(state.stub) {
            self.doc.remove(state.stub)?;
        }
        Ok(())
    }

    /// End every drag in progress and sweep stray stubs. Returns how many drags ended.
    pub fn end_all_drag(&mut self) -> usize {
        let dragging: Vec<NodeKey> = self.drags.keys().copied().collect();
        let mut ended = 0;
        for key in dragging {
            let id = read_id(&self.doc, key).map(str::to_string);
            match id {
                Some(id) if self.end_drag(&id).is_some() => ended += 1,
                _ => {
                    if let Some(state) = self.drags.remove(&key) {
                        if let Err(err) = self.finish_drag(key, &state) {
                            Self::warn_dom("endAllDrag", err);
                        }
                    }
                }
            }
        }
        let stray: Vec<NodeKey> = self
            .doc
            .descendants(self.doc.root())
            .into_iter()
            .filter(|k| self.doc.has_attribute(*k, DRAG_STUB))
            .collect();
        for stub in stray {
            if let Err(err) = self.doc.remove(stub) {
                Self::warn_dom("endAllDrag", err);
            }
        }
        ended
    }
}
