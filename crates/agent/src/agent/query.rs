use super::Agent;
use crate::descriptor::ElementDescriptor;
use crate::identity::ensure_id;
use crate::markers::REMOVED;
use crate::location::{ActionLocation, child_elements, element_location};
use crate::theme;
use bus::AgentEvent;
use core_types::Theme;
use css::{Position, to_js_property};
use html::{NodeKey, is_void_element};
use layout::{Direction, Rect, grid_insertion_index, hit_test, insertion_index, layout_direction};
use std::collections::BTreeMap;

/// Containers that hold text runs and never take dropped children directly.
const TEXT_CONTAINERS: &[&str] = &[
    "a", "b", "button", "em", "h1", "h2", "h3", "h4", "h5", "h6", "i", "label", "p", "small",
    "span", "strong",
];

impl Agent {
    /// Full rebuild of the layer tree under `root` (the body when absent) and publish it.
    /// A full rebuild first reaps nodes hidden by earlier removes.
    pub fn process_dom(&mut self, root: Option<&str>) -> bool {
        if root.is_none() {
            self.commit_removals();
        }
        self.publish_tree(root)
    }

    pub(super) fn publish_tree(&mut self, root: Option<&str>) -> bool {
        let Some(frame_id) = self.require_frame("processDom") else {
            return false;
        };
        let root_key = match root {
            Some(id) => self.resolve("processDom", id),
            None => self.doc.body(),
        };
        let Some(root_key) = root_key else {
            return false;
        };
        let full = root.is_none();
        let Some(tree) = self.snapshot(root_key) else {
            log::warn!("processDom: root is not eligible");
            return false;
        };
        if full {
            self.layers = tree.layers.clone();
            self.layer_keys = tree.keys;
        }
        let published = self.events.publish(AgentEvent::DomProcessed {
            frame_id,
            layer_map: tree.layers,
            root_node: tree.root,
        });
        if published {
            self.schedule.mark_published();
        }
        published
    }

    /// Physically delete nodes hidden by remove/group. Returns how many were reaped.
    pub fn commit_removals(&mut self) -> usize {
        let hidden: Vec<NodeKey> = self
            .doc
            .descendants(self.doc.root())
            .into_iter()
            .filter(|k| self.doc.has_attribute(*k, REMOVED))
            .collect();
        let mut reaped = 0;
        for key in hidden {
            // an ancestor may already have taken it
            if !self.doc.is_alive(key) {
                continue;
            }
            match self.doc.remove(key) {
                Ok(()) => reaped += 1,
                Err(err) => Self::warn_dom("commitRemovals", err),
            }
        }
        if reaped > 0 {
            log::debug!("reaped {reaped} hidden nodes");
        }
        reaped
    }

    fn eligible_at(&mut self, x: f32, y: f32) -> Option<NodeKey> {
        self.refresh_render();
        let mut current = hit_test(&self.doc, &self.render.boxes, (x, y));
        while let Some(key) = current {
            if self.eligible(key) {
                return Some(key);
            }
            current = self.doc.parent_element(key);
        }
        None
    }

    pub fn get_element_at_location(
        &mut self,
        x: f32,
        y: f32,
        want_style: bool,
    ) -> Option<ElementDescriptor> {
        self.require_frame("getElementAtLocation")?;
        let Some(key) = self.eligible_at(x, y) else {
            log::warn!("getElementAtLocation: nothing at ({x}, {y})");
            return None;
        };
        self.describe(key, want_style)
    }

    pub fn get_element_by_id(&mut self, id: &str, want_style: bool) -> Option<ElementDescriptor> {
        let key = self.resolve("getElementById", id)?;
        self.describe(key, want_style)
    }

    pub fn get_parent(&mut self, id: &str) -> Option<ElementDescriptor> {
        let key = self.resolve("getParent", id)?;
        let parent = self.doc.parent_element(key)?;
        self.describe(parent, false)
    }

    /// Element children, drag stubs excluded.
    pub fn get_child_count(&mut self, id: &str) -> Option<usize> {
        let key = self.resolve("getChildCount", id)?;
        Some(child_elements(&self.doc, key).len())
    }

    /// Nearest positioned ancestor, or the body.
    pub fn get_offset_parent(&mut self, id: &str) -> Option<ElementDescriptor> {
        let key = self.resolve("getOffsetParent", id)?;
        let body = self.doc.body();
        let mut current = self.doc.parent_element(key);
        while let Some(ancestor) = current {
            if Some(ancestor) == body || self.computed(ancestor).position() != Position::Static {
                return self.describe(ancestor, false);
            }
            current = self.doc.parent_element(ancestor);
        }
        let body = body?;
        self.describe(body, false)
    }

    pub fn get_element_location(&mut self, id: &str) -> Option<ActionLocation> {
        let key = self.resolve("getElementLocation", id)?;
        match element_location(&mut self.doc, key) {
            Ok(location) => location,
            Err(err) => {
                Self::warn_dom("getElementLocation", err);
                None
            }
        }
    }

    /// Where a drop at `(x, y)` would land.
    pub fn get_insert_location(&mut self, x: f32, y: f32) -> Option<ActionLocation> {
        self.require_frame("getInsertLocation")?;
        let mut container = self.eligible_at(x, y)?;
        while !self.accepts_children(container) {
            match self.doc.parent_element(container) {
                Some(parent) => container = parent,
                None => break,
            }
        }
        let target_id = match ensure_id(&mut self.doc, container) {
            Ok(id) => id,
            Err(err) => {
                Self::warn_dom("getInsertLocation", err);
                return None;
            }
        };
        if !self.computed(container).display().is_multi_axis() {
            return Some(ActionLocation::Append { target_id });
        }
        let index = self.drop_index(container, None, x, y);
        Some(ActionLocation::at(target_id, index))
    }

    fn accepts_children(&mut self, key: NodeKey) -> bool {
        let tag = self.doc.tag_name(key).unwrap_or_default();
        if Some(key) == self.doc.body() {
            return true;
        }
        if is_void_element(tag) || TEXT_CONTAINERS.contains(&tag) {
            return false;
        }
        let display = self.computed(key).display();
        display.is_multi_axis() || !display.is_inline_level()
    }

    /// Position among `container`'s element children where a drop at `(x, y)` lands.
    /// Siblings without a box and `exclude` are not considered, but the returned index counts
    /// every position.
    pub(super) fn drop_index(
        &mut self,
        container: NodeKey,
        exclude: Option<NodeKey>,
        x: f32,
        y: f32,
    ) -> usize {
        let style = self.computed(container);
        self.refresh_render();
        let positions: Vec<NodeKey> = child_elements(&self.doc, container)
            .into_iter()
            .filter(|k| Some(*k) != exclude)
            .collect();
        let boxes = &self.render.boxes;
        let placed: Vec<(usize, Rect)> = positions
            .iter()
            .enumerate()
            .filter_map(|(i, k)| boxes.get(k).map(|r| (i, *r)))
            .collect();
        let rects: Vec<Rect> = placed.iter().map(|(_, r)| *r).collect();

        let visible_index = if style.display().is_grid() {
            let container_rect = boxes.get(&container).copied().unwrap_or_default();
            grid_insertion_index(
                container_rect,
                style.grid_columns(),
                style.grid_rows(),
                rects.len(),
                x,
                y,
            )
        } else {
            let direction = if style.display().is_flex() {
                layout_direction(&rects)
            } else {
                Direction::Vertical
            };
            insertion_index(&rects, x, y, direction)
        };
        placed
            .get(visible_index)
            .map_or(positions.len(), |(i, _)| *i)
    }

    /// Resolved style as a camelCase map.
    pub fn get_computed_style(&mut self, id: &str) -> Option<BTreeMap<String, String>> {
        let key = self.resolve("getComputedStyle", id)?;
        let computed = self.computed(key);
        Some(
            computed
                .properties()
                .iter()
                .map(|(k, v)| (to_js_property(k), v.clone()))
                .collect(),
        )
    }

    pub fn get_theme(&self) -> Theme {
        theme::get_theme(&self.doc)
    }

    pub fn set_theme(&mut self, theme: Theme) -> bool {
        match theme::set_theme(&mut self.doc, theme) {
            Ok(()) => true,
            Err(err) => {
                Self::warn_dom("setTheme", err);
                false
            }
        }
    }
}
