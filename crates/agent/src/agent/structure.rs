use super::Agent;
use crate::descriptor::ElementUpdate;
use crate::identity::{ensure_id, find_by_id, strip_identity};
use crate::location::{
    ActionLocation, ActionTarget, child_elements, index_in_parent, resolve_child, resolve_insertion,
};
use crate::markers::{INSERTED, REMOVED};
use crate::template::{ActionElement, GroupContainer, build_container, build_element};
use css::set_inline_style;
use html::{DomError, NodeKey};

impl Agent {
    /// Create `element` at `location`. An index past the end appends.
    pub fn insert_element(
        &mut self,
        element: &ActionElement,
        location: &ActionLocation,
    ) -> Option<ElementUpdate> {
        self.require_frame("insertElement")?;
        let Some((parent, before)) = resolve_insertion(&self.doc, location) else {
            log::warn!("insertElement: no target {:?}", location.target_id());
            return None;
        };
        let key = match self.splice_new(element, parent, before) {
            Ok(key) => key,
            Err(err) => {
                Self::warn_dom("insertElement", err);
                return None;
            }
        };
        self.update(key, Some(key), false)
    }

    fn splice_new(
        &mut self,
        element: &ActionElement,
        parent: NodeKey,
        before: Option<NodeKey>,
    ) -> Result<NodeKey, DomError> {
        let key = build_element(&mut self.doc, element)?;
        self.doc.set_attribute(key, INSERTED, "true")?;
        ensure_id(&mut self.doc, key)?;
        self.doc.insert_before(parent, key, before)?;
        Ok(key)
    }

    /// Hide the child `location` points at. The node stays in place until reaped.
    pub fn remove_element(&mut self, location: &ActionLocation) -> Option<ElementUpdate> {
        self.require_frame("removeElement")?;
        let Some(key) = resolve_child(&self.doc, location) else {
            log::warn!("removeElement: nothing at {location:?}");
            return None;
        };
        if let Err(err) = self.hide(key) {
            Self::warn_dom("removeElement", err);
            return None;
        }
        let parent = self.doc.parent_element(key);
        self.update(key, parent, false)
    }

    pub(super) fn hide(&mut self, key: NodeKey) -> Result<(), DomError> {
        set_inline_style(&mut self.doc, key, "display", "none")?;
        self.doc.set_attribute(key, REMOVED, "true")
    }

    /// Move `id` to `new_index` among its siblings; past the end appends.
    pub fn move_element(&mut self, id: &str, new_index: usize) -> Option<ElementUpdate> {
        self.require_frame("moveElement")?;
        let key = self.resolve("moveElement", id)?;
        let Some(parent) = self.doc.parent_element(key) else {
            log::warn!("moveElement: {id:?} has no parent");
            return None;
        };
        let before = child_elements(&self.doc, parent)
            .into_iter()
            .filter(|k| *k != key)
            .nth(new_index);
        if let Err(err) = self.doc.insert_before(parent, key, before) {
            Self::warn_dom("moveElement", err);
            return None;
        }
        self.update(key, Some(parent), false)
    }

    /// Wrap `children` of `parent` in a new provisional container placed where the earliest
    /// child was. Children are cloned into the container; the originals are hidden.
    pub fn group_elements(
        &mut self,
        parent: &ActionTarget,
        container: &GroupContainer,
        children: &[ActionTarget],
    ) -> Option<ElementUpdate> {
        self.require_frame("groupElements")?;
        let parent_key = self.resolve("groupElements", &parent.dom_id)?;
        let mut selected: Vec<(usize, NodeKey)> = children
            .iter()
            .filter_map(|t| find_by_id(&self.doc, &t.dom_id))
            .filter_map(|k| match index_in_parent(&self.doc, k) {
                Some((p, i)) if p == parent_key => Some((i, k)),
                _ => None,
            })
            .collect();
        if selected.is_empty() {
            log::warn!("groupElements: no live children of {:?} selected", parent.dom_id);
            return None;
        }
        selected.sort_unstable();
        selected.dedup();

        match self.wrap(parent_key, container, &selected) {
            Ok(key) => self.update(key, Some(parent_key), false),
            Err(err) => {
                Self::warn_dom("groupElements", err);
                None
            }
        }
    }

    fn wrap(
        &mut self,
        parent: NodeKey,
        container: &GroupContainer,
        selected: &[(usize, NodeKey)],
    ) -> Result<NodeKey, DomError> {
        let key = build_container(&mut self.doc, container)?;
        let first = selected.first().map(|(_, k)| *k);
        self.doc.insert_before(parent, key, first)?;
        for (_, original) in selected {
            let copy = self.doc.deep_clone(*original)?;
            strip_identity(&mut self.doc, copy)?;
            self.doc.append_child(key, copy)?;
            self.hide(*original)?;
        }
        Ok(key)
    }

    /// Lift the container's children into `parent` at the container's position, in order, and
    /// delete the container.
    pub fn ungroup_elements(
        &mut self,
        parent: &ActionTarget,
        container: &ActionTarget,
    ) -> Option<ElementUpdate> {
        self.require_frame("ungroupElements")?;
        let parent_key = self.resolve("ungroupElements", &parent.dom_id)?;
        let container_key = self.resolve("ungroupElements", &container.dom_id)?;
        if self.doc.parent(container_key) != Some(parent_key) {
            log::warn!(
                "ungroupElements: {:?} is not a child of {:?}",
                container.dom_id,
                parent.dom_id
            );
            return None;
        }
        if let Err(err) = self.unwrap_container(parent_key, container_key) {
            Self::warn_dom("ungroupElements", err);
            return None;
        }
        self.update(parent_key, Some(parent_key), false)
    }

    fn unwrap_container(&mut self, parent: NodeKey, container: NodeKey) -> Result<(), DomError> {
        let children = self.doc.children(container).to_vec();
        for child in children {
            self.doc.insert_before(parent, child, Some(container))?;
        }
        self.doc.remove(container)
    }
}
