use super::Agent;
use crate::identity::{find_by_id, read_id, read_oid};
use crate::markers::{DRAG_STUB, IGNORE, INSERTED};
use crate::observer::{Delta, find_provisional, reconcile};
use crate::publish::Due;
use bus::AgentEvent;
use core_types::{LayerMap, Viewport};
use html::NodeKey;
use std::time::Instant;
use url::Url;

impl Agent {
    /// Drain pending structural changes and report them as one `windowMutated` batch.
    /// Returns whether anything was reported.
    pub fn observe(&mut self) -> bool {
        let records = self.doc.take_records();
        if records.is_empty() {
            return false;
        }
        if self.require_frame("observe").is_none() {
            return false;
        }

        let mut parents: Vec<NodeKey> = Vec::new();
        let mut removed_keys: Vec<NodeKey> = Vec::new();
        for record in records {
            // only nodes the host was told about count as removals
            let mut touched = record
                .removed
                .iter()
                .any(|key| self.layer_keys.contains_key(key));
            removed_keys.extend(record.removed);
            for key in record.added {
                if !self.doc.is_element(key) || !self.doc.is_connected(key) {
                    continue;
                }
                if self.is_agent_write(key) {
                    continue;
                }
                if let Some(parent) = self.adopt_provisional(key) {
                    push_unique(&mut parents, parent);
                    touched = true;
                } else if self.eligible(key) {
                    touched = true;
                }
            }
            if touched {
                push_unique(&mut parents, record.target);
            }
        }
        // reconciliation removes provisional nodes; those removals are already accounted for
        self.doc.take_records();

        let mut delta = Delta::default();
        for key in removed_keys {
            self.collect_removed(key, &mut delta.removed);
        }
        for parent in parents {
            if !self.doc.is_element(parent)
                || !self.doc.is_connected(parent)
                || !self.eligible(parent)
            {
                continue;
            }
            if let Some(tree) = self.snapshot(parent) {
                delta.added.extend(tree.layers);
            }
        }
        delta.removed.retain(|id, _| !delta.added.contains_key(id));
        for id in delta.removed.keys() {
            self.layers.remove(id);
        }
        self.layer_keys
            .retain(|_, id| !delta.removed.contains_key(id.as_str()));

        if delta.is_empty() {
            return false;
        }
        log::debug!(
            "windowMutated: {} added, {} removed",
            delta.added.len(),
            delta.removed.len()
        );
        self.events.publish(AgentEvent::WindowMutated {
            added: delta.added,
            removed: delta.removed,
        })
    }

    /// Provisional inserts, drag stubs, ignored nodes, and anything beneath them.
    fn is_agent_write(&self, key: NodeKey) -> bool {
        let mut current = Some(key);
        while let Some(node) = current {
            if [INSERTED, DRAG_STUB, IGNORE]
                .iter()
                .any(|marker| self.doc.has_attribute(node, marker))
            {
                return true;
            }
            current = self.doc.parent_element(node);
        }
        false
    }

    /// If `rendered` is the page's own render of a provisional insert, take over the
    /// provisional node's identity. Returns the provisional node's former parent.
    fn adopt_provisional(&mut self, rendered: NodeKey) -> Option<NodeKey> {
        let oid = read_oid(&self.doc, rendered)?.to_string();
        let provisional = find_provisional(&self.doc, &oid, rendered)?;
        let parent = self.doc.parent(provisional);
        if let Some(id) = read_id(&self.doc, provisional) {
            self.layer_keys.insert(rendered, id.to_string());
        }
        match reconcile(&mut self.doc, provisional, rendered) {
            Ok(_) => parent,
            Err(err) => {
                Self::warn_dom("observe", err);
                None
            }
        }
    }

    /// Move the reported layers of a node that left the tree (and of its reported
    /// descendants) into `removed`.
    fn collect_removed(&mut self, key: NodeKey, removed: &mut LayerMap) {
        if self.doc.is_connected(key) {
            return;
        }
        let id = match read_id(&self.doc, key) {
            Some(id) => id.to_string(),
            None => match self.layer_keys.get(&key) {
                Some(id) => id.clone(),
                None => return,
            },
        };
        // identity now lives on another connected node
        if find_by_id(&self.doc, &id).is_some() {
            return;
        }
        let mut stack = vec![id];
        while let Some(id) = stack.pop() {
            let Some(layer) = self.layers.get(&id) else {
                continue;
            };
            stack.extend(layer.children.iter().flatten().cloned());
            removed.insert(id, layer.clone());
        }
    }

    /// Drive time-based work: observation, the debounced full publish, and the catch-up loop.
    pub fn tick(&mut self, now: Instant) {
        if self.observe() {
            self.schedule.request(now);
        }
        match self.schedule.poll(now) {
            Some(Due::Debounced) => {
                self.publish_tree(None);
            }
            Some(Due::CatchUp) => {
                if !self.publish_tree(None) {
                    log::debug!("catch-up publish did not land");
                }
            }
            None => {}
        }
    }

    pub fn resize(&mut self, width: f32, height: f32) -> bool {
        if !(width.is_finite() && height.is_finite()) || width < 0.0 || height < 0.0 {
            log::warn!("resize: invalid viewport {width}x{height}");
            return false;
        }
        self.viewport = Viewport { width, height };
        self.events.publish(AgentEvent::WindowResized)
    }

    /// The page navigated: report it and start over with first-publish catch-up.
    pub fn notify_navigated(&mut self, url: &str, now: Instant) -> bool {
        let url = match Url::parse(url) {
            Ok(url) => url,
            Err(err) => {
                log::warn!("navigated: invalid url {url:?}: {err}");
                return false;
            }
        };
        self.layers.clear();
        self.layer_keys.clear();
        self.drags.clear();
        self.schedule.reset(now);
        self.events.publish(AgentEvent::Navigated {
            url: url.to_string(),
        })
    }
}

fn push_unique(list: &mut Vec<NodeKey>, key: NodeKey) {
    if !list.contains(&key) {
        list.push(key);
    }
}
