//! The agent: one live document, its managed stylesheet, and the host-facing operations.
//!
//! Invariants:
//! - The agent owns the only `ManagedStylesheet` for its document; nothing else writes it.
//! - `render` is derived from `doc` and is recomputed whenever `doc.version()` moves or the
//!   viewport changes. Nothing keeps boxes or styles across a mutation.
//! - `layers` mirrors what was last reported to the host (full publishes plus snapshots and
//!   deltas). It is used only to describe removals; tree shape always comes from a rebuild.
//! - Operations never panic or return errors across this boundary: unresolvable targets log a
//!   warning and yield `None` / `false`.

use crate::config::AgentConfig;
use crate::descriptor::{ElementDescriptor, ElementUpdate, parent_descriptor, style_facts};
use crate::identity::{ensure_id, find_by_id, read_instance_id, read_oid, selector_for};
use crate::layer_tree::{BuildContext, LayerTree, build_layer_tree, is_eligible};
use crate::publish::PublishSchedule;
use bus::EventSender;
use core_types::{FrameId, LayerMap, Viewport};
use css::{ComputedStyle, ManagedStylesheet, StyleMap, compute_styles};
use html::{Document, DomError, NodeKey};
use layout::{LayoutMap, layout_document};
use std::collections::HashMap;
use std::time::Instant;

mod drag;
mod observe;
mod query;
mod structure;
mod style;
mod text;

pub use drag::DragEnd;
pub use style::{StyleChange, StyleChangeKind};
pub use text::{TextEditStart, TextEditStop};

use drag::DragState;

struct Render {
    version: Option<u64>,
    viewport: Viewport,
    styles: StyleMap,
    boxes: LayoutMap,
}

pub struct Agent {
    doc: Document,
    config: AgentConfig,
    frame_id: Option<FrameId>,
    viewport: Viewport,

    stylesheet: ManagedStylesheet,
    render: Render,

    layers: LayerMap,
    layer_keys: HashMap<NodeKey, String>,

    schedule: PublishSchedule,
    events: EventSender,
    drags: HashMap<NodeKey, DragState>,
}

impl Agent {
    pub fn new(doc: Document, config: AgentConfig, events: EventSender) -> Self {
        let viewport = config.viewport;
        let schedule = PublishSchedule::new(&config);
        Agent {
            doc,
            config,
            frame_id: None,
            viewport,
            stylesheet: ManagedStylesheet::new(),
            render: Render {
                version: None,
                viewport,
                styles: StyleMap::new(),
                boxes: LayoutMap::new(),
            },
            layers: LayerMap::new(),
            layer_keys: HashMap::new(),
            schedule,
            events,
            drags: HashMap::new(),
        }
    }

    // --- Setup ---
    pub fn set_frame_id(&mut self, frame_id: impl Into<FrameId>) {
        self.frame_id = Some(frame_id.into());
    }

    /// Arm the first-publish catch-up loop.
    pub fn start(&mut self, now: Instant) {
        self.schedule.start(now);
    }

    pub fn frame_id(&self) -> Option<&str> {
        self.frame_id.as_deref()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn document(&self) -> &Document {
        &self.doc
    }

    /// Page-code access. Changes made here are picked up by the next `observe`.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.doc
    }

    /// Layers as last reported to the host.
    pub fn layers(&self) -> &LayerMap {
        &self.layers
    }

    pub fn managed_css(&self) -> String {
        self.stylesheet.css_text()
    }

    // --- Shared helpers ---

    fn require_frame(&self, op: &str) -> Option<FrameId> {
        if self.frame_id.is_none() {
            log::warn!("{op}: no frame id yet, ignoring");
        }
        self.frame_id.clone()
    }

    fn resolve(&self, op: &str, id: &str) -> Option<NodeKey> {
        let key = find_by_id(&self.doc, id);
        if key.is_none() {
            log::warn!("{op}: no element with id {id:?}");
        }
        key
    }

    fn refresh_render(&mut self) {
        let version = self.doc.version();
        if self.render.version == Some(version) && self.render.viewport == self.viewport {
            return;
        }
        let styles = compute_styles(&self.doc);
        let boxes = layout_document(&self.doc, &styles, self.viewport);
        self.render = Render {
            version: Some(version),
            viewport: self.viewport,
            styles,
            boxes,
        };
    }

    fn computed(&mut self, key: NodeKey) -> ComputedStyle {
        self.refresh_render();
        self.render
            .styles
            .get(&key)
            .cloned()
            .unwrap_or_else(ComputedStyle::initial)
    }

    fn eligible(&mut self, key: NodeKey) -> bool {
        self.refresh_render();
        is_eligible(&self.doc, &self.render.styles, &self.config, key)
    }

    fn warn_dom(op: &str, err: DomError) {
        log::warn!("{op}: {err}");
    }

    /// Fresh descriptor of `key`. Assigns ids to `key` and its parent element as needed.
    fn describe(&mut self, key: NodeKey, want_style: bool) -> Option<ElementDescriptor> {
        let frame_id = self.require_frame("describe")?;
        let dom_id = match ensure_id(&mut self.doc, key) {
            Ok(id) => id,
            Err(err) => {
                Self::warn_dom("describe", err);
                return None;
            }
        };
        let parent = self.doc.parent_element(key);
        if let Some(parent) = parent {
            ensure_id(&mut self.doc, parent).ok()?;
        }
        self.refresh_render();

        let boxes = &self.render.boxes;
        let rect = boxes.get(&key).copied().unwrap_or_default();
        let parent = parent.and_then(|p| {
            let rect = boxes.get(&p).copied().unwrap_or_default();
            parent_descriptor(&self.doc, p, &frame_id, rect)
        });
        let styles = want_style.then(|| {
            let computed = self
                .render
                .styles
                .get(&key)
                .cloned()
                .unwrap_or_else(ComputedStyle::initial);
            let managed = self.stylesheet.get_js_style(&selector_for(&dom_id));
            style_facts(&self.doc, key, &computed, managed)
        });

        Some(ElementDescriptor {
            oid: read_oid(&self.doc, key).map(str::to_string),
            instance_id: read_instance_id(&self.doc, key).map(str::to_string),
            tag_name: self.doc.tag_name(key).unwrap_or_default().to_string(),
            dom_id,
            frame_id,
            rect,
            parent,
            styles,
        })
    }

    /// Rebuild the layer tree under `root` and fold it into the reported mirror.
    fn snapshot(&mut self, root: NodeKey) -> Option<LayerTree> {
        let frame_id = self.frame_id.clone()?;
        self.refresh_render();
        let cx = BuildContext {
            styles: &self.render.styles,
            frame_id: &frame_id,
            config: &self.config,
        };
        let tree = match build_layer_tree(&mut self.doc, &cx, root) {
            Ok(tree) => tree?,
            Err(err) => {
                Self::warn_dom("snapshot", err);
                return None;
            }
        };
        self.remember(&tree);
        Some(tree)
    }

    fn remember(&mut self, tree: &LayerTree) {
        self.layers
            .extend(tree.layers.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.layer_keys
            .extend(tree.keys.iter().map(|(k, v)| (*k, v.clone())));
    }

    /// Descriptor of `key` paired with a fresh snapshot rooted at `snapshot_root`.
    fn update(
        &mut self,
        key: NodeKey,
        snapshot_root: Option<NodeKey>,
        want_style: bool,
    ) -> Option<ElementUpdate> {
        let layer_map = snapshot_root
            .and_then(|root| self.snapshot(root))
            .map(|tree| tree.layers);
        let element = self.describe(key, want_style)?;
        Some(ElementUpdate { element, layer_map })
    }
}
