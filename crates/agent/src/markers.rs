//! Attribute names the agent writes onto live nodes.
//!
//! Identity lives on the node itself so it follows the node wherever page code moves it.

/// Runtime id assigned by the agent.
pub const RUNTIME_ID: &str = "data-odid";
/// Origin id, supplied by the build that produced the page.
pub const ORIGIN_ID: &str = "data-oid";
/// Instance id of the component instantiation, supplied externally.
pub const INSTANCE_ID: &str = "data-oiid";
pub const COMPONENT_NAME: &str = "data-ocname";
pub const DYNAMIC_TYPE: &str = "data-odynamic-type";
pub const CORE_ELEMENT_TYPE: &str = "data-ocore-type";

/// Set on nodes created by insert/group until the page's own render replaces them.
pub const INSERTED: &str = "data-oinserted";
/// Excluded from the layer tree.
pub const IGNORE: &str = "data-oignore";
/// Hidden by remove/group; reaped on the next full resync.
pub const REMOVED: &str = "data-oremoved";

pub const EDITING_TEXT: &str = "data-oediting-text";
pub const DRAGGING: &str = "data-odragging";
/// Inline style of a node before a drag started.
pub const DRAG_SAVED_STYLE: &str = "data-odrag-saved-style";
/// Drop-position placeholder shown during a drag.
pub const DRAG_STUB: &str = "data-odrag-stub";

/// Fields handed from a provisional node to the rendered node that replaces it.
pub const RECONCILED: &[&str] = &[RUNTIME_ID, DRAG_SAVED_STYLE, INSTANCE_ID];

/// Stripped from clones so they pick up fresh identities.
pub const CLONE_STRIPPED: &[&str] = &[
    RUNTIME_ID,
    INSTANCE_ID,
    INSERTED,
    REMOVED,
    EDITING_TEXT,
    DRAGGING,
    DRAG_SAVED_STYLE,
];
