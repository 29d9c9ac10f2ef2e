//! Change observation support: the provisional/rendered merge and delta batches.

use crate::identity::{read_id, read_oid};
use crate::markers::{INSERTED, RECONCILED};
use core_types::LayerMap;
use html::{Document, DomError, NodeKey};

/// One observation tick's worth of layer changes.
#[derive(Debug, Default, PartialEq)]
pub struct Delta {
    pub added: LayerMap,
    pub removed: LayerMap,
}

impl Delta {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// The connected provisional node created for origin id `oid`, other than `except`.
pub fn find_provisional(doc: &Document, oid: &str, except: NodeKey) -> Option<NodeKey> {
    doc.find_element(doc.root(), |d, k| {
        k != except && d.has_attribute(k, INSERTED) && read_oid(d, k) == Some(oid)
    })
}

/// Hand identity from the agent's provisional node to the node the page rendered in its place,
/// then drop the provisional node. Only the fields in [`RECONCILED`] move.
pub fn reconcile(
    doc: &mut Document,
    provisional: NodeKey,
    rendered: NodeKey,
) -> Result<NodeKey, DomError> {
    for marker in RECONCILED {
        let value = doc.attribute(provisional, marker).map(str::to_string);
        if let Some(value) = value {
            doc.set_attribute(rendered, marker, &value)?;
        }
    }
    log::debug!(
        "reconciled provisional {:?} into {:?} as {:?}",
        provisional,
        rendered,
        read_id(doc, rendered)
    );
    doc.remove(provisional)?;
    Ok(rendered)
}
