//! Live document model: the arena tree the agent inspects and mutates, plus markup
//! serialization and entity handling.

mod dom;
mod entities;
mod serialize;

pub use crate::dom::{DomError, Document, MutationRecord, NodeKey, NodeKind};
pub use crate::entities::{decode_entities, escape_attribute, escape_text};
pub use crate::serialize::is_void_element;
