//! In-page editing agent.
//!
//! Gives elements stable identities, mirrors the live document as a layer tree, keeps that
//! mirror in sync as page code changes the tree, and applies location-addressed edits and
//! managed-stylesheet restyles on behalf of a host editor.

mod agent;
pub mod config;
pub mod descriptor;
pub mod identity;
pub mod layer_tree;
pub mod location;
pub mod markers;
pub mod observer;
pub mod publish;
pub mod template;
pub mod theme;
pub mod transport;

pub use agent::{Agent, DragEnd, StyleChange, StyleChangeKind, TextEditStart, TextEditStop};
pub use config::{AgentConfig, ConfigError};
pub use descriptor::{ElementDescriptor, ElementUpdate, ParentDescriptor, StyleFacts};
pub use location::{ActionLocation, ActionTarget};
pub use template::{ActionElement, GroupContainer};
pub use transport::{HostRequest, dispatch};
