mod layer;

pub use layer::{CoreElementType, DynamicType, LayerMap, LayerNode};

use serde::{Deserialize, Serialize};

/// Identifier of the frame (browsing context) the agent runs in.
pub type FrameId = String;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    Dark,
    #[default]
    System,
}

/// Viewport size in CSS px.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport {
            width: 1280.0,
            height: 800.0,
        }
    }
}
