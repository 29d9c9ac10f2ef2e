use core_types::{FrameId, LayerMap};
use serde::Serialize;
use std::sync::mpsc::{Receiver, SyncSender, TryRecvError, TrySendError, sync_channel};

/// Agent -> host notifications.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(
    tag = "event",
    content = "payload",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum AgentEvent {
    // full layer tree published
    DomProcessed {
        frame_id: FrameId,
        layer_map: LayerMap,
        root_node: String,
    },
    // incremental delta from one observation tick
    WindowMutated {
        added: LayerMap,
        removed: LayerMap,
    },
    WindowResized,
    Navigated {
        url: String,
    },
}

/// Publishing half held by the agent. Never blocks: the agent runs on the page's event loop.
#[derive(Clone)]
pub struct EventSender {
    tx: SyncSender<AgentEvent>,
}

impl EventSender {
    /// Returns false when the event could not be queued.
    pub fn publish(&self, event: AgentEvent) -> bool {
        match self.tx.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(event)) => {
                log::warn!("event channel full, dropping {}", event_name(&event));
                false
            }
            Err(TrySendError::Disconnected(_)) => {
                log::debug!("event receiver gone");
                false
            }
        }
    }
}

fn event_name(event: &AgentEvent) -> &'static str {
    match event {
        AgentEvent::DomProcessed { .. } => "domProcessed",
        AgentEvent::WindowMutated { .. } => "windowMutated",
        AgentEvent::WindowResized => "windowResized",
        AgentEvent::Navigated { .. } => "navigated",
    }
}

pub struct Bus {
    pub evt_tx: EventSender,
    pub evt_rx: Receiver<AgentEvent>,
}

impl Bus {
    /// A bounded channel of `capacity` pending events.
    pub fn bounded(capacity: usize) -> Self {
        let (tx, evt_rx) = sync_channel(capacity);
        Bus {
            evt_tx: EventSender { tx },
            evt_rx,
        }
    }
}

/// Everything currently queued, in publish order.
pub fn drain(rx: &Receiver<AgentEvent>) -> Vec<AgentEvent> {
    let mut out = Vec::new();
    loop {
        match rx.try_recv() {
            Ok(event) => out.push(event),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => return out,
        }
    }
}
