//! When to publish the full layer tree.
//!
//! Structural bursts are coalesced into one trailing publish. Until the first publish lands, a
//! bounded catch-up loop retries on a fixed interval and then gives up.

use crate::config::AgentConfig;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Due {
    Debounced,
    CatchUp,
}

pub struct PublishSchedule {
    debounce: Duration,
    interval: Duration,
    max_attempts: u32,
    attempts_left: u32,
    pending_until: Option<Instant>,
    next_catch_up: Option<Instant>,
    published: bool,
}

impl PublishSchedule {
    pub fn new(config: &AgentConfig) -> Self {
        PublishSchedule {
            debounce: config.publish_debounce(),
            interval: config.catch_up_interval(),
            max_attempts: config.catch_up_attempts,
            attempts_left: config.catch_up_attempts,
            pending_until: None,
            next_catch_up: None,
            published: false,
        }
    }

    /// Arm the catch-up loop, first attempt at `now`.
    pub fn start(&mut self, now: Instant) {
        if !self.published && self.attempts_left > 0 {
            self.next_catch_up = Some(now);
        }
    }

    /// Ask for a publish; each request pushes the deadline back.
    pub fn request(&mut self, now: Instant) {
        self.pending_until = Some(now + self.debounce);
    }

    pub fn is_pending(&self) -> bool {
        self.pending_until.is_some()
    }

    pub fn has_published(&self) -> bool {
        self.published
    }

    pub fn poll(&mut self, now: Instant) -> Option<Due> {
        if self.pending_until.is_some_and(|t| now >= t) {
            self.pending_until = None;
            return Some(Due::Debounced);
        }
        let next = self.next_catch_up?;
        if self.published || now < next {
            return None;
        }
        self.attempts_left = self.attempts_left.saturating_sub(1);
        self.next_catch_up = (self.attempts_left > 0).then(|| now + self.interval);
        if self.next_catch_up.is_none() {
            log::debug!("catch-up publishing gave up after {} attempts", self.max_attempts);
        }
        Some(Due::CatchUp)
    }

    pub fn mark_published(&mut self) {
        self.published = true;
        self.next_catch_up = None;
    }

    /// New document: forget the first publish and re-arm catch-up.
    pub fn reset(&mut self, now: Instant) {
        self.published = false;
        self.pending_until = None;
        self.attempts_left = self.max_attempts;
        self.start(now);
    }
}
