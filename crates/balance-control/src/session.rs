//! Explicit session state shared between the session owner and the controller.

use serde::Serialize;

use crate::types::CopPoint;

/// State of the current training session.
///
/// Owned by whatever drives the session; the controller only reads it. Every
/// target change bumps [`generation`](Self::generation), which is how the
/// controller knows to restart its ramp.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionState {
    target: CopPoint,
    generation: u64,
    condition_done: bool,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(CopPoint::default())
    }
}

impl SessionState {
    /// Start a session aimed at `target`.
    pub const fn new(target: CopPoint) -> Self {
        Self {
            target,
            generation: 0,
            condition_done: false,
        }
    }

    /// Current target position.
    pub fn target(&self) -> CopPoint {
        self.target
    }

    /// Number of target changes so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Move the target. Always counts as a change, even to the same point.
    pub fn set_target(&mut self, target: CopPoint) {
        self.target = target;
        self.generation = self.generation.wrapping_add(1);
    }

    /// Whether the current condition has finished.
    pub fn is_condition_done(&self) -> bool {
        self.condition_done
    }

    /// Mark the current condition finished; stimulation stops until the next one.
    pub fn mark_condition_done(&mut self) {
        self.condition_done = true;
    }

    /// Start a new condition. Counts as a target change.
    pub fn begin_condition(&mut self) {
        self.condition_done = false;
        self.generation = self.generation.wrapping_add(1);
    }
}
