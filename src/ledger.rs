use std::collections::HashMap;

use tracing::trace;

use crate::types::{CollidableRef, Collision, ObjectId};

/// Per-mover collisions for this frame and the one before.
///
/// `begin_frame` must run exactly once per frame, before any prediction for
/// that frame. Diffing the two generations yields enter/exit events.
///
/// A moving actor records both what it sweeps into and the triggers it starts
/// the move inside. A frame where it does not move records nothing, so a
/// trigger it stands still in shows up in `exited` on that frame.
#[derive(Debug, Default)]
pub struct FrameLedger {
    frame: u64,
    previous: HashMap<ObjectId, Vec<Collision>>,
    current: HashMap<ObjectId, Vec<Collision>>,
}

impl FrameLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames started so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Retire `current` into `previous` and start an empty generation.
    pub fn begin_frame(&mut self) {
        self.previous = std::mem::take(&mut self.current);
        self.frame = self.frame.wrapping_add(1);
    }

    /// Keep the first record per (mover, other) pair this frame.
    pub fn record(&mut self, mover: ObjectId, collision: Collision) {
        let list = self.current.entry(mover).or_default();
        if list.iter().any(|c| c.other == collision.other) {
            return;
        }
        trace!(mover = %mover.short(), other = ?collision.other, solid = collision.solid, "recorded collision");
        list.push(collision);
    }

    pub fn current_collisions(&self, mover: ObjectId) -> &[Collision] {
        self.current.get(&mover).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn previous_collisions(&self, mover: ObjectId) -> &[Collision] {
        self.previous.get(&mover).map(Vec::as_slice).unwrap_or_default()
    }

    /// Objects touched this frame but not last frame.
    pub fn entered(&self, mover: ObjectId) -> Vec<CollidableRef> {
        let prev = self.previous_collisions(mover);
        self.current_collisions(mover)
            .iter()
            .filter(|c| !prev.iter().any(|p| p.other == c.other))
            .map(|c| c.other)
            .collect()
    }

    /// Objects touched last frame but not this frame.
    pub fn exited(&self, mover: ObjectId) -> Vec<CollidableRef> {
        let curr = self.current_collisions(mover);
        self.previous_collisions(mover)
            .iter()
            .filter(|p| !curr.iter().any(|c| c.other == p.other))
            .map(|p| p.other)
            .collect()
    }

    /// Drop both generations for a mover that left the world.
    pub fn forget(&mut self, mover: ObjectId) {
        self.previous.remove(&mover);
        self.current.remove(&mover);
    }
}
