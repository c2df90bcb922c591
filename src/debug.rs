use std::cell::RefCell;
use std::rc::Rc;

use crate::aabb::Aabb;
use crate::api::DebugSink;
use crate::types::{ObjectId, PredictedCollision};

/// What a visualizer would draw for one frame.
#[derive(Clone, Debug, Default)]
pub struct DebugFrame {
    pub sweep_volumes: Vec<(ObjectId, Aabb)>,
    pub narrow_hits: Vec<(ObjectId, PredictedCollision)>,
}

/// In-memory [`DebugSink`]. Clones share the same buffer, so keep one and hand
/// the other to the world.
#[derive(Clone, Debug, Default)]
pub struct DebugRecorder {
    frame: Rc<RefCell<DebugFrame>>,
}

impl DebugRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything recorded so far.
    pub fn drain(&self) -> DebugFrame {
        self.frame.take()
    }
}

impl DebugSink for DebugRecorder {
    fn sweep_volume(&self, mover: ObjectId, region: &Aabb) {
        self.frame.borrow_mut().sweep_volumes.push((mover, *region));
    }

    fn narrow_hit(&self, mover: ObjectId, hit: &PredictedCollision) {
        self.frame.borrow_mut().narrow_hits.push((mover, *hit));
    }
}
