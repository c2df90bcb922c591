use glam::Vec3;

use tracing::{debug, warn};

use crate::api::CollisionWorldApi;
use crate::error::{GeometryError, WorldError};
use crate::ledger::FrameLedger;
use crate::types::{ObjectId, PredictedCollision, Side};
use crate::world::CollisionWorld;

/// What one [`CollisionWorld::move_actor`] call did.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MoveOutcome {
    /// Sum of every partial displacement applied.
    pub applied: Vec3,
    /// Solid hits that stopped a leg of the move, in order.
    pub blocked_by: Vec<PredictedCollision>,
    /// Legs attempted (the first leg counts).
    pub iterations: u32,
    /// Set when the iteration cap dropped leftover displacement.
    pub truncated: bool,
}

impl MoveOutcome {
    pub fn was_blocked(&self) -> bool {
        !self.blocked_by.is_empty()
    }
}

impl CollisionWorld {
    /// Move an actor by `delta`, stopping at the first solid obstacle and
    /// sliding the rest of the displacement along its surface.
    ///
    /// The cell index is updated after every leg, so actors moved later in the
    /// same frame see this actor's new position.
    pub fn move_actor(
        &mut self,
        id: ObjectId,
        delta: Vec3,
        ledger: &mut FrameLedger,
    ) -> Result<MoveOutcome, WorldError> {
        if self.actor(id).is_none() {
            return Err(WorldError::UnknownObject(id));
        }
        if !delta.is_finite() {
            return Err(GeometryError::NonFinite.into());
        }
        let mut outcome = MoveOutcome::default();
        self.slide(id, delta, ledger, 0, &mut outcome)?;
        debug!(
            mover = %id.short(),
            applied = ?outcome.applied,
            legs = outcome.iterations,
            blocked = outcome.blocked_by.len(),
            "move resolved"
        );
        Ok(outcome)
    }

    fn slide(
        &mut self,
        id: ObjectId,
        delta: Vec3,
        ledger: &mut FrameLedger,
        depth: u32,
        outcome: &mut MoveOutcome,
    ) -> Result<(), WorldError> {
        let delta = self.clamp_delta(delta);
        if delta == Vec3::ZERO {
            return Ok(());
        }
        if depth >= self.cfg.max_slide_iterations {
            warn!(
                mover = %id.short(),
                depth,
                dropped = ?delta,
                "slide iteration cap reached, discarding remaining displacement"
            );
            outcome.truncated = true;
            return Ok(());
        }
        outcome.iterations += 1;

        // Predictions arrive sorted by impact.
        let first_solid = self
            .predict_collisions(id, delta, ledger)?
            .into_iter()
            .find(|hit| hit.collision.solid);

        let Some(hit) = first_solid else {
            self.translate(id, delta)?;
            outcome.applied += delta;
            return Ok(());
        };

        let step = delta * hit.time_of_impact;
        if step != Vec3::ZERO {
            self.translate(id, step)?;
            outcome.applied += step;
        }
        outcome.blocked_by.push(hit);

        // No single face to slide along.
        if hit.collision.side == Side::Corner {
            debug!(mover = %id.short(), other = ?hit.collision.other, "corner hit, sliding stops");
            return Ok(());
        }

        // Drop the component pushing into the surface from what is left.
        let remaining = delta * (1.0 - hit.time_of_impact);
        let n = hit.hit_normal;
        let slide = remaining - n * remaining.dot(n);
        self.slide(id, slide, ledger, depth + 1, outcome)
    }
}
