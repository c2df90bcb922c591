use glam::Vec3;

use crate::aabb::{Aabb, Segment};
use crate::error::WorldError;
use crate::ledger::FrameLedger;
use crate::object::{Actor, Collidable, Collider, Tile};
use crate::types::*;

/// Collision lookup shared by every object kind.
pub trait Collide {
    /// Box and solidity, or `None` when the object cannot collide. Total and
    /// free of side effects.
    fn collision_data(&self) -> Option<(Aabb, bool)>;

    /// Lattice cells the object currently occupies.
    fn footprint(&self) -> Vec<Location>;
}

/// Public API contract for the collision world.
pub trait CollisionWorldApi {
    /// Construct an empty world with the given configuration.
    fn new(cfg: WorldConfig) -> Self
    where
        Self: Sized;

    // --- Registry ----------------------------------------------------------

    /// Register and index a dynamic object.
    fn insert_actor(&mut self, actor: Actor) -> ObjectId;

    /// Register and index a static object, replacing any tile at its location.
    fn insert_tile(&mut self, tile: Tile);

    /// Drop an object and retract its footprint. Unknown refs are ignored.
    fn remove(&mut self, r: CollidableRef) -> bool;

    /// Move an actor and re-index it.
    fn set_actor_position(&mut self, id: ObjectId, position: Vec3) -> Result<(), WorldError>;

    /// Attach or detach an actor's collider and re-index it.
    fn set_actor_collider(&mut self, id: ObjectId, collider: Option<Collider>) -> Result<(), WorldError>;

    /// Re-index an object after its state changed.
    fn on_object_moved(&mut self, r: CollidableRef);

    /// Retract an object's footprint without touching the registry.
    fn on_object_removed(&mut self, r: CollidableRef);

    fn collidable(&self, r: CollidableRef) -> Option<Collidable<'_>>;

    // --- Queries -----------------------------------------------------------

    /// Everything whose footprint touches the cells under `aabb` (coarse).
    fn collidables_in(&self, aabb: &Aabb) -> Vec<CollidableRef>;

    /// Objects whose box overlaps `aabb`.
    fn check_collisions(&self, aabb: &Aabb) -> Vec<Collision>;

    /// Objects whose box contains `p`.
    fn check_point(&self, p: Vec3) -> Vec<Collision>;

    /// Objects whose faces are crossed by the line through `segment`.
    fn check_segment_collisions(&self, segment: &Segment) -> Vec<SegmentCollision>;

    /// Everything `mover` would touch while moving by `delta`, solid or not.
    /// Every hit is recorded into `ledger`.
    fn predict_collisions(
        &self,
        mover: ObjectId,
        delta: Vec3,
        ledger: &mut FrameLedger,
    ) -> Result<Vec<PredictedCollision>, WorldError>;
}

/// Primitive tests used by the world.
pub trait NarrowphaseApi {
    /// Strict overlap.
    fn overlap_aabb_aabb(a: &Aabb, b: &Aabb) -> bool;

    /// Swept slab test of `a` moving by `delta` against a stationary `b`.
    fn sweep_aabb_aabb(a: &Aabb, delta: Vec3, b: &Aabb) -> Option<SweepHit>;

    /// Crossings of the ray from `segment.a` through `segment.b` with the
    /// faces of `aabb`, deduplicated and sorted by distance from `segment.a`.
    fn ray_aabb_faces(segment: &Segment, aabb: &Aabb) -> Vec<Vec3>;
}

/// Observer for broad/narrow-phase data. Must not influence results.
pub trait DebugSink {
    /// Region queried from the cell index for a predictive move.
    fn sweep_volume(&self, mover: ObjectId, region: &Aabb);

    /// A candidate that survived the narrow phase.
    fn narrow_hit(&self, mover: ObjectId, hit: &PredictedCollision);
}
