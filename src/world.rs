use glam::Vec3;

use std::collections::HashMap;

use tracing::{debug, trace};

use crate::aabb::{Aabb, Segment};
use crate::api::{Collide, CollisionWorldApi, DebugSink, NarrowphaseApi};
use crate::error::{GeometryError, WorldError};
use crate::grid::CellIndex;
use crate::ledger::FrameLedger;
use crate::narrowphase::Narrowphase;
use crate::object::{Actor, Collidable, Collider, Tile};
use crate::types::*;

/// Persistent collision world: owns the objects, keeps the cell index in step
/// with them and answers queries against it.
pub struct CollisionWorld {
    pub cfg: WorldConfig,

    actors: HashMap<ObjectId, Actor>,
    tiles: HashMap<Location, Tile>,

    // Lattice cell -> objects whose footprint covers it
    grid: CellIndex<CollidableRef>,

    debug: Option<Box<dyn DebugSink>>,
}

impl CollisionWorldApi for CollisionWorld {
    fn new(cfg: WorldConfig) -> Self {
        Self {
            cfg,
            actors: HashMap::new(),
            tiles: HashMap::new(),
            grid: CellIndex::new(),
            debug: None,
        }
    }

    fn insert_actor(&mut self, actor: Actor) -> ObjectId {
        let id = actor.id();
        debug!(id = %id.short(), position = ?actor.position(), collider = actor.collider().is_some(), "actor inserted");
        self.actors.insert(id, actor);
        self.on_object_moved(CollidableRef::Dynamic(id));
        id
    }

    fn insert_tile(&mut self, tile: Tile) {
        let loc = tile.location;
        if self.tiles.insert(loc, tile).is_some() {
            trace!(?loc, "tile replaced");
        }
        self.on_object_moved(CollidableRef::Static(loc));
    }

    fn remove(&mut self, r: CollidableRef) -> bool {
        let existed = match r {
            CollidableRef::Dynamic(id) => self.actors.remove(&id).is_some(),
            CollidableRef::Static(loc) => self.tiles.remove(&loc).is_some(),
        };
        self.on_object_removed(r);
        if existed {
            debug!(?r, "object removed");
        }
        existed
    }

    fn set_actor_position(&mut self, id: ObjectId, position: Vec3) -> Result<(), WorldError> {
        let actor = self.actors.get_mut(&id).ok_or(WorldError::UnknownObject(id))?;
        let moved = actor.set_position(position)?;
        self.on_object_moved(CollidableRef::Dynamic(moved.id));
        Ok(())
    }

    fn set_actor_collider(&mut self, id: ObjectId, collider: Option<Collider>) -> Result<(), WorldError> {
        let actor = self.actors.get_mut(&id).ok_or(WorldError::UnknownObject(id))?;
        actor.set_collider(collider);
        self.on_object_moved(CollidableRef::Dynamic(id));
        Ok(())
    }

    fn on_object_moved(&mut self, r: CollidableRef) {
        match self.collidable(r).map(|c| c.footprint()) {
            Some(footprint) => self.grid.update(r, footprint),
            // Gone from the registry: nothing should point at it any more.
            None => {
                self.grid.remove(r);
            }
        }
    }

    fn on_object_removed(&mut self, r: CollidableRef) {
        self.grid.remove(r);
    }

    fn collidable(&self, r: CollidableRef) -> Option<Collidable<'_>> {
        match r {
            CollidableRef::Dynamic(id) => self.actors.get(&id).map(Collidable::Dynamic),
            CollidableRef::Static(loc) => self.tiles.get(&loc).map(Collidable::Static),
        }
    }

    fn collidables_in(&self, aabb: &Aabb) -> Vec<CollidableRef> {
        self.grid.query(aabb).into_iter().collect()
    }

    fn check_collisions(&self, aabb: &Aabb) -> Vec<Collision> {
        let mut out: Vec<Collision> = self
            .grid
            .query(aabb)
            .into_iter()
            .filter_map(|other| {
                let (other_box, solid) = self.collision_of(other)?;
                Narrowphase::overlap_aabb_aabb(aabb, &other_box).then(|| Collision {
                    other,
                    aabb: other_box,
                    solid,
                    distance: aabb.distance_to(&other_box),
                    side: Side::Corner,
                })
            })
            .collect();
        out.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.other.cmp(&b.other)));
        out
    }

    fn check_point(&self, p: Vec3) -> Vec<Collision> {
        let point_box = Aabb::from_min_max_unchecked(p, p);
        let mut out: Vec<Collision> = self
            .grid
            .query(&point_box)
            .into_iter()
            .filter_map(|other| {
                let (other_box, solid) = self.collision_of(other)?;
                other_box.contains_point(p).then(|| Collision {
                    other,
                    aabb: other_box,
                    solid,
                    distance: p.distance(other_box.center()),
                    side: Side::Corner,
                })
            })
            .collect();
        out.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.other.cmp(&b.other)));
        out
    }

    fn check_segment_collisions(&self, segment: &Segment) -> Vec<SegmentCollision> {
        let mut out: Vec<SegmentCollision> = self
            .grid
            .query(&segment.bounds())
            .into_iter()
            .filter_map(|other| {
                let (other_box, solid) = self.collision_of(other)?;
                let (intersections, distance_start, distance_end) =
                    Narrowphase::segment_crossings(segment, &other_box)?;
                Some(SegmentCollision {
                    other,
                    aabb: other_box,
                    solid,
                    intersections,
                    distance_start,
                    distance_end,
                })
            })
            .collect();
        out.sort_by(|a, b| {
            a.distance_start
                .total_cmp(&b.distance_start)
                .then(a.other.cmp(&b.other))
        });
        out
    }

    fn predict_collisions(
        &self,
        mover: ObjectId,
        delta: Vec3,
        ledger: &mut FrameLedger,
    ) -> Result<Vec<PredictedCollision>, WorldError> {
        let actor = self.actors.get(&mover).ok_or(WorldError::UnknownObject(mover))?;
        if !delta.is_finite() {
            return Err(GeometryError::NonFinite.into());
        }
        let Some((aabb, _)) = actor.collision_data() else {
            return Ok(Vec::new());
        };
        let delta = self.clamp_delta(delta);
        if delta == Vec3::ZERO {
            return Ok(Vec::new());
        }

        // Broad phase
        let region = swept_region(&aabb, delta);
        self.emit(|sink| sink.sweep_volume(mover, &region));
        let me = CollidableRef::Dynamic(mover);
        let candidates = self.grid.query(&region);

        // Narrow phase
        let mut out = Vec::new();
        let mut inside = Vec::new();
        for other in candidates {
            if other == me {
                continue;
            }
            let Some((other_box, solid)) = self.collision_of(other) else {
                continue;
            };
            let Some(hit) = Narrowphase::sweep_aabb_aabb(&aabb, delta, &other_box) else {
                // Triggers the mover starts inside are still being touched.
                if !solid && Narrowphase::overlap_aabb_aabb(&aabb, &other_box) {
                    inside.push(Collision {
                        other,
                        aabb: other_box,
                        solid,
                        distance: aabb.distance_to(&other_box),
                        side: Side::Corner,
                    });
                }
                continue;
            };
            trace!(mover = %mover.short(), ?other, toi = hit.toi, side = ?hit.side, solid, "narrow-phase hit");
            out.push(PredictedCollision {
                collision: Collision {
                    other,
                    aabb: other_box,
                    solid,
                    distance: aabb.distance_to(&other_box),
                    side: hit.side,
                },
                time_of_impact: hit.toi,
                hit_normal: hit.normal,
            });
        }
        sort_by_impact(&mut out);

        // Solid or not, gameplay gets to see it.
        for hit in &out {
            ledger.record(mover, hit.collision);
            self.emit(|sink| sink.narrow_hit(mover, hit));
        }
        inside.sort_by(|a, b| a.distance.total_cmp(&b.distance).then(a.other.cmp(&b.other)));
        for collision in inside {
            ledger.record(mover, collision);
        }
        Ok(out)
    }
}

impl CollisionWorld {
    /// Install an observer for broad/narrow-phase data.
    pub fn set_debug_sink(&mut self, sink: Box<dyn DebugSink>) {
        self.debug = Some(sink);
    }

    pub fn clear_debug_sink(&mut self) {
        self.debug = None;
    }

    fn emit(&self, f: impl FnOnce(&dyn DebugSink)) {
        if !self.cfg.enable_debug_hooks {
            return;
        }
        if let Some(sink) = self.debug.as_deref() {
            f(sink);
        }
    }

    pub fn actor(&self, id: ObjectId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn tile(&self, loc: Location) -> Option<&Tile> {
        self.tiles.get(&loc)
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Footprint currently recorded for an object.
    pub fn footprint(&self, r: CollidableRef) -> Option<Vec<Location>> {
        self.grid.footprint(&r).map(|f| f.iter().copied().collect())
    }

    fn collision_of(&self, r: CollidableRef) -> Option<(Aabb, bool)> {
        self.collidable(r)?.collision_data()
    }

    /// Zero out float noise on the vertical axis.
    pub(crate) fn clamp_delta(&self, mut delta: Vec3) -> Vec3 {
        if delta.z.abs() < self.cfg.z_epsilon {
            delta.z = 0.0;
        }
        delta
    }

    /// Add `step` to an actor's position and re-index it.
    pub(crate) fn translate(&mut self, id: ObjectId, step: Vec3) -> Result<(), WorldError> {
        let actor = self.actors.get(&id).ok_or(WorldError::UnknownObject(id))?;
        let position = actor.position() + step;
        self.set_actor_position(id, position)
    }

    /// Return debug stats for the current index.
    pub fn debug_stats(&self) -> WorldStats {
        WorldStats {
            actors: self.actors.len(),
            tiles: self.tiles.len(),
            cells: self.grid.cell_count(),
            footprint_entries: self.grid.entry_count(),
        }
    }
}

/// Broad-phase sweep volume: the box grown by `ceil(|d|)` toward the sign of
/// each delta component. Rounding up gives a cell of slack so fast movers
/// grazing a lattice boundary still see what lies beyond it.
pub fn swept_region(aabb: &Aabb, delta: Vec3) -> Aabb {
    let grow = |d: f32| if d == 0.0 { 0.0 } else { d.abs().ceil() * d.signum() };
    aabb.expand(grow(delta.x), grow(delta.y), grow(delta.z))
}

/// Earliest impact first; center distance breaks ties, then the handle order,
/// so results do not depend on hash iteration order.
fn sort_by_impact(hits: &mut [PredictedCollision]) {
    hits.sort_by(|a, b| {
        a.time_of_impact
            .total_cmp(&b.time_of_impact)
            .then(a.collision.distance.total_cmp(&b.collision.distance))
            .then(a.collision.other.cmp(&b.collision.other))
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debug::DebugRecorder;
    use approx::assert_abs_diff_eq;
    use glam::IVec3;

    fn world() -> CollisionWorld {
        CollisionWorld::new(WorldConfig::default())
    }

    fn cube_actor(world: &mut CollisionWorld, at: Vec3, solid: bool) -> ObjectId {
        let collider = Collider::new(Vec3::ONE, Vec3::ZERO, solid).unwrap();
        world.insert_actor(Actor::new(at, Some(collider)).unwrap())
    }

    #[test]
    fn test_swept_region_rounds_up() {
        let b = Aabb::new(Vec3::ZERO, 1.0, 1.0, 1.0).unwrap();
        let r = swept_region(&b, Vec3::new(0.2, -1.5, 0.0));
        assert_eq!(r.min(), Vec3::new(-0.5, -2.5, 0.0));
        assert_eq!(r.max(), Vec3::new(1.5, 0.5, 1.0));
    }

    #[test]
    fn test_insert_and_move_reindexes() {
        let mut w = world();
        let id = cube_actor(&mut w, Vec3::new(0.5, 0.5, 0.0), true);
        let inner = Aabb::new(Vec3::new(0.5, 0.5, 0.25), 0.1, 0.1, 0.1).unwrap();
        assert_eq!(w.collidables_in(&inner), vec![CollidableRef::Dynamic(id)]);

        w.set_actor_position(id, Vec3::new(10.5, 0.5, 0.0)).unwrap();
        assert!(w.collidables_in(&inner).is_empty());
        let far = inner.translated(Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(w.collidables_in(&far), vec![CollidableRef::Dynamic(id)]);
    }

    #[test]
    fn test_actor_without_collider_is_indexed_but_not_collidable() {
        let mut w = world();
        let id = w.insert_actor(Actor::new(Vec3::new(2.5, 2.5, 0.5), None).unwrap());
        assert_eq!(w.footprint(CollidableRef::Dynamic(id)), Some(vec![IVec3::new(2, 2, 0)]));
        let area = Aabb::new(Vec3::new(2.5, 2.5, 0.0), 1.0, 1.0, 1.0).unwrap();
        assert_eq!(w.collidables_in(&area).len(), 1);
        assert!(w.check_collisions(&area).is_empty());
    }

    #[test]
    fn test_collider_attach_detach() {
        let mut w = world();
        let id = w.insert_actor(Actor::new(Vec3::new(0.5, 0.5, 0.0), None).unwrap());
        let area = Aabb::new(Vec3::new(0.5, 0.5, 0.0), 0.5, 0.5, 0.5).unwrap();
        assert!(w.check_collisions(&area).is_empty());
        w.set_actor_collider(id, Some(Collider::trigger(Vec3::ONE).unwrap())).unwrap();
        assert_eq!(w.check_collisions(&area).len(), 1);
        w.set_actor_collider(id, None).unwrap();
        assert!(w.check_collisions(&area).is_empty());
    }

    #[test]
    fn test_remove_and_unknown_ids() {
        let mut w = world();
        let id = cube_actor(&mut w, Vec3::ZERO, true);
        assert!(w.remove(CollidableRef::Dynamic(id)));
        assert_eq!(w.debug_stats().cells, 0);
        assert!(!w.remove(CollidableRef::Dynamic(id)));
        assert_eq!(w.set_actor_position(id, Vec3::ONE), Err(WorldError::UnknownObject(id)));
        // Idempotent cleanup for something never indexed.
        w.on_object_removed(CollidableRef::Static(IVec3::splat(99)));
    }

    #[test]
    fn test_check_collisions_is_exact() {
        let mut w = world();
        let a = cube_actor(&mut w, Vec3::new(0.5, 0.5, 0.0), false);
        cube_actor(&mut w, Vec3::new(1.5, 0.5, 0.0), true); // touching only
        let area = Aabb::new(Vec3::new(0.5, 0.5, 0.0), 1.0, 1.0, 1.0).unwrap();
        let hits = w.check_collisions(&area);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].other, CollidableRef::Dynamic(a));
        assert_eq!(hits[0].side, Side::Corner);
        assert!(!hits[0].solid);
    }

    #[test]
    fn test_check_point_includes_tiles() {
        let mut w = world();
        w.insert_tile(Tile::new(IVec3::new(3, 3, 0), true));
        let hits = w.check_point(Vec3::new(3.5, 3.5, 0.0));
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].other, CollidableRef::Static(IVec3::new(3, 3, 0)));
        assert!(w.check_point(Vec3::new(3.5, 3.5, 0.5)).is_empty());
    }

    #[test]
    fn test_tile_replacement_keeps_one_entry() {
        let mut w = world();
        w.insert_tile(Tile::new(IVec3::ZERO, true));
        w.insert_tile(Tile::new(IVec3::ZERO, false));
        assert_eq!(w.debug_stats().tiles, 1);
        assert!(!w.tile(IVec3::ZERO).unwrap().solid);
    }

    #[test]
    fn test_segment_collisions_sorted_by_start_distance() {
        let mut w = world();
        let near = cube_actor(&mut w, Vec3::new(2.5, 0.5, 0.0), true);
        let far = cube_actor(&mut w, Vec3::new(5.5, 0.5, 0.0), false);
        cube_actor(&mut w, Vec3::new(5.5, 4.5, 0.0), true); // off the line
        let seg = Segment::new(Vec3::new(0.0, 0.5, 0.5), Vec3::new(8.0, 0.5, 0.5));
        let hits = w.check_segment_collisions(&seg);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].other, CollidableRef::Dynamic(near));
        assert_eq!(hits[1].other, CollidableRef::Dynamic(far));
        assert_abs_diff_eq!(hits[0].distance_start, 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(hits[1].distance_end, 2.0, epsilon = 1e-5);
        assert_eq!(hits[0].intersections.len(), 2);
    }

    #[test]
    fn test_predict_skips_self_and_records_all() {
        let mut w = world();
        let mover = cube_actor(&mut w, Vec3::ZERO, true);
        let pickup = cube_actor(&mut w, Vec3::new(1.5, 0.0, 0.0), false);
        let mut ledger = FrameLedger::new();
        ledger.begin_frame();
        let hits = w.predict_collisions(mover, Vec3::new(2.0, 0.0, 0.0), &mut ledger).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].collision.other, CollidableRef::Dynamic(pickup));
        assert_eq!(ledger.current_collisions(mover).len(), 1);
    }

    #[test]
    fn test_predict_without_collider_is_empty() {
        let mut w = world();
        let ghost = w.insert_actor(Actor::new(Vec3::ZERO, None).unwrap());
        cube_actor(&mut w, Vec3::new(1.5, 0.0, 0.0), true);
        let mut ledger = FrameLedger::new();
        ledger.begin_frame();
        let hits = w.predict_collisions(ghost, Vec3::new(2.0, 0.0, 0.0), &mut ledger).unwrap();
        assert!(hits.is_empty());
        assert!(w.predict_collisions(ObjectId::new(), Vec3::X, &mut ledger).is_err());
    }

    #[test]
    fn test_predict_orders_by_time_then_distance() {
        let mut w = world();
        let mover = cube_actor(&mut w, Vec3::ZERO, true);
        let second = cube_actor(&mut w, Vec3::new(3.5, 0.0, 0.0), true);
        let first = cube_actor(&mut w, Vec3::new(1.5, 0.0, 0.0), false);
        let mut ledger = FrameLedger::new();
        ledger.begin_frame();
        let hits = w.predict_collisions(mover, Vec3::new(4.0, 0.0, 0.0), &mut ledger).unwrap();
        let order: Vec<_> = hits.iter().map(|h| h.collision.other).collect();
        assert_eq!(order, vec![CollidableRef::Dynamic(first), CollidableRef::Dynamic(second)]);
    }

    #[test]
    fn test_exact_ties_are_ordered_by_handle() {
        let mut w = world();
        let mover = cube_actor(&mut w, Vec3::ZERO, true);
        let collider = Collider::solid(Vec3::ONE).unwrap();
        // Mirror images across y = 0: same time of impact, same distance.
        let high = ObjectId(uuid::Uuid::from_u128(2));
        let low = ObjectId(uuid::Uuid::from_u128(1));
        w.insert_actor(Actor::with_id(high, Vec3::new(1.5, 0.5, 0.0), Some(collider)).unwrap());
        w.insert_actor(Actor::with_id(low, Vec3::new(1.5, -0.5, 0.0), Some(collider)).unwrap());
        let mut ledger = FrameLedger::new();
        ledger.begin_frame();

        let hits = w.predict_collisions(mover, Vec3::new(2.0, 0.0, 0.0), &mut ledger).unwrap();
        let order: Vec<_> = hits.iter().map(|h| h.collision.other).collect();
        let expected = vec![CollidableRef::Dynamic(low), CollidableRef::Dynamic(high)];
        assert_eq!(order, expected);
        let recorded: Vec<_> = ledger.current_collisions(mover).iter().map(|c| c.other).collect();
        assert_eq!(recorded, expected);

        let area = Aabb::new(Vec3::new(1.5, 0.0, 0.0), 1.0, 1.0, 1.0).unwrap();
        let around: Vec<_> = w.check_collisions(&area).iter().map(|c| c.other).collect();
        assert_eq!(around, expected);
    }

    #[test]
    fn test_starting_inside_a_trigger_is_recorded_not_predicted() {
        let mut w = world();
        let mover = cube_actor(&mut w, Vec3::ZERO, true);
        let zone = cube_actor(&mut w, Vec3::new(0.25, 0.0, 0.0), false);
        cube_actor(&mut w, Vec3::new(0.0, 0.25, 0.0), true);
        let mut ledger = FrameLedger::new();
        ledger.begin_frame();

        let hits = w.predict_collisions(mover, Vec3::new(0.0, 0.0, 0.5), &mut ledger).unwrap();
        assert!(hits.is_empty());
        let recorded: Vec<_> = ledger.current_collisions(mover).iter().map(|c| c.other).collect();
        assert_eq!(recorded, vec![CollidableRef::Dynamic(zone)]);

        // Standing still records nothing.
        ledger.begin_frame();
        w.predict_collisions(mover, Vec3::ZERO, &mut ledger).unwrap();
        assert!(ledger.current_collisions(mover).is_empty());
    }

    #[test]
    fn test_non_finite_positions_and_deltas_are_rejected() {
        let mut w = world();
        let id = cube_actor(&mut w, Vec3::new(0.5, 0.5, 0.0), true);
        let key = CollidableRef::Dynamic(id);
        let before = w.footprint(key).unwrap().len();
        let nonfinite = Err(WorldError::Geometry(GeometryError::NonFinite));
        assert_eq!(w.set_actor_position(id, Vec3::new(f32::NAN, 0.0, 0.0)), nonfinite);
        assert_eq!(w.actor(id).unwrap().position(), Vec3::new(0.5, 0.5, 0.0));
        assert_eq!(w.footprint(key).unwrap().len(), before);

        let mut ledger = FrameLedger::new();
        ledger.begin_frame();
        assert_eq!(
            w.predict_collisions(id, Vec3::new(0.0, f32::INFINITY, 0.0), &mut ledger),
            Err(WorldError::Geometry(GeometryError::NonFinite))
        );
    }

    #[test]
    fn test_small_z_noise_is_clamped() {
        let mut w = world();
        let mover = cube_actor(&mut w, Vec3::new(0.0, 0.0, 1.0), true);
        // Floor tile right under the mover.
        w.insert_tile(Tile::new(IVec3::new(-1, -1, 1), true));
        w.insert_tile(Tile::new(IVec3::new(0, 0, 1), true));
        let mut ledger = FrameLedger::new();
        ledger.begin_frame();
        let hits = w.predict_collisions(mover, Vec3::new(0.0, 0.0, -1e-6), &mut ledger).unwrap();
        assert!(hits.is_empty());
        let hits = w.predict_collisions(mover, Vec3::new(0.0, 0.0, -0.5), &mut ledger).unwrap();
        assert_eq!(hits.len(), 2);
        assert!(hits.iter().all(|h| h.collision.side == Side::Top && h.time_of_impact == 0.0));
    }

    #[test]
    fn test_debug_hooks_observe_without_changing_results() {
        let mut w = world();
        let mover = cube_actor(&mut w, Vec3::ZERO, true);
        cube_actor(&mut w, Vec3::new(1.5, 0.0, 0.0), true);
        let mut ledger = FrameLedger::new();
        ledger.begin_frame();
        let plain = w.predict_collisions(mover, Vec3::new(2.0, 0.0, 0.0), &mut ledger).unwrap();

        let recorder = DebugRecorder::new();
        w.set_debug_sink(Box::new(recorder.clone()));
        let observed = w.predict_collisions(mover, Vec3::new(2.0, 0.0, 0.0), &mut ledger).unwrap();
        assert_eq!(plain, observed);
        let frame = recorder.drain();
        assert_eq!(frame.sweep_volumes.len(), 1);
        assert_eq!(frame.narrow_hits.len(), 1);

        w.cfg.enable_debug_hooks = false;
        w.predict_collisions(mover, Vec3::new(2.0, 0.0, 0.0), &mut ledger).unwrap();
        assert!(recorder.drain().sweep_volumes.is_empty());
    }
}
