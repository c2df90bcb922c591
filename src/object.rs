use glam::Vec3;

use crate::aabb::Aabb;
use crate::api::Collide;
use crate::error::GeometryError;
use crate::types::{CollidableRef, Location, ObjectId, location_of};

/// Collision attachment for a dynamic object.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Collider {
    size: Vec3,
    offset: Vec3,
    solid: bool,
}

impl Collider {
    /// `size` is (width, length, height); `offset` moves the box's bottom
    /// center away from the owner's position.
    pub fn new(size: Vec3, offset: Vec3, solid: bool) -> Result<Self, GeometryError> {
        if !size.is_finite() || !offset.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        for axis in 0..3 {
            if size[axis] < 0.0 {
                return Err(GeometryError::NegativeExtent { axis, value: size[axis] });
            }
        }
        Ok(Self { size, offset, solid })
    }

    pub fn solid(size: Vec3) -> Result<Self, GeometryError> {
        Self::new(size, Vec3::ZERO, true)
    }

    pub fn trigger(size: Vec3) -> Result<Self, GeometryError> {
        Self::new(size, Vec3::ZERO, false)
    }

    pub fn size(&self) -> Vec3 {
        self.size
    }

    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    pub fn is_solid(&self) -> bool {
        self.solid
    }

    /// Box of this collider for an owner standing at `position`.
    pub fn aabb_at(&self, position: Vec3) -> Aabb {
        Aabb::new_unchecked(position + self.offset, self.size.x, self.size.y, self.size.z)
    }
}

/// Emitted by [`Actor::set_position`]; the owner of the index must feed it back
/// through `on_object_moved`.
#[must_use = "the cell index is stale until the move is reported"]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Moved {
    pub id: ObjectId,
    pub from: Vec3,
    pub to: Vec3,
}

/// Dynamic, actor-like object with a continuous position.
#[derive(Clone, Debug)]
pub struct Actor {
    id: ObjectId,
    position: Vec3,
    collider: Option<Collider>,
}

impl Actor {
    pub fn new(position: Vec3, collider: Option<Collider>) -> Result<Self, GeometryError> {
        Self::with_id(ObjectId::new(), position, collider)
    }

    pub fn with_id(
        id: ObjectId,
        position: Vec3,
        collider: Option<Collider>,
    ) -> Result<Self, GeometryError> {
        if !position.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        Ok(Self {
            id,
            position,
            collider,
        })
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn collider(&self) -> Option<&Collider> {
        self.collider.as_ref()
    }

    /// Non-finite positions are rejected and leave the actor where it was.
    pub fn set_position(&mut self, position: Vec3) -> Result<Moved, GeometryError> {
        if !position.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        let from = self.position;
        self.position = position;
        Ok(Moved {
            id: self.id,
            from,
            to: position,
        })
    }

    pub(crate) fn set_collider(&mut self, collider: Option<Collider>) {
        self.collider = collider;
    }

    /// Box at the current position, if a collider is attached.
    pub fn aabb(&self) -> Option<Aabb> {
        self.collider.map(|c| c.aabb_at(self.position))
    }
}

// Same object regardless of where it stands.
impl PartialEq for Actor {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Actor {}

impl Collide for Actor {
    fn collision_data(&self) -> Option<(Aabb, bool)> {
        self.collider.map(|c| (c.aabb_at(self.position), c.solid))
    }

    fn footprint(&self) -> Vec<Location> {
        match self.aabb() {
            Some(aabb) => aabb.cells().collect(),
            None => vec![location_of(self.position)],
        }
    }
}

/// Static, tile-like object occupying exactly one lattice cell with a flat
/// 1x1x0 box resting on the cell's floor.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Tile {
    pub location: Location,
    pub solid: bool,
}

impl Tile {
    pub fn new(location: Location, solid: bool) -> Self {
        Self { location, solid }
    }

    pub fn aabb(&self) -> Aabb {
        let min = self.location.as_vec3();
        Aabb::from_min_max_unchecked(min, min + Vec3::new(1.0, 1.0, 0.0))
    }
}

impl Collide for Tile {
    fn collision_data(&self) -> Option<(Aabb, bool)> {
        Some((self.aabb(), self.solid))
    }

    fn footprint(&self) -> Vec<Location> {
        self.aabb().cells().collect()
    }
}

/// Borrowed view of any indexed object.
#[derive(Copy, Clone, Debug)]
pub enum Collidable<'a> {
    Dynamic(&'a Actor),
    Static(&'a Tile),
}

impl Collidable<'_> {
    pub fn key(&self) -> CollidableRef {
        match self {
            Collidable::Dynamic(actor) => CollidableRef::Dynamic(actor.id),
            Collidable::Static(tile) => CollidableRef::Static(tile.location),
        }
    }
}

impl Collide for Collidable<'_> {
    fn collision_data(&self) -> Option<(Aabb, bool)> {
        match self {
            Collidable::Dynamic(actor) => actor.collision_data(),
            Collidable::Static(tile) => tile.collision_data(),
        }
    }

    fn footprint(&self) -> Vec<Location> {
        match self {
            Collidable::Dynamic(actor) => actor.footprint(),
            Collidable::Static(tile) => tile.footprint(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec3;

    #[test]
    fn test_actor_without_collider_has_point_footprint() {
        let actor = Actor::new(Vec3::new(2.5, -0.5, 0.0), None).unwrap();
        assert!(actor.collision_data().is_none());
        assert_eq!(actor.footprint(), vec![IVec3::new(2, -1, 0)]);
    }

    #[test]
    fn test_collider_box_follows_position_and_offset() {
        let collider = Collider::new(Vec3::new(1.0, 2.0, 3.0), Vec3::new(0.0, 0.0, 0.5), false).unwrap();
        let actor = Actor::new(Vec3::new(4.0, 4.0, 0.0), Some(collider)).unwrap();
        let (aabb, solid) = actor.collision_data().unwrap();
        assert!(!solid);
        assert_eq!(aabb.min(), Vec3::new(3.5, 3.0, 0.5));
        assert_eq!(aabb.max(), Vec3::new(4.5, 5.0, 3.5));
    }

    #[test]
    fn test_actor_identity_ignores_position() {
        let mut actor = Actor::new(Vec3::ZERO, None).unwrap();
        let snapshot = actor.clone();
        let moved = actor.set_position(Vec3::new(9.0, 9.0, 9.0)).unwrap();
        assert_eq!(moved.from, Vec3::ZERO);
        assert_eq!(moved.to, Vec3::new(9.0, 9.0, 9.0));
        assert_eq!(actor, snapshot);
        assert_ne!(actor, Actor::new(Vec3::new(9.0, 9.0, 9.0), None).unwrap());
    }

    #[test]
    fn test_actor_rejects_non_finite_position() {
        assert_eq!(
            Actor::new(Vec3::new(f32::NAN, 0.0, 0.0), None).unwrap_err(),
            GeometryError::NonFinite
        );
        let mut actor = Actor::new(Vec3::ONE, None).unwrap();
        assert_eq!(
            actor.set_position(Vec3::new(0.0, f32::INFINITY, 0.0)),
            Err(GeometryError::NonFinite)
        );
        assert_eq!(actor.position(), Vec3::ONE);
    }

    #[test]
    fn test_collider_rejects_negative_size() {
        assert_eq!(
            Collider::solid(Vec3::new(1.0, 1.0, -1.0)),
            Err(GeometryError::NegativeExtent { axis: 2, value: -1.0 })
        );
    }

    #[test]
    fn test_tile_is_flat_unit_square() {
        let tile = Tile::new(IVec3::new(3, -2, 1), true);
        let (aabb, solid) = Collidable::Static(&tile).collision_data().unwrap();
        assert!(solid);
        assert_eq!(aabb.min(), Vec3::new(3.0, -2.0, 1.0));
        assert_eq!(aabb.max(), Vec3::new(4.0, -1.0, 1.0));
        // Closed range: the far edge lands in the neighbouring columns too.
        assert_eq!(tile.footprint().len(), 4);
    }
}
