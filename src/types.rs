use std::cmp::Ordering;
use std::fmt;

use glam::{IVec3, Vec3};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::aabb::Aabb;

/// World units per lattice cell.
pub const CELL_SIZE: f32 = 1.0;

/// Integer lattice coordinate.
pub type Location = IVec3;

/// Floor a continuous position onto the lattice.
#[inline]
pub fn location_of(p: Vec3) -> Location {
    (p / CELL_SIZE).floor().as_ivec3()
}

/// Stable identity of a dynamic object, independent of its position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ObjectId(pub Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// First eight hex digits, handy in logs.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_owned()
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to anything the world indexes. Tiles are addressed by their cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum CollidableRef {
    Dynamic(ObjectId),
    Static(Location),
}

// Total order used to break exact ties: actors before tiles, then by id or by
// cell (x, y, z).
impl Ord for CollidableRef {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Dynamic(a), Self::Dynamic(b)) => a.cmp(b),
            (Self::Static(a), Self::Static(b)) => a.to_array().cmp(&b.to_array()),
            (Self::Dynamic(_), Self::Static(_)) => Ordering::Less,
            (Self::Static(_), Self::Dynamic(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for CollidableRef {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Which face of the other object was struck.
///
/// Faces map onto outward normals: left/right are -x/+x, front/back are -y/+y,
/// bottom/top are -z/+z. `Corner` means no single face can be blamed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Front,
    Back,
    Left,
    Right,
    Top,
    Bottom,
    Corner,
}

impl Side {
    /// Classify an axis-aligned unit normal. Anything else is a corner.
    pub fn from_normal(n: Vec3) -> Side {
        let nonzero = n.cmpne(Vec3::ZERO);
        match (nonzero.x, nonzero.y, nonzero.z) {
            (true, false, false) if n.x < 0.0 => Side::Left,
            (true, false, false) if n.x > 0.0 => Side::Right,
            (false, true, false) if n.y < 0.0 => Side::Front,
            (false, true, false) if n.y > 0.0 => Side::Back,
            (false, false, true) if n.z < 0.0 => Side::Bottom,
            (false, false, true) if n.z > 0.0 => Side::Top,
            _ => Side::Corner,
        }
    }

    /// Outward normal of the face, zero for `Corner`.
    pub fn normal(self) -> Vec3 {
        match self {
            Side::Left => Vec3::NEG_X,
            Side::Right => Vec3::X,
            Side::Front => Vec3::NEG_Y,
            Side::Back => Vec3::Y,
            Side::Bottom => Vec3::NEG_Z,
            Side::Top => Vec3::Z,
            Side::Corner => Vec3::ZERO,
        }
    }
}

/// An overlap with another object.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Collision {
    pub other: CollidableRef,
    /// The other object's box at the time of the query.
    pub aabb: Aabb,
    pub solid: bool,
    /// Center-to-center distance; a tie-break, not a surface distance.
    pub distance: f32,
    pub side: Side,
}

/// A collision predicted along a frame's displacement.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct PredictedCollision {
    pub collision: Collision,
    /// Fraction in [0,1] of the displacement at which contact starts.
    pub time_of_impact: f32,
    /// Outward normal of the struck face; zero on two axes.
    pub hit_normal: Vec3,
}

/// A segment crossing an object's faces.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentCollision {
    pub other: CollidableRef,
    pub aabb: Aabb,
    pub solid: bool,
    /// Face crossings, nearest to the segment start first.
    pub intersections: Vec<Vec3>,
    /// Distance from the segment start to the nearest crossing.
    pub distance_start: f32,
    /// Distance from the segment end to the crossing nearest it.
    pub distance_end: f32,
}

/// Swept-test result (time of impact plus struck face).
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SweepHit {
    /// Fraction in [0,1] where first contact occurs.
    pub toi: f32,
    /// Points from the obstacle back against the direction of travel.
    pub normal: Vec3,
    /// `Corner` when two or more axes entered at the same instant.
    pub side: Side,
}

/// World-level configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Vertical displacement below this magnitude is treated as zero.
    pub z_epsilon: f32,
    /// Maximum slide bounces per move before the remainder is dropped.
    pub max_slide_iterations: u32,
    /// Forward broad/narrow-phase data to the installed debug sink.
    pub enable_debug_hooks: bool,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            z_epsilon: 1e-4,
            max_slide_iterations: 4,
            enable_debug_hooks: true,
        }
    }
}

/// Debug statistics for the index.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldStats {
    pub actors: usize,
    pub tiles: usize,
    /// Occupied lattice cells.
    pub cells: usize,
    /// Sum of footprint sizes over all indexed objects.
    pub footprint_entries: usize,
}
