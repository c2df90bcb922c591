use glam::{IVec3, Vec3};

use crate::error::GeometryError;
use crate::types::{Location, Side, location_of};

/// Axis-aligned bounding volume.
///
/// `center` sits on the bottom face: the box spans `center.z ..= center.z + height`
/// vertically and is centered on x/y, so an object whose origin rests on the
/// ground gets a box that rests on the ground too.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb {
    center: Vec3,
    width: f32,
    length: f32,
    height: f32,
}

impl Aabb {
    /// Build from a bottom-center point and the extents along x, y and z.
    pub fn new(center: Vec3, width: f32, length: f32, height: f32) -> Result<Self, GeometryError> {
        if !center.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        for (axis, value) in [width, length, height].into_iter().enumerate() {
            if !value.is_finite() {
                return Err(GeometryError::NonFinite);
            }
            if value < 0.0 {
                return Err(GeometryError::NegativeExtent { axis, value });
            }
        }
        Ok(Self::new_unchecked(center, width, length, height))
    }

    /// Build from the two opposite corners.
    pub fn from_min_max(min: Vec3, max: Vec3) -> Result<Self, GeometryError> {
        if !min.is_finite() || !max.is_finite() {
            return Err(GeometryError::NonFinite);
        }
        for axis in 0..3 {
            if min[axis] > max[axis] {
                return Err(GeometryError::InvertedBounds { axis });
            }
        }
        Ok(Self::from_min_max_unchecked(min, max))
    }

    /// Caller guarantees non-negative, finite extents.
    pub(crate) fn new_unchecked(center: Vec3, width: f32, length: f32, height: f32) -> Self {
        debug_assert!(width >= 0.0 && length >= 0.0 && height >= 0.0);
        Self {
            center,
            width,
            length,
            height,
        }
    }

    pub(crate) fn from_min_max_unchecked(min: Vec3, max: Vec3) -> Self {
        let size = max - min;
        let center = Vec3::new(min.x + size.x * 0.5, min.y + size.y * 0.5, min.z);
        Self::new_unchecked(center, size.x, size.y, size.z)
    }

    #[inline]
    pub fn center(&self) -> Vec3 {
        self.center
    }

    #[inline]
    pub fn width(&self) -> f32 {
        self.width
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.length
    }

    #[inline]
    pub fn height(&self) -> f32 {
        self.height
    }

    #[inline]
    pub fn size(&self) -> Vec3 {
        Vec3::new(self.width, self.length, self.height)
    }

    #[inline]
    pub fn min(&self) -> Vec3 {
        self.center - Vec3::new(self.width * 0.5, self.length * 0.5, 0.0)
    }

    #[inline]
    pub fn max(&self) -> Vec3 {
        self.center + Vec3::new(self.width * 0.5, self.length * 0.5, self.height)
    }

    /// Separating-axis test. Boxes that only share a face do not intersect.
    pub fn intersects(&self, other: &Aabb) -> bool {
        let (amin, amax) = (self.min(), self.max());
        let (bmin, bmax) = (other.min(), other.max());
        !(amax.x <= bmin.x
            || amin.x >= bmax.x
            || amax.y <= bmin.y
            || amin.y >= bmax.y
            || amax.z <= bmin.z
            || amin.z >= bmax.z)
    }

    /// Inclusive containment; a point on a face counts.
    pub fn contains_point(&self, p: Vec3) -> bool {
        let (min, max) = (self.min(), self.max());
        p.cmpge(min).all() && p.cmple(max).all()
    }

    /// Grow the box toward the sign of each delta: negative components push the
    /// min face out, positive components push the max face out.
    pub fn expand(&self, dx: f32, dy: f32, dz: f32) -> Aabb {
        let d = Vec3::new(dx, dy, dz);
        let min = self.min() + d.min(Vec3::ZERO);
        let max = self.max() + d.max(Vec3::ZERO);
        Self::from_min_max_unchecked(min, max)
    }

    /// The same box moved by `offset`.
    pub fn translated(&self, offset: Vec3) -> Aabb {
        Self::new_unchecked(self.center + offset, self.width, self.length, self.height)
    }

    /// Center-to-center distance. Only meaningful as a tie-break.
    pub fn distance_to(&self, other: &Aabb) -> f32 {
        self.center.distance(other.center)
    }

    /// Lowest and highest lattice cell touched, inclusive on both ends.
    pub fn cell_range(&self) -> (Location, Location) {
        (location_of(self.min()), location_of(self.max()))
    }

    /// Every lattice cell the box touches (its footprint).
    pub fn cells(&self) -> impl Iterator<Item = Location> {
        let (lo, hi) = self.cell_range();
        (lo.z..=hi.z).flat_map(move |z| {
            (lo.y..=hi.y).flat_map(move |y| (lo.x..=hi.x).map(move |x| IVec3::new(x, y, z)))
        })
    }

    /// The six faces, in `Side` order: left, right, front, back, bottom, top.
    pub fn faces(&self) -> [Face; 6] {
        let (min, max) = (self.min(), self.max());
        let face = |side: Side, axis: usize, value: f32| {
            let mut lo = min;
            let mut hi = max;
            lo[axis] = value;
            hi[axis] = value;
            Face {
                side,
                axis,
                min: lo,
                max: hi,
            }
        };
        [
            face(Side::Left, 0, min.x),
            face(Side::Right, 0, max.x),
            face(Side::Front, 1, min.y),
            face(Side::Back, 1, max.y),
            face(Side::Bottom, 2, min.z),
            face(Side::Top, 2, max.z),
        ]
    }

    /// The twelve edges as segments.
    pub fn edges(&self) -> [Segment; 12] {
        let (n, x) = (self.min(), self.max());
        let c = |px: f32, py: f32, pz: f32| Vec3::new(px, py, pz);
        [
            // bottom ring
            Segment::new(c(n.x, n.y, n.z), c(x.x, n.y, n.z)),
            Segment::new(c(x.x, n.y, n.z), c(x.x, x.y, n.z)),
            Segment::new(c(x.x, x.y, n.z), c(n.x, x.y, n.z)),
            Segment::new(c(n.x, x.y, n.z), c(n.x, n.y, n.z)),
            // top ring
            Segment::new(c(n.x, n.y, x.z), c(x.x, n.y, x.z)),
            Segment::new(c(x.x, n.y, x.z), c(x.x, x.y, x.z)),
            Segment::new(c(x.x, x.y, x.z), c(n.x, x.y, x.z)),
            Segment::new(c(n.x, x.y, x.z), c(n.x, n.y, x.z)),
            // verticals
            Segment::new(c(n.x, n.y, n.z), c(n.x, n.y, x.z)),
            Segment::new(c(x.x, n.y, n.z), c(x.x, n.y, x.z)),
            Segment::new(c(x.x, x.y, n.z), c(x.x, x.y, x.z)),
            Segment::new(c(n.x, x.y, n.z), c(n.x, x.y, x.z)),
        ]
    }
}

/// One axis-aligned rectangular face of an [`Aabb`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Face {
    pub side: Side,
    /// Axis the face is perpendicular to (0 = x, 1 = y, 2 = z).
    pub axis: usize,
    pub min: Vec3,
    pub max: Vec3,
}

impl Face {
    /// Position of the face plane along its axis.
    #[inline]
    pub fn plane(&self) -> f32 {
        self.min[self.axis]
    }

    /// Whether `p`, assumed to lie on the plane, falls within the rectangle.
    pub fn contains_on_plane(&self, p: Vec3) -> bool {
        (0..3)
            .filter(|&i| i != self.axis)
            .all(|i| p[i] >= self.min[i] && p[i] <= self.max[i])
    }
}

/// Finite line segment from `a` to `b`.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment {
    pub a: Vec3,
    pub b: Vec3,
}

impl Segment {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self { a, b }
    }

    #[inline]
    pub fn direction(&self) -> Vec3 {
        self.b - self.a
    }

    #[inline]
    pub fn length(&self) -> f32 {
        self.a.distance(self.b)
    }

    pub fn point_at(&self, t: f32) -> Vec3 {
        self.a + self.direction() * t
    }

    /// Tightest box holding both endpoints.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_min_max_unchecked(self.a.min(self.b), self.a.max(self.b))
    }
}
