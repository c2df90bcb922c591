use glam::Vec3;

use crate::aabb::{Aabb, Segment};
use crate::api::NarrowphaseApi;
use crate::types::*;

/// Crossings closer than this (squared) are the same point: a ray through an
/// edge or corner touches two or three faces at once.
const DEDUP_EPS_SQ: f32 = 1e-10;

/// Penetration up to this depth counts as touching. Along the direction of
/// travel a mover left a hair inside an obstacle still collides with it; on an
/// axis with no motion the same hairline overlap does not block.
pub const CONTACT_EPS: f32 = 1e-5;

/// Narrowphase primitive tests.
pub struct Narrowphase;

impl NarrowphaseApi for Narrowphase {
    fn overlap_aabb_aabb(a: &Aabb, b: &Aabb) -> bool {
        a.intersects(b)
    }

    fn sweep_aabb_aabb(a: &Aabb, delta: Vec3, b: &Aabb) -> Option<SweepHit> {
        let (amin, amax) = (a.min(), a.max());
        let (bmin, bmax) = (b.min(), b.max());
        let mut entry = [0.0f32; 3];
        let mut exit = [0.0f32; 3];

        for axis in 0..3 {
            let d = delta[axis];
            if d == 0.0 {
                // No motion on this axis: it never gates the hit, but the boxes
                // must already overlap on it. Touching, or sitting a hair inside
                // after a partial move, is not overlapping.
                if amax[axis] - bmin[axis] <= CONTACT_EPS || bmax[axis] - amin[axis] <= CONTACT_EPS {
                    return None;
                }
                entry[axis] = f32::NEG_INFINITY;
                exit[axis] = f32::INFINITY;
                continue;
            }
            let (mut entry_dist, exit_dist) = if d > 0.0 {
                (bmin[axis] - amax[axis], bmax[axis] - amin[axis])
            } else {
                (bmax[axis] - amin[axis], bmin[axis] - amax[axis])
            };
            // Signed gap ahead of the mover; negative once it has penetrated.
            let gap = entry_dist * d.signum();
            if gap < 0.0 && gap > -CONTACT_EPS {
                entry_dist = 0.0;
            }
            entry[axis] = entry_dist / d;
            exit[axis] = exit_dist / d;
        }

        // Latest entry governs; first axis wins ties (x, then y, then z).
        let mut hit_axis = 0;
        for axis in 1..3 {
            if entry[axis] > entry[hit_axis] {
                hit_axis = axis;
            }
        }
        let toi = entry[hit_axis];
        let exit_time = exit[0].min(exit[1]).min(exit[2]);

        // Per-axis ranges must overlap for a non-empty stretch of time.
        if toi >= exit_time {
            return None;
        }
        if !(0.0..=1.0).contains(&toi) {
            return None;
        }

        let mut normal = Vec3::ZERO;
        normal[hit_axis] = if delta[hit_axis] > 0.0 { -1.0 } else { 1.0 };
        let tied = (0..3).any(|axis| axis != hit_axis && entry[axis] == toi);
        let side = if tied { Side::Corner } else { Side::from_normal(normal) };

        Some(SweepHit { toi, normal, side })
    }

    fn ray_aabb_faces(segment: &Segment, aabb: &Aabb) -> Vec<Vec3> {
        let dir = segment.direction();
        if dir == Vec3::ZERO {
            return Vec::new();
        }
        let origin = segment.a;
        let mut hits: Vec<Vec3> = Vec::with_capacity(2);

        for face in aabb.faces() {
            let d = dir[face.axis];
            if d == 0.0 {
                continue;
            }
            let t = (face.plane() - origin[face.axis]) / d;
            if t < 0.0 {
                continue;
            }
            let mut p = origin + dir * t;
            // Snap onto the plane so the containment check is exact.
            p[face.axis] = face.plane();
            if !face.contains_on_plane(p) {
                continue;
            }
            if hits.iter().any(|h| h.distance_squared(p) <= DEDUP_EPS_SQ) {
                continue;
            }
            hits.push(p);
        }

        hits.sort_by(|l, r| {
            l.distance_squared(origin)
                .total_cmp(&r.distance_squared(origin))
        });
        hits
    }
}

impl Narrowphase {
    /// Everything needed to build a [`SegmentCollision`]: the crossings plus the
    /// distances from each endpoint. `None` when the ray misses every face.
    pub fn segment_crossings(segment: &Segment, aabb: &Aabb) -> Option<(Vec<Vec3>, f32, f32)> {
        let hits = Self::ray_aabb_faces(segment, aabb);
        let first = hits.first()?;
        let distance_start = first.distance(segment.a);
        let distance_end = hits
            .iter()
            .map(|h| h.distance(segment.b))
            .fold(f32::INFINITY, f32::min);
        Some((hits, distance_start, distance_end))
    }
}
