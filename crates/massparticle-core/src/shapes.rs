//! Analytic primitive geometry shared by colliders and force shape gates.
//!
//! All queries report distance from the primitive's surface (negative inside)
//! and the outward surface normal at the closest point.

use glam::{Mat4, Vec3};

use crate::math::closest_point_on_segment;

/// Primitive solid. Boxes are unit-agnostic: `half_extents` are measured in the
/// local frame of `transform`, which may carry rotation and scale.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Shape {
    Sphere { center: Vec3, radius: f32 },
    Capsule { a: Vec3, b: Vec3, radius: f32 },
    Box { transform: Mat4, half_extents: Vec3 },
}

/// Penetration of a particle sphere into a shape.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Contact {
    /// Outward surface normal; pushing along it resolves the overlap.
    pub normal: Vec3,
    /// Overlap depth, always positive.
    pub depth: f32,
}

impl Shape {
    /// Cache what per-particle queries need (the box inverse transform).
    pub fn prepare(&self) -> PreparedShape {
        let inverse = match self {
            Shape::Box { transform, .. } => transform.inverse(),
            _ => Mat4::IDENTITY,
        };
        PreparedShape {
            shape: *self,
            inverse,
        }
    }
}

/// A [`Shape`] with its derived data computed once per step.
#[derive(Clone, Copy, Debug)]
pub struct PreparedShape {
    pub shape: Shape,
    inverse: Mat4,
}

impl PreparedShape {
    /// Signed distance from the surface and outward normal.
    pub fn signed_distance(&self, p: Vec3) -> (f32, Vec3) {
        match self.shape {
            Shape::Sphere { center, radius } => {
                let d = p - center;
                let len = d.length();
                (len - radius, direction_or_up(d, len))
            }
            Shape::Capsule { a, b, radius } => {
                let d = p - closest_point_on_segment(p, a, b);
                let len = d.length();
                (len - radius, direction_or_up(d, len))
            }
            Shape::Box {
                transform,
                half_extents,
            } => box_signed_distance(&transform, &self.inverse, half_extents, p),
        }
    }

    #[inline]
    pub fn contains(&self, p: Vec3) -> bool {
        self.signed_distance(p).0 <= 0.0
    }

    /// Overlap of a sphere of `radius` centered at `p`, if any.
    pub fn contact(&self, p: Vec3, radius: f32) -> Option<Contact> {
        let (dist, normal) = self.signed_distance(p);
        let depth = radius - dist;
        (depth > 0.0).then_some(Contact { normal, depth })
    }

    /// World-space bounding box, grown by `margin` on every side.
    pub fn aabb(&self, margin: f32) -> (Vec3, Vec3) {
        let (min, max) = match self.shape {
            Shape::Sphere { center, radius } => (center - radius, center + radius),
            Shape::Capsule { a, b, radius } => (a.min(b) - radius, a.max(b) + radius),
            Shape::Box {
                transform,
                half_extents,
            } => {
                let center = transform.transform_point3(Vec3::ZERO);
                let extent = transform.x_axis.truncate().abs() * half_extents.x
                    + transform.y_axis.truncate().abs() * half_extents.y
                    + transform.z_axis.truncate().abs() * half_extents.z;
                (center - extent, center + extent)
            }
        };
        (min - margin, max + margin)
    }
}

#[inline]
fn direction_or_up(d: Vec3, len: f32) -> Vec3 {
    if len > 1e-8 {
        d / len
    } else {
        Vec3::Y
    }
}

fn box_signed_distance(transform: &Mat4, inverse: &Mat4, half: Vec3, p: Vec3) -> (f32, Vec3) {
    let local = inverse.transform_point3(p);
    let clamped = local.clamp(-half, half);

    if clamped != local {
        let surface = transform.transform_point3(clamped);
        let d = p - surface;
        let len = d.length();
        return (len, direction_or_up(d, len));
    }

    // Inside: leave through the nearest face, measured in world units.
    let mut best = (f32::MAX, Vec3::Y);
    for axis in 0..3 {
        let sign = if local[axis] >= 0.0 { 1.0 } else { -1.0 };
        let mut face = local;
        face[axis] = half[axis] * sign;
        let mut local_normal = Vec3::ZERO;
        local_normal[axis] = sign;

        let gap = (transform.transform_point3(face) - p).length();
        if gap < best.0 {
            let normal = transform.transform_vector3(local_normal).normalize_or_zero();
            best = (gap, if normal == Vec3::ZERO { Vec3::Y } else { normal });
        }
    }
    (-best.0, best.1)
}
