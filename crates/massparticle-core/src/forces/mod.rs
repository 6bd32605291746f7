//! Per-step force descriptors and their evaluation.

pub mod evaluate;
pub mod field;

use std::fmt;
use std::sync::Arc;

use glam::{Mat4, Vec3};

use crate::shapes::Shape;

pub use evaluate::{apply_forces, force_acceleration, prepare_forces, PreparedForce};
pub use field::{GridField, PolylineField, VectorField};

/// Spatial gate deciding which particles a force may touch, independent of
/// how the force's direction is computed.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ForceShape {
    All,
    Sphere { center: Vec3, radius: f32 },
    Capsule { a: Vec3, b: Vec3, radius: f32 },
    Box { transform: Mat4, half_extents: Vec3 },
}

impl ForceShape {
    /// The gate's solid, or `None` for [`ForceShape::All`].
    pub fn region(&self) -> Option<Shape> {
        match *self {
            ForceShape::All => None,
            ForceShape::Sphere { center, radius } => Some(Shape::Sphere { center, radius }),
            ForceShape::Capsule { a, b, radius } => Some(Shape::Capsule { a, b, radius }),
            ForceShape::Box {
                transform,
                half_extents,
            } => Some(Shape::Box {
                transform,
                half_extents,
            }),
        }
    }
}

/// How a gated particle's acceleration direction is obtained.
#[derive(Clone)]
pub enum ForceDirection {
    /// Constant direction. Distance is measured from `anchor`.
    Directional { anchor: Vec3, direction: Vec3 },
    /// Away from `center` (toward it for negative strength).
    Radial { center: Vec3 },
    /// Away from the nearest point of the segment `a..b`.
    RadialCapsule { a: Vec3, b: Vec3 },
    /// Swirl around the line through `anchor` along `axis`, plus `pull` toward it.
    Vortex { anchor: Vec3, axis: Vec3, pull: f32 },
    /// Caller-supplied path field.
    Spline(Arc<dyn VectorField>),
    /// Caller-supplied volumetric field.
    VectorField(Arc<dyn VectorField>),
}

impl fmt::Debug for ForceDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForceDirection::Directional { anchor, direction } => f
                .debug_struct("Directional")
                .field("anchor", anchor)
                .field("direction", direction)
                .finish(),
            ForceDirection::Radial { center } => {
                f.debug_struct("Radial").field("center", center).finish()
            }
            ForceDirection::RadialCapsule { a, b } => {
                f.debug_struct("RadialCapsule").field("a", a).field("b", b).finish()
            }
            ForceDirection::Vortex { anchor, axis, pull } => f
                .debug_struct("Vortex")
                .field("anchor", anchor)
                .field("axis", axis)
                .field("pull", pull)
                .finish(),
            ForceDirection::Spline(_) => f.write_str("Spline(..)"),
            ForceDirection::VectorField(_) => f.write_str("VectorField(..)"),
        }
    }
}

/// Strength profile and filtering shared by every force.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForceProperties {
    pub group_mask: u32,
    pub strength_near: f32,
    pub strength_far: f32,
    /// Distances up to `range_inner` receive the full near strength.
    pub range_inner: f32,
    /// Distances beyond `range_outer` receive nothing.
    pub range_outer: f32,
    pub attenuation_exp: f32,
}

impl Default for ForceProperties {
    fn default() -> Self {
        Self {
            group_mask: 0xffff_ffff,
            strength_near: 0.0,
            strength_far: 0.0,
            range_inner: 0.0,
            range_outer: 0.0,
            attenuation_exp: 0.25,
        }
    }
}

impl ForceProperties {
    /// `range_outer >= range_inner >= 0` with a non-empty outer range and a
    /// finite, non-negative attenuation exponent.
    /// Anything else evaluates to zero rather than failing the step.
    pub fn is_well_formed(&self) -> bool {
        self.range_inner.is_finite()
            && self.range_outer.is_finite()
            && self.attenuation_exp.is_finite()
            && self.attenuation_exp >= 0.0
            && self.range_inner >= 0.0
            && self.range_outer > 0.0
            && self.range_outer >= self.range_inner
    }

    /// Scalar strength at distance `dist`:
    /// `lerp(near, far, d) * (1 - d)^attenuation_exp`, with `d` the normalized
    /// position of `dist` inside `[range_inner, range_outer]`.
    pub fn strength_at(&self, dist: f32) -> f32 {
        if !self.is_well_formed() || dist.is_nan() || dist > self.range_outer {
            return 0.0;
        }
        let span = self.range_outer - self.range_inner;
        let d = if dist <= self.range_inner || span <= 0.0 {
            0.0
        } else {
            ((dist - self.range_inner) / span).clamp(0.0, 1.0)
        };
        let base = self.strength_near + (self.strength_far - self.strength_near) * d;
        base * (1.0 - d).powf(self.attenuation_exp)
    }
}

/// One force submitted for the next step.
#[derive(Clone, Debug)]
pub struct ForceDescriptor {
    pub shape: ForceShape,
    pub direction: ForceDirection,
    pub props: ForceProperties,
}

impl ForceDescriptor {
    /// Spherical radial push with linear-ish falloff to zero at `radius`.
    /// Negative `strength` pulls toward `center`.
    pub fn radial_sphere(center: Vec3, radius: f32, strength: f32) -> Self {
        Self {
            shape: ForceShape::Sphere { center, radius },
            direction: ForceDirection::Radial { center },
            props: ForceProperties {
                strength_near: strength,
                strength_far: 0.0,
                range_inner: 0.0,
                range_outer: radius,
                attenuation_exp: 0.5,
                ..Default::default()
            },
        }
    }

    /// Uniform acceleration everywhere, e.g. gravity.
    pub fn uniform(acceleration: Vec3) -> Self {
        let strength = acceleration.length();
        Self {
            shape: ForceShape::All,
            direction: ForceDirection::Directional {
                anchor: Vec3::ZERO,
                direction: acceleration,
            },
            props: ForceProperties {
                strength_near: strength,
                strength_far: strength,
                range_inner: f32::MAX,
                range_outer: f32::MAX,
                attenuation_exp: 0.0,
                ..Default::default()
            },
        }
    }
}
