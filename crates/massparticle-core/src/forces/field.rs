use glam::{UVec3, Vec3};

use crate::config::{lattice_cells, MAX_GRID_CELLS};
use crate::error::{KernelError, Result};
use crate::math::closest_point_on_segment;

/// Direction field supplied by the caller for `Spline` and `VectorField` forces.
///
/// The kernel only samples it; the data behind it belongs to the caller.
pub trait VectorField: Send + Sync {
    /// Direction (not necessarily unit length) at `pos`.
    fn sample(&self, pos: Vec3) -> Vec3;

    /// Distance fed into the force's range falloff. Defaults to zero, which
    /// gives every gated particle the near strength.
    fn distance(&self, _pos: Vec3) -> f32 {
        0.0
    }
}

/// Flow along a polyline: the tangent of the nearest segment, with distance
/// measured to the curve.
#[derive(Clone, Debug)]
pub struct PolylineField {
    points: Vec<Vec3>,
}

impl PolylineField {
    pub fn new(points: Vec<Vec3>) -> Result<Self> {
        if points.len() < 2 {
            return Err(KernelError::InvalidParameter(format!(
                "polyline needs at least 2 points, got {}",
                points.len()
            )));
        }
        Ok(Self { points })
    }

    fn nearest_segment(&self, pos: Vec3) -> (f32, Vec3) {
        let mut best = (f32::MAX, Vec3::ZERO);
        for seg in self.points.windows(2) {
            let dist = (pos - closest_point_on_segment(pos, seg[0], seg[1])).length();
            if dist < best.0 {
                best = (dist, (seg[1] - seg[0]).normalize_or_zero());
            }
        }
        best
    }
}

impl VectorField for PolylineField {
    fn sample(&self, pos: Vec3) -> Vec3 {
        self.nearest_segment(pos).1
    }

    fn distance(&self, pos: Vec3) -> f32 {
        self.nearest_segment(pos).0
    }
}

/// Vectors stored on a regular lattice and sampled trilinearly. Positions
/// outside the lattice read the nearest boundary value.
#[derive(Clone, Debug)]
pub struct GridField {
    origin: Vec3,
    spacing: Vec3,
    dims: UVec3,
    values: Vec<Vec3>,
}

impl GridField {
    /// `values` is x-major: index `x + y*dims.x + z*dims.x*dims.y`.
    pub fn new(origin: Vec3, spacing: Vec3, dims: UVec3, values: Vec<Vec3>) -> Result<Self> {
        let expected = match lattice_cells(dims) {
            Some(cells) if cells > 0 && cells <= MAX_GRID_CELLS => cells as usize,
            _ => return Err(KernelError::InvalidGridDivision(dims)),
        };
        if spacing.min_element() <= 0.0 {
            return Err(KernelError::InvalidParameter(format!(
                "field spacing must be positive, got {spacing}"
            )));
        }
        if values.len() != expected {
            return Err(KernelError::InvalidParameter(format!(
                "field expects {expected} values, got {}",
                values.len()
            )));
        }
        Ok(Self {
            origin,
            spacing,
            dims,
            values,
        })
    }

    #[inline]
    fn at(&self, x: u32, y: u32, z: u32) -> Vec3 {
        self.values[(x + y * self.dims.x + z * self.dims.x * self.dims.y) as usize]
    }
}

impl VectorField for GridField {
    fn sample(&self, pos: Vec3) -> Vec3 {
        let max = (self.dims - UVec3::ONE).as_vec3();
        let g = ((pos - self.origin) / self.spacing).clamp(Vec3::ZERO, max);
        let base = g.floor().as_uvec3();
        let hi = (base + UVec3::ONE).min(self.dims - UVec3::ONE);
        let t = g - base.as_vec3();

        let c00 = self.at(base.x, base.y, base.z).lerp(self.at(hi.x, base.y, base.z), t.x);
        let c10 = self.at(base.x, hi.y, base.z).lerp(self.at(hi.x, hi.y, base.z), t.x);
        let c01 = self.at(base.x, base.y, hi.z).lerp(self.at(hi.x, base.y, hi.z), t.x);
        let c11 = self.at(base.x, hi.y, hi.z).lerp(self.at(hi.x, hi.y, hi.z), t.x);
        let c0 = c00.lerp(c10, t.y);
        let c1 = c01.lerp(c11, t.y);
        c0.lerp(c1, t.z)
    }
}
