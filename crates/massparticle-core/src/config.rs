use glam::{UVec3, Vec3};

use crate::error::{KernelError, Result};

/// Upper bound on the grid's cell count. Keeps every linear cell index
/// inside `u32` and the per-cell tables at a few hundred megabytes at most.
pub const MAX_GRID_CELLS: u64 = 1 << 24;

/// Upper bound on `max_particles`. The store reserves its full capacity for
/// both the particle records and the acceleration accumulator.
pub const MAX_PARTICLES: usize = 1 << 22;

/// `div.x * div.y * div.z` without overflow.
#[inline]
pub fn lattice_cells(div: UVec3) -> Option<u64> {
    (div.x as u64)
        .checked_mul(div.y as u64)?
        .checked_mul(div.z as u64)
}

/// Pairwise interaction model run by the density/pressure solver.
#[repr(u32)]
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SolverType {
    /// Penalty repulsion between overlapping particle spheres.
    #[default]
    Impulse = 0,
    /// Two-pass SPH: density, then symmetric pressure + viscosity.
    Sph = 1,
    /// Full density pass, single-pressure response, no viscosity.
    SphEstimate = 2,
    /// Particles ignore each other.
    NoInteraction = 3,
}

impl SolverType {
    /// Map the wire value used by bindings. Unknown values fall back to `Impulse`.
    pub fn from_u32(v: u32) -> Self {
        match v {
            1 => SolverType::Sph,
            2 => SolverType::SphEstimate,
            3 => SolverType::NoInteraction,
            _ => SolverType::Impulse,
        }
    }

    pub fn uses_density(self) -> bool {
        matches!(self, SolverType::Sph | SolverType::SphEstimate)
    }
}

/// Process-wide simulation configuration, replaced wholesale between steps.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct KernelParameters {
    pub world_center: Vec3,
    pub world_size: Vec3,
    pub world_div: UVec3,
    /// `world_div / world_size`. Derived; overwritten whenever parameters are accepted.
    pub scaler: Vec3,
    pub solver_type: SolverType,
    /// Lifetime assigned to newly spawned particles, in seconds.
    pub lifetime: f32,
    /// Largest substep the integrator will take.
    pub timestep: f32,
    pub decelerate: f32,
    pub pressure_stiffness: f32,
    pub wall_stiffness: f32,
    pub max_particles: usize,
    /// Radius of each particle's implicit collision sphere.
    pub particle_size: f32,
    pub sph_rest_density: f32,
    pub sph_particle_mass: f32,
    pub sph_viscosity: f32,
    /// Requested SPH smoothing radius; capped at the smallest grid cell extent.
    pub sph_smoothing_radius: f32,
    /// Uniform acceleration applied to every particle.
    pub gravity: Vec3,
}

impl Default for KernelParameters {
    fn default() -> Self {
        let world_size = Vec3::splat(10.0);
        let world_div = UVec3::splat(32);
        Self {
            world_center: Vec3::ZERO,
            world_size,
            world_div,
            scaler: world_div.as_vec3() / world_size,
            solver_type: SolverType::Impulse,
            lifetime: 20.0,
            timestep: 1.0 / 60.0,
            decelerate: 0.5,
            pressure_stiffness: 500.0,
            wall_stiffness: 3000.0,
            max_particles: 100_000,
            particle_size: 0.08,
            sph_rest_density: 1000.0,
            sph_particle_mass: 0.02,
            sph_viscosity: 0.1,
            sph_smoothing_radius: 0.2,
            gravity: Vec3::ZERO,
        }
    }
}

impl KernelParameters {
    /// Check the invariants every other component relies on.
    pub fn validate(&self) -> Result<()> {
        match lattice_cells(self.world_div) {
            Some(cells) if cells > 0 && cells <= MAX_GRID_CELLS => {}
            _ => return Err(KernelError::InvalidGridDivision(self.world_div)),
        }
        if !self.world_size.is_finite() || self.world_size.min_element() <= 0.0 {
            return Err(KernelError::InvalidWorldSize(self.world_size));
        }
        if !self.world_center.is_finite() {
            return Err(KernelError::InvalidParameter(format!(
                "world center must be finite, got {}",
                self.world_center
            )));
        }
        if !(self.timestep.is_finite() && self.timestep > 0.0) {
            return Err(KernelError::InvalidParameter(format!(
                "timestep must be positive, got {}",
                self.timestep
            )));
        }
        if self.max_particles == 0 || self.max_particles > MAX_PARTICLES {
            return Err(KernelError::InvalidParameter(format!(
                "max_particles must be in 1..={MAX_PARTICLES}, got {}",
                self.max_particles
            )));
        }
        if !(self.particle_size.is_finite() && self.particle_size > 0.0) {
            return Err(KernelError::InvalidParameter(format!(
                "particle_size must be positive, got {}",
                self.particle_size
            )));
        }
        Ok(())
    }

    /// Validate and refresh the derived `scaler`.
    pub fn normalized(mut self) -> Result<Self> {
        self.validate()?;
        self.scaler = self.world_div.as_vec3() / self.world_size;
        Ok(self)
    }

    #[inline]
    pub fn world_min(&self) -> Vec3 {
        self.world_center - self.world_size * 0.5
    }

    #[inline]
    pub fn world_max(&self) -> Vec3 {
        self.world_center + self.world_size * 0.5
    }

    /// Extent of one grid cell along each axis.
    #[inline]
    pub fn cell_size(&self) -> Vec3 {
        self.world_size / self.world_div.as_vec3()
    }

    /// Smoothing radius actually used: neighbors beyond one cell are never visited.
    pub fn smoothing_radius(&self) -> f32 {
        self.sph_smoothing_radius.min(self.cell_size().min_element())
    }

    /// Contact distance for the impulse solver (two particle radii), capped like
    /// [`smoothing_radius`](Self::smoothing_radius).
    pub fn interaction_radius(&self) -> f32 {
        (self.particle_size * 2.0).min(self.cell_size().min_element())
    }
}
