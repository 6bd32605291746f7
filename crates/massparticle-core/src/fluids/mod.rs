//! Particle-particle interaction: impulse repulsion and SPH density/pressure.
//!
//! Every pass is a per-particle gather over the 3x3x3 grid stencil. Each
//! particle sums contributions from its own neighbors and nothing writes to
//! another particle, so cell traversal order only changes floating-point
//! summation order.

pub mod density;
pub mod impulse;
pub mod pressure;
pub mod viscosity;

use glam::Vec3;
use std::f32::consts::PI;

use crate::config::{KernelParameters, SolverType};
use crate::grid::SpatialHashGrid;
use crate::particle::ParticleStore;

/// Poly6 smoothing kernel for SPH density estimation.
///
/// Returns `W(r, h) = 315 / (64 * PI * h^9) * (h^2 - r^2)^3` when `r < h`,
/// and `0.0` when `r >= h`.
#[inline]
pub fn poly6_kernel(r: f32, h: f32) -> f32 {
    if r >= h {
        return 0.0;
    }
    let h2 = h * h;
    let r2 = r * r;
    let diff = h2 - r2;
    let h9 = h2 * h2 * h2 * h2 * h; // h^9
    let coeff = 315.0 / (64.0 * PI * h9);
    coeff * diff * diff * diff
}

/// Spiky kernel gradient for SPH pressure.
///
/// Returns `(r / r_len) * (-45 / (PI * h^6)) * (h - r_len)^2` when
/// `r_len < h` and `r_len > 1e-6`, and `Vec3::ZERO` otherwise.
#[inline]
pub fn spiky_gradient(r: Vec3, r_len: f32, h: f32) -> Vec3 {
    if r_len >= h || r_len <= 1e-6 {
        return Vec3::ZERO;
    }
    let h6 = h * h * h * h * h * h;
    let coeff = -45.0 / (PI * h6);
    let diff = h - r_len;
    (r / r_len) * coeff * diff * diff
}

/// Laplacian of the viscosity kernel: `45 / (PI * h^6) * (h - r)` for `r < h`.
#[inline]
pub fn viscosity_laplacian(r: f32, h: f32) -> f32 {
    if r >= h {
        return 0.0;
    }
    let h6 = h * h * h * h * h * h;
    45.0 / (PI * h6) * (h - r)
}

/// Material constants latched from [`KernelParameters`] for one step.
#[derive(Clone, Copy, Debug)]
pub struct SphConstants {
    pub mass: f32,
    pub rest_density: f32,
    pub stiffness: f32,
    pub viscosity: f32,
    pub smoothing_radius: f32,
}

impl SphConstants {
    pub fn from_params(params: &KernelParameters) -> Self {
        Self {
            mass: params.sph_particle_mass,
            rest_density: params.sph_rest_density,
            stiffness: params.pressure_stiffness,
            viscosity: params.sph_viscosity,
            smoothing_radius: params.smoothing_radius(),
        }
    }

    /// Equation of state, clamped so particles never attract through pressure.
    #[inline]
    pub fn pressure(&self, density: f32) -> f32 {
        (self.stiffness * (density - self.rest_density)).max(0.0)
    }
}

/// Run the interaction model selected by `params.solver_type`, adding the
/// result into `store.acceleration`. Densities are zeroed outside SPH modes.
pub fn solve_interactions(
    store: &mut ParticleStore,
    grid: &SpatialHashGrid,
    params: &KernelParameters,
) {
    let (particles, acceleration) = store.split_mut();

    match params.solver_type {
        SolverType::NoInteraction => {
            density::clear_density(particles);
        }
        SolverType::Impulse => {
            density::clear_density(particles);
            impulse::apply_impulse(
                particles,
                acceleration,
                grid,
                params.interaction_radius(),
                params.pressure_stiffness,
            );
        }
        SolverType::Sph => {
            let sph = SphConstants::from_params(params);
            density::compute_density(particles, grid, sph.mass, sph.smoothing_radius);
            pressure::apply_pressure(particles, acceleration, grid, &sph);
        }
        SolverType::SphEstimate => {
            let sph = SphConstants::from_params(params);
            density::compute_density(particles, grid, sph.mass, sph.smoothing_radius);
            pressure::apply_pressure_estimate(particles, acceleration, grid, &sph);
        }
    }
}
