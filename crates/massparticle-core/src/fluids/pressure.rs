use glam::Vec3;

use crate::fluids::viscosity::viscosity_acceleration;
use crate::fluids::{spiky_gradient, SphConstants};
use crate::grid::SpatialHashGrid;
use crate::parallel::map_indices;
use crate::particle::Particle;

/// Full SPH response. Requires densities from [`compute_density`](super::density::compute_density).
///
/// Pressure uses the symmetric form
/// `a_i = -sum_j m (p_i / rho_i^2 + p_j / rho_j^2) grad W_spiky(x_i - x_j)`,
/// so both particles of a pair receive forces of identical magnitude.
/// Viscosity is added per pair through [`viscosity_acceleration`].
pub fn apply_pressure(
    particles: &[Particle],
    acceleration: &mut [Vec3],
    grid: &SpatialHashGrid,
    sph: &SphConstants,
) {
    let h = sph.smoothing_radius;
    let accels = map_indices(particles.len(), |i| {
        let p_i = &particles[i];
        let rho_i = p_i.density.max(1e-6);
        let press_i = sph.pressure(p_i.density) / (rho_i * rho_i);
        let mut acc = Vec3::ZERO;

        grid.query_neighbors(p_i.position, |j| {
            let j = j as usize;
            if j == i {
                return;
            }
            let p_j = &particles[j];
            let r = p_i.position - p_j.position;
            let r_len = r.length();
            if r_len >= h {
                return;
            }
            let rho_j = p_j.density.max(1e-6);
            let press_j = sph.pressure(p_j.density) / (rho_j * rho_j);

            acc -= spiky_gradient(r, r_len, h) * (sph.mass * (press_i + press_j));
            acc += viscosity_acceleration(
                p_i.velocity,
                p_j.velocity,
                rho_i,
                rho_j,
                r_len,
                h,
                sph.mass,
                sph.viscosity,
            );
        });
        acc
    });

    for (acc, a) in acceleration.iter_mut().zip(accels) {
        *acc += a;
    }
}

/// Cheaper SPH response: each particle is pushed by its own pressure only,
/// `a_i = -sum_j m 2 p_i / rho_i^2 grad W_spiky`, with no viscosity and no
/// neighbor pressure reads.
pub fn apply_pressure_estimate(
    particles: &[Particle],
    acceleration: &mut [Vec3],
    grid: &SpatialHashGrid,
    sph: &SphConstants,
) {
    let h = sph.smoothing_radius;
    let accels = map_indices(particles.len(), |i| {
        let p_i = &particles[i];
        let rho_i = p_i.density.max(1e-6);
        let scale = sph.mass * 2.0 * sph.pressure(p_i.density) / (rho_i * rho_i);
        if scale == 0.0 {
            return Vec3::ZERO;
        }

        let mut grad = Vec3::ZERO;
        grid.query_neighbors(p_i.position, |j| {
            let j = j as usize;
            if j == i {
                return;
            }
            let r = p_i.position - particles[j].position;
            grad += spiky_gradient(r, r.length(), h);
        });
        -grad * scale
    });

    for (acc, a) in acceleration.iter_mut().zip(accels) {
        *acc += a;
    }
}
