use glam::Vec3;

use crate::fluids::viscosity_laplacian;

/// Viscous acceleration on particle `i` from neighbor `j`:
/// `mu * m * (v_j - v_i) / rho_j * lap(W_visc) / rho_i`.
///
/// Antisymmetric in `i`/`j` for equal masses, so a pair exchanges equal and
/// opposite momentum.
#[inline]
#[allow(clippy::too_many_arguments)]
pub fn viscosity_acceleration(
    vel_i: Vec3,
    vel_j: Vec3,
    rho_i: f32,
    rho_j: f32,
    r_len: f32,
    h: f32,
    mass: f32,
    viscosity: f32,
) -> Vec3 {
    let lap = viscosity_laplacian(r_len, h);
    if lap == 0.0 {
        return Vec3::ZERO;
    }
    (vel_j - vel_i) * (viscosity * mass * lap / (rho_i.max(1e-6) * rho_j.max(1e-6)))
}
