use crate::fluids::poly6_kernel;
use crate::grid::SpatialHashGrid;
use crate::parallel::map_indices;
use crate::particle::Particle;

/// SPH density pass: `rho_i = sum_j mass * W_poly6(|x_i - x_j|, h)`, self included.
///
/// Uniform per-particle mass. Densities are gathered first and written after,
/// so every particle sees the same positions.
pub fn compute_density(particles: &mut [Particle], grid: &SpatialHashGrid, mass: f32, h: f32) {
    let densities = {
        let view: &[Particle] = particles;
        map_indices(view.len(), |i| {
            let pos_i = view[i].position;
            let mut rho = 0.0_f32;
            grid.query_neighbors(pos_i, |j| {
                let r_len = (pos_i - view[j as usize].position).length();
                if r_len < h {
                    rho += mass * poly6_kernel(r_len, h);
                }
            });
            rho
        })
    };

    for (p, rho) in particles.iter_mut().zip(densities) {
        p.density = rho;
    }
}

/// Density is only meaningful in SPH modes; everything else reports zero.
pub fn clear_density(particles: &mut [Particle]) {
    for p in particles.iter_mut() {
        p.density = 0.0;
    }
}
