use glam::Vec3;

use crate::grid::SpatialHashGrid;
use crate::parallel::map_indices;
use crate::particle::Particle;

/// Penalty repulsion between overlapping particle spheres.
///
/// For every neighbor closer than `contact_distance` (two particle radii) the
/// particle is pushed away along the contact normal with acceleration
/// `overlap * stiffness`. No density field is computed.
///
/// Exactly coincident pairs have no normal; they are split along X by index
/// so the pair still receives equal and opposite pushes.
pub fn apply_impulse(
    particles: &[Particle],
    acceleration: &mut [Vec3],
    grid: &SpatialHashGrid,
    contact_distance: f32,
    stiffness: f32,
) {
    let pushes = map_indices(particles.len(), |i| {
        let pos_i = particles[i].position;
        let mut push = Vec3::ZERO;
        grid.query_neighbors(pos_i, |j| {
            let j = j as usize;
            if j == i {
                return;
            }
            let diff = pos_i - particles[j].position;
            let dist = diff.length();
            if dist >= contact_distance {
                return;
            }
            let normal = if dist > 1e-8 {
                diff / dist
            } else if i < j {
                Vec3::NEG_X
            } else {
                Vec3::X
            };
            push += normal * (contact_distance - dist) * stiffness;
        });
        push
    });

    for (acc, push) in acceleration.iter_mut().zip(pushes) {
        *acc += push;
    }
}
