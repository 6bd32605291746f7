use glam::Vec3;

use crate::config::KernelParameters;
use crate::particle::ParticleStore;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Advance every particle by `dt` using the accumulated acceleration, then
/// retire expired particles. Returns how many were retired.
///
/// Semi-implicit Euler with exponential-style damping:
/// `v += a dt; v *= max(1 - decelerate dt, 0); x += v dt`. The damping factor
/// is floored at zero so a large `dt` cannot flip the velocity.
///
/// Containment is left to the wall springs and colliders. Compaction swaps
/// with the last element, so indices from before this call are invalid
/// afterwards.
pub fn integrate(store: &mut ParticleStore, params: &KernelParameters, dt: f32) -> usize {
    let damping = (1.0 - params.decelerate * dt).max(0.0);

    let (particles, acceleration) = store.split_mut();

    let advance = |p: &mut crate::particle::Particle, acc: &Vec3| {
        let vel = (p.velocity + *acc * dt) * damping;
        p.position += vel * dt;
        p.velocity = vel;
        p.speed = vel.length();
        p.lifetime -= dt;
    };

    #[cfg(feature = "parallel")]
    particles
        .par_iter_mut()
        .zip(acceleration.par_iter())
        .for_each(|(p, acc)| advance(p, acc));

    #[cfg(not(feature = "parallel"))]
    particles
        .iter_mut()
        .zip(acceleration.iter())
        .for_each(|(p, acc)| advance(p, acc));

    store.compact()
}
