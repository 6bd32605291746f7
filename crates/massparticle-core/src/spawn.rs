//! Bulk particle placement for the kernel's spawn entry points.
//!
//! Transform variants map Unity-style unit primitives through a matrix: a
//! sphere of radius 0.5 and a cube spanning `[-0.5, 0.5]` on each axis.

use glam::{Mat4, Vec3};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::particle::Particle;

/// Deterministic source of spawn positions and velocity jitter.
pub struct Spawner {
    rng: SmallRng,
}

impl Spawner {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: SmallRng::seed_from_u64(seed),
        }
    }

    /// Uniform point inside a sphere (rejection sampling in the bounding cube).
    pub fn random_in_sphere(&mut self, center: Vec3, radius: f32) -> Vec3 {
        loop {
            let p = self.random_in_unit_cube();
            if p.length_squared() <= 1.0 {
                return center + p * radius;
            }
        }
    }

    /// Uniform point inside an axis-aligned box of full extent `size`.
    pub fn random_in_box(&mut self, center: Vec3, size: Vec3) -> Vec3 {
        center + self.random_in_unit_cube() * size * 0.5
    }

    /// Uniform in `[-1, 1]^3`.
    #[inline]
    pub fn random_in_unit_cube(&mut self) -> Vec3 {
        Vec3::new(
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
            self.rng.gen_range(-1.0..=1.0),
        )
    }

    /// `base` plus independent per-axis noise in `[-jitter, jitter]`.
    pub fn velocity(&mut self, base: Vec3, jitter: f32) -> Vec3 {
        if jitter == 0.0 {
            return base;
        }
        base + self.random_in_unit_cube() * jitter
    }

    pub fn sphere(
        &mut self,
        center: Vec3,
        radius: f32,
        count: usize,
        base_velocity: Vec3,
        velocity_jitter: f32,
        lifetime: f32,
    ) -> Vec<Particle> {
        (0..count)
            .map(|_| {
                let pos = self.random_in_sphere(center, radius);
                let vel = self.velocity(base_velocity, velocity_jitter);
                Particle::new(pos, vel, lifetime)
            })
            .collect()
    }

    pub fn cube(
        &mut self,
        center: Vec3,
        size: Vec3,
        count: usize,
        base_velocity: Vec3,
        velocity_jitter: f32,
        lifetime: f32,
    ) -> Vec<Particle> {
        (0..count)
            .map(|_| {
                let pos = self.random_in_box(center, size);
                let vel = self.velocity(base_velocity, velocity_jitter);
                Particle::new(pos, vel, lifetime)
            })
            .collect()
    }

    pub fn sphere_transform(
        &mut self,
        transform: &Mat4,
        count: usize,
        base_velocity: Vec3,
        velocity_jitter: f32,
        lifetime: f32,
    ) -> Vec<Particle> {
        (0..count)
            .map(|_| {
                let local = self.random_in_sphere(Vec3::ZERO, 0.5);
                let vel = self.velocity(base_velocity, velocity_jitter);
                Particle::new(transform.transform_point3(local), vel, lifetime)
            })
            .collect()
    }

    pub fn cube_transform(
        &mut self,
        transform: &Mat4,
        count: usize,
        base_velocity: Vec3,
        velocity_jitter: f32,
        lifetime: f32,
    ) -> Vec<Particle> {
        (0..count)
            .map(|_| {
                let local = self.random_in_box(Vec3::ZERO, Vec3::ONE);
                let vel = self.velocity(base_velocity, velocity_jitter);
                Particle::new(transform.transform_point3(local), vel, lifetime)
            })
            .collect()
    }
}
