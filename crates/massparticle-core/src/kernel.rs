use glam::{Mat4, Vec3};

use crate::colliders::{
    apply_colliders, apply_world_walls, prepare_colliders, shift_collision_flags,
    ColliderDescriptor, ColliderProperties, HitEvent,
};
use crate::config::{KernelParameters, SolverType};
use crate::error::{KernelError, Result};
use crate::fluids::solve_interactions;
use crate::forces::{apply_forces, prepare_forces, ForceDescriptor};
use crate::grid::SpatialHashGrid;
use crate::integrator::integrate;
use crate::particle::{Particle, ParticleStore};
use crate::quality::StepStats;
use crate::shapes::Shape;
use crate::spawn::Spawner;

/// Upper bound on substeps per [`MassKernel::step`]; frame deltas longer than
/// `MAX_SUBSTEPS * timestep` are integrated with proportionally larger substeps.
pub const MAX_SUBSTEPS: u32 = 8;

const DEFAULT_SEED: u64 = 0x6d70_6b65_726e_656c;

/// The mass-particle simulation kernel.
///
/// Owns the particle store, the spatial grid and the descriptor lists
/// submitted for the next step. Colliders and forces are consumed by
/// [`step`](Self::step) and dropped when it returns.
pub struct MassKernel {
    params: KernelParameters,
    particles: ParticleStore,
    grid: SpatialHashGrid,
    spawner: Spawner,
    colliders: Vec<ColliderDescriptor>,
    forces: Vec<ForceDescriptor>,
    hit_events: Vec<HitEvent>,
    stats: StepStats,
}

impl MassKernel {
    /// Create a kernel with validated parameters.
    pub fn new(params: KernelParameters) -> Result<Self> {
        Self::with_seed(params, DEFAULT_SEED)
    }

    /// Like [`new`](Self::new) with an explicit seed for spawn placement.
    pub fn with_seed(params: KernelParameters, seed: u64) -> Result<Self> {
        let params = params.normalized()?;
        warn_on_clamped_radii(&params);
        log::info!(
            "mass kernel initialized: capacity {}, grid {}, solver {:?}",
            params.max_particles,
            params.world_div,
            params.solver_type
        );
        Ok(Self {
            particles: ParticleStore::new(params.max_particles),
            grid: SpatialHashGrid::new(&params),
            spawner: Spawner::new(seed),
            colliders: Vec::new(),
            forces: Vec::new(),
            hit_events: Vec::new(),
            stats: StepStats {
                solver: params.solver_type,
                ..Default::default()
            },
            params,
        })
    }

    pub fn parameters(&self) -> &KernelParameters {
        &self.params
    }

    /// Replace the whole configuration. On error the previous configuration
    /// stays in effect. Shrinking `max_particles` drops the particles beyond
    /// the new capacity.
    pub fn set_parameters(&mut self, params: KernelParameters) -> Result<()> {
        let params = match params.normalized() {
            Ok(p) => p,
            Err(e) => {
                log::warn!("rejected kernel parameters: {e}");
                return Err(e);
            }
        };
        warn_on_clamped_radii(&params);

        if params.max_particles != self.particles.capacity() {
            let dropped = self.particles.set_capacity(params.max_particles);
            if dropped > 0 {
                log::warn!(
                    "capacity reduced to {}, dropped {} particles",
                    params.max_particles,
                    dropped
                );
            }
        }
        if params.world_center != self.params.world_center
            || params.world_size != self.params.world_size
            || params.world_div != self.params.world_div
        {
            self.grid.configure(&params);
        }

        log::info!(
            "kernel parameters updated: grid {}, solver {:?}",
            params.world_div,
            params.solver_type
        );
        self.params = params;
        Ok(())
    }

    /// Switch the interaction model without touching anything else.
    pub fn set_solver_type(&mut self, solver: SolverType) {
        self.params.solver_type = solver;
    }

    /// Advance the simulation by `dt` seconds.
    ///
    /// `dt` is split into equal substeps no longer than `timestep` (at most
    /// [`MAX_SUBSTEPS`]). Collision flags roll over once per call, so a
    /// collider touched in any substep counts as touched this step.
    /// Non-positive or non-finite `dt` leaves the state untouched.
    pub fn step(&mut self, dt: f32) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }

        let substeps = ((dt / self.params.timestep).ceil() as u32).clamp(1, MAX_SUBSTEPS);
        let sub_dt = dt / substeps as f32;

        self.hit_events.clear();
        shift_collision_flags(self.particles.as_mut_slice());

        let colliders = prepare_colliders(&self.colliders, &self.grid, self.params.particle_size);
        let forces = prepare_forces(&self.forces, &self.grid);

        let mut retired = 0;
        for _ in 0..substeps {
            self.particles.reset_acceleration(self.params.gravity);
            self.grid.build(self.particles.as_mut_slice());

            solve_interactions(&mut self.particles, &self.grid, &self.params);

            let (particles, acceleration) = self.particles.split_mut();
            apply_colliders(
                particles,
                acceleration,
                &colliders,
                &self.grid,
                self.params.particle_size,
                &mut self.hit_events,
            );
            apply_world_walls(particles, acceleration, &self.params);
            apply_forces(particles, acceleration, &forces, &self.grid);

            retired += integrate(&mut self.particles, &self.params, sub_dt);
        }

        self.colliders.clear();
        self.forces.clear();

        self.stats = StepStats {
            substeps,
            particle_count: self.particles.len() as u32,
            retired: retired as u32,
            hit_events: self.hit_events.len() as u32,
            solver: self.params.solver_type,
        };
        log::trace!(
            "step dt={dt:.4} substeps={substeps} particles={} retired={retired}",
            self.particles.len()
        );
    }

    /// Statistics from the most recent [`step`](Self::step).
    pub fn last_step_stats(&self) -> StepStats {
        self.stats
    }

    /// Hit-enter events raised by the most recent step.
    pub fn hit_events(&self) -> &[HitEvent] {
        &self.hit_events
    }

    // ---------- particles ----------

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    pub fn particles(&self) -> &[Particle] {
        self.particles.as_slice()
    }

    /// Copy the live particles into `dst`, which must hold at least
    /// [`particle_count`](Self::particle_count) records.
    pub fn copy_particles(&self, dst: &mut [Particle]) -> Result<usize> {
        let src = self.particles.as_slice();
        if dst.len() < src.len() {
            return Err(KernelError::BufferTooSmall {
                needed: src.len(),
                provided: dst.len(),
            });
        }
        dst[..src.len()].copy_from_slice(src);
        Ok(src.len())
    }

    /// Replace the live particle set with `src`. Records beyond capacity are
    /// ignored and records with `lifetime <= 0` are discarded immediately.
    /// Returns the resulting particle count.
    pub fn write_particles(&mut self, src: &[Particle]) -> usize {
        let accepted = self.particles.overwrite(src);
        if accepted < src.len() {
            log::debug!(
                "write_particles truncated {} records to capacity {}",
                src.len(),
                accepted
            );
        }
        self.particles.compact();
        self.particles.len()
    }

    pub fn clear_particles(&mut self) {
        self.particles.clear();
    }

    fn admit(&mut self, requested: usize, batch: Vec<Particle>) -> usize {
        let added = self.particles.extend_clamped(batch);
        if added < requested {
            log::debug!("spawn clamped to capacity: requested {requested}, spawned {added}");
        }
        added
    }

    /// Scatter `count` particles uniformly inside a sphere. Returns how many fit.
    pub fn spawn_sphere(
        &mut self,
        center: Vec3,
        radius: f32,
        count: usize,
        base_velocity: Vec3,
        velocity_jitter: f32,
    ) -> usize {
        let n = count.min(self.particles.remaining());
        let batch = self.spawner.sphere(
            center,
            radius,
            n,
            base_velocity,
            velocity_jitter,
            self.params.lifetime,
        );
        self.admit(count, batch)
    }

    /// Scatter `count` particles uniformly inside an axis-aligned box of full extent `size`.
    pub fn spawn_box(
        &mut self,
        center: Vec3,
        size: Vec3,
        count: usize,
        base_velocity: Vec3,
        velocity_jitter: f32,
    ) -> usize {
        let n = count.min(self.particles.remaining());
        let batch = self.spawner.cube(
            center,
            size,
            n,
            base_velocity,
            velocity_jitter,
            self.params.lifetime,
        );
        self.admit(count, batch)
    }

    /// Scatter inside a radius-0.5 sphere mapped through `transform`.
    pub fn spawn_sphere_transform(
        &mut self,
        transform: &Mat4,
        count: usize,
        base_velocity: Vec3,
        velocity_jitter: f32,
    ) -> usize {
        let n = count.min(self.particles.remaining());
        let batch = self.spawner.sphere_transform(
            transform,
            n,
            base_velocity,
            velocity_jitter,
            self.params.lifetime,
        );
        self.admit(count, batch)
    }

    /// Scatter inside the unit cube `[-0.5, 0.5]^3` mapped through `transform`.
    pub fn spawn_box_transform(
        &mut self,
        transform: &Mat4,
        count: usize,
        base_velocity: Vec3,
        velocity_jitter: f32,
    ) -> usize {
        let n = count.min(self.particles.remaining());
        let batch = self.spawner.cube_transform(
            transform,
            n,
            base_velocity,
            velocity_jitter,
            self.params.lifetime,
        );
        self.admit(count, batch)
    }

    // ---------- descriptors ----------

    /// Queue a collider for the next step only.
    pub fn submit_collider(&mut self, collider: ColliderDescriptor) {
        self.colliders.push(collider);
    }

    pub fn add_sphere_collider(&mut self, props: ColliderProperties, center: Vec3, radius: f32) {
        self.submit_collider(ColliderDescriptor {
            shape: Shape::Sphere { center, radius },
            props,
        });
    }

    pub fn add_capsule_collider(&mut self, props: ColliderProperties, a: Vec3, b: Vec3, radius: f32) {
        self.submit_collider(ColliderDescriptor {
            shape: Shape::Capsule { a, b, radius },
            props,
        });
    }

    /// Box of full extent `size` in the local frame of `transform`.
    pub fn add_box_collider(&mut self, props: ColliderProperties, transform: Mat4, size: Vec3) {
        self.submit_collider(ColliderDescriptor {
            shape: Shape::Box {
                transform,
                half_extents: size * 0.5,
            },
            props,
        });
    }

    /// Queue a force for the next step only.
    pub fn submit_force(&mut self, force: ForceDescriptor) {
        self.forces.push(force);
    }

    pub fn add_radial_sphere_force(&mut self, center: Vec3, radius: f32, strength: f32) {
        self.submit_force(ForceDescriptor::radial_sphere(center, radius, strength));
    }

    pub fn pending_colliders(&self) -> &[ColliderDescriptor] {
        &self.colliders
    }

    pub fn pending_forces(&self) -> &[ForceDescriptor] {
        &self.forces
    }

    pub fn clear_colliders_and_forces(&mut self) {
        self.colliders.clear();
        self.forces.clear();
    }
}

fn warn_on_clamped_radii(params: &KernelParameters) {
    let cell = params.cell_size().min_element();
    if params.sph_smoothing_radius > cell {
        log::warn!(
            "smoothing radius {} exceeds grid cell {cell}, using {cell}",
            params.sph_smoothing_radius
        );
    }
    if params.particle_size * 2.0 > cell {
        log::warn!(
            "particle diameter {} exceeds grid cell {cell}, contacts capped at {cell}",
            params.particle_size * 2.0
        );
    }
}
