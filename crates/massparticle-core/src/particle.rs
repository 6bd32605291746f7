use glam::Vec3;

/// Group bits given to freshly spawned particles.
pub const DEFAULT_GROUP: u32 = 1;

/// One simulated point mass. 52 bytes, no padding, so whole slices can be
/// handed across a binding boundary with `bytemuck::cast_slice`.
///
/// `hash` is written by the grid build and read until the end of the same
/// step. `hit_prev` is written when a step starts and read until the next one.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    /// `|velocity|`, refreshed every step.
    pub speed: f32,
    /// SPH density estimate; zero unless an SPH solver ran this step.
    pub density: f32,
    /// Linear grid cell index from this step's grid build.
    pub hash: u32,
    /// Collider bits touched during the previous step.
    pub hit_prev: u32,
    /// Collider bits touched during the current step.
    pub hit: u32,
    /// Remaining time to live in seconds.
    pub lifetime: f32,
    /// Capability bits matched against descriptor group masks.
    pub group: u32,
}

impl Particle {
    pub fn new(position: Vec3, velocity: Vec3, lifetime: f32) -> Self {
        Self {
            position,
            velocity,
            speed: velocity.length(),
            density: 0.0,
            hash: 0,
            hit_prev: 0,
            hit: 0,
            lifetime,
            group: DEFAULT_GROUP,
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.lifetime > 0.0
    }

    /// Collider bits that were set this step but not the step before.
    #[inline]
    pub fn hit_entered(&self) -> u32 {
        self.hit & !self.hit_prev
    }

    /// Collider bits that were set the step before but not this step.
    #[inline]
    pub fn hit_exited(&self) -> u32 {
        self.hit_prev & !self.hit
    }
}

/// Fixed-capacity particle array plus the per-step acceleration accumulator.
pub struct ParticleStore {
    capacity: usize,
    particles: Vec<Particle>,
    /// Per-particle acceleration summed by the solver and evaluators, consumed
    /// by the integrator. Same length as `particles`.
    pub acceleration: Vec<Vec3>,
}

impl ParticleStore {
    /// Reserves `capacity` records up front. Kernel capacities are bounded by
    /// [`MAX_PARTICLES`](crate::config::MAX_PARTICLES) during validation.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            particles: Vec::with_capacity(capacity),
            acceleration: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity - self.particles.len()
    }

    pub fn as_slice(&self) -> &[Particle] {
        &self.particles
    }

    pub fn as_mut_slice(&mut self) -> &mut [Particle] {
        &mut self.particles
    }

    /// Split borrow used by the evaluators: particles read-write, accumulator read-write.
    pub fn split_mut(&mut self) -> (&mut [Particle], &mut [Vec3]) {
        (&mut self.particles, &mut self.acceleration)
    }

    /// Append as many of `new` as fit; returns how many were taken.
    pub fn extend_clamped<I: IntoIterator<Item = Particle>>(&mut self, new: I) -> usize {
        let room = self.remaining();
        let before = self.particles.len();
        self.particles.extend(new.into_iter().take(room));
        let added = self.particles.len() - before;
        self.acceleration.resize(self.particles.len(), Vec3::ZERO);
        added
    }

    /// Replace the live set with `src`, truncated to capacity.
    pub fn overwrite(&mut self, src: &[Particle]) -> usize {
        let n = src.len().min(self.capacity);
        self.particles.clear();
        self.particles.extend_from_slice(&src[..n]);
        self.acceleration.clear();
        self.acceleration.resize(n, Vec3::ZERO);
        n
    }

    /// Change the capacity. Live particles past the new capacity are dropped.
    pub fn set_capacity(&mut self, capacity: usize) -> usize {
        let dropped = self.particles.len().saturating_sub(capacity);
        self.particles.truncate(capacity);
        self.acceleration.truncate(capacity);
        self.capacity = capacity;
        if capacity > self.particles.capacity() {
            self.particles.reserve(capacity - self.particles.len());
            self.acceleration.reserve(capacity - self.acceleration.len());
        }
        dropped
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.acceleration.clear();
    }

    pub fn reset_acceleration(&mut self, base: Vec3) {
        self.acceleration.clear();
        self.acceleration.resize(self.particles.len(), base);
    }

    /// Remove every particle with `lifetime <= 0` by swap-with-last.
    /// Indices held from before this call are invalidated.
    pub fn compact(&mut self) -> usize {
        let mut removed = 0;
        let mut i = 0;
        while i < self.particles.len() {
            if self.particles[i].is_alive() {
                i += 1;
            } else {
                self.particles.swap_remove(i);
                self.acceleration.swap_remove(i);
                removed += 1;
            }
        }
        removed
    }
}
