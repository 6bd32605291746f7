use glam::{Mat4, Vec3};
use massparticle_core::colliders::ColliderProperties;
use massparticle_core::config::{KernelParameters, SolverType};
use massparticle_core::forces::{ForceDescriptor, ForceDirection, ForceProperties, ForceShape};
use massparticle_core::kernel::MassKernel;
use massparticle_core::materials::MaterialPreset;
use massparticle_core::particle::Particle;
use massparticle_core::quality::AdaptiveSolver;
use wasm_bindgen::prelude::*;

/// Floats per hit event in the flattened event buffer:
/// `[x, y, z, owner_id, damage, collider_slot]`.
const HIT_EVENT_STRIDE: usize = 6;

#[wasm_bindgen]
pub struct MassWorld {
    kernel: MassKernel,
    adaptive: AdaptiveSolver,
    readback: Vec<Particle>,
}

fn seed_from_entropy() -> u64 {
    let mut buf = [0u8; 8];
    match getrandom::getrandom(&mut buf) {
        Ok(()) => u64::from_le_bytes(buf),
        Err(_) => js_sys::Date::now().to_bits(),
    }
}

fn to_js_error(e: massparticle_core::KernelError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

fn mat4_from(cols: &[f32]) -> Option<Mat4> {
    let cols: &[f32; 16] = cols.try_into().ok()?;
    Some(Mat4::from_cols_array(cols))
}

fn collider_props(group_mask: u32, owner_id: i32, stiffness: f32, bounce: f32, damage: f32) -> ColliderProperties {
    ColliderProperties {
        group_mask,
        owner_id,
        stiffness,
        bounce,
        damage_on_hit: damage,
    }
}

#[wasm_bindgen]
impl MassWorld {
    /// `seed == 0` draws spawn randomness from the host's entropy source.
    #[wasm_bindgen(constructor)]
    pub fn new(max_particles: usize, seed: u32) -> Result<MassWorld, JsValue> {
        web_sys::console::log_1(
            &format!("WASM MassWorld created: capacity {}", max_particles).into()
        );

        let params = KernelParameters {
            max_particles,
            ..Default::default()
        };
        let seed = if seed == 0 { seed_from_entropy() } else { seed as u64 };
        let kernel = MassKernel::with_seed(params, seed).map_err(to_js_error)?;
        let adaptive = AdaptiveSolver::new(kernel.parameters().solver_type);

        Ok(MassWorld {
            kernel,
            adaptive,
            readback: Vec::new(),
        })
    }

    /// Advance by `dt` seconds. Returns the wall time spent in milliseconds.
    #[wasm_bindgen]
    pub fn step(&mut self, dt: f32) -> f32 {
        let start = js_sys::Date::now();
        self.kernel.set_solver_type(self.adaptive.solver());
        self.kernel.step(dt);
        let elapsed = (js_sys::Date::now() - start) as f32;
        self.adaptive.update(elapsed);
        elapsed
    }

    #[wasm_bindgen]
    pub fn set_adaptive(&mut self, enabled: bool, budget_ms: f32) {
        self.adaptive.enabled = enabled;
        self.adaptive.budget_ms = budget_ms;
    }

    // ---------- configuration ----------

    #[wasm_bindgen]
    pub fn set_world(
        &mut self,
        cx: f32, cy: f32, cz: f32,
        sx: f32, sy: f32, sz: f32,
        div_x: u32, div_y: u32, div_z: u32,
    ) -> Result<(), JsValue> {
        let params = KernelParameters {
            world_center: Vec3::new(cx, cy, cz),
            world_size: Vec3::new(sx, sy, sz),
            world_div: glam::UVec3::new(div_x, div_y, div_z),
            ..self.kernel.parameters().clone()
        };
        self.kernel.set_parameters(params).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_solver_config(
        &mut self,
        solver_type: u32,
        timestep: f32,
        lifetime: f32,
        decelerate: f32,
        pressure_stiffness: f32,
        wall_stiffness: f32,
        particle_size: f32,
    ) -> Result<(), JsValue> {
        let solver = SolverType::from_u32(solver_type);
        let params = KernelParameters {
            solver_type: solver,
            timestep,
            lifetime,
            decelerate,
            pressure_stiffness,
            wall_stiffness,
            particle_size,
            ..self.kernel.parameters().clone()
        };
        self.kernel.set_parameters(params).map_err(to_js_error)?;
        self.adaptive.set_preferred(solver);
        Ok(())
    }

    #[wasm_bindgen]
    pub fn set_fluid_config(
        &mut self,
        rest_density: f32,
        particle_mass: f32,
        viscosity: f32,
        smoothing_radius: f32,
    ) -> Result<(), JsValue> {
        let params = KernelParameters {
            sph_rest_density: rest_density,
            sph_particle_mass: particle_mass,
            sph_viscosity: viscosity,
            sph_smoothing_radius: smoothing_radius,
            ..self.kernel.parameters().clone()
        };
        self.kernel.set_parameters(params).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_gravity(&mut self, x: f32, y: f32, z: f32) -> Result<(), JsValue> {
        let params = KernelParameters {
            gravity: Vec3::new(x, y, z),
            ..self.kernel.parameters().clone()
        };
        self.kernel.set_parameters(params).map_err(to_js_error)
    }

    #[wasm_bindgen]
    pub fn set_max_particles(&mut self, max_particles: usize) -> Result<(), JsValue> {
        let params = KernelParameters {
            max_particles,
            ..self.kernel.parameters().clone()
        };
        self.kernel.set_parameters(params).map_err(to_js_error)
    }

    /// 0 water, 1 gas, 2 honey, 3 sand.
    #[wasm_bindgen]
    pub fn set_material(&mut self, material: u32) -> Result<(), JsValue> {
        let preset = match material {
            1 => MaterialPreset::GAS,
            2 => MaterialPreset::HONEY,
            3 => MaterialPreset::SAND,
            _ => MaterialPreset::WATER,
        };
        let mut params = self.kernel.parameters().clone();
        preset.apply_to(&mut params);
        let solver = params.solver_type;
        self.kernel.set_parameters(params).map_err(to_js_error)?;
        self.adaptive.set_preferred(solver);
        Ok(())
    }

    // ---------- particles ----------

    #[wasm_bindgen]
    pub fn particle_count(&self) -> usize {
        self.kernel.particle_count()
    }

    #[wasm_bindgen]
    pub fn spawn_sphere(
        &mut self,
        x: f32, y: f32, z: f32,
        radius: f32,
        count: usize,
        vx: f32, vy: f32, vz: f32,
        jitter: f32,
    ) -> usize {
        self.kernel
            .spawn_sphere(Vec3::new(x, y, z), radius, count, Vec3::new(vx, vy, vz), jitter)
    }

    #[wasm_bindgen]
    pub fn spawn_box(
        &mut self,
        x: f32, y: f32, z: f32,
        sx: f32, sy: f32, sz: f32,
        count: usize,
        vx: f32, vy: f32, vz: f32,
        jitter: f32,
    ) -> usize {
        self.kernel.spawn_box(
            Vec3::new(x, y, z),
            Vec3::new(sx, sy, sz),
            count,
            Vec3::new(vx, vy, vz),
            jitter,
        )
    }

    /// `transform` is a column-major 4x4 matrix applied to a radius-0.5 sphere.
    #[wasm_bindgen]
    pub fn spawn_sphere_transform(
        &mut self,
        transform: &[f32],
        count: usize,
        vx: f32, vy: f32, vz: f32,
        jitter: f32,
    ) -> usize {
        match mat4_from(transform) {
            Some(m) => self.kernel.spawn_sphere_transform(&m, count, Vec3::new(vx, vy, vz), jitter),
            None => 0,
        }
    }

    /// `transform` is a column-major 4x4 matrix applied to the unit cube.
    #[wasm_bindgen]
    pub fn spawn_box_transform(
        &mut self,
        transform: &[f32],
        count: usize,
        vx: f32, vy: f32, vz: f32,
        jitter: f32,
    ) -> usize {
        match mat4_from(transform) {
            Some(m) => self.kernel.spawn_box_transform(&m, count, Vec3::new(vx, vy, vz), jitter),
            None => 0,
        }
    }

    #[wasm_bindgen]
    pub fn clear_particles(&mut self) {
        self.kernel.clear_particles();
    }

    /// Refresh the readback buffer and return a pointer to it. Each record is
    /// 13 little-endian 32-bit words laid out as [`Particle`].
    #[wasm_bindgen]
    pub fn particle_buffer_ptr(&mut self) -> *const f32 {
        self.readback.clear();
        self.readback.extend_from_slice(self.kernel.particles());
        self.readback.as_ptr() as *const f32
    }

    #[wasm_bindgen]
    pub fn particle_buffer_byte_length(&self) -> usize {
        bytemuck::cast_slice::<Particle, u8>(&self.readback).len()
    }

    /// Replace all particles from raw records. Returns the resulting count.
    #[wasm_bindgen]
    pub fn write_particles(&mut self, data: &[u8]) -> Result<usize, JsValue> {
        let stride = std::mem::size_of::<Particle>();
        if data.len() % stride != 0 {
            return Err(JsValue::from_str("particle data is not a whole number of records"));
        }
        let records: Vec<Particle> = data
            .chunks_exact(stride)
            .map(bytemuck::pod_read_unaligned)
            .collect();
        Ok(self.kernel.write_particles(&records))
    }

    // ---------- colliders & forces ----------

    #[wasm_bindgen]
    pub fn add_sphere_collider(
        &mut self,
        x: f32, y: f32, z: f32,
        radius: f32,
        group_mask: u32,
        owner_id: i32,
        stiffness: f32,
        bounce: f32,
        damage: f32,
    ) {
        let props = collider_props(group_mask, owner_id, stiffness, bounce, damage);
        self.kernel.add_sphere_collider(props, Vec3::new(x, y, z), radius);
    }

    #[wasm_bindgen]
    pub fn add_capsule_collider(
        &mut self,
        ax: f32, ay: f32, az: f32,
        bx: f32, by: f32, bz: f32,
        radius: f32,
        group_mask: u32,
        owner_id: i32,
        stiffness: f32,
        bounce: f32,
        damage: f32,
    ) {
        let props = collider_props(group_mask, owner_id, stiffness, bounce, damage);
        self.kernel
            .add_capsule_collider(props, Vec3::new(ax, ay, az), Vec3::new(bx, by, bz), radius);
    }

    #[wasm_bindgen]
    pub fn add_box_collider(
        &mut self,
        transform: &[f32],
        sx: f32, sy: f32, sz: f32,
        group_mask: u32,
        owner_id: i32,
        stiffness: f32,
        bounce: f32,
        damage: f32,
    ) {
        if let Some(m) = mat4_from(transform) {
            let props = collider_props(group_mask, owner_id, stiffness, bounce, damage);
            self.kernel.add_box_collider(props, m, Vec3::new(sx, sy, sz));
        }
    }

    #[wasm_bindgen]
    pub fn add_radial_sphere_force(&mut self, x: f32, y: f32, z: f32, radius: f32, strength: f32) {
        self.kernel.add_radial_sphere_force(Vec3::new(x, y, z), radius, strength);
    }

    /// Directional force gated by a sphere of `radius` (or unbounded when `radius <= 0`).
    #[wasm_bindgen]
    pub fn add_directional_force(
        &mut self,
        x: f32, y: f32, z: f32,
        radius: f32,
        dx: f32, dy: f32, dz: f32,
        strength: f32,
        group_mask: u32,
    ) {
        let anchor = Vec3::new(x, y, z);
        let bounded = radius > 0.0;
        self.kernel.submit_force(ForceDescriptor {
            shape: if bounded {
                ForceShape::Sphere { center: anchor, radius }
            } else {
                ForceShape::All
            },
            direction: ForceDirection::Directional {
                anchor,
                direction: Vec3::new(dx, dy, dz),
            },
            props: ForceProperties {
                group_mask,
                strength_near: strength,
                strength_far: strength,
                range_outer: if bounded { radius } else { f32::MAX },
                attenuation_exp: 0.0,
                ..Default::default()
            },
        });
    }

    #[wasm_bindgen]
    pub fn add_vortex_force(
        &mut self,
        x: f32, y: f32, z: f32,
        radius: f32,
        ax: f32, ay: f32, az: f32,
        strength: f32,
        pull: f32,
    ) {
        let anchor = Vec3::new(x, y, z);
        self.kernel.submit_force(ForceDescriptor {
            shape: ForceShape::Sphere { center: anchor, radius },
            direction: ForceDirection::Vortex {
                anchor,
                axis: Vec3::new(ax, ay, az),
                pull,
            },
            props: ForceProperties {
                strength_near: strength,
                range_outer: radius,
                ..Default::default()
            },
        });
    }

    #[wasm_bindgen]
    pub fn clear_colliders_and_forces(&mut self) {
        self.kernel.clear_colliders_and_forces();
    }

    /// Hit-enter events from the last step, flattened as
    /// `[x, y, z, owner_id, damage, collider_slot]` per event, where the
    /// slot is the bit position set in `Particle::hit`.
    #[wasm_bindgen]
    pub fn hit_events(&self) -> js_sys::Float32Array {
        let events = self.kernel.hit_events();
        let mut flat = Vec::with_capacity(events.len() * HIT_EVENT_STRIDE);
        for e in events {
            flat.extend_from_slice(&[
                e.position.x,
                e.position.y,
                e.position.z,
                e.owner_id as f32,
                e.damage,
                e.collider_bit.trailing_zeros() as f32,
            ]);
        }
        js_sys::Float32Array::from(flat.as_slice())
    }
}
