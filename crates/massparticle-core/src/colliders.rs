use glam::Vec3;

use crate::config::KernelParameters;
use crate::grid::{CellRange, SpatialHashGrid};
use crate::math::reflect_inward;
use crate::parallel::map_indices;
use crate::particle::Particle;
use crate::shapes::{PreparedShape, Shape};

/// Per-collider material and filtering.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColliderProperties {
    /// A particle is affected only if `particle.group & group_mask != 0`.
    pub group_mask: u32,
    /// Opaque caller token echoed back in [`HitEvent`]s.
    pub owner_id: i32,
    /// Penalty spring constant applied per unit of penetration.
    pub stiffness: f32,
    /// Restitution of the normal velocity component, nominally in `[0, 1]`.
    pub bounce: f32,
    /// Reported back on hit-enter; the kernel never applies it.
    pub damage_on_hit: f32,
}

impl Default for ColliderProperties {
    fn default() -> Self {
        Self {
            group_mask: 0xffff_ffff,
            owner_id: -1,
            stiffness: 1500.0,
            bounce: 1.0,
            damage_on_hit: 0.0,
        }
    }
}

/// One collider submitted for the next step.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColliderDescriptor {
    pub shape: Shape,
    pub props: ColliderProperties,
}

/// A particle started touching a collider this step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitEvent {
    /// Particle position when contact began. Indices are not reported since
    /// compaction may reorder the particle array within the same step.
    pub position: Vec3,
    pub owner_id: i32,
    pub damage: f32,
    /// Bit this collider occupies in `Particle::hit`.
    pub collider_bit: u32,
}

/// Flag bit for the collider submitted at `slot`. Slots alias modulo 32.
#[inline]
pub fn collider_bit(slot: usize) -> u32 {
    1 << (slot % 32)
}

/// Collider with its geometry prepared and its cell footprint resolved.
#[derive(Clone, Copy, Debug)]
pub struct PreparedCollider {
    shape: PreparedShape,
    props: ColliderProperties,
    cells: CellRange,
    bit: u32,
}

/// Resolve every descriptor against this step's grid.
pub fn prepare_colliders(
    colliders: &[ColliderDescriptor],
    grid: &SpatialHashGrid,
    particle_size: f32,
) -> Vec<PreparedCollider> {
    colliders
        .iter()
        .enumerate()
        .map(|(slot, c)| {
            let shape = c.shape.prepare();
            let (min, max) = shape.aabb(particle_size);
            PreparedCollider {
                shape,
                props: c.props,
                cells: grid.cell_range(min, max),
                bit: collider_bit(slot),
            }
        })
        .collect()
}

/// Start a new collision frame: current bits become previous bits.
pub fn shift_collision_flags(particles: &mut [Particle]) {
    for p in particles.iter_mut() {
        p.hit_prev = p.hit;
        p.hit = 0;
    }
}

struct ColliderResponse {
    acceleration: Vec3,
    velocity: Vec3,
    hit: u32,
    events: Vec<HitEvent>,
}

/// Resolve particle-collider penetration.
///
/// For each overlapping pair: penalty acceleration `normal * depth * stiffness`,
/// the approaching normal velocity reflected with `bounce`, and the collider's
/// bit set in `hit`. A bit absent from `hit_prev` that becomes set yields a
/// [`HitEvent`]. Group mismatches are skipped silently.
pub fn apply_colliders(
    particles: &mut [Particle],
    acceleration: &mut [Vec3],
    colliders: &[PreparedCollider],
    grid: &SpatialHashGrid,
    particle_size: f32,
    events: &mut Vec<HitEvent>,
) {
    if colliders.is_empty() {
        return;
    }

    let responses = {
        let view: &[Particle] = particles;
        map_indices(view.len(), |i| {
            let p = &view[i];
            let cell = grid.delinearize(p.hash);
            let mut out = ColliderResponse {
                acceleration: Vec3::ZERO,
                velocity: p.velocity,
                hit: p.hit,
                events: Vec::new(),
            };

            for c in colliders {
                if p.group & c.props.group_mask == 0 || !c.cells.contains(cell) {
                    continue;
                }
                let Some(contact) = c.shape.contact(p.position, particle_size) else {
                    continue;
                };

                out.acceleration += contact.normal * contact.depth * c.props.stiffness;
                out.velocity = reflect_inward(out.velocity, contact.normal, c.props.bounce);

                if (p.hit_prev | out.hit) & c.bit == 0 {
                    out.events.push(HitEvent {
                        position: p.position,
                        owner_id: c.props.owner_id,
                        damage: c.props.damage_on_hit,
                        collider_bit: c.bit,
                    });
                }
                out.hit |= c.bit;
            }
            out
        })
    };

    for ((p, acc), r) in particles.iter_mut().zip(acceleration.iter_mut()).zip(responses) {
        *acc += r.acceleration;
        p.velocity = r.velocity;
        p.hit = r.hit;
        events.extend(r.events);
    }
}

/// Push particles back into the world volume with `wall_stiffness` springs
/// on each of the six faces.
pub fn apply_world_walls(particles: &[Particle], acceleration: &mut [Vec3], params: &KernelParameters) {
    let lo = params.world_min() + params.particle_size;
    let hi = params.world_max() - params.particle_size;
    let k = params.wall_stiffness;

    for (p, acc) in particles.iter().zip(acceleration.iter_mut()) {
        let below = (lo - p.position).max(Vec3::ZERO);
        let above = (p.position - hi).max(Vec3::ZERO);
        *acc += (below - above) * k;
    }
}
