use glam::Vec3;

use crate::forces::{ForceDescriptor, ForceDirection, ForceProperties};
use crate::grid::{CellRange, SpatialHashGrid};
use crate::math::{closest_point_on_line, closest_point_on_segment};
use crate::parallel::map_indices;
use crate::particle::Particle;
use crate::shapes::PreparedShape;

/// Force with its gate geometry prepared and its cell footprint resolved.
#[derive(Clone, Debug)]
pub struct PreparedForce {
    gate: Option<PreparedShape>,
    cells: CellRange,
    direction: ForceDirection,
    props: ForceProperties,
}

/// Resolve every descriptor against this step's grid. Malformed descriptors
/// are dropped here since they could only ever contribute zero.
pub fn prepare_forces(forces: &[ForceDescriptor], grid: &SpatialHashGrid) -> Vec<PreparedForce> {
    forces
        .iter()
        .filter(|f| f.props.is_well_formed())
        .map(|f| {
            let gate = f.shape.region().map(|s| s.prepare());
            let cells = match &gate {
                Some(g) => {
                    let (min, max) = g.aabb(0.0);
                    grid.cell_range(min, max)
                }
                None => CellRange::ALL,
            };
            PreparedForce {
                gate,
                cells,
                direction: f.direction.clone(),
                props: f.props,
            }
        })
        .collect()
}

/// Acceleration one force imparts at `pos`, ignoring group and gate checks.
pub fn force_acceleration(direction: &ForceDirection, props: &ForceProperties, pos: Vec3) -> Vec3 {
    let (dist, dir) = match direction {
        ForceDirection::Directional { anchor, direction } => {
            ((pos - *anchor).length(), direction.normalize_or_zero())
        }
        ForceDirection::Radial { center } => {
            let d = pos - *center;
            (d.length(), d.normalize_or_zero())
        }
        ForceDirection::RadialCapsule { a, b } => {
            let d = pos - closest_point_on_segment(pos, *a, *b);
            (d.length(), d.normalize_or_zero())
        }
        ForceDirection::Vortex { anchor, axis, pull } => {
            let axis = axis.normalize_or_zero();
            let radial = pos - closest_point_on_line(pos, *anchor, axis);
            let radial_dir = radial.normalize_or_zero();
            let tangent = axis.cross(radial).normalize_or_zero();
            (radial.length(), tangent - radial_dir * *pull)
        }
        ForceDirection::Spline(field) | ForceDirection::VectorField(field) => {
            (field.distance(pos), field.sample(pos))
        }
    };

    let strength = props.strength_at(dist);
    if strength == 0.0 {
        return Vec3::ZERO;
    }
    dir * strength
}

/// Sum every applicable force into `acceleration`. Forces compose additively.
pub fn apply_forces(
    particles: &[Particle],
    acceleration: &mut [Vec3],
    forces: &[PreparedForce],
    grid: &SpatialHashGrid,
) {
    if forces.is_empty() {
        return;
    }

    let accels = map_indices(particles.len(), |i| {
        let p = &particles[i];
        let cell = grid.delinearize(p.hash);
        let mut acc = Vec3::ZERO;
        for f in forces {
            if p.group & f.props.group_mask == 0 || !f.cells.contains(cell) {
                continue;
            }
            if let Some(gate) = &f.gate {
                if !gate.contains(p.position) {
                    continue;
                }
            }
            acc += force_acceleration(&f.direction, &f.props, p.position);
        }
        acc
    });

    for (acc, a) in acceleration.iter_mut().zip(accels) {
        *acc += a;
    }
}
