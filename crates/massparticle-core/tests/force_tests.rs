use std::sync::Arc;

use glam::{Mat4, UVec3, Vec3};
use massparticle_core::config::KernelParameters;
use massparticle_core::forces::{
    apply_forces, prepare_forces, ForceDescriptor, ForceDirection, ForceProperties, ForceShape,
    PolylineField,
};
use massparticle_core::grid::SpatialHashGrid;
use massparticle_core::particle::Particle;

fn params() -> KernelParameters {
    KernelParameters {
        world_size: Vec3::splat(8.0),
        world_div: UVec3::splat(8),
        ..Default::default()
    }
    .normalized()
    .unwrap()
}

/// One force pass over particles at `positions`.
fn run(positions: &[Vec3], forces: &[ForceDescriptor]) -> Vec<Vec3> {
    let params = params();
    let mut particles: Vec<Particle> = positions
        .iter()
        .map(|&p| Particle::new(p, Vec3::ZERO, 1.0))
        .collect();
    let mut grid = SpatialHashGrid::new(&params);
    grid.build(&mut particles);

    let prepared = prepare_forces(forces, &grid);
    let mut acc = vec![Vec3::ZERO; particles.len()];
    apply_forces(&particles, &mut acc, &prepared, &grid);
    acc
}

fn approx(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < 1e-4
}

#[test]
fn test_zero_outer_range_contributes_nothing() {
    let force = ForceDescriptor {
        shape: ForceShape::All,
        direction: ForceDirection::Radial { center: Vec3::ZERO },
        props: ForceProperties {
            strength_near: 10.0,
            range_outer: 0.0,
            ..Default::default()
        },
    };
    let acc = run(&[Vec3::new(0.1, 0.0, 0.0), Vec3::ZERO], &[force]);
    assert!(acc.iter().all(|a| *a == Vec3::ZERO));
}

#[test]
fn test_inverted_ranges_contribute_nothing() {
    let force = ForceDescriptor {
        shape: ForceShape::All,
        direction: ForceDirection::Radial { center: Vec3::ZERO },
        props: ForceProperties {
            strength_near: 10.0,
            range_inner: 2.0,
            range_outer: 1.0,
            ..Default::default()
        },
    };
    let grid = SpatialHashGrid::new(&params());
    assert!(prepare_forces(&[force.clone()], &grid).is_empty());
    assert_eq!(run(&[Vec3::new(0.5, 0.0, 0.0)], &[force])[0], Vec3::ZERO);
}

#[test]
fn test_forces_compose_additively() {
    let forces = [
        ForceDescriptor::uniform(Vec3::new(0.0, -3.0, 0.0)),
        ForceDescriptor::uniform(Vec3::new(2.0, 0.0, 0.0)),
    ];
    let acc = run(&[Vec3::new(1.0, 2.0, -3.0)], &forces);
    assert!(approx(acc[0], Vec3::new(2.0, -3.0, 0.0)), "{:?}", acc[0]);
}

#[test]
fn test_radial_sphere_gate_and_falloff() {
    let force = ForceDescriptor::radial_sphere(Vec3::ZERO, 1.0, 5.0);
    let acc = run(
        &[Vec3::new(0.5, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)],
        &[force],
    );

    // d = 0.5: lerp(5, 0, 0.5) * (1 - 0.5)^0.5
    let expected = 2.5 * 0.5_f32.sqrt();
    assert!(approx(acc[0], Vec3::new(expected, 0.0, 0.0)), "{:?}", acc[0]);
    assert_eq!(acc[1], Vec3::ZERO);
}

#[test]
fn test_negative_strength_pulls_inward() {
    let force = ForceDescriptor::radial_sphere(Vec3::ZERO, 2.0, -4.0);
    let acc = run(&[Vec3::new(0.0, 1.0, 0.0)], &[force]);
    assert!(acc[0].y < 0.0);
}

#[test]
fn test_group_mask_filters_particles() {
    let mut force = ForceDescriptor::uniform(Vec3::new(0.0, 1.0, 0.0));
    force.props.group_mask = 0b10;

    let params = params();
    let mut particles = vec![
        Particle::new(Vec3::ZERO, Vec3::ZERO, 1.0),
        Particle::new(Vec3::ZERO, Vec3::ZERO, 1.0),
    ];
    particles[1].group = 0b10;
    let mut grid = SpatialHashGrid::new(&params);
    grid.build(&mut particles);
    let prepared = prepare_forces(&[force], &grid);
    let mut acc = vec![Vec3::ZERO; 2];
    apply_forces(&particles, &mut acc, &prepared, &grid);

    assert_eq!(acc[0], Vec3::ZERO);
    assert!(approx(acc[1], Vec3::Y));
}

#[test]
fn test_box_gate_limits_directional_force() {
    let force = ForceDescriptor {
        shape: ForceShape::Box {
            transform: Mat4::from_translation(Vec3::new(2.0, 0.0, 0.0)),
            half_extents: Vec3::splat(0.5),
        },
        direction: ForceDirection::Directional {
            anchor: Vec3::new(2.0, 0.0, 0.0),
            direction: Vec3::Z,
        },
        props: ForceProperties {
            strength_near: 3.0,
            strength_far: 3.0,
            range_outer: 1.0,
            attenuation_exp: 0.0,
            ..Default::default()
        },
    };
    let acc = run(
        &[Vec3::new(2.2, 0.1, 0.0), Vec3::new(0.0, 0.0, 0.0)],
        &[force],
    );
    assert!(approx(acc[0], Vec3::new(0.0, 0.0, 3.0)), "{:?}", acc[0]);
    assert_eq!(acc[1], Vec3::ZERO);
}

#[test]
fn test_vortex_swirls_around_axis() {
    let force = ForceDescriptor {
        shape: ForceShape::All,
        direction: ForceDirection::Vortex {
            anchor: Vec3::ZERO,
            axis: Vec3::Y,
            pull: 0.0,
        },
        props: ForceProperties {
            strength_near: 1.0,
            strength_far: 1.0,
            range_outer: 3.0,
            attenuation_exp: 0.0,
            ..Default::default()
        },
    };
    let acc = run(&[Vec3::new(1.0, 0.5, 0.0)], &[force]);
    assert!(approx(acc[0], Vec3::new(0.0, 0.0, -1.0)), "{:?}", acc[0]);
}

#[test]
fn test_spline_follows_polyline_tangent() {
    let field = PolylineField::new(vec![Vec3::new(-2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 0.0)]).unwrap();
    let force = ForceDescriptor {
        shape: ForceShape::All,
        direction: ForceDirection::Spline(Arc::new(field)),
        props: ForceProperties {
            strength_near: 2.0,
            strength_far: 0.0,
            range_outer: 1.0,
            attenuation_exp: 0.0,
            ..Default::default()
        },
    };
    let acc = run(
        &[Vec3::new(0.0, 0.0, 0.0), Vec3::new(0.0, 0.5, 0.0), Vec3::new(0.0, 1.5, 0.0)],
        &[force],
    );
    assert!(approx(acc[0], Vec3::new(2.0, 0.0, 0.0)));
    assert!(approx(acc[1], Vec3::new(1.0, 0.0, 0.0)));
    assert_eq!(acc[2], Vec3::ZERO);
}
