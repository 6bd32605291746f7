use glam::{Mat4, Quat, UVec3, Vec3};
use massparticle_core::colliders::ColliderProperties;
use massparticle_core::config::{KernelParameters, SolverType};
use massparticle_core::error::KernelError;
use massparticle_core::forces::ForceDescriptor;
use massparticle_core::kernel::MassKernel;
use massparticle_core::particle::Particle;

fn kernel(params: KernelParameters) -> MassKernel {
    MassKernel::with_seed(params, 1234).unwrap()
}

#[test]
fn test_lifetime_decreases_by_dt() {
    let mut k = kernel(KernelParameters {
        solver_type: SolverType::NoInteraction,
        ..Default::default()
    });
    k.spawn_sphere(Vec3::ZERO, 1.0, 20, Vec3::ZERO, 0.0);
    let dt = 1.0 / 60.0;
    k.step(dt);
    for p in k.particles() {
        assert!((p.lifetime - (20.0 - dt)).abs() < 1e-5, "lifetime {}", p.lifetime);
    }
}

#[test]
fn test_expired_particles_are_retired() {
    let mut k = kernel(KernelParameters {
        lifetime: 0.05,
        ..Default::default()
    });
    k.spawn_box(Vec3::ZERO, Vec3::ONE, 100, Vec3::ZERO, 0.0);
    assert_eq!(k.particle_count(), 100);

    for _ in 0..4 {
        k.step(1.0 / 60.0);
    }
    assert_eq!(k.particle_count(), 0);
}

#[test]
fn test_spawn_clamps_to_capacity() {
    let mut k = kernel(KernelParameters {
        max_particles: 50,
        ..Default::default()
    });
    assert_eq!(k.spawn_sphere(Vec3::ZERO, 1.0, 80, Vec3::ZERO, 0.0), 50);
    assert_eq!(k.spawn_box(Vec3::ZERO, Vec3::ONE, 10, Vec3::ZERO, 0.0), 0);
    assert_eq!(k.particle_count(), 50);
}

#[test]
fn test_transform_spawns_land_in_shape() {
    let mut k = kernel(KernelParameters::default());
    let m = Mat4::from_scale_rotation_translation(
        Vec3::new(2.0, 2.0, 2.0),
        Quat::IDENTITY,
        Vec3::new(1.0, 1.0, 1.0),
    );
    assert_eq!(k.spawn_sphere_transform(&m, 100, Vec3::ZERO, 0.0), 100);
    for p in k.particles() {
        assert!((p.position - Vec3::ONE).length() <= 1.0 + 1e-4);
    }

    k.clear_particles();
    assert_eq!(k.spawn_box_transform(&m, 100, Vec3::ZERO, 0.0), 100);
    for p in k.particles() {
        assert!((p.position - Vec3::ONE).abs().max_element() <= 1.0 + 1e-4);
    }
}

#[test]
fn test_no_interaction_damping() {
    let params = KernelParameters {
        solver_type: SolverType::NoInteraction,
        decelerate: 0.5,
        ..Default::default()
    };
    let dt = params.timestep;
    let mut k = kernel(params);
    let v0 = Vec3::new(1.0, -0.5, 0.25);
    k.write_particles(&[Particle::new(Vec3::ZERO, v0, 10.0)]);

    let n = 10;
    for _ in 0..n {
        k.step(dt);
    }
    let expected = v0 * (1.0 - 0.5 * dt).powi(n);
    let v = k.particles()[0].velocity;
    assert!((v - expected).length() < 1e-5, "{v:?} vs {expected:?}");
}

#[test]
fn test_gravity_parameter_accelerates() {
    let mut k = kernel(KernelParameters {
        solver_type: SolverType::NoInteraction,
        decelerate: 0.0,
        gravity: Vec3::new(0.0, -10.0, 0.0),
        ..Default::default()
    });
    k.write_particles(&[Particle::new(Vec3::ZERO, Vec3::ZERO, 10.0)]);
    k.step(0.1);
    let v = k.particles()[0].velocity;
    assert!((v.y + 1.0).abs() < 1e-4, "{v:?}");
}

#[test]
fn test_invalid_config_keeps_previous() {
    let mut k = kernel(KernelParameters::default());
    let before = k.parameters().clone();

    let err = k
        .set_parameters(KernelParameters {
            world_div: UVec3::new(0, 4, 4),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, KernelError::InvalidGridDivision(_)));
    assert_eq!(k.parameters(), &before);

    k.spawn_sphere(Vec3::ZERO, 1.0, 10, Vec3::ZERO, 0.0);
    k.step(1.0 / 60.0);
    assert_eq!(k.particle_count(), 10);
}

#[test]
fn test_shrinking_capacity_drops_particles() {
    let mut k = kernel(KernelParameters::default());
    k.spawn_sphere(Vec3::ZERO, 1.0, 100, Vec3::ZERO, 0.0);
    k.set_parameters(KernelParameters {
        max_particles: 30,
        ..k.parameters().clone()
    })
    .unwrap();
    assert_eq!(k.particle_count(), 30);
}

#[test]
fn test_copy_particles_checks_buffer() {
    let mut k = kernel(KernelParameters::default());
    k.spawn_sphere(Vec3::ZERO, 1.0, 10, Vec3::ZERO, 0.0);

    let mut small = vec![Particle::new(Vec3::ZERO, Vec3::ZERO, 0.0); 5];
    assert_eq!(
        k.copy_particles(&mut small),
        Err(KernelError::BufferTooSmall {
            needed: 10,
            provided: 5
        })
    );

    let mut big = vec![Particle::new(Vec3::ZERO, Vec3::ZERO, 0.0); 16];
    assert_eq!(k.copy_particles(&mut big), Ok(10));
    assert_eq!(&big[..10], k.particles());
}

#[test]
fn test_write_particles_replaces_and_filters() {
    let mut k = kernel(KernelParameters {
        max_particles: 3,
        ..Default::default()
    });
    k.spawn_sphere(Vec3::ZERO, 1.0, 3, Vec3::ZERO, 0.0);

    let records = [
        Particle::new(Vec3::X, Vec3::ZERO, 1.0),
        Particle::new(Vec3::Y, Vec3::ZERO, 0.0),
        Particle::new(Vec3::Z, Vec3::ZERO, 2.0),
        Particle::new(Vec3::ONE, Vec3::ZERO, 3.0),
    ];
    // Fourth record exceeds capacity, second is already dead.
    assert_eq!(k.write_particles(&records), 2);
    assert!(k.particles().iter().all(|p| p.is_alive()));
}

/// Six slab colliders hugging the outside of the world box.
fn submit_world_walls(k: &mut MassKernel) {
    let (center, size) = (k.parameters().world_center, k.parameters().world_size);
    for axis in 0..3 {
        for side in [-1.0_f32, 1.0] {
            let mut offset = Vec3::ZERO;
            offset[axis] = side * (size[axis] * 0.5 + 0.5);
            let mut extent = size + Vec3::splat(2.0);
            extent[axis] = 1.0;
            k.add_box_collider(
                ColliderProperties::default(),
                Mat4::from_translation(center + offset),
                extent,
            );
        }
    }
}

#[test]
fn test_impulse_scenario_stays_in_world() {
    let mut k = kernel(KernelParameters {
        solver_type: SolverType::Impulse,
        ..Default::default()
    });
    assert_eq!(k.spawn_sphere(Vec3::ZERO, 1.0, 1000, Vec3::ZERO, 0.0), 1000);

    let dt = 1.0 / 60.0;
    for _ in 0..100 {
        submit_world_walls(&mut k);
        k.step(dt);
    }

    let slack = Vec3::splat(k.parameters().particle_size);
    let lo = k.parameters().world_min() - slack;
    let hi = k.parameters().world_max() + slack;
    assert_eq!(k.particle_count(), 1000);
    for p in k.particles() {
        assert!(p.position.is_finite() && p.velocity.is_finite());
        assert!(
            p.position.cmpge(lo).all() && p.position.cmple(hi).all(),
            "escaped world: {:?}",
            p.position
        );
    }
    assert_eq!(k.last_step_stats().particle_count, 1000);
}

#[test]
fn test_fast_particles_held_by_wall_springs() {
    let mut k = kernel(KernelParameters {
        solver_type: SolverType::NoInteraction,
        ..Default::default()
    });
    k.write_particles(&[
        Particle::new(Vec3::new(4.0, 0.0, 0.0), Vec3::new(4.0, 0.0, 0.0), 10.0),
        Particle::new(Vec3::new(0.0, -4.0, 0.0), Vec3::new(0.0, -4.0, 0.0), 10.0),
    ]);
    for _ in 0..120 {
        k.step(1.0 / 60.0);
    }
    let slack = Vec3::splat(k.parameters().particle_size);
    for p in k.particles() {
        assert!(p.position.cmpge(k.parameters().world_min() - slack).all());
        assert!(p.position.cmple(k.parameters().world_max() + slack).all());
    }
}

#[test]
fn test_no_walls_means_ballistic_exit() {
    let params = KernelParameters {
        solver_type: SolverType::NoInteraction,
        wall_stiffness: 0.0,
        ..Default::default()
    };
    let dt = params.timestep;
    let decel = params.decelerate;
    let mut k = kernel(params);
    let v0 = Vec3::new(1.0, 0.0, 0.0);
    k.write_particles(&[Particle::new(Vec3::new(4.95, 0.0, 0.0), v0, 10.0)]);

    let n = 10;
    for _ in 0..n {
        k.step(dt);
    }
    let expected = v0 * (1.0 - decel * dt).powi(n);
    let p = k.particles()[0];
    assert!((p.velocity - expected).length() < 1e-5, "{:?} vs {expected:?}", p.velocity);
    assert!(p.position.x > 5.0, "should have left the world, at {}", p.position.x);
}

#[test]
fn test_oversized_grid_rejected() {
    let params = KernelParameters {
        world_div: UVec3::splat(2048),
        ..Default::default()
    };
    assert!(matches!(
        MassKernel::new(params.clone()),
        Err(KernelError::InvalidGridDivision(_))
    ));

    let mut k = kernel(KernelParameters::default());
    assert!(k.set_parameters(params).is_err());
    assert_eq!(k.parameters().world_div, UVec3::splat(32));
}

#[test]
fn test_oversized_capacity_rejected() {
    let params = KernelParameters {
        max_particles: usize::MAX / 2,
        ..Default::default()
    };
    assert!(matches!(
        MassKernel::new(params.clone()),
        Err(KernelError::InvalidParameter(_))
    ));

    let mut k = kernel(KernelParameters::default());
    k.spawn_sphere(Vec3::ZERO, 1.0, 10, Vec3::ZERO, 0.0);
    assert!(k.set_parameters(params).is_err());
    assert_eq!(k.parameters().max_particles, 100_000);
    assert_eq!(k.particle_count(), 10);
}

#[test]
fn test_sph_block_settles_without_blowing_up() {
    let mut k = kernel(KernelParameters {
        solver_type: SolverType::Sph,
        gravity: Vec3::new(0.0, -9.8, 0.0),
        ..Default::default()
    });
    k.spawn_box(Vec3::new(0.0, -3.0, 0.0), Vec3::splat(1.0), 400, Vec3::ZERO, 0.0);
    for _ in 0..60 {
        k.step(1.0 / 60.0);
    }
    for p in k.particles() {
        assert!(p.position.is_finite());
        assert!(p.density >= 0.0);
    }
}
