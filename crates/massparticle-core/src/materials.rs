use crate::config::{KernelParameters, SolverType};

/// Material preset for quick configuration of SPH particle behavior.
#[derive(Clone, Copy, Debug)]
pub struct MaterialPreset {
    pub rest_density: f32,
    pub particle_mass: f32,
    pub viscosity: f32,
    pub pressure_stiffness: f32,
    pub particle_size: f32,
    pub smoothing_radius: f32,
    pub decelerate: f32,
}

impl MaterialPreset {
    /// Water: medium density, low viscosity.
    pub const WATER: Self = Self {
        rest_density: 1000.0,
        particle_mass: 0.02,
        viscosity: 0.1,
        pressure_stiffness: 500.0,
        particle_size: 0.08,
        smoothing_radius: 0.2,
        decelerate: 0.5,
    };

    /// Gas/Smoke: very low density, almost no viscosity, soft pressure.
    pub const GAS: Self = Self {
        rest_density: 10.0,
        particle_mass: 0.001,
        viscosity: 0.01,
        pressure_stiffness: 50.0,
        particle_size: 0.12,
        smoothing_radius: 0.3,
        decelerate: 0.1,
    };

    /// Honey: high density, high viscosity, heavy damping.
    pub const HONEY: Self = Self {
        rest_density: 1400.0,
        particle_mass: 0.03,
        viscosity: 5.0,
        pressure_stiffness: 800.0,
        particle_size: 0.06,
        smoothing_radius: 0.15,
        decelerate: 2.0,
    };

    /// Sand/Granular: stiff, no viscosity.
    pub const SAND: Self = Self {
        rest_density: 1600.0,
        particle_mass: 0.03,
        viscosity: 0.0,
        pressure_stiffness: 2000.0,
        particle_size: 0.05,
        smoothing_radius: 0.12,
        decelerate: 1.0,
    };

    /// Apply this material preset to a parameter set. Switches non-SPH solvers to `Sph`.
    pub fn apply_to(&self, params: &mut KernelParameters) {
        params.sph_rest_density = self.rest_density;
        params.sph_particle_mass = self.particle_mass;
        params.sph_viscosity = self.viscosity;
        params.pressure_stiffness = self.pressure_stiffness;
        params.particle_size = self.particle_size;
        params.sph_smoothing_radius = self.smoothing_radius;
        params.decelerate = self.decelerate;
        if !params.solver_type.uses_density() {
            params.solver_type = SolverType::Sph;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_presets_valid() {
        // All presets should have positive density and non-negative values
        for (name, preset) in [
            ("water", MaterialPreset::WATER),
            ("gas", MaterialPreset::GAS),
            ("honey", MaterialPreset::HONEY),
            ("sand", MaterialPreset::SAND),
        ] {
            assert!(preset.rest_density > 0.0, "{} density must be positive", name);
            assert!(preset.particle_mass > 0.0, "{} mass must be positive", name);
            assert!(preset.viscosity >= 0.0, "{} viscosity must be non-negative", name);
            assert!(preset.particle_size > 0.0, "{} radius must be positive", name);
            assert!(
                preset.smoothing_radius > preset.particle_size,
                "{} smoothing radius must cover the particle",
                name
            );
        }
    }

    #[test]
    fn test_apply_material_preset() {
        let mut params = KernelParameters::default();
        MaterialPreset::HONEY.apply_to(&mut params);
        assert_eq!(params.sph_rest_density, 1400.0);
        assert_eq!(params.sph_viscosity, 5.0);
        assert_eq!(params.solver_type, SolverType::Sph);
        assert!(params.validate().is_ok());
    }

    #[test]
    fn test_apply_keeps_estimate_solver() {
        let mut params = KernelParameters {
            solver_type: SolverType::SphEstimate,
            ..Default::default()
        };
        MaterialPreset::WATER.apply_to(&mut params);
        assert_eq!(params.solver_type, SolverType::SphEstimate);
    }
}
