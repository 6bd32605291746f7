//! CPU mass-particle kernel: a fixed-capacity particle store advanced by a
//! uniform-grid neighbor search, pluggable particle interaction (impulse
//! repulsion or SPH), per-step colliders and force fields.

pub mod colliders;
pub mod config;
pub mod error;
pub mod fluids;
pub mod forces;
pub mod grid;
pub mod integrator;
pub mod kernel;
pub mod materials;
pub mod math;
mod parallel;
pub mod particle;
pub mod quality;
pub mod shapes;
pub mod spawn;

pub use colliders::{ColliderDescriptor, ColliderProperties, HitEvent};
pub use config::{KernelParameters, SolverType, MAX_GRID_CELLS, MAX_PARTICLES};
pub use error::{KernelError, Result};
pub use forces::{ForceDescriptor, ForceDirection, ForceProperties, ForceShape, VectorField};
pub use grid::SpatialHashGrid;
pub use kernel::{MassKernel, MAX_SUBSTEPS};
pub use particle::{Particle, ParticleStore, DEFAULT_GROUP};
pub use quality::{AdaptiveSolver, StepStats};
pub use shapes::Shape;
