use glam::{UVec3, Vec3};
use thiserror::Error;

/// Crate-wide result type alias.
pub type Result<T> = std::result::Result<T, KernelError>;

/// Errors surfaced by the kernel's configuration and bulk-copy entry points.
///
/// Nothing inside [`MassKernel::step`](crate::kernel::MassKernel::step) fails:
/// capacity overflow clamps and malformed descriptors contribute nothing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum KernelError {
    /// Every grid division count must be at least one.
    #[error("grid divisions must be positive, got {0}")]
    InvalidGridDivision(UVec3),

    /// Every world extent must be positive and finite.
    #[error("world size must be positive, got {0}")]
    InvalidWorldSize(Vec3),

    /// Any other rejected configuration value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Destination buffer cannot hold the live particle set.
    #[error("buffer too small: need {needed} particles, got {provided}")]
    BufferTooSmall { needed: usize, provided: usize },
}
