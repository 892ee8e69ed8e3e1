pub mod context;
pub mod symmetry;

pub use context::GpuContext;
pub use symmetry::GpuSymmetryBc;
