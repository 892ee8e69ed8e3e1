pub mod bc;
pub mod float;
pub mod gpu;
pub mod grid;

pub use bc::SymmetryBc;
pub use grid::{BoundaryMask, ElementGrid, FacetGeometry, VectorField};
