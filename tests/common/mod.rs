use sembc::solver::grid::{linear_index, ElementGrid, FacetGeometry, TensorIndex, VectorField};
use sembc::solver::BoundaryMask;

/// Boundary mask covering every surface point of every element, each point
/// assigned to exactly one facet (axis priority 1..6) so output slots stay
/// pairwise distinct. The far corner (lx, lx, lx) is left out: its carried
/// relinearization lands outside the facet storage of the last element, and
/// mesh builders keep it out of symmetry masks.
pub fn cube_boundary_mask(grid: &ElementGrid) -> BoundaryMask {
    let lx = grid.lx as i32;
    let mut mask = BoundaryMask::new();
    for e in 1..=grid.nelv as i32 {
        for k in 1..=lx {
            for j in 1..=lx {
                for i in 1..=lx {
                    if i == lx && j == lx && k == lx {
                        continue;
                    }
                    let f = if i == 1 {
                        1
                    } else if i == lx {
                        2
                    } else if j == 1 {
                        3
                    } else if j == lx {
                        4
                    } else if k == 1 {
                        5
                    } else if k == lx {
                        6
                    } else {
                        continue;
                    };
                    mask.push(linear_index(TensorIndex { i, j, k, e }, lx), f);
                }
            }
        }
    }
    mask
}

/// Deterministic facet geometry with dyadic-rational entries, exact in both
/// f32 and f64 so host and device kernels agree bitwise.
pub fn synthetic_geometry(grid: &ElementGrid) -> FacetGeometry<f64> {
    let mut geom = FacetGeometry::zeros(grid);
    for na in 0..geom.len() {
        geom.nx[na] = 0.125 * ((na % 9) as f64) - 0.5;
        geom.ny[na] = 0.125 * ((na % 7) as f64) - 0.25;
        geom.nz[na] = 0.125 * ((na % 5) as f64);
        geom.area[na] = 1.0 + 0.25 * ((na % 4) as f64);
    }
    geom
}

/// Deterministic velocity-like field, dyadic-rational for the same reason.
pub fn synthetic_field(n: usize) -> VectorField<f64> {
    let mut field = VectorField::zeros(n);
    for kk in 0..n {
        field.x[kk] = 0.125 * ((kk % 17) as f64) - 1.0;
        field.y[kk] = 0.125 * ((kk % 13) as f64) - 0.5;
        field.z[kk] = 0.125 * ((kk % 11) as f64) + 0.25;
    }
    field
}
