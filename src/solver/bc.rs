use crate::solver::float::Float;
use crate::solver::grid::{facet_index, tensor_index, BoundaryMask, ElementGrid, FacetGeometry, VectorField};
use rayon::prelude::*;

/// Symmetry (free-slip) boundary condition over a set of boundary grid points.
///
/// Applying it scales each velocity component at a boundary point by the
/// matching outward-normal component and the local facet area weight, leaving
/// a surface-flux-weighted, normal-aligned vector. Points not in the mask are
/// never touched.
pub struct SymmetryBc {
    grid: ElementGrid,
    mask: BoundaryMask,
}

/// Projects one mask entry: returns the 0-based point id and the three scaled
/// components, or None for a facet tag outside 1..=6 (silent no-op; tags are
/// debug-asserted where the mask is assembled, not here).
#[inline]
fn project_point<T: Float>(
    point: i32,
    facet: i32,
    lx: i32,
    u: &[T],
    v: &[T],
    w: &[T],
    geom: &FacetGeometry<T>,
) -> Option<(usize, T, T, T)> {
    let k = (point - 1) as usize;
    let t = tensor_index(point, lx);
    // Facet pairs {1,2}, {3,4}, {5,6} fix local axes 1, 2, 3 respectively;
    // the remaining two coordinates address the facet storage.
    let na = match facet {
        1 | 2 => facet_index(t.j, t.k, facet, t.e, lx),
        3 | 4 => facet_index(t.i, t.k, facet, t.e, lx),
        5 | 6 => facet_index(t.i, t.j, facet, t.e, lx),
        _ => return None,
    };
    let na = na as usize;
    Some((
        k,
        u[k] * geom.nx[na] * geom.area[na],
        v[k] * geom.ny[na] * geom.area[na],
        w[k] * geom.nz[na] * geom.area[na],
    ))
}

/// Raw output pointers shared across workers.
struct OutputPtrs<T> {
    x: *mut T,
    y: *mut T,
    z: *mut T,
}

// SAFETY: mask entries address pairwise-distinct points (caller invariant), so
// concurrent workers always write disjoint slots of x, y and z.
unsafe impl<T: Send> Sync for OutputPtrs<T> {}

impl SymmetryBc {
    pub fn new(grid: ElementGrid, mask: BoundaryMask) -> Self {
        debug_assert!(mask
            .msk
            .iter()
            .skip(1)
            .all(|&p| p >= 1 && (p as usize) <= grid.num_points()));
        Self { grid, mask }
    }

    pub fn grid(&self) -> ElementGrid {
        self.grid
    }

    pub fn mask(&self) -> &BoundaryMask {
        &self.mask
    }

    /// Serial reference kernel. Entry 0 of the mask is the reserved sentinel
    /// and is skipped.
    pub fn apply_surfvec<T: Float>(
        &self,
        out: &mut VectorField<T>,
        inp: &VectorField<T>,
        geom: &FacetGeometry<T>,
    ) {
        let lx = self.grid.lx as i32;
        for i in 1..self.mask.len() {
            if let Some((k, px, py, pz)) = project_point(
                self.mask.msk[i],
                self.mask.facet[i],
                lx,
                &inp.x,
                &inp.y,
                &inp.z,
                geom,
            ) {
                out.x[k] = px;
                out.y[k] = py;
                out.z[k] = pz;
            }
        }
    }

    /// Parallel kernel: worker t of n_workers handles mask entries
    /// t+1, t+1+n_workers, ... (grid-stride), so the worker count is
    /// independent of the mask size.
    pub fn apply_surfvec_parallel<T: Float>(
        &self,
        out: &mut VectorField<T>,
        inp: &VectorField<T>,
        geom: &FacetGeometry<T>,
        n_workers: usize,
    ) {
        assert!(n_workers >= 1);
        let lx = self.grid.lx as i32;
        let m = self.mask.len();
        let ptrs = OutputPtrs {
            x: out.x.as_mut_ptr(),
            y: out.y.as_mut_ptr(),
            z: out.z.as_mut_ptr(),
        };
        (0..n_workers).into_par_iter().for_each(|t| {
            // Capture the whole struct (its `unsafe impl Sync` is what makes
            // this closure `Sync`); a bare `ptrs.x` would capture a raw `*mut T`
            // under 2021 disjoint-closure rules and is not `Sync`.
            let ptrs = &ptrs;
            let mut i = t + 1;
            while i < m {
                if let Some((k, px, py, pz)) = project_point(
                    self.mask.msk[i],
                    self.mask.facet[i],
                    lx,
                    &inp.x,
                    &inp.y,
                    &inp.z,
                    geom,
                ) {
                    // SAFETY: k values are pairwise distinct across the mask.
                    unsafe {
                        *ptrs.x.add(k) = px;
                        *ptrs.y.add(k) = py;
                        *ptrs.z.add(k) = pz;
                    }
                }
                i += n_workers;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::solver::grid::linear_index;
    use crate::solver::grid::TensorIndex;
    use nalgebra::Vector3;

    #[test]
    fn sentinel_slot_is_never_processed() {
        let grid = ElementGrid::new(2, 1);
        // Garbage in slot 0 must be ignored; only the slot-1 point is applied.
        let mask = BoundaryMask {
            msk: vec![9999, 3],
            facet: vec![3, 1],
        };
        let bc = SymmetryBc::new(grid, mask);

        let mut geom = FacetGeometry::<f64>::zeros(&grid);
        let na = facet_index(2, 1, 1, 1, 2) as usize;
        geom.set(na, Vector3::new(1.0, 0.0, 0.0), 1.0);

        let inp = VectorField::new(grid.num_points(), Vector3::new(2.0, 0.0, 0.0));
        let mut out = VectorField::zeros(grid.num_points());
        bc.apply_surfvec(&mut out, &inp, &geom);

        assert_eq!(out.x[2], 2.0);
        assert!(out.x.iter().enumerate().all(|(k, &v)| k == 2 || v == 0.0));
    }

    #[test]
    fn dispatch_selects_the_in_facet_pair() {
        // A facet-3 point (j = 1) must read storage addressed by (i, k).
        let grid = ElementGrid::new(3, 1);
        let lx = 3;
        let t = TensorIndex { i: 2, j: 1, k: 3, e: 1 };
        let mut mask = BoundaryMask::new();
        mask.push(linear_index(t, lx), 3);
        let bc = SymmetryBc::new(grid, mask);

        let mut geom = FacetGeometry::<f64>::zeros(&grid);
        let na = facet_index(2, 3, 3, 1, lx) as usize;
        geom.set(na, Vector3::new(0.0, -1.0, 0.0), 0.5);

        let inp = VectorField::new(grid.num_points(), Vector3::new(1.0, 4.0, 1.0));
        let mut out = VectorField::zeros(grid.num_points());
        bc.apply_surfvec(&mut out, &inp, &geom);

        let k = (linear_index(t, lx) - 1) as usize;
        assert_eq!(out.y[k], 4.0 * -1.0 * 0.5);
        assert_eq!(out.x[k], 0.0);
        assert_eq!(out.z[k], 0.0);
    }
}
