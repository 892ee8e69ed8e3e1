use crate::solver::float::Float;
use nalgebra::Vector3;

/// Faces per hexahedral element.
pub const FACETS_PER_ELEMENT: usize = 6;
/// Local axes per hexahedral element.
pub const ELEMENT_DIM: usize = 3;

/// Tensor-product grid over a set of hexahedral elements: `lx` nodal points
/// per local axis, `nelv` elements.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ElementGrid {
    pub lx: usize,
    pub nelv: usize,
}

impl ElementGrid {
    pub fn new(lx: usize, nelv: usize) -> Self {
        Self { lx, nelv }
    }

    pub fn num_points(&self) -> usize {
        self.lx.pow(ELEMENT_DIM as u32) * self.nelv
    }

    /// Length of the facet-storage arrays (normals, area weights).
    pub fn facet_storage_len(&self) -> usize {
        self.lx * self.lx * FACETS_PER_ELEMENT * self.nelv
    }
}

/// Per-axis local coordinates and element id of a volumetric grid point,
/// 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TensorIndex {
    pub i: i32,
    pub j: i32,
    pub k: i32,
    pub e: i32,
}

/// Decomposes a 1-based flat volumetric index into (i, j, k, e).
///
/// The quotient chain runs on the 1-based value as given; only j, k and e are
/// shifted back afterwards. For i < lx this reproduces the original local
/// coordinates exactly; at i = lx the low digit carries into j (and onward),
/// which the facet-storage relinearization absorbs. `linear_index` inverts
/// this for every input.
pub fn tensor_index(idx: i32, lx: i32) -> TensorIndex {
    debug_assert!(idx >= 1);
    let e = idx / (lx * lx * lx);
    let k = (idx - lx * lx * lx * e) / (lx * lx);
    let j = (idx - lx * lx * lx * e - lx * lx * k) / lx;
    let i = idx - lx * lx * lx * e - lx * lx * k - lx * j;
    TensorIndex {
        i,
        j: j + 1,
        k: k + 1,
        e: e + 1,
    }
}

/// Relinearizes a tensor index into the 1-based flat volumetric index.
pub fn linear_index(t: TensorIndex, lx: i32) -> i32 {
    t.i + lx * ((t.j - 1) + lx * ((t.k - 1) + lx * (t.e - 1)))
}

/// Flat 0-based index into the facet-storage arrays for in-facet coordinates
/// (a, b), facet f and element e (all 1-based). Row-major with `a` fastest,
/// strides `lx`, `lx`, `FACETS_PER_ELEMENT`. This layout is an implicit
/// contract with the geometry builder that fills the arrays; it is not
/// re-validated here.
pub fn facet_index(a: i32, b: i32, f: i32, e: i32, lx: i32) -> i32 {
    let nf = FACETS_PER_ELEMENT as i32;
    a + lx * ((b - 1) + lx * ((f - 1) + nf * (e - 1))) - 1
}

/// Boundary point set for one boundary condition.
///
/// `msk` holds 1-based flat volumetric indices, `facet` the facet tag (1..=6)
/// of each point. Slot 0 of both arrays is reserved and never read; iteration
/// starts at entry 1. Entries must address pairwise-distinct points.
#[derive(Clone, Debug)]
pub struct BoundaryMask {
    pub msk: Vec<i32>,
    pub facet: Vec<i32>,
}

impl Default for BoundaryMask {
    fn default() -> Self {
        Self::new()
    }
}

impl BoundaryMask {
    pub fn new() -> Self {
        // Slot 0 is the reserved sentinel.
        Self {
            msk: vec![0],
            facet: vec![0],
        }
    }

    pub fn push(&mut self, point: i32, facet: i32) {
        debug_assert!(point >= 1, "boundary point index {point} is not 1-based");
        debug_assert!(
            (1..=FACETS_PER_ELEMENT as i32).contains(&facet),
            "facet tag {facet} outside 1..=6"
        );
        self.msk.push(point);
        self.facet.push(facet);
    }

    /// Total entry count m, sentinel included.
    pub fn len(&self) -> usize {
        self.msk.len()
    }

    pub fn is_empty(&self) -> bool {
        self.msk.len() <= 1
    }
}

/// Three-component field over the volumetric grid points, stored as flat
/// component arrays indexed by 0-based point id.
#[derive(Clone, Debug, PartialEq)]
pub struct VectorField<T> {
    pub x: Vec<T>,
    pub y: Vec<T>,
    pub z: Vec<T>,
}

impl<T: Float> VectorField<T> {
    pub fn new(n: usize, val: Vector3<T>) -> Self {
        Self {
            x: vec![val.x; n],
            y: vec![val.y; n],
            z: vec![val.z; n],
        }
    }

    pub fn zeros(n: usize) -> Self {
        Self::new(n, Vector3::new(T::zero(), T::zero(), T::zero()))
    }

    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Outward unit normals and area weights in facet storage: indexed by two
/// in-facet coordinates, facet tag and element id via `facet_index`.
#[derive(Clone, Debug, PartialEq)]
pub struct FacetGeometry<T> {
    pub nx: Vec<T>,
    pub ny: Vec<T>,
    pub nz: Vec<T>,
    pub area: Vec<T>,
}

impl<T: Float> FacetGeometry<T> {
    pub fn zeros(grid: &ElementGrid) -> Self {
        let n = grid.facet_storage_len();
        Self {
            nx: vec![T::zero(); n],
            ny: vec![T::zero(); n],
            nz: vec![T::zero(); n],
            area: vec![T::zero(); n],
        }
    }

    pub fn set(&mut self, na: usize, normal: Vector3<T>, area: T) {
        self.nx[na] = normal.x;
        self.ny[na] = normal.y;
        self.nz[na] = normal.z;
        self.area[na] = area;
    }

    pub fn normal(&self, na: usize) -> Vector3<T> {
        Vector3::new(self.nx[na], self.ny[na], self.nz[na])
    }

    pub fn len(&self) -> usize {
        self.nx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nx.is_empty()
    }
}
