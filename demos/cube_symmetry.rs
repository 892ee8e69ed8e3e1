//! Applies the symmetry condition to a uniform flow over a single cube
//! element, on the host kernel and (when an adapter is present) on the GPU.

use nalgebra::Vector3;
use sembc::solver::gpu::{GpuContext, GpuSymmetryBc};
use sembc::solver::grid::{
    facet_index, linear_index, tensor_index, ElementGrid, FacetGeometry, TensorIndex, VectorField,
};
use sembc::solver::{BoundaryMask, SymmetryBc};

/// Outward unit normal of each cube facet; facet pairs {1,2}, {3,4}, {5,6}
/// bound the x, y and z axes.
fn facet_normal(f: i32) -> Vector3<f64> {
    match f {
        1 => Vector3::new(-1.0, 0.0, 0.0),
        2 => Vector3::new(1.0, 0.0, 0.0),
        3 => Vector3::new(0.0, -1.0, 0.0),
        4 => Vector3::new(0.0, 1.0, 0.0),
        5 => Vector3::new(0.0, 0.0, -1.0),
        _ => Vector3::new(0.0, 0.0, 1.0),
    }
}

fn main() {
    let grid = ElementGrid::new(6, 1);
    let lx = grid.lx as i32;

    // Every surface point, assigned to one facet; the far corner stays out
    // (see the mask docs).
    let mut mask = BoundaryMask::new();
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
                mask.push(linear_index(TensorIndex { i, j, k, e: 1 }, lx), f);
            }
        }
    }

    // Play the external geometry builder: fill the slots the kernel will
    // read, using the same index chain it applies.
    let weight = 1.0 / ((lx - 1) * (lx - 1)) as f64;
    let mut geom = FacetGeometry::zeros(&grid);
    for i in 1..mask.len() {
        let f = mask.facet[i];
        let t = tensor_index(mask.msk[i], lx);
        let na = match f {
            1 | 2 => facet_index(t.j, t.k, f, t.e, lx),
            3 | 4 => facet_index(t.i, t.k, f, t.e, lx),
            _ => facet_index(t.i, t.j, f, t.e, lx),
        };
        geom.set(na as usize, facet_normal(f), weight);
    }

    let inp = VectorField::new(grid.num_points(), Vector3::new(1.0, 2.0, 3.0));
    let bc = SymmetryBc::new(grid, mask.clone());

    let mut out = VectorField::zeros(grid.num_points());
    bc.apply_surfvec_parallel(&mut out, &inp, &geom, 4);

    let total: f64 = out.x.iter().map(|v| v.abs()).sum::<f64>()
        + out.y.iter().map(|v| v.abs()).sum::<f64>()
        + out.z.iter().map(|v| v.abs()).sum::<f64>();
    println!(
        "host kernel: {} boundary points, sum |n . u| dA contributions = {total:.6}",
        mask.len() - 1
    );

    match pollster::block_on(GpuContext::new()) {
        Ok(context) => {
            let gpu_bc = GpuSymmetryBc::new(context, &grid, &mask, &geom);
            let mut gpu_out = VectorField::zeros(grid.num_points());
            gpu_bc.apply_surfvec(&mut gpu_out, &inp);
            let mut max_diff = 0.0f64;
            for k in 0..grid.num_points() {
                max_diff = max_diff
                    .max((out.x[k] - gpu_out.x[k]).abs())
                    .max((out.y[k] - gpu_out.y[k]).abs())
                    .max((out.z[k] - gpu_out.z[k]).abs());
            }
            println!("device kernel: max difference vs host = {max_diff:e}");
        }
        Err(err) => println!("device kernel skipped: {err}"),
    }
}
