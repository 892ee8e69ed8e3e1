use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use nalgebra::Vector3;
use sembc::solver::grid::{linear_index, ElementGrid, FacetGeometry, TensorIndex, VectorField};
use sembc::solver::{BoundaryMask, SymmetryBc};

/// One boundary entry per surface point, each point tagged once.
fn boundary_mask(grid: &ElementGrid) -> BoundaryMask {
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

fn setup(lx: usize, nelv: usize) -> (SymmetryBc, FacetGeometry<f64>, VectorField<f64>) {
    let grid = ElementGrid::new(lx, nelv);
    let mask = boundary_mask(&grid);
    let mut geom = FacetGeometry::zeros(&grid);
    for na in 0..geom.len() {
        geom.nx[na] = 0.125 * ((na % 9) as f64) - 0.5;
        geom.ny[na] = 0.125 * ((na % 7) as f64) - 0.25;
        geom.nz[na] = 0.125 * ((na % 5) as f64);
        geom.area[na] = 1.0 + 0.25 * ((na % 4) as f64);
    }
    let mut inp = VectorField::zeros(grid.num_points());
    for k in 0..grid.num_points() {
        inp.x[k] = 0.125 * ((k % 17) as f64) - 1.0;
        inp.y[k] = 0.125 * ((k % 13) as f64) - 0.5;
        inp.z[k] = 0.125 * ((k % 11) as f64) + 0.25;
    }
    (SymmetryBc::new(grid, mask), geom, inp)
}

fn bench_apply_surfvec(c: &mut Criterion) {
    let (bc, geom, inp) = setup(8, 512);
    let n = bc.grid().num_points();
    let boundary_points = bc.mask().len() - 1;

    let mut group = c.benchmark_group("apply_surfvec");
    group.throughput(Throughput::Elements(boundary_points as u64));

    let mut out = VectorField::zeros(n);
    group.bench_function("serial", |b| {
        b.iter(|| bc.apply_surfvec(&mut out, &inp, &geom));
    });

    for n_workers in [2, 4, 8] {
        group.bench_with_input(
            BenchmarkId::new("parallel", n_workers),
            &n_workers,
            |b, &n_workers| {
                let mut out = VectorField::new(n, Vector3::new(0.0, 0.0, 0.0));
                b.iter(|| bc.apply_surfvec_parallel(&mut out, &inp, &geom, n_workers));
            },
        );
    }
    group.finish();
}

criterion_group!(benches, bench_apply_surfvec);
criterion_main!(benches);
