use criterion::{criterion_group, criterion_main, Criterion};

use twophase::coord::CoordCube;
use twophase::cubie::CubieCube;
use twophase::moves::{Move::*, MoveTables};
use twophase::pruning::PruningTables;
use twophase::solver::{solve_with, SolverConfig, Tables};

fn cc_apply_moves() {
    let cc = CubieCube::default();
    let _ = cc.apply_moves(&[R, U, R3, U3]);
}

fn cc_multi_moves() {
    let mut cc = CubieCube::default();
    cc.multiply_moves(&[R, U, R3, U3]);
}

fn bench_moves(c: &mut Criterion) {
    let mut group = c.benchmark_group("CubieCube Moves");
    group.bench_function("multiply_moves", |b| b.iter(cc_multi_moves));
    group.bench_function("apply_moves", |b| b.iter(cc_apply_moves));
    group.finish();

    let mv = MoveTables::new();
    c.bench_function("CoordCube apply_move", |b| {
        b.iter(|| {
            let mut co = CoordCube::default();
            for m in [R, U, R3, U3, F2, D, L3, B] {
                co.apply_move(m, &mv);
            }
            co
        })
    });
}

fn bench_tables(c: &mut Criterion) {
    let mut group = c.benchmark_group("Tables");
    group.sample_size(10);
    group.bench_function("move tables", |b| b.iter(MoveTables::new));
    let mv = MoveTables::new();
    group.bench_function("pruning tables", |b| b.iter(|| PruningTables::new(&mv)));
    group.finish();
}

fn bench_solver(c: &mut Criterion) {
    let tables = Tables::build();
    let config = SolverConfig::default();
    c.bench_function("Solver", |b| {
        b.iter(|| {
            solve_with(
                &tables,
                "DRLUUBFBRBLURRLRUBLRDDFDLFUFUFFDBRDUBRUFLLFDDBFLUBLRBD",
                &config,
            )
            .unwrap()
        })
    });
}

criterion_group!(benches, bench_solver, bench_moves, bench_tables);
criterion_main!(benches);
