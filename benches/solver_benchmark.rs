//! Incremental solve benchmarks.

use cassowary::{Constraint, RelationalOperator, Solver, Strength, Variable};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

/// Builds a chain of `n` required `right[i] = left[i] + width[i]` constraints
/// sharing adjacent edges (`left[i+1] = right[i]`), the shape a row of
/// flexbox-style boxes produces.
fn build_chain(solver: &mut Solver, n: usize) -> (Vec<Variable>, Vec<Variable>) {
    let lefts: Vec<Variable> = (0..n).map(|_| Variable::new()).collect();
    let widths: Vec<Variable> = (0..n).map(|_| Variable::new()).collect();
    let rights: Vec<Variable> = (0..n).map(|_| Variable::new()).collect();

    for i in 0..n {
        solver
            .add_constraint(Constraint::required(
                rights[i].clone() - lefts[i].clone() - widths[i].clone(),
                RelationalOperator::Equal,
            ))
            .unwrap();
        solver.add_edit_variable(widths[i].clone(), Strength::STRONG).unwrap();
        if i > 0 {
            solver
                .add_constraint(Constraint::required(
                    lefts[i].clone() - rights[i - 1].clone(),
                    RelationalOperator::Equal,
                ))
                .unwrap();
        }
    }
    solver.add_edit_variable(lefts[0].clone(), Strength::STRONG).unwrap();

    (lefts, widths)
}

fn add_constraints(c: &mut Criterion) {
    c.bench_function("add_100_chained_constraints", |b| {
        b.iter(|| {
            let mut solver = Solver::new();
            black_box(build_chain(&mut solver, 100));
        });
    });
}

fn suggest_and_update(c: &mut Criterion) {
    let mut solver = Solver::new();
    let (lefts, widths) = build_chain(&mut solver, 100);

    c.bench_function("suggest_and_update_100", |b| {
        b.iter(|| {
            solver.suggest_value(&lefts[0], black_box(10.0)).unwrap();
            for w in &widths {
                solver.suggest_value(w, black_box(42.0)).unwrap();
            }
            solver.update_variables();
        });
    });
}

fn remove_and_readd(c: &mut Criterion) {
    c.bench_function("remove_and_readd_single_constraint", |b| {
        b.iter(|| {
            let mut solver = Solver::new();
            let x = Variable::new();
            let constraint = Constraint::required(x.clone() - 5.0, RelationalOperator::Equal);
            solver.add_constraint(constraint.clone()).unwrap();
            solver.remove_constraint(&constraint).unwrap();
            solver
                .add_constraint(Constraint::required(x - 9.0, RelationalOperator::Equal))
                .unwrap();
        });
    });
}

criterion_group!(benches, add_constraints, suggest_and_update, remove_and_readd);
criterion_main!(benches);
