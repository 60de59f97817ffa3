//! Property-based checks of the universal invariants spec.md §8 calls out:
//! required-constraint satisfaction after every successful call (P3),
//! add/remove idempotence (P4), and an edit-variable round trip for
//! arbitrary finite suggested values (P5). The tableau's own internal
//! invariants (P1/P2) aren't reachable from outside the crate, so these
//! properties are checked at the only boundary a caller can observe:
//! the values `update_variables` reports.

use cassowary::{Constraint, RelationalOperator, Solver, Strength, Variable};
use proptest::prelude::*;

const EPSILON: f64 = 1.0e-6;

proptest! {
    #[test]
    fn required_constraints_are_satisfied_after_every_successful_add(
        a in -50.0..50.0_f64,
        b in -50.0..50.0_f64,
    ) {
        let mut solver = Solver::new();
        let x = Variable::new();
        let y = Variable::new();

        // x + y = a (required), x - y = b (required): solvable for any a, b.
        let sum = Constraint::required(x.clone() + y.clone() - a, RelationalOperator::Equal);
        let diff = Constraint::required(x.clone() - y.clone() - b, RelationalOperator::Equal);

        solver.add_constraint(sum).unwrap();
        solver.add_constraint(diff).unwrap();
        solver.update_variables();

        prop_assert!((x.value() + y.value() - a).abs() < EPSILON);
        prop_assert!((x.value() - y.value() - b).abs() < EPSILON);
    }

    #[test]
    fn add_then_remove_is_idempotent(
        initial in -30.0..30.0_f64,
        added in -30.0..30.0_f64,
    ) {
        let mut solver = Solver::new();
        let x = Variable::new();

        solver.add_edit_variable(x.clone(), Strength::STRONG).unwrap();
        solver.suggest_value(&x, initial).unwrap();
        solver.update_variables();
        let before = x.value();

        let extra = Constraint::new(x.clone() - (before + added), RelationalOperator::Equal, Strength::WEAK);
        solver.add_constraint(extra.clone()).unwrap();
        solver.remove_constraint(&extra).unwrap();
        solver.update_variables();

        prop_assert!((x.value() - before).abs() < EPSILON);
    }

    #[test]
    fn suggest_value_round_trips_for_any_finite_value(x in -1.0e6..1.0e6_f64) {
        let mut solver = Solver::new();
        let v = Variable::new();
        solver.add_edit_variable(v.clone(), Strength::STRONG).unwrap();

        solver.suggest_value(&v, x).unwrap();
        solver.update_variables();

        prop_assert!((v.value() - x).abs() < 1e-3_f64.max(x.abs() * EPSILON));
    }

    #[test]
    fn a_pool_of_weak_equalities_never_breaks_a_required_sum(
        targets in prop::collection::vec(-10.0..10.0_f64, 3),
    ) {
        let mut solver = Solver::new();
        let vars: Vec<Variable> = (0..targets.len()).map(|_| Variable::new()).collect();

        let total: f64 = targets.iter().sum();
        let mut sum_expr: cassowary::Expression = vars[0].clone().into();
        for v in &vars[1..] {
            sum_expr = sum_expr + v.clone();
        }
        solver
            .add_constraint(Constraint::required(sum_expr - total, RelationalOperator::Equal))
            .unwrap();

        for (v, target) in vars.iter().zip(targets.iter()) {
            let _ = solver.add_constraint(Constraint::new(
                v.clone() - *target,
                RelationalOperator::Equal,
                Strength::WEAK,
            ));
        }

        solver.update_variables();
        let sum: f64 = vars.iter().map(|v| v.value()).sum();
        prop_assert!((sum - total).abs() < 1e-3);
    }
}

proptest! {
    /// A batch of weak inequalities over a single variable, fired in random
    /// order with random bounds and strengths: some will conflict with
    /// others, but `Weak` never forces an error (unlike `Required`), and the
    /// call sequence must run to completion without panicking or leaving
    /// the solver in a state `update_variables` can't read back from.
    #[test]
    fn arbitrary_weak_inequality_batches_never_panic(
        bounds in prop::collection::vec((-100.0..100.0_f64, 0u8..2u8), 1..12),
    ) {
        let mut solver = Solver::new();
        let x = Variable::new();

        for (bound, op) in bounds {
            let operator = if op == 0 { RelationalOperator::LessOrEqual } else { RelationalOperator::GreaterOrEqual };
            let _ = solver.add_constraint(Constraint::new(x.clone() - bound, operator, Strength::WEAK));
        }

        solver.update_variables();
        prop_assert!(x.value().is_finite());
    }
}
