//! Failure modes surfaced by the solver, layered the way the rest of the
//! workspace does: small leaf enums for each fallible entry point, collected
//! behind one `#[error(transparent)]` aggregator for callers who just want
//! a single `Result` type.

use thiserror::Error;

use crate::constraint::Constraint;
use crate::variable::Variable;

/// Why [`Solver::add_constraint`](crate::Solver::add_constraint) failed.
#[derive(Debug, Error)]
pub enum AddConstraintError {
    #[error("the constraint has already been added to this solver")]
    DuplicateConstraint(Constraint),

    #[error("the constraint is required but conflicts with existing required constraints")]
    UnsatisfiableConstraint(Constraint),

    /// A tableau invariant was violated: an unbounded objective, or a
    /// failed artificial-variable retirement. Indicates a solver bug or a
    /// precondition violated upstream, never ordinary caller input.
    #[error("internal solver error: {0}")]
    InternalSolverError(String),

    #[error("exceeded the iteration ceiling of {limit} while optimizing")]
    IterationLimitExceeded { limit: u32 },
}

/// Why [`Solver::remove_constraint`](crate::Solver::remove_constraint) failed.
#[derive(Debug, Error)]
pub enum RemoveConstraintError {
    #[error("the constraint is not present in this solver")]
    UnknownConstraint(Constraint),

    #[error("internal solver error: {0}")]
    InternalSolverError(String),

    #[error("exceeded the iteration ceiling of {limit} while optimizing")]
    IterationLimitExceeded { limit: u32 },
}

/// Why an edit-variable operation failed.
#[derive(Debug, Error)]
pub enum EditVariableError {
    #[error("the variable already has an edit constraint in this solver")]
    DuplicateEditVariable(Variable),

    #[error("the variable does not have an edit constraint in this solver")]
    UnknownEditVariable(Variable),

    #[error("addEditVariable requires a strength weaker than required")]
    BadRequiredStrength(Variable),

    #[error(transparent)]
    AddConstraintError(#[from] AddConstraintError),

    #[error(transparent)]
    RemoveConstraintError(#[from] RemoveConstraintError),
}

/// The aggregate error type returned by fallible [`Solver`](crate::Solver)
/// methods that can fail in more than one way.
///
/// [`Solver::suggest_value`](crate::Solver::suggest_value) drives the
/// dual-simplex pass directly rather than going through `add_constraint`,
/// so its two cross-cutting failure kinds (an invariant violation, or the
/// iteration ceiling) are represented here rather than forced through one
/// of the three more specific enums above.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    AddConstraintError(#[from] AddConstraintError),

    #[error(transparent)]
    RemoveConstraintError(#[from] RemoveConstraintError),

    #[error(transparent)]
    EditVariableError(#[from] EditVariableError),

    #[error("internal solver error: {0}")]
    InternalSolverError(String),

    #[error("exceeded the iteration ceiling of {limit} while optimizing")]
    IterationLimitExceeded { limit: u32 },
}
