//! User-facing linear constraints: an expression related to zero by `<=`,
//! `=`, or `>=`, carrying a strength.

use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::expression::Expression;
use crate::strength::Strength;

static NEXT_CONSTRAINT_ID: AtomicU64 = AtomicU64::new(0);

/// The relation a constraint's expression is held to against zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationalOperator {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

struct ConstraintInner {
    id: u64,
    expression: Expression,
    operator: RelationalOperator,
    strength: Strength,
}

/// `expression <op> 0`, held at `strength`.
///
/// Like [`Variable`](crate::Variable), `Constraint` is a cheap, cloneable
/// handle: the solver's internal bookkeeping (`cnMap`/edit map) stores
/// clones of the constraint a caller passed to
/// [`Solver::add_constraint`](crate::Solver::add_constraint), and identity
/// for removal purposes is by id, not by structural equality of the
/// expression.
#[derive(Clone)]
pub struct Constraint(Rc<ConstraintInner>);

impl Constraint {
    /// Builds `expression <op> 0` at the given strength.
    pub fn new(expression: Expression, operator: RelationalOperator, strength: Strength) -> Self {
        let id = NEXT_CONSTRAINT_ID.fetch_add(1, Ordering::Relaxed);
        Self(Rc::new(ConstraintInner { id, expression, operator, strength }))
    }

    /// Builds `expression <op> 0` at [`Strength::REQUIRED`].
    pub fn required(expression: Expression, operator: RelationalOperator) -> Self {
        Self::new(expression, operator, Strength::REQUIRED)
    }

    pub(crate) fn id(&self) -> u64 {
        self.0.id
    }

    pub fn expression(&self) -> &Expression {
        &self.0.expression
    }

    pub fn operator(&self) -> RelationalOperator {
        self.0.operator
    }

    pub fn strength(&self) -> Strength {
        self.0.strength
    }

    /// Returns a clone of this constraint with a different strength; the
    /// expression and operator are unchanged and the identity is new.
    pub fn with_strength(&self, strength: Strength) -> Self {
        Self::new(self.0.expression.clone(), self.0.operator, strength)
    }
}

impl PartialEq for Constraint {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Constraint {}

impl Hash for Constraint {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl std::fmt::Debug for Constraint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Constraint({}, {:?}, {:?})", self.id(), self.operator(), self.strength())
    }
}
