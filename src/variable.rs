//! External, user-facing unknowns.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::expression::Expression;

static NEXT_VARIABLE_ID: AtomicU64 = AtomicU64::new(0);

struct VariableInner {
    id: u64,
    name: RefCell<Option<String>>,
    context: RefCell<Option<Rc<dyn std::any::Any>>>,
    value: Cell<f64>,
}

/// A real-valued unknown tracked by a [`Solver`](crate::Solver).
///
/// `Variable` is a cheap, cloneable handle over shared interior state, an
/// `Rc` under the hood, not a plain integer, so that `setName`/`setValue`
/// style mutation (spec §6) is visible through every clone of the same
/// variable. Identity is the variable's id, not its name or current value,
/// matching the data model's "Identity is by id, not by value or name."
/// Variables are independent of any particular solver and outlive it:
/// creating one does not require a `Solver` at all.
#[derive(Clone)]
pub struct Variable(Rc<VariableInner>);

impl Variable {
    /// Creates a fresh variable with a process-wide unique id.
    pub fn new() -> Self {
        let id = NEXT_VARIABLE_ID.fetch_add(1, Ordering::Relaxed);
        Self(Rc::new(VariableInner {
            id,
            name: RefCell::new(None),
            context: RefCell::new(None),
            value: Cell::new(0.0),
        }))
    }

    /// Creates a fresh variable with a display name already set.
    pub fn with_name(name: impl Into<String>) -> Self {
        let variable = Self::new();
        variable.set_name(name);
        variable
    }

    pub(crate) fn id(&self) -> u64 {
        self.0.id
    }

    pub fn name(&self) -> Option<String> {
        self.0.name.borrow().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.0.name.borrow_mut() = Some(name.into());
    }

    /// The last value written by [`Solver::update_variables`](crate::Solver::update_variables)
    /// or [`Solver::fetch_changes`](crate::Solver::fetch_changes). Defaults to 0.
    pub fn value(&self) -> f64 {
        self.0.value.get()
    }

    pub(crate) fn set_value(&self, value: f64) {
        self.0.value.set(value);
    }

    /// An opaque handle for caller bookkeeping; the solver never reads it.
    pub fn context(&self) -> Option<Rc<dyn std::any::Any>> {
        self.0.context.borrow().clone()
    }

    pub fn set_context(&self, context: Rc<dyn std::any::Any>) {
        *self.0.context.borrow_mut() = Some(context);
    }

    pub fn plus(self, other: impl Into<Expression>) -> Expression {
        Expression::from_variable(self) + other.into()
    }

    pub fn minus(self, other: impl Into<Expression>) -> Expression {
        Expression::from_variable(self) - other.into()
    }

    pub fn multiply(self, coefficient: f64) -> Expression {
        Expression::from_variable(self) * coefficient
    }

    pub fn divide(self, divisor: f64) -> Expression {
        Expression::from_variable(self) / divisor
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Variable {}

impl Hash for Variable {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id().hash(state);
    }
}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "Variable({}, {:?})", self.id(), name),
            None => write!(f, "Variable({})", self.id()),
        }
    }
}
