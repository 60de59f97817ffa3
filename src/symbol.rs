//! Internal tableau symbols.
//!
//! Symbols never surface to callers of the solver. They back the three
//! families of unknowns the simplex tableau manipulates: external symbols
//! mirror user [`Variable`](crate::Variable)s one-to-one; slack, error, and
//! dummy symbols are manufactured while a constraint is added.

use std::hash::{Hash, Hasher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SymbolKind {
    Invalid,
    External,
    Slack,
    Error,
    Dummy,
}

/// A symbol compared by identity (its id), not by kind.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Symbol {
    id: i64,
    kind: SymbolKind,
}

impl Symbol {
    /// The single distinguished sentinel used when a constraint has no
    /// "other" bookkeeping symbol (required inequalities and equalities).
    pub(crate) const INVALID: Symbol = Symbol { id: -1, kind: SymbolKind::Invalid };

    pub(crate) fn new(id: i64, kind: SymbolKind) -> Self {
        Self { id, kind }
    }

    pub(crate) fn is_invalid(&self) -> bool {
        self.kind == SymbolKind::Invalid
    }

    pub(crate) fn is_external(&self) -> bool {
        self.kind == SymbolKind::External
    }

    pub(crate) fn is_slack(&self) -> bool {
        self.kind == SymbolKind::Slack
    }

    pub(crate) fn is_error(&self) -> bool {
        self.kind == SymbolKind::Error
    }

    pub(crate) fn is_dummy(&self) -> bool {
        self.kind == SymbolKind::Dummy
    }

    pub(crate) fn is_pivotable(&self) -> bool {
        self.is_slack() || self.is_error()
    }
}

impl PartialEq for Symbol {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Symbol {}

impl Hash for Symbol {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}
