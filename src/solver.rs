//! The simplex tableau and the public entry points that mutate it:
//! add/remove constraint, add/remove/suggest edit variable, and the
//! update step that copies solved values back into external variables.

use crate::constraint::Constraint;
use crate::constraint::RelationalOperator;
use crate::error::{AddConstraintError, EditVariableError, RemoveConstraintError, SolverError};
use crate::expression::Expression;
use crate::map::Table;
use crate::row::Row;
use crate::strength::Strength;
use crate::symbol::{Symbol, SymbolKind};
use crate::variable::Variable;
use crate::{near_zero, EPSILON};

const DEFAULT_MAX_ITERATIONS: u32 = 10_000;

#[derive(Debug, Clone, Copy)]
struct Tag {
    marker: Symbol,
    other: Symbol,
}

impl Tag {
    const INVALID: Tag = Tag { marker: Symbol::INVALID, other: Symbol::INVALID };
}

struct EditInfo {
    tag: Tag,
    constraint: Constraint,
    constant: f64,
}

/// A pivot-loop failure that has not yet been attributed to a specific
/// public operation. [`Solver::add_constraint`] and friends translate this
/// into their own error type once they know which call is failing.
enum Infeasibility {
    NoLeavingRow,
    IterationLimitExceeded,
}

/// Owns the simplex tableau (a mapping from basic symbols to their
/// defining rows) plus the objective row, and implements the incremental
/// add/remove/edit/suggest operations described by the Cassowary paper.
pub struct Solver {
    max_iterations: u32,
    symbol_counter: i64,
    rows: Table<Symbol, Row>,
    var_symbols: Table<Variable, Symbol>,
    cn_map: Table<Constraint, Tag>,
    edit_map: Table<Variable, EditInfo>,
    objective: Row,
    artificial: Option<Row>,
    infeasible_rows: Vec<Symbol>,
    changes: Vec<(Variable, f64)>,
}

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    pub fn new() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            symbol_counter: 0,
            rows: Table::new(),
            var_symbols: Table::new(),
            cn_map: Table::new(),
            edit_map: Table::new(),
            objective: Row::new(0.0),
            artificial: None,
            infeasible_rows: Vec::new(),
            changes: Vec::new(),
        }
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn set_max_iterations(&mut self, limit: u32) {
        self.max_iterations = limit;
    }

    pub fn has_constraint(&self, constraint: &Constraint) -> bool {
        self.cn_map.contains_key(constraint)
    }

    pub fn has_edit_variable(&self, variable: &Variable) -> bool {
        self.edit_map.contains_key(variable)
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.cn_map.iter().map(|(c, _)| c)
    }

    /// Adds `constraint` to the tableau, re-optimizing before returning.
    ///
    /// Re-adding the same `Constraint` (same id) is an error and leaves the
    /// solver unchanged.
    pub fn add_constraint(&mut self, constraint: Constraint) -> Result<(), AddConstraintError> {
        if self.cn_map.contains_key(&constraint) {
            return Err(AddConstraintError::DuplicateConstraint(constraint));
        }

        let (mut row, tag) = self.create_row(&constraint);
        let mut subject = self.choose_subject(&row, &tag);

        if subject.is_invalid() && row.all_dummies() {
            if !near_zero(row.constant) {
                return Err(AddConstraintError::UnsatisfiableConstraint(constraint));
            }
            subject = tag.marker;
        }

        if subject.is_invalid() {
            match self.add_with_artificial_variable(&row) {
                Ok(true) => {}
                Ok(false) => return Err(AddConstraintError::UnsatisfiableConstraint(constraint)),
                Err(infeasibility) => return Err(self.attribute_add_error(infeasibility)),
            }
        } else {
            row.solve_for(subject);
            self.substitute(subject, &row);
            self.rows.insert(subject, row);
        }

        self.cn_map.insert(constraint, tag);
        self.optimize().map_err(|e| self.attribute_add_error(e))?;
        Ok(())
    }

    /// Removes a previously added constraint, re-optimizing before returning.
    pub fn remove_constraint(&mut self, constraint: &Constraint) -> Result<(), RemoveConstraintError> {
        let tag = self
            .cn_map
            .remove(constraint)
            .ok_or_else(|| RemoveConstraintError::UnknownConstraint(constraint.clone()))?;

        self.remove_constraint_effects(&tag, constraint.strength());

        if self.rows.remove(&tag.marker).is_none() {
            let leaving = self.marker_leaving_symbol(tag.marker).ok_or_else(|| {
                RemoveConstraintError::InternalSolverError(
                    "no leaving row found while removing a non-basic marker".to_string(),
                )
            })?;
            let mut row = self.rows.remove(&leaving).expect("leaving row must be present");
            row.solve_for_ex(leaving, tag.marker);
            self.substitute(tag.marker, &row);
            self.rows.insert(tag.marker, row);
        }

        self.optimize().map_err(|e| self.attribute_remove_error(e))?;
        Ok(())
    }

    /// Marks `variable` as editable at `strength` (which must be weaker
    /// than required), synthesizing the internal `variable == 0` constraint
    /// that [`Solver::suggest_value`] later nudges.
    pub fn add_edit_variable(&mut self, variable: Variable, strength: Strength) -> Result<(), EditVariableError> {
        if self.edit_map.contains_key(&variable) {
            return Err(EditVariableError::DuplicateEditVariable(variable));
        }
        if strength.is_required() {
            return Err(EditVariableError::BadRequiredStrength(variable));
        }

        let constraint = Constraint::new(Expression::from_variable(variable.clone()), RelationalOperator::Equal, strength);
        self.add_constraint(constraint.clone())?;

        let tag = *self.cn_map.get(&constraint).expect("just installed above");
        self.edit_map.insert(variable, EditInfo { tag, constraint, constant: 0.0 });
        Ok(())
    }

    pub fn remove_edit_variable(&mut self, variable: &Variable) -> Result<(), EditVariableError> {
        let info = self
            .edit_map
            .remove(variable)
            .ok_or_else(|| EditVariableError::UnknownEditVariable(variable.clone()))?;
        self.remove_constraint(&info.constraint)?;
        Ok(())
    }

    /// Nudges `variable`'s edit constraint toward `value`, running the
    /// dual-simplex pass to restore feasibility.
    pub fn suggest_value(&mut self, variable: &Variable, value: f64) -> Result<(), SolverError> {
        let info = self
            .edit_map
            .get_mut(variable)
            .ok_or_else(|| EditVariableError::UnknownEditVariable(variable.clone()))?;

        let delta = value - info.constant;
        info.constant = value;
        let tag = info.tag;

        if let Some(row) = self.rows.get_mut(&tag.marker) {
            row.constant -= delta;
            if row.constant < 0.0 {
                self.infeasible_rows.push(tag.marker);
            }
        } else if let Some(row) = self.rows.get_mut(&tag.other) {
            row.constant += delta;
            if row.constant < 0.0 {
                self.infeasible_rows.push(tag.other);
            }
        } else {
            for (&symbol, row) in self.rows.iter_mut() {
                let coefficient = row.coefficient_for(tag.marker);
                if coefficient == 0.0 {
                    continue;
                }
                row.constant += delta * coefficient;
                if row.constant < 0.0 && !symbol.is_external() {
                    self.infeasible_rows.push(symbol);
                }
            }
        }

        self.dual_optimize().map_err(|infeasibility| match infeasibility {
            Infeasibility::NoLeavingRow => {
                SolverError::InternalSolverError("dual optimization found no entering symbol".to_string())
            }
            Infeasibility::IterationLimitExceeded => {
                SolverError::IterationLimitExceeded { limit: self.max_iterations }
            }
        })
    }

    /// Copies the constant of every external symbol's basic row back into
    /// its backing [`Variable`]; non-basic variables reset to 0.
    pub fn update_variables(&mut self) {
        self.changes.clear();
        for (variable, symbol) in self.var_symbols.iter() {
            let value = self.rows.get(symbol).map(|row| row.constant).unwrap_or(0.0);
            if (variable.value() - value).abs() > EPSILON {
                self.changes.push((variable.clone(), value));
            }
            variable.set_value(value);
        }
    }

    /// Variables whose value changed during the most recent
    /// [`Solver::update_variables`] call.
    pub fn fetch_changes(&self) -> &[(Variable, f64)] {
        &self.changes
    }

    fn attribute_add_error(&self, infeasibility: Infeasibility) -> AddConstraintError {
        match infeasibility {
            Infeasibility::NoLeavingRow => {
                AddConstraintError::InternalSolverError("optimization found an unbounded objective".to_string())
            }
            Infeasibility::IterationLimitExceeded => {
                AddConstraintError::IterationLimitExceeded { limit: self.max_iterations }
            }
        }
    }

    fn attribute_remove_error(&self, infeasibility: Infeasibility) -> RemoveConstraintError {
        match infeasibility {
            Infeasibility::NoLeavingRow => {
                RemoveConstraintError::InternalSolverError("optimization found an unbounded objective".to_string())
            }
            Infeasibility::IterationLimitExceeded => {
                RemoveConstraintError::IterationLimitExceeded { limit: self.max_iterations }
            }
        }
    }

    fn new_symbol(&mut self, kind: SymbolKind) -> Symbol {
        let id = self.symbol_counter;
        self.symbol_counter += 1;
        Symbol::new(id, kind)
    }

    fn get_var_symbol(&mut self, variable: &Variable) -> Symbol {
        if let Some(&symbol) = self.var_symbols.get(variable) {
            return symbol;
        }
        let symbol = self.new_symbol(SymbolKind::External);
        self.var_symbols.insert(variable.clone(), symbol);
        symbol
    }

    /// Builds the tableau row for a constraint's expression plus its
    /// marker/other bookkeeping symbols, per the allocation table for `op`
    /// and strength.
    fn create_row(&mut self, constraint: &Constraint) -> (Row, Tag) {
        let expression = constraint.expression();
        let mut row = Row::new(expression.constant());

        for (variable, coefficient) in expression.terms() {
            if near_zero(coefficient) {
                continue;
            }
            let symbol = self.get_var_symbol(variable);
            if let Some(basic_row) = self.rows.get(&symbol) {
                row.insert_row(basic_row, coefficient);
            } else {
                row.insert_symbol(symbol, coefficient);
            }
        }

        let mut tag = Tag::INVALID;
        let strength = constraint.strength();

        match constraint.operator() {
            RelationalOperator::LessOrEqual | RelationalOperator::GreaterOrEqual => {
                let coefficient = if constraint.operator() == RelationalOperator::LessOrEqual { 1.0 } else { -1.0 };
                let slack = self.new_symbol(SymbolKind::Slack);
                tag.marker = slack;
                row.insert_symbol(slack, coefficient);

                if !strength.is_required() {
                    let error = self.new_symbol(SymbolKind::Error);
                    tag.other = error;
                    row.insert_symbol(error, -coefficient);
                    self.objective.insert_symbol(error, strength.value());
                }
            }
            RelationalOperator::Equal => {
                if strength.is_required() {
                    let dummy = self.new_symbol(SymbolKind::Dummy);
                    tag.marker = dummy;
                    row.insert_symbol(dummy, 1.0);
                } else {
                    let error_plus = self.new_symbol(SymbolKind::Error);
                    let error_minus = self.new_symbol(SymbolKind::Error);
                    tag.marker = error_plus;
                    tag.other = error_minus;
                    row.insert_symbol(error_plus, -1.0);
                    row.insert_symbol(error_minus, 1.0);
                    self.objective.insert_symbol(error_plus, strength.value());
                    self.objective.insert_symbol(error_minus, strength.value());
                }
            }
        }

        if row.constant < 0.0 {
            row.reverse_sign();
        }

        (row, tag)
    }

    /// Picks the row's basic variable: the first external symbol present,
    /// else whichever of marker/other is pivotable and carries a strictly
    /// negative coefficient. Returns [`Symbol::INVALID`] if neither applies.
    fn choose_subject(&self, row: &Row, tag: &Tag) -> Symbol {
        for (symbol, _) in row.cells_iter() {
            if symbol.is_external() {
                return *symbol;
            }
        }
        if tag.marker.is_pivotable() && row.coefficient_for(tag.marker) < -EPSILON {
            return tag.marker;
        }
        if tag.other.is_pivotable() && row.coefficient_for(tag.other) < -EPSILON {
            return tag.other;
        }
        Symbol::INVALID
    }

    /// Phase-1 procedure for a row with no natural entering symbol: park
    /// it under a fresh artificial slack variable, minimize that variable's
    /// own copy of the row, then retire it by pivoting to any remaining
    /// pivotable symbol (or dropping it if the row already went empty).
    /// Returns whether the row is actually feasible.
    fn add_with_artificial_variable(&mut self, row: &Row) -> Result<bool, Infeasibility> {
        let artificial_symbol = self.new_symbol(SymbolKind::Slack);
        self.rows.insert(artificial_symbol, row.clone());
        self.artificial = Some(row.clone());

        let optimized = self.optimize_row(row.clone())?;
        let success = near_zero(optimized.constant);
        self.artificial = None;

        if let Some(mut artificial_row) = self.rows.remove(&artificial_symbol) {
            if !artificial_row.is_empty() {
                match artificial_row.first_pivotable_symbol() {
                    Some(entering) => {
                        artificial_row.solve_for_ex(artificial_symbol, entering);
                        self.substitute(entering, &artificial_row);
                        self.rows.insert(entering, artificial_row);
                    }
                    None => return Ok(false),
                }
            }
        }

        for row in self.rows.values_mut() {
            row.erase(artificial_symbol);
        }
        self.objective.erase(artificial_symbol);
        if let Some(artificial) = self.artificial.as_mut() {
            artificial.erase(artificial_symbol);
        }

        Ok(success)
    }

    /// Folds `row`'s definition of `symbol` into every tableau row, the
    /// real objective, and the in-flight artificial objective if one is
    /// alive.
    fn substitute(&mut self, symbol: Symbol, row: &Row) {
        for basic_row in self.rows.values_mut() {
            basic_row.substitute(symbol, row);
        }
        self.objective.substitute(symbol, row);
        if let Some(artificial) = self.artificial.as_mut() {
            artificial.substitute(symbol, row);
        }
    }

    fn optimize(&mut self) -> Result<(), Infeasibility> {
        let objective = std::mem::replace(&mut self.objective, Row::new(0.0));
        self.objective = self.optimize_row(objective)?;
        Ok(())
    }

    /// Primal simplex: repeatedly pick the first non-Dummy symbol with a
    /// negative coefficient in `objective` (insertion order, to avoid
    /// cycling), find the row that most tightly bounds it, and pivot.
    /// Used both for the real objective and, with a throwaway local row,
    /// for the Phase-1 artificial objective.
    fn optimize_row(&mut self, mut objective: Row) -> Result<Row, Infeasibility> {
        let mut iterations: u32 = 0;
        loop {
            let entering = objective.cells_iter().find(|(s, c)| !s.is_dummy() && **c < -EPSILON).map(|(s, _)| *s);

            let Some(entering) = entering else {
                return Ok(objective);
            };

            iterations += 1;
            if iterations > self.max_iterations {
                return Err(Infeasibility::IterationLimitExceeded);
            }

            let Some((leaving, mut row)) = self.find_leaving_row(entering) else {
                return Err(Infeasibility::NoLeavingRow);
            };

            row.solve_for_ex(leaving, entering);
            self.substitute(entering, &row);
            objective.substitute(entering, &row);
            self.rows.insert(entering, row);
        }
    }

    /// Among non-external basic rows with a strictly negative coefficient
    /// on `entering`, the one minimizing `-constant / coefficient`.
    fn find_leaving_row(&mut self, entering: Symbol) -> Option<(Symbol, Row)> {
        let mut min_ratio = f64::INFINITY;
        let mut found = None;

        for (&symbol, row) in self.rows.iter() {
            if symbol.is_external() {
                continue;
            }
            let coefficient = row.coefficient_for(entering);
            if coefficient < -EPSILON {
                let ratio = -row.constant / coefficient;
                if ratio < min_ratio {
                    min_ratio = ratio;
                    found = Some(symbol);
                }
            }
        }

        found.map(|symbol| (symbol, self.rows.remove(&symbol).expect("row must be present")))
    }

    /// Reverses an about-to-be-removed constraint's error-variable
    /// contribution to the objective. Must run before any pivoting touches
    /// the row, otherwise the error terms fold into unrelated rows.
    fn remove_constraint_effects(&mut self, tag: &Tag, strength: Strength) {
        if tag.marker.is_error() {
            self.remove_error_effect(tag.marker, strength);
        }
        if tag.other.is_error() {
            self.remove_error_effect(tag.other, strength);
        }
    }

    fn remove_error_effect(&mut self, symbol: Symbol, strength: Strength) {
        if let Some(row) = self.rows.get(&symbol) {
            let row = row.clone();
            self.objective.insert_row(&row, -strength.value());
        } else {
            self.objective.insert_symbol(symbol, -strength.value());
        }
    }

    /// Picks which basic row should leave the tableau to make room for a
    /// non-basic `marker` during constraint removal (spec's three-tier
    /// priority: negative-coefficient rows, then positive-coefficient rows,
    /// then the last external-basic row seen as a fallback).
    fn marker_leaving_symbol(&self, marker: Symbol) -> Option<Symbol> {
        let mut best_negative_ratio = f64::INFINITY;
        let mut best_positive_ratio = f64::INFINITY;
        let mut negative_candidate = None;
        let mut positive_candidate = None;
        let mut external_candidate = None;

        for (&symbol, row) in self.rows.iter() {
            let coefficient = row.coefficient_for(marker);
            if coefficient == 0.0 {
                continue;
            }
            if symbol.is_external() {
                external_candidate = Some(symbol);
                continue;
            }
            if coefficient < 0.0 {
                let ratio = -row.constant / coefficient;
                if ratio < best_negative_ratio {
                    best_negative_ratio = ratio;
                    negative_candidate = Some(symbol);
                }
            } else {
                let ratio = row.constant / coefficient;
                if ratio < best_positive_ratio {
                    best_positive_ratio = ratio;
                    positive_candidate = Some(symbol);
                }
            }
        }

        negative_candidate.or(positive_candidate).or(external_candidate)
    }

    /// Dual simplex: restores feasibility for the rows
    /// [`Solver::suggest_value`] pushed onto `infeasible_rows`, preserving
    /// objective optimality throughout.
    fn dual_optimize(&mut self) -> Result<(), Infeasibility> {
        let mut iterations: u32 = 0;

        while let Some(leaving) = self.infeasible_rows.pop() {
            let still_infeasible = self.rows.get(&leaving).map(|row| row.constant < -EPSILON).unwrap_or(false);
            if !still_infeasible {
                continue;
            }

            iterations += 1;
            if iterations > self.max_iterations {
                return Err(Infeasibility::IterationLimitExceeded);
            }

            let mut row = self.rows.remove(&leaving).expect("checked present above");

            let mut best_ratio = f64::INFINITY;
            let mut entering = None;
            for (&symbol, &coefficient) in row.cells_iter() {
                if symbol.is_dummy() || coefficient <= 0.0 {
                    continue;
                }
                let ratio = self.objective.coefficient_for(symbol) / coefficient;
                if ratio < best_ratio {
                    best_ratio = ratio;
                    entering = Some(symbol);
                }
            }

            let Some(entering) = entering else {
                return Err(Infeasibility::NoLeavingRow);
            };

            row.solve_for_ex(leaving, entering);
            self.substitute(entering, &row);
            self.rows.insert(entering, row);
        }

        Ok(())
    }
}
