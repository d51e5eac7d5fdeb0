//! The multi-stack value store.
//!
//! Each [`ValueKind`] has its own [`KindStack`]. A stack keeps its values in one vector
//! and, beside it, the length of every *unit*: the values one grammar symbol on the
//! automaton stack owns. A list symbol owns a unit of many values, an optional symbol
//! may own an empty unit, and everything else owns a unit of one. Merging two adjacent
//! units is what makes `list ::= list ',' item` constant time.

use super::node::{AstNode, GenericNode};
use crate::ast::{Expr, Ident};
use crate::error::Abort;
use crate::grammar::ValueKind;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// A rule action asked for values its stack does not hold.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum StackError {
    #[error("{kind} stack underflow")]
    Underflow { kind: &'static str },

    #[error("{kind} unit holds {len} values where one was expected")]
    NotSingle { kind: &'static str, len: usize },

    #[error("{kind} stack holds {found} where {expected} was expected")]
    WrongNode {
        kind: &'static str,
        expected: &'static str,
        found: &'static str,
    },
}

impl From<StackError> for Abort {
    fn from(error: StackError) -> Self {
        Self::invariant(error.to_string())
    }
}

/// One typed value stack with its companion unit lengths.
#[derive(Debug, Clone)]
pub struct KindStack<T> {
    kind: ValueKind,
    values: Vec<T>,
    units: Vec<usize>,
}

impl<T> KindStack<T> {
    #[must_use]
    pub const fn new(kind: ValueKind) -> Self {
        Self {
            kind,
            values: Vec::new(),
            units: Vec::new(),
        }
    }

    /// Pushes a unit of one value.
    pub fn push(&mut self, value: T) {
        self.values.push(value);
        self.units.push(1);
    }

    pub fn push_unit(&mut self, values: impl IntoIterator<Item = T>) {
        let before = self.values.len();
        self.values.extend(values);
        self.units.push(self.values.len() - before);
    }

    pub fn push_empty(&mut self) {
        self.units.push(0);
    }

    /// Pops the top unit, which must hold exactly one value.
    pub fn pop_one(&mut self) -> Result<T, StackError> {
        let len = self.top_len()?;
        if len != 1 {
            return Err(StackError::NotSingle {
                kind: self.kind.name(),
                len,
            });
        }
        self.units.pop();
        self.values.pop().ok_or(StackError::Underflow {
            kind: self.kind.name(),
        })
    }

    /// Pops the top unit, which must hold at most one value.
    pub fn pop_optional(&mut self) -> Result<Option<T>, StackError> {
        match self.top_len()? {
            0 => {
                self.units.pop();
                Ok(None)
            }
            _ => self.pop_one().map(Some),
        }
    }

    pub fn pop_unit(&mut self) -> Result<Vec<T>, StackError> {
        let len = self.top_len()?;
        self.units.pop();
        let split = self.values.len() - len;
        Ok(self.values.split_off(split))
    }

    /// Appends one value to the top unit.
    pub fn append(&mut self, value: T) -> Result<(), StackError> {
        let kind = self.kind.name();
        let top = self.units.last_mut().ok_or(StackError::Underflow { kind })?;
        *top += 1;
        self.values.push(value);
        Ok(())
    }

    /// Merges the two top units into one.
    pub fn concat(&mut self) -> Result<(), StackError> {
        let kind = self.kind.name();
        let top = self.units.pop().ok_or(StackError::Underflow { kind })?;
        match self.units.last_mut() {
            Some(below) => {
                *below += top;
                Ok(())
            }
            None => {
                self.units.push(top);
                Err(StackError::Underflow { kind })
            }
        }
    }

    #[must_use]
    pub fn unit_count(&self) -> usize {
        self.units.len()
    }

    #[cfg(test)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Empties the stack, returning every unit bottom-up.
    pub fn drain_units(&mut self) -> Vec<Vec<T>> {
        let mut values = std::mem::take(&mut self.values).into_iter();
        std::mem::take(&mut self.units)
            .into_iter()
            .map(|len| values.by_ref().take(len).collect())
            .collect()
    }

    pub fn clear(&mut self) {
        self.values.clear();
        self.units.clear();
    }

    fn top_len(&self) -> Result<usize, StackError> {
        self.units.last().copied().ok_or(StackError::Underflow {
            kind: self.kind.name(),
        })
    }
}

/// The five value stacks of one parser.
#[derive(Debug, Clone)]
pub struct ValueStore {
    pub ast: KindStack<AstNode>,
    pub expr: KindStack<Expr>,
    pub ident: KindStack<Ident>,
    pub int: KindStack<i32>,
    pub generic: KindStack<GenericNode>,
}

impl Default for ValueStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueStore {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ast: KindStack::new(ValueKind::Ast),
            expr: KindStack::new(ValueKind::Expr),
            ident: KindStack::new(ValueKind::Ident),
            int: KindStack::new(ValueKind::Int),
            generic: KindStack::new(ValueKind::Generic),
        }
    }

    #[must_use]
    pub fn unit_count(&self, kind: ValueKind) -> usize {
        match kind {
            ValueKind::Ast => self.ast.unit_count(),
            ValueKind::Expr => self.expr.unit_count(),
            ValueKind::Ident => self.ident.unit_count(),
            ValueKind::Int => self.int.unit_count(),
            ValueKind::Generic => self.generic.unit_count(),
        }
    }

    /// Pushes an empty unit on the stack of `kind`.
    pub fn push_empty(&mut self, kind: ValueKind) {
        match kind {
            ValueKind::Ast => self.ast.push_empty(),
            ValueKind::Expr => self.expr.push_empty(),
            ValueKind::Ident => self.ident.push_empty(),
            ValueKind::Int => self.int.push_empty(),
            ValueKind::Generic => self.generic.push_empty(),
        }
    }

    pub fn concat(&mut self, kind: ValueKind) -> Result<(), StackError> {
        match kind {
            ValueKind::Ast => self.ast.concat(),
            ValueKind::Expr => self.expr.concat(),
            ValueKind::Ident => self.ident.concat(),
            ValueKind::Int => self.int.concat(),
            ValueKind::Generic => self.generic.concat(),
        }
    }

    pub fn clear(&mut self) {
        self.ast.clear();
        self.expr.clear();
        self.ident.clear();
        self.int.clear();
        self.generic.clear();
    }

    #[cfg(test)]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        ValueKind::ALL.iter().all(|&kind| self.unit_count(kind) == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_concat_merges_units_without_moving_values() {
        let mut stack = KindStack::new(ValueKind::Int);
        stack.push(1);
        stack.push_unit([2, 3]);
        stack.concat().expect("two units");
        assert_eq!(stack.unit_count(), 1);
        assert_eq!(stack.pop_unit().expect("one unit"), vec![1, 2, 3]);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_empty_units() {
        let mut stack = KindStack::new(ValueKind::Int);
        stack.push_empty();
        stack.push(7);
        assert_eq!(stack.pop_optional(), Ok(Some(7)));
        assert_eq!(stack.pop_optional(), Ok(None));
        assert_eq!(stack.pop_unit(), Err(StackError::Underflow { kind: "int" }));
    }

    #[test]
    fn test_pop_one_rejects_lists() {
        let mut stack = KindStack::new(ValueKind::Expr);
        stack.push_unit([1, 2]);
        assert_eq!(stack.pop_one(), Err(StackError::NotSingle { kind: "expr", len: 2 }));
        assert_eq!(stack.unit_count(), 1);
    }

    #[test]
    fn test_concat_needs_two_units() {
        let mut stack = KindStack::<i32>::new(ValueKind::Int);
        stack.push_empty();
        assert!(stack.concat().is_err());
        assert_eq!(stack.unit_count(), 1);
    }

    #[test]
    fn test_drain_units_keeps_order() {
        let mut stack = KindStack::new(ValueKind::Int);
        stack.push(1);
        stack.push_empty();
        stack.push_unit([2, 3]);
        stack.append(4).expect("top unit exists");
        assert_eq!(stack.drain_units(), vec![vec![1], vec![], vec![2, 3, 4]]);
        assert!(stack.is_empty());
    }

    #[test]
    fn test_stack_error_becomes_invariant_abort() {
        let abort: Abort = StackError::Underflow { kind: "ast" }.into();
        assert!(matches!(abort, Abort::Invariant(message) if message.contains("ast")));
    }
}
