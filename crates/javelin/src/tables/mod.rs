//! # Parse Tables
//!
//! [`GrammarTables`] flattens the LALR(1) automaton into a dense action table indexed
//! by `(state, token kind)` and a dense goto table indexed by `(state, nonterminal)`.
//! The tables are built once per process from the embedded grammar and shared by every
//! parser through [`GrammarTables::global`].
//!
//! ## Conflicts
//!
//! Shift/reduce conflicts resolve to shift; reduce/reduce conflicts resolve to the
//! production declared first. Every resolution is recorded in
//! [`GrammarTables::conflicts`], and a count that differs from the grammar's `%expect`
//! is logged as a warning.
//!
//! ## Default reductions
//!
//! A state whose explicit entries include reductions also gets a *default reduction*:
//! its most frequent reduction, used for lookaheads that have no entry. This keeps
//! detection sound (the error is found before the next shift) while sparing rows.
//! [`GrammarTables::expected_terminals`] only reports explicit entries.

mod lalr;

use crate::error::GrammarError;
use crate::grammar::{Grammar, KnownSymbols, Rule, RuleAction, SymbolId, ValueKind};
use crate::lexer::TokenKind;
use once_cell::sync::OnceCell;
use serde::Serialize;
use tracing::{debug, instrument, trace, warn};

/// Parser state number.
pub type StateId = u32;

const NO_GOTO: u32 = u32::MAX;

/// One cell of the action table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Action {
    #[default]
    Error,
    Shift(StateId),
    /// Reduce by the production with this index.
    Reduce(u32),
    Accept,
}

/// A conflict found while filling the action table, and how it was resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: StateId,
    pub token: TokenKind,
    pub chosen: Action,
    pub rejected: Action,
}

/// Size figures for the built tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableStats {
    pub states: usize,
    pub terminals: usize,
    pub nonterminals: usize,
    pub rules: usize,
    pub conflicts: usize,
    pub expected_conflicts: Option<usize>,
    pub shift_entries: usize,
    pub reduce_entries: usize,
    pub default_reductions: usize,
}

/// Action and goto tables for the Javelin grammar.
#[derive(Debug)]
pub struct GrammarTables {
    grammar: Grammar,
    known: KnownSymbols,
    num_states: usize,
    actions: Vec<Action>,
    gotos: Vec<u32>,
    defaults: Vec<Option<u32>>,
    expected: Vec<Vec<TokenKind>>,
    conflicts: Vec<Conflict>,
    terminal_symbols: Vec<Option<SymbolId>>,
    kernels: Vec<Vec<lalr::Item>>,
}

static TABLES: OnceCell<GrammarTables> = OnceCell::new();

impl GrammarTables {
    /// Builds the tables for the embedded grammar.
    pub fn load() -> Result<Self, GrammarError> {
        Self::from_grammar(Grammar::javelin()?)
    }

    /// The process-wide tables, built on first use.
    pub fn global() -> Result<&'static Self, GrammarError> {
        TABLES.get_or_try_init(Self::load)
    }

    #[instrument(level = "debug", skip_all)]
    pub fn from_grammar(grammar: Grammar) -> Result<Self, GrammarError> {
        let known = KnownSymbols::resolve(&grammar)?;
        let automaton = lalr::build(&grammar);
        let num_states = automaton.kernels.len();
        let nonterminals = grammar.symbols().len() - grammar.terminal_count();

        let mut terminal_symbols = vec![None; TokenKind::COUNT];
        for (index, symbol) in grammar.symbols()[..grammar.terminal_count()].iter().enumerate() {
            if let Some(token) = symbol.token {
                terminal_symbols[token.index()] = Some(grammar_symbol(index));
            }
        }

        let mut builder = TableBuilder {
            grammar: &grammar,
            actions: vec![Action::Error; num_states * TokenKind::COUNT],
            conflicts: Vec::new(),
        };
        let mut gotos = vec![NO_GOTO; num_states * nonterminals];

        for state in 0..num_states {
            for &(symbol, target) in &automaton.transitions[state] {
                if grammar.is_terminal(symbol) {
                    builder.put(state, symbol.index(), Action::Shift(target));
                } else {
                    gotos[state * nonterminals + symbol.index() - grammar.terminal_count()] = target;
                }
            }
            for (kernel_index, item) in automaton.kernels[state].iter().enumerate() {
                let rule = &grammar.rules()[item.rule as usize];
                if item.dot as usize != rule.rhs.len() {
                    continue;
                }
                if item.rule == 0 {
                    builder.put(state, 0, Action::Accept);
                    continue;
                }
                for terminal in automaton.lookaheads[state][kernel_index].iter() {
                    builder.put(state, terminal, Action::Reduce(item.rule));
                }
            }
            for (rule, lookahead) in &automaton.empty_reductions[state] {
                for terminal in lookahead.iter() {
                    builder.put(state, terminal, Action::Reduce(*rule));
                }
            }
        }

        let TableBuilder {
            actions, conflicts, ..
        } = builder;
        let defaults = (0..num_states)
            .map(|state| default_reduction(&actions[state * TokenKind::COUNT..(state + 1) * TokenKind::COUNT]))
            .collect();
        let expected = (0..num_states)
            .map(|state| {
                actions[state * TokenKind::COUNT..(state + 1) * TokenKind::COUNT]
                    .iter()
                    .enumerate()
                    .filter(|(_, action)| **action != Action::Error)
                    .filter_map(|(column, _)| {
                        terminal_symbols[column].and_then(|symbol| grammar.symbol(symbol).token)
                    })
                    .filter(|token| !is_goal_marker(*token))
                    .collect()
            })
            .collect();

        for conflict in &conflicts {
            trace!(
                state = conflict.state,
                token = ?conflict.token,
                chosen = ?conflict.chosen,
                rejected = ?conflict.rejected,
                "resolved conflict"
            );
        }
        if let Some(expected) = grammar.expected_conflicts()
            && expected != conflicts.len()
        {
            warn!(expected, found = conflicts.len(), "unexpected number of grammar conflicts");
        }
        debug!(states = num_states, conflicts = conflicts.len(), "built parse tables");

        Ok(Self {
            known,
            num_states,
            actions,
            gotos,
            defaults,
            expected,
            conflicts,
            terminal_symbols,
            kernels: automaton.kernels,
            grammar,
        })
    }

    /// The explicit action for `token` in `state`.
    #[must_use]
    pub fn action(&self, state: StateId, token: TokenKind) -> Action {
        self.actions[state as usize * TokenKind::COUNT + token.index()]
    }

    /// The action the driver takes: the explicit entry, or the state's default
    /// reduction when there is none.
    #[must_use]
    pub fn action_or_default(&self, state: StateId, token: TokenKind) -> Action {
        match self.action(state, token) {
            Action::Error => self.defaults[state as usize].map_or(Action::Error, Action::Reduce),
            explicit => explicit,
        }
    }

    #[must_use]
    pub fn default_reduction(&self, state: StateId) -> Option<u32> {
        self.defaults[state as usize]
    }

    #[must_use]
    pub fn goto(&self, state: StateId, symbol: SymbolId) -> Option<StateId> {
        let nonterminal = symbol.index().checked_sub(self.grammar.terminal_count())?;
        let nonterminals = self.grammar.symbols().len() - self.grammar.terminal_count();
        let target = self.gotos[state as usize * nonterminals + nonterminal];
        (target != NO_GOTO).then_some(target)
    }

    #[must_use]
    pub fn rule(&self, rule: u32) -> &Rule {
        &self.grammar.rules()[rule as usize]
    }

    #[must_use]
    pub fn rule_lhs(&self, rule: u32) -> SymbolId {
        self.rule(rule).lhs
    }

    #[must_use]
    pub fn rule_len(&self, rule: u32) -> usize {
        self.rule(rule).rhs.len()
    }

    #[must_use]
    pub fn rule_action(&self, rule: u32) -> RuleAction {
        self.rule(rule).action
    }

    #[must_use]
    pub fn symbol_name(&self, symbol: SymbolId) -> &str {
        &self.grammar.symbol(symbol).name
    }

    #[must_use]
    pub fn symbol_kind(&self, symbol: SymbolId) -> Option<ValueKind> {
        self.grammar.symbol(symbol).kind
    }

    /// Token kind of a terminal symbol.
    #[must_use]
    pub fn symbol_token(&self, symbol: SymbolId) -> Option<TokenKind> {
        self.grammar.symbol(symbol).token
    }

    /// Grammar symbol of a token kind, if the grammar uses it.
    #[must_use]
    pub fn terminal_symbol(&self, token: TokenKind) -> Option<SymbolId> {
        self.terminal_symbols[token.index()]
    }

    /// Tokens with an explicit entry in `state`, in token order.
    #[must_use]
    pub fn expected_terminals(&self, state: StateId) -> &[TokenKind] {
        &self.expected[state as usize]
    }

    #[must_use]
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }

    #[must_use]
    pub const fn num_states(&self) -> usize {
        self.num_states
    }

    #[must_use]
    pub const fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    #[must_use]
    pub const fn known(&self) -> &KnownSymbols {
        &self.known
    }

    /// Kernel items of a state, rendered in grammar notation.
    #[must_use]
    pub fn describe_state(&self, state: StateId) -> Vec<String> {
        self.kernels[state as usize]
            .iter()
            .map(|item| self.grammar.describe_rule(item.rule as usize, Some(item.dot as usize)))
            .collect()
    }

    #[must_use]
    pub fn stats(&self) -> TableStats {
        let (mut shift_entries, mut reduce_entries) = (0, 0);
        for action in &self.actions {
            match action {
                Action::Shift(_) => shift_entries += 1,
                Action::Reduce(_) => reduce_entries += 1,
                Action::Error | Action::Accept => {}
            }
        }
        TableStats {
            states: self.num_states,
            terminals: self.grammar.terminal_count(),
            nonterminals: self.grammar.symbols().len() - self.grammar.terminal_count(),
            rules: self.grammar.rules().len(),
            conflicts: self.conflicts.len(),
            expected_conflicts: self.grammar.expected_conflicts(),
            shift_entries,
            reduce_entries,
            default_reductions: self.defaults.iter().flatten().count(),
        }
    }
}

struct TableBuilder<'g> {
    grammar: &'g Grammar,
    actions: Vec<Action>,
    conflicts: Vec<Conflict>,
}

impl TableBuilder<'_> {
    fn put(&mut self, state: usize, terminal: usize, action: Action) {
        let Some(token) = self.grammar.symbols()[terminal].token else {
            return;
        };
        let cell = &mut self.actions[state * TokenKind::COUNT + token.index()];
        let existing = *cell;
        if existing == Action::Error || existing == action {
            *cell = action;
            return;
        }
        let chosen = match (existing, action) {
            (Action::Shift(_), _) | (Action::Accept, _) => existing,
            (_, Action::Shift(_)) | (_, Action::Accept) => action,
            (Action::Reduce(old), Action::Reduce(new)) if new < old => action,
            _ => existing,
        };
        let rejected = if chosen == existing { action } else { existing };
        *cell = chosen;
        self.conflicts.push(Conflict {
            state: state as StateId,
            token,
            chosen,
            rejected,
        });
    }
}

fn grammar_symbol(index: usize) -> SymbolId {
    SymbolId::from_index(index)
}

/// Most frequent reduction in a row; ties go to the earlier production.
fn default_reduction(row: &[Action]) -> Option<u32> {
    let mut counts: Vec<(u32, usize)> = Vec::new();
    for action in row {
        if let Action::Reduce(rule) = *action {
            match counts.iter_mut().find(|(seen, _)| *seen == rule) {
                Some((_, count)) => *count += 1,
                None => counts.push((rule, 1)),
            }
        }
    }
    counts
        .into_iter()
        .max_by(|(rule_a, count_a), (rule_b, count_b)| count_a.cmp(count_b).then(rule_b.cmp(rule_a)))
        .map(|(rule, _)| rule)
}

const fn is_goal_marker(token: TokenKind) -> bool {
    matches!(
        token,
        TokenKind::UnitGoal
            | TokenKind::HeadersGoal
            | TokenKind::MethodBodyGoal
            | TokenKind::ConstructorBodyGoal
            | TokenKind::StatementsGoal
            | TokenKind::InitializerGoal
            | TokenKind::ExpressionGoal
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tables() -> &'static GrammarTables {
        GrammarTables::global().expect("tables build")
    }

    #[test]
    fn test_javelin_table_shape() {
        let tables = tables();
        assert_eq!(tables.num_states(), 907);
        assert_eq!(tables.conflicts().len(), 3);
        assert!(tables.conflicts().iter().all(|conflict| conflict.token == TokenKind::Less));
        assert!(
            tables
                .conflicts()
                .iter()
                .all(|conflict| matches!(conflict.chosen, Action::Shift(_)))
        );
    }

    #[test]
    fn test_goal_markers_shift_from_initial_state() {
        let tables = tables();
        for goal in [
            TokenKind::UnitGoal,
            TokenKind::HeadersGoal,
            TokenKind::MethodBodyGoal,
            TokenKind::ConstructorBodyGoal,
            TokenKind::StatementsGoal,
            TokenKind::InitializerGoal,
            TokenKind::ExpressionGoal,
        ] {
            assert!(matches!(tables.action(0, goal), Action::Shift(_)), "{goal:?}");
        }
        assert_eq!(tables.action(0, TokenKind::Identifier), Action::Error);
    }

    #[test]
    fn test_expected_terminals_exclude_goal_markers() {
        let tables = tables();
        let Action::Shift(after_unit) = tables.action(0, TokenKind::UnitGoal) else {
            panic!("unit goal shifts");
        };
        let expected = tables.expected_terminals(after_unit);
        assert!(expected.contains(&TokenKind::Class));
        assert!(expected.contains(&TokenKind::Package));
        assert!(!expected.contains(&TokenKind::UnitGoal));
    }

    #[test]
    fn test_rule_queries() {
        let tables = tables();
        let rule = tables
            .grammar()
            .rules()
            .iter()
            .position(|rule| rule.action == RuleAction::FieldDeclaration)
            .expect("field declaration production") as u32;
        assert_eq!(tables.rule_len(rule), 4);
        assert_eq!(tables.symbol_name(tables.rule_lhs(rule)), "FieldDeclaration");
        assert_eq!(tables.symbol_kind(tables.rule_lhs(rule)), Some(ValueKind::Ast));
    }

    #[test]
    fn test_terminal_symbol_round_trip() {
        let tables = tables();
        let symbol = tables.terminal_symbol(TokenKind::Semicolon).expect("';' is a terminal");
        assert_eq!(tables.symbol_token(symbol), Some(TokenKind::Semicolon));
        assert_eq!(tables.terminal_symbol(TokenKind::Arrow), None);
    }

    #[test]
    fn test_default_reduction_prefers_frequent_then_earlier() {
        let row = [
            Action::Reduce(7),
            Action::Shift(1),
            Action::Reduce(3),
            Action::Reduce(7),
            Action::Reduce(3),
        ];
        assert_eq!(default_reduction(&row), Some(3));
        assert_eq!(default_reduction(&[Action::Reduce(9), Action::Reduce(9), Action::Reduce(2)]), Some(9));
        assert_eq!(default_reduction(&[Action::Shift(1)]), None);
    }

    #[test]
    fn test_stats_and_state_description() {
        let tables = tables();
        let stats = tables.stats();
        assert_eq!(stats.states, 907);
        assert_eq!(stats.expected_conflicts, Some(3));
        assert!(stats.shift_entries > 0 && stats.reduce_entries > 0);
        assert_eq!(tables.describe_state(0), vec!["$accept ::= . Goal".to_string()]);
    }
}
