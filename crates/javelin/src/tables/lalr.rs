//! LALR(1) automaton construction.
//!
//! The LR(0) collection is built first. Lookaheads are then computed per state with
//! the propagation scheme: closing a kernel item under a marker yields the lookaheads
//! each closure item gets *spontaneously* and the kernel items whose lookaheads it
//! *inherits*. Inherited lookaheads flow along goto edges until nothing changes.

use crate::grammar::analysis::{FirstSets, TerminalSet};
use crate::grammar::{Grammar, SymbolId};
use hashbrown::HashMap;
use smallvec::SmallVec;
use tracing::debug;

type FastMap<K, V> = HashMap<K, V, ahash::RandomState>;

/// An LR(0) item: a production with a dot position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Item {
    pub rule: u32,
    pub dot: u32,
}

impl Item {
    const fn new(rule: usize, dot: usize) -> Self {
        Self {
            rule: rule as u32,
            dot: dot as u32,
        }
    }

    const fn advanced(self) -> Self {
        Self {
            rule: self.rule,
            dot: self.dot + 1,
        }
    }
}

/// The LALR(1) automaton before it is flattened into tables.
#[derive(Debug)]
pub(crate) struct Automaton {
    /// Sorted kernel items per state.
    pub kernels: Vec<Vec<Item>>,
    /// Goto edges per state, in the order the symbols were first met.
    pub transitions: Vec<Vec<(SymbolId, u32)>>,
    /// Lookahead set per kernel item.
    pub lookaheads: Vec<Vec<TerminalSet>>,
    /// Empty productions reduced in each state, with their lookaheads.
    pub empty_reductions: Vec<Vec<(u32, TerminalSet)>>,
}

impl Automaton {
    pub fn transition(&self, state: usize, symbol: SymbolId) -> Option<u32> {
        self.transitions[state]
            .iter()
            .find(|(on, _)| *on == symbol)
            .map(|&(_, target)| target)
    }

    fn kernel_index(&self, state: usize, item: Item) -> usize {
        self.kernels[state].binary_search(&item).unwrap_or_default()
    }
}

#[derive(Default, Clone)]
struct ClosureLookahead {
    terminals: TerminalSet,
    /// Kernel items whose lookaheads this closure entry also gets.
    inherits: SmallVec<[u32; 4]>,
}

/// Lookaheads of the nonterminals expanded in one state's closure.
struct StateClosure {
    terminal_count: usize,
    lookaheads: FastMap<SymbolId, ClosureLookahead>,
    order: Vec<SymbolId>,
    work: Vec<SymbolId>,
}

impl StateClosure {
    fn new(terminal_count: usize) -> Self {
        Self {
            terminal_count,
            lookaheads: FastMap::default(),
            order: Vec::new(),
            work: Vec::new(),
        }
    }

    fn add(&mut self, symbol: SymbolId, terminals: &TerminalSet, inherits: &[u32]) {
        let entry = self.lookaheads.entry(symbol).or_insert_with(|| {
            self.order.push(symbol);
            ClosureLookahead {
                terminals: TerminalSet::with_capacity(self.terminal_count),
                inherits: SmallVec::new(),
            }
        });
        let mut changed = entry.terminals.union_with(terminals);
        for &kernel in inherits {
            if !entry.inherits.contains(&kernel) {
                entry.inherits.push(kernel);
                changed = true;
            }
        }
        if changed {
            self.work.push(symbol);
        }
    }
}

pub(crate) fn build(grammar: &Grammar) -> Automaton {
    let by_lhs = rules_by_lhs(grammar);
    let (kernels, transitions) = lr0_collection(grammar, &by_lhs);
    debug!(states = kernels.len(), "built LR(0) collection");

    let mut automaton = Automaton {
        lookaheads: kernels
            .iter()
            .map(|kernel| vec![TerminalSet::with_capacity(grammar.terminal_count()); kernel.len()])
            .collect(),
        kernels,
        transitions,
        empty_reductions: Vec::new(),
    };
    compute_lookaheads(grammar, &by_lhs, &mut automaton);
    automaton
}

fn rules_by_lhs(grammar: &Grammar) -> Vec<Vec<usize>> {
    let mut by_lhs = vec![Vec::new(); grammar.symbols().len()];
    for (index, rule) in grammar.rules().iter().enumerate() {
        by_lhs[rule.lhs.index()].push(index);
    }
    by_lhs
}

fn next_symbol(grammar: &Grammar, item: Item) -> Option<SymbolId> {
    grammar.rules()[item.rule as usize].rhs.get(item.dot as usize).copied()
}

fn closure(grammar: &Grammar, by_lhs: &[Vec<usize>], kernel: &[Item]) -> Vec<Item> {
    let mut items = kernel.to_vec();
    let mut expanded = vec![false; grammar.symbols().len()];
    let mut cursor = 0;
    while cursor < items.len() {
        let item = items[cursor];
        cursor += 1;
        let Some(symbol) = next_symbol(grammar, item) else {
            continue;
        };
        if grammar.is_terminal(symbol) || expanded[symbol.index()] {
            continue;
        }
        expanded[symbol.index()] = true;
        for &rule in &by_lhs[symbol.index()] {
            let fresh = Item::new(rule, 0);
            if !items.contains(&fresh) {
                items.push(fresh);
            }
        }
    }
    items
}

#[allow(clippy::type_complexity)]
fn lr0_collection(
    grammar: &Grammar,
    by_lhs: &[Vec<usize>],
) -> (Vec<Vec<Item>>, Vec<Vec<(SymbolId, u32)>>) {
    let mut kernels: Vec<Vec<Item>> = vec![vec![Item::new(0, 0)]];
    let mut index: FastMap<Vec<Item>, u32> = FastMap::default();
    index.insert(kernels[0].clone(), 0);
    let mut transitions = Vec::new();

    let mut state = 0;
    while state < kernels.len() {
        let items = closure(grammar, by_lhs, &kernels[state]);
        let mut grouped: Vec<(SymbolId, Vec<Item>)> = Vec::new();
        for item in items {
            let Some(symbol) = next_symbol(grammar, item) else {
                continue;
            };
            match grouped.iter_mut().find(|(on, _)| *on == symbol) {
                Some((_, targets)) => targets.push(item.advanced()),
                None => grouped.push((symbol, vec![item.advanced()])),
            }
        }

        let mut edges = Vec::with_capacity(grouped.len());
        for (symbol, mut kernel) in grouped {
            kernel.sort_unstable();
            kernel.dedup();
            let target = match index.get(&kernel) {
                Some(&existing) => existing,
                None => {
                    let fresh = u32::try_from(kernels.len()).unwrap_or(u32::MAX);
                    index.insert(kernel.clone(), fresh);
                    kernels.push(kernel);
                    fresh
                }
            };
            edges.push((symbol, target));
        }
        transitions.push(edges);
        state += 1;
    }
    (kernels, transitions)
}

fn compute_lookaheads(grammar: &Grammar, by_lhs: &[Vec<usize>], automaton: &mut Automaton) {
    let first = FirstSets::compute(grammar);
    let terminal_count = grammar.terminal_count();
    let rules = grammar.rules();

    automaton.lookaheads[0][0].insert(0);
    let mut propagation: Vec<Vec<Vec<(u32, u32)>>> = automaton
        .kernels
        .iter()
        .map(|kernel| vec![Vec::new(); kernel.len()])
        .collect();
    let mut empty_sources: Vec<Vec<(u32, ClosureLookahead)>> = Vec::with_capacity(automaton.kernels.len());

    for state in 0..automaton.kernels.len() {
        let mut closure = StateClosure::new(terminal_count);

        for (kernel_index, &item) in automaton.kernels[state].iter().enumerate() {
            let rhs = &rules[item.rule as usize].rhs;
            let Some(&symbol) = rhs.get(item.dot as usize) else {
                continue;
            };
            if grammar.is_terminal(symbol) {
                continue;
            }
            let (terminals, nullable) = first.first_of_sequence(&rhs[item.dot as usize + 1..]);
            let marker = [kernel_index as u32];
            let inherits: &[u32] = if nullable { &marker } else { &[] };
            closure.add(symbol, &terminals, inherits);
        }

        while let Some(symbol) = closure.work.pop() {
            let Some(current) = closure.lookaheads.get(&symbol).cloned() else {
                continue;
            };
            for &rule in &by_lhs[symbol.index()] {
                let rhs = &rules[rule].rhs;
                let Some(&head) = rhs.first() else {
                    continue;
                };
                if grammar.is_terminal(head) {
                    continue;
                }
                let (mut terminals, nullable) = first.first_of_sequence(&rhs[1..]);
                if nullable {
                    terminals.union_with(&current.terminals);
                    closure.add(head, &terminals, &current.inherits);
                } else {
                    closure.add(head, &terminals, &[]);
                }
            }
        }

        for (kernel_index, &item) in automaton.kernels[state].iter().enumerate() {
            if let Some(symbol) = next_symbol(grammar, item)
                && let Some(target) = automaton.transition(state, symbol)
            {
                let target_index = automaton.kernel_index(target as usize, item.advanced());
                propagation[state][kernel_index].push((target, target_index as u32));
            }
        }

        let mut empties = Vec::new();
        for symbol in closure.order {
            let lookahead = &closure.lookaheads[&symbol];
            for &rule in &by_lhs[symbol.index()] {
                let Some(&head) = rules[rule].rhs.first() else {
                    empties.push((rule as u32, lookahead.clone()));
                    continue;
                };
                let Some(target) = automaton.transition(state, head) else {
                    continue;
                };
                let target_index = automaton.kernel_index(target as usize, Item::new(rule, 1));
                automaton.lookaheads[target as usize][target_index].union_with(&lookahead.terminals);
                for &kernel in &lookahead.inherits {
                    propagation[state][kernel as usize].push((target, target_index as u32));
                }
            }
        }
        empty_sources.push(empties);
    }

    let mut rounds = 0;
    let mut changed = true;
    while changed {
        changed = false;
        rounds += 1;
        for state in 0..propagation.len() {
            for kernel in 0..propagation[state].len() {
                if propagation[state][kernel].is_empty() {
                    continue;
                }
                let source = automaton.lookaheads[state][kernel].clone();
                for &(target, target_index) in &propagation[state][kernel] {
                    changed |= automaton.lookaheads[target as usize][target_index as usize].union_with(&source);
                }
            }
        }
    }
    debug!(rounds, "propagated lookaheads");

    automaton.empty_reductions = empty_sources
        .into_iter()
        .enumerate()
        .map(|(state, empties)| {
            empties
                .into_iter()
                .map(|(rule, lookahead)| {
                    let mut terminals = lookahead.terminals;
                    for kernel in lookahead.inherits {
                        terminals.union_with(&automaton.lookaheads[state][kernel as usize]);
                    }
                    (rule, terminals)
                })
                .collect()
        })
        .collect();
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> Grammar {
        // S ::= E ; E ::= E '+' T | T ; T ::= '(' E ')' | Identifier
        Grammar::parse(
            "%start S\n\
             %terminals Identifier\n\
             S ::= E ';'\n\
             E ::= E '+' T\n\
             E ::= T\n\
             T ::= '(' E ')'\n\
             T ::= Identifier\n",
        )
        .expect("toy grammar loads")
    }

    #[test]
    fn test_lr0_state_count() {
        let grammar = toy();
        let automaton = build(&grammar);
        assert_eq!(automaton.kernels.len(), 11);
        assert_eq!(automaton.transitions.len(), automaton.kernels.len());
    }

    #[test]
    fn test_lookaheads_of_completed_items() {
        let grammar = toy();
        let automaton = build(&grammar);
        let identifier = grammar.symbol_id("Identifier").expect("terminal exists");
        let target = automaton.transition(0, identifier).expect("shift on identifier");
        let lookahead = &automaton.lookaheads[target as usize][0];
        let expected: Vec<usize> = ["';'", "'+'", "')'"]
            .iter()
            .map(|name| grammar.symbol_id(name).expect("terminal exists").index())
            .collect();
        let mut actual: Vec<usize> = lookahead.iter().collect();
        actual.sort_unstable();
        let mut expected_sorted = expected;
        expected_sorted.sort_unstable();
        assert_eq!(actual, expected_sorted);
    }

    #[test]
    fn test_empty_reduction_lookaheads() {
        let grammar = Grammar::parse(
            "%start S\n\
             S ::= A ';'\n\
             A ::= %empty\n\
             A ::= '{'\n",
        )
        .expect("grammar loads");
        let automaton = build(&grammar);
        let semicolon = grammar.symbol_id("';'").expect("terminal exists").index();
        let (rule, lookahead) = automaton.empty_reductions[0]
            .first()
            .expect("state 0 reduces A ::= %empty");
        assert_eq!(grammar.rules()[*rule as usize].rhs.len(), 0);
        assert!(lookahead.contains(semicolon));
    }
}
