//! Nullable and FIRST sets.

use super::{Grammar, SymbolId};
use smallvec::SmallVec;

/// Bit set over terminal indices.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TerminalSet {
    words: SmallVec<[u64; 2]>,
}

impl TerminalSet {
    #[must_use]
    pub fn with_capacity(terminals: usize) -> Self {
        Self {
            words: SmallVec::from_elem(0, terminals.div_ceil(64)),
        }
    }

    pub fn insert(&mut self, terminal: usize) -> bool {
        let (word, bit) = (terminal / 64, terminal % 64);
        if word >= self.words.len() {
            self.words.resize(word + 1, 0);
        }
        let before = self.words[word];
        self.words[word] |= 1 << bit;
        before != self.words[word]
    }

    #[must_use]
    pub fn contains(&self, terminal: usize) -> bool {
        self.words
            .get(terminal / 64)
            .is_some_and(|word| word & (1 << (terminal % 64)) != 0)
    }

    /// Adds every member of `other`, returning whether anything changed.
    pub fn union_with(&mut self, other: &Self) -> bool {
        if other.words.len() > self.words.len() {
            self.words.resize(other.words.len(), 0);
        }
        let mut changed = false;
        for (mine, theirs) in self.words.iter_mut().zip(&other.words) {
            let merged = *mine | theirs;
            changed |= merged != *mine;
            *mine = merged;
        }
        changed
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.iter().all(|&word| word == 0)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.words.iter().enumerate().flat_map(|(index, &word)| {
            (0..64)
                .filter(move |bit| word & (1 << bit) != 0)
                .map(move |bit| index * 64 + bit)
        })
    }
}

/// Nullable flags and FIRST sets for every nonterminal.
#[derive(Debug)]
pub struct FirstSets {
    terminal_count: usize,
    nullable: Vec<bool>,
    first: Vec<TerminalSet>,
}

impl FirstSets {
    pub fn compute(grammar: &Grammar) -> Self {
        let terminal_count = grammar.terminal_count();
        let nonterminals = grammar.symbols().len() - terminal_count;
        let mut sets = Self {
            terminal_count,
            nullable: vec![false; nonterminals],
            first: vec![TerminalSet::with_capacity(terminal_count); nonterminals],
        };

        let mut changed = true;
        while changed {
            changed = false;
            for rule in grammar.rules() {
                let lhs = rule.lhs.index() - terminal_count;
                if !sets.nullable[lhs] && rule.rhs.iter().all(|&symbol| sets.is_nullable(symbol)) {
                    sets.nullable[lhs] = true;
                    changed = true;
                }
                for &symbol in &rule.rhs {
                    if symbol.index() < terminal_count {
                        changed |= sets.first[lhs].insert(symbol.index());
                        break;
                    }
                    let index = symbol.index() - terminal_count;
                    if index != lhs {
                        let first = sets.first[index].clone();
                        changed |= sets.first[lhs].union_with(&first);
                    }
                    if !sets.nullable[index] {
                        break;
                    }
                }
            }
        }
        sets
    }

    #[must_use]
    pub fn is_nullable(&self, symbol: SymbolId) -> bool {
        symbol.index() >= self.terminal_count && self.nullable[symbol.index() - self.terminal_count]
    }

    /// FIRST of a symbol sequence, and whether the whole sequence is nullable.
    #[must_use]
    pub fn first_of_sequence(&self, symbols: &[SymbolId]) -> (TerminalSet, bool) {
        let mut result = TerminalSet::with_capacity(self.terminal_count);
        for &symbol in symbols {
            if symbol.index() < self.terminal_count {
                result.insert(symbol.index());
                return (result, false);
            }
            result.union_with(&self.first[symbol.index() - self.terminal_count]);
            if !self.is_nullable(symbol) {
                return (result, false);
            }
        }
        (result, true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_set_operations() {
        let mut set = TerminalSet::with_capacity(130);
        assert!(set.is_empty());
        assert!(set.insert(3));
        assert!(!set.insert(3));
        assert!(set.insert(127));
        assert!(set.contains(127));
        assert!(!set.contains(4));

        let mut other = TerminalSet::with_capacity(130);
        other.insert(64);
        assert!(set.union_with(&other));
        assert!(!set.union_with(&other));
        assert_eq!(set.iter().collect::<Vec<_>>(), vec![3, 64, 127]);
    }

    #[test]
    fn test_first_sets_through_nullable_prefix() {
        let grammar = Grammar::parse(
            "%start S\n\
             S ::= A ';'\n\
             A ::= %empty\n\
             A ::= '{'\n",
        )
        .expect("grammar loads");
        let first = FirstSets::compute(&grammar);
        let a = grammar.symbol_id("A").expect("A exists");
        let s = grammar.symbol_id("S").expect("S exists");
        assert!(first.is_nullable(a));
        assert!(!first.is_nullable(s));

        let (set, nullable) = first.first_of_sequence(&[s]);
        assert!(!nullable);
        let semicolon = grammar.symbol_id("';'").expect("';' exists");
        let brace = grammar.symbol_id("'{'").expect("'{' exists");
        assert!(set.contains(semicolon.index()));
        assert!(set.contains(brace.index()));
    }
}
