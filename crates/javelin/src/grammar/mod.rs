//! # Grammar
//!
//! The Javelin grammar is kept as text (`javelin.g`, embedded at compile time) and
//! loaded into a [`Grammar`]: numbered symbols, numbered productions and the semantic
//! action of every production. The table builder in [`crate::tables`] works from it.
//!
//! ## Format
//!
//! ```text
//! -- comment
//! %start Goal
//! %expect 3
//! %terminals Identifier StringLiteral
//! %kind expr Expression Primary
//! Lhs ::= Rhs 'terminal' OtherRhs => action_name
//! Lhs ::= %empty
//! ```
//!
//! Quoted terminals are resolved against [`TokenKind`] spellings; bare terminals must
//! be listed by `%terminals`. Anything else on a right-hand side must have a production.
//!
//! `%kind` puts a symbol's semantic value on one of the five value stacks. A production
//! without `=> action` must either pass through the single valued right-hand symbol of
//! its own kind, or involve no values at all; the loader rejects anything else so
//! that the value stacks cannot drift at run time.

pub mod action;
pub mod analysis;
pub mod known;

pub use action::RuleAction;
pub use known::KnownSymbols;

use crate::error::GrammarError;
use crate::lexer::TokenKind;
use compact_str::CompactString;
use hashbrown::HashMap;
use serde::Deserialize;
use smallvec::SmallVec;

/// The grammar the parser is built from.
pub const GRAMMAR_SOURCE: &str = include_str!("javelin.g");

/// Index of a grammar symbol. Terminals come first, then nonterminals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SymbolId(u16);

impl SymbolId {
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_index(index: usize) -> Self {
        Self(u16::try_from(index).unwrap_or(u16::MAX))
    }
}

/// Which value stack a symbol's semantic value lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    Ast,
    Expr,
    Ident,
    Int,
    Generic,
}

impl ValueKind {
    pub const ALL: [Self; 5] = [Self::Ast, Self::Expr, Self::Ident, Self::Int, Self::Generic];

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ast => "ast",
            Self::Expr => "expr",
            Self::Ident => "ident",
            Self::Int => "int",
            Self::Generic => "generic",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub name: CompactString,
    pub kind: Option<ValueKind>,
    /// Token kind of a terminal.
    pub token: Option<TokenKind>,
}

#[derive(Debug, Clone)]
pub struct Rule {
    pub lhs: SymbolId,
    pub rhs: SmallVec<[SymbolId; 6]>,
    pub action: RuleAction,
    /// Source line, for diagnostics.
    pub line: usize,
}

/// A loaded grammar. Rule 0 is the augmented `$accept ::= start`.
#[derive(Debug, Clone)]
pub struct Grammar {
    symbols: Vec<Symbol>,
    terminal_count: usize,
    rules: Vec<Rule>,
    start: SymbolId,
    expected_conflicts: Option<usize>,
    by_name: HashMap<CompactString, SymbolId, ahash::RandomState>,
}

struct RawRule<'a> {
    lhs: &'a str,
    rhs: Vec<&'a str>,
    action: Option<&'a str>,
    line: usize,
}

impl Grammar {
    /// Loads the embedded Javelin grammar.
    pub fn javelin() -> Result<Self, GrammarError> {
        Self::parse(GRAMMAR_SOURCE)
    }

    pub fn parse(source: &str) -> Result<Self, GrammarError> {
        let mut start = None;
        let mut expected_conflicts = None;
        let mut named_terminals: Vec<&str> = Vec::new();
        let mut kinds: Vec<(&str, ValueKind, usize)> = Vec::new();
        let mut raw_rules = Vec::new();

        for (index, raw_line) in source.lines().enumerate() {
            let line = index + 1;
            let text = strip_comment(raw_line).trim();
            if text.is_empty() {
                continue;
            }
            if let Some(directive) = text.strip_prefix('%') {
                let mut words = directive.split_whitespace();
                let syntax = |message: &str| GrammarError::Syntax {
                    line,
                    message: message.to_string(),
                };
                match words.next() {
                    Some("start") => {
                        start = Some(words.next().ok_or_else(|| syntax("%start needs a symbol"))?);
                    }
                    Some("expect") => {
                        let count = words
                            .next()
                            .and_then(|word| word.parse().ok())
                            .ok_or_else(|| syntax("%expect needs a conflict count"))?;
                        expected_conflicts = Some(count);
                    }
                    Some("terminals") => named_terminals.extend(words),
                    Some("kind") => {
                        let name = words.next().ok_or_else(|| syntax("%kind needs a kind"))?;
                        let kind = parse_kind(name).ok_or_else(|| GrammarError::Syntax {
                            line,
                            message: format!("unknown value kind `{name}`"),
                        })?;
                        kinds.extend(words.map(|symbol| (symbol, kind, line)));
                    }
                    _ => return Err(syntax("unknown directive")),
                }
                continue;
            }
            raw_rules.push(parse_rule(text, line)?);
        }

        let start = start.ok_or(GrammarError::MissingStart)?;
        Self::build(start, expected_conflicts, &named_terminals, &kinds, &raw_rules)
    }

    fn build(
        start: &str,
        expected_conflicts: Option<usize>,
        named_terminals: &[&str],
        kinds: &[(&str, ValueKind, usize)],
        raw_rules: &[RawRule<'_>],
    ) -> Result<Self, GrammarError> {
        let mut nonterminals: Vec<&str> = vec!["$accept"];
        for rule in raw_rules {
            if !nonterminals.contains(&rule.lhs) {
                nonterminals.push(rule.lhs);
            }
        }

        let mut terminals: Vec<(&str, TokenKind)> = vec![("EOF", TokenKind::Eof)];
        for rule in raw_rules {
            for &symbol in &rule.rhs {
                if nonterminals.contains(&symbol) || terminals.iter().any(|(name, _)| *name == symbol) {
                    continue;
                }
                if !symbol.starts_with('\'') && !named_terminals.contains(&symbol) {
                    return Err(GrammarError::UnknownSymbol {
                        line: rule.line,
                        symbol: symbol.to_string(),
                    });
                }
                let token = TokenKind::from_grammar_name(symbol).ok_or_else(|| {
                    GrammarError::UnknownTerminal {
                        line: rule.line,
                        name: symbol.to_string(),
                    }
                })?;
                terminals.push((symbol, token));
            }
        }

        let mut symbols: Vec<Symbol> = terminals
            .iter()
            .map(|&(name, token)| Symbol {
                name: CompactString::from(name),
                kind: None,
                token: Some(token),
            })
            .collect();
        symbols.extend(nonterminals.iter().map(|&name| Symbol {
            name: CompactString::from(name),
            kind: None,
            token: None,
        }));

        let mut by_name: HashMap<CompactString, SymbolId, ahash::RandomState> = HashMap::default();
        for (index, symbol) in symbols.iter().enumerate() {
            by_name.insert(symbol.name.clone(), SymbolId::from_index(index));
        }

        for &(name, kind, line) in kinds {
            let id = *by_name.get(name).ok_or_else(|| GrammarError::UnknownSymbol {
                line,
                symbol: name.to_string(),
            })?;
            let symbol = &mut symbols[id.index()];
            if symbol.kind.is_some() {
                return Err(GrammarError::DuplicateKind {
                    symbol: name.to_string(),
                });
            }
            symbol.kind = Some(kind);
        }

        let start_id = *by_name
            .get(start)
            .filter(|id| id.index() >= terminals.len())
            .ok_or_else(|| GrammarError::UnknownSymbol {
                line: 0,
                symbol: start.to_string(),
            })?;

        let mut rules = Vec::with_capacity(raw_rules.len() + 1);
        rules.push(Rule {
            lhs: SymbolId::from_index(terminals.len()),
            rhs: SmallVec::from_slice(&[start_id]),
            action: RuleAction::Nop,
            line: 0,
        });
        for raw in raw_rules {
            let lhs = by_name[raw.lhs];
            let rhs: SmallVec<[SymbolId; 6]> = raw.rhs.iter().map(|symbol| by_name[*symbol]).collect();
            let action = resolve_action(&symbols, raw, lhs, &rhs)?;
            rules.push(Rule {
                lhs,
                rhs,
                action,
                line: raw.line,
            });
        }

        Ok(Self {
            symbols,
            terminal_count: terminals.len(),
            rules,
            start: start_id,
            expected_conflicts,
            by_name,
        })
    }

    #[must_use]
    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    #[must_use]
    pub fn symbol(&self, id: SymbolId) -> &Symbol {
        &self.symbols[id.index()]
    }

    #[must_use]
    pub fn symbol_id(&self, name: &str) -> Option<SymbolId> {
        self.by_name.get(name).copied()
    }

    #[must_use]
    pub const fn terminal_count(&self) -> usize {
        self.terminal_count
    }

    #[must_use]
    pub const fn is_terminal(&self, id: SymbolId) -> bool {
        id.index() < self.terminal_count
    }

    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    #[must_use]
    pub const fn start(&self) -> SymbolId {
        self.start
    }

    /// The conflict count declared with `%expect`.
    #[must_use]
    pub const fn expected_conflicts(&self) -> Option<usize> {
        self.expected_conflicts
    }

    /// Renders a production in grammar notation, with a dot before `dot` if given.
    #[must_use]
    pub fn describe_rule(&self, rule: usize, dot: Option<usize>) -> String {
        let rule = &self.rules[rule];
        let mut text = format!("{} ::=", self.symbol(rule.lhs).name);
        for (position, symbol) in rule.rhs.iter().enumerate() {
            if dot == Some(position) {
                text.push_str(" .");
            }
            text.push(' ');
            text.push_str(&self.symbol(*symbol).name);
        }
        if dot == Some(rule.rhs.len()) {
            text.push_str(" .");
        }
        text
    }
}

fn parse_kind(name: &str) -> Option<ValueKind> {
    use serde::de::IntoDeserializer;
    use serde::de::value::{Error, StrDeserializer};
    let deserializer: StrDeserializer<'_, Error> = name.into_deserializer();
    ValueKind::deserialize(deserializer).ok()
}

/// Drops a `--` comment, leaving quoted `'--'` terminals alone.
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    let bytes = line.as_bytes();
    for (index, &byte) in bytes.iter().enumerate() {
        match byte {
            b'\'' => quoted = !quoted,
            b'-' if !quoted && bytes.get(index + 1) == Some(&b'-') => return &line[..index],
            _ => {}
        }
    }
    line
}

fn parse_rule(text: &str, line: usize) -> Result<RawRule<'_>, GrammarError> {
    let syntax = |message: &str| GrammarError::Syntax {
        line,
        message: message.to_string(),
    };
    let (lhs, rest) = text
        .split_once("::=")
        .ok_or_else(|| syntax("expected `Lhs ::= ...`"))?;
    let lhs = lhs.trim();
    if lhs.is_empty() || !lhs.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(syntax("malformed left-hand side"));
    }

    let mut rhs = Vec::new();
    let mut action = None;
    let mut words = rhs_words(rest);
    while let Some(word) = words.next() {
        if word == "=>" {
            action = Some(words.next().ok_or_else(|| syntax("`=>` needs an action name"))?);
            if words.next().is_some() {
                return Err(syntax("the action name must end the production"));
            }
            break;
        }
        rhs.push(word);
    }
    if rhs == ["%empty"] {
        rhs.clear();
    } else if rhs.is_empty() {
        return Err(syntax("empty right-hand side; write %empty"));
    } else if rhs.contains(&"%empty") {
        return Err(syntax("%empty must stand alone"));
    }

    Ok(RawRule {
        lhs,
        rhs,
        action,
        line,
    })
}

/// Splits a right-hand side into words, keeping quoted terminals such as `'('`
/// intact.
fn rhs_words(text: &str) -> impl Iterator<Item = &str> {
    let mut rest = text.trim_start();
    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let end = if rest.starts_with('\'') {
            rest[1..].find('\'').map_or(rest.len(), |close| close + 2)
        } else {
            rest.find(char::is_whitespace).unwrap_or(rest.len())
        };
        let (word, tail) = rest.split_at(end);
        rest = tail.trim_start();
        Some(word)
    })
}

fn resolve_action(
    symbols: &[Symbol],
    raw: &RawRule<'_>,
    lhs: SymbolId,
    rhs: &[SymbolId],
) -> Result<RuleAction, GrammarError> {
    let lhs_kind = symbols[lhs.index()].kind;
    let valued: SmallVec<[ValueKind; 6]> = rhs.iter().filter_map(|id| symbols[id.index()].kind).collect();
    let lhs_name = || raw.lhs.to_string();

    let Some(name) = raw.action else {
        return match (lhs_kind, valued.as_slice()) {
            (None, []) => Ok(RuleAction::Nop),
            (Some(kind), [only]) if *only == kind => Ok(RuleAction::Pass),
            (None, _) => Err(GrammarError::MissingAction {
                line: raw.line,
                lhs: lhs_name(),
                reason: "right-hand values would be dropped".to_string(),
            }),
            (Some(kind), _) => Err(GrammarError::MissingAction {
                line: raw.line,
                lhs: lhs_name(),
                reason: format!("no single {} value to pass through", kind.name()),
            }),
        };
    };

    let action = RuleAction::from_name(name).ok_or_else(|| GrammarError::UnknownAction {
        line: raw.line,
        name: name.to_string(),
    })?;
    let shape = |reason: &str| GrammarError::ActionShape {
        line: raw.line,
        lhs: lhs_name(),
        action: name.to_string(),
        reason: reason.to_string(),
    };
    match action {
        RuleAction::Concat => match (lhs_kind, valued.as_slice()) {
            (Some(kind), [a, b]) if *a == kind && *b == kind => {}
            _ => return Err(shape("needs exactly two right-hand values of the left-hand kind")),
        },
        RuleAction::EmptyList => {
            if lhs_kind.is_none() || !valued.is_empty() {
                return Err(shape("needs a valued left-hand side and no right-hand values"));
            }
        }
        _ => {}
    }
    Ok(action)
}
