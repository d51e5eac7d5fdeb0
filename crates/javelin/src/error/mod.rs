//! # Error Types
//!
//! Three families of failure exist, and they travel differently:
//!
//! - [`GrammarError`]: the embedded grammar could not be turned into tables. This is a
//!   build defect and surfaces from [`GrammarTables::load`](crate::tables::GrammarTables::load)
//!   and [`Parser::new`](crate::Parser::new).
//! - [`LexicalError`]: a malformed token. The scanner queues these and the driver hands
//!   them to the [`ProblemReporter`](crate::report::ProblemReporter) as problems; the
//!   token itself is still delivered.
//! - [`Abort`]: the non-local outcome that unwinds a whole parse (cancellation, reporter
//!   escalation, broken internal invariant).
//!
//! Syntax errors are not errors in this sense at all: they are reported as problems and
//! handled by recovery.
//!
//! ## Diagnostics Support
//!
//! With the `diagnostics` feature every type here implements [`miette::Diagnostic`].

pub mod diagnostics;

use crate::syntax::TextRange;
use compact_str::CompactString;
use thiserror::Error;

#[cfg(feature = "diagnostics")]
use miette::Diagnostic;

/// Failure to turn the grammar source into parse tables.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum GrammarError {
    #[error("grammar line {line}: {message}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::syntax)))]
    Syntax { line: usize, message: String },

    #[error("grammar line {line}: unknown symbol `{symbol}`")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::unknown_symbol)))]
    UnknownSymbol { line: usize, symbol: String },

    #[error("grammar line {line}: terminal {name} has no token kind")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::unknown_terminal)))]
    UnknownTerminal { line: usize, name: String },

    #[error("grammar line {line}: unknown rule action `{name}`")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::unknown_action)))]
    UnknownAction { line: usize, name: String },

    #[error("grammar line {line}: production for {lhs} needs an action ({reason})")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::missing_action)))]
    MissingAction {
        line: usize,
        lhs: String,
        reason: String,
    },

    #[error("grammar line {line}: `{action}` cannot reduce {lhs} ({reason})")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::action_shape)))]
    ActionShape {
        line: usize,
        lhs: String,
        action: String,
        reason: String,
    },

    #[error("symbol `{symbol}` is assigned more than one value kind")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::duplicate_kind)))]
    DuplicateKind { symbol: String },

    #[error("grammar has no %start directive")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::missing_start)))]
    MissingStart,

    #[error("grammar does not define `{0}`, which the parser requires")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(grammar::missing_symbol)))]
    MissingSymbol(String),
}

/// Lexical error with location information.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
#[error("{kind}")]
pub struct LexicalError {
    #[cfg_attr(feature = "diagnostics", label)]
    pub range: TextRange,
    #[source]
    pub kind: LexicalErrorKind,
}

impl LexicalError {
    #[must_use]
    pub const fn new(range: TextRange, kind: LexicalErrorKind) -> Self {
        Self { range, kind }
    }
}

/// What was wrong with a token.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum LexicalErrorKind {
    #[error("invalid character '{ch}'")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::invalid_character)))]
    InvalidCharacter { ch: char },

    #[error("unterminated string literal")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::unterminated_string)))]
    UnterminatedString,

    #[error("unterminated character literal")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::unterminated_char)))]
    UnterminatedChar,

    #[error("unterminated comment")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::unterminated_comment)))]
    UnterminatedComment,

    #[error("empty character literal")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::empty_char)))]
    EmptyCharLiteral,

    #[error("character literal holds more than one character")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::invalid_char_literal)))]
    InvalidCharLiteral,

    #[error("invalid escape sequence {escape}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::invalid_escape)))]
    InvalidEscape { escape: CompactString },

    #[error("invalid unicode escape")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::invalid_unicode_escape)))]
    InvalidUnicodeEscape,

    #[error("malformed number: {reason}")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::malformed_number)))]
    MalformedNumber { reason: &'static str },

    #[error("numeric literal {literal} is out of range")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(lexer::number_overflow)))]
    NumberOverflow { literal: CompactString },
}

/// Outcome that unwinds an entire parse.
///
/// Recoverable syntax errors never produce an `Abort`; they are reported and recovered
/// from. An `Abort` means the caller gets no tree at all.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[cfg_attr(feature = "diagnostics", derive(Diagnostic))]
pub enum Abort {
    #[error("parse cancelled")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::cancelled)))]
    Cancelled,

    #[error("too many problems: the limit of {limit} was reached")]
    #[cfg_attr(feature = "diagnostics", diagnostic(code(parser::too_many_problems)))]
    TooManyProblems { limit: usize },

    #[error("internal parser invariant violated: {0}")]
    #[cfg_attr(
        feature = "diagnostics",
        diagnostic(code(parser::invariant), help("this is a parser bug; please report it"))
    )]
    Invariant(CompactString),
}

impl Abort {
    #[must_use]
    pub fn invariant(message: impl Into<CompactString>) -> Self {
        Self::Invariant(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TextSize;

    #[test]
    fn test_lexical_error_message_comes_from_kind() {
        let error = LexicalError::new(
            TextRange::at(TextSize::new(4), 1),
            LexicalErrorKind::InvalidCharacter { ch: '#' },
        );
        assert_eq!(error.to_string(), "invalid character '#'");
    }

    #[test]
    fn test_abort_messages() {
        assert_eq!(Abort::Cancelled.to_string(), "parse cancelled");
        assert_eq!(
            Abort::TooManyProblems { limit: 3 }.to_string(),
            "too many problems: the limit of 3 was reached"
        );
        assert!(Abort::invariant("ast stack underflow").to_string().contains("underflow"));
    }

    #[test]
    fn test_grammar_error_carries_line() {
        let error = GrammarError::UnknownAction {
            line: 12,
            name: "frobnicate".into(),
        };
        assert_eq!(
            error.to_string(),
            "grammar line 12: unknown rule action `frobnicate`"
        );
    }
}
