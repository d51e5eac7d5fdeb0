//! # Lexer
//!
//! Tokenization of Javelin source and the [`TokenSource`] seam between lexing and
//! parsing.
//!
//! The parser only ever talks to a [`TokenSource`]. [`Scanner`] is the implementation
//! used for real input: it translates unicode escapes, tokenizes with a logos automaton,
//! decodes literal values and keeps doc comments aside for the declarations that own
//! them.

mod literal;
pub mod scanner;
pub mod token;
mod unicode;

pub use scanner::{ScanMode, Scanner};
pub use token::{Token, TokenKind, TokenValue};

use crate::error::LexicalError;
use crate::syntax::{LineIndex, TextRange, TextSize};
use compact_str::CompactString;

/// A doc comment as it appears in the source, delimiters included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDocComment {
    pub range: TextRange,
    pub text: CompactString,
}

/// Where the parser gets its tokens from.
pub trait TokenSource {
    /// Returns the next significant token. Past the end of the current bounds this
    /// keeps returning [`TokenKind::Eof`] at the bounds' end offset.
    fn next_token(&mut self) -> Token;

    /// Repositions so the next token is the first one starting at or after `offset`.
    fn reset_to(&mut self, offset: TextSize);

    /// Skips a block body. Must be called right after its `{` was returned; the next
    /// token is then the matching `}`, or end of input when there is none.
    fn jump_over_body(&mut self);

    fn bounds(&self) -> TextRange;

    /// Restricts the source to the tokens starting inside `range` and repositions at
    /// its start.
    fn set_bounds(&mut self, range: TextRange);

    /// Drains the lexical errors of tokens returned so far. Each error is handed out
    /// once, even if its token is read again after a reset.
    fn take_lexical_errors(&mut self) -> Vec<LexicalError>;

    /// The doc comment directly before a declaration starting at `offset`, if no other
    /// token comes between them.
    fn doc_comment_before(&self, offset: TextSize) -> Option<&RawDocComment>;

    fn line_index(&self) -> &LineIndex;

    fn source_len(&self) -> TextSize;
}
