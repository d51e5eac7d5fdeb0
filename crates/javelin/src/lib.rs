//! # Javelin
//!
//! A table-driven LALR(1) parser for Javelin, a Java-like language, with a structural
//! error-recovery engine.
//!
//! ## Overview
//!
//! - **Grammar and tables**: the grammar is embedded as text, analysed and turned into
//!   LALR(1) action and goto tables once per process
//! - **Scanner**: a logos-based tokenizer with unicode escapes, doc comments and the
//!   contextual keywords of module descriptors
//! - **Driver**: a shift/reduce automaton whose reductions build a typed AST through
//!   per-kind value stacks
//! - **Error recovery**: after the first syntax error the driver restarts on header
//!   fragments and rebuilds the declaration structure from brace balance, so later
//!   members and types survive
//! - **Diet parsing**: method bodies can be skipped by brace matching and parsed later
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use javelin::{CollectingReporter, Parser, ParserOptions};
//!
//! let mut parser = Parser::new(ParserOptions::default()).expect("grammar loads");
//! let mut reporter = CollectingReporter::new();
//! let outcome = parser
//!     .parse_compilation_unit("class A { void m() { return; } }", &mut reporter)
//!     .expect("not aborted");
//!
//! assert!(!outcome.had_error);
//! assert_eq!(outcome.unit.types[0].name.name, "A");
//! for problem in reporter.problems() {
//!     eprintln!("{problem}");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`syntax`] - Text offsets, ranges and line/column lookup
//! - [`lexer`] - Tokens and the scanner
//! - [`grammar`] - Grammar text, symbols and rule actions
//! - [`tables`] - LALR(1) table construction
//! - [`parser`] - The parser and its entry points
//! - [`ast`] - The syntax tree the parser produces
//! - [`report`] - Problems and reporters
//! - [`error`] - Error types and diagnostics

pub mod ast;
pub mod doc;
pub mod error;
pub mod grammar;
pub mod lexer;
pub mod parser;
mod recovery;
pub mod report;
pub mod syntax;
pub mod tables;

// Re-export commonly used types
pub use ast::{BodyState, CompilationUnit, Visitor};
pub use doc::{DocCommentParser, TagScanner};
pub use error::{Abort, GrammarError, LexicalError, LexicalErrorKind};
pub use lexer::{ScanMode, Scanner, Token, TokenKind, TokenValue};
pub use parser::{CancellationFlag, ParseOutcome, Parser, ParserOptions};
pub use report::{CollectingReporter, Problem, ProblemKind, ProblemReporter, Severity};
pub use syntax::{LineCol, LineIndex, TextRange, TextSize};
pub use tables::GrammarTables;

#[cfg(feature = "parallel")]
pub use parser::{FileParseResult, parse_many};
