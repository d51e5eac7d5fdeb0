//! # Parser
//!
//! The table-driven LALR(1) automaton, its semantic actions and the entry points that
//! tie scanning, parsing and recovery together.
//!
//! A [`Parser`] owns its automaton stack and value stacks and reuses them across
//! parses, so one parser per thread is the intended shape. Every entry point starts
//! the automaton on a goal marker token (`$unit`, `$method_body`, ...), which selects
//! the part of the grammar to parse against.
//!
//! ## Diet parsing
//!
//! With [`ParserOptions::diet`] the method and initializer bodies of a compilation
//! unit are skipped by brace matching and left unparsed. They can be filled in later
//! with [`Parser::parse_method_bodies`], or one at a time with
//! [`Parser::parse_method_body`].
//!
//! ## Errors
//!
//! Syntax, lexical and structural problems go to a [`ProblemReporter`]. Only the first
//! syntax error of a parse is reported; recovery then produces a best-effort tree. The
//! `Result` of an entry point is reserved for [`Abort`]: cancellation, a reporter that
//! gave up, or a broken internal invariant.

mod actions;
pub(crate) mod driver;
pub(crate) mod node;
#[cfg(feature = "parallel")]
mod parallel;
pub(crate) mod stack;

#[cfg(feature = "parallel")]
pub use parallel::{FileParseResult, parse_many};
pub use stack::StackError;

use crate::ast::{Body, BodyRef, BodyState, CompilationUnit, Expr};
use crate::doc::{DocCommentParser, TagScanner};
use crate::error::{Abort, GrammarError};
use crate::lexer::{ScanMode, Scanner, TokenKind, TokenSource};
use crate::report::{Problem, ProblemReporter};
use crate::syntax::{TextRange, TextSize};
use crate::tables::GrammarTables;
use driver::{Session, StackEntry};
use hashbrown::HashSet;
use serde::Serialize;
use stack::ValueStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, instrument};

/// Shared flag that makes a running parse return [`Abort::Cancelled`].
///
/// The driver polls it every few dozen shifted tokens.
#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Configuration for a [`Parser`]
#[derive(Debug, Clone, Serialize)]
pub struct ParserOptions {
    /// Skip method, constructor and initializer bodies of compilation units
    pub diet: bool,

    /// Treat `module`, `requires` and the other restricted keywords as keywords
    pub module_info: bool,

    /// Run the recovery engine after a syntax error instead of only keeping what the
    /// automaton had built
    pub error_recovery: bool,

    /// Also recover inside method bodies
    pub statement_recovery: bool,

    /// Verify after every reduction that the value stacks match the automaton stack
    pub check_stack_balance: bool,

    /// Attach doc comments to declarations
    pub doc_comments: bool,

    #[serde(skip)]
    pub cancellation: Option<CancellationFlag>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            diet: false,
            module_info: false,
            error_recovery: true,
            statement_recovery: true,
            check_stack_balance: cfg!(debug_assertions),
            doc_comments: true,
            cancellation: None,
        }
    }
}

impl ParserOptions {
    #[must_use]
    pub const fn with_diet(mut self, diet: bool) -> Self {
        self.diet = diet;
        self
    }

    #[must_use]
    pub const fn with_module_info(mut self, module_info: bool) -> Self {
        self.module_info = module_info;
        self
    }

    #[must_use]
    pub const fn with_error_recovery(mut self, enabled: bool) -> Self {
        self.error_recovery = enabled;
        self
    }

    #[must_use]
    pub const fn with_statement_recovery(mut self, enabled: bool) -> Self {
        self.statement_recovery = enabled;
        self
    }

    #[must_use]
    pub const fn with_stack_balance_check(mut self, enabled: bool) -> Self {
        self.check_stack_balance = enabled;
        self
    }

    #[must_use]
    pub const fn with_doc_comments(mut self, enabled: bool) -> Self {
        self.doc_comments = enabled;
        self
    }

    #[must_use]
    pub fn with_cancellation(mut self, flag: CancellationFlag) -> Self {
        self.cancellation = Some(flag);
        self
    }

    #[must_use]
    pub const fn scan_mode(&self) -> ScanMode {
        if self.module_info {
            ScanMode::ModuleInfo
        } else {
            ScanMode::Standard
        }
    }
}

/// A compilation unit and whether any error was reported while producing it.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ParseOutcome {
    pub unit: CompilationUnit,
    pub had_error: bool,
}

/// Passes problems through, dropping lexical ones already reported once the second
/// pass over recovered bodies starts.
struct LexicalFilter<'a, R: ?Sized> {
    inner: &'a mut R,
    seen: HashSet<TextRange>,
    replaying: bool,
}

impl<'a, R: ProblemReporter + ?Sized> LexicalFilter<'a, R> {
    fn new(inner: &'a mut R) -> Self {
        Self {
            inner,
            seen: HashSet::new(),
            replaying: false,
        }
    }
}

impl<R: ProblemReporter + ?Sized> ProblemReporter for LexicalFilter<'_, R> {
    fn report(&mut self, problem: Problem) -> Result<(), Abort> {
        if problem.kind.is_lexical() && !self.seen.insert(problem.range) && self.replaying {
            return Ok(());
        }
        self.inner.report(problem)
    }
}

/// Entry point selected by the goal marker token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Goal {
    Unit,
    Headers,
    MethodBody,
    ConstructorBody,
    Statements,
    Initializer,
    Expression,
}

impl Goal {
    pub(crate) const fn marker(self) -> TokenKind {
        match self {
            Self::Unit => TokenKind::UnitGoal,
            Self::Headers => TokenKind::HeadersGoal,
            Self::MethodBody => TokenKind::MethodBodyGoal,
            Self::ConstructorBody => TokenKind::ConstructorBodyGoal,
            Self::Statements => TokenKind::StatementsGoal,
            Self::Initializer => TokenKind::InitializerGoal,
            Self::Expression => TokenKind::ExpressionGoal,
        }
    }
}

/// A reusable LALR(1) parser.
pub struct Parser {
    options: ParserOptions,
    tables: &'static GrammarTables,
    docs: Box<dyn DocCommentParser>,
    stack: Vec<StackEntry>,
    values: ValueStore,
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("options", &self.options)
            .field("states", &self.tables.num_states())
            .finish_non_exhaustive()
    }
}

impl Parser {
    /// Creates a parser over the process-wide grammar tables, building them on first
    /// use.
    ///
    /// # Errors
    /// Returns the grammar error if the embedded grammar fails to load.
    pub fn new(options: ParserOptions) -> Result<Self, GrammarError> {
        Ok(Self::with_tables(options, GrammarTables::global()?))
    }

    #[must_use]
    pub fn with_tables(options: ParserOptions, tables: &'static GrammarTables) -> Self {
        Self {
            options,
            tables,
            docs: Box::new(TagScanner),
            stack: Vec::with_capacity(64),
            values: ValueStore::new(),
        }
    }

    /// Replaces the doc comment parser.
    #[must_use]
    pub fn with_doc_parser(mut self, docs: impl DocCommentParser + 'static) -> Self {
        self.docs = Box::new(docs);
        self
    }

    #[must_use]
    pub const fn options(&self) -> &ParserOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: ParserOptions) {
        self.options = options;
    }

    #[must_use]
    pub const fn tables(&self) -> &'static GrammarTables {
        self.tables
    }

    /// Empties the automaton and value stacks. Every entry point does this itself; it
    /// only matters after an [`Abort`] when the parser is kept for reuse.
    pub fn initialize(&mut self) {
        self.stack.clear();
        self.values.clear();
    }

    /// Parses a whole source file.
    ///
    /// # Errors
    /// Returns an [`Abort`] when the parse is cancelled, the reporter gives up, or an
    /// internal invariant breaks.
    #[instrument(level = "debug", skip_all, fields(len = text.len(), diet = self.options.diet))]
    pub fn parse_compilation_unit(
        &mut self,
        text: &str,
        reporter: &mut impl ProblemReporter,
    ) -> Result<ParseOutcome, Abort> {
        self.initialize();
        let mode = self.options.scan_mode();
        let diet = self.options.diet;
        let mut scanner = Scanner::new(text, mode);
        let mut reporter = LexicalFilter::new(reporter);
        let (mut unit, had_error, recovered) = {
            let mut session = self.session(&mut scanner, &mut reporter);
            session.diet = diet;
            session.parse_unit()?
        };

        if recovered && !diet {
            // Bodies closed by recovery were seen as headers only. Part of them was
            // scanned before the syntax error, so lexical errors can come twice.
            reporter.replaying = true;
            let mut fresh = Scanner::new(text, mode);
            self.parse_bodies(&mut unit, &mut fresh, &mut reporter, true)?;
        }
        unit.body_state = if diet {
            BodyState::Deferred
        } else {
            BodyState::Parsed
        };
        self.initialize();
        Ok(ParseOutcome { unit, had_error })
    }

    /// Parses every body of `unit` that has not been parsed yet, in source order.
    ///
    /// `text` must be the source `unit` was parsed from. Returns whether any error was
    /// reported.
    ///
    /// # Errors
    /// See [`Parser::parse_compilation_unit`].
    #[instrument(level = "debug", skip_all, fields(len = text.len()))]
    pub fn parse_method_bodies(
        &mut self,
        unit: &mut CompilationUnit,
        text: &str,
        reporter: &mut impl ProblemReporter,
    ) -> Result<bool, Abort> {
        let mut scanner = Scanner::new(text, self.options.scan_mode());
        let had_error = self.parse_bodies(unit, &mut scanner, reporter, false)?;
        unit.body_state = BodyState::Parsed;
        Ok(had_error)
    }

    /// Parses one body in place. A constructor body may start with `this(...)` or
    /// `super(...)`. Returns whether any error was reported.
    ///
    /// # Errors
    /// See [`Parser::parse_compilation_unit`].
    pub fn parse_method_body(
        &mut self,
        text: &str,
        body: &mut Body,
        constructor: bool,
        reporter: &mut impl ProblemReporter,
    ) -> Result<bool, Abort> {
        let mut scanner = Scanner::new(text, self.options.scan_mode());
        let goal = if constructor {
            Goal::ConstructorBody
        } else {
            Goal::MethodBody
        };
        let range = body.range;
        let mut session = self.session(&mut scanner, reporter);
        let statements = session.parse_body(goal, range)?;
        let had_error = session.had_error;
        drop(session);
        body.statements = Some(statements);
        self.initialize();
        Ok(had_error)
    }

    /// Parses the variable initializer at `range` of `text`, an expression or an
    /// array initializer. Returns `None` after a syntax error.
    ///
    /// # Errors
    /// See [`Parser::parse_compilation_unit`].
    pub fn parse_field_initializer(
        &mut self,
        text: &str,
        range: TextRange,
        reporter: &mut impl ProblemReporter,
    ) -> Result<Option<Expr>, Abort> {
        let mut scanner = Scanner::new(text, self.options.scan_mode());
        let result = self
            .session(&mut scanner, reporter)
            .parse_expression(Goal::Initializer, range);
        self.initialize();
        result
    }

    /// Parses `text` as a single expression. Returns `None` after a syntax error.
    ///
    /// # Errors
    /// See [`Parser::parse_compilation_unit`].
    pub fn parse_expression(
        &mut self,
        text: &str,
        reporter: &mut impl ProblemReporter,
    ) -> Result<Option<Expr>, Abort> {
        let mut scanner = Scanner::new(text, self.options.scan_mode());
        let range = TextRange::new(TextSize::zero(), scanner.source_len());
        let result = self
            .session(&mut scanner, reporter)
            .parse_expression(Goal::Expression, range);
        self.initialize();
        result
    }

    fn parse_bodies(
        &mut self,
        unit: &mut CompilationUnit,
        scanner: &mut Scanner,
        reporter: &mut impl ProblemReporter,
        quiet: bool,
    ) -> Result<bool, Abort> {
        let mut bodies = unit.bodies_mut();
        bodies.retain(|body| !body.body().is_parsed());
        // The scanner hands out lexical errors in order.
        bodies.sort_by_key(|body| body.body().range.start());
        debug!(count = bodies.len(), quiet, "parsing deferred bodies");

        let mut had_error = false;
        for body in bodies {
            let (goal, body) = match body {
                BodyRef::Constructor(body) => (Goal::ConstructorBody, body),
                BodyRef::Method(body) | BodyRef::Initializer(body) => (Goal::MethodBody, body),
            };
            let mut session = self.session(scanner, reporter);
            session.quiet = quiet;
            let statements = session.parse_body(goal, body.range)?;
            had_error |= session.had_error;
            body.statements = Some(statements);
        }
        self.initialize();
        Ok(had_error)
    }

    fn session<'a>(
        &'a mut self,
        source: &'a mut dyn TokenSource,
        reporter: &'a mut dyn ProblemReporter,
    ) -> Session<'a> {
        Session::new(
            self.tables,
            &self.options,
            self.docs.as_ref(),
            &mut self.stack,
            &mut self.values,
            source,
            reporter,
        )
    }
}
