//! The shift/reduce loop and the per-parse session state.

use super::stack::ValueStore;
use super::{CancellationFlag, Goal, ParserOptions};
use crate::ast::{Body, CompilationUnit, Expr, ExprKind, Ident, Literal, LiteralKind, Statement};
use crate::doc::DocCommentParser;
use crate::error::Abort;
use crate::error::diagnostics::{did_you_mean, format_expected_list};
use crate::grammar::{SymbolId, ValueKind};
use crate::lexer::{Token, TokenKind, TokenSource};
use crate::recovery::{RecoveryTree, TreeMode};
use crate::report::{Problem, ProblemKind, ProblemReporter, Severity};
use crate::syntax::{TextRange, TextSize};
use crate::tables::{Action, GrammarTables, StateId};
use compact_str::CompactString;
use tracing::{debug, trace, warn};

/// Shifted tokens between two looks at the cancellation flag.
const CANCEL_POLL_INTERVAL: u64 = 64;

/// How many expected tokens a syntax error lists before eliding the rest.
const EXPECTED_LIMIT: usize = 8;

#[cfg(test)]
thread_local! {
    /// Rules reduced on this thread.
    static REDUCED_RULES: std::cell::RefCell<hashbrown::HashSet<u32>> =
        std::cell::RefCell::new(hashbrown::HashSet::new());
}

/// One entry of the automaton stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct StackEntry {
    pub state: StateId,
    pub symbol: SymbolId,
    pub range: TextRange,
}

#[derive(Debug, Clone)]
pub(crate) enum RunOutcome {
    Accepted,
    /// No action for `token` in `state`.
    Failed { token: Token, state: StateId },
}

/// What the goal's accept action took off the value stacks.
#[derive(Debug, Clone)]
pub(crate) enum Accepted {
    Unit(CompilationUnit),
    Headers,
    Body(Body),
    Statements(Vec<Statement>),
    Expression(Expr),
}

/// The reduction being applied.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Reduction {
    pub rule: u32,
    /// Stack index of the first right-hand side entry.
    pub base: usize,
    /// Range of the left-hand side.
    pub range: TextRange,
}

/// State of one parse: the borrowed parser buffers plus everything that lives only
/// as long as the parse.
pub(crate) struct Session<'a> {
    pub(crate) tables: &'static GrammarTables,
    pub(crate) options: &'a ParserOptions,
    pub(crate) docs: &'a dyn DocCommentParser,
    pub(crate) stack: &'a mut Vec<StackEntry>,
    pub(crate) values: &'a mut ValueStore,
    pub(crate) source: &'a mut dyn TokenSource,
    reporter: &'a mut dyn ProblemReporter,
    pub(crate) lookahead: Token,
    pub(crate) reduction: Reduction,
    /// Open type bodies, anonymous ones included.
    pub(crate) nested_type: u32,
    /// Per open type body, the number of open method bodies inside it.
    pub(crate) nested_method: Vec<u32>,
    pub(crate) diet: bool,
    /// Open anonymous class bodies whose methods must not be skipped.
    pub(crate) diet_level: u32,
    /// The next shifted `{` starts a body to skip.
    pub(crate) jump_pending: bool,
    pub(crate) accepted: Option<Accepted>,
    pub(crate) tree: Option<RecoveryTree>,
    /// Suppresses syntax errors.
    pub(crate) quiet: bool,
    syntax_reported: bool,
    pub(crate) had_error: bool,
    shifts: u64,
}

impl<'a> Session<'a> {
    pub(crate) fn new(
        tables: &'static GrammarTables,
        options: &'a ParserOptions,
        docs: &'a dyn DocCommentParser,
        stack: &'a mut Vec<StackEntry>,
        values: &'a mut ValueStore,
        source: &'a mut dyn TokenSource,
        reporter: &'a mut dyn ProblemReporter,
    ) -> Self {
        stack.clear();
        values.clear();
        Self {
            tables,
            options,
            docs,
            stack,
            values,
            source,
            reporter,
            lookahead: Token::synthetic(TokenKind::Eof, TextRange::default()),
            reduction: Reduction::default(),
            nested_type: 0,
            nested_method: Vec::new(),
            diet: false,
            diet_level: 0,
            jump_pending: false,
            accepted: None,
            tree: None,
            quiet: false,
            syntax_reported: false,
            had_error: false,
            shifts: 0,
        }
    }

    /// Parses a compilation unit, recovering after a syntax error. The flag is whether
    /// recovery ran.
    pub(crate) fn parse_unit(&mut self) -> Result<(CompilationUnit, bool, bool), Abort> {
        let start = TextSize::zero();
        let end = self.source.source_len();
        match self.run(Goal::Unit, start)? {
            RunOutcome::Accepted => match self.accepted.take() {
                Some(Accepted::Unit(mut unit)) => {
                    unit.range = TextRange::new(start, end);
                    Ok((unit, self.had_error, false))
                }
                _ => Err(Abort::invariant("unit goal accepted without a unit")),
            },
            RunOutcome::Failed { token, state } => {
                self.report_syntax_error(&token, state)?;
                let tree = self.recover(TreeMode::Unit, token, start)?;
                Ok((tree.finalize_unit(end), true, true))
            }
        }
    }

    /// Parses the body at `range`, `{` to `}`, recovering statements after an error.
    pub(crate) fn parse_body(
        &mut self,
        goal: Goal,
        range: TextRange,
    ) -> Result<Vec<Statement>, Abort> {
        self.source.set_bounds(range);
        match self.run(goal, range.start())? {
            RunOutcome::Accepted => match self.accepted.take() {
                Some(Accepted::Body(body)) => Ok(body.statements.unwrap_or_default()),
                _ => Err(Abort::invariant("body goal accepted without a body")),
            },
            RunOutcome::Failed { token, state } => {
                self.report_syntax_error(&token, state)?;
                let tree = self.recover(TreeMode::Statements, token, range.start())?;
                Ok(tree.finalize_statements(range.end()))
            }
        }
    }

    pub(crate) fn parse_expression(
        &mut self,
        goal: Goal,
        range: TextRange,
    ) -> Result<Option<Expr>, Abort> {
        self.source.set_bounds(range);
        match self.run(goal, range.start())? {
            RunOutcome::Accepted => match self.accepted.take() {
                Some(Accepted::Expression(expr)) => Ok(Some(expr)),
                _ => Err(Abort::invariant("expression goal accepted without an expression")),
            },
            RunOutcome::Failed { token, state } => {
                self.report_syntax_error(&token, state)?;
                Ok(None)
            }
        }
    }

    /// Runs the automaton from `start` on `goal` until it accepts or finds no action.
    pub(crate) fn run(&mut self, goal: Goal, start: TextSize) -> Result<RunOutcome, Abort> {
        self.stack.clear();
        self.values.clear();
        self.accepted = None;
        self.jump_pending = false;
        self.reset_counters(goal);

        let marker = TextRange::empty(start);
        self.stack.push(StackEntry {
            state: 0,
            symbol: self.tables.grammar().start(),
            range: marker,
        });
        self.lookahead = Token::synthetic(goal.marker(), marker);
        trace!(?goal, offset = start.get(), "automaton started");

        loop {
            let state = self.top_state()?;
            match self.tables.action_or_default(state, self.lookahead.kind) {
                Action::Shift(next) => self.shift(next)?,
                Action::Reduce(rule) => self.reduce(rule)?,
                Action::Accept => return Ok(RunOutcome::Accepted),
                Action::Error => {
                    trace!(state, found = ?self.lookahead.kind, "no action");
                    return Ok(RunOutcome::Failed {
                        token: self.lookahead.clone(),
                        state,
                    });
                }
            }
        }
    }

    fn reset_counters(&mut self, goal: Goal) {
        self.diet_level = 0;
        self.nested_method.clear();
        match goal {
            Goal::Unit | Goal::Headers => self.nested_type = 0,
            Goal::MethodBody | Goal::ConstructorBody | Goal::Initializer => {
                self.nested_type = 1;
                self.nested_method.push(0);
            }
            Goal::Statements | Goal::Expression => {
                self.nested_type = 1;
                self.nested_method.push(1);
            }
        }
    }

    fn top_state(&self) -> Result<StateId, Abort> {
        self.stack
            .last()
            .map(|entry| entry.state)
            .ok_or_else(|| Abort::invariant("automaton stack is empty"))
    }

    fn shift(&mut self, next: StateId) -> Result<(), Abort> {
        let placeholder = Token::synthetic(TokenKind::Eof, TextRange::default());
        let token = std::mem::replace(&mut self.lookahead, placeholder);
        let symbol = self.tables.terminal_symbol(token.kind).ok_or_else(|| {
            Abort::invariant(format!("token {:?} has no grammar symbol", token.kind))
        })?;

        let skip_body = token.kind == TokenKind::LBrace
            && (self.jump_pending || self.skips_recovered_body());
        match self.tables.symbol_kind(symbol) {
            Some(ValueKind::Ident) => self.values.ident.push(Ident::new(token.text.clone(), token.range)),
            Some(ValueKind::Expr) => {
                let kind = LiteralKind::from_token(token.kind).ok_or_else(|| {
                    Abort::invariant(format!("token {:?} is not a literal", token.kind))
                })?;
                let literal = Literal {
                    kind,
                    text: token.text.clone(),
                    value: token.value.clone(),
                };
                self.values.expr.push(Expr::new(ExprKind::Literal(literal), token.range));
            }
            Some(kind) => {
                return Err(Abort::invariant(format!(
                    "terminal {} carries a {} value",
                    self.tables.symbol_name(symbol),
                    kind.name()
                )));
            }
            None => {}
        }
        self.stack.push(StackEntry {
            state: next,
            symbol,
            range: token.range,
        });

        if skip_body {
            self.jump_pending = false;
            self.source.jump_over_body();
        }

        self.shifts += 1;
        if self.shifts % CANCEL_POLL_INTERVAL == 0
            && self
                .options
                .cancellation
                .as_ref()
                .is_some_and(CancellationFlag::is_cancelled)
        {
            debug!(shifts = self.shifts, "parse cancelled");
            return Err(Abort::Cancelled);
        }

        self.lookahead = self.next_token()?;
        Ok(())
    }

    fn reduce(&mut self, rule: u32) -> Result<(), Abort> {
        let len = self.tables.rule_len(rule);
        let base = self
            .stack
            .len()
            .checked_sub(len)
            .filter(|&base| base >= 1)
            .ok_or_else(|| Abort::invariant("automaton stack underflow"))?;
        let range = self.cover(base);
        self.reduction = Reduction { rule, base, range };
        #[cfg(test)]
        REDUCED_RULES.with_borrow_mut(|reduced| reduced.insert(rule));

        self.apply(self.tables.rule_action(rule))?;

        self.stack.truncate(base);
        let lhs = self.tables.rule_lhs(rule);
        let state = self.top_state()?;
        let next = self.tables.goto(state, lhs).ok_or_else(|| {
            Abort::invariant(format!(
                "no goto from state {state} on {}",
                self.tables.symbol_name(lhs)
            ))
        })?;
        self.stack.push(StackEntry {
            state: next,
            symbol: lhs,
            range,
        });

        if self.options.check_stack_balance {
            self.check_balance()?;
        }
        Ok(())
    }

    /// Range of the left-hand side: the right-hand side entries with text, or an empty
    /// range at the lookahead when none has any.
    fn cover(&self, base: usize) -> TextRange {
        self.stack[base..]
            .iter()
            .map(|entry| entry.range)
            .filter(|range| !range.is_empty())
            .reduce(TextRange::cover)
            .unwrap_or_else(|| TextRange::empty(self.lookahead.range.start()))
    }

    /// Every kinded symbol on the automaton stack owns exactly one unit on its stack.
    fn check_balance(&self) -> Result<(), Abort> {
        for kind in ValueKind::ALL {
            let symbols = self
                .stack
                .iter()
                .filter(|entry| self.tables.symbol_kind(entry.symbol) == Some(kind))
                .count();
            let units = self.values.unit_count(kind);
            if symbols != units {
                let rule = self
                    .tables
                    .grammar()
                    .describe_rule(self.reduction.rule as usize, None);
                return Err(Abort::invariant(format!(
                    "{} stack holds {units} units for {symbols} symbols after `{rule}`",
                    kind.name()
                )));
            }
        }
        Ok(())
    }

    /// Range of right-hand side entry `index` of the current reduction.
    pub(crate) fn rhs(&self, index: usize) -> TextRange {
        self.stack
            .get(self.reduction.base + index)
            .map_or(self.reduction.range, |entry| entry.range)
    }

    pub(crate) fn rhs_symbol(&self, index: usize) -> Option<SymbolId> {
        self.stack
            .get(self.reduction.base + index)
            .map(|entry| entry.symbol)
    }

    /// Token kind of right-hand side entry `index`, which must be a terminal.
    pub(crate) fn rhs_token(&self, index: usize) -> Result<TokenKind, Abort> {
        self.rhs_symbol(index)
            .and_then(|symbol| self.tables.symbol_token(symbol))
            .ok_or_else(|| Abort::invariant(format!("right-hand side entry {index} is not a token")))
    }

    pub(crate) const fn lhs(&self) -> TextRange {
        self.reduction.range
    }

    pub(crate) fn next_token(&mut self) -> Result<Token, Abort> {
        let token = self.source.next_token();
        for error in self.source.take_lexical_errors() {
            self.report(error.into())?;
        }
        Ok(token)
    }

    pub(crate) fn report(&mut self, problem: Problem) -> Result<(), Abort> {
        if problem.severity == Severity::Error {
            self.had_error = true;
        }
        self.reporter
            .report(problem)
            .inspect_err(|abort| warn!(%abort, "reporter stopped the parse"))
    }

    /// Reports the first syntax error of the session. Later ones, and all of them in
    /// quiet mode, only mark the session as failed.
    pub(crate) fn report_syntax_error(
        &mut self,
        token: &Token,
        state: StateId,
    ) -> Result<(), Abort> {
        self.had_error = true;
        if self.quiet || self.syntax_reported {
            return Ok(());
        }
        self.syntax_reported = true;
        debug!(found = ?token.kind, offset = token.range.start().get(), state, "syntax error");

        let expected: Vec<TokenKind> = self
            .tables
            .expected_terminals(state)
            .iter()
            .copied()
            .filter(|&kind| !is_goal_marker(kind))
            .collect();
        let described: Vec<CompactString> = expected.iter().map(|kind| kind.describe()).collect();
        let names: Vec<&str> = described.iter().map(CompactString::as_str).collect();
        let list = format_expected_list(&names, EXPECTED_LIMIT);

        let problem = if token.kind == TokenKind::Eof {
            Problem::error(ProblemKind::UnexpectedEndOfInput, token.range).with_argument(list)
        } else {
            let suggestion = if token.kind == TokenKind::Identifier {
                let keywords: Vec<&str> = expected
                    .iter()
                    .filter_map(|kind| kind.fixed_text())
                    .filter(|text| text.chars().all(char::is_alphabetic))
                    .collect();
                did_you_mean(&token.text, &keywords)
                    .map(|keyword| format!("'{keyword}'"))
                    .unwrap_or_default()
            } else {
                String::new()
            };
            let found = if token.text.is_empty() {
                token.kind.describe()
            } else {
                CompactString::from(format!("'{}'", token.text))
            };
            Problem::error(ProblemKind::UnexpectedToken, token.range)
                .with_argument(found)
                .with_argument(list)
                .with_argument(suggestion)
        };
        self.report(problem)
    }
}

const fn is_goal_marker(kind: TokenKind) -> bool {
    matches!(
        kind,
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
    use crate::lexer::{ScanMode, Scanner};
    use crate::parser::{Parser, ParserOptions};
    use crate::report::CollectingReporter;

    fn first_problem(source: &str) -> Problem {
        let mut parser = Parser::new(ParserOptions::default()).expect("grammar loads");
        let mut reporter = CollectingReporter::new();
        parser
            .parse_compilation_unit(source, &mut reporter)
            .expect("no abort");
        reporter.problems()[0].clone()
    }

    #[test]
    fn test_only_first_syntax_error_is_reported() {
        let mut parser = Parser::new(ParserOptions::default()).expect("grammar loads");
        let mut reporter = CollectingReporter::new();
        let outcome = parser
            .parse_compilation_unit("class A { int = ; int = ; }", &mut reporter)
            .expect("no abort");
        assert!(outcome.had_error);
        let syntax: Vec<_> = reporter
            .problems()
            .iter()
            .filter(|problem| problem.kind.is_syntax_error())
            .collect();
        assert_eq!(syntax.len(), 1);
    }

    #[test]
    fn test_unexpected_token_lists_expected() {
        let problem = first_problem("class A { int x = ; }");
        assert_eq!(problem.kind, ProblemKind::UnexpectedToken);
        assert_eq!(problem.arguments[0], "';'");
        assert!(!problem.arguments[1].is_empty());
    }

    #[test]
    fn test_misspelled_keyword_suggestion() {
        let problem = first_problem("clas A {}");
        assert_eq!(problem.kind, ProblemKind::UnexpectedToken);
        assert_eq!(problem.arguments[2], "'class'");
    }

    #[test]
    fn test_end_of_input() {
        let problem = first_problem("class A {");
        assert_eq!(problem.kind, ProblemKind::UnexpectedEndOfInput);
        assert!(problem.range.is_empty());
    }

    #[test]
    fn test_run_accepts_expression_goal() {
        let tables = GrammarTables::global().expect("grammar loads");
        let options = ParserOptions::default().with_stack_balance_check(true);
        let mut stack = Vec::new();
        let mut values = ValueStore::new();
        let mut scanner = Scanner::new("f(1, x[2])", ScanMode::Standard);
        let mut reporter = CollectingReporter::new();
        let docs = crate::doc::TagScanner;
        let mut session = Session::new(
            tables,
            &options,
            &docs,
            &mut stack,
            &mut values,
            &mut scanner,
            &mut reporter,
        );
        let outcome = session.run(Goal::Expression, TextSize::zero()).expect("no abort");
        assert!(matches!(outcome, RunOutcome::Accepted));
        assert!(matches!(session.accepted, Some(Accepted::Expression(_))));
        assert!(session.values.is_empty());
    }

    /// Declarations, statements and expressions of every shape the grammar knows.
    const GRAMMAR_TOUR: &str = r#"@Deprecated package tour.all;

import a.b.C;
import a.b.*;
import static a.b.C.max;
import static a.b.C.*;
;
public abstract class Everything<T, U extends Number, V extends A & B, W extends A & B & C, X>
        extends Base<T> implements Runnable, Comparable<Everything<T, U, V, W, X>> {
    private static final int LIMIT = 10, GRID[] = {1, 2}, EMPTY[] = {}, COMMA[] = {,}, TRAIL[] = {1,};
    protected transient volatile byte b1;
    short s1; long l1 = 1L; char c1 = 'c'; float f1 = 1.5f; double d1 = 2.0;
    boolean z1 = true, z2 = false;
    Object nothing = null;
    String text = "s";
    int[] ints; int[][] grid; String[] names; List<String>[] lists;
    Outer<String>.Inner inner; Outer<String>.Inner[] inners;
    Map<String, List<Integer>> m1; Map<String, Integer> m2; Map<String, Integer, Long> m3;
    List<String> single;
    A<B<C<D>>> deep3; A<B<C<X, D>>> deep3list; A<B<C, D>> deep2list;
    A<?> w1; A<? extends B> w2; A<? super B> w3;
    A<?, B> w4; A<? extends B, C> w5; A<? super B, C> w6;
    A<B<?>> w7; A<B<? extends C>> w8; A<B<? super C>> w9;
    A<B<C<?>>> w10; A<B<C<? extends D>>> w11; A<B<C<? super D>>> w12;
    @Marker @Single("x") @Normal() @Pairs(a = 1, b = @Marker) @Arrays({}) @Arrays2({,})
    @Arrays3({1, 2}) @Arrays4({1,}) int annotated;

    static { created = 1; }
    { names = null; }
    ;

    public Everything(int limit) throws Exception, Error { this(limit, "x"); }
    Everything(int limit, String label) { super(); }
    Everything(String label) { outer.super(); }
    Everything(long value) { new Outer().super(); }
    Everything() { }
    <T> Everything(T t, String... rest) { }

    public native int nativeMethod();
    abstract strictfp void abstractMethod(final int x, @Marker int[] ys);
    synchronized int arrayReturning()[] { return null; }
    private void nothing() { return; }
    <T> void g1() { }
    <T extends Comparable<T>> T g2() { return null; }
    <T extends A & B> void g3() { }
    <T extends A & B & C> List<T> g4() { return null; }

    class Inner { }
    interface Nested extends A, B { double area(); }
    enum Color implements A { RED, GREEN(1), @Marker BLUE { void m() { } }; int value; }
    enum Empty1 { }
    enum Empty2 { , }
    enum Empty3 { ; int x; }
    enum Plain { A, B }
    enum Trailing { A, }

    void statements(int n, Object o, int[] xs, java.util.List<String> items) throws Exception {
        int i = 0, j;
        final int k = 1;
        class Local { }
        interface LocalI { }
        enum LocalE { A }
        label: while (i < n) { i++; continue label; }
        if (i > n) i--;
        if (i >= n) ++i; else --i;
        if (i <= n) lbl: foo(); else bar();
        if (i == n) if (j != n) foo(); else bar(); else baz();
        if (o != null) while (i < n) i++; else i = 0;
        if (o == null) for (;;) break; else foo();
        if (n > 0) for (String s : items) foo(); else bar();
        while (true) break label;
        do { i += 1; } while (i < 10);
        for (i = 0, j = 1; i < n; i++, j--) { continue; }
        for (int q = 0; q < n; q++) foo();
        for (final String s : items) { }
        ;
        { }
        switch (n) { }
        switch (n) { case 1: foo(); break; case 2: case 3: bar(); default: baz(); }
        switch (n) { case 1: }
        switch (n) { case 1: foo(); default: }
        synchronized (o) { foo(); }
        try { foo(); } catch (final IllegalStateException | IllegalArgumentException e) { } catch (Exception e) { }
        try { foo(); } finally { }
        try { foo(); } catch (Exception e) { } finally { }
        try (Resource r = open()) { }
        try (final Resource r = open(); Resource s = open();) { } catch (Exception e) { }
        try (Resource r = open()) { } finally { }
        try (Resource r = open()) { } catch (Exception e) { } finally { }
        assert i > 0;
        assert i > 0 : "message";
        new Object();
        foo();
        this.total = 1;
        xs[0] = 1;
        i = j = 2;
        i *= 2; i /= 2; i %= 2; i += 2; i -= 2; i <<= 2; i >>= 2; i >>>= 2; i &= 2; i ^= 2; i |= 2;
        i++; i--; ++i; --i;
        throw new Exception();
    }

    Object expressions(Object o, int[] xs, int a, int b) {
        long l = 0xFFL << 3 | 1 & 2 ^ 4;
        int r = a * b / 2 % 3 + a - b >> 1 >>> 2;
        boolean z = a < b && a > b || a <= b && a >= b && o instanceof String && a == b && a != b;
        int c = z ? a : b;
        int u = +a + -b + ~a;
        boolean y = !z;
        int pre = ++a + --b;
        int post = a++ + b--;
        int cast1 = (int) 1.5;
        int[] cast2 = (int[]) o;
        String cast3 = (String) o;
        String[] cast4 = (String[]) o;
        Object lit = String.class;
        lit = String[].class;
        lit = int.class;
        lit = int[][].class;
        lit = void.class;
        lit = Everything.this;
        lit = this;
        lit = (o);
        lit = new int[3];
        lit = new int[2][3][];
        lit = new String[a];
        lit = new int[] {1, 2};
        lit = new String[][] {{"a"}, {}};
        lit = new int[] {1, 2}[0];
        lit = xs[0];
        lit = get()[0];
        lit = get().field;
        lit = super.field;
        lit = Everything.super.field;
        lit = get().call(1, 2);
        lit = super.call();
        lit = Everything.super.call();
        lit = new ArrayList<>();
        lit = new Object() { };
        lit = this.new Inner();
        lit = this.new Inner() { };
        lit = outer.new Inner();
        lit = outer.new Inner() { };
        lit = 1L + 1.5f + 2.0 + 'c' + "s" + null + true + false;
        return lit;
    }
}

interface Top { }
enum TopEnum { A }
"#;

    /// Fails on the first token, so everything after it is read by the header restart.
    const BROKEN_HEADERS: &str = ") package p; import a.b; @Deprecated class C extends D { int f; \
        void m() { x(); } C() { } static { } { } ; } interface I { } enum E { }";

    /// Fails inside a body, so the body is read by the statement restart.
    const BROKEN_BODY: &str = "class S { void m() { int x = ; foo(); } }";

    const DIET_BODIES: &str = "class D { D() { this(1); } D(int x) { } void m() { } }";

    const MODULE_INFO: &str = "import a.b.C;\n\
        @Deprecated open module m.n { requires a; requires transitive static b; exports p; \
        exports p to x, y; opens q; opens q to x; uses S; provides S with T, U; }";

    const BROKEN_MODULE_INFO: &str = ") open module m.n { requires a; exports p; opens q; \
        uses S; provides S with T; }";

    #[test]
    fn test_every_rule_is_reduced() {
        REDUCED_RULES.with_borrow_mut(hashbrown::HashSet::clear);
        let options = ParserOptions::default().with_stack_balance_check(true);
        let mut reporter = CollectingReporter::new();

        let mut parser = Parser::new(options.clone()).expect("grammar loads");
        for source in [GRAMMAR_TOUR, BROKEN_HEADERS, BROKEN_BODY, "class A {", ""] {
            parser
                .parse_compilation_unit(source, &mut reporter)
                .expect("no abort");
        }
        let expression = parser
            .parse_expression("a + b", &mut reporter)
            .expect("no abort");
        assert!(expression.is_some());
        let initializer = "{1, 2}";
        let range = TextRange::new(TextSize::zero(), TextSize::of_len(initializer.len()));
        let initializer = parser
            .parse_field_initializer(initializer, range, &mut reporter)
            .expect("no abort");
        assert!(initializer.is_some());
        let text = "{ int x = ; foo(); }";
        let mut body = Body::unparsed(TextRange::new(TextSize::zero(), TextSize::of_len(text.len())));
        let had_error = parser
            .parse_method_body(text, &mut body, false, &mut reporter)
            .expect("no abort");
        assert!(had_error);

        let mut diet = Parser::new(options.clone().with_diet(true)).expect("grammar loads");
        let mut outcome = diet
            .parse_compilation_unit(DIET_BODIES, &mut reporter)
            .expect("no abort");
        diet.parse_method_bodies(&mut outcome.unit, DIET_BODIES, &mut reporter)
            .expect("no abort");

        let mut modules = Parser::new(options.with_module_info(true)).expect("grammar loads");
        for source in [MODULE_INFO, "module m { }", BROKEN_MODULE_INFO] {
            modules
                .parse_compilation_unit(source, &mut reporter)
                .expect("no abort");
        }

        let grammar = GrammarTables::global().expect("grammar loads").grammar();
        let reduced = REDUCED_RULES.with_borrow(Clone::clone);
        // Rule 0 is `$accept ::= Goal`, which accepts instead of reducing.
        let missing: Vec<String> = (1..grammar.rules().len())
            .filter(|&rule| !u32::try_from(rule).is_ok_and(|rule| reduced.contains(&rule)))
            .map(|rule| grammar.describe_rule(rule, None))
            .collect();
        assert!(missing.is_empty(), "never reduced:\n{}", missing.join("\n"));
    }
}
