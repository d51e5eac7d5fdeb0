//! # Error recovery
//!
//! When the automaton finds no action, [`Session::recover`] takes over:
//!
//! 1. The declarations and statements left on the value stacks are moved into a
//!    [`RecoveryTree`] rooted at the compilation unit or at the body being parsed.
//! 2. The automaton restarts at the failing token on a narrower goal: declaration
//!    headers for a unit, block statements for a body. Every header it reduces, and
//!    every `{`, `}` and `;` between them, is fed to the tree.
//! 3. A restart that fails again is snapshotted the same way. One that fails without
//!    consuming anything steps over the offending token. Reaching the end of input
//!    twice in a row ends recovery.
//!
//! The tree is finalized into the result once the restart accepts. Method and
//! initializer bodies the tree closes are left unparsed and filled in by a second
//! pass with statement-level recovery.

mod tree;

pub(crate) use tree::{Item, RecoveryTree, TreeMode};

use crate::ast::{Body, Initializer, Modifiers, Statement, StatementKind, TypeRef};
use crate::error::Abort;
use crate::grammar::ValueKind;
use crate::lexer::{Token, TokenKind};
use crate::parser::Goal;
use crate::parser::driver::{Accepted, RunOutcome, Session, StackEntry};
use crate::parser::node::{AstNode, GenericNode};
use crate::syntax::{TextRange, TextSize};
use tracing::{debug, trace};

/// End-of-input observations in a row that end recovery.
const EOF_LIMIT: u32 = 2;

/// Modifiers and a declared type seen on the stack before the declarator they
/// belong to.
#[derive(Debug, Default)]
struct Pending {
    modifiers: Modifiers,
    ty: Option<TypeRef>,
}

impl Session<'_> {
    /// Salvages what the failed parse built and, unless recovery is disabled,
    /// resumes parsing after `failed`.
    pub(crate) fn recover(
        &mut self,
        mode: TreeMode,
        failed: Token,
        start: TextSize,
    ) -> Result<RecoveryTree, Abort> {
        debug!(?mode, offset = failed.range.start().get(), "recovery started");
        self.tree = Some(RecoveryTree::new(mode, start));
        self.snapshot()?;

        let enabled = self.options.error_recovery
            && (mode == TreeMode::Unit || self.options.statement_recovery);
        if enabled {
            let quiet = std::mem::replace(&mut self.quiet, true);
            let restarted = self.restart_loop(mode, failed.range.start());
            self.quiet = quiet;
            restarted?;
        }
        self.tree
            .take()
            .ok_or_else(|| Abort::invariant("recovery tree missing after restart"))
    }

    fn restart_loop(&mut self, mode: TreeMode, mut checkpoint: TextSize) -> Result<(), Abort> {
        let goal = match mode {
            TreeMode::Unit => Goal::Headers,
            TreeMode::Statements => Goal::Statements,
        };
        let mut eof_seen = 0;
        loop {
            self.source.reset_to(checkpoint);
            match self.run(goal, checkpoint)? {
                RunOutcome::Accepted => {
                    if let Some(Accepted::Statements(statements)) = self.accepted.take() {
                        self.absorb(statements)?;
                    }
                    debug!(offset = checkpoint.get(), "recovery resynchronized");
                    return Ok(());
                }
                RunOutcome::Failed { token, state } => {
                    self.report_syntax_error(&token, state)?;
                    let progressed = self.consumed_input();
                    self.snapshot()?;
                    if progressed {
                        trace!(offset = token.range.start().get(), "restart failed, resuming");
                        checkpoint = token.range.start();
                        eof_seen = 0;
                        continue;
                    }
                    if token.kind == TokenKind::Eof {
                        eof_seen += 1;
                        if eof_seen >= EOF_LIMIT {
                            debug!("recovery reached the end of input");
                            return Ok(());
                        }
                    }
                    self.step_over(&token)?;
                    checkpoint = token.range.end();
                }
            }
        }
    }

    /// Whether the last run shifted any token past its goal marker.
    fn consumed_input(&self) -> bool {
        self.stack.iter().skip(2).any(|entry| !entry.range.is_empty())
    }

    /// Feeds a token no restart could start with to the tree.
    fn step_over(&mut self, token: &Token) -> Result<(), Abort> {
        trace!(found = ?token.kind, offset = token.range.start().get(), "recovery skipped a token");
        let tree = self.tree_mut()?;
        let at = token.range.start();
        match token.kind {
            TokenKind::LBrace => tree.on_opening_brace(at),
            TokenKind::RBrace => tree.on_closing_brace(at),
            TokenKind::Semicolon => tree.on_semicolon(at),
            _ => tree.touch(token.range.end()),
        }
        Ok(())
    }

    fn absorb(&mut self, statements: Vec<Statement>) -> Result<(), Abort> {
        let tree = self.tree_mut()?;
        for statement in statements {
            tree.add(Item::Statement(statement), false);
        }
        Ok(())
    }

    fn tree_mut(&mut self) -> Result<&mut RecoveryTree, Abort> {
        self.tree
            .as_mut()
            .ok_or_else(|| Abort::invariant("recovery action outside recovery"))
    }

    /// Moves everything on the automaton and value stacks into the tree, bottom-up,
    /// then empties the value stacks.
    fn snapshot(&mut self) -> Result<(), Abort> {
        let mut tree = self
            .tree
            .take()
            .ok_or_else(|| Abort::invariant("snapshot without a recovery tree"))?;
        let mut ast = self.values.ast.drain_units().into_iter();
        let mut generic = self.values.generic.drain_units().into_iter();
        let mut int = self.values.int.drain_units().into_iter();
        self.values.clear();

        let entries: Vec<StackEntry> = self.stack.clone();
        let mut pending = Pending::default();
        // Per shifted `{`, whether the tree saw it.
        let mut braces: Vec<bool> = Vec::new();
        let mut previous = None;
        for entry in entries {
            match self.tables.symbol_kind(entry.symbol) {
                Some(ValueKind::Ast) => {
                    let nodes = ast.next().unwrap_or_default();
                    self.snapshot_nodes(&mut tree, entry, previous, nodes, &mut pending);
                }
                Some(ValueKind::Generic) => {
                    let nodes = generic.next().unwrap_or_default();
                    self.snapshot_types(&mut tree, entry, nodes, &mut pending);
                }
                Some(ValueKind::Int) => {
                    int.next();
                    if entry.symbol == self.tables.known().nested_method && tree.type_in_body() {
                        let modifiers = std::mem::take(&mut pending.modifiers);
                        tree.add(initializer(modifiers, entry.range.start()), true);
                    }
                }
                _ => {}
            }

            match self.tables.symbol_token(entry.symbol) {
                Some(TokenKind::LBrace) => {
                    let known = self.tables.known();
                    let anonymous = previous == Some(known.enter_anonymous);
                    let tracked =
                        anonymous || previous.is_some_and(|symbol| known.opens_tracked_body(symbol));
                    if anonymous {
                        tree.on_anonymous_brace(entry.range.start());
                    } else if tracked {
                        tree.on_opening_brace(entry.range.start());
                    }
                    braces.push(tracked);
                }
                Some(TokenKind::RBrace) => {
                    if braces.pop().unwrap_or(false) {
                        tree.on_closing_brace(entry.range.start());
                    }
                }
                Some(TokenKind::Semicolon) => tree.on_semicolon(entry.range.start()),
                _ => {}
            }
            if !entry.range.is_empty() {
                tree.touch(entry.range.end());
            }
            previous = Some(entry.symbol);
        }
        trace!(entries = self.stack.len(), "recovery snapshot taken");
        self.tree = Some(tree);
        Ok(())
    }

    fn snapshot_nodes(
        &self,
        tree: &mut RecoveryTree,
        entry: StackEntry,
        previous: Option<crate::grammar::SymbolId>,
        nodes: Vec<AstNode>,
        pending: &mut Pending,
    ) {
        let known = self.tables.known();
        if entry.symbol == known.modifiers || entry.symbol == known.modifiers_opt {
            pending.modifiers = modifiers_of(nodes);
            pending.ty = None;
            return;
        }
        // A finished class or module body whose declaration was never reduced.
        let body = previous.is_some_and(|symbol| {
            [
                known.class_header,
                known.interface_header,
                known.enum_header,
                known.module_header,
            ]
            .contains(&symbol)
        });
        if body {
            tree.on_opening_brace(entry.range.start());
        }
        let open = known.is_incomplete_header(entry.symbol);
        for node in nodes {
            match node {
                AstNode::Modifier(modifier) => pending.modifiers.keywords.push(modifier),
                AstNode::Annotation(annotation) => pending.modifiers.annotations.push(annotation),
                AstNode::Declarator(declarator) => {
                    if let Some(ty) = &pending.ty {
                        tree.add_declarator(&pending.modifiers, ty, declarator);
                    }
                }
                AstNode::Parameter(parameter) => {
                    if let Some(method) = tree.method_awaiting_body() {
                        method.parameters.push(parameter);
                    }
                }
                AstNode::Body(body) => {
                    tree.attach_body(body);
                }
                AstNode::Statement(statement)
                    if tree.initializer_awaiting_body()
                        && matches!(statement.kind, StatementKind::Block(_)) =>
                {
                    let range = statement.range;
                    if let StatementKind::Block(block) = statement.into_kind() {
                        tree.attach_body(Body {
                            range,
                            statements: Some(block.statements),
                        });
                    }
                }
                AstNode::Unit(unit) => {
                    let unit = *unit;
                    let items = unit
                        .package
                        .map(Item::Package)
                        .into_iter()
                        .chain(unit.imports.into_iter().map(Item::Import))
                        .chain(unit.types.into_iter().map(|ty| Item::Type(Box::new(ty))))
                        .chain(unit.module.map(|module| Item::Module(Box::new(module))));
                    for item in items {
                        tree.add(item, false);
                    }
                }
                other => {
                    if let Some(item) = Item::from_node(other) {
                        *pending = Pending::default();
                        tree.add(item, open);
                    }
                }
            }
        }
        if body {
            tree.on_closing_brace(entry.range.end().saturating_sub(1));
        }
    }

    fn snapshot_types(
        &self,
        tree: &mut RecoveryTree,
        entry: StackEntry,
        nodes: Vec<GenericNode>,
        pending: &mut Pending,
    ) {
        let known = self.tables.known();
        let mut types = nodes.into_iter().filter_map(|node| node.into_type().ok());
        if entry.symbol == known.ty {
            pending.ty = types.next();
        } else if entry.symbol == known.class_extends {
            if let Some(ty) = tree.type_awaiting_body() {
                ty.superclass = types.next();
            }
        } else if (entry.symbol == known.class_implements
            || entry.symbol == known.interface_extends)
            && let Some(ty) = tree.type_awaiting_body()
        {
            ty.interfaces = types.collect();
        }
    }

    /// Whether the `{` about to be shifted opens a body the header restart skips.
    pub(crate) fn skips_recovered_body(&self) -> bool {
        let Some(tree) = &self.tree else {
            return false;
        };
        let Some(top) = self.stack.last() else {
            return false;
        };
        let known = self.tables.known();
        let at_header = top.symbol == known.headers
            || top.symbol == known.modifiers
            || self.tables.symbol_token(top.symbol) == Some(TokenKind::HeadersGoal);
        at_header && tree.skips_body()
    }

    // Actions of the header goal.

    pub(crate) fn recovered_header(&mut self) -> Result<(), Abort> {
        let open = self
            .rhs_symbol(0)
            .is_some_and(|symbol| self.tables.known().is_incomplete_header(symbol));
        let nodes = self.values.ast.pop_unit()?;
        let end = self.lhs().end();
        let tree = self.tree_mut()?;
        for node in nodes {
            if let Some(item) = Item::from_node(node) {
                trace!(item = ?item.range(), open, "recovered header");
                tree.add(item, open);
            }
        }
        tree.touch(end);
        Ok(())
    }

    /// `Modifiers '{'`
    pub(crate) fn recovered_initializer(&mut self) -> Result<(), Abort> {
        let modifiers = modifiers_of(self.values.ast.pop_unit()?);
        let brace = self.rhs(1).start();
        let tree = self.tree_mut()?;
        tree.add(initializer(modifiers, brace), true);
        tree.on_opening_brace(brace);
        Ok(())
    }

    pub(crate) fn recovered_open_brace(&mut self) -> Result<(), Abort> {
        let at = self.rhs(0).start();
        self.tree_mut()?.on_opening_brace(at);
        Ok(())
    }

    pub(crate) fn recovered_close_brace(&mut self) -> Result<(), Abort> {
        let at = self.rhs(0).start();
        self.tree_mut()?.on_closing_brace(at);
        Ok(())
    }

    pub(crate) fn recovered_semicolon(&mut self) -> Result<(), Abort> {
        let at = self.rhs(0).start();
        self.tree_mut()?.on_semicolon(at);
        Ok(())
    }
}

fn modifiers_of(nodes: Vec<AstNode>) -> Modifiers {
    let mut modifiers = Modifiers::default();
    for node in nodes {
        match node {
            AstNode::Modifier(modifier) if !modifiers.contains(modifier.kind) => {
                modifiers.keywords.push(modifier);
            }
            AstNode::Annotation(annotation) => modifiers.annotations.push(annotation),
            _ => {}
        }
    }
    modifiers
}

/// An initializer whose block starts at `brace`.
fn initializer(modifiers: Modifiers, brace: TextSize) -> Item {
    let start = modifiers.range().map_or(brace, TextRange::start);
    Item::Initializer(Initializer {
        modifiers,
        body: Body::unparsed(TextRange::empty(brace)),
        range: TextRange::empty(start),
    })
}
