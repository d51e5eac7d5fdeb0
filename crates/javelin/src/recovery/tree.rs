//! Declarations salvaged after a syntax error, nested the way their braces nest.
//!
//! The tree is an arena: elements refer to their parent and children by index and
//! element 0 is the root, either the compilation unit or the body being re-parsed.
//! The *current* element receives every item and brace event. An item that cannot
//! live in the current element closes it and is offered to the parent, so a
//! declaration whose `}` never came ends where the next misplaced item begins.

use crate::ast::{
    Block, Body, CompilationUnit, EnumConstant, FieldDeclaration, ImportDeclaration, Initializer,
    LocalVariable, Member, MethodDeclaration, Modifiers, ModuleDeclaration, ModuleDirective,
    Nesting, PackageDeclaration, Statement, StatementKind, TypeDeclaration, TypeRef,
};
use crate::parser::node::{AstNode, Declarator};
use crate::syntax::{TextRange, TextSize};
use tracing::trace;

/// What the root of a tree stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TreeMode {
    /// The compilation unit. Restarts parse declaration headers.
    Unit,
    /// A method, constructor or initializer body. Restarts parse block statements.
    Statements,
}

/// A declaration or statement held by the tree.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Item {
    Package(PackageDeclaration),
    Import(ImportDeclaration),
    Type(Box<TypeDeclaration>),
    Method(Box<MethodDeclaration>),
    Field(FieldDeclaration),
    Initializer(Initializer),
    EnumConstant(EnumConstant),
    Module(Box<ModuleDeclaration>),
    Directive(ModuleDirective),
    Statement(Statement),
}

impl Item {
    /// The item a finished value stack node stands for, if recovery keeps it.
    pub(crate) fn from_node(node: AstNode) -> Option<Self> {
        Some(match node {
            AstNode::Package(package) => Self::Package(package),
            AstNode::Import(import) => Self::Import(import),
            AstNode::Type(ty) => Self::Type(ty),
            AstNode::Method(method) => Self::Method(method),
            AstNode::Field(field) => Self::Field(field),
            AstNode::Initializer(init) => Self::Initializer(init),
            AstNode::EnumConstant(constant) => Self::EnumConstant(constant),
            AstNode::Module(module) => Self::Module(module),
            AstNode::Directive(directive) => Self::Directive(directive),
            AstNode::Statement(statement) => Self::Statement(statement),
            _ => return None,
        })
    }

    pub(crate) fn range(&self) -> TextRange {
        match self {
            Self::Package(package) => package.range,
            Self::Import(import) => import.range,
            Self::Type(ty) => ty.range,
            Self::Method(method) => method.range,
            Self::Field(field) => field.range,
            Self::Initializer(init) => init.range,
            Self::EnumConstant(constant) => constant.range,
            Self::Module(module) => module.range,
            Self::Directive(directive) => directive.range,
            Self::Statement(statement) => statement.range,
        }
    }

    const fn name(&self) -> &'static str {
        match self {
            Self::Package(_) => "package",
            Self::Import(_) => "import",
            Self::Type(_) => "type",
            Self::Method(_) => "method",
            Self::Field(_) => "field",
            Self::Initializer(_) => "initializer",
            Self::EnumConstant(_) => "enum constant",
            Self::Module(_) => "module",
            Self::Directive(_) => "directive",
            Self::Statement(_) => "statement",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Root,
    Declaration,
    /// Nested braces inside a statement body.
    Block,
    /// An anonymous class body. Tracked for its braces, dropped when finalized.
    Anonymous,
}

type Handle = usize;

#[derive(Debug)]
struct Element {
    role: Role,
    item: Option<Item>,
    parent: Option<Handle>,
    children: Vec<Handle>,
    /// Open braces inside the body.
    balance: u32,
    /// Offset of the body's `{` once it opened.
    body_start: Option<TextSize>,
    end: Option<TextSize>,
    /// End of the last token seen inside.
    last_seen: TextSize,
    recovered: bool,
}

impl Element {
    fn new(role: Role, item: Option<Item>, parent: Option<Handle>, at: TextSize) -> Self {
        Self {
            role,
            item,
            parent,
            children: Vec::new(),
            balance: 0,
            body_start: None,
            end: None,
            last_seen: at,
            recovered: false,
        }
    }

    const fn opened(&self) -> bool {
        self.body_start.is_some()
    }

    fn has_type_body(&self) -> bool {
        match &self.item {
            Some(Item::Type(ty)) => self.opened() || ty.body_range.is_some(),
            _ => false,
        }
    }
}

enum Disposition {
    Attach,
    /// Close the current element and offer the item to its parent.
    Close,
    Reopen(Handle),
    Drop,
}

#[derive(Debug)]
pub(crate) struct RecoveryTree {
    mode: TreeMode,
    elements: Vec<Element>,
    current: Handle,
}

impl RecoveryTree {
    pub(crate) fn new(mode: TreeMode, start: TextSize) -> Self {
        Self {
            mode,
            elements: vec![Element::new(Role::Root, None, None, start)],
            current: 0,
        }
    }

    /// Adds `item` below the current element or one of its ancestors. An `open` item
    /// still waits for its body or terminator and becomes the current element.
    pub(crate) fn add(&mut self, item: Item, open: bool) {
        loop {
            match self.dispose(&item) {
                Disposition::Attach => break,
                Disposition::Close => {
                    let end = self.elements[self.current].last_seen;
                    self.close(end, true);
                }
                Disposition::Reopen(handle) => self.reopen(handle),
                Disposition::Drop => {
                    trace!(item = item.name(), "recovery dropped an item");
                    return;
                }
            }
        }
        let range = item.range();
        let handle = self.attach(item);
        if open {
            self.current = handle;
        }
        self.touch(range.end());
    }

    fn dispose(&self, item: &Item) -> Disposition {
        let element = &self.elements[self.current];
        match (element.role, &element.item) {
            (Role::Root, _) => self.dispose_at_root(item),
            (Role::Block, _) => match item {
                Item::Statement(_) | Item::Type(_) => Disposition::Attach,
                _ => Disposition::Drop,
            },
            (Role::Anonymous, _) => member(item),
            (Role::Declaration, Some(Item::Type(_))) if element.opened() => member(item),
            (Role::Declaration, Some(Item::Method(_) | Item::Initializer(_)))
                if element.opened() =>
            {
                match item {
                    Item::Method(method) if !method.is_constructor() && element.balance == 1 => {
                        Disposition::Close
                    }
                    Item::Package(_) | Item::Import(_) | Item::Module(_) => Disposition::Close,
                    _ => Disposition::Drop,
                }
            }
            (Role::Declaration, Some(Item::Module(_))) if element.opened() => match item {
                Item::Directive(_) => Disposition::Attach,
                _ => Disposition::Close,
            },
            // A member after a header whose `{` is missing opens the body there.
            (Role::Declaration, Some(Item::Type(_))) => match item {
                Item::Method(_) | Item::Field(_) | Item::Initializer(_) | Item::EnumConstant(_) => {
                    Disposition::Reopen(self.current)
                }
                _ => Disposition::Close,
            },
            (Role::Declaration, _) => Disposition::Close,
        }
    }

    fn dispose_at_root(&self, item: &Item) -> Disposition {
        match (self.mode, item) {
            (
                TreeMode::Unit,
                Item::Package(_) | Item::Import(_) | Item::Type(_) | Item::Module(_),
            ) => Disposition::Attach,
            (
                TreeMode::Unit,
                Item::Method(_) | Item::Field(_) | Item::Initializer(_) | Item::EnumConstant(_),
            ) => self
                .last_child(Element::has_type_body)
                .map_or(Disposition::Drop, Disposition::Reopen),
            (TreeMode::Unit, Item::Directive(_)) => self
                .last_child(|element| matches!(element.item, Some(Item::Module(_))))
                .map_or(Disposition::Drop, Disposition::Reopen),
            (TreeMode::Statements, Item::Statement(_) | Item::Type(_)) => Disposition::Attach,
            _ => Disposition::Drop,
        }
    }

    fn last_child(&self, accept: impl Fn(&Element) -> bool) -> Option<Handle> {
        self.elements[self.current]
            .children
            .iter()
            .rev()
            .copied()
            .find(|&child| accept(&self.elements[child]))
    }

    /// Makes a closed or header-only declaration current again, its body open at depth one.
    fn reopen(&mut self, handle: Handle) {
        trace!(handle, "recovery reopened a declaration");
        let element = &mut self.elements[handle];
        if element.body_start.is_none() {
            element.body_start = match &element.item {
                Some(Item::Type(ty)) => ty.body_range.map(TextRange::start),
                _ => None,
            }
            .or(Some(element.last_seen));
        }
        element.balance = 1;
        element.end = None;
        element.recovered = true;
        self.current = handle;
    }

    fn attach(&mut self, mut item: Item) -> Handle {
        let parent = self.current;
        if let Item::Type(ty) = &mut item {
            ty.nesting = self.child_nesting(parent);
        }
        let start = item.range().start();
        self.push_element(Role::Declaration, Some(item), start)
    }

    fn child_nesting(&self, parent: Handle) -> Nesting {
        let element = &self.elements[parent];
        match (element.role, &element.item) {
            (Role::Root, _) if self.mode == TreeMode::Unit => Nesting::TopLevel,
            (Role::Declaration, Some(Item::Type(_))) | (Role::Anonymous, _) => Nesting::Member,
            _ => Nesting::Local,
        }
    }

    fn push_element(&mut self, role: Role, item: Option<Item>, at: TextSize) -> Handle {
        let handle = self.elements.len();
        let parent = self.current;
        self.elements.push(Element::new(role, item, Some(parent), at));
        self.elements[parent].children.push(handle);
        handle
    }

    /// Closes the current element at `end` and makes its parent current.
    fn close(&mut self, end: TextSize, implicit: bool) {
        let element = &mut self.elements[self.current];
        element.end = Some(end);
        element.balance = 0;
        element.recovered |= implicit;
        if let Some(parent) = element.parent {
            trace!(handle = self.current, end = end.get(), implicit, "recovery closed an element");
            self.current = parent;
            self.touch(end);
        }
    }

    pub(crate) fn on_opening_brace(&mut self, at: TextSize) {
        self.touch(at + 1);
        let mode = self.mode;
        let element = &mut self.elements[self.current];
        match (element.role, &element.item) {
            (Role::Root, _) if mode == TreeMode::Unit => {}
            (Role::Root, _) if element.balance == 0 && element.end.is_none() => {
                element.body_start = Some(at);
                element.balance = 1;
            }
            (Role::Root | Role::Block, _) => self.open_child(Role::Block, block_item(at), at),
            (Role::Declaration, Some(Item::Type(_))) | (Role::Anonymous, _)
                if element.opened() =>
            {
                self.open_child(Role::Declaration, Some(implicit_initializer(at)), at);
            }
            (Role::Declaration, _) if !element.opened() => {
                element.body_start = Some(at);
                element.balance = 1;
            }
            _ => element.balance += 1,
        }
    }

    /// `{` of an anonymous class body or an enum constant body.
    pub(crate) fn on_anonymous_brace(&mut self, at: TextSize) {
        self.touch(at + 1);
        self.open_child(Role::Anonymous, None, at);
    }

    fn open_child(&mut self, role: Role, item: Option<Item>, at: TextSize) {
        let handle = self.push_element(role, item, at);
        let element = &mut self.elements[handle];
        element.body_start = Some(at);
        element.balance = 1;
        element.last_seen = at + 1;
        element.recovered = true;
        self.current = handle;
    }

    pub(crate) fn on_closing_brace(&mut self, at: TextSize) {
        loop {
            let element = &mut self.elements[self.current];
            if element.balance == 0 {
                if element.role == Role::Root {
                    element.last_seen = element.last_seen.max(at + 1);
                    return;
                }
                // Still waiting for its body: the brace belongs to an enclosing element.
                let end = element.last_seen;
                self.close(end, true);
                continue;
            }
            element.balance -= 1;
            if element.balance == 0 {
                if element.role == Role::Root {
                    element.end = Some(at + 1);
                    element.last_seen = at + 1;
                } else {
                    self.close(at + 1, false);
                }
            } else {
                element.last_seen = element.last_seen.max(at + 1);
            }
            return;
        }
    }

    pub(crate) fn on_semicolon(&mut self, at: TextSize) {
        let element = &self.elements[self.current];
        let terminates = element.role == Role::Declaration
            && !element.opened()
            && matches!(
                element.item,
                Some(Item::Method(_) | Item::Initializer(_) | Item::Type(_))
            );
        if terminates {
            let implicit = !matches!(element.item, Some(Item::Method(_)));
            self.close(at + 1, implicit);
        } else {
            self.touch(at + 1);
        }
    }

    /// Records that the text up to `offset` has been seen inside the current element.
    pub(crate) fn touch(&mut self, offset: TextSize) {
        let element = &mut self.elements[self.current];
        element.last_seen = element.last_seen.max(offset);
    }

    /// A declarator whose declaration never finished, as a parameter, field or local
    /// variable depending on where it stands.
    pub(crate) fn add_declarator(
        &mut self,
        modifiers: &Modifiers,
        ty: &TypeRef,
        declarator: Declarator,
    ) {
        let mut declared = ty.clone();
        declared.dims += declarator.dims;
        if let Some(method) = self.method_awaiting_body() {
            let range = ty.range.cover(declarator.range);
            method.parameters.push(crate::ast::Parameter {
                modifiers: modifiers.clone(),
                ty: declared,
                name: declarator.name,
                variable_arity: false,
                range,
            });
            return;
        }
        let start = modifiers.range().map_or(ty.range.start(), TextRange::start);
        let range = TextRange::empty(start).with_end(declarator.range.end());
        let item = if self.type_in_body() || self.type_awaiting_body().is_some() {
            Item::Field(FieldDeclaration {
                modifiers: modifiers.clone(),
                ty: declared,
                name: declarator.name,
                initializer: declarator.initializer,
                doc: None,
                range,
                declarator_range: declarator.range,
            })
        } else {
            let variable = LocalVariable {
                modifiers: modifiers.clone(),
                ty: declared,
                name: declarator.name,
                initializer: declarator.initializer,
                range: declarator.range,
            };
            Item::Statement(Statement::new(StatementKind::LocalVariable(variable), range))
        };
        self.add(item, false);
    }

    fn current_awaiting(&mut self) -> Option<&mut Item> {
        let element = &mut self.elements[self.current];
        if element.role == Role::Declaration && !element.opened() {
            element.item.as_mut()
        } else {
            None
        }
    }

    pub(crate) fn method_awaiting_body(&mut self) -> Option<&mut MethodDeclaration> {
        match self.current_awaiting()? {
            Item::Method(method) => Some(method),
            _ => None,
        }
    }

    pub(crate) fn type_awaiting_body(&mut self) -> Option<&mut TypeDeclaration> {
        match self.current_awaiting()? {
            Item::Type(ty) => Some(ty),
            _ => None,
        }
    }

    /// Whether the current element is an open class body.
    pub(crate) fn type_in_body(&self) -> bool {
        let element = &self.elements[self.current];
        match (element.role, &element.item) {
            (Role::Anonymous, _) | (Role::Declaration, Some(Item::Type(_))) => element.opened(),
            _ => false,
        }
    }

    pub(crate) fn initializer_awaiting_body(&self) -> bool {
        let element = &self.elements[self.current];
        element.role == Role::Declaration
            && !element.opened()
            && matches!(element.item, Some(Item::Initializer(_)))
    }

    /// Gives a finished body to the method or initializer waiting for it and closes
    /// that declaration. Returns `false` when nothing was waiting.
    pub(crate) fn attach_body(&mut self, body: Body) -> bool {
        let end = body.range.end();
        let start = body.range.start();
        let attached = match self.current_awaiting() {
            Some(Item::Method(method)) => {
                method.body = Some(body);
                true
            }
            Some(Item::Initializer(init)) => {
                init.body = body;
                true
            }
            _ => false,
        };
        if attached {
            self.elements[self.current].body_start = Some(start);
            self.close(end, false);
        }
        attached
    }

    /// Whether a `{` shifted now starts a body the header restart should skip: a
    /// method or initializer body, or a stray block inside a class body.
    pub(crate) fn skips_body(&self) -> bool {
        if self.mode != TreeMode::Unit {
            return false;
        }
        let element = &self.elements[self.current];
        self.type_in_body()
            || (element.role == Role::Declaration
                && !element.opened()
                && matches!(element.item, Some(Item::Method(_) | Item::Initializer(_))))
    }

    /// Closes everything still open at `eof`.
    fn close_all(&mut self, eof: TextSize) {
        while self.current != 0 {
            self.close(eof, true);
        }
        let root = &mut self.elements[0];
        if root.end.is_none() {
            root.end = Some(eof);
        }
    }

    /// The compilation unit made of everything the tree holds.
    pub(crate) fn finalize_unit(mut self, eof: TextSize) -> CompilationUnit {
        self.close_all(eof);
        let mut unit = CompilationUnit::empty(TextRange::new(TextSize::zero(), eof));
        for child in std::mem::take(&mut self.elements[0].children) {
            match self.build(child) {
                Some(Item::Package(package)) if unit.package.is_none() => {
                    unit.package = Some(package);
                }
                Some(Item::Import(import)) => unit.imports.push(import),
                Some(Item::Type(ty)) => unit.types.push(*ty),
                Some(Item::Module(module)) if unit.module.is_none() => {
                    unit.module = Some(*module);
                }
                _ => {}
            }
        }
        unit
    }

    /// The statements of the recovered body, nested blocks included.
    pub(crate) fn finalize_statements(mut self, eof: TextSize) -> Vec<Statement> {
        self.close_all(eof);
        std::mem::take(&mut self.elements[0].children)
            .into_iter()
            .filter_map(|child| statement_of(self.build(child)?))
            .collect()
    }

    /// Takes the item of `root` with its descendants folded in.
    ///
    /// Elements are folded in post-order: reversing a pre-order walk that pushes children
    /// in order visits every child before its parent and siblings left to right, so the
    /// results of an element's children are the last entries of `built` when it is folded.
    fn build(&mut self, root: Handle) -> Option<Item> {
        let mut order = Vec::new();
        let mut work = vec![root];
        while let Some(handle) = work.pop() {
            order.push(handle);
            work.extend_from_slice(&self.elements[handle].children);
        }
        let mut built: Vec<Option<Item>> = Vec::with_capacity(order.len());
        for handle in order.into_iter().rev() {
            let count = std::mem::take(&mut self.elements[handle].children).len();
            let children = built.split_off(built.len().saturating_sub(count));
            let item = self.fold(handle, children);
            built.push(item);
        }
        built.pop().flatten()
    }

    /// Takes the item of `handle` and gives it the already built `children`.
    fn fold(&mut self, handle: Handle, children: Vec<Option<Item>>) -> Option<Item> {
        let element = &mut self.elements[handle];
        let end = element.end;
        let body_start = element.body_start;
        let recovered = element.recovered;
        let extend = |range: TextRange| end.map_or(range, |end| range.with_end(end));

        match element.item.take()? {
            Item::Type(mut ty) => {
                for child in children.into_iter().flatten() {
                    match child {
                        Item::Method(method) => ty.members.push(Member::Method(*method)),
                        Item::Field(field) => ty.members.push(Member::Field(field)),
                        Item::Initializer(init) => ty.members.push(Member::Initializer(init)),
                        Item::Type(nested) => ty.members.push(Member::Type(nested)),
                        Item::EnumConstant(constant) => ty.enum_constants.push(constant),
                        _ => {}
                    }
                }
                ty.range = extend(ty.range);
                if let Some(start) = body_start {
                    ty.body_range = Some(extend(TextRange::empty(start)));
                }
                ty.recovered |= recovered;
                Some(Item::Type(ty))
            }
            Item::Method(mut method) => {
                if method.body.is_none()
                    && let Some(start) = body_start
                {
                    method.body = Some(Body::unparsed(extend(TextRange::empty(start))));
                }
                method.range = extend(method.range);
                method.recovered |= recovered;
                Some(Item::Method(method))
            }
            Item::Initializer(mut init) => {
                let start = body_start?;
                if !init.body.is_parsed() {
                    init.body = Body::unparsed(extend(TextRange::empty(start)));
                }
                let first = init.modifiers.range().map_or(start, TextRange::start);
                init.range = extend(TextRange::empty(first));
                Some(Item::Initializer(init))
            }
            Item::Module(mut module) => {
                module
                    .directives
                    .extend(children.into_iter().flatten().filter_map(|child| match child {
                        Item::Directive(directive) => Some(directive),
                        _ => None,
                    }));
                module.range = extend(module.range);
                module.recovered |= recovered;
                Some(Item::Module(module))
            }
            Item::Statement(mut statement) => {
                if let StatementKind::Block(block) = &mut statement.kind
                    && element.role == Role::Block
                {
                    block
                        .statements
                        .extend(children.into_iter().flatten().filter_map(statement_of));
                    block.range = extend(block.range);
                    statement.range = block.range;
                }
                Some(Item::Statement(statement))
            }
            other => Some(other),
        }
    }
}

/// Where an item may live inside an open class body.
fn member(item: &Item) -> Disposition {
    match item {
        Item::Method(_)
        | Item::Field(_)
        | Item::Initializer(_)
        | Item::Type(_)
        | Item::EnumConstant(_) => Disposition::Attach,
        Item::Package(_) | Item::Import(_) | Item::Module(_) => Disposition::Close,
        Item::Directive(_) | Item::Statement(_) => Disposition::Drop,
    }
}

fn block_item(at: TextSize) -> Option<Item> {
    let range = TextRange::empty(at);
    Some(Item::Statement(Statement::new(
        StatementKind::Block(Block {
            statements: Vec::new(),
            range,
        }),
        range,
    )))
}

fn implicit_initializer(at: TextSize) -> Item {
    let range = TextRange::empty(at);
    Item::Initializer(Initializer {
        modifiers: Modifiers::default(),
        body: Body::unparsed(range),
        range,
    })
}

/// A statement, or a local type declaration wrapped in one.
fn statement_of(item: Item) -> Option<Statement> {
    match item {
        Item::Statement(statement) => Some(statement),
        Item::Type(ty) => {
            let range = ty.range;
            Some(Statement::new(StatementKind::LocalType(ty), range))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Ident, TypeKind};

    fn at(offset: u32) -> TextSize {
        TextSize::new(offset)
    }

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(at(start), at(end))
    }

    fn class(name: &str, start: u32, end: u32) -> Item {
        let ident = Ident::new(name, range(start + 6, start + 6 + name.len() as u32));
        Item::Type(Box::new(TypeDeclaration::new(TypeKind::Class, ident, range(start, end))))
    }

    fn method(name: &str, start: u32, end: u32) -> Item {
        Item::Method(Box::new(MethodDeclaration {
            modifiers: Modifiers::default(),
            type_parameters: Vec::new(),
            return_type: Some(TypeRef::void(range(start, start + 4))),
            name: Ident::new(name, range(start + 5, start + 6)),
            parameters: Vec::new(),
            throws: Vec::new(),
            body: None,
            doc: None,
            range: range(start, end),
            recovered: false,
        }))
    }

    fn import(start: u32, end: u32) -> Item {
        Item::Import(ImportDeclaration {
            name: crate::ast::QualifiedName::new([Ident::new("a", range(start + 7, start + 8))]),
            is_static: false,
            on_demand: false,
            range: range(start, end),
        })
    }

    #[test]
    fn test_brace_balance_closes_at_matching_brace() {
        // class A { void m() { { } } }
        let mut tree = RecoveryTree::new(TreeMode::Unit, at(0));
        tree.add(class("A", 0, 7), true);
        tree.on_opening_brace(at(8));
        tree.add(method("m", 10, 18), true);
        tree.on_opening_brace(at(19));
        tree.on_opening_brace(at(21));
        tree.on_closing_brace(at(23));
        tree.on_closing_brace(at(25));
        tree.on_closing_brace(at(27));
        let unit = tree.finalize_unit(at(28));

        let a = &unit.types[0];
        assert_eq!(a.range, range(0, 28));
        assert_eq!(a.body_range, Some(range(8, 28)));
        assert!(!a.recovered);
        let m = a.method_named("m").expect("m attached to A");
        assert_eq!(m.range, range(10, 26));
        assert_eq!(m.body.as_ref().map(|body| body.range), Some(range(19, 26)));
        assert!(m.body.as_ref().is_some_and(|body| !body.is_parsed()));
    }

    #[test]
    fn test_unclosed_declarations_end_at_eof() {
        let mut tree = RecoveryTree::new(TreeMode::Unit, at(0));
        tree.add(class("A", 0, 7), true);
        tree.on_opening_brace(at(8));
        tree.add(method("m", 10, 18), true);
        tree.on_opening_brace(at(19));
        let unit = tree.finalize_unit(at(21));

        let a = &unit.types[0];
        assert!(a.recovered);
        assert_eq!(a.range.end(), at(21));
        let m = a.method_named("m").expect("m attached to A");
        assert!(m.recovered);
        assert_eq!(m.body.as_ref().map(|body| body.range), Some(range(19, 21)));
    }

    #[test]
    fn test_misplaced_item_closes_enclosing_declarations() {
        let mut tree = RecoveryTree::new(TreeMode::Unit, at(0));
        tree.add(class("A", 0, 7), true);
        tree.on_opening_brace(at(8));
        tree.add(method("m", 10, 18), true);
        tree.add(import(20, 29), false);
        let unit = tree.finalize_unit(at(30));

        assert_eq!(unit.imports.len(), 1);
        let a = &unit.types[0];
        assert!(a.recovered);
        assert_eq!(a.range.end(), at(18));
        let m = a.method_named("m").expect("m kept");
        assert!(m.body.is_none());
    }

    #[test]
    fn test_semicolon_ends_bodiless_method() {
        let mut tree = RecoveryTree::new(TreeMode::Unit, at(0));
        tree.add(class("A", 0, 7), true);
        tree.on_opening_brace(at(8));
        tree.add(method("m", 10, 18), true);
        tree.on_semicolon(at(18));
        tree.add(method("n", 20, 28), true);
        tree.on_closing_brace(at(30));
        let unit = tree.finalize_unit(at(31));

        let a = &unit.types[0];
        assert_eq!(a.methods().count(), 2);
        let m = a.method_named("m").expect("m kept");
        assert!(!m.recovered);
        assert_eq!(m.range.end(), at(19));
        // n never saw a body; A's brace closes both.
        assert!(a.method_named("n").is_some_and(|n| n.recovered));
        assert_eq!(a.range.end(), at(31));
    }

    #[test]
    fn test_stray_brace_at_root_ignored() {
        let mut tree = RecoveryTree::new(TreeMode::Unit, at(0));
        tree.on_closing_brace(at(0));
        tree.on_opening_brace(at(2));
        tree.add(class("A", 4, 11), false);
        let unit = tree.finalize_unit(at(12));
        assert_eq!(unit.types.len(), 1);
        assert_eq!(unit.types[0].nesting, Nesting::TopLevel);
    }

    #[test]
    fn test_member_types_nest() {
        let mut tree = RecoveryTree::new(TreeMode::Unit, at(0));
        tree.add(class("A", 0, 7), true);
        tree.on_opening_brace(at(8));
        tree.add(class("B", 10, 17), true);
        tree.on_opening_brace(at(18));
        tree.on_closing_brace(at(19));
        tree.add(method("m", 21, 29), false);
        let unit = tree.finalize_unit(at(30));

        let a = &unit.types[0];
        let b = a.member_types().next().expect("B nested in A");
        assert_eq!(b.nesting, Nesting::Member);
        assert_eq!(b.range, range(10, 20));
        assert!(a.method_named("m").is_some());
        assert!(b.method_named("m").is_none());
    }

    #[test]
    fn test_implicit_initializer_in_class_body() {
        let mut tree = RecoveryTree::new(TreeMode::Unit, at(0));
        tree.add(class("A", 0, 7), true);
        tree.on_opening_brace(at(8));
        assert!(tree.type_in_body());
        assert!(tree.skips_body());
        tree.on_opening_brace(at(10));
        tree.on_closing_brace(at(14));
        tree.on_closing_brace(at(16));
        let unit = tree.finalize_unit(at(17));

        let Some(Member::Initializer(init)) = unit.types[0].members.first() else {
            panic!("expected an initializer");
        };
        assert_eq!(init.body.range, range(10, 15));
        assert_eq!(init.range, range(10, 15));
    }

    #[test]
    fn test_anonymous_bodies_only_balance_braces() {
        let mut tree = RecoveryTree::new(TreeMode::Unit, at(0));
        tree.add(class("A", 0, 7), true);
        tree.on_opening_brace(at(8));
        tree.on_anonymous_brace(at(20));
        tree.add(method("m", 22, 30), false);
        tree.on_closing_brace(at(32));
        tree.add(method("n", 34, 42), false);
        tree.on_closing_brace(at(44));
        let unit = tree.finalize_unit(at(45));

        let a = &unit.types[0];
        assert!(a.method_named("m").is_none());
        assert!(a.method_named("n").is_some());
        assert_eq!(a.range.end(), at(45));
    }

    #[test]
    fn test_statement_mode_nests_blocks() {
        let statement = |start: u32| {
            Item::Statement(Statement::new(StatementKind::Empty, range(start, start + 1)))
        };
        let mut tree = RecoveryTree::new(TreeMode::Statements, at(0));
        tree.on_opening_brace(at(0));
        tree.add(statement(2), false);
        tree.on_opening_brace(at(4));
        tree.add(statement(6), false);
        tree.on_closing_brace(at(8));
        tree.add(statement(10), false);
        tree.on_closing_brace(at(12));
        tree.add(statement(14), false);
        let statements = tree.finalize_statements(at(15));

        assert_eq!(statements.len(), 4);
        let StatementKind::Block(block) = &statements[1].kind else {
            panic!("expected a block");
        };
        assert_eq!(block.range, range(4, 9));
        assert_eq!(block.statements.len(), 1);
        assert!(!tree_skips_in_statements());
    }

    fn tree_skips_in_statements() -> bool {
        let mut tree = RecoveryTree::new(TreeMode::Statements, at(0));
        tree.on_opening_brace(at(0));
        tree.skips_body()
    }

    #[test]
    fn test_declarators_follow_context() {
        let ty = TypeRef::primitive(crate::ast::PrimitiveType::Int, range(10, 13));
        let declarator = |name: &str, start: u32| Declarator {
            name: Ident::new(name, range(start, start + 1)),
            dims: 0,
            initializer: None,
            range: range(start, start + 1),
        };
        let mut tree = RecoveryTree::new(TreeMode::Unit, at(0));
        tree.add(class("A", 0, 7), true);
        tree.on_opening_brace(at(8));
        tree.add_declarator(&Modifiers::default(), &ty, declarator("x", 14));
        tree.add(method("m", 20, 28), true);
        tree.add_declarator(&Modifiers::default(), &ty, declarator("p", 30));
        let unit = tree.finalize_unit(at(40));

        let a = &unit.types[0];
        let x = a.field_named("x").expect("x became a field");
        assert_eq!(x.range, range(10, 15));
        let m = a.method_named("m").expect("m kept");
        assert_eq!(m.parameters.len(), 1);
        assert_eq!(m.parameters[0].name.name, "p");
    }

    #[test]
    fn test_member_opens_header_only_type() {
        // class K int f; void m() { } } class L { }
        let mut tree = RecoveryTree::new(TreeMode::Unit, at(0));
        tree.add(class("K", 0, 7), true);
        tree.add_declarator(
            &Modifiers::default(),
            &TypeRef::primitive(crate::ast::PrimitiveType::Int, range(8, 11)),
            Declarator {
                name: Ident::new("f", range(12, 13)),
                dims: 0,
                initializer: None,
                range: range(12, 13),
            },
        );
        tree.on_semicolon(at(13));
        tree.add(method("m", 15, 23), true);
        tree.on_opening_brace(at(24));
        tree.on_closing_brace(at(26));
        tree.on_closing_brace(at(28));
        tree.add(class("L", 30, 37), true);
        tree.on_opening_brace(at(38));
        tree.on_closing_brace(at(40));
        let unit = tree.finalize_unit(at(41));

        assert_eq!(unit.types.len(), 2);
        let k = &unit.types[0];
        assert!(k.recovered);
        assert_eq!(k.members.len(), 2);
        assert!(k.field_named("f").is_some());
        assert!(k.method_named("m").is_some());
        assert_eq!(k.body_range, Some(range(7, 29)));
        assert_eq!(k.range.end(), at(29));
        let l = &unit.types[1];
        assert_eq!(l.range, range(30, 41));
        assert!(!l.recovered);
    }

    #[test]
    fn test_type_after_header_only_type_is_a_sibling() {
        let mut tree = RecoveryTree::new(TreeMode::Unit, at(0));
        tree.add(class("K", 0, 7), true);
        tree.add(class("L", 8, 15), true);
        tree.on_opening_brace(at(16));
        tree.on_closing_brace(at(18));
        let unit = tree.finalize_unit(at(19));

        assert_eq!(unit.types.len(), 2);
        assert!(unit.types[0].members.is_empty());
        assert!(unit.types[0].body_range.is_none());
    }

    #[test]
    fn test_deeply_nested_blocks_finalize() {
        let depth = 50_000;
        let mut tree = RecoveryTree::new(TreeMode::Statements, at(0));
        tree.on_opening_brace(at(0));
        for offset in 1..=depth {
            tree.on_opening_brace(at(offset));
        }
        let statements = tree.finalize_statements(at(depth + 1));

        assert_eq!(statements.len(), 1);
        let mut nesting = 0;
        let mut current = &statements[0];
        while let StatementKind::Block(block) = &current.kind {
            nesting += 1;
            assert_eq!(block.range.end(), at(depth + 1));
            match block.statements.as_slice() {
                [inner] => current = inner,
                [] => break,
                _ => panic!("one statement per block"),
            }
        }
        assert_eq!(nesting, depth);
    }
}
