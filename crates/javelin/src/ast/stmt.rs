//! Statements.

use super::decl::{Modifiers, TypeDeclaration};
use super::expr::Expr;
use super::types::{Ident, TypeRef};
use crate::syntax::TextRange;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Statement {
    pub kind: StatementKind,
    pub range: TextRange,
}

impl Statement {
    #[must_use]
    pub const fn new(kind: StatementKind, range: TextRange) -> Self {
        Self { kind, range }
    }

    /// Takes the kind out of the statement.
    #[must_use]
    pub fn into_kind(mut self) -> StatementKind {
        std::mem::replace(&mut self.kind, StatementKind::Empty)
    }
}

/// Nested blocks and bodies are taken apart with an explicit stack, so an unbalanced
/// body thousands of braces deep drops without exhausting the thread stack.
impl Drop for Statement {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.kind.detach_children(&mut pending);
        while let Some(mut statement) = pending.pop() {
            statement.kind.detach_children(&mut pending);
        }
    }
}

impl StatementKind {
    /// Moves the nested statements into `pending`, leaving `Empty` behind.
    fn detach_children(&mut self, pending: &mut Vec<Statement>) {
        match std::mem::replace(self, Self::Empty) {
            Self::Block(block) | Self::Synchronized { body: block, .. } => {
                pending.extend(block.statements);
            }
            Self::Labeled { body, .. }
            | Self::While { body, .. }
            | Self::Do { body, .. }
            | Self::ForEach { body, .. } => pending.push(*body),
            Self::If {
                then_branch,
                else_branch,
                ..
            } => {
                pending.push(*then_branch);
                pending.extend(else_branch.map(|branch| *branch));
            }
            Self::For { init, body, .. } => {
                pending.extend(init);
                pending.push(*body);
            }
            Self::Switch { groups, .. } => {
                pending.extend(groups.into_iter().flat_map(|group| group.statements));
            }
            Self::Try {
                body,
                catches,
                finally,
                ..
            } => {
                pending.extend(body.statements);
                pending.extend(catches.into_iter().flat_map(|catch| catch.body.statements));
                pending.extend(finally.into_iter().flat_map(|block| block.statements));
            }
            other => *self = other,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum StatementKind {
    Empty,
    Block(Block),
    /// One declarator of a local variable declaration statement.
    LocalVariable(LocalVariable),
    LocalType(Box<TypeDeclaration>),
    Expression(Expr),
    Labeled {
        label: Ident,
        body: Box<Statement>,
    },
    If {
        condition: Expr,
        then_branch: Box<Statement>,
        else_branch: Option<Box<Statement>>,
    },
    Switch {
        selector: Expr,
        groups: Vec<SwitchGroup>,
    },
    While {
        condition: Expr,
        body: Box<Statement>,
    },
    Do {
        body: Box<Statement>,
        condition: Expr,
    },
    For {
        init: Vec<Statement>,
        condition: Option<Expr>,
        update: Vec<Expr>,
        body: Box<Statement>,
    },
    ForEach {
        variable: LocalVariable,
        iterable: Expr,
        body: Box<Statement>,
    },
    Break(Option<Ident>),
    Continue(Option<Ident>),
    Return(Option<Expr>),
    Throw(Expr),
    Synchronized {
        lock: Expr,
        body: Block,
    },
    Assert {
        condition: Expr,
        message: Option<Expr>,
    },
    Try {
        resources: Vec<LocalVariable>,
        body: Block,
        catches: Vec<CatchClause>,
        finally: Option<Block>,
    },
    /// `this(...)` or `super(...)` at the start of a constructor body.
    ExplicitConstructorCall {
        kind: ConstructorCallKind,
        qualifier: Option<Box<Expr>>,
        arguments: Vec<Expr>,
    },
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Block {
    pub statements: Vec<Statement>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct LocalVariable {
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub name: Ident,
    pub initializer: Option<Expr>,
    /// The declarator: name, dimensions and initializer.
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct SwitchGroup {
    pub labels: Vec<SwitchLabel>,
    pub statements: Vec<Statement>,
    pub range: TextRange,
}

/// `case value:`, or `default:` when `value` is `None`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct SwitchLabel {
    pub value: Option<Expr>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct CatchClause {
    pub parameter: CatchParameter,
    pub body: Block,
    pub range: TextRange,
}

/// `final IOException | SQLException e`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct CatchParameter {
    pub modifiers: Modifiers,
    pub types: Vec<TypeRef>,
    pub name: Ident,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum ConstructorCallKind {
    This,
    Super,
}
