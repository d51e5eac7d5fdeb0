//! # Abstract syntax tree
//!
//! Every node carries a [`TextRange`] into the original source. Nodes are built by the
//! parser's rule actions; the only other producer is the recovery engine, which closes
//! declarations the automaton never finished and marks them `recovered`.
//!
//! Bodies of methods, constructors and initializers are [`Body`] values whose
//! `statements` are `None` until parsed. A diet parse leaves all of them `None` and flags
//! the unit [`BodyState::Deferred`].

mod decl;
mod expr;
mod stmt;
mod types;
pub mod visit;

pub use decl::{
    Annotation, AnnotationArguments, Body, ElementValuePair, EnumConstant, FieldDeclaration,
    ImportDeclaration, Initializer, Member, MethodDeclaration, Modifier, ModifierKind, Modifiers,
    ModuleDeclaration, ModuleDirective, ModuleDirectiveKind, Nesting, PackageDeclaration,
    Parameter, TypeDeclaration, TypeKind,
};
pub use expr::{AssignOp, BinaryOp, Expr, ExprKind, Literal, LiteralKind, UnaryOp};
pub use stmt::{
    Block, CatchClause, CatchParameter, ConstructorCallKind, LocalVariable, Statement,
    StatementKind, SwitchGroup, SwitchLabel,
};
pub use types::{
    Ident, PrimitiveType, QualifiedName, TypeArgument, TypeParameter, TypeRef, TypeRefKind,
    TypeSegment, WildcardBound,
};
pub use visit::Visitor;

pub use crate::doc::{DocComment, DocTag};

use crate::syntax::TextRange;

/// Whether the bodies of a unit have been parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum BodyState {
    #[default]
    Parsed,
    /// Produced by a diet parse; see `Parser::parse_method_bodies`.
    Deferred,
}

/// Root of one source file.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct CompilationUnit {
    pub package: Option<PackageDeclaration>,
    pub imports: Vec<ImportDeclaration>,
    pub types: Vec<TypeDeclaration>,
    pub module: Option<ModuleDeclaration>,
    pub range: TextRange,
    pub body_state: BodyState,
}

impl CompilationUnit {
    #[must_use]
    pub fn empty(range: TextRange) -> Self {
        Self {
            range,
            ..Self::default()
        }
    }

    /// First top-level type with the given simple name.
    #[must_use]
    pub fn type_named(&self, name: &str) -> Option<&TypeDeclaration> {
        self.types.iter().find(|ty| ty.name.name == name)
    }

    /// Every method, constructor and initializer body in the unit, nested types included.
    pub fn bodies_mut(&mut self) -> Vec<BodyRef<'_>> {
        let mut bodies = Vec::new();
        for ty in &mut self.types {
            collect_bodies(ty, &mut bodies);
        }
        bodies
    }

    /// Whether any body is still waiting to be parsed.
    #[must_use]
    pub fn has_unparsed_bodies(&self) -> bool {
        fn type_has(ty: &TypeDeclaration) -> bool {
            ty.members.iter().any(|member| match member {
                Member::Method(method) => method.body.as_ref().is_some_and(|b| !b.is_parsed()),
                Member::Initializer(init) => !init.body.is_parsed(),
                Member::Type(nested) => type_has(nested),
                Member::Field(_) => false,
            }) || ty
                .enum_constants
                .iter()
                .filter_map(|constant| constant.body.as_deref())
                .any(type_has)
        }
        self.types.iter().any(type_has)
    }
}

/// A body reachable from a unit, tagged with how it has to be re-parsed.
#[derive(Debug)]
pub enum BodyRef<'a> {
    Method(&'a mut Body),
    Constructor(&'a mut Body),
    Initializer(&'a mut Body),
}

impl BodyRef<'_> {
    #[must_use]
    pub fn body(&self) -> &Body {
        match self {
            Self::Method(body) | Self::Constructor(body) | Self::Initializer(body) => body,
        }
    }
}

fn collect_bodies<'a>(ty: &'a mut TypeDeclaration, out: &mut Vec<BodyRef<'a>>) {
    for member in &mut ty.members {
        match member {
            Member::Method(method) => {
                let constructor = method.is_constructor();
                if let Some(body) = &mut method.body {
                    out.push(if constructor {
                        BodyRef::Constructor(body)
                    } else {
                        BodyRef::Method(body)
                    });
                }
            }
            Member::Initializer(init) => out.push(BodyRef::Initializer(&mut init.body)),
            Member::Type(nested) => collect_bodies(nested, out),
            Member::Field(_) => {}
        }
    }
    for constant in &mut ty.enum_constants {
        if let Some(body) = constant.body.as_deref_mut() {
            collect_bodies(body, out);
        }
    }
}
