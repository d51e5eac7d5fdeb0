//! Declarations: packages, imports, types, members and modules.

use super::expr::Expr;
use super::stmt::Statement;
use super::types::{Ident, QualifiedName, TypeParameter, TypeRef};
use crate::doc::DocComment;
use crate::lexer::TokenKind;
use crate::syntax::TextRange;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct PackageDeclaration {
    pub annotations: Vec<Annotation>,
    pub name: QualifiedName,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ImportDeclaration {
    pub name: QualifiedName,
    pub is_static: bool,
    /// `import a.b.*;`
    pub on_demand: bool,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum ModifierKind {
    Public,
    Protected,
    Private,
    Static,
    Abstract,
    Final,
    Native,
    Synchronized,
    Transient,
    Volatile,
    Strictfp,
}

impl ModifierKind {
    #[must_use]
    pub const fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Public => Self::Public,
            TokenKind::Protected => Self::Protected,
            TokenKind::Private => Self::Private,
            TokenKind::Static => Self::Static,
            TokenKind::Abstract => Self::Abstract,
            TokenKind::Final => Self::Final,
            TokenKind::Native => Self::Native,
            TokenKind::Synchronized => Self::Synchronized,
            TokenKind::Transient => Self::Transient,
            TokenKind::Volatile => Self::Volatile,
            TokenKind::Strictfp => Self::Strictfp,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Protected => "protected",
            Self::Private => "private",
            Self::Static => "static",
            Self::Abstract => "abstract",
            Self::Final => "final",
            Self::Native => "native",
            Self::Synchronized => "synchronized",
            Self::Transient => "transient",
            Self::Volatile => "volatile",
            Self::Strictfp => "strictfp",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Modifier {
    pub kind: ModifierKind,
    pub range: TextRange,
}

/// Keyword modifiers and annotations in source order of their own kind.
///
/// `deprecated` is set from a `@deprecated` doc tag.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Modifiers {
    pub keywords: Vec<Modifier>,
    pub annotations: Vec<Annotation>,
    pub deprecated: bool,
}

impl Modifiers {
    #[must_use]
    pub fn contains(&self, kind: ModifierKind) -> bool {
        self.keywords.iter().any(|modifier| modifier.kind == kind)
    }

    #[must_use]
    pub fn is_static(&self) -> bool {
        self.contains(ModifierKind::Static)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty() && self.annotations.is_empty()
    }

    /// Range covering every keyword and annotation, if there are any.
    #[must_use]
    pub fn range(&self) -> Option<TextRange> {
        self.keywords
            .iter()
            .map(|modifier| modifier.range)
            .chain(self.annotations.iter().map(|annotation| annotation.range))
            .reduce(TextRange::cover)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Annotation {
    pub name: QualifiedName,
    pub arguments: AnnotationArguments,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum AnnotationArguments {
    /// `@Marker`
    None,
    /// `@Single(value)`
    Single(Expr),
    /// `@Normal(a = 1, b = 2)`, possibly with no pairs.
    Pairs(Vec<ElementValuePair>),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ElementValuePair {
    pub name: Ident,
    pub value: Expr,
    pub range: TextRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
}

impl TypeKind {
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Interface => "interface",
            Self::Enum => "enum",
        }
    }
}

/// Where a type is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum Nesting {
    #[default]
    TopLevel,
    Member,
    /// Declared inside a method, constructor or initializer body.
    Local,
    /// The body of an anonymous class. Its `name` is empty.
    Anonymous,
}

/// A class, interface or enum, or an anonymous class body.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct TypeDeclaration {
    pub kind: TypeKind,
    pub modifiers: Modifiers,
    pub name: Ident,
    pub type_parameters: Vec<TypeParameter>,
    pub superclass: Option<TypeRef>,
    /// `implements` for classes and enums, `extends` for interfaces.
    pub interfaces: Vec<TypeRef>,
    pub enum_constants: Vec<EnumConstant>,
    pub members: Vec<Member>,
    pub doc: Option<DocComment>,
    pub nesting: Nesting,
    pub range: TextRange,
    /// From `{` to `}`; `None` when the body never opened.
    pub body_range: Option<TextRange>,
    /// Closed by error recovery rather than by the grammar.
    pub recovered: bool,
}

impl TypeDeclaration {
    #[must_use]
    pub fn new(kind: TypeKind, name: Ident, range: TextRange) -> Self {
        Self {
            kind,
            modifiers: Modifiers::default(),
            name,
            type_parameters: Vec::new(),
            superclass: None,
            interfaces: Vec::new(),
            enum_constants: Vec::new(),
            members: Vec::new(),
            doc: None,
            nesting: Nesting::TopLevel,
            range,
            body_range: None,
            recovered: false,
        }
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldDeclaration> {
        self.members.iter().filter_map(|member| match member {
            Member::Field(field) => Some(field),
            _ => None,
        })
    }

    pub fn methods(&self) -> impl Iterator<Item = &MethodDeclaration> {
        self.members.iter().filter_map(|member| match member {
            Member::Method(method) => Some(method),
            _ => None,
        })
    }

    pub fn member_types(&self) -> impl Iterator<Item = &TypeDeclaration> {
        self.members.iter().filter_map(|member| match member {
            Member::Type(ty) => Some(ty.as_ref()),
            _ => None,
        })
    }

    #[must_use]
    pub fn method_named(&self, name: &str) -> Option<&MethodDeclaration> {
        self.methods().find(|method| method.name.name == name)
    }

    #[must_use]
    pub fn field_named(&self, name: &str) -> Option<&FieldDeclaration> {
        self.fields().find(|field| field.name.name == name)
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum Member {
    Field(FieldDeclaration),
    Method(MethodDeclaration),
    Initializer(Initializer),
    Type(Box<TypeDeclaration>),
}

impl Member {
    #[must_use]
    pub fn range(&self) -> TextRange {
        match self {
            Self::Field(field) => field.range,
            Self::Method(method) => method.range,
            Self::Initializer(init) => init.range,
            Self::Type(ty) => ty.range,
        }
    }
}

/// One declarator of a field declaration. `int a, b;` yields two fields sharing a range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct FieldDeclaration {
    pub modifiers: Modifiers,
    /// Declared type, including dimensions written after the name.
    pub ty: TypeRef,
    pub name: Ident,
    pub initializer: Option<Expr>,
    pub doc: Option<DocComment>,
    /// The whole declaration statement, modifiers to `;`.
    pub range: TextRange,
    /// Name, dimensions and initializer of this declarator.
    pub declarator_range: TextRange,
}

/// A method or, when `return_type` is `None`, a constructor.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct MethodDeclaration {
    pub modifiers: Modifiers,
    pub type_parameters: Vec<TypeParameter>,
    pub return_type: Option<TypeRef>,
    pub name: Ident,
    pub parameters: Vec<Parameter>,
    pub throws: Vec<TypeRef>,
    /// `None` for abstract and native methods and for headers recovery closed at `;`.
    pub body: Option<Body>,
    pub doc: Option<DocComment>,
    pub range: TextRange,
    pub recovered: bool,
}

impl MethodDeclaration {
    #[must_use]
    pub const fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Body {
    /// From `{` to `}`, or to the end of input when the body never closed.
    pub range: TextRange,
    pub statements: Option<Vec<Statement>>,
}

impl Body {
    #[must_use]
    pub const fn unparsed(range: TextRange) -> Self {
        Self {
            range,
            statements: None,
        }
    }

    #[must_use]
    pub const fn is_parsed(&self) -> bool {
        self.statements.is_some()
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Parameter {
    pub modifiers: Modifiers,
    pub ty: TypeRef,
    pub name: Ident,
    /// `String... args`
    pub variable_arity: bool,
    pub range: TextRange,
}

/// An instance or `static` initializer block.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Initializer {
    pub modifiers: Modifiers,
    pub body: Body,
    pub range: TextRange,
}

impl Initializer {
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.modifiers.is_static()
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct EnumConstant {
    pub modifiers: Modifiers,
    pub name: Ident,
    pub arguments: Vec<Expr>,
    /// Class body of a constant such as `A { void m() {} }`.
    pub body: Option<Box<TypeDeclaration>>,
    pub doc: Option<DocComment>,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ModuleDeclaration {
    pub modifiers: Modifiers,
    pub open: bool,
    pub name: QualifiedName,
    pub directives: Vec<ModuleDirective>,
    pub doc: Option<DocComment>,
    pub range: TextRange,
    pub recovered: bool,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct ModuleDirective {
    pub kind: ModuleDirectiveKind,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum ModuleDirectiveKind {
    Requires {
        module: QualifiedName,
        transitive: bool,
        is_static: bool,
    },
    Exports {
        package: QualifiedName,
        targets: Vec<QualifiedName>,
    },
    Opens {
        package: QualifiedName,
        targets: Vec<QualifiedName>,
    },
    Uses {
        service: TypeRef,
    },
    Provides {
        service: TypeRef,
        implementations: Vec<TypeRef>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TextSize;

    fn range(start: u32, end: u32) -> TextRange {
        TextRange::new(TextSize::new(start), TextSize::new(end))
    }

    #[test]
    fn test_modifiers_range_covers_keywords_and_annotations() {
        let modifiers = Modifiers {
            keywords: vec![Modifier {
                kind: ModifierKind::Public,
                range: range(10, 16),
            }],
            annotations: vec![Annotation {
                name: QualifiedName::new([Ident::new("A", range(1, 2))]),
                arguments: AnnotationArguments::None,
                range: range(0, 2),
            }],
            deprecated: false,
        };
        assert_eq!(modifiers.range(), Some(range(0, 16)));
        assert!(modifiers.contains(ModifierKind::Public));
        assert!(!modifiers.is_static());
        assert_eq!(Modifiers::default().range(), None);
    }

    #[test]
    fn test_modifier_kind_from_token() {
        assert_eq!(ModifierKind::from_token(TokenKind::Static), Some(ModifierKind::Static));
        assert_eq!(ModifierKind::from_token(TokenKind::Class), None);
        assert_eq!(ModifierKind::Strictfp.keyword(), "strictfp");
    }
}
