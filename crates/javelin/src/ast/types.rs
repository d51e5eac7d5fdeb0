//! Names and type references.

use crate::lexer::TokenKind;
use crate::syntax::TextRange;
use compact_str::CompactString;
use smallvec::SmallVec;
use std::fmt;

/// An identifier with its position.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Ident {
    pub name: CompactString,
    pub range: TextRange,
}

impl Ident {
    #[must_use]
    pub fn new(name: impl Into<CompactString>, range: TextRange) -> Self {
        Self {
            name: name.into(),
            range,
        }
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// A dotted name such as `java.util.List`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct QualifiedName {
    pub segments: SmallVec<[Ident; 4]>,
}

impl QualifiedName {
    #[must_use]
    pub fn new(segments: impl IntoIterator<Item = Ident>) -> Self {
        Self {
            segments: segments.into_iter().collect(),
        }
    }

    /// Range from the first to the last segment.
    #[must_use]
    pub fn range(&self) -> TextRange {
        match (self.segments.first(), self.segments.last()) {
            (Some(first), Some(last)) => first.range.cover(last.range),
            _ => TextRange::default(),
        }
    }

    #[must_use]
    pub fn last(&self) -> Option<&Ident> {
        self.segments.last()
    }

    #[must_use]
    pub fn is_simple(&self) -> bool {
        self.segments.len() == 1
    }
}

impl fmt::Display for QualifiedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, segment) in self.segments.iter().enumerate() {
            if index > 0 {
                f.write_str(".")?;
            }
            f.write_str(&segment.name)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum PrimitiveType {
    Boolean,
    Byte,
    Short,
    Int,
    Long,
    Char,
    Float,
    Double,
}

impl PrimitiveType {
    #[must_use]
    pub const fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Boolean => Self::Boolean,
            TokenKind::Byte => Self::Byte,
            TokenKind::Short => Self::Short,
            TokenKind::Int => Self::Int,
            TokenKind::Long => Self::Long,
            TokenKind::Char => Self::Char,
            TokenKind::Float => Self::Float,
            TokenKind::Double => Self::Double,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Boolean => "boolean",
            Self::Byte => "byte",
            Self::Short => "short",
            Self::Int => "int",
            Self::Long => "long",
            Self::Char => "char",
            Self::Float => "float",
            Self::Double => "double",
        }
    }
}

/// A written type: primitive, `void`, or a possibly parameterized class type, with
/// array dimensions.
///
/// `range` covers the type as written. Dimensions that come from a declarator
/// (`int x[]`) are counted in `dims` without widening the range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct TypeRef {
    pub kind: TypeRefKind,
    pub dims: u32,
    pub range: TextRange,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum TypeRefKind {
    Primitive(PrimitiveType),
    Void,
    Class(Vec<TypeSegment>),
}

/// One segment of a class type, `Map<K, V>` in `java.util.Map<K, V>`.
///
/// `arguments` is `Some(vec![])` for the diamond `<>`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct TypeSegment {
    pub name: Ident,
    pub arguments: Option<Vec<TypeArgument>>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum TypeArgument {
    Type(TypeRef),
    Wildcard {
        bound: Option<WildcardBound>,
        range: TextRange,
    },
}

impl TypeArgument {
    #[must_use]
    pub fn range(&self) -> TextRange {
        match self {
            Self::Type(ty) => ty.range,
            Self::Wildcard { range, .. } => *range,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum WildcardBound {
    Extends(TypeRef),
    Super(TypeRef),
}

/// `T extends A & B` in a type parameter list.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct TypeParameter {
    pub name: Ident,
    pub bounds: Vec<TypeRef>,
    pub range: TextRange,
}

impl TypeRef {
    #[must_use]
    pub const fn primitive(primitive: PrimitiveType, range: TextRange) -> Self {
        Self {
            kind: TypeRefKind::Primitive(primitive),
            dims: 0,
            range,
        }
    }

    #[must_use]
    pub const fn void(range: TextRange) -> Self {
        Self {
            kind: TypeRefKind::Void,
            dims: 0,
            range,
        }
    }

    /// Unparameterized class type named by `name`.
    #[must_use]
    pub fn from_name(name: QualifiedName) -> Self {
        let range = name.range();
        Self {
            kind: TypeRefKind::Class(
                name.segments
                    .into_iter()
                    .map(|name| TypeSegment {
                        name,
                        arguments: None,
                    })
                    .collect(),
            ),
            dims: 0,
            range,
        }
    }

    #[must_use]
    pub fn segments(&self) -> &[TypeSegment] {
        match &self.kind {
            TypeRefKind::Class(segments) => segments,
            TypeRefKind::Primitive(_) | TypeRefKind::Void => &[],
        }
    }

    #[must_use]
    pub const fn is_array(&self) -> bool {
        self.dims > 0
    }

    /// Whether any segment, at any depth, is written with the diamond `<>`.
    #[must_use]
    pub fn has_diamond(&self) -> bool {
        self.segments().iter().any(|segment| match &segment.arguments {
            Some(arguments) if arguments.is_empty() => true,
            Some(arguments) => arguments.iter().any(|argument| match argument {
                TypeArgument::Type(ty) => ty.has_diamond(),
                TypeArgument::Wildcard {
                    bound: Some(WildcardBound::Extends(ty) | WildcardBound::Super(ty)),
                    ..
                } => ty.has_diamond(),
                TypeArgument::Wildcard { bound: None, .. } => false,
            }),
            None => false,
        })
    }

    /// Whether only the outermost segment uses the diamond, as `new` allows.
    #[must_use]
    pub fn has_outer_diamond_only(&self) -> bool {
        let Some((last, init)) = self.segments().split_last() else {
            return false;
        };
        matches!(&last.arguments, Some(arguments) if arguments.is_empty())
            && !init.iter().any(|segment| segment.arguments.is_some())
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            TypeRefKind::Primitive(primitive) => f.write_str(primitive.keyword())?,
            TypeRefKind::Void => f.write_str("void")?,
            TypeRefKind::Class(segments) => {
                for (index, segment) in segments.iter().enumerate() {
                    if index > 0 {
                        f.write_str(".")?;
                    }
                    f.write_str(&segment.name.name)?;
                    if let Some(arguments) = &segment.arguments {
                        f.write_str("<")?;
                        for (position, argument) in arguments.iter().enumerate() {
                            if position > 0 {
                                f.write_str(", ")?;
                            }
                            match argument {
                                TypeArgument::Type(ty) => write!(f, "{ty}")?,
                                TypeArgument::Wildcard { bound: None, .. } => f.write_str("?")?,
                                TypeArgument::Wildcard {
                                    bound: Some(WildcardBound::Extends(ty)),
                                    ..
                                } => write!(f, "? extends {ty}")?,
                                TypeArgument::Wildcard {
                                    bound: Some(WildcardBound::Super(ty)),
                                    ..
                                } => write!(f, "? super {ty}")?,
                            }
                        }
                        f.write_str(">")?;
                    }
                }
            }
        }
        for _ in 0..self.dims {
            f.write_str("[]")?;
        }
        Ok(())
    }
}
