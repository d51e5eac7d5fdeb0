//! Expressions and operators.

use super::decl::{Annotation, TypeDeclaration};
use super::types::{Ident, QualifiedName, TypeRef};
use crate::lexer::{TokenKind, TokenValue};
use crate::syntax::TextRange;
use compact_str::CompactString;

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Expr {
    pub kind: ExprKind,
    pub range: TextRange,
}

impl Expr {
    #[must_use]
    pub const fn new(kind: ExprKind, range: TextRange) -> Self {
        Self { kind, range }
    }

    #[must_use]
    pub fn name(name: QualifiedName) -> Self {
        let range = name.range();
        Self::new(ExprKind::Name(name), range)
    }

    /// Takes the kind out of the expression.
    #[must_use]
    pub fn into_kind(mut self) -> ExprKind {
        std::mem::replace(&mut self.kind, ExprKind::This(None))
    }
}

/// Operand chains such as `"a" + "a" + ...` nest one level per operator and call
/// arguments one level per call, so both are taken apart with an explicit stack.
impl Drop for Expr {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.kind.detach_operands(&mut pending);
        while let Some(mut expr) = pending.pop() {
            expr.kind.detach_operands(&mut pending);
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum ExprKind {
    Literal(Literal),
    /// A simple or qualified name whose meaning needs name resolution.
    Name(QualifiedName),
    /// `this` or `Outer.this`.
    This(Option<QualifiedName>),
    Parenthesized(Box<Expr>),
    ClassLiteral(TypeRef),
    New {
        qualifier: Option<Box<Expr>>,
        ty: TypeRef,
        arguments: Vec<Expr>,
        /// Anonymous class body, with [`super::Nesting::Anonymous`].
        body: Option<Box<TypeDeclaration>>,
    },
    NewArray {
        element: TypeRef,
        dimensions: Vec<Expr>,
        /// Trailing `[]` without a length expression.
        extra_dims: u32,
        initializer: Option<Box<Expr>>,
    },
    ArrayInitializer(Vec<Expr>),
    FieldAccess {
        target: Box<Expr>,
        name: Ident,
    },
    /// `super.x` or `Outer.super.x`.
    SuperFieldAccess {
        qualifier: Option<QualifiedName>,
        name: Ident,
    },
    MethodCall {
        target: Option<Box<Expr>>,
        name: Ident,
        arguments: Vec<Expr>,
    },
    /// `super.m()` or `Outer.super.m()`.
    SuperMethodCall {
        qualifier: Option<QualifiedName>,
        name: Ident,
        arguments: Vec<Expr>,
    },
    ArrayAccess {
        array: Box<Expr>,
        index: Box<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Cast {
        ty: TypeRef,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    InstanceOf {
        operand: Box<Expr>,
        ty: TypeRef,
    },
    Conditional {
        condition: Box<Expr>,
        then_expr: Box<Expr>,
        else_expr: Box<Expr>,
    },
    Assignment {
        op: AssignOp,
        target: Box<Expr>,
        value: Box<Expr>,
    },
    /// Only as an annotation element value.
    Annotation(Box<Annotation>),
}

impl ExprKind {
    /// Moves the nested expressions into `pending`, leaving a leaf behind.
    fn detach_operands(&mut self, pending: &mut Vec<Expr>) {
        match std::mem::replace(self, Self::This(None)) {
            Self::Parenthesized(operand)
            | Self::Unary { operand, .. }
            | Self::Cast { operand, .. }
            | Self::InstanceOf { operand, .. }
            | Self::FieldAccess {
                target: operand, ..
            } => pending.push(*operand),
            Self::Binary { left, right, .. }
            | Self::ArrayAccess {
                array: left,
                index: right,
            }
            | Self::Assignment {
                target: left,
                value: right,
                ..
            } => pending.extend([*left, *right]),
            Self::Conditional {
                condition,
                then_expr,
                else_expr,
            } => pending.extend([*condition, *then_expr, *else_expr]),
            Self::MethodCall {
                target, arguments, ..
            } => {
                pending.extend(target.map(|target| *target));
                pending.extend(arguments);
            }
            Self::New {
                qualifier,
                arguments,
                ..
            } => {
                pending.extend(qualifier.map(|qualifier| *qualifier));
                pending.extend(arguments);
            }
            Self::NewArray {
                dimensions,
                initializer,
                ..
            } => {
                pending.extend(dimensions);
                pending.extend(initializer.map(|initializer| *initializer));
            }
            Self::SuperMethodCall { arguments, .. } | Self::ArrayInitializer(arguments) => {
                pending.extend(arguments);
            }
            other => *self = other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum LiteralKind {
    Int,
    Long,
    Float,
    Double,
    Char,
    String,
    Boolean,
    Null,
}

impl LiteralKind {
    #[must_use]
    pub const fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::IntegerLiteral => Self::Int,
            TokenKind::LongLiteral => Self::Long,
            TokenKind::FloatLiteral => Self::Float,
            TokenKind::DoubleLiteral => Self::Double,
            TokenKind::CharLiteral => Self::Char,
            TokenKind::StringLiteral => Self::String,
            TokenKind::True | TokenKind::False => Self::Boolean,
            TokenKind::Null => Self::Null,
            _ => return None,
        })
    }
}

/// A literal with its source spelling and decoded value.
///
/// The value is [`TokenValue::None`] when the literal was malformed; the problem was
/// reported by the scanner.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Literal {
    pub kind: LiteralKind,
    pub text: CompactString,
    pub value: TokenValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
    Complement,
    PreIncrement,
    PreDecrement,
    PostIncrement,
    PostDecrement,
}

impl UnaryOp {
    #[must_use]
    pub const fn prefix(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Plus => Self::Plus,
            TokenKind::Minus => Self::Minus,
            TokenKind::Bang => Self::Not,
            TokenKind::Tilde => Self::Complement,
            TokenKind::PlusPlus => Self::PreIncrement,
            TokenKind::MinusMinus => Self::PreDecrement,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn postfix(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::PlusPlus => Some(Self::PostIncrement),
            TokenKind::MinusMinus => Some(Self::PostDecrement),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum BinaryOp {
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    UShr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitXor,
    BitOr,
    And,
    Or,
}

impl BinaryOp {
    #[must_use]
    pub const fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Star => Self::Mul,
            TokenKind::Slash => Self::Div,
            TokenKind::Percent => Self::Rem,
            TokenKind::Plus => Self::Add,
            TokenKind::Minus => Self::Sub,
            TokenKind::LessLess => Self::Shl,
            TokenKind::GreaterGreater => Self::Shr,
            TokenKind::GreaterGreaterGreater => Self::UShr,
            TokenKind::Less => Self::Lt,
            TokenKind::Greater => Self::Gt,
            TokenKind::LessEq => Self::Le,
            TokenKind::GreaterEq => Self::Ge,
            TokenKind::EqEq => Self::Eq,
            TokenKind::NotEq => Self::Ne,
            TokenKind::Amp => Self::BitAnd,
            TokenKind::Caret => Self::BitXor,
            TokenKind::Pipe => Self::BitOr,
            TokenKind::AndAnd => Self::And,
            TokenKind::OrOr => Self::Or,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Mul => "*",
            Self::Div => "/",
            Self::Rem => "%",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::UShr => ">>>",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::Le => "<=",
            Self::Ge => ">=",
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::BitAnd => "&",
            Self::BitXor => "^",
            Self::BitOr => "|",
            Self::And => "&&",
            Self::Or => "||",
        }
    }
}

/// Assignment operators. The discriminant is the scratch-stack encoding used while
/// an assignment is being reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
#[repr(u8)]
pub enum AssignOp {
    Assign,
    Mul,
    Div,
    Rem,
    Add,
    Sub,
    Shl,
    Shr,
    UShr,
    BitAnd,
    BitXor,
    BitOr,
}

impl AssignOp {
    const ALL: [Self; 12] = [
        Self::Assign,
        Self::Mul,
        Self::Div,
        Self::Rem,
        Self::Add,
        Self::Sub,
        Self::Shl,
        Self::Shr,
        Self::UShr,
        Self::BitAnd,
        Self::BitXor,
        Self::BitOr,
    ];

    #[must_use]
    pub const fn from_token(kind: TokenKind) -> Option<Self> {
        Some(match kind {
            TokenKind::Assign => Self::Assign,
            TokenKind::StarAssign => Self::Mul,
            TokenKind::SlashAssign => Self::Div,
            TokenKind::PercentAssign => Self::Rem,
            TokenKind::PlusAssign => Self::Add,
            TokenKind::MinusAssign => Self::Sub,
            TokenKind::LessLessAssign => Self::Shl,
            TokenKind::GreaterGreaterAssign => Self::Shr,
            TokenKind::GreaterGreaterGreaterAssign => Self::UShr,
            TokenKind::AmpAssign => Self::BitAnd,
            TokenKind::CaretAssign => Self::BitXor,
            TokenKind::PipeAssign => Self::BitOr,
            _ => return None,
        })
    }

    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }

    #[must_use]
    pub fn from_code(code: i32) -> Option<Self> {
        usize::try_from(code).ok().and_then(|i| Self::ALL.get(i).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assign_op_code_round_trips() {
        for op in AssignOp::ALL {
            assert_eq!(AssignOp::from_code(op.code()), Some(op));
        }
        assert_eq!(AssignOp::from_code(-1), None);
        assert_eq!(AssignOp::from_code(12), None);
    }

    #[test]
    fn test_operator_tokens() {
        assert_eq!(BinaryOp::from_token(TokenKind::GreaterGreaterGreater), Some(BinaryOp::UShr));
        assert_eq!(BinaryOp::from_token(TokenKind::Assign), None);
        assert_eq!(UnaryOp::prefix(TokenKind::PlusPlus), Some(UnaryOp::PreIncrement));
        assert_eq!(UnaryOp::postfix(TokenKind::PlusPlus), Some(UnaryOp::PostIncrement));
        assert_eq!(UnaryOp::postfix(TokenKind::Bang), None);
        assert_eq!(LiteralKind::from_token(TokenKind::False), Some(LiteralKind::Boolean));
    }

    fn string(offset: u32) -> Expr {
        let range = TextRange::new(offset.into(), (offset + 3).into());
        let literal = Literal {
            kind: LiteralKind::String,
            text: "\"a\"".into(),
            value: TokenValue::String("a".into()),
        };
        Expr::new(ExprKind::Literal(literal), range)
    }

    #[test]
    fn test_long_chains_drop() {
        let mut chain = string(0);
        for offset in 1..200_000 {
            let range = TextRange::new(0.into(), (offset * 6 + 3).into());
            let kind = ExprKind::Binary {
                op: BinaryOp::Add,
                left: Box::new(chain),
                right: Box::new(string(offset * 6)),
            };
            chain = Expr::new(kind, range);
        }
        drop(chain);

        let name = Ident::new("f", TextRange::new(0.into(), 1.into()));
        let mut call = string(0);
        for _ in 0..200_000 {
            let range = call.range;
            let kind = ExprKind::MethodCall {
                target: None,
                name: name.clone(),
                arguments: vec![call],
            };
            call = Expr::new(kind, range);
        }
        drop(call);
    }
}
