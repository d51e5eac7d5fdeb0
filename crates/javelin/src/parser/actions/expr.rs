//! Expressions.

use super::{Qualifier, unexpected_token};
use crate::ast::{AssignOp, BinaryOp, Expr, ExprKind, TypeRef, UnaryOp};
use crate::error::Abort;
use crate::parser::driver::Session;
use crate::report::{Problem, ProblemKind};

impl Session<'_> {
    /// `Name [Dims] '.' 'class'`
    pub(super) fn name_class_literal(&mut self, array: bool) -> Result<(), Abort> {
        let dims = if array { self.pop_dims()? } else { 0 };
        let mut ty = TypeRef::from_name(self.pop_name()?);
        ty.dims = dims;
        if array {
            ty.range = self.lhs().with_end(self.rhs(1).end());
        }
        self.push_expr(ExprKind::ClassLiteral(ty));
        Ok(())
    }

    /// `PrimitiveType [Dims] '.' 'class'`
    pub(super) fn type_class_literal(&mut self, array: bool) -> Result<(), Abort> {
        let dims = if array { self.pop_dims()? } else { 0 };
        let mut ty = self.pop_type_raw()?;
        ty.dims = dims;
        if array {
            ty.range = ty.range.cover(self.rhs(1));
        }
        self.push_expr(ExprKind::ClassLiteral(ty));
        Ok(())
    }

    /// The six `new ClassType(...)` shapes. The anonymous class body, when present, is
    /// the last right-hand side entry.
    pub(super) fn instance_creation(
        &mut self,
        qualifier: Qualifier,
        anonymous: bool,
    ) -> Result<(), Abort> {
        let body = if anonymous {
            let members = self.pop_nodes()?;
            self.leave_anonymous();
            let base = if qualifier == Qualifier::None { 4 } else { 6 };
            Some(Box::new(self.anonymous_body(self.rhs(base), members)?))
        } else {
            None
        };
        let arguments = self.pop_exprs()?;
        let ty = self.pop_type_raw()?;
        if ty.has_diamond() && !ty.has_outer_diamond_only() {
            self.report(Problem::error(ProblemKind::MisplacedDiamond, ty.range))?;
        }
        let qualifier = match qualifier {
            Qualifier::None => None,
            Qualifier::Primary => Some(Box::new(self.pop_expr()?)),
            Qualifier::Name => Some(Box::new(Expr::name(self.pop_name()?))),
        };
        self.push_expr(ExprKind::New {
            qualifier,
            ty,
            arguments,
            body,
        });
        Ok(())
    }

    /// `new Type DimExprs Dimsopt`
    pub(super) fn array_creation(&mut self) -> Result<(), Abort> {
        let extra_dims = self.pop_dims()?;
        let dimensions = self.pop_exprs()?;
        let element = self.pop_type()?;
        self.push_expr(ExprKind::NewArray {
            element,
            dimensions,
            extra_dims,
            initializer: None,
        });
        Ok(())
    }

    /// `new Type Dims ArrayInitializer`
    pub(super) fn initialized_array_creation(&mut self) -> Result<(), Abort> {
        let initializer = self.pop_expr()?;
        let extra_dims = self.pop_dims()?;
        let element = self.pop_type()?;
        self.push_expr(ExprKind::NewArray {
            element,
            dimensions: Vec::new(),
            extra_dims,
            initializer: Some(Box::new(initializer)),
        });
        Ok(())
    }

    pub(super) fn field_access(&mut self) -> Result<(), Abort> {
        let name = self.pop_ident()?;
        let target = Box::new(self.pop_expr()?);
        self.push_expr(ExprKind::FieldAccess { target, name });
        Ok(())
    }

    /// `super.x` or `Outer.super.x`
    pub(super) fn super_field_access(&mut self, qualified: bool) -> Result<(), Abort> {
        let name = self.pop_ident()?;
        let qualifier = if qualified {
            Some(self.pop_name()?)
        } else {
            None
        };
        self.push_expr(ExprKind::SuperFieldAccess { qualifier, name });
        Ok(())
    }

    /// `a.b.m(...)`: the last segment is the method, the rest its target.
    pub(super) fn name_method_invocation(&mut self) -> Result<(), Abort> {
        let arguments = self.pop_exprs()?;
        let mut path = self.pop_name()?;
        let name = path
            .segments
            .pop()
            .ok_or_else(|| Abort::invariant("method invocation without a name"))?;
        let target = (!path.segments.is_empty()).then(|| Box::new(Expr::name(path)));
        self.push_expr(ExprKind::MethodCall {
            target,
            name,
            arguments,
        });
        Ok(())
    }

    /// `primary.m(...)`
    pub(super) fn method_invocation(&mut self) -> Result<(), Abort> {
        let arguments = self.pop_exprs()?;
        let name = self.pop_ident()?;
        let target = Some(Box::new(self.pop_expr()?));
        self.push_expr(ExprKind::MethodCall {
            target,
            name,
            arguments,
        });
        Ok(())
    }

    pub(super) fn super_method_invocation(&mut self, qualified: bool) -> Result<(), Abort> {
        let arguments = self.pop_exprs()?;
        let name = self.pop_ident()?;
        let qualifier = if qualified {
            Some(self.pop_name()?)
        } else {
            None
        };
        self.push_expr(ExprKind::SuperMethodCall {
            qualifier,
            name,
            arguments,
        });
        Ok(())
    }

    pub(super) fn array_access(&mut self, name: bool) -> Result<(), Abort> {
        let index = Box::new(self.pop_expr()?);
        let array = if name {
            Expr::name(self.pop_name()?)
        } else {
            self.pop_expr()?
        };
        self.push_expr(ExprKind::ArrayAccess {
            array: Box::new(array),
            index,
        });
        Ok(())
    }

    /// Prefix operators sit at `rhs(0)`, postfix ones at `rhs(1)`.
    pub(super) fn unary(&mut self, operator: usize) -> Result<(), Abort> {
        let token = self.rhs_token(operator)?;
        let op = if operator == 0 {
            UnaryOp::prefix(token)
        } else {
            UnaryOp::postfix(token)
        }
        .ok_or_else(|| unexpected_token(token))?;
        let operand = Box::new(self.pop_expr()?);
        self.push_expr(ExprKind::Unary { op, operand });
        Ok(())
    }

    /// `(PrimitiveType Dimsopt) operand`
    pub(super) fn primitive_cast(&mut self) -> Result<(), Abort> {
        let operand = Box::new(self.pop_expr()?);
        let dims = self.pop_dims()?;
        let mut ty = self.pop_type_raw()?;
        if dims > 0 {
            ty.dims = dims;
            ty.range = ty.range.cover(self.rhs(2));
        }
        self.push_expr(ExprKind::Cast { ty, operand });
        Ok(())
    }

    /// `(Expression) operand`, a cast only when the parenthesized expression is a name.
    pub(super) fn name_cast(&mut self) -> Result<(), Abort> {
        let operand = self.pop_expr()?;
        let target = self.pop_expr()?;
        let range = target.range;
        let ExprKind::Name(name) = target.into_kind() else {
            self.report(Problem::error(ProblemKind::InvalidCastTarget, range))?;
            self.values.expr.push(operand);
            return Ok(());
        };
        let ty = TypeRef::from_name(name);
        self.push_expr(ExprKind::Cast {
            ty,
            operand: Box::new(operand),
        });
        Ok(())
    }

    /// `(Name Dims) operand`
    pub(super) fn array_cast(&mut self) -> Result<(), Abort> {
        let operand = Box::new(self.pop_expr()?);
        let dims = self.pop_dims()?;
        let mut ty = TypeRef::from_name(self.pop_name()?);
        ty.dims = dims;
        ty.range = ty.range.cover(self.rhs(2));
        self.push_expr(ExprKind::Cast { ty, operand });
        Ok(())
    }

    pub(super) fn binary(&mut self) -> Result<(), Abort> {
        let token = self.rhs_token(1)?;
        let op = BinaryOp::from_token(token).ok_or_else(|| unexpected_token(token))?;
        let right = Box::new(self.pop_expr()?);
        let left = Box::new(self.pop_expr()?);
        self.push_expr(ExprKind::Binary { op, left, right });
        Ok(())
    }

    pub(super) fn instanceof(&mut self) -> Result<(), Abort> {
        let ty = self.pop_type()?;
        let operand = Box::new(self.pop_expr()?);
        self.push_expr(ExprKind::InstanceOf { operand, ty });
        Ok(())
    }

    pub(super) fn conditional(&mut self) -> Result<(), Abort> {
        let else_expr = Box::new(self.pop_expr()?);
        let then_expr = Box::new(self.pop_expr()?);
        let condition = Box::new(self.pop_expr()?);
        self.push_expr(ExprKind::Conditional {
            condition,
            then_expr,
            else_expr,
        });
        Ok(())
    }

    /// `LeftHandSide AssignmentOperator AssignmentExpression`
    pub(super) fn assignment(&mut self) -> Result<(), Abort> {
        let value = Box::new(self.pop_expr()?);
        let code = self.pop_int()?;
        let op = AssignOp::from_code(code)
            .ok_or_else(|| Abort::invariant(format!("no assignment operator {code}")))?;
        let target = Box::new(self.pop_expr()?);
        self.push_expr(ExprKind::Assignment { op, target, value });
        Ok(())
    }

    pub(super) fn assignment_operator(&mut self) -> Result<(), Abort> {
        let token = self.rhs_token(0)?;
        let op = AssignOp::from_token(token).ok_or_else(|| unexpected_token(token))?;
        self.values.int.push(op.code());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::ast::{AssignOp, BinaryOp, Expr, ExprKind, Nesting, UnaryOp};
    use crate::parser::{Parser, ParserOptions};
    use crate::report::{CollectingReporter, ProblemKind};

    fn parse(text: &str) -> (Option<Expr>, Vec<ProblemKind>) {
        let options = ParserOptions::default().with_stack_balance_check(true);
        let mut parser = Parser::new(options).expect("grammar loads");
        let mut reporter = CollectingReporter::new();
        let expr = parser.parse_expression(text, &mut reporter).expect("no abort");
        (expr, reporter.problems().iter().map(|problem| problem.kind).collect())
    }

    fn expr(text: &str) -> Expr {
        let (expr, problems) = parse(text);
        assert!(problems.is_empty(), "{problems:?}");
        expr.expect("valid expression")
    }

    #[test]
    fn test_precedence_and_associativity() {
        let ExprKind::Binary { op, left, .. } = expr("a - b - c * d").into_kind() else {
            panic!("expected a binary expression");
        };
        assert_eq!(op, BinaryOp::Sub);
        assert!(matches!(left.kind, ExprKind::Binary { op: BinaryOp::Sub, .. }));
    }

    #[test]
    fn test_assignment_is_right_associative() {
        let ExprKind::Assignment { op, value, .. } = expr("a += b = 1").into_kind() else {
            panic!("expected an assignment");
        };
        assert_eq!(op, AssignOp::Add);
        assert!(matches!(value.kind, ExprKind::Assignment { op: AssignOp::Assign, .. }));
    }

    #[test]
    fn test_name_method_invocation_splits_target() {
        let ExprKind::MethodCall { target, name, arguments } = expr("a.b.m(1, 2)").into_kind() else {
            panic!("expected a call");
        };
        assert_eq!(name.name, "m");
        assert_eq!(arguments.len(), 2);
        assert!(matches!(target.map(|t| t.into_kind()), Some(ExprKind::Name(path)) if path.to_string() == "a.b"));
    }

    #[test]
    fn test_casts() {
        assert!(matches!(expr("(String) x").kind, ExprKind::Cast { .. }));
        assert!(matches!(expr("(int[]) x").kind, ExprKind::Cast { ref ty, .. } if ty.dims == 1));
        let (result, problems) = parse("(a + b) c");
        assert_eq!(problems, vec![ProblemKind::InvalidCastTarget]);
        assert!(matches!(result.map(Expr::into_kind), Some(ExprKind::Name(_))));
    }

    #[test]
    fn test_anonymous_class_and_diamond() {
        let ExprKind::New { body, ty, .. } = expr("new java.util.ArrayList<>() { }").into_kind() else {
            panic!("expected instance creation");
        };
        assert!(ty.has_outer_diamond_only());
        assert_eq!(body.expect("anonymous body").nesting, Nesting::Anonymous);
    }

    #[test]
    fn test_array_creation() {
        let ExprKind::NewArray { dimensions, extra_dims, .. } = expr("new int[3][]").into_kind() else {
            panic!("expected array creation");
        };
        assert_eq!(dimensions.len(), 1);
        assert_eq!(extra_dims, 1);
        assert!(matches!(
            expr("new int[] {1, 2}").kind,
            ExprKind::NewArray { initializer: Some(_), .. }
        ));
    }

    #[test]
    fn test_unary_operators() {
        assert!(matches!(expr("-x").kind, ExprKind::Unary { op: UnaryOp::Minus, .. }));
        assert!(matches!(expr("x++").kind, ExprKind::Unary { op: UnaryOp::PostIncrement, .. }));
    }
}
