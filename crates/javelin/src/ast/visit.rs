//! Tree traversal.
//!
//! Implement the `visit_*` methods of interest; the defaults recurse through the
//! matching `walk_*` function. Returning [`ControlFlow::Break`] stops the whole walk.
//! An override that still wants the children visited calls the `walk_*` function itself.

use super::decl::{
    Annotation, AnnotationArguments, EnumConstant, FieldDeclaration, Initializer, Member,
    MethodDeclaration, ModuleDeclaration, TypeDeclaration,
};
use super::expr::{Expr, ExprKind};
use super::stmt::{Statement, StatementKind};
use super::types::{TypeArgument, TypeRef, WildcardBound};
use super::CompilationUnit;
use std::ops::ControlFlow;

pub trait Visitor {
    fn visit_compilation_unit(&mut self, unit: &CompilationUnit) -> ControlFlow<()> {
        walk_compilation_unit(self, unit)
    }

    fn visit_type_declaration(&mut self, ty: &TypeDeclaration) -> ControlFlow<()> {
        walk_type_declaration(self, ty)
    }

    fn visit_field(&mut self, field: &FieldDeclaration) -> ControlFlow<()> {
        walk_field(self, field)
    }

    fn visit_method(&mut self, method: &MethodDeclaration) -> ControlFlow<()> {
        walk_method(self, method)
    }

    fn visit_initializer(&mut self, init: &Initializer) -> ControlFlow<()> {
        walk_initializer(self, init)
    }

    fn visit_enum_constant(&mut self, constant: &EnumConstant) -> ControlFlow<()> {
        walk_enum_constant(self, constant)
    }

    fn visit_module(&mut self, module: &ModuleDeclaration) -> ControlFlow<()> {
        let _ = module;
        ControlFlow::Continue(())
    }

    fn visit_annotation(&mut self, annotation: &Annotation) -> ControlFlow<()> {
        walk_annotation(self, annotation)
    }

    fn visit_statement(&mut self, statement: &Statement) -> ControlFlow<()> {
        walk_statement(self, statement)
    }

    fn visit_expr(&mut self, expr: &Expr) -> ControlFlow<()> {
        walk_expr(self, expr)
    }

    fn visit_type_ref(&mut self, ty: &TypeRef) -> ControlFlow<()> {
        walk_type_ref(self, ty)
    }
}

pub fn walk_compilation_unit<V: Visitor + ?Sized>(
    visitor: &mut V,
    unit: &CompilationUnit,
) -> ControlFlow<()> {
    if let Some(package) = &unit.package {
        for annotation in &package.annotations {
            visitor.visit_annotation(annotation)?;
        }
    }
    for ty in &unit.types {
        visitor.visit_type_declaration(ty)?;
    }
    if let Some(module) = &unit.module {
        visitor.visit_module(module)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_type_declaration<V: Visitor + ?Sized>(
    visitor: &mut V,
    ty: &TypeDeclaration,
) -> ControlFlow<()> {
    for annotation in &ty.modifiers.annotations {
        visitor.visit_annotation(annotation)?;
    }
    for parameter in &ty.type_parameters {
        for bound in &parameter.bounds {
            visitor.visit_type_ref(bound)?;
        }
    }
    for supertype in ty.superclass.iter().chain(&ty.interfaces) {
        visitor.visit_type_ref(supertype)?;
    }
    for constant in &ty.enum_constants {
        visitor.visit_enum_constant(constant)?;
    }
    for member in &ty.members {
        match member {
            Member::Field(field) => visitor.visit_field(field)?,
            Member::Method(method) => visitor.visit_method(method)?,
            Member::Initializer(init) => visitor.visit_initializer(init)?,
            Member::Type(nested) => visitor.visit_type_declaration(nested)?,
        }
    }
    ControlFlow::Continue(())
}

pub fn walk_field<V: Visitor + ?Sized>(
    visitor: &mut V,
    field: &FieldDeclaration,
) -> ControlFlow<()> {
    for annotation in &field.modifiers.annotations {
        visitor.visit_annotation(annotation)?;
    }
    visitor.visit_type_ref(&field.ty)?;
    if let Some(initializer) = &field.initializer {
        visitor.visit_expr(initializer)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_method<V: Visitor + ?Sized>(
    visitor: &mut V,
    method: &MethodDeclaration,
) -> ControlFlow<()> {
    for annotation in &method.modifiers.annotations {
        visitor.visit_annotation(annotation)?;
    }
    if let Some(return_type) = &method.return_type {
        visitor.visit_type_ref(return_type)?;
    }
    for parameter in &method.parameters {
        visitor.visit_type_ref(&parameter.ty)?;
    }
    for thrown in &method.throws {
        visitor.visit_type_ref(thrown)?;
    }
    if let Some(statements) = method.body.as_ref().and_then(|body| body.statements.as_ref()) {
        for statement in statements {
            visitor.visit_statement(statement)?;
        }
    }
    ControlFlow::Continue(())
}

pub fn walk_initializer<V: Visitor + ?Sized>(
    visitor: &mut V,
    init: &Initializer,
) -> ControlFlow<()> {
    for statement in init.body.statements.iter().flatten() {
        visitor.visit_statement(statement)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_enum_constant<V: Visitor + ?Sized>(
    visitor: &mut V,
    constant: &EnumConstant,
) -> ControlFlow<()> {
    for argument in &constant.arguments {
        visitor.visit_expr(argument)?;
    }
    if let Some(body) = &constant.body {
        visitor.visit_type_declaration(body)?;
    }
    ControlFlow::Continue(())
}

pub fn walk_annotation<V: Visitor + ?Sized>(
    visitor: &mut V,
    annotation: &Annotation,
) -> ControlFlow<()> {
    match &annotation.arguments {
        AnnotationArguments::None => {}
        AnnotationArguments::Single(value) => visitor.visit_expr(value)?,
        AnnotationArguments::Pairs(pairs) => {
            for pair in pairs {
                visitor.visit_expr(&pair.value)?;
            }
        }
    }
    ControlFlow::Continue(())
}

pub fn walk_statement<V: Visitor + ?Sized>(
    visitor: &mut V,
    statement: &Statement,
) -> ControlFlow<()> {
    match &statement.kind {
        StatementKind::Empty
        | StatementKind::Break(_)
        | StatementKind::Continue(_)
        | StatementKind::Return(None) => {}
        StatementKind::Block(block) => {
            for inner in &block.statements {
                visitor.visit_statement(inner)?;
            }
        }
        StatementKind::LocalVariable(local) => {
            visitor.visit_type_ref(&local.ty)?;
            if let Some(initializer) = &local.initializer {
                visitor.visit_expr(initializer)?;
            }
        }
        StatementKind::LocalType(ty) => visitor.visit_type_declaration(ty)?,
        StatementKind::Expression(expr)
        | StatementKind::Return(Some(expr))
        | StatementKind::Throw(expr) => visitor.visit_expr(expr)?,
        StatementKind::Labeled { body, .. } => visitor.visit_statement(body)?,
        StatementKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            visitor.visit_expr(condition)?;
            visitor.visit_statement(then_branch)?;
            if let Some(else_branch) = else_branch {
                visitor.visit_statement(else_branch)?;
            }
        }
        StatementKind::Switch { selector, groups } => {
            visitor.visit_expr(selector)?;
            for group in groups {
                for value in group.labels.iter().filter_map(|label| label.value.as_ref()) {
                    visitor.visit_expr(value)?;
                }
                for inner in &group.statements {
                    visitor.visit_statement(inner)?;
                }
            }
        }
        StatementKind::While { condition, body } | StatementKind::Do { body, condition } => {
            visitor.visit_expr(condition)?;
            visitor.visit_statement(body)?;
        }
        StatementKind::For {
            init,
            condition,
            update,
            body,
        } => {
            for inner in init {
                visitor.visit_statement(inner)?;
            }
            if let Some(condition) = condition {
                visitor.visit_expr(condition)?;
            }
            for expr in update {
                visitor.visit_expr(expr)?;
            }
            visitor.visit_statement(body)?;
        }
        StatementKind::ForEach {
            variable,
            iterable,
            body,
        } => {
            visitor.visit_type_ref(&variable.ty)?;
            visitor.visit_expr(iterable)?;
            visitor.visit_statement(body)?;
        }
        StatementKind::Synchronized { lock, body } => {
            visitor.visit_expr(lock)?;
            for inner in &body.statements {
                visitor.visit_statement(inner)?;
            }
        }
        StatementKind::Assert { condition, message } => {
            visitor.visit_expr(condition)?;
            if let Some(message) = message {
                visitor.visit_expr(message)?;
            }
        }
        StatementKind::Try {
            resources,
            body,
            catches,
            finally,
        } => {
            for resource in resources {
                visitor.visit_type_ref(&resource.ty)?;
                if let Some(initializer) = &resource.initializer {
                    visitor.visit_expr(initializer)?;
                }
            }
            let blocks = std::iter::once(body)
                .chain(catches.iter().map(|catch| &catch.body))
                .chain(finally);
            for block in blocks {
                for inner in &block.statements {
                    visitor.visit_statement(inner)?;
                }
            }
        }
        StatementKind::ExplicitConstructorCall {
            qualifier,
            arguments,
            ..
        } => {
            if let Some(qualifier) = qualifier {
                visitor.visit_expr(qualifier)?;
            }
            for argument in arguments {
                visitor.visit_expr(argument)?;
            }
        }
    }
    ControlFlow::Continue(())
}

pub fn walk_expr<V: Visitor + ?Sized>(visitor: &mut V, expr: &Expr) -> ControlFlow<()> {
    match &expr.kind {
        ExprKind::Literal(_)
        | ExprKind::Name(_)
        | ExprKind::This(_)
        | ExprKind::SuperFieldAccess { .. } => {}
        ExprKind::Parenthesized(inner) => visitor.visit_expr(inner)?,
        ExprKind::ClassLiteral(ty) => visitor.visit_type_ref(ty)?,
        ExprKind::New {
            qualifier,
            ty,
            arguments,
            body,
        } => {
            if let Some(qualifier) = qualifier {
                visitor.visit_expr(qualifier)?;
            }
            visitor.visit_type_ref(ty)?;
            for argument in arguments {
                visitor.visit_expr(argument)?;
            }
            if let Some(body) = body {
                visitor.visit_type_declaration(body)?;
            }
        }
        ExprKind::NewArray {
            element,
            dimensions,
            initializer,
            ..
        } => {
            visitor.visit_type_ref(element)?;
            for dimension in dimensions {
                visitor.visit_expr(dimension)?;
            }
            if let Some(initializer) = initializer {
                visitor.visit_expr(initializer)?;
            }
        }
        ExprKind::ArrayInitializer(values) => {
            for value in values {
                visitor.visit_expr(value)?;
            }
        }
        ExprKind::FieldAccess { target, .. } => visitor.visit_expr(target)?,
        ExprKind::MethodCall {
            target, arguments, ..
        } => {
            if let Some(target) = target {
                visitor.visit_expr(target)?;
            }
            for argument in arguments {
                visitor.visit_expr(argument)?;
            }
        }
        ExprKind::SuperMethodCall { arguments, .. } => {
            for argument in arguments {
                visitor.visit_expr(argument)?;
            }
        }
        ExprKind::ArrayAccess { array, index } => {
            visitor.visit_expr(array)?;
            visitor.visit_expr(index)?;
        }
        ExprKind::Unary { operand, .. } => visitor.visit_expr(operand)?,
        ExprKind::Cast { ty, operand } => {
            visitor.visit_type_ref(ty)?;
            visitor.visit_expr(operand)?;
        }
        ExprKind::Binary { left, right, .. } => {
            visitor.visit_expr(left)?;
            visitor.visit_expr(right)?;
        }
        ExprKind::InstanceOf { operand, ty } => {
            visitor.visit_expr(operand)?;
            visitor.visit_type_ref(ty)?;
        }
        ExprKind::Conditional {
            condition,
            then_expr,
            else_expr,
        } => {
            visitor.visit_expr(condition)?;
            visitor.visit_expr(then_expr)?;
            visitor.visit_expr(else_expr)?;
        }
        ExprKind::Assignment { target, value, .. } => {
            visitor.visit_expr(target)?;
            visitor.visit_expr(value)?;
        }
        ExprKind::Annotation(annotation) => visitor.visit_annotation(annotation)?,
    }
    ControlFlow::Continue(())
}

pub fn walk_type_ref<V: Visitor + ?Sized>(visitor: &mut V, ty: &TypeRef) -> ControlFlow<()> {
    for segment in ty.segments() {
        for argument in segment.arguments.iter().flatten() {
            match argument {
                TypeArgument::Type(inner) => visitor.visit_type_ref(inner)?,
                TypeArgument::Wildcard {
                    bound: Some(WildcardBound::Extends(inner) | WildcardBound::Super(inner)),
                    ..
                } => visitor.visit_type_ref(inner)?,
                TypeArgument::Wildcard { bound: None, .. } => {}
            }
        }
    }
    ControlFlow::Continue(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Ident, Literal, LiteralKind, QualifiedName};
    use crate::lexer::TokenValue;
    use crate::syntax::{TextRange, TextSize};

    struct Counter {
        exprs: usize,
        stop_at: Option<usize>,
    }

    impl Visitor for Counter {
        fn visit_expr(&mut self, expr: &Expr) -> ControlFlow<()> {
            self.exprs += 1;
            if self.stop_at == Some(self.exprs) {
                return ControlFlow::Break(());
            }
            walk_expr(self, expr)
        }
    }

    fn literal(value: i64) -> Expr {
        Expr::new(
            ExprKind::Literal(Literal {
                kind: LiteralKind::Int,
                text: value.to_string().into(),
                value: TokenValue::Integer(value),
            }),
            TextRange::default(),
        )
    }

    fn sum() -> Expr {
        Expr::new(
            ExprKind::Binary {
                op: crate::ast::BinaryOp::Add,
                left: Box::new(literal(1)),
                right: Box::new(Expr::name(QualifiedName::new([Ident::new(
                    "x",
                    TextRange::at(TextSize::new(4), 1),
                )]))),
            },
            TextRange::default(),
        )
    }

    #[test]
    fn test_walk_visits_nested_expressions() {
        let mut counter = Counter {
            exprs: 0,
            stop_at: None,
        };
        assert_eq!(counter.visit_expr(&sum()), ControlFlow::Continue(()));
        assert_eq!(counter.exprs, 3);
    }

    #[test]
    fn test_break_stops_the_walk() {
        let mut counter = Counter {
            exprs: 0,
            stop_at: Some(2),
        };
        assert_eq!(counter.visit_expr(&sum()), ControlFlow::Break(()));
        assert_eq!(counter.exprs, 2);
    }
}
