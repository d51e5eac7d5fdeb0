//! Rule actions.
//!
//! Every reduction runs exactly one [`RuleAction`]. An action pops the units of the
//! right-hand side symbols, rightmost first, and pushes one unit for the left-hand
//! side on the stack of its kind. `Pass` and `Nop` need no work: a passed value is
//! already the top unit of its stack.

mod decl;
mod expr;
mod stmt;
mod types;

use super::driver::{Accepted, Session};
use super::node::{AstNode, Declarator, GenericNode};
use super::stack::StackError;
use crate::ast::{
    Block, DocComment, Expr, ExprKind, Ident, Modifiers, Nesting, QualifiedName, Statement,
    StatementKind, TypeArgument, TypeDeclaration, TypeKind, TypeParameter, TypeRef,
};
use crate::error::Abort;
use crate::grammar::{RuleAction, ValueKind};
use crate::lexer::TokenKind;
use crate::report::{Problem, ProblemKind};
use crate::syntax::{TextRange, TextSize};

impl Session<'_> {
    pub(crate) fn apply(&mut self, action: RuleAction) -> Result<(), Abort> {
        use RuleAction as A;
        match action {
            A::Pass | A::Nop => Ok(()),
            A::Concat => {
                let kind = self.lhs_kind()?;
                Ok(self.values.concat(kind)?)
            }
            A::EmptyList => {
                let kind = self.lhs_kind()?;
                self.values.push_empty(kind);
                Ok(())
            }

            A::AcceptCompilationUnit => self.accept_compilation_unit(),
            A::AcceptHeaders => {
                self.accepted = Some(Accepted::Headers);
                Ok(())
            }
            A::AcceptBody => self.accept_body(),
            A::AcceptStatements => self.accept_statements(),
            A::AcceptExpression => self.accept_expression(),

            A::RecoveredHeader => self.recovered_header(),
            A::RecoveredInitializer => self.recovered_initializer(),
            A::RecoveredOpenBrace => self.recovered_open_brace(),
            A::RecoveredCloseBrace => self.recovered_close_brace(),
            A::RecoveredSemicolon => self.recovered_semicolon(),

            A::KeywordLiteral => self.keyword_literal(),
            A::PrimitiveType => self.primitive_type(),
            A::ClassOrInterface => self.class_or_interface(),
            A::QualifiedClassOrInterface => self.qualified_class_or_interface(),
            A::GenericType => self.generic_type(0),
            A::EnclosedGenericType => self.generic_type(1),
            A::DoublyEnclosedGenericType => self.generic_type(2),
            A::ArrayType => self.array_type(),
            A::NameArrayType => self.name_array_type(),
            A::QualifiedGenericArrayType => self.qualified_generic_array_type(),
            A::DimsOne => {
                self.values.int.push(1);
                Ok(())
            }
            A::DimsMore => {
                let dims = self.pop_int()?;
                self.values.int.push(dims + 1);
                Ok(())
            }
            A::DimsNone => {
                self.values.int.push(0);
                Ok(())
            }
            A::TypeArgument => self.type_argument(),
            A::Wildcard => self.wildcard(),
            A::WildcardExtends => self.bounded_wildcard(false),
            A::WildcardSuper => self.bounded_wildcard(true),
            A::TypeParameter => self.type_parameter(),
            A::TypeParameterBound => self.type_parameter_bound(),
            A::TypeParameterBounds => self.type_parameter_bounds(),

            A::CompilationUnit => self.compilation_unit(),
            A::DeclarationEnd => self.declaration_end(),
            A::PackageDeclaration => self.package_declaration(false),
            A::AnnotatedPackageDeclaration => self.package_declaration(true),
            A::SingleTypeImport => self.import(false, false),
            A::OnDemandImport => self.import(false, true),
            A::SingleStaticImport => self.import(true, false),
            A::StaticOnDemandImport => self.import(true, true),

            A::KeywordModifier => self.keyword_modifier(),
            A::AnnotationModifier => self.annotation_modifier(),
            A::MarkerAnnotation => self.marker_annotation(),
            A::SingleMemberAnnotation => self.single_member_annotation(),
            A::NormalAnnotation => self.normal_annotation(),
            A::ElementValuePair => self.element_value_pair(),
            A::EmptyArrayInitializer => {
                self.push_expr(ExprKind::ArrayInitializer(Vec::new()));
                Ok(())
            }
            A::ArrayInitializer => {
                let values = self.pop_exprs()?;
                self.push_expr(ExprKind::ArrayInitializer(values));
                Ok(())
            }

            A::TypeDeclaration => self.type_declaration(),
            A::ClassHeader => self.class_header(),
            A::ClassHeaderName => self.type_header_name(TypeKind::Class, true),
            A::InterfaceHeader => self.interface_header(),
            A::InterfaceHeaderName => self.type_header_name(TypeKind::Interface, true),
            A::EnumHeader => self.class_header_implements(),
            A::EnumHeaderName => self.type_header_name(TypeKind::Enum, false),
            A::EnumConstant => self.enum_constant(),
            A::EnumConstantBody => self.enum_constant_body(),
            A::EnterAnonymousClassBody => {
                self.enter_anonymous();
                Ok(())
            }

            A::FieldDeclaration => self.field_declaration(),
            A::Declarator => self.declarator(),
            A::DeclaratorInitializer => self.declarator_initializer(),
            A::MethodDeclaration | A::ConstructorDeclaration => self.method_declaration(),
            A::AbstractMethodDeclaration => self.abstract_method_declaration(),
            A::MethodHeader => self.method_header(true),
            A::MethodHeaderName => self.method_header_name(false, false),
            A::GenericMethodHeaderName => self.method_header_name(true, false),
            A::VoidMethodHeaderName => self.method_header_name(false, true),
            A::GenericVoidMethodHeaderName => self.method_header_name(true, true),
            A::FormalParameter => self.formal_parameter(),
            A::VariableArityParameter => self.variable_arity_parameter(),
            A::MethodBody => self.method_body(),
            A::NestedMethod => {
                self.nested_method();
                Ok(())
            }
            A::ConstructorHeader => self.method_header(false),
            A::ConstructorHeaderName => self.constructor_header_name(false),
            A::GenericConstructorHeaderName => self.constructor_header_name(true),
            A::ConstructorBody => self.constructor_body(),
            A::ExplicitConstructorCall => self.explicit_constructor_call(),
            A::QualifiedExplicitConstructorCall => self.qualified_explicit_constructor_call(false),
            A::NameQualifiedExplicitConstructorCall => {
                self.qualified_explicit_constructor_call(true)
            }
            A::Initializer => self.initializer(false),
            A::StaticInitializer => self.initializer(true),

            A::ModuleDeclaration => self.module_declaration(),
            A::ModuleHeader => self.module_header(false),
            A::OpenModuleHeader => self.module_header(true),
            A::RequiresStatement => self.requires_statement(false),
            A::RequiresStatementWithModifiers => self.requires_statement(true),
            A::RequiresModifier => self.requires_modifier(),
            A::MergeRequiresModifiers => self.merge_requires_modifiers(),
            A::ExportsHeader => self.package_directive_header(false),
            A::OpensHeader => self.package_directive_header(true),
            A::QualifiedPackageDirective => self.qualified_package_directive(),
            A::ModuleName => {
                let name = self.pop_name()?;
                self.push_node(AstNode::ModuleName(name));
                Ok(())
            }
            A::AppendModuleName => {
                let name = self.pop_name()?;
                Ok(self.values.ast.append(AstNode::ModuleName(name))?)
            }
            A::UsesStatement => self.uses_statement(),
            A::ProvidesStatement => self.provides_statement(),

            A::Block => self.block(),
            A::LocalType => self.local_type(),
            A::LocalVariableStatement => self.local_variable_statement(),
            A::LocalVariableDeclaration => self.local_variable_declaration(false),
            A::ModifiedLocalVariableDeclaration => self.local_variable_declaration(true),
            A::EmptyStatement => {
                self.push_statement(StatementKind::Empty);
                Ok(())
            }
            A::LabeledStatement => self.labeled_statement(),
            A::ExpressionStatement => self.expression_statement(),
            A::ExpressionStatements => self.expression_statements(),
            A::IfStatement => self.if_statement(false),
            A::IfElseStatement => self.if_statement(true),
            A::SwitchStatement => self.switch_statement(),
            A::TrailingSwitchLabels => self.trailing_switch_labels(false),
            A::SwitchBlockWithTrailingLabels => self.trailing_switch_labels(true),
            A::SwitchGroup => self.switch_group(),
            A::CaseLabel => self.switch_label(true),
            A::DefaultLabel => self.switch_label(false),
            A::WhileStatement => self.while_statement(),
            A::DoStatement => self.do_statement(),
            A::ForStatement => self.for_statement(),
            A::EnhancedForStatement => self.enhanced_for_statement(),
            A::ForEachVariable => self.for_each_variable(false),
            A::ModifiedForEachVariable => self.for_each_variable(true),
            A::BreakStatement => self.jump_statement(true, false),
            A::LabeledBreakStatement => self.jump_statement(true, true),
            A::ContinueStatement => self.jump_statement(false, false),
            A::LabeledContinueStatement => self.jump_statement(false, true),
            A::ReturnStatement => self.return_statement(),
            A::ThrowStatement => self.throw_statement(),
            A::SynchronizedStatement => self.synchronized_statement(),
            A::AssertStatement => self.assert_statement(false),
            A::AssertWithMessageStatement => self.assert_statement(true),
            A::TryStatement => self.try_statement(false, true, false),
            A::TryFinallyStatement => self.try_statement(false, false, true),
            A::TryCatchFinallyStatement => self.try_statement(false, true, true),
            A::TryWithResourcesStatement => self.try_statement(true, false, false),
            A::TryWithResourcesCatchStatement => self.try_statement(true, true, false),
            A::TryWithResourcesFinallyStatement => self.try_statement(true, false, true),
            A::TryWithResourcesCatchFinallyStatement => self.try_statement(true, true, true),
            A::Resource => self.resource(false),
            A::ModifiedResource => self.resource(true),
            A::CatchClause => self.catch_clause(),
            A::CatchParameter => self.catch_parameter(),

            A::ThisExpression => {
                self.push_expr(ExprKind::This(None));
                Ok(())
            }
            A::QualifiedThis => {
                let name = self.pop_name()?;
                self.push_expr(ExprKind::This(Some(name)));
                Ok(())
            }
            A::Parenthesized => {
                let inner = self.pop_expr()?;
                self.push_expr(ExprKind::Parenthesized(Box::new(inner)));
                Ok(())
            }
            A::NameClassLiteral => self.name_class_literal(false),
            A::NameArrayClassLiteral => self.name_class_literal(true),
            A::TypeClassLiteral => self.type_class_literal(false),
            A::ArrayTypeClassLiteral => self.type_class_literal(true),
            A::VoidClassLiteral => {
                let ty = TypeRef::void(self.rhs(0));
                self.push_expr(ExprKind::ClassLiteral(ty));
                Ok(())
            }
            A::InstanceCreation => self.instance_creation(Qualifier::None, false),
            A::AnonymousInstanceCreation => self.instance_creation(Qualifier::None, true),
            A::QualifiedInstanceCreation => self.instance_creation(Qualifier::Primary, false),
            A::QualifiedAnonymousInstanceCreation => {
                self.instance_creation(Qualifier::Primary, true)
            }
            A::NameQualifiedInstanceCreation => self.instance_creation(Qualifier::Name, false),
            A::NameQualifiedAnonymousInstanceCreation => {
                self.instance_creation(Qualifier::Name, true)
            }
            A::ArrayCreation => self.array_creation(),
            A::InitializedArrayCreation => self.initialized_array_creation(),
            A::FieldAccess => self.field_access(),
            A::SuperFieldAccess => self.super_field_access(false),
            A::QualifiedSuperFieldAccess => self.super_field_access(true),
            A::NameMethodInvocation => self.name_method_invocation(),
            A::MethodInvocation => self.method_invocation(),
            A::SuperMethodInvocation => self.super_method_invocation(false),
            A::QualifiedSuperMethodInvocation => self.super_method_invocation(true),
            A::NameArrayAccess => self.array_access(true),
            A::ArrayAccess => self.array_access(false),
            A::NameExpression => {
                let name = self.pop_name()?;
                self.values.expr.push(Expr::name(name));
                Ok(())
            }
            A::Postfix => self.unary(1),
            A::Prefix => self.unary(0),
            A::PrimitiveCast => self.primitive_cast(),
            A::NameCast => self.name_cast(),
            A::ArrayCast => self.array_cast(),
            A::Binary => self.binary(),
            A::Instanceof => self.instanceof(),
            A::Conditional => self.conditional(),
            A::Assignment => self.assignment(),
            A::AssignmentOperator => self.assignment_operator(),
        }
    }

    fn accept_compilation_unit(&mut self) -> Result<(), Abort> {
        let unit = self.pop_node()?.into_unit()?;
        self.accepted = Some(Accepted::Unit(*unit));
        Ok(())
    }

    fn accept_body(&mut self) -> Result<(), Abort> {
        let body = self.pop_node()?.into_body()?;
        self.accepted = Some(Accepted::Body(body));
        Ok(())
    }

    fn accept_statements(&mut self) -> Result<(), Abort> {
        let statements = self.pop_statements()?;
        self.accepted = Some(Accepted::Statements(statements));
        Ok(())
    }

    fn accept_expression(&mut self) -> Result<(), Abort> {
        let expr = self.pop_expr()?;
        self.accepted = Some(Accepted::Expression(expr));
        Ok(())
    }

    fn lhs_kind(&self) -> Result<ValueKind, Abort> {
        let lhs = self.tables.rule_lhs(self.reduction.rule);
        self.tables.symbol_kind(lhs).ok_or_else(|| {
            Abort::invariant(format!("{} carries no value", self.tables.symbol_name(lhs)))
        })
    }

    // Popping. Callers pop right-hand side units rightmost first.

    pub(super) fn pop_ident(&mut self) -> Result<Ident, Abort> {
        Ok(self.values.ident.pop_one()?)
    }

    pub(super) fn pop_name(&mut self) -> Result<QualifiedName, Abort> {
        Ok(QualifiedName::new(self.values.ident.pop_unit()?))
    }

    pub(super) fn pop_expr(&mut self) -> Result<Expr, Abort> {
        Ok(self.values.expr.pop_one()?)
    }

    pub(super) fn pop_exprs(&mut self) -> Result<Vec<Expr>, Abort> {
        Ok(self.values.expr.pop_unit()?)
    }

    pub(super) fn pop_int(&mut self) -> Result<i32, Abort> {
        Ok(self.values.int.pop_one()?)
    }

    pub(super) fn pop_dims(&mut self) -> Result<u32, Abort> {
        Ok(self.pop_int()?.unsigned_abs())
    }

    /// Pops a type that is still being built; diamond placement is checked where the
    /// finished type is used.
    pub(super) fn pop_type_raw(&mut self) -> Result<TypeRef, Abort> {
        Ok(self.values.generic.pop_one()?.into_type()?)
    }

    pub(super) fn pop_type(&mut self) -> Result<TypeRef, Abort> {
        let ty = self.pop_type_raw()?;
        self.check_diamond(&ty)?;
        Ok(ty)
    }

    pub(super) fn pop_types(&mut self) -> Result<Vec<TypeRef>, Abort> {
        let types = self
            .values
            .generic
            .pop_unit()?
            .into_iter()
            .map(GenericNode::into_type)
            .collect::<Result<Vec<_>, _>>()?;
        for ty in &types {
            self.check_diamond(ty)?;
        }
        Ok(types)
    }

    pub(super) fn pop_type_arguments(&mut self) -> Result<Vec<TypeArgument>, Abort> {
        Ok(self
            .values
            .generic
            .pop_unit()?
            .into_iter()
            .map(GenericNode::into_argument)
            .collect::<Result<_, _>>()?)
    }

    pub(super) fn pop_type_parameters(&mut self) -> Result<Vec<TypeParameter>, Abort> {
        Ok(self
            .values
            .generic
            .pop_unit()?
            .into_iter()
            .map(GenericNode::into_parameter)
            .collect::<Result<_, _>>()?)
    }

    pub(super) fn pop_node(&mut self) -> Result<AstNode, Abort> {
        Ok(self.values.ast.pop_one()?)
    }

    pub(super) fn pop_nodes(&mut self) -> Result<Vec<AstNode>, Abort> {
        Ok(self.values.ast.pop_unit()?)
    }

    /// Pops a unit of ast nodes, converting each with `convert`.
    pub(super) fn pop_nodes_as<T>(
        &mut self,
        convert: fn(AstNode) -> Result<T, StackError>,
    ) -> Result<Vec<T>, Abort> {
        Ok(self
            .pop_nodes()?
            .into_iter()
            .map(convert)
            .collect::<Result<_, _>>()?)
    }

    pub(super) fn pop_statement(&mut self) -> Result<Statement, Abort> {
        Ok(self.pop_node()?.into_statement()?)
    }

    pub(super) fn pop_statements(&mut self) -> Result<Vec<Statement>, Abort> {
        self.pop_nodes_as(AstNode::into_statement)
    }

    pub(super) fn pop_block(&mut self) -> Result<Block, Abort> {
        match self.pop_statement()?.into_kind() {
            StatementKind::Block(block) => Ok(block),
            _ => Err(Abort::invariant("expected a block statement")),
        }
    }

    pub(super) fn pop_declarator(&mut self) -> Result<Declarator, Abort> {
        Ok(self.pop_node()?.into_declarator()?)
    }

    /// Pops a `Modifiers` or `Modifiersopt` unit. A repeated keyword is reported and
    /// dropped.
    pub(super) fn pop_modifiers(&mut self) -> Result<Modifiers, Abort> {
        let mut modifiers = Modifiers::default();
        for node in self.pop_nodes()? {
            match node {
                AstNode::Modifier(modifier) => {
                    if modifiers.contains(modifier.kind) {
                        self.report(
                            Problem::error(ProblemKind::DuplicateModifier, modifier.range)
                                .with_argument(modifier.kind.keyword()),
                        )?;
                    } else {
                        modifiers.keywords.push(modifier);
                    }
                }
                AstNode::Annotation(annotation) => modifiers.annotations.push(annotation),
                other => return Err(wrong_node(&other, "modifier")),
            }
        }
        Ok(modifiers)
    }

    // Pushing. New values take the range of the left-hand side.

    pub(super) fn push_node(&mut self, node: AstNode) {
        self.values.ast.push(node);
    }

    pub(super) fn push_expr(&mut self, kind: ExprKind) {
        let range = self.lhs();
        self.values.expr.push(Expr::new(kind, range));
    }

    pub(super) fn push_statement(&mut self, kind: StatementKind) {
        let range = self.lhs();
        self.push_node(AstNode::Statement(Statement::new(kind, range)));
    }

    pub(super) fn push_type(&mut self, ty: TypeRef) {
        self.values.generic.push(GenericNode::Type(ty));
    }

    // Checks shared by several actions.

    /// `<>` outside instance creation.
    pub(super) fn check_diamond(&mut self, ty: &TypeRef) -> Result<(), Abort> {
        if ty.has_diamond() {
            self.report(Problem::error(ProblemKind::MisplacedDiamond, ty.range))?;
        }
        Ok(())
    }

    /// Reports every keyword modifier in `modifiers` that `allowed` rejects, and every
    /// annotation unless `annotations` is set.
    pub(super) fn check_modifiers(
        &mut self,
        modifiers: &Modifiers,
        target: &'static str,
        allowed: fn(crate::ast::ModifierKind) -> bool,
        annotations: bool,
    ) -> Result<(), Abort> {
        for modifier in &modifiers.keywords {
            if !allowed(modifier.kind) {
                self.report(
                    Problem::error(ProblemKind::IllegalModifier, modifier.range)
                        .with_argument(modifier.kind.keyword())
                        .with_argument(target),
                )?;
            }
        }
        if !annotations {
            for annotation in &modifiers.annotations {
                self.report(
                    Problem::error(ProblemKind::IllegalModifier, annotation.range)
                        .with_argument(format!("@{}", annotation.name))
                        .with_argument(target),
                )?;
            }
        }
        Ok(())
    }

    /// The doc comment of a declaration starting at `start`. A `@deprecated` tag marks
    /// `modifiers`.
    pub(super) fn take_doc(&self, start: TextSize, modifiers: &mut Modifiers) -> Option<DocComment> {
        if !self.options.doc_comments {
            return None;
        }
        let doc = self
            .source
            .doc_comment_before(start)
            .and_then(|raw| self.docs.parse(raw))?;
        modifiers.deprecated |= doc.deprecated;
        Some(doc)
    }

    // Nesting counters.

    /// Where a type whose header is being reduced now is declared.
    pub(super) fn nesting(&self) -> Nesting {
        if self.nested_type == 0 {
            Nesting::TopLevel
        } else if self.nested_method.last().is_some_and(|&methods| methods > 0) {
            Nesting::Local
        } else {
            Nesting::Member
        }
    }

    pub(super) fn enter_type(&mut self) {
        self.nested_type += 1;
        self.nested_method.push(0);
    }

    pub(super) fn leave_type(&mut self) {
        self.nested_type = self.nested_type.saturating_sub(1);
        self.nested_method.pop();
    }

    fn enter_anonymous(&mut self) {
        self.enter_type();
        if self.diet {
            self.diet_level += 1;
        }
    }

    pub(super) fn leave_anonymous(&mut self) {
        self.leave_type();
        if self.diet {
            self.diet_level = self.diet_level.saturating_sub(1);
        }
    }

    /// Entering a method body. Under a diet parse, a body outside any anonymous class
    /// is skipped: the flag pushed here tells the body action it never saw statements.
    fn nested_method(&mut self) {
        let jump = self.diet && self.diet_level == 0 && self.lookahead.kind == TokenKind::LBrace;
        self.jump_pending = jump;
        if let Some(methods) = self.nested_method.last_mut() {
            *methods += 1;
        }
        self.values.int.push(i32::from(jump));
    }

    pub(super) fn leave_method(&mut self) {
        if let Some(methods) = self.nested_method.last_mut() {
            *methods = methods.saturating_sub(1);
        }
    }

    /// The class body of an anonymous class or an enum constant.
    pub(super) fn anonymous_body(
        &self,
        range: TextRange,
        members: Vec<AstNode>,
    ) -> Result<TypeDeclaration, Abort> {
        let name = Ident::new("", TextRange::empty(range.start()));
        let mut body = TypeDeclaration::new(TypeKind::Class, name, range);
        body.nesting = Nesting::Anonymous;
        body.body_range = Some(range);
        decl::fill_members(&mut body, members)?;
        Ok(body)
    }
}

/// How an instance creation expression is qualified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum Qualifier {
    None,
    /// `outer.new Inner()`
    Primary,
    /// `a.b.new Inner()`
    Name,
}

pub(super) fn wrong_node(node: &AstNode, expected: &'static str) -> Abort {
    StackError::WrongNode {
        kind: "ast",
        expected,
        found: node.name(),
    }
    .into()
}

pub(super) fn unexpected_token(kind: TokenKind) -> Abort {
    Abort::invariant(format!("unexpected {kind:?} in a reduction"))
}

/// `ty` with `dims` more array dimensions, for declarators such as `int x[]`.
pub(super) fn with_dims(ty: &TypeRef, dims: u32) -> TypeRef {
    let mut ty = ty.clone();
    ty.dims += dims;
    ty
}

#[cfg(test)]
mod tests {
    use crate::ast::{Member, Nesting, StatementKind, TypeRefKind};
    use crate::parser::{Parser, ParserOptions};
    use crate::report::{CollectingReporter, ProblemKind};

    fn parse(source: &str) -> (crate::ast::CompilationUnit, CollectingReporter) {
        let options = ParserOptions::default().with_stack_balance_check(true);
        let mut parser = Parser::new(options).expect("grammar loads");
        let mut reporter = CollectingReporter::new();
        let outcome = parser
            .parse_compilation_unit(source, &mut reporter)
            .expect("no abort");
        (outcome.unit, reporter)
    }

    fn kinds(reporter: &CollectingReporter) -> Vec<ProblemKind> {
        reporter.problems().iter().map(|problem| problem.kind).collect()
    }

    #[test]
    fn test_duplicate_modifier_reported_once() {
        let (unit, reporter) = parse("public public class A {}");
        assert_eq!(kinds(&reporter), vec![ProblemKind::DuplicateModifier]);
        assert_eq!(unit.types[0].modifiers.keywords.len(), 1);
    }

    #[test]
    fn test_nesting_of_member_and_local_types() {
        let (unit, reporter) = parse("class A { class B {} void m() { class C {} } }");
        assert!(reporter.problems().is_empty());
        let outer = &unit.types[0];
        assert_eq!(outer.nesting, Nesting::TopLevel);
        let member = outer.member_types().next().expect("member type");
        assert_eq!(member.nesting, Nesting::Member);
        let method = outer.method_named("m").expect("method");
        let statements = method
            .body
            .as_ref()
            .and_then(|body| body.statements.as_ref())
            .expect("parsed body");
        match &statements[0].kind {
            StatementKind::LocalType(local) => assert_eq!(local.nesting, Nesting::Local),
            other => panic!("expected a local type, got {other:?}"),
        }
    }

    #[test]
    fn test_declarator_dims_extend_the_type() {
        let (unit, _) = parse("class A { int a[], b; }");
        let fields: Vec<_> = unit.types[0].fields().collect();
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].ty.dims, 1);
        assert_eq!(fields[1].ty.dims, 0);
        assert_eq!(fields[0].range, fields[1].range);
        assert!(matches!(fields[0].ty.kind, TypeRefKind::Primitive(_)));
    }

    #[test]
    fn test_diamond_outside_new() {
        let (_, reporter) = parse("class A { java.util.List<> x = new java.util.ArrayList<>(); }");
        assert_eq!(kinds(&reporter), vec![ProblemKind::MisplacedDiamond]);
    }

    #[test]
    fn test_interface_constructor() {
        let (unit, reporter) = parse("interface I { I() {} }");
        assert_eq!(kinds(&reporter), vec![ProblemKind::InterfaceConstructor]);
        assert!(matches!(unit.types[0].members[0], Member::Method(_)));
    }

    #[test]
    fn test_deprecated_doc_tag_marks_modifiers() {
        let (unit, _) = parse("/** Old.\n @deprecated */ class A {}");
        let ty = &unit.types[0];
        assert!(ty.modifiers.deprecated);
        assert_eq!(ty.doc.as_ref().map(|doc| doc.summary.as_str()), Some("Old."));
    }
}
