//! Compilation units, type declarations, members and modules.

use super::{unexpected_token, with_dims, wrong_node};
use crate::ast::{
    Annotation, AnnotationArguments, Body, CompilationUnit, ConstructorCallKind, ElementValuePair,
    EnumConstant, Expr, ExprKind, FieldDeclaration, ImportDeclaration, Initializer, Member,
    MethodDeclaration, Modifier, ModifierKind, Modifiers, ModuleDeclaration, ModuleDirective,
    ModuleDirectiveKind, PackageDeclaration, Parameter, QualifiedName, StatementKind,
    TypeDeclaration, TypeKind, TypeRef,
};
use crate::error::Abort;
use crate::lexer::TokenKind;
use crate::parser::driver::Session;
use crate::parser::node::AstNode;
use crate::report::{Problem, ProblemKind};

const REQUIRES_TRANSITIVE: i32 = 1;
const REQUIRES_STATIC: i32 = 2;

/// Sorts the nodes of a class or enum body into `ty`.
pub(super) fn fill_members(ty: &mut TypeDeclaration, nodes: Vec<AstNode>) -> Result<(), Abort> {
    for node in nodes {
        match node {
            AstNode::Field(field) => ty.members.push(Member::Field(field)),
            AstNode::Method(method) => ty.members.push(Member::Method(*method)),
            AstNode::Initializer(init) => ty.members.push(Member::Initializer(init)),
            AstNode::Type(nested) => ty.members.push(Member::Type(nested)),
            AstNode::EnumConstant(constant) => ty.enum_constants.push(constant),
            other => return Err(wrong_node(&other, "member")),
        }
    }
    Ok(())
}

impl Session<'_> {
    pub(super) fn compilation_unit(&mut self) -> Result<(), Abort> {
        let items = self.pop_nodes()?;
        let mut unit = CompilationUnit::empty(self.lhs());
        let mut seen_other = false;
        for item in items {
            match item {
                AstNode::Package(package) => {
                    if seen_other || unit.package.is_some() {
                        self.report(Problem::error(ProblemKind::MisplacedPackage, package.range))?;
                    }
                    if unit.package.is_none() {
                        unit.package = Some(package);
                    }
                }
                AstNode::Import(import) => {
                    if !unit.types.is_empty() || unit.module.is_some() {
                        self.report(Problem::error(ProblemKind::ImportAfterType, import.range))?;
                    }
                    unit.imports.push(import);
                }
                AstNode::Type(ty) => {
                    if unit.module.is_some() {
                        self.report(Problem::error(ProblemKind::ModuleWithTypes, ty.range))?;
                    }
                    unit.types.push(*ty);
                }
                AstNode::Module(module) => {
                    if unit.module.is_some() {
                        self.report(Problem::error(ProblemKind::DuplicateModule, module.range))?;
                        continue;
                    }
                    if !unit.types.is_empty() {
                        self.report(Problem::error(ProblemKind::ModuleWithTypes, module.range))?;
                    }
                    unit.module = Some(*module);
                }
                other => return Err(wrong_node(&other, "top-level item")),
            }
            seen_other = !unit.imports.is_empty() || !unit.types.is_empty() || unit.module.is_some();
        }
        self.push_node(AstNode::Unit(Box::new(unit)));
        Ok(())
    }

    /// Widens a package, import or directive to include its `;`.
    pub(super) fn declaration_end(&mut self) -> Result<(), Abort> {
        let range = self.lhs();
        let node = match self.pop_node()? {
            AstNode::Package(mut package) => {
                package.range = range;
                AstNode::Package(package)
            }
            AstNode::Import(mut import) => {
                import.range = range;
                AstNode::Import(import)
            }
            AstNode::Directive(mut directive) => {
                directive.range = range;
                AstNode::Directive(directive)
            }
            other => return Err(wrong_node(&other, "declaration")),
        };
        self.push_node(node);
        Ok(())
    }

    pub(super) fn package_declaration(&mut self, annotated: bool) -> Result<(), Abort> {
        let name = self.pop_name()?;
        let annotations = if annotated {
            let modifiers = self.pop_modifiers()?;
            self.check_modifiers(&modifiers, "package", |_| false, true)?;
            modifiers.annotations
        } else {
            Vec::new()
        };
        self.push_node(AstNode::Package(PackageDeclaration {
            annotations,
            name,
            range: self.lhs(),
        }));
        Ok(())
    }

    pub(super) fn import(&mut self, is_static: bool, on_demand: bool) -> Result<(), Abort> {
        let name = self.pop_name()?;
        self.push_node(AstNode::Import(ImportDeclaration {
            name,
            is_static,
            on_demand,
            range: self.lhs(),
        }));
        Ok(())
    }

    pub(super) fn keyword_modifier(&mut self) -> Result<(), Abort> {
        let token = self.rhs_token(0)?;
        let kind = ModifierKind::from_token(token).ok_or_else(|| unexpected_token(token))?;
        self.push_node(AstNode::Modifier(Modifier {
            kind,
            range: self.lhs(),
        }));
        Ok(())
    }

    pub(super) fn annotation_modifier(&mut self) -> Result<(), Abort> {
        let expr = self.pop_expr()?;
        match expr.into_kind() {
            ExprKind::Annotation(annotation) => {
                self.push_node(AstNode::Annotation(*annotation));
                Ok(())
            }
            _ => Err(Abort::invariant("modifier reduced from a non-annotation")),
        }
    }

    pub(super) fn marker_annotation(&mut self) -> Result<(), Abort> {
        let name = self.pop_name()?;
        self.push_annotation(name, AnnotationArguments::None);
        Ok(())
    }

    pub(super) fn single_member_annotation(&mut self) -> Result<(), Abort> {
        let value = self.pop_expr()?;
        let name = self.pop_name()?;
        self.push_annotation(name, AnnotationArguments::Single(value));
        Ok(())
    }

    pub(super) fn normal_annotation(&mut self) -> Result<(), Abort> {
        let pairs = self.pop_nodes_as(AstNode::into_element_value_pair)?;
        let name = self.pop_name()?;
        self.push_annotation(name, AnnotationArguments::Pairs(pairs));
        Ok(())
    }

    fn push_annotation(&mut self, name: QualifiedName, arguments: AnnotationArguments) {
        let range = self.lhs();
        let annotation = Annotation {
            name,
            arguments,
            range,
        };
        self.push_expr(ExprKind::Annotation(Box::new(annotation)));
    }

    pub(super) fn element_value_pair(&mut self) -> Result<(), Abort> {
        let value = self.pop_expr()?;
        let name = self.pop_ident()?;
        self.push_node(AstNode::ElementValuePair(ElementValuePair {
            name,
            value,
            range: self.lhs(),
        }));
        Ok(())
    }

    // Types

    /// `Modifiersopt class|interface|enum Identifier TypeParametersopt`
    pub(super) fn type_header_name(&mut self, kind: TypeKind, generic: bool) -> Result<(), Abort> {
        let type_parameters = if generic {
            self.pop_type_parameters()?
        } else {
            Vec::new()
        };
        let name = self.pop_ident()?;
        let mut modifiers = self.pop_modifiers()?;
        let range = self.lhs();
        let doc = self.take_doc(range.start(), &mut modifiers);

        let mut ty = TypeDeclaration::new(kind, name, range);
        ty.modifiers = modifiers;
        ty.type_parameters = type_parameters;
        ty.doc = doc;
        ty.nesting = self.nesting();
        self.enter_type();
        self.push_node(AstNode::Type(Box::new(ty)));
        Ok(())
    }

    pub(super) fn class_header(&mut self) -> Result<(), Abort> {
        let interfaces = self.pop_types()?;
        let superclass = self.values.generic.pop_optional()?;
        let mut ty = self.pop_node()?.into_type()?;
        ty.superclass = superclass.map(|node| node.into_type()).transpose()?;
        if let Some(superclass) = &ty.superclass {
            self.check_diamond(superclass)?;
        }
        ty.interfaces = interfaces;
        ty.range = self.lhs();
        self.push_node(AstNode::Type(ty));
        Ok(())
    }

    /// Interface `extends` and enum `implements` both land in `interfaces`.
    pub(super) fn interface_header(&mut self) -> Result<(), Abort> {
        self.class_header_implements()
    }

    pub(super) fn class_header_implements(&mut self) -> Result<(), Abort> {
        let interfaces = self.pop_types()?;
        let mut ty = self.pop_node()?.into_type()?;
        ty.interfaces = interfaces;
        ty.range = self.lhs();
        self.push_node(AstNode::Type(ty));
        Ok(())
    }

    /// `Header Body`
    pub(super) fn type_declaration(&mut self) -> Result<(), Abort> {
        let members = self.pop_nodes()?;
        let mut ty = self.pop_node()?.into_type()?;
        self.leave_type();

        if ty.kind == TypeKind::Interface {
            for member in &members {
                match member {
                    AstNode::Method(method) if method.is_constructor() => {
                        self.report(
                            Problem::error(ProblemKind::InterfaceConstructor, method.name.range)
                                .with_argument(ty.name.name.clone()),
                        )?;
                    }
                    AstNode::Initializer(init) => {
                        self.report(
                            Problem::error(ProblemKind::InterfaceInitializer, init.range)
                                .with_argument(ty.name.name.clone()),
                        )?;
                    }
                    _ => {}
                }
            }
        }

        ty.range = self.lhs();
        ty.body_range = Some(self.rhs(1));
        fill_members(&mut ty, members)?;
        self.push_node(AstNode::Type(ty));
        Ok(())
    }

    /// `Modifiersopt Identifier Argumentsopt`
    pub(super) fn enum_constant(&mut self) -> Result<(), Abort> {
        let arguments = self.pop_exprs()?;
        let name = self.pop_ident()?;
        let mut modifiers = self.pop_modifiers()?;
        let range = self.lhs();
        let doc = self.take_doc(range.start(), &mut modifiers);
        self.push_node(AstNode::EnumConstant(EnumConstant {
            modifiers,
            name,
            arguments,
            body: None,
            doc,
            range,
        }));
        Ok(())
    }

    /// `EnumConstantHeader EnterAnonymousClassBody ClassBody`
    pub(super) fn enum_constant_body(&mut self) -> Result<(), Abort> {
        let members = self.pop_nodes()?;
        let mut constant = self.pop_node()?.into_enum_constant()?;
        self.leave_anonymous();
        let body = self.anonymous_body(self.rhs(2), members)?;
        constant.body = Some(Box::new(body));
        constant.range = self.lhs();
        self.push_node(AstNode::EnumConstant(constant));
        Ok(())
    }

    // Fields

    /// One field per declarator, all sharing the statement range and doc comment.
    pub(super) fn field_declaration(&mut self) -> Result<(), Abort> {
        let declarators = self.pop_nodes_as(AstNode::into_declarator)?;
        let ty = self.pop_type()?;
        let mut modifiers = self.pop_modifiers()?;
        let range = self.lhs();
        let doc = self.take_doc(range.start(), &mut modifiers);

        let fields = declarators.into_iter().map(|declarator| {
            AstNode::Field(FieldDeclaration {
                modifiers: modifiers.clone(),
                ty: with_dims(&ty, declarator.dims),
                name: declarator.name,
                initializer: declarator.initializer,
                doc: doc.clone(),
                range,
                declarator_range: declarator.range,
            })
        });
        self.values.ast.push_unit(fields);
        Ok(())
    }

    /// `Identifier Dimsopt`
    pub(super) fn declarator(&mut self) -> Result<(), Abort> {
        let dims = self.pop_dims()?;
        let name = self.pop_ident()?;
        self.push_node(AstNode::Declarator(crate::parser::node::Declarator {
            name,
            dims,
            initializer: None,
            range: self.lhs(),
        }));
        Ok(())
    }

    pub(super) fn declarator_initializer(&mut self) -> Result<(), Abort> {
        let initializer = self.pop_expr()?;
        let mut declarator = self.pop_declarator()?;
        declarator.initializer = Some(initializer);
        declarator.range = self.lhs();
        self.push_node(AstNode::Declarator(declarator));
        Ok(())
    }

    // Methods and constructors

    /// The four `MethodHeaderName` shapes: with or without type parameters, with a
    /// return type or `void`.
    pub(super) fn method_header_name(&mut self, generic: bool, void: bool) -> Result<(), Abort> {
        let name = self.pop_ident()?;
        let return_type = if void {
            TypeRef::void(self.rhs(if generic { 2 } else { 1 }))
        } else {
            self.pop_type()?
        };
        self.method_start(generic, Some(return_type), name)
    }

    pub(super) fn constructor_header_name(&mut self, generic: bool) -> Result<(), Abort> {
        let name = self.pop_ident()?;
        self.method_start(generic, None, name)
    }

    fn method_start(
        &mut self,
        generic: bool,
        return_type: Option<TypeRef>,
        name: crate::ast::Ident,
    ) -> Result<(), Abort> {
        let type_parameters = if generic {
            self.pop_type_parameters()?
        } else {
            Vec::new()
        };
        let mut modifiers = self.pop_modifiers()?;
        let range = self.lhs();
        let doc = self.take_doc(range.start(), &mut modifiers);
        self.push_node(AstNode::Method(Box::new(MethodDeclaration {
            modifiers,
            type_parameters,
            return_type,
            name,
            parameters: Vec::new(),
            throws: Vec::new(),
            body: None,
            doc,
            range,
            recovered: false,
        })));
        Ok(())
    }

    /// `Name FormalParameterListopt ')' [Dimsopt] MethodHeaderThrowsClauseopt`; only
    /// method headers carry the legacy dimensions after `)`.
    pub(super) fn method_header(&mut self, with_dims: bool) -> Result<(), Abort> {
        let throws = self.pop_types()?;
        let dims = if with_dims { self.pop_dims()? } else { 0 };
        let parameters = self.pop_nodes_as(AstNode::into_parameter)?;
        let mut method = self.pop_node()?.into_method()?;

        if let Some(return_type) = &mut method.return_type {
            return_type.dims += dims;
        }
        if let Some((_, init)) = parameters.split_last() {
            for parameter in init.iter().filter(|parameter| parameter.variable_arity) {
                self.report(
                    Problem::error(ProblemKind::MisplacedVarargs, parameter.range)
                        .with_argument(parameter.name.name.clone()),
                )?;
            }
        }
        method.parameters = parameters;
        method.throws = throws;
        method.range = self.lhs();
        self.push_node(AstNode::Method(method));
        Ok(())
    }

    /// `Modifiersopt Type VariableDeclaratorId`
    pub(super) fn formal_parameter(&mut self) -> Result<(), Abort> {
        let declarator = self.pop_declarator()?;
        let ty = self.pop_type()?;
        let modifiers = self.pop_modifiers()?;
        self.push_node(AstNode::Parameter(Parameter {
            modifiers,
            ty: with_dims(&ty, declarator.dims),
            name: declarator.name,
            variable_arity: false,
            range: self.lhs(),
        }));
        Ok(())
    }

    /// `Modifiersopt Type '...' Identifier`
    pub(super) fn variable_arity_parameter(&mut self) -> Result<(), Abort> {
        let name = self.pop_ident()?;
        let ty = self.pop_type()?;
        let modifiers = self.pop_modifiers()?;
        self.push_node(AstNode::Parameter(Parameter {
            modifiers,
            ty,
            name,
            variable_arity: true,
            range: self.lhs(),
        }));
        Ok(())
    }

    /// `NestedMethod '{' BlockStatementsopt '}'`. A skipped body keeps no statements.
    pub(super) fn method_body(&mut self) -> Result<(), Abort> {
        let statements = self.pop_statements()?;
        let jumped = self.pop_int()? != 0;
        self.leave_method();
        self.push_node(AstNode::Body(Body {
            range: self.rhs(1).cover(self.rhs(3)),
            statements: (!jumped).then_some(statements),
        }));
        Ok(())
    }

    /// `NestedMethod '{' ExplicitConstructorInvocation BlockStatementsopt '}'`
    pub(super) fn constructor_body(&mut self) -> Result<(), Abort> {
        let rest = self.pop_statements()?;
        let call = self.pop_statement()?;
        let jumped = self.pop_int()? != 0;
        self.leave_method();
        let statements = (!jumped).then(|| {
            let mut statements = Vec::with_capacity(rest.len() + 1);
            statements.push(call);
            statements.extend(rest);
            statements
        });
        self.push_node(AstNode::Body(Body {
            range: self.rhs(1).cover(self.rhs(4)),
            statements,
        }));
        Ok(())
    }

    /// `Header Body` for both methods and constructors.
    pub(super) fn method_declaration(&mut self) -> Result<(), Abort> {
        let body = self.pop_node()?.into_body()?;
        let mut method = self.pop_node()?.into_method()?;
        method.body = Some(body);
        method.range = self.lhs();
        self.push_node(AstNode::Method(method));
        Ok(())
    }

    pub(super) fn abstract_method_declaration(&mut self) -> Result<(), Abort> {
        let mut method = self.pop_node()?.into_method()?;
        method.range = self.lhs();
        self.push_node(AstNode::Method(method));
        Ok(())
    }

    /// `this(...);` or `super(...);`
    pub(super) fn explicit_constructor_call(&mut self) -> Result<(), Abort> {
        let arguments = self.pop_exprs()?;
        let kind = match self.rhs_token(0)? {
            TokenKind::This => ConstructorCallKind::This,
            TokenKind::Super => ConstructorCallKind::Super,
            other => return Err(unexpected_token(other)),
        };
        self.push_statement(StatementKind::ExplicitConstructorCall {
            kind,
            qualifier: None,
            arguments,
        });
        Ok(())
    }

    /// `outer.super(...);` with a primary or a name before the dot.
    pub(super) fn qualified_explicit_constructor_call(&mut self, name: bool) -> Result<(), Abort> {
        let arguments = self.pop_exprs()?;
        let qualifier = if name {
            Expr::name(self.pop_name()?)
        } else {
            self.pop_expr()?
        };
        self.push_statement(StatementKind::ExplicitConstructorCall {
            kind: ConstructorCallKind::Super,
            qualifier: Some(Box::new(qualifier)),
            arguments,
        });
        Ok(())
    }

    /// `[Modifiers] NestedMethod Block`. Only `static` may precede an initializer.
    pub(super) fn initializer(&mut self, with_modifiers: bool) -> Result<(), Abort> {
        let block = self.pop_block()?;
        let jumped = self.pop_int()? != 0;
        self.leave_method();
        let modifiers = if with_modifiers {
            let modifiers = self.pop_modifiers()?;
            self.check_modifiers(
                &modifiers,
                "initializer",
                |kind| kind == ModifierKind::Static,
                false,
            )?;
            modifiers
        } else {
            Modifiers::default()
        };
        self.push_node(AstNode::Initializer(Initializer {
            modifiers,
            body: Body {
                range: block.range,
                statements: (!jumped).then_some(block.statements),
            },
            range: self.lhs(),
        }));
        Ok(())
    }

    // Modules

    pub(super) fn module_declaration(&mut self) -> Result<(), Abort> {
        let directives = self.pop_nodes_as(AstNode::into_directive)?;
        let mut module = self.pop_node()?.into_module()?;
        module.directives = directives;
        module.range = self.lhs();
        self.push_node(AstNode::Module(module));
        Ok(())
    }

    /// `Modifiersopt ['open'] 'module' Name`. Modules take annotations only.
    pub(super) fn module_header(&mut self, open: bool) -> Result<(), Abort> {
        let name = self.pop_name()?;
        let mut modifiers = self.pop_modifiers()?;
        self.check_modifiers(&modifiers, "module", |_| false, true)?;
        modifiers.keywords.clear();
        let range = self.lhs();
        let doc = self.take_doc(range.start(), &mut modifiers);
        self.push_node(AstNode::Module(Box::new(ModuleDeclaration {
            modifiers,
            open,
            name,
            directives: Vec::new(),
            doc,
            range,
            recovered: false,
        })));
        Ok(())
    }

    pub(super) fn requires_statement(&mut self, with_modifiers: bool) -> Result<(), Abort> {
        let module = self.pop_name()?;
        let bits = if with_modifiers { self.pop_int()? } else { 0 };
        self.push_directive(ModuleDirectiveKind::Requires {
            module,
            transitive: bits & REQUIRES_TRANSITIVE != 0,
            is_static: bits & REQUIRES_STATIC != 0,
        });
        Ok(())
    }

    pub(super) fn requires_modifier(&mut self) -> Result<(), Abort> {
        let bit = match self.rhs_token(0)? {
            TokenKind::Transitive => REQUIRES_TRANSITIVE,
            TokenKind::Static => REQUIRES_STATIC,
            other => return Err(unexpected_token(other)),
        };
        self.values.int.push(bit);
        Ok(())
    }

    /// `RequiresModifiers RequiresModifier`
    pub(super) fn merge_requires_modifiers(&mut self) -> Result<(), Abort> {
        let next = self.pop_int()?;
        let seen = self.pop_int()?;
        if seen & next != 0 {
            let keyword = if next == REQUIRES_TRANSITIVE {
                "transitive"
            } else {
                "static"
            };
            self.report(
                Problem::error(ProblemKind::DuplicateModifier, self.rhs(1)).with_argument(keyword),
            )?;
        }
        self.values.int.push(seen | next);
        Ok(())
    }

    /// `exports Name` or `opens Name`, widened by the statement action that follows.
    pub(super) fn package_directive_header(&mut self, opens: bool) -> Result<(), Abort> {
        let package = self.pop_name()?;
        let targets = Vec::new();
        self.push_directive(if opens {
            ModuleDirectiveKind::Opens { package, targets }
        } else {
            ModuleDirectiveKind::Exports { package, targets }
        });
        Ok(())
    }

    /// `Header 'to' TargetModuleList ';'`
    pub(super) fn qualified_package_directive(&mut self) -> Result<(), Abort> {
        let names = self.pop_nodes_as(AstNode::into_module_name)?;
        let mut directive = self.pop_node()?.into_directive()?;
        match &mut directive.kind {
            ModuleDirectiveKind::Exports { targets, .. }
            | ModuleDirectiveKind::Opens { targets, .. } => *targets = names,
            _ => return Err(Abort::invariant("qualified directive is not exports or opens")),
        }
        directive.range = self.lhs();
        self.push_node(AstNode::Directive(directive));
        Ok(())
    }

    pub(super) fn uses_statement(&mut self) -> Result<(), Abort> {
        let service = self.pop_type()?;
        self.push_directive(ModuleDirectiveKind::Uses { service });
        Ok(())
    }

    pub(super) fn provides_statement(&mut self) -> Result<(), Abort> {
        let implementations = self.pop_types()?;
        let service = self.pop_type()?;
        self.push_directive(ModuleDirectiveKind::Provides {
            service,
            implementations,
        });
        Ok(())
    }

    fn push_directive(&mut self, kind: ModuleDirectiveKind) {
        let range = self.lhs();
        self.push_node(AstNode::Directive(ModuleDirective { kind, range }));
    }
}
