//! Values that live on the `ast` and `generic` stacks while a construct is incomplete.

use super::stack::StackError;
use crate::ast::{
    Annotation, Body, CatchClause, CatchParameter, CompilationUnit, ElementValuePair,
    EnumConstant, Expr, FieldDeclaration, Ident, ImportDeclaration, Initializer, LocalVariable,
    MethodDeclaration, Modifier, ModuleDeclaration, ModuleDirective, PackageDeclaration,
    Parameter, QualifiedName, Statement, SwitchGroup, SwitchLabel, TypeArgument,
    TypeDeclaration, TypeParameter, TypeRef,
};
use crate::syntax::TextRange;

/// One value of the `ast` stack.
#[derive(Debug, Clone, PartialEq)]
pub enum AstNode {
    Unit(Box<CompilationUnit>),
    Package(PackageDeclaration),
    Import(ImportDeclaration),
    Type(Box<TypeDeclaration>),
    Field(FieldDeclaration),
    Method(Box<MethodDeclaration>),
    Initializer(Initializer),
    EnumConstant(EnumConstant),
    Module(Box<ModuleDeclaration>),
    Directive(ModuleDirective),
    /// One entry of an `exports ... to` list.
    ModuleName(QualifiedName),
    Modifier(Modifier),
    Annotation(Annotation),
    ElementValuePair(ElementValuePair),
    Parameter(Parameter),
    Declarator(Declarator),
    Body(Body),
    Statement(Statement),
    /// A for-each variable or a try resource.
    Variable(LocalVariable),
    SwitchGroup(SwitchGroup),
    SwitchLabel(SwitchLabel),
    CatchClause(CatchClause),
    CatchParameter(CatchParameter),
}

/// `name[] = initializer` before the declared type is known.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarator {
    pub name: Ident,
    pub dims: u32,
    pub initializer: Option<Expr>,
    pub range: TextRange,
}

/// One value of the `generic` stack.
#[derive(Debug, Clone, PartialEq)]
pub enum GenericNode {
    Type(TypeRef),
    Argument(TypeArgument),
    Parameter(TypeParameter),
}

impl AstNode {
    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Self::Unit(_) => "compilation unit",
            Self::Package(_) => "package",
            Self::Import(_) => "import",
            Self::Type(_) => "type",
            Self::Field(_) => "field",
            Self::Method(_) => "method",
            Self::Initializer(_) => "initializer",
            Self::EnumConstant(_) => "enum constant",
            Self::Module(_) => "module",
            Self::Directive(_) => "directive",
            Self::ModuleName(_) => "module name",
            Self::Modifier(_) => "modifier",
            Self::Annotation(_) => "annotation",
            Self::ElementValuePair(_) => "element value pair",
            Self::Parameter(_) => "parameter",
            Self::Declarator(_) => "declarator",
            Self::Body(_) => "body",
            Self::Statement(_) => "statement",
            Self::Variable(_) => "variable",
            Self::SwitchGroup(_) => "switch group",
            Self::SwitchLabel(_) => "switch label",
            Self::CatchClause(_) => "catch clause",
            Self::CatchParameter(_) => "catch parameter",
        }
    }

    fn mismatch(&self, expected: &'static str) -> StackError {
        StackError::WrongNode {
            kind: "ast",
            expected,
            found: self.name(),
        }
    }
}

impl GenericNode {
    pub(crate) const fn name(&self) -> &'static str {
        match self {
            Self::Type(_) => "type",
            Self::Argument(_) => "type argument",
            Self::Parameter(_) => "type parameter",
        }
    }

    fn mismatch(&self, expected: &'static str) -> StackError {
        StackError::WrongNode {
            kind: "generic",
            expected,
            found: self.name(),
        }
    }

    pub fn into_type(self) -> Result<TypeRef, StackError> {
        match self {
            Self::Type(ty) => Ok(ty),
            other => Err(other.mismatch("type")),
        }
    }

    pub fn into_argument(self) -> Result<TypeArgument, StackError> {
        match self {
            Self::Argument(argument) => Ok(argument),
            other => Err(other.mismatch("type argument")),
        }
    }

    pub fn into_parameter(self) -> Result<TypeParameter, StackError> {
        match self {
            Self::Parameter(parameter) => Ok(parameter),
            other => Err(other.mismatch("type parameter")),
        }
    }
}

/// Generates `AstNode::into_*` extractors.
macro_rules! extractors {
    ($($method:ident => $variant:ident($ty:ty), $label:literal;)*) => {
        impl AstNode {
            $(
                pub fn $method(self) -> Result<$ty, StackError> {
                    match self {
                        Self::$variant(value) => Ok(value),
                        other => Err(other.mismatch($label)),
                    }
                }
            )*
        }
    };
}

extractors! {
    into_unit => Unit(Box<CompilationUnit>), "compilation unit";
    into_type => Type(Box<TypeDeclaration>), "type";
    into_method => Method(Box<MethodDeclaration>), "method";
    into_enum_constant => EnumConstant(EnumConstant), "enum constant";
    into_module => Module(Box<ModuleDeclaration>), "module";
    into_directive => Directive(ModuleDirective), "directive";
    into_module_name => ModuleName(QualifiedName), "module name";
    into_element_value_pair => ElementValuePair(ElementValuePair), "element value pair";
    into_parameter => Parameter(Parameter), "parameter";
    into_declarator => Declarator(Declarator), "declarator";
    into_body => Body(Body), "body";
    into_statement => Statement(Statement), "statement";
    into_variable => Variable(LocalVariable), "variable";
    into_switch_group => SwitchGroup(SwitchGroup), "switch group";
    into_switch_label => SwitchLabel(SwitchLabel), "switch label";
    into_catch_clause => CatchClause(CatchClause), "catch clause";
    into_catch_parameter => CatchParameter(CatchParameter), "catch parameter";
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{PrimitiveType, StatementKind};

    #[test]
    fn test_extractor_reports_found_node() {
        let node = AstNode::Statement(Statement::new(StatementKind::Empty, TextRange::default()));
        assert_eq!(
            node.into_body(),
            Err(StackError::WrongNode {
                kind: "ast",
                expected: "body",
                found: "statement",
            })
        );
    }

    #[test]
    fn test_generic_extractors() {
        let ty = TypeRef::primitive(PrimitiveType::Int, TextRange::default());
        assert_eq!(GenericNode::Type(ty.clone()).into_type(), Ok(ty.clone()));
        assert!(GenericNode::Type(ty).into_parameter().is_err());
    }
}
