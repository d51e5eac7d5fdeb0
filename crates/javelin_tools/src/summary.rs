//! Declaration counts for a parsed compilation unit.

use javelin::ast::{
    FieldDeclaration, Initializer, MethodDeclaration, ModuleDeclaration, Nesting, Statement,
    TypeDeclaration,
};
use javelin::{CompilationUnit, Visitor};
use serde::Serialize;
use std::ops::ControlFlow;

/// What a unit declares, as printed by `javelin parse`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UnitSummary {
    pub package: Option<String>,
    pub imports: usize,
    pub types: Vec<String>,
    pub module: Option<String>,
    pub fields: usize,
    pub methods: usize,
    pub constructors: usize,
    pub initializers: usize,
    pub statements: usize,
    pub local_types: usize,
    pub anonymous_types: usize,
    /// Declarations closed or reopened by error recovery.
    pub recovered: usize,
}

impl UnitSummary {
    #[must_use]
    pub fn of(unit: &CompilationUnit) -> Self {
        let mut summary = Self {
            package: unit.package.as_ref().map(|package| package.name.to_string()),
            imports: unit.imports.len(),
            ..Self::default()
        };
        let _ = summary.visit_compilation_unit(unit);
        summary
    }
}

impl Visitor for UnitSummary {
    fn visit_type_declaration(&mut self, ty: &TypeDeclaration) -> ControlFlow<()> {
        match ty.nesting {
            Nesting::TopLevel | Nesting::Member => {
                self.types.push(format!("{} {}", ty.kind.keyword(), ty.name.name));
            }
            Nesting::Local => self.local_types += 1,
            Nesting::Anonymous => self.anonymous_types += 1,
        }
        self.recovered += usize::from(ty.recovered);
        javelin::ast::visit::walk_type_declaration(self, ty)
    }

    fn visit_field(&mut self, field: &FieldDeclaration) -> ControlFlow<()> {
        self.fields += 1;
        javelin::ast::visit::walk_field(self, field)
    }

    fn visit_method(&mut self, method: &MethodDeclaration) -> ControlFlow<()> {
        if method.is_constructor() {
            self.constructors += 1;
        } else {
            self.methods += 1;
        }
        self.recovered += usize::from(method.recovered);
        javelin::ast::visit::walk_method(self, method)
    }

    fn visit_initializer(&mut self, init: &Initializer) -> ControlFlow<()> {
        self.initializers += 1;
        javelin::ast::visit::walk_initializer(self, init)
    }

    fn visit_module(&mut self, module: &ModuleDeclaration) -> ControlFlow<()> {
        let keyword = if module.open { "open module" } else { "module" };
        self.module = Some(format!("{keyword} {}", module.name));
        self.recovered += usize::from(module.recovered);
        ControlFlow::Continue(())
    }

    fn visit_statement(&mut self, statement: &Statement) -> ControlFlow<()> {
        self.statements += 1;
        javelin::ast::visit::walk_statement(self, statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use javelin::{CollectingReporter, Parser, ParserOptions};

    fn summarize(source: &str) -> UnitSummary {
        let mut parser = Parser::new(ParserOptions::default()).expect("tables");
        let outcome = parser
            .parse_compilation_unit(source, &mut CollectingReporter::new())
            .expect("no abort");
        UnitSummary::of(&outcome.unit)
    }

    #[test]
    fn test_summary_counts_declarations() {
        let summary = summarize(
            "package p.q; import java.util.List;\n\
             class A { int x, y; A() { } void m() { int z = 0; z++; } static { } class B { } }\n\
             interface I { }",
        );
        assert_eq!(summary.package.as_deref(), Some("p.q"));
        assert_eq!(summary.imports, 1);
        assert_eq!(summary.types, vec!["class A", "class B", "interface I"]);
        assert_eq!(summary.fields, 2);
        assert_eq!(summary.constructors, 1);
        assert_eq!(summary.methods, 1);
        assert_eq!(summary.initializers, 1);
        assert_eq!(summary.statements, 2);
        assert_eq!(summary.recovered, 0);
    }

    #[test]
    fn test_summary_counts_local_and_anonymous_types() {
        let summary = summarize(
            "class A { void m() { class L { } Runnable r = new Runnable() { public void run() { } }; } }",
        );
        assert_eq!(summary.types, vec!["class A"]);
        assert_eq!(summary.local_types, 1);
        assert_eq!(summary.anonymous_types, 1);
    }

    #[test]
    fn test_summary_marks_recovered_declarations() {
        let summary = summarize("class A { void m() { ");
        assert!(summary.recovered >= 1);
        assert_eq!(summary.types, vec!["class A"]);
    }
}
