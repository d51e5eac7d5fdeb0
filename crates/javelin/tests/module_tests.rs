//! Module descriptors and the restricted keywords.

mod common;

use common::{parse, parse_with};
use javelin::ParserOptions;
use javelin::ProblemKind;
use javelin::ast::ModuleDirectiveKind;

fn module_info() -> ParserOptions {
    ParserOptions::default().with_module_info(true)
}

#[test]
fn test_module_descriptor_with_imports() {
    let source = "import com.example.spi.Service;\n\
                  /** The core module. */\n\
                  @Deprecated\n\
                  module com.example.core {\n\
                      requires java.base;\n\
                      requires transitive com.example.api;\n\
                      exports com.example.core.util;\n\
                      opens com.example.core.model to com.example.json;\n\
                      uses Service;\n\
                      provides Service with com.example.core.Impl;\n\
                  }\n";
    let (outcome, problems) = parse_with(module_info(), source);
    assert!(problems.is_empty(), "{problems:?}");
    assert_eq!(outcome.unit.imports.len(), 1);
    assert!(outcome.unit.types.is_empty());

    let module = outcome.unit.module.expect("module");
    assert_eq!(module.name.to_string(), "com.example.core");
    assert!(!module.open);
    assert_eq!(module.modifiers.annotations.len(), 1);
    assert!(module.doc.is_some());
    assert_eq!(module.directives.len(), 6);
    assert!(matches!(
        &module.directives[1].kind,
        ModuleDirectiveKind::Requires { module, transitive: true, is_static: false }
            if module.to_string() == "com.example.api"
    ));
    assert!(matches!(
        &module.directives[3].kind,
        ModuleDirectiveKind::Opens { targets, .. } if targets.len() == 1
    ));
    assert_eq!(
        module.directives[5].range.slice(source),
        Some("provides Service with com.example.core.Impl;")
    );
}

#[test]
fn test_restricted_keywords_are_identifiers_in_ordinary_sources() {
    let source = "class module { int requires; void exports(int to) { open = with; } }";
    let (outcome, problems) = parse(source);
    assert!(problems.is_empty(), "{problems:?}");
    let ty = outcome.unit.type_named("module").expect("class named module");
    assert!(ty.field_named("requires").is_some());
    assert!(ty.method_named("exports").is_some());
}

#[test]
fn test_module_mixed_with_types() {
    let (outcome, problems) = parse_with(module_info(), "module m { } class A { }");
    let kinds: Vec<_> = problems.iter().map(|problem| problem.kind).collect();
    assert_eq!(kinds, vec![ProblemKind::ModuleWithTypes]);
    assert!(outcome.unit.module.is_some());
    assert_eq!(outcome.unit.types.len(), 1);
}

#[test]
fn test_second_module_is_rejected() {
    let (outcome, problems) = parse_with(module_info(), "module a { } module b { }");
    let kinds: Vec<_> = problems.iter().map(|problem| problem.kind).collect();
    assert_eq!(kinds, vec![ProblemKind::DuplicateModule]);
    let module = outcome.unit.module.expect("first module kept");
    assert_eq!(module.name.to_string(), "a");
}

#[test]
fn test_broken_module_keeps_later_directives() {
    let source = "open module m { requires ; exports p; uses S; }";
    let (outcome, problems) = parse_with(module_info(), source);
    assert!(outcome.had_error);
    assert_eq!(problems[0].kind, ProblemKind::UnexpectedToken);
    let module = outcome.unit.module.expect("module recovered");
    assert!(module.open);
    assert!(module.directives.iter().any(|directive| matches!(
        directive.kind,
        ModuleDirectiveKind::Uses { .. }
    )));
}
