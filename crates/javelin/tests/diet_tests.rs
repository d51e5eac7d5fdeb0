//! Diet parses followed by deferred body parsing.

mod common;

use common::{CORPUS, parse, parse_with, parser};
use javelin::ast::{BodyRef, Member, StatementKind};
use javelin::{BodyState, CollectingReporter, ParserOptions};

fn diet() -> ParserOptions {
    ParserOptions::default().with_diet(true)
}

#[test]
fn test_diet_leaves_every_body_unparsed() {
    for source in CORPUS {
        let (mut outcome, problems) = parse_with(diet(), source);
        assert!(problems.is_empty(), "{problems:?}");
        assert_eq!(outcome.unit.body_state, BodyState::Deferred);
        let bodies = outcome.unit.bodies_mut();
        assert!(!bodies.is_empty());
        assert!(bodies.iter().all(|body| !body.body().is_parsed()));
    }
}

#[test]
fn test_deferred_bodies_match_full_parse() {
    for source in CORPUS {
        let (full, _) = parse(source);
        let mut diet_parser = parser(diet());
        let mut reporter = CollectingReporter::new();
        let mut outcome = diet_parser
            .parse_compilation_unit(source, &mut reporter)
            .expect("no abort");
        let had_error = diet_parser
            .parse_method_bodies(&mut outcome.unit, source, &mut reporter)
            .expect("no abort");
        assert!(!had_error);
        assert_eq!(outcome.unit.body_state, BodyState::Parsed);
        assert_eq!(outcome.unit.types, full.unit.types);
    }
}

#[test]
fn test_body_ranges_cover_braces() {
    let source = "class A { void m() { a(); } A() { this(1); } static { b(); } }";
    let (mut outcome, _) = parse_with(diet(), source);
    let texts: Vec<_> = outcome
        .unit
        .bodies_mut()
        .iter()
        .map(|body| body.body().range.slice(source).expect("in source").to_owned())
        .collect();
    assert_eq!(texts, vec!["{ a(); }", "{ this(1); }", "{ b(); }"]);
}

#[test]
fn test_single_body_parse() {
    let source = "class A { A() { super(); run(); } void m() { } }";
    let (mut outcome, _) = parse_with(diet(), source);
    let mut single = parser(diet());
    let mut reporter = CollectingReporter::new();
    for body in outcome.unit.bodies_mut() {
        match body {
            BodyRef::Constructor(body) => {
                let had_error = single
                    .parse_method_body(source, body, true, &mut reporter)
                    .expect("no abort");
                assert!(!had_error);
                let statements = body.statements.as_ref().expect("parsed");
                assert!(matches!(
                    statements[0].kind,
                    StatementKind::ExplicitConstructorCall { .. }
                ));
                assert_eq!(statements.len(), 2);
            }
            BodyRef::Method(body) => {
                single
                    .parse_method_body(source, body, false, &mut reporter)
                    .expect("no abort");
                assert_eq!(body.statements.as_deref().map(<[_]>::len), Some(0));
            }
            BodyRef::Initializer(_) => unreachable!("no initializers"),
        }
    }
    assert!(!outcome.unit.has_unparsed_bodies());
}

#[test]
fn test_errors_inside_skipped_bodies_surface_later() {
    let source = "class A { void m() { int = ; } int y; }";
    let (mut outcome, problems) = parse_with(diet(), source);
    assert!(problems.is_empty(), "{problems:?}");
    assert!(!outcome.had_error);
    let a = &outcome.unit.types[0];
    assert!(a.field_named("y").is_some());

    let mut reporter = CollectingReporter::new();
    let had_error = parser(diet())
        .parse_method_bodies(&mut outcome.unit, source, &mut reporter)
        .expect("no abort");
    assert!(had_error);
    assert!(reporter.has_errors());
    assert!(!outcome.unit.has_unparsed_bodies());
}

#[test]
fn test_field_initializer_entry() {
    let source = "class A { int[] xs = {1, 2, 3}; }";
    let (outcome, _) = parse(source);
    let Some(Member::Field(field)) = outcome.unit.types[0].members.first() else {
        panic!("field expected");
    };
    let initializer = field.initializer.as_ref().expect("initializer");
    let mut reporter = CollectingReporter::new();
    let reparsed = parser(ParserOptions::default())
        .parse_field_initializer(source, initializer.range, &mut reporter)
        .expect("no abort")
        .expect("valid initializer");
    assert_eq!(&reparsed, initializer);
}
