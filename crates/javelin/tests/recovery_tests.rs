//! Declarations outside a damaged region survive recovery.

mod common;

use common::{parse, parse_with};
use javelin::ast::{CompilationUnit, StatementKind};
use javelin::{ParserOptions, ProblemKind};

const FRAME: &str = "class A { int a; void ma() { a = 1; } }\n\
                     class B { int b; DAMAGE void mb() { } }\n\
                     class C { int c; void mc() { c = 3; } }\n";

fn damaged(damage: &str) -> String {
    FRAME.replace("DAMAGE", damage)
}

fn assert_neighbours_intact(unit: &CompilationUnit) {
    let a = unit.type_named("A").expect("A survives");
    assert!(a.field_named("a").is_some());
    let ma = a.method_named("ma").expect("ma survives");
    assert!(ma.body.as_ref().is_some_and(|body| body.is_parsed()));

    let c = unit.type_named("C").expect("C survives");
    assert!(c.field_named("c").is_some());
    let mc = c.method_named("mc").expect("mc survives");
    let statements = mc.body.as_ref().and_then(|body| body.statements.as_ref());
    assert!(matches!(
        statements.map(Vec::as_slice),
        Some([statement]) if matches!(statement.kind, StatementKind::Expression(_))
    ));
    assert!(!c.recovered);
}

#[test]
fn test_intact_frame_has_no_errors() {
    let (outcome, problems) = parse(&damaged(""));
    assert!(problems.is_empty(), "{problems:?}");
    assert!(!outcome.had_error);
    assert_eq!(outcome.unit.types.len(), 3);
}

#[test]
fn test_missing_initializer_expression() {
    let (outcome, problems) = parse(&damaged("int x = ;"));
    assert!(outcome.had_error);
    assert_eq!(problems.len(), 1);
    assert_neighbours_intact(&outcome.unit);
    let b = outcome.unit.type_named("B").expect("B survives");
    assert!(b.field_named("b").is_some());
    assert!(b.method_named("mb").is_some());
}

#[test]
fn test_missing_semicolon_after_field() {
    let (outcome, problems) = parse(&damaged("int x"));
    assert_eq!(problems[0].kind, ProblemKind::UnexpectedToken);
    assert_neighbours_intact(&outcome.unit);
    let b = outcome.unit.type_named("B").expect("B survives");
    assert!(b.method_named("mb").is_some());
}

#[test]
fn test_broken_statement_in_method() {
    let (outcome, _) = parse(&damaged("void broken() { foo(; bar(); }"));
    assert!(outcome.had_error);
    assert_neighbours_intact(&outcome.unit);
    let b = outcome.unit.type_named("B").expect("B survives");
    let broken = b.method_named("broken").expect("broken survives");
    assert!(broken.body.as_ref().is_some_and(|body| body.is_parsed()));
    assert!(b.method_named("mb").is_some());
}

#[test]
fn test_unbalanced_parenthesis_in_header() {
    let (outcome, _) = parse(&damaged("void broken(int x { }"));
    assert!(outcome.had_error);
    assert_neighbours_intact(&outcome.unit);
    assert!(outcome.unit.type_named("B").is_some());
}

#[test]
fn test_invalid_character_is_dropped() {
    let (outcome, problems) = parse(&damaged("int x = 1 #;"));
    assert_neighbours_intact(&outcome.unit);
    let kinds: Vec<_> = problems.iter().map(|problem| problem.kind).collect();
    assert_eq!(kinds, vec![ProblemKind::InvalidCharacter]);
    let b = outcome.unit.type_named("B").expect("B survives");
    assert!(!b.recovered);
    assert!(b.field_named("x").is_some());
}

#[test]
fn test_statement_recovery_disabled_keeps_headers() {
    let options = ParserOptions::default().with_statement_recovery(false);
    let (outcome, _) = parse_with(options, &damaged("void broken() { foo(; }"));
    assert_neighbours_intact(&outcome.unit);
    let b = outcome.unit.type_named("B").expect("B survives");
    assert!(b.method_named("broken").is_some());
    assert!(b.method_named("mb").is_some());
}

#[test]
fn test_truncation_at_every_line_keeps_earlier_types() {
    let lines: Vec<&str> = FRAME.lines().collect();
    for keep in 1..lines.len() {
        let mut source = lines[..keep].join("\n");
        source.push_str("\nclass Tail { void t() { ");
        let (outcome, _) = parse(&source.replace("DAMAGE", ""));
        assert!(outcome.had_error);
        assert_eq!(outcome.unit.types.len(), keep + 1, "{source}");
        let tail = outcome.unit.type_named("Tail").expect("Tail recovered");
        assert!(tail.recovered);
        assert_eq!(tail.range.end().to_usize(), source.replace("DAMAGE", "").len());
    }
}

#[test]
fn test_thousands_of_unclosed_blocks() {
    let source = format!("class A {{ void m() {{ {} }} }}", "{".repeat(5000));
    let options = ParserOptions::default().with_stack_balance_check(false);
    let (outcome, problems) = parse_with(options, &source);
    assert!(outcome.had_error);
    assert!(!problems.is_empty());
    let a = outcome.unit.type_named("A").expect("A recovered");
    assert!(a.method_named("m").is_some());
    assert_eq!(a.range.end().to_usize(), source.len());
}

#[test]
fn test_long_operand_chain() {
    let chain = vec!["\"a\""; 20_000].join(" + ");
    let source = format!("class A {{ String s = {chain}; void m() {{ s = {chain}; }} }}");
    let (outcome, problems) = parse(&source);
    assert!(problems.is_empty(), "{problems:?}");
    let a = outcome.unit.type_named("A").expect("A parsed");
    assert!(a.field_named("s").is_some_and(|s| s.initializer.is_some()));
    drop(outcome);
}

#[test]
fn test_members_of_type_missing_its_brace() {
    let source = "class K\n int f1;\n void m1() { f1 = 1; }\n int f3;\n}\nclass L { int g; }\n";
    let (outcome, problems) = parse(source);
    assert!(outcome.had_error);
    assert!(!problems.is_empty());
    assert_eq!(outcome.unit.types.len(), 2);

    let k = outcome.unit.type_named("K").expect("K recovered");
    assert!(k.recovered);
    assert!(k.field_named("f1").is_some());
    assert!(k.method_named("m1").is_some());
    assert!(k.field_named("f3").is_some());
    assert_eq!(k.members.len(), 3);

    let l = outcome.unit.type_named("L").expect("L survives");
    assert!(l.field_named("g").is_some());
    assert_eq!(l.members.len(), 1);
    assert!(!l.recovered);
}
