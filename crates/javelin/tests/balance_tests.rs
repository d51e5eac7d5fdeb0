//! Value stack balance over valid and corrupted programs.
//!
//! Every parse here runs with the balance check on, so a reduction that leaves a value
//! stack out of step with the automaton stack surfaces as an invariant abort.

mod common;

use common::{CORPUS, parser};
use javelin::{Abort, CollectingReporter, ParserOptions, ScanMode, Scanner, TokenKind};
use proptest::prelude::*;

fn checked() -> ParserOptions {
    ParserOptions::default().with_stack_balance_check(true)
}

fn parse_checked(options: ParserOptions, source: &str) -> Result<bool, Abort> {
    let mut reporter = CollectingReporter::new();
    let outcome = parser(options).parse_compilation_unit(source, &mut reporter)?;
    Ok(outcome.had_error)
}

const STATEMENTS: &[&str] = &[
    "int a = 1;",
    "a = b + c * 2;",
    "if (a > b) { a--; } else b++;",
    "while (i < 10) i++;",
    "for (int i = 0; i < n; i++) { sum += i; }",
    "for (String s : names) print(s);",
    "return;",
    "String[] parts = new String[] {\"a\", \"b\"};",
    "Object o = new Object() { int x; };",
    "switch (k) { case 1: break; default: k = 0; }",
    "try { f(); } catch (Exception e) { g(e); } finally { h(); }",
    "x = cond ? (int) y : -z;",
    "{ int nested = 0; }",
    ";",
];

const REPLACEMENTS: &[&str] = &["", "{", "}", ";", "(", "=", "class", "int", "."];

fn member() -> impl Strategy<Value = String> {
    prop_oneof![
        (0u32..100).prop_map(|n| format!("int f{n} = {n};")),
        (0u32..100).prop_map(|n| format!("private static String s{n};")),
        prop::collection::vec(prop::sample::select(STATEMENTS), 0..6)
            .prop_map(|body| format!("void m(int a, String b) {{ {} }}", body.join(" "))),
        prop::collection::vec(prop::sample::select(STATEMENTS), 0..3)
            .prop_map(|body| format!("static {{ {} }}", body.join(" "))),
        Just("class Inner { int x; void y() { } }".to_owned()),
        Just("interface Nested { void run(); }".to_owned()),
    ]
}

fn program() -> impl Strategy<Value = String> {
    (
        prop::collection::vec(member(), 0..6),
        prop::bool::ANY,
    )
        .prop_map(|(members, import)| {
            let header = if import { "import java.util.List;\n" } else { "" };
            format!("{header}public class Generated {{\n{}\n}}\n", members.join("\n"))
        })
}

/// Token ranges of `source`, end of input excluded.
fn token_ranges(source: &str) -> Vec<(usize, usize)> {
    Scanner::new(source, ScanMode::Standard)
        .tokens()
        .iter()
        .filter(|token| token.kind != TokenKind::Eof)
        .map(|token| (token.range.start().to_usize(), token.range.end().to_usize()))
        .collect()
}

#[test]
fn test_corpus_keeps_stacks_balanced() {
    for source in CORPUS {
        assert_eq!(parse_checked(checked(), source), Ok(false));
    }
}

#[test]
fn test_diet_corpus_keeps_stacks_balanced() {
    for source in CORPUS {
        assert_eq!(parse_checked(checked().with_diet(true), source), Ok(false));
    }
}

#[test]
fn test_every_single_token_deletion_in_corpus() {
    let source = CORPUS[1];
    for (start, end) in token_ranges(source) {
        let corrupted = format!("{}{}", &source[..start], &source[end..]);
        let result = parse_checked(checked(), &corrupted);
        assert!(result.is_ok(), "deleting {:?}: {result:?}", &source[start..end]);
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn test_generated_programs_parse_cleanly(source in program()) {
        prop_assert_eq!(parse_checked(checked(), &source), Ok(false));
    }

    #[test]
    fn test_corrupted_programs_never_abort(
        source in program(),
        pick in any::<prop::sample::Index>(),
        replacement in prop::sample::select(REPLACEMENTS),
    ) {
        let tokens = token_ranges(&source);
        prop_assume!(!tokens.is_empty());
        let (start, end) = tokens[pick.index(tokens.len())];
        let corrupted = format!("{} {replacement} {}", &source[..start], &source[end..]);
        let result = parse_checked(checked(), &corrupted);
        prop_assert!(result.is_ok(), "{:?}", result);
    }
}
