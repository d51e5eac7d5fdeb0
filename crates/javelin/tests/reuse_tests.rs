//! A parser reused across inputs behaves like a fresh one.

mod common;

use common::{CORPUS, parser};
use javelin::{Abort, CancellationFlag, CollectingReporter, ParseOutcome, Parser, ParserOptions};

const BROKEN: &[&str] = &[
    "class A { void m() { int x = ",
    "class A extends",
    "class A { int = ; } }} class",
    "package p; import ; class { {{ ",
    "interface I { void m() } enum E { A, B",
];

fn run(parser: &mut Parser, source: &str) -> (ParseOutcome, usize) {
    let mut reporter = CollectingReporter::new();
    let outcome = parser
        .parse_compilation_unit(source, &mut reporter)
        .expect("no abort");
    (outcome, reporter.problems().len())
}

#[test]
fn test_reuse_matches_fresh_parser() {
    let mut reused = parser(ParserOptions::default());
    for source in CORPUS {
        for broken in BROKEN {
            let _ = run(&mut reused, broken);
            let again = run(&mut reused, source);
            let fresh = run(&mut parser(ParserOptions::default()), source);
            assert_eq!(again, fresh);
        }
    }
}

#[test]
fn test_broken_inputs_are_deterministic() {
    let mut reused = parser(ParserOptions::default());
    for broken in BROKEN {
        let first = run(&mut reused, broken);
        let _ = run(&mut reused, CORPUS[0]);
        let second = run(&mut reused, broken);
        assert_eq!(first, second, "{broken}");
        assert!(first.0.had_error);
    }
}

#[test]
fn test_reuse_after_abort() {
    let flag = CancellationFlag::new();
    let options = ParserOptions::default().with_cancellation(flag.clone());
    let mut reused = parser(options);
    let source = CORPUS[1].repeat(4);

    flag.cancel();
    let aborted = reused.parse_compilation_unit(&source, &mut CollectingReporter::new());
    assert_eq!(aborted, Err(Abort::Cancelled));

    flag.reset();
    reused.initialize();
    let after = run(&mut reused, CORPUS[1]);
    let fresh = run(&mut parser(ParserOptions::default()), CORPUS[1]);
    assert_eq!(after, fresh);
}

#[test]
fn test_reporter_escalation_aborts() {
    let mut reused = parser(ParserOptions::default());
    let mut reporter = CollectingReporter::with_limit(0);
    let result = reused.parse_compilation_unit("class A { int x = 1 # ; }", &mut reporter);
    assert_eq!(result, Err(Abort::TooManyProblems { limit: 0 }));

    reused.initialize();
    let (outcome, problems) = run(&mut reused, "class A { int x = 1; }");
    assert!(!outcome.had_error);
    assert_eq!(problems, 0);
}
