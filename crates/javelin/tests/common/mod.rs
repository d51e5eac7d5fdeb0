//! Shared helpers for the integration tests.

#![allow(dead_code)]

use javelin::{CollectingReporter, ParseOutcome, Parser, ParserOptions, Problem};

/// Well-formed programs covering most of the grammar.
pub const CORPUS: &[&str] = &[
    r#"package com.example.app;

import java.util.List;
import java.util.*;
import static java.lang.Math.max;

/** Entry point. */
public final class Main<T extends Comparable<T>> extends Base implements Runnable, Cloneable {
    private static final int LIMIT = 10, OTHER[] = {1, 2};
    protected List<String> names;
    private Map<String, List<? extends Number>> index;
    int total;

    static { created = compute(); }
    { names = null; }

    public Main(int limit) throws Exception {
        this(limit, "x");
    }

    Main(int limit, String label) {
        super();
        this.label = label;
    }

    @Override
    public void run() {
        for (int i = 0; i < LIMIT; i++) {
            if (i % 2 == 0) continue; else total += i;
        }
        for (String name : names) {
            System.out.println(name);
        }
        int[] values = new int[] {1, 2, 3};
        Object o = new Object() {
            public String toString() { return "anon"; }
        };
        outer: while (total > 0) { total--; break outer; }
        do { total++; } while (total < 3);
    }

    abstract static class Inner {
        abstract int size();
    }
}
"#,
    r#"class Expressions {
    long mask = 0xFFL << 3 | 1;
    double ratio = 1.5f * 2.0;
    char c = 'c';
    String s = "a" + 'b' + null;

    boolean check(Object o, int[] xs) {
        int n = xs.length > 0 ? xs[0] : -1;
        n <<= 2;
        n = n >>> 1;
        Class<?> k = String.class;
        String t = (String) o;
        int w = (int) ratio;
        return o instanceof String && !(n == 0) || ~n != 0;
    }

    int[][] grid() {
        return new int[3][];
    }
}
"#,
    r#"interface Shape extends Comparable<Shape> {
    int SIDES = 0;
    double area();
    String name(int precision, String... parts);
}

enum Color {
    RED,
    GREEN("g") {
        void paint() { }
    },
    BLUE;

    private final String code;

    Color() { this("?"); }

    Color(String code) { this.code = code; }
}
"#,
    r#"@Retention(RetentionPolicy.RUNTIME)
@Deprecated
class Statements {
    @SuppressWarnings("unchecked")
    void run(int kind) throws java.io.IOException {
        switch (kind) {
            case 1:
            case 2: total = 2; break;
            default: total = 0;
        }
        try (Reader r = open(); Writer w = create()) {
            r.read();
        } catch (IllegalStateException | IllegalArgumentException e) {
            throw e;
        } finally {
            close();
        }
        synchronized (this) { total++; }
        assert total > 0 : "positive";
        class Local {
            int value() { return 1; }
        }
        ;
    }
}
"#,
    r#"class Generics<K, V extends Number> {
    private final java.util.Map<K, java.util.List<V>> buckets = new java.util.HashMap<>();

    <R> R apply(Function<? super V, ? extends R> f, V value) {
        return f.apply(value);
    }

    void fill(List<List<String>> rows) {
        for (List<String> row : rows) {
            if (row.isEmpty()) {
                continue;
            }
            rows.get(0).add(row.get(0));
        }
    }
}
"#,
];

pub fn parser(options: ParserOptions) -> Parser {
    Parser::new(options).expect("grammar loads")
}

pub fn parse(source: &str) -> (ParseOutcome, Vec<Problem>) {
    parse_with(ParserOptions::default(), source)
}

pub fn parse_with(options: ParserOptions, source: &str) -> (ParseOutcome, Vec<Problem>) {
    let mut reporter = CollectingReporter::new();
    let outcome = parser(options)
        .parse_compilation_unit(source, &mut reporter)
        .expect("no abort");
    (outcome, reporter.into_problems())
}
