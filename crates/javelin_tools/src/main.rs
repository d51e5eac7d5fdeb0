//! Javelin Tools CLI
//!
//! Command-line driver for the Javelin parser.

use clap::Parser as _;
use javelin::tables::Action;
use javelin::{
    CollectingReporter, GrammarTables, LineIndex, Parser, ParserOptions, Problem, Severity,
};
use javelin_tools::UnitSummary;
use javelin_tools::cli::{Cli, Commands, OutputFormat, ParseArgs};
use serde_json::json;
use std::fs;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(cli.log_filter()))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Parse(args) => {
            let failed = parse_files(&args)?;
            if failed {
                std::process::exit(1);
            }
        }
        Commands::Tables { conflicts, format } => print_tables(conflicts, format)?,
    }
    Ok(())
}

fn options(args: &ParseArgs) -> ParserOptions {
    ParserOptions::default()
        .with_diet(args.diet)
        .with_module_info(args.module_info)
        .with_error_recovery(!args.no_recovery)
        .with_statement_recovery(!args.no_statement_recovery)
        .with_stack_balance_check(false)
}

/// Parses every file and prints the results. Returns whether any file had errors.
fn parse_files(args: &ParseArgs) -> Result<bool, Box<dyn std::error::Error>> {
    let mut parser = Parser::new(options(args))?;
    let mut failed = false;
    let mut reports = Vec::new();

    for path in &args.files {
        let text = fs::read_to_string(path)
            .map_err(|error| format!("cannot read {}: {error}", path.display()))?;
        let mut reporter = match args.max_problems {
            Some(limit) => CollectingReporter::with_limit(limit),
            None => CollectingReporter::new(),
        };
        let started = std::time::Instant::now();
        let result = parser.parse_compilation_unit(&text, &mut reporter);
        debug!(file = %path.display(), elapsed = ?started.elapsed(), "parsed");

        let (summary, aborted) = match result {
            Ok(outcome) => (Some(UnitSummary::of(&outcome.unit)), None),
            Err(abort) => {
                parser.initialize();
                (None, Some(abort.to_string()))
            }
        };
        failed |= aborted.is_some() || reporter.has_errors();

        match args.format {
            OutputFormat::Text => {
                print_text(path, &text, summary.as_ref(), reporter.problems());
                if let Some(abort) = &aborted {
                    println!("  aborted: {abort}");
                }
            }
            OutputFormat::Json => {
                let index = LineIndex::new(&text);
                let problems: Vec<_> = reporter
                    .problems()
                    .iter()
                    .map(|problem| problem_json(problem, &index))
                    .collect();
                reports.push(json!({
                    "file": path.display().to_string(),
                    "summary": summary,
                    "problems": problems,
                    "aborted": aborted,
                }));
            }
        }
    }

    if args.format == OutputFormat::Json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    info!(files = args.files.len(), failed, "done");
    Ok(failed)
}

fn print_text(path: &Path, text: &str, summary: Option<&UnitSummary>, problems: &[Problem]) {
    println!("{}", path.display());
    if let Some(summary) = summary {
        if let Some(package) = &summary.package {
            println!("  package {package}");
        }
        if let Some(module) = &summary.module {
            println!("  {module}");
        }
        for ty in &summary.types {
            println!("  {ty}");
        }
        println!(
            "  {} imports, {} fields, {} methods, {} constructors, {} initializers, {} statements",
            summary.imports,
            summary.fields,
            summary.methods,
            summary.constructors,
            summary.initializers,
            summary.statements
        );
        if summary.recovered > 0 {
            println!("  {} declarations recovered", summary.recovered);
        }
    }
    render_problems(path, text, problems);
}

#[cfg(not(feature = "diagnostics"))]
fn render_problems(path: &Path, text: &str, problems: &[Problem]) {
    let index = LineIndex::new(text);
    for problem in problems {
        let position = problem.line_col(&index);
        let severity = match problem.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        println!(
            "  {}:{}:{}: {severity}[{}]: {problem}",
            path.display(),
            position.line + 1,
            position.column + 1,
            problem.kind.code()
        );
    }
}

#[cfg(feature = "diagnostics")]
fn render_problems(path: &Path, text: &str, problems: &[Problem]) {
    for problem in problems {
        let report = miette::Report::new(problem.clone()).with_source_code(
            miette::NamedSource::new(path.display().to_string(), text.to_owned()),
        );
        println!("{report:?}");
    }
}

fn problem_json(problem: &Problem, index: &LineIndex) -> serde_json::Value {
    let position = problem.line_col(index);
    json!({
        "code": problem.kind.code(),
        "severity": match problem.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        },
        "message": problem.message(),
        "start": problem.range.start().get(),
        "end": problem.range.end().get(),
        "line": position.line + 1,
        "column": position.column + 1,
    })
}

fn describe_action(tables: &GrammarTables, action: Action) -> String {
    match action {
        Action::Shift(state) => format!("shift to {state}"),
        Action::Reduce(rule) => {
            format!("reduce {}", tables.grammar().describe_rule(rule as usize, None))
        }
        Action::Accept => "accept".to_string(),
        Action::Error => "error".to_string(),
    }
}

fn print_tables(conflicts: bool, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let tables = GrammarTables::global()?;
    let stats = tables.stats();
    let resolved: Vec<_> = if conflicts {
        tables
            .conflicts()
            .iter()
            .map(|conflict| {
                (
                    conflict.state,
                    conflict.token.describe(),
                    describe_action(tables, conflict.chosen),
                    describe_action(tables, conflict.rejected),
                )
            })
            .collect()
    } else {
        Vec::new()
    };

    match format {
        OutputFormat::Json => {
            let conflicts: Vec<_> = resolved
                .iter()
                .map(|(state, token, chosen, rejected)| {
                    json!({
                        "state": state,
                        "token": token.as_str(),
                        "chosen": chosen,
                        "rejected": rejected,
                    })
                })
                .collect();
            let output = json!({ "stats": stats, "conflicts": conflicts });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Text => {
            println!("states:             {}", stats.states);
            println!("terminals:          {}", stats.terminals);
            println!("nonterminals:       {}", stats.nonterminals);
            println!("rules:              {}", stats.rules);
            println!("shift entries:      {}", stats.shift_entries);
            println!("reduce entries:     {}", stats.reduce_entries);
            println!("default reductions: {}", stats.default_reductions);
            match stats.expected_conflicts {
                Some(expected) => {
                    println!("conflicts:          {} (expected {expected})", stats.conflicts);
                }
                None => println!("conflicts:          {}", stats.conflicts),
            }
            for (state, token, chosen, rejected) in &resolved {
                println!("  state {state} on {token}: {chosen} over {rejected}");
                for item in tables.describe_state(*state) {
                    println!("      {item}");
                }
            }
        }
    }
    Ok(())
}
