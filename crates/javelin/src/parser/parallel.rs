//! # Parallel Parsing
//!
//! Batch parsing of independent source files on the rayon thread pool. Each worker
//! thread builds one [`Parser`] over the shared grammar tables and reuses it for every
//! file it picks up.

use super::{Parser, ParserOptions};
use crate::ast::CompilationUnit;
use crate::error::{Abort, GrammarError};
use crate::report::{CollectingReporter, Problem};
use crate::tables::GrammarTables;
use rayon::prelude::*;
use std::time::{Duration, Instant};
use tracing::debug;

/// Result of parsing a single file
#[derive(Debug)]
pub struct FileParseResult {
    /// The file identifier (path or index)
    pub file_id: String,
    /// The recovered compilation unit, `None` when the parse was aborted
    pub unit: Option<CompilationUnit>,
    /// Every problem reported for the file, in report order
    pub problems: Vec<Problem>,
    pub had_error: bool,
    pub duration: Duration,
    pub aborted: Option<Abort>,
}

impl FileParseResult {
    /// True when a unit was produced and no error was reported.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.unit.is_some() && !self.had_error
    }
}

/// Parses every `(file_id, text)` pair in parallel. Results keep the input order.
///
/// # Errors
/// Returns the grammar error if the embedded grammar fails to load.
pub fn parse_many(
    files: &[(String, String)],
    options: &ParserOptions,
) -> Result<Vec<FileParseResult>, GrammarError> {
    let tables = GrammarTables::global()?;
    debug!(files = files.len(), "parsing batch");
    Ok(files
        .par_iter()
        .map_init(
            || Parser::with_tables(options.clone(), tables),
            |parser, (file_id, text)| parse_one(parser, file_id, text),
        )
        .collect())
}

fn parse_one(parser: &mut Parser, file_id: &str, text: &str) -> FileParseResult {
    let start = Instant::now();
    let mut reporter = CollectingReporter::new();
    let outcome = parser.parse_compilation_unit(text, &mut reporter);
    let duration = start.elapsed();
    let had_error = reporter.has_errors();
    let problems = reporter.into_problems();
    match outcome {
        Ok(outcome) => FileParseResult {
            file_id: file_id.to_owned(),
            unit: Some(outcome.unit),
            problems,
            had_error: outcome.had_error || had_error,
            duration,
            aborted: None,
        },
        Err(abort) => {
            parser.initialize();
            FileParseResult {
                file_id: file_id.to_owned(),
                unit: None,
                problems,
                had_error: true,
                duration,
                aborted: Some(abort),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_many_keeps_order() {
        let files: Vec<(String, String)> = (0..8)
            .map(|i| (format!("F{i}.jav"), format!("class F{i} {{ void m() {{ int x = {i}; }} }}")))
            .collect();
        let results = parse_many(&files, &ParserOptions::default()).unwrap();
        assert_eq!(results.len(), 8);
        for (i, result) in results.iter().enumerate() {
            assert_eq!(result.file_id, format!("F{i}.jav"));
            assert!(result.is_ok(), "{:?}", result.problems);
            let unit = result.unit.as_ref().unwrap();
            assert_eq!(unit.types[0].name.name, format!("F{i}"));
        }
    }

    #[test]
    fn test_parse_many_isolates_errors() {
        let files = vec![
            ("good".to_owned(), "class A { }".to_owned()),
            ("bad".to_owned(), "class B { void m( }".to_owned()),
        ];
        let results = parse_many(&files, &ParserOptions::default()).unwrap();
        assert!(results[0].is_ok());
        assert!(results[1].had_error);
        assert!(results[1].unit.is_some());
        assert!(!results[1].problems.is_empty());
        assert!(results[1].aborted.is_none());
    }
}
