//! Problems and the reporter seam.
//!
//! The parser never prints and never decides on its own that a problem is fatal. Every
//! lexical, syntactic and structural problem goes through [`ProblemReporter::report`];
//! the reporter may escalate by returning an [`Abort`], which unwinds the parse.

use crate::error::{Abort, LexicalError, LexicalErrorKind};
use crate::syntax::{LineCol, LineIndex, TextRange};
use compact_str::CompactString;
use smallvec::SmallVec;
use std::fmt;

#[cfg(feature = "diagnostics")]
use miette::{Diagnostic, LabeledSpan};

/// Closed set of problem kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum ProblemKind {
    // Lexical
    InvalidCharacter,
    UnterminatedString,
    UnterminatedChar,
    UnterminatedComment,
    EmptyCharLiteral,
    InvalidCharLiteral,
    InvalidEscape,
    InvalidUnicodeEscape,
    MalformedNumber,
    NumberOverflow,
    // Syntax
    UnexpectedToken,
    UnexpectedEndOfInput,
    // Structural
    DuplicateModifier,
    IllegalModifier,
    MisplacedPackage,
    ImportAfterType,
    InterfaceConstructor,
    InterfaceInitializer,
    InvalidCastTarget,
    MisplacedDiamond,
    MisplacedVarargs,
    DuplicateModule,
    ModuleWithTypes,
}

impl ProblemKind {
    /// Stable dotted code, used by the CLI and by miette.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidCharacter => "lexer::invalid_character",
            Self::UnterminatedString => "lexer::unterminated_string",
            Self::UnterminatedChar => "lexer::unterminated_char",
            Self::UnterminatedComment => "lexer::unterminated_comment",
            Self::EmptyCharLiteral => "lexer::empty_char",
            Self::InvalidCharLiteral => "lexer::invalid_char_literal",
            Self::InvalidEscape => "lexer::invalid_escape",
            Self::InvalidUnicodeEscape => "lexer::invalid_unicode_escape",
            Self::MalformedNumber => "lexer::malformed_number",
            Self::NumberOverflow => "lexer::number_overflow",
            Self::UnexpectedToken => "syntax::unexpected_token",
            Self::UnexpectedEndOfInput => "syntax::unexpected_eof",
            Self::DuplicateModifier => "structure::duplicate_modifier",
            Self::IllegalModifier => "structure::illegal_modifier",
            Self::MisplacedPackage => "structure::misplaced_package",
            Self::ImportAfterType => "structure::import_after_type",
            Self::InterfaceConstructor => "structure::interface_constructor",
            Self::InterfaceInitializer => "structure::interface_initializer",
            Self::InvalidCastTarget => "structure::invalid_cast_target",
            Self::MisplacedDiamond => "structure::misplaced_diamond",
            Self::MisplacedVarargs => "structure::misplaced_varargs",
            Self::DuplicateModule => "structure::duplicate_module",
            Self::ModuleWithTypes => "structure::module_with_types",
        }
    }

    #[must_use]
    pub const fn is_lexical(self) -> bool {
        matches!(
            self,
            Self::InvalidCharacter
                | Self::UnterminatedString
                | Self::UnterminatedChar
                | Self::UnterminatedComment
                | Self::EmptyCharLiteral
                | Self::InvalidCharLiteral
                | Self::InvalidEscape
                | Self::InvalidUnicodeEscape
                | Self::MalformedNumber
                | Self::NumberOverflow
        )
    }

    #[must_use]
    pub const fn is_syntax_error(self) -> bool {
        matches!(self, Self::UnexpectedToken | Self::UnexpectedEndOfInput)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Warning,
    Error,
}

/// One reported problem.
///
/// `arguments` are the message parameters (the offending token, the expected tokens, the
/// duplicated modifier ...). Their meaning depends on `kind`; see [`Problem::message`].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize, serde::Deserialize))]
pub struct Problem {
    pub kind: ProblemKind,
    pub severity: Severity,
    pub range: TextRange,
    pub arguments: SmallVec<[CompactString; 2]>,
}

impl Problem {
    #[must_use]
    pub fn error(kind: ProblemKind, range: TextRange) -> Self {
        Self {
            kind,
            severity: Severity::Error,
            range,
            arguments: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn warning(kind: ProblemKind, range: TextRange) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(kind, range)
        }
    }

    #[must_use]
    pub fn with_argument(mut self, argument: impl Into<CompactString>) -> Self {
        self.arguments.push(argument.into());
        self
    }

    #[must_use]
    pub fn line_col(&self, index: &LineIndex) -> LineCol {
        index.line_col(self.range.start())
    }

    /// Human-readable message assembled from the kind and arguments.
    #[must_use]
    pub fn message(&self) -> String {
        let arg = |i: usize| self.arguments.get(i).map_or("", CompactString::as_str);
        match self.kind {
            ProblemKind::InvalidCharacter => format!("invalid character {}", arg(0)),
            ProblemKind::UnterminatedString => "unterminated string literal".to_string(),
            ProblemKind::UnterminatedChar => "unterminated character literal".to_string(),
            ProblemKind::UnterminatedComment => "unterminated comment".to_string(),
            ProblemKind::EmptyCharLiteral => "empty character literal".to_string(),
            ProblemKind::InvalidCharLiteral => {
                "character literal holds more than one character".to_string()
            }
            ProblemKind::InvalidEscape => format!("invalid escape sequence {}", arg(0)),
            ProblemKind::InvalidUnicodeEscape => "invalid unicode escape".to_string(),
            ProblemKind::MalformedNumber => format!("malformed number: {}", arg(0)),
            ProblemKind::NumberOverflow => format!("numeric literal {} is out of range", arg(0)),
            ProblemKind::UnexpectedToken => {
                let mut message = format!("unexpected {}, expected {}", arg(0), arg(1));
                if !arg(2).is_empty() {
                    message.push_str(&format!("; did you mean {}?", arg(2)));
                }
                message
            }
            ProblemKind::UnexpectedEndOfInput => {
                format!("unexpected end of input, expected {}", arg(0))
            }
            ProblemKind::DuplicateModifier => format!("duplicate modifier {}", arg(0)),
            ProblemKind::IllegalModifier => {
                format!("modifier {} is not allowed on {}", arg(0), arg(1))
            }
            ProblemKind::MisplacedPackage => {
                "package declaration must come first in the compilation unit".to_string()
            }
            ProblemKind::ImportAfterType => {
                "import declarations must precede type declarations".to_string()
            }
            ProblemKind::InterfaceConstructor => {
                format!("interface {} cannot declare a constructor", arg(0))
            }
            ProblemKind::InterfaceInitializer => {
                format!("interface {} cannot declare an initializer", arg(0))
            }
            ProblemKind::InvalidCastTarget => "cast target is not a type".to_string(),
            ProblemKind::MisplacedDiamond => {
                "'<>' is only allowed in instance creation".to_string()
            }
            ProblemKind::MisplacedVarargs => {
                format!("variable-arity parameter {} must be last", arg(0))
            }
            ProblemKind::DuplicateModule => "only one module declaration is allowed".to_string(),
            ProblemKind::ModuleWithTypes => {
                "a module declaration cannot be mixed with type declarations".to_string()
            }
        }
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for Problem {}

#[cfg(feature = "diagnostics")]
impl Diagnostic for Problem {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        Some(Box::new(self.kind.code()))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(match self.severity {
            Severity::Warning => miette::Severity::Warning,
            Severity::Error => miette::Severity::Error,
        })
    }

    fn labels(&self) -> Option<Box<dyn Iterator<Item = LabeledSpan> + '_>> {
        Some(Box::new(std::iter::once(LabeledSpan::underline(self.range))))
    }
}

impl From<LexicalError> for Problem {
    fn from(error: LexicalError) -> Self {
        let (kind, argument): (ProblemKind, Option<CompactString>) = match error.kind {
            LexicalErrorKind::InvalidCharacter { ch } => {
                (ProblemKind::InvalidCharacter, Some(format!("{ch:?}").into()))
            }
            LexicalErrorKind::UnterminatedString => (ProblemKind::UnterminatedString, None),
            LexicalErrorKind::UnterminatedChar => (ProblemKind::UnterminatedChar, None),
            LexicalErrorKind::UnterminatedComment => (ProblemKind::UnterminatedComment, None),
            LexicalErrorKind::EmptyCharLiteral => (ProblemKind::EmptyCharLiteral, None),
            LexicalErrorKind::InvalidCharLiteral => (ProblemKind::InvalidCharLiteral, None),
            LexicalErrorKind::InvalidEscape { escape } => (ProblemKind::InvalidEscape, Some(escape)),
            LexicalErrorKind::InvalidUnicodeEscape => (ProblemKind::InvalidUnicodeEscape, None),
            LexicalErrorKind::MalformedNumber { reason } => {
                (ProblemKind::MalformedNumber, Some(reason.into()))
            }
            LexicalErrorKind::NumberOverflow { literal } => {
                (ProblemKind::NumberOverflow, Some(literal))
            }
        };
        let problem = Self::error(kind, error.range);
        match argument {
            Some(argument) => problem.with_argument(argument),
            None => problem,
        }
    }
}

/// Receiver for every problem a parse produces.
pub trait ProblemReporter {
    /// Records `problem`. Returning `Err` aborts the running parse.
    fn report(&mut self, problem: Problem) -> Result<(), Abort>;
}

impl<F> ProblemReporter for F
where
    F: FnMut(Problem) -> Result<(), Abort>,
{
    fn report(&mut self, problem: Problem) -> Result<(), Abort> {
        self(problem)
    }
}

/// Reporter that keeps everything, optionally escalating after `limit` errors.
#[derive(Debug, Clone, Default)]
pub struct CollectingReporter {
    problems: Vec<Problem>,
    limit: Option<usize>,
    errors: usize,
}

impl CollectingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Escalates to [`Abort::TooManyProblems`] once more than `limit` errors arrive.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }

    #[must_use]
    pub fn into_problems(self) -> Vec<Problem> {
        self.problems
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn errors(&self) -> impl Iterator<Item = &Problem> {
        self.problems.iter().filter(|p| p.severity == Severity::Error)
    }

    pub fn clear(&mut self) {
        self.problems.clear();
        self.errors = 0;
    }
}

impl ProblemReporter for CollectingReporter {
    fn report(&mut self, problem: Problem) -> Result<(), Abort> {
        if problem.severity == Severity::Error {
            self.errors += 1;
            if let Some(limit) = self.limit
                && self.errors > limit
            {
                return Err(Abort::TooManyProblems { limit });
            }
        }
        self.problems.push(problem);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::syntax::TextSize;

    fn at(offset: u32) -> TextRange {
        TextRange::at(TextSize::new(offset), 1)
    }

    #[test]
    fn test_collecting_reporter_escalates_past_limit() {
        let mut reporter = CollectingReporter::with_limit(2);
        assert!(reporter.report(Problem::error(ProblemKind::UnexpectedToken, at(0))).is_ok());
        assert!(reporter.report(Problem::warning(ProblemKind::DuplicateModifier, at(1))).is_ok());
        assert!(reporter.report(Problem::error(ProblemKind::UnexpectedToken, at(2))).is_ok());
        assert_eq!(
            reporter.report(Problem::error(ProblemKind::UnexpectedToken, at(3))),
            Err(Abort::TooManyProblems { limit: 2 })
        );
        assert_eq!(reporter.problems().len(), 3);
        assert_eq!(reporter.errors().count(), 2);
    }

    #[test]
    fn test_closure_reporter() {
        let mut seen = 0;
        let mut reporter = |_: Problem| -> Result<(), Abort> {
            seen += 1;
            Ok(())
        };
        reporter
            .report(Problem::error(ProblemKind::MisplacedPackage, at(0)))
            .unwrap();
        assert_eq!(seen, 1);
    }

    #[test]
    fn test_unexpected_token_message() {
        let problem = Problem::error(ProblemKind::UnexpectedToken, at(5))
            .with_argument("'clas'")
            .with_argument("'class' or 'interface'")
            .with_argument("'class'");
        assert_eq!(
            problem.message(),
            "unexpected 'clas', expected 'class' or 'interface'; did you mean 'class'?"
        );
    }

    #[test]
    fn test_lexical_error_conversion() {
        let error = LexicalError::new(
            at(7),
            LexicalErrorKind::InvalidEscape {
                escape: "\\q".into(),
            },
        );
        let problem = Problem::from(error);
        assert_eq!(problem.kind, ProblemKind::InvalidEscape);
        assert_eq!(problem.arguments.as_slice(), &["\\q"]);
        assert_eq!(problem.range, at(7));
    }

    #[test]
    fn test_problem_line_col() {
        let index = LineIndex::new("class A {\n  int x\n}");
        let problem = Problem::error(ProblemKind::UnexpectedToken, at(18));
        assert_eq!(problem.line_col(&index), LineCol::new(2, 0));
    }
}
