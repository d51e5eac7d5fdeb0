use super::literal;
use super::token::{Token, TokenKind};
use super::unicode::Translated;
use super::{RawDocComment, TokenSource};
use crate::error::{LexicalError, LexicalErrorKind};
use crate::syntax::{LineIndex, TextRange, TextSize};
use compact_str::CompactString;
use logos::Logos;
use once_cell::unsync::OnceCell;
use std::ops::Range;
use tracing::{debug, instrument};

/// How restricted keywords are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScanMode {
    #[default]
    Standard,
    /// `module`, `requires` and the other restricted keywords become keywords.
    ModuleInfo,
}

/// Token source over a complete compilation unit.
///
/// The whole text is tokenized up front. Parser restarts, body skipping and bounded
/// sub-parses then become index arithmetic over the token vector, and lexical errors
/// can be released exactly once no matter how often a region is re-read.
#[derive(Debug)]
pub struct Scanner {
    tokens: Vec<Token>,
    /// Errors keyed by the index of the first token at or after them.
    errors: Vec<(usize, LexicalError)>,
    released: usize,
    pending: Vec<LexicalError>,
    doc_comments: Vec<RawDocComment>,
    position: usize,
    window: Range<usize>,
    bounds: TextRange,
    source_len: TextSize,
    source: Box<str>,
    line_index: OnceCell<LineIndex>,
}

impl Scanner {
    #[instrument(level = "debug", skip(source), fields(len = source.len()))]
    pub fn new(source: &str, mode: ScanMode) -> Self {
        let translated = Translated::new(source);
        let mut tokens = Vec::with_capacity(source.len() / 4);
        let mut errors: Vec<(usize, LexicalError)> = Vec::new();
        let mut doc_comments = Vec::new();

        for error in &translated.errors {
            // Escape errors are ordered by offset; attach them once tokens exist.
            errors.push((usize::MAX, error.clone()));
        }

        let mut lexer = TokenKind::lexer(&translated.text);
        while let Some(result) = lexer.next() {
            let span = lexer.span();
            let range = translated.range_to_original(span.start, span.end);
            let slice = lexer.slice();

            let lexed = match result {
                Ok(kind) => kind,
                Err(()) => {
                    let ch = slice.chars().next().unwrap_or(char::REPLACEMENT_CHARACTER);
                    errors.push((
                        tokens.len(),
                        LexicalError::new(range, LexicalErrorKind::InvalidCharacter { ch }),
                    ));
                    continue;
                }
            };

            let (kind, error) = match lexed {
                TokenKind::Comment => continue,
                TokenKind::DocComment => {
                    doc_comments.push(RawDocComment {
                        range,
                        text: CompactString::from(slice),
                    });
                    continue;
                }
                TokenKind::UnterminatedComment => {
                    errors.push((
                        tokens.len(),
                        LexicalError::new(range, LexicalErrorKind::UnterminatedComment),
                    ));
                    continue;
                }
                TokenKind::UnterminatedString => {
                    (TokenKind::StringLiteral, Some(LexicalErrorKind::UnterminatedString))
                }
                TokenKind::UnterminatedChar => {
                    (TokenKind::CharLiteral, Some(LexicalErrorKind::UnterminatedChar))
                }
                TokenKind::Identifier if mode == ScanMode::ModuleInfo => {
                    (TokenKind::restricted_keyword(slice).unwrap_or(lexed), None)
                }
                other => (other, None),
            };

            let (value, decode_error) = literal::decode(lexed, slice);
            for error in error.into_iter().chain(decode_error) {
                errors.push((tokens.len(), LexicalError::new(range, error)));
            }

            tokens.push(Token {
                kind,
                text: CompactString::from(slice),
                range,
                value,
            });
        }

        attach_escape_errors(&mut errors, &tokens);
        errors.sort_by_key(|(index, _)| *index);

        let source_len = TextSize::of_len(source.len());
        debug!(
            tokens = tokens.len(),
            errors = errors.len(),
            doc_comments = doc_comments.len(),
            "tokenized"
        );

        let window = 0..tokens.len();
        Self {
            tokens,
            errors,
            released: 0,
            pending: Vec::new(),
            doc_comments,
            position: 0,
            window,
            bounds: TextRange::new(TextSize::zero(), source_len),
            source_len,
            source: source.into(),
            line_index: OnceCell::new(),
        }
    }

    /// All significant tokens, ignoring the current bounds.
    #[must_use]
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Every doc comment in the unit, in source order.
    #[must_use]
    pub fn doc_comments(&self) -> &[RawDocComment] {
        &self.doc_comments
    }

    fn first_token_at(&self, offset: TextSize) -> usize {
        self.tokens.partition_point(|token| token.range.start() < offset)
    }

    fn release_errors_before(&mut self, limit: usize) {
        while let Some((index, error)) = self.errors.get(self.released) {
            if *index >= limit {
                break;
            }
            self.pending.push(error.clone());
            self.released += 1;
        }
    }

    fn discard_errors_before(&mut self, limit: usize) {
        while self
            .errors
            .get(self.released)
            .is_some_and(|(index, _)| *index < limit)
        {
            self.released += 1;
        }
    }
}

/// Keys escape-translation errors by the first token starting at or after them.
fn attach_escape_errors(errors: &mut [(usize, LexicalError)], tokens: &[Token]) {
    for (index, error) in errors.iter_mut() {
        if *index == usize::MAX {
            *index = tokens.partition_point(|token| token.range.start() < error.range.start());
        }
    }
}

impl TokenSource for Scanner {
    fn next_token(&mut self) -> Token {
        let index = self.position;
        if index < self.window.end {
            self.release_errors_before(index + 1);
            self.position += 1;
            return self.tokens[index].clone();
        }
        let limit = if self.window.end == self.tokens.len() {
            usize::MAX
        } else {
            self.window.end
        };
        self.release_errors_before(limit);
        Token::synthetic(TokenKind::Eof, TextRange::empty(self.bounds.end()))
    }

    fn reset_to(&mut self, offset: TextSize) {
        self.position = self.first_token_at(offset).clamp(self.window.start, self.window.end);
    }

    fn jump_over_body(&mut self) {
        let mut depth = 1usize;
        let mut index = self.position;
        while index < self.window.end {
            match self.tokens[index].kind {
                TokenKind::LBrace => depth += 1,
                TokenKind::RBrace => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                }
                _ => {}
            }
            index += 1;
        }
        let limit = if index >= self.window.end && self.window.end == self.tokens.len() {
            usize::MAX
        } else {
            index + 1
        };
        self.discard_errors_before(limit);
        self.position = index;
    }

    fn bounds(&self) -> TextRange {
        self.bounds
    }

    fn set_bounds(&mut self, range: TextRange) {
        let start = self.first_token_at(range.start());
        let end = self.first_token_at(range.end()).max(start);
        self.window = start..end;
        self.bounds = range;
        self.position = start;
        self.discard_errors_before(start);
    }

    fn take_lexical_errors(&mut self) -> Vec<LexicalError> {
        std::mem::take(&mut self.pending)
    }

    fn doc_comment_before(&self, offset: TextSize) -> Option<&RawDocComment> {
        let next = self.first_token_at(offset);
        let previous_end = next
            .checked_sub(1)
            .map_or(TextSize::zero(), |i| self.tokens[i].range.end());
        let candidates = self
            .doc_comments
            .partition_point(|doc| doc.range.end() <= offset);
        let doc = self.doc_comments.get(candidates.checked_sub(1)?)?;
        (doc.range.start() >= previous_end).then_some(doc)
    }

    fn line_index(&self) -> &LineIndex {
        self.line_index.get_or_init(|| LineIndex::new(&self.source))
    }

    fn source_len(&self) -> TextSize {
        self.source_len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scan(source: &str) -> Scanner {
        Scanner::new(source, ScanMode::Standard)
    }

    fn drain(scanner: &mut Scanner) -> Vec<TokenKind> {
        let mut kinds = Vec::new();
        loop {
            let token = scanner.next_token();
            if token.kind == TokenKind::Eof {
                return kinds;
            }
            kinds.push(token.kind);
        }
    }

    #[test]
    fn test_comments_are_dropped_and_docs_recorded() {
        let mut scanner = scan("/** Doc. */ class /* c */ A {}");
        assert_eq!(
            drain(&mut scanner),
            vec![TokenKind::Class, TokenKind::Identifier, TokenKind::LBrace, TokenKind::RBrace]
        );
        assert_eq!(scanner.doc_comments().len(), 1);
        let doc = scanner
            .doc_comment_before(TextSize::new(12))
            .expect("doc comment precedes class");
        assert_eq!(doc.text, "/** Doc. */");
    }

    #[test]
    fn test_doc_comment_must_be_adjacent() {
        let scanner = scan("/** Doc. */ int x; class A {}");
        assert!(scanner.doc_comment_before(TextSize::new(19)).is_none());
        assert!(scanner.doc_comment_before(TextSize::new(12)).is_some());
    }

    #[test]
    fn test_eof_range_is_at_bounds_end() {
        let mut scanner = scan("a b");
        drain(&mut scanner);
        let eof = scanner.next_token();
        assert_eq!(eof.kind, TokenKind::Eof);
        assert_eq!(eof.range, TextRange::empty(TextSize::new(3)));
    }

    #[test]
    fn test_reset_rereads_without_duplicate_errors() {
        let mut scanner = scan("a # b");
        assert_eq!(drain(&mut scanner).len(), 2);
        let errors = scanner.take_lexical_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexicalErrorKind::InvalidCharacter { ch: '#' });

        scanner.reset_to(TextSize::zero());
        assert_eq!(drain(&mut scanner).len(), 2);
        assert!(scanner.take_lexical_errors().is_empty());
    }

    #[test]
    fn test_reset_to_offset_inside_token() {
        let mut scanner = scan("alpha beta gamma");
        scanner.reset_to(TextSize::new(7));
        assert_eq!(scanner.next_token().text, "gamma");
    }

    #[test]
    fn test_jump_over_body_stops_at_matching_brace() {
        let mut scanner = scan("void m() { if (x) { y(); } } int z;");
        while scanner.next_token().kind != TokenKind::LBrace {}
        scanner.jump_over_body();
        let closing = scanner.next_token();
        assert_eq!(closing.kind, TokenKind::RBrace);
        assert_eq!(closing.range.start(), TextSize::new(27));
        assert_eq!(scanner.next_token().kind, TokenKind::Int);
    }

    #[test]
    fn test_jump_discards_errors_in_skipped_body() {
        let mut scanner = scan("{ # } x");
        assert_eq!(scanner.next_token().kind, TokenKind::LBrace);
        scanner.jump_over_body();
        assert_eq!(drain(&mut scanner), vec![TokenKind::RBrace, TokenKind::Identifier]);
        assert!(scanner.take_lexical_errors().is_empty());
    }

    #[test]
    fn test_bounds_limit_the_window() {
        let mut scanner = scan("class A { void m() { return; } }");
        scanner.set_bounds(TextRange::new(TextSize::new(19), TextSize::new(30)));
        assert_eq!(
            drain(&mut scanner),
            vec![TokenKind::LBrace, TokenKind::Return, TokenKind::Semicolon, TokenKind::RBrace]
        );
        assert_eq!(scanner.next_token().range, TextRange::empty(TextSize::new(30)));
    }

    #[test]
    fn test_unterminated_string_still_delivers_token() {
        let mut scanner = scan("x = \"abc\ny;");
        let kinds = drain(&mut scanner);
        assert_eq!(kinds[2], TokenKind::StringLiteral);
        let errors = scanner.take_lexical_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexicalErrorKind::UnterminatedString);
    }

    #[test]
    fn test_unterminated_comment_reported_at_eof() {
        let mut scanner = scan("class A /* never closed");
        assert_eq!(drain(&mut scanner).len(), 2);
        let errors = scanner.take_lexical_errors();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, LexicalErrorKind::UnterminatedComment);
    }

    #[test]
    fn test_unicode_escape_ranges_are_original() {
        let mut scanner = scan("int \\u0061b;");
        scanner.next_token();
        let ident = scanner.next_token();
        assert_eq!(ident.text, "ab");
        assert_eq!(ident.range, TextRange::new(TextSize::new(4), TextSize::new(11)));
    }

    #[test]
    fn test_module_mode_promotes_restricted_keywords() {
        let mut scanner = Scanner::new("module a { requires b; }", ScanMode::ModuleInfo);
        assert_eq!(scanner.next_token().kind, TokenKind::Module);
        let mut standard = scan("module a;");
        assert_eq!(standard.next_token().kind, TokenKind::Identifier);
    }

    #[test]
    fn test_literal_values_decoded() {
        let mut scanner = scan("0x10 'c'");
        assert_eq!(scanner.next_token().value, crate::lexer::TokenValue::Integer(16));
        assert_eq!(scanner.next_token().value, crate::lexer::TokenValue::Char('c'));
    }
}
