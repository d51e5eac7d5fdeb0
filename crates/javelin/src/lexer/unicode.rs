//! Unicode escape (`\uXXXX`) translation.
//!
//! Escapes are translated before tokenization, so an escape can spell any part of a
//! token, including its delimiters. A backslash only starts an escape when it is
//! preceded by an even number of contiguous backslashes, which keeps `\\u0041` a
//! two-character escape sequence inside a string. Any number of `u` may follow the
//! backslash.
//!
//! Token ranges must stay in original coordinates, so the translation records a
//! checkpoint per escape and [`Translated::to_original`] maps offsets back.

use crate::error::{LexicalError, LexicalErrorKind};
use crate::syntax::{TextRange, TextSize};
use std::borrow::Cow;

/// Source text after escape translation.
#[derive(Debug)]
pub(crate) struct Translated<'src> {
    pub text: Cow<'src, str>,
    /// `(translated, original)` offset pairs, sorted, one pair at each escape
    /// boundary.
    checkpoints: Vec<(u32, u32)>,
    pub errors: Vec<LexicalError>,
}

impl<'src> Translated<'src> {
    pub fn new(source: &'src str) -> Self {
        if memchr::memmem::find(source.as_bytes(), b"\\u").is_none() {
            return Self {
                text: Cow::Borrowed(source),
                checkpoints: Vec::new(),
                errors: Vec::new(),
            };
        }
        translate(source)
    }

    /// Maps an offset in the translated text back to the original source.
    pub fn to_original(&self, offset: usize) -> TextSize {
        let offset = u32::try_from(offset).unwrap_or(u32::MAX);
        let index = self.checkpoints.partition_point(|&(translated, _)| translated <= offset);
        match index.checked_sub(1).map(|i| self.checkpoints[i]) {
            Some((translated, original)) => TextSize::new(original + (offset - translated)),
            None => TextSize::new(offset),
        }
    }

    pub fn range_to_original(&self, start: usize, end: usize) -> TextRange {
        TextRange::new(self.to_original(start), self.to_original(end))
    }
}

fn translate(source: &str) -> Translated<'_> {
    let bytes = source.as_bytes();
    let mut text = String::with_capacity(source.len());
    let mut checkpoints = Vec::new();
    let mut errors = Vec::new();
    let mut copied = 0;
    let mut backslashes = 0usize;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            backslashes = 0;
            i += 1;
            continue;
        }
        if backslashes % 2 == 1 || bytes.get(i + 1) != Some(&b'u') {
            backslashes += 1;
            i += 1;
            continue;
        }

        let Some((unit, mut end)) = parse_escape(bytes, i) else {
            let end = malformed_end(bytes, i);
            errors.push(LexicalError::new(
                TextRange::new(offset(i), offset(end)),
                LexicalErrorKind::InvalidUnicodeEscape,
            ));
            backslashes += 1;
            i += 1;
            continue;
        };

        let ch = match unit {
            0xD800..=0xDBFF => match parse_escape(bytes, end) {
                Some((low @ 0xDC00..=0xDFFF, low_end)) => {
                    let code = 0x10000 + ((u32::from(unit) - 0xD800) << 10) + (u32::from(low) - 0xDC00);
                    end = low_end;
                    char::from_u32(code)
                }
                _ => None,
            },
            0xDC00..=0xDFFF => None,
            _ => char::from_u32(u32::from(unit)),
        };
        let ch = ch.unwrap_or_else(|| {
            errors.push(LexicalError::new(
                TextRange::new(offset(i), offset(end)),
                LexicalErrorKind::InvalidUnicodeEscape,
            ));
            char::REPLACEMENT_CHARACTER
        });

        text.push_str(&source[copied..i]);
        checkpoints.push((offset(text.len()).get(), offset(i).get()));
        text.push(ch);
        checkpoints.push((offset(text.len()).get(), offset(end).get()));
        copied = end;
        backslashes = 0;
        i = end;
    }
    text.push_str(&source[copied..]);

    Translated {
        text: Cow::Owned(text),
        checkpoints,
        errors,
    }
}

/// Parses `\u+XXXX` at `at`, returning the code unit and the end offset.
fn parse_escape(bytes: &[u8], at: usize) -> Option<(u16, usize)> {
    if bytes.get(at) != Some(&b'\\') || bytes.get(at + 1) != Some(&b'u') {
        return None;
    }
    let mut digits = at + 1;
    while bytes.get(digits) == Some(&b'u') {
        digits += 1;
    }
    let hex = bytes.get(digits..digits + 4)?;
    let hex = std::str::from_utf8(hex).ok()?;
    if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    let unit = u16::from_str_radix(hex, 16).ok()?;
    Some((unit, digits + 4))
}

fn malformed_end(bytes: &[u8], at: usize) -> usize {
    let mut end = at + 1;
    while bytes.get(end) == Some(&b'u') {
        end += 1;
    }
    let mut taken = 0;
    while taken < 4 && bytes.get(end).is_some_and(u8::is_ascii_hexdigit) {
        end += 1;
        taken += 1;
    }
    end
}

fn offset(value: usize) -> TextSize {
    TextSize::of_len(value)
}
