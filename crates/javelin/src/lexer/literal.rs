//! Literal decoding.
//!
//! The logos patterns are deliberately permissive about digit separators and digit
//! ranges; the rules they leave out are checked here so that a malformed literal
//! still lexes as one token and gets a precise message.

use super::token::{TokenKind, TokenValue};
use crate::error::LexicalErrorKind;
use compact_str::CompactString;

/// Decodes the value of a literal token.
///
/// Returns the value, which is [`TokenValue::None`] when decoding failed, and the first
/// problem found.
pub(crate) fn decode(kind: TokenKind, text: &str) -> (TokenValue, Option<LexicalErrorKind>) {
    let result = match kind {
        TokenKind::IntegerLiteral => integer(text, 32),
        TokenKind::LongLiteral => integer(&text[..text.len() - 1], 64),
        TokenKind::FloatLiteral => floating(text, true),
        TokenKind::DoubleLiteral => floating(text, false),
        TokenKind::CharLiteral => character(&text[1..text.len() - 1]),
        TokenKind::StringLiteral => string(&text[1..text.len() - 1]).map(TokenValue::String),
        TokenKind::UnterminatedString => string(&text[1..]).map(TokenValue::String),
        TokenKind::True => Ok(TokenValue::Bool(true)),
        TokenKind::False => Ok(TokenValue::Bool(false)),
        TokenKind::Null => Ok(TokenValue::Null),
        _ => Ok(TokenValue::None),
    };
    match result {
        Ok(value) => (value, None),
        Err(error) => (TokenValue::None, Some(error)),
    }
}

fn integer(text: &str, bits: u32) -> Result<TokenValue, LexicalErrorKind> {
    let (radix, digits, prefixed) = if let Some(rest) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
        (16, rest, true)
    } else if let Some(rest) = text.strip_prefix("0b").or_else(|| text.strip_prefix("0B")) {
        (2, rest, true)
    } else if text.len() > 1 && text.starts_with('0') {
        (8, &text[1..], false)
    } else {
        (10, text, false)
    };

    if digits.ends_with('_') || (prefixed && digits.starts_with('_')) {
        return Err(LexicalErrorKind::MalformedNumber {
            reason: "underscores must separate digits",
        });
    }
    let cleaned: CompactString = digits.chars().filter(|&c| c != '_').collect();
    if cleaned.is_empty() {
        return Err(LexicalErrorKind::MalformedNumber {
            reason: "missing digits after the radix prefix",
        });
    }
    if radix == 8 && cleaned.bytes().any(|b| b > b'7') {
        return Err(LexicalErrorKind::MalformedNumber {
            reason: "invalid digit in octal literal",
        });
    }

    let overflow = || LexicalErrorKind::NumberOverflow {
        literal: CompactString::from(text),
    };
    let magnitude = u64::from_str_radix(&cleaned, radix).map_err(|_| overflow())?;
    let value = match (radix, bits) {
        // Decimal literals may reach MIN's magnitude; only unary minus makes them valid.
        (10, 32) if magnitude <= 1 << 31 => i64::try_from(magnitude).map_err(|_| overflow())?,
        (10, 64) if magnitude <= 1 << 63 => magnitude.cast_signed(),
        (10, _) => return Err(overflow()),
        (_, 32) => {
            let narrow = u32::try_from(magnitude).map_err(|_| overflow())?;
            i64::from(narrow.cast_signed())
        }
        _ => magnitude.cast_signed(),
    };
    Ok(TokenValue::Integer(value))
}

fn floating(text: &str, single: bool) -> Result<TokenValue, LexicalErrorKind> {
    let body = text.trim_end_matches(['f', 'F', 'd', 'D']);
    let bytes = body.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        if b != b'_' {
            continue;
        }
        let before = i.checked_sub(1).map(|j| bytes[j]);
        let after = bytes.get(i + 1).copied();
        if !before.is_some_and(|c| c.is_ascii_digit() || c == b'_')
            || !after.is_some_and(|c| c.is_ascii_digit() || c == b'_')
        {
            return Err(LexicalErrorKind::MalformedNumber {
                reason: "underscores must separate digits",
            });
        }
    }
    let cleaned: CompactString = body.chars().filter(|&c| c != '_').collect();
    let malformed = |_| LexicalErrorKind::MalformedNumber {
        reason: "invalid floating-point literal",
    };

    let (value, infinite) = if single {
        let value: f32 = cleaned.parse().map_err(malformed)?;
        (f64::from(value), value.is_infinite())
    } else {
        let value: f64 = cleaned.parse().map_err(malformed)?;
        (value, value.is_infinite())
    };
    if infinite {
        return Err(LexicalErrorKind::NumberOverflow {
            literal: CompactString::from(text),
        });
    }
    Ok(TokenValue::Float(value))
}

fn character(body: &str) -> Result<TokenValue, LexicalErrorKind> {
    let decoded = string(body)?;
    let mut chars = decoded.chars();
    match (chars.next(), chars.next()) {
        (None, _) => Err(LexicalErrorKind::EmptyCharLiteral),
        (Some(ch), None) => Ok(TokenValue::Char(ch)),
        (Some(_), Some(_)) => Err(LexicalErrorKind::InvalidCharLiteral),
    }
}

/// Decodes escape sequences in a string or character body.
fn string(body: &str) -> Result<CompactString, LexicalErrorKind> {
    if !body.contains('\\') {
        return Ok(CompactString::from(body));
    }
    let mut out = CompactString::with_capacity(body.len());
    let mut chars = body.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        let Some(escape) = chars.next() else {
            return Err(LexicalErrorKind::InvalidEscape { escape: "\\".into() });
        };
        let decoded = match escape {
            'b' => '\u{8}',
            't' => '\t',
            'n' => '\n',
            'f' => '\u{c}',
            'r' => '\r',
            's' => ' ',
            '"' => '"',
            '\'' => '\'',
            '\\' => '\\',
            '0'..='7' => {
                // Up to three octal digits, at most \377.
                let max_len = if escape <= '3' { 3 } else { 2 };
                let mut code = escape.to_digit(8).unwrap_or(0);
                let mut len = 1;
                while len < max_len {
                    match chars.peek().and_then(|c| c.to_digit(8)) {
                        Some(digit) => {
                            code = code * 8 + digit;
                            chars.next();
                            len += 1;
                        }
                        None => break,
                    }
                }
                char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER)
            }
            other => {
                return Err(LexicalErrorKind::InvalidEscape {
                    escape: compact_str::format_compact!("\\{other}"),
                });
            }
        };
        out.push(decoded);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn value(kind: TokenKind, text: &str) -> TokenValue {
        let (value, error) = decode(kind, text);
        assert_eq!(error, None, "unexpected error for {text}");
        value
    }

    fn error(kind: TokenKind, text: &str) -> LexicalErrorKind {
        decode(kind, text).1.expect("expected an error")
    }

    #[test]
    fn test_integer_radixes() {
        assert_eq!(value(TokenKind::IntegerLiteral, "42"), TokenValue::Integer(42));
        assert_eq!(value(TokenKind::IntegerLiteral, "0x1F"), TokenValue::Integer(31));
        assert_eq!(value(TokenKind::IntegerLiteral, "0b101"), TokenValue::Integer(5));
        assert_eq!(value(TokenKind::IntegerLiteral, "017"), TokenValue::Integer(15));
        assert_eq!(value(TokenKind::IntegerLiteral, "1_000_000"), TokenValue::Integer(1_000_000));
        assert_eq!(value(TokenKind::IntegerLiteral, "0"), TokenValue::Integer(0));
    }

    #[test]
    fn test_integer_limits() {
        assert_eq!(value(TokenKind::IntegerLiteral, "2147483648"), TokenValue::Integer(2_147_483_648));
        assert_eq!(value(TokenKind::IntegerLiteral, "0xFFFFFFFF"), TokenValue::Integer(-1));
        assert!(matches!(
            error(TokenKind::IntegerLiteral, "2147483649"),
            LexicalErrorKind::NumberOverflow { .. }
        ));
        assert!(matches!(
            error(TokenKind::IntegerLiteral, "0x1FFFFFFFF"),
            LexicalErrorKind::NumberOverflow { .. }
        ));
        assert_eq!(value(TokenKind::LongLiteral, "9223372036854775808L"), TokenValue::Integer(i64::MIN));
        assert_eq!(value(TokenKind::LongLiteral, "0xFFFFFFFFFFFFFFFFL"), TokenValue::Integer(-1));
    }

    #[test]
    fn test_malformed_integers() {
        assert!(matches!(error(TokenKind::IntegerLiteral, "1_"), LexicalErrorKind::MalformedNumber { .. }));
        assert!(matches!(error(TokenKind::IntegerLiteral, "0x_1"), LexicalErrorKind::MalformedNumber { .. }));
        assert!(matches!(error(TokenKind::IntegerLiteral, "09"), LexicalErrorKind::MalformedNumber { .. }));
        assert!(matches!(error(TokenKind::IntegerLiteral, "0x_"), LexicalErrorKind::MalformedNumber { .. }));
    }

    #[test]
    fn test_floating() {
        assert_eq!(value(TokenKind::DoubleLiteral, "1.5"), TokenValue::Float(1.5));
        assert_eq!(value(TokenKind::DoubleLiteral, ".5"), TokenValue::Float(0.5));
        assert_eq!(value(TokenKind::DoubleLiteral, "1e3"), TokenValue::Float(1000.0));
        assert_eq!(value(TokenKind::DoubleLiteral, "2d"), TokenValue::Float(2.0));
        assert_eq!(value(TokenKind::FloatLiteral, "2.5f"), TokenValue::Float(2.5));
        assert!(matches!(error(TokenKind::FloatLiteral, "1e40f"), LexicalErrorKind::NumberOverflow { .. }));
        assert!(matches!(error(TokenKind::DoubleLiteral, "1_.5"), LexicalErrorKind::MalformedNumber { .. }));
    }

    #[test]
    fn test_char_literals() {
        assert_eq!(value(TokenKind::CharLiteral, "'a'"), TokenValue::Char('a'));
        assert_eq!(value(TokenKind::CharLiteral, "'\\n'"), TokenValue::Char('\n'));
        assert_eq!(value(TokenKind::CharLiteral, "'\\101'"), TokenValue::Char('A'));
        assert_eq!(error(TokenKind::CharLiteral, "''"), LexicalErrorKind::EmptyCharLiteral);
        assert_eq!(error(TokenKind::CharLiteral, "'ab'"), LexicalErrorKind::InvalidCharLiteral);
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(
            value(TokenKind::StringLiteral, "\"a\\tb\\\\\""),
            TokenValue::String("a\tb\\".into())
        );
        assert_eq!(
            error(TokenKind::StringLiteral, "\"\\q\""),
            LexicalErrorKind::InvalidEscape { escape: "\\q".into() }
        );
    }

    #[test]
    fn test_keyword_literals() {
        assert_eq!(value(TokenKind::True, "true"), TokenValue::Bool(true));
        assert_eq!(value(TokenKind::Null, "null"), TokenValue::Null);
        assert_eq!(value(TokenKind::Identifier, "x"), TokenValue::None);
    }
}
