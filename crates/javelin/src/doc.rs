//! Doc comments attached to declarations.
//!
//! The scanner keeps `/** ... */` comments aside as [`RawDocComment`]s. When a
//! declaration is reduced the parser asks for the comment directly before it and runs
//! it through a [`DocCommentParser`]. [`TagScanner`] is the default: it splits the
//! comment into a summary and block tags and flags `@deprecated`.

use crate::lexer::RawDocComment;
use crate::syntax::TextRange;
use compact_str::CompactString;

/// A parsed doc comment.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct DocComment {
    pub range: TextRange,
    /// Comment body with delimiters and leading `*` stripped.
    pub text: CompactString,
    /// Text before the first block tag.
    pub summary: CompactString,
    pub tags: Vec<DocTag>,
    pub deprecated: bool,
}

impl DocComment {
    pub fn tags_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DocTag> {
        self.tags.iter().filter(move |tag| tag.name == name)
    }
}

/// A block tag such as `@param name text`.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct DocTag {
    /// Tag name without the `@`.
    pub name: CompactString,
    pub text: CompactString,
    /// From the `@` to the end of the tag's last line.
    pub range: TextRange,
}

/// Turns raw doc comments into [`DocComment`]s.
pub trait DocCommentParser: Send + Sync {
    fn parse(&self, raw: &RawDocComment) -> Option<DocComment>;
}

/// Line-based tag splitter.
#[derive(Debug, Clone, Copy, Default)]
pub struct TagScanner;

impl DocCommentParser for TagScanner {
    fn parse(&self, raw: &RawDocComment) -> Option<DocComment> {
        let inner = raw.text.strip_prefix("/**")?;
        let inner = inner.strip_suffix("*/").unwrap_or(inner);
        let base = raw.range.start() + 3;

        let mut summary = String::new();
        let mut body = String::new();
        let mut tags: Vec<DocTag> = Vec::new();
        let mut offset = 0usize;

        for line in inner.split_inclusive('\n') {
            let line_start = offset;
            offset += line.len();
            let (content, content_start) = strip_decoration(line);
            let content = content.trim_end();
            let absolute = |position: usize| base + position as u32;

            if !body.is_empty() || !content.is_empty() {
                if !body.is_empty() {
                    body.push('\n');
                }
                body.push_str(content);
            }

            if let Some(tag_line) = content.strip_prefix('@') {
                let name_len = tag_line
                    .find(char::is_whitespace)
                    .unwrap_or(tag_line.len());
                let name = &tag_line[..name_len];
                if !name.is_empty() {
                    let start = absolute(line_start + content_start);
                    let end = absolute(line_start + content_start + content.len());
                    tags.push(DocTag {
                        name: name.into(),
                        text: tag_line[name_len..].trim().into(),
                        range: TextRange::new(start, end),
                    });
                    continue;
                }
            }

            match tags.last_mut() {
                Some(tag) => {
                    if !content.is_empty() {
                        if !tag.text.is_empty() {
                            tag.text.push(' ');
                        }
                        tag.text.push_str(content);
                        tag.range = tag.range.with_end(absolute(
                            line_start + content_start + content.len(),
                        ));
                    }
                }
                None if !content.is_empty() => {
                    if !summary.is_empty() {
                        summary.push(' ');
                    }
                    summary.push_str(content);
                }
                None => {}
            }
        }

        let deprecated = tags.iter().any(|tag| tag.name == "deprecated");
        Some(DocComment {
            range: raw.range,
            text: body.trim_end().into(),
            summary: summary.into(),
            tags,
            deprecated,
        })
    }
}

/// Strips leading blanks and one run of `*` decoration, returning the content and its
/// byte offset in `line`.
fn strip_decoration(line: &str) -> (&str, usize) {
    let trimmed = line.trim_start();
    let mut start = line.len() - trimmed.len();
    let rest = trimmed.trim_start_matches('*');
    if rest.len() != trimmed.len() {
        start += trimmed.len() - rest.len();
        let content = rest.trim_start();
        start += rest.len() - content.len();
        return (content, start);
    }
    (trimmed, start)
}
