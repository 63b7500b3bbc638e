use serde::Serialize;

use crate::diagnostics::{Diagnostic, Span};
use crate::template::{parse_template, TemplateAst};

/// Offset in the outer document where the template body begins. This is the
/// only translation between document offsets and template-relative offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Anchor(usize);

impl Anchor {
    pub const fn new(offset: usize) -> Self {
        Self(offset)
    }

    pub const fn offset(self) -> usize {
        self.0
    }

    /// Document span → template span. `None` when the span starts before the
    /// template body.
    pub fn to_template(self, span: Span) -> Option<Span> {
        Some(Span::new(
            span.start.checked_sub(self.0)?,
            span.end.checked_sub(self.0)?,
        ))
    }

    /// Template span → document span.
    pub fn to_document(self, span: Span) -> Span {
        span.offset_by(self.0)
    }
}

#[derive(Debug, Clone)]
pub struct SfcTemplate {
    pub anchor: Anchor,
    pub lang: Option<String>,
    pub ast: TemplateAst,
}

#[derive(Debug, Clone, Default)]
pub struct SfcDocument {
    pub template: Option<SfcTemplate>,
    /// Template diagnostics, in document coordinates.
    pub diagnostics: Vec<Diagnostic>,
}

/// Extracts and parses the top-level `<template>` block of a single file
/// component. Templates written in another language (`lang="pug"`) or loaded
/// from a `src` file have no AST.
pub fn parse_sfc(text: &str) -> SfcDocument {
    let mut document = SfcDocument::default();
    let Some(block) = find_template_block(text) else {
        return document;
    };

    if block.has_src {
        return document;
    }
    if let Some(lang) = block.lang.as_deref() {
        if !lang.eq_ignore_ascii_case("html") {
            tracing::debug!(lang, "template language has no AST");
            return document;
        }
    }

    let anchor = Anchor::new(block.start_tag_end);
    let content = &text[block.start_tag_end..block.content_end];
    let (ast, diagnostics) = parse_template(content);
    document.diagnostics = diagnostics
        .into_iter()
        .map(|mut diag| {
            diag.span = anchor.to_document(diag.span);
            diag
        })
        .collect();
    if !block.closed {
        document.diagnostics.push(Diagnostic::new(
            "T1005",
            "missing `</template>`",
            Span::new(block.start, block.start_tag_end),
        ));
    }
    document.template = Some(SfcTemplate {
        anchor,
        lang: block.lang,
        ast,
    });
    document
}

struct TemplateBlock {
    start: usize,
    start_tag_end: usize,
    content_end: usize,
    closed: bool,
    lang: Option<String>,
    has_src: bool,
}

fn find_template_block(text: &str) -> Option<TemplateBlock> {
    let mut pos = 0usize;
    while let Some(idx) = text[pos..].find('<') {
        let start = pos + idx;
        let rest = &text[start..];
        if rest.starts_with("<!--") {
            pos = text[start + 4..]
                .find("-->")
                .map_or(text.len(), |end| start + 4 + end + 3);
            continue;
        }
        let name_len = rest[1..]
            .find(|c: char| c.is_ascii_whitespace() || c == '>' || c == '/')
            .unwrap_or(rest.len() - 1);
        let name = &rest[1..1 + name_len];
        if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            pos = start + 1;
            continue;
        }

        let (tag_end, attrs, self_closing) = scan_start_tag(text, start + 1 + name_len);
        if !name.eq_ignore_ascii_case("template") {
            // Skip the whole block so markup inside scripts and styles is ignored.
            pos = if self_closing {
                tag_end
            } else {
                find_closing_tag(text, tag_end, name).map_or(text.len(), |(_, end)| end)
            };
            continue;
        }
        if self_closing {
            return None;
        }

        let lang = attribute_value(attrs, "lang");
        let has_src = attribute_value(attrs, "src").is_some();
        let (content_end, closed) = match find_closing_tag(text, tag_end, "template") {
            Some((close_start, _)) => (close_start, true),
            None => (text.len(), false),
        };
        return Some(TemplateBlock {
            start,
            start_tag_end: tag_end,
            content_end,
            closed,
            lang,
            has_src,
        });
    }
    None
}

/// Returns the offset just past `>`, the raw attribute text and whether the
/// tag is self-closing. Quoted values may contain `>`.
fn scan_start_tag(text: &str, from: usize) -> (usize, &str, bool) {
    let bytes = text.as_bytes();
    let mut pos = from;
    let mut quote: Option<u8> = None;
    while pos < bytes.len() {
        let byte = bytes[pos];
        match quote {
            Some(q) if byte == q => quote = None,
            Some(_) => {}
            None if byte == b'"' || byte == b'\'' => quote = Some(byte),
            None if byte == b'>' => {
                let self_closing = pos > from && bytes[pos - 1] == b'/';
                return (pos + 1, &text[from..pos], self_closing);
            }
            None => {}
        }
        pos += 1;
    }
    (text.len(), &text[from..], false)
}

/// Finds the `</name>` matching an already opened `<name>`, balancing nested
/// tags with the same name. Returns the close tag's start and end.
fn find_closing_tag(text: &str, from: usize, name: &str) -> Option<(usize, usize)> {
    let lower = text.to_ascii_lowercase();
    let name = name.to_ascii_lowercase();
    let open = format!("<{name}");
    let close = format!("</{name}");
    // Script and style bodies are raw text, `<!--` there opens no comment.
    let skip_comments = !matches!(name.as_str(), "script" | "style");
    let mut depth = 0usize;
    let mut pos = from;
    while let Some(idx) = lower[pos..].find('<') {
        let at = pos + idx;
        let rest = &lower[at..];
        if skip_comments && rest.starts_with("<!--") {
            pos = lower[at + 4..].find("-->").map(|end| at + 4 + end + 3)?;
            continue;
        }
        if rest.starts_with(&close) && is_tag_boundary(&lower, at + close.len()) {
            let close_end = text[at..].find('>').map_or(text.len(), |end| at + end + 1);
            if depth == 0 {
                return Some((at, close_end));
            }
            depth -= 1;
            pos = close_end;
        } else if rest.starts_with(&open) && is_tag_boundary(&lower, at + open.len()) {
            let (tag_end, _, self_closing) = scan_start_tag(text, at + open.len());
            if !self_closing {
                depth += 1;
            }
            pos = tag_end;
        } else {
            pos = at + 1;
        }
    }
    None
}

fn is_tag_boundary(text: &str, at: usize) -> bool {
    text.as_bytes()
        .get(at)
        .map_or(true, |b| b.is_ascii_whitespace() || *b == b'>' || *b == b'/')
}

fn attribute_value(attrs: &str, name: &str) -> Option<String> {
    let mut rest = attrs;
    while let Some(idx) = rest.find(name) {
        let before_ok = idx == 0 || rest.as_bytes()[idx - 1].is_ascii_whitespace();
        let after = rest[idx + name.len()..].trim_start();
        if before_ok {
            if let Some(value) = after.strip_prefix('=') {
                let value = value.trim_start();
                let (quote, body) = match value.chars().next() {
                    Some(q @ ('"' | '\'')) => (Some(q), &value[1..]),
                    _ => (None, value),
                };
                let end = match quote {
                    Some(q) => body.find(q).unwrap_or(body.len()),
                    None => body
                        .find(|c: char| c.is_ascii_whitespace() || c == '/')
                        .unwrap_or(body.len()),
                };
                return Some(body[..end].to_string());
            }
            if after.is_empty() || after.starts_with(|c: char| c.is_ascii_whitespace() || c == '/') {
                return Some(String::new());
            }
        }
        rest = &rest[idx + name.len()..];
    }
    None
}
