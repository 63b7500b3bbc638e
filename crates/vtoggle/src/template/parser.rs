use crate::diagnostics::{Diagnostic, Span};

use super::ast::*;

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Parses a template body. Never fails: problems are reported as diagnostics
/// and the tree is recovered as well as possible.
pub fn parse_template(src: &str) -> (TemplateAst, Vec<Diagnostic>) {
    let mut parser = TemplateParser::new(src);
    let roots = parser.parse();
    (TemplateAst { roots }, parser.diagnostics)
}

struct TemplateParser<'a> {
    src: &'a str,
    bytes: &'a [u8],
    pos: usize,
    open: Vec<Element>,
    roots: Vec<Element>,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> TemplateParser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            bytes: src.as_bytes(),
            pos: 0,
            open: Vec::new(),
            roots: Vec::new(),
            diagnostics: Vec::new(),
        }
    }

    fn parse(&mut self) -> Vec<Element> {
        while self.pos < self.bytes.len() {
            if self.starts_with("<!--") {
                self.skip_comment();
            } else if self.starts_with("{{") {
                self.skip_interpolation();
            } else if self.starts_with("</") {
                self.parse_close_tag();
            } else if self.starts_with("<!") || self.starts_with("<?") {
                self.skip_past(b'>');
            } else if self.bytes[self.pos] == b'<'
                && self
                    .bytes
                    .get(self.pos + 1)
                    .is_some_and(|b| b.is_ascii_alphabetic())
            {
                self.parse_start_tag();
            } else {
                self.skip_text();
            }
        }

        while let Some(element) = self.open.pop() {
            self.emit_diag(
                "T1002",
                format!("unclosed element `{}`", element.tag),
                Span::new(element.span.start, element.span.start + element.tag.len() + 1),
            );
            self.finish(element, self.bytes.len());
        }
        std::mem::take(&mut self.roots)
    }

    fn starts_with(&self, needle: &str) -> bool {
        self.bytes[self.pos..].starts_with(needle.as_bytes())
    }

    fn find_from(&self, from: usize, needle: &str) -> Option<usize> {
        self.src.get(from..)?.find(needle).map(|idx| from + idx)
    }

    fn emit_diag(&mut self, code: &str, message: impl Into<String>, span: Span) {
        self.diagnostics.push(Diagnostic::new(code, message, span));
    }

    fn skip_past(&mut self, byte: u8) {
        while self.pos < self.bytes.len() {
            let current = self.bytes[self.pos];
            self.pos += 1;
            if current == byte {
                return;
            }
        }
    }

    fn skip_whitespace(&mut self) {
        while self
            .bytes
            .get(self.pos)
            .is_some_and(|b| b.is_ascii_whitespace())
        {
            self.pos += 1;
        }
    }

    fn skip_text(&mut self) {
        self.pos += 1;
        while self.pos < self.bytes.len() && !matches!(self.bytes[self.pos], b'<' | b'{') {
            self.pos += 1;
        }
    }

    fn skip_comment(&mut self) {
        let start = self.pos;
        match self.find_from(start + 4, "-->") {
            Some(end) => self.pos = end + 3,
            None => {
                self.emit_diag("T1004", "unterminated comment", Span::new(start, start + 4));
                self.pos = self.bytes.len();
            }
        }
    }

    fn skip_interpolation(&mut self) {
        let start = self.pos;
        match self.find_from(start + 2, "}}") {
            Some(end) => self.pos = end + 2,
            None => {
                self.emit_diag(
                    "T1006",
                    "unterminated interpolation",
                    Span::new(start, start + 2),
                );
                self.pos = self.bytes.len();
            }
        }
    }

    fn read_tag_name(&mut self) -> String {
        let start = self.pos;
        while self.pos < self.bytes.len()
            && !self.bytes[self.pos].is_ascii_whitespace()
            && !matches!(self.bytes[self.pos], b'/' | b'>')
        {
            self.pos += 1;
        }
        self.src[start..self.pos].to_string()
    }

    fn parse_close_tag(&mut self) {
        let start = self.pos;
        self.pos += 2;
        let tag = self.read_tag_name();
        self.skip_past(b'>');
        let end = self.pos;

        let Some(index) = self
            .open
            .iter()
            .rposition(|element| element.tag.eq_ignore_ascii_case(&tag))
        else {
            self.emit_diag(
                "T1003",
                format!("unexpected closing tag `{tag}`"),
                Span::new(start, end),
            );
            return;
        };

        while self.open.len() > index + 1 {
            let Some(unclosed) = self.open.pop() else {
                break;
            };
            self.emit_diag(
                "T1002",
                format!("unclosed element `{}`", unclosed.tag),
                Span::new(unclosed.span.start, unclosed.span.start + unclosed.tag.len() + 1),
            );
            self.finish(unclosed, start);
        }
        if let Some(element) = self.open.pop() {
            self.finish(element, end);
        }
    }

    fn finish(&mut self, mut element: Element, end: usize) {
        element.span.end = end;
        match self.open.last_mut() {
            Some(parent) => parent.children.push(element),
            None => self.roots.push(element),
        }
    }

    fn parse_start_tag(&mut self) {
        let start = self.pos;
        self.pos += 1;
        let tag = self.read_tag_name();
        let mut element = Element {
            tag,
            span: Span::empty(start),
            attributes: Vec::new(),
            children: Vec::new(),
            self_closing: false,
        };

        let mut terminated = false;
        while self.pos < self.bytes.len() {
            self.skip_whitespace();
            if self.pos >= self.bytes.len() {
                break;
            }
            if self.starts_with("/>") {
                self.pos += 2;
                element.self_closing = true;
                terminated = true;
                break;
            }
            match self.bytes[self.pos] {
                b'>' => {
                    self.pos += 1;
                    terminated = true;
                    break;
                }
                b'/' => self.pos += 1,
                _ => {
                    let attribute = self.parse_attribute();
                    element.attributes.push(attribute);
                }
            }
        }

        if !terminated {
            self.emit_diag(
                "T1002",
                format!("unterminated start tag `{}`", element.tag),
                Span::new(start, self.pos),
            );
            self.finish(element, self.pos);
            return;
        }

        let lower = element.tag.to_ascii_lowercase();
        if element.self_closing || VOID_ELEMENTS.contains(&lower.as_str()) {
            self.finish(element, self.pos);
            return;
        }
        if RAW_TEXT_ELEMENTS.contains(&lower.as_str()) {
            self.skip_raw_text(&lower);
        }
        self.open.push(element);
    }

    fn skip_raw_text(&mut self, tag: &str) {
        let closing = format!("</{tag}");
        let rest = &self.src[self.pos..];
        match rest.to_ascii_lowercase().find(&closing) {
            Some(idx) => self.pos += idx,
            None => self.pos = self.bytes.len(),
        }
    }

    fn parse_attribute(&mut self) -> Attribute {
        let start = self.pos;
        // The first character may be `=`; HTML keeps it as part of the name.
        self.pos += 1;
        while self.pos < self.bytes.len()
            && !self.bytes[self.pos].is_ascii_whitespace()
            && !matches!(self.bytes[self.pos], b'/' | b'>' | b'=')
        {
            self.pos += 1;
        }
        while !self.src.is_char_boundary(self.pos) {
            self.pos += 1;
        }
        let name_span = Span::new(start, self.pos);
        let name = self.src[start..self.pos].to_string();

        let after_name = self.pos;
        self.skip_whitespace();
        let value = if self.bytes.get(self.pos) == Some(&b'=') {
            self.pos += 1;
            self.skip_whitespace();
            Some(self.parse_attribute_value())
        } else {
            self.pos = after_name;
            None
        };

        let end = value.as_ref().map_or(name_span.end, |value| value.span.end);
        build_attribute(name, name_span, value, Span::new(start, end))
    }

    fn parse_attribute_value(&mut self) -> AttributeValue {
        let start = self.pos;
        match self.bytes.get(self.pos).copied() {
            Some(quote @ (b'"' | b'\'')) => {
                let content_start = start + 1;
                let quote = quote as char;
                match self.src[content_start..].find(quote) {
                    Some(idx) => {
                        let content_end = content_start + idx;
                        self.pos = content_end + 1;
                        AttributeValue {
                            content: self.src[content_start..content_end].to_string(),
                            quote: Some(quote),
                            span: Span::new(start, self.pos),
                            content_span: Span::new(content_start, content_end),
                        }
                    }
                    None => {
                        self.emit_diag(
                            "T1001",
                            "unterminated attribute value",
                            Span::new(start, start + 1),
                        );
                        self.pos = self.bytes.len();
                        AttributeValue {
                            content: self.src[content_start..].to_string(),
                            quote: Some(quote),
                            span: Span::new(start, self.pos),
                            content_span: Span::new(content_start, self.pos),
                        }
                    }
                }
            }
            _ => {
                while self.pos < self.bytes.len()
                    && !self.bytes[self.pos].is_ascii_whitespace()
                    && self.bytes[self.pos] != b'>'
                {
                    self.pos += 1;
                }
                AttributeValue {
                    content: self.src[start..self.pos].to_string(),
                    quote: None,
                    span: Span::new(start, self.pos),
                    content_span: Span::new(start, self.pos),
                }
            }
        }
    }
}

fn build_attribute(
    name: String,
    name_span: Span,
    value: Option<AttributeValue>,
    span: Span,
) -> Attribute {
    let Some(parts) = split_directive_name(&name) else {
        return Attribute::Static(StaticAttribute {
            name,
            name_span,
            value,
            span,
        });
    };

    let expression = value
        .filter(|value| !value.content.is_empty())
        .map(|value| DirectiveExpression {
            source: value.content,
            span: value.content_span,
        });
    let arg = parts.arg.map(|(offset, content)| DirectiveArg {
        is_static: !content.starts_with('['),
        span: Span::new(name_span.start + offset, name_span.start + offset + content.len()),
        content: content.to_string(),
    });

    Attribute::Directive(Directive {
        name: parts.name,
        prefix: parts.prefix,
        prefix_span: Span::new(name_span.start, name_span.start + parts.prefix_len),
        arg,
        modifiers: parts.modifiers,
        expression,
        raw_name: name,
        span,
    })
}

struct DirectiveName<'n> {
    name: String,
    prefix: DirectivePrefix,
    prefix_len: usize,
    /// Byte offset of the argument inside the raw name, and its text.
    arg: Option<(usize, &'n str)>,
    modifiers: Vec<String>,
}

fn split_directive_name(raw: &str) -> Option<DirectiveName<'_>> {
    let (name, prefix, arg_start) = if let Some(rest) = raw.strip_prefix("v-") {
        let len = rest.find([':', '.']).unwrap_or(rest.len());
        if len == 0 {
            return None;
        }
        let name = rest[..len].to_string();
        let after = 2 + len;
        if raw[after..].starts_with(':') {
            (name, DirectivePrefix::Long, Some(after + 1))
        } else {
            (name, DirectivePrefix::Long, None)
        }
    } else {
        let (name, prefix) = match raw.as_bytes().first()? {
            b':' => ("bind", DirectivePrefix::Colon),
            b'.' => ("bind", DirectivePrefix::Dot),
            b'@' => ("on", DirectivePrefix::At),
            b'#' => ("slot", DirectivePrefix::Hash),
            _ => return None,
        };
        (name.to_string(), prefix, Some(1))
    };

    let (arg, prefix_len, modifiers_start) = match arg_start {
        Some(arg_start) => {
            let rest = &raw[arg_start..];
            let arg_len = if rest.starts_with('[') {
                rest.find(']').map_or(rest.len(), |idx| idx + 1)
            } else {
                rest.find('.').unwrap_or(rest.len())
            };
            let arg = (arg_len > 0).then(|| (arg_start, &rest[..arg_len]));
            (arg, arg_start, arg_start + arg_len)
        }
        None => {
            let end = raw[2..].find('.').map_or(raw.len(), |idx| idx + 2);
            (None, end, end)
        }
    };

    let mut modifiers: Vec<String> = raw[modifiers_start..]
        .split('.')
        .filter(|modifier| !modifier.is_empty())
        .map(str::to_string)
        .collect();
    if prefix == DirectivePrefix::Dot && !modifiers.iter().any(|m| m == "prop") {
        modifiers.push("prop".to_string());
    }

    Some(DirectiveName {
        name,
        prefix,
        prefix_len,
        arg,
        modifiers,
    })
}
