use serde::Serialize;

use crate::diagnostics::Span;

/// Parsed template body. All spans are relative to the start of the body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct TemplateAst {
    pub roots: Vec<Element>,
}

impl TemplateAst {
    /// Depth-first, source-ordered iterator over every element.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        let mut stack: Vec<&Element> = self.roots.iter().rev().collect();
        std::iter::from_fn(move || {
            let element = stack.pop()?;
            stack.extend(element.children.iter().rev());
            Some(element)
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Element {
    pub tag: String,
    pub span: Span,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Element>,
    pub self_closing: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Attribute {
    Static(StaticAttribute),
    Directive(Directive),
}

impl Attribute {
    pub fn span(&self) -> Span {
        match self {
            Attribute::Static(attr) => attr.span,
            Attribute::Directive(dir) => dir.span,
        }
    }

    /// The attribute name as written, e.g. `disabled` or `:type`.
    pub fn raw_name(&self) -> &str {
        match self {
            Attribute::Static(attr) => &attr.name,
            Attribute::Directive(dir) => &dir.raw_name,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StaticAttribute {
    pub name: String,
    pub name_span: Span,
    pub value: Option<AttributeValue>,
    pub span: Span,
}

/// A raw attribute value. `span` includes the quotes when present,
/// `content_span` never does.
#[derive(Debug, Clone, Serialize)]
pub struct AttributeValue {
    pub content: String,
    pub quote: Option<char>,
    pub span: Span,
    pub content_span: Span,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DirectivePrefix {
    /// `:arg`
    Colon,
    /// `.arg`, a `v-bind` with the `.prop` modifier implied.
    Dot,
    /// `@arg`
    At,
    /// `#arg`
    Hash,
    /// `v-name` or `v-name:arg`
    Long,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectiveArg {
    pub content: String,
    pub is_static: bool,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct DirectiveExpression {
    /// Raw source between the value quotes.
    pub source: String,
    pub span: Span,
}

#[derive(Debug, Clone, Serialize)]
pub struct Directive {
    /// Normalized directive name: `bind`, `on`, `slot`, `if`, `model`, ...
    pub name: String,
    pub raw_name: String,
    pub prefix: DirectivePrefix,
    /// Span of the marker in front of the argument (`:`, `v-bind:`, `@`, ...).
    pub prefix_span: Span,
    pub arg: Option<DirectiveArg>,
    pub modifiers: Vec<String>,
    pub expression: Option<DirectiveExpression>,
    pub span: Span,
}

impl Directive {
    pub fn is_binding(&self) -> bool {
        self.name == "bind"
    }
}
