use serde::Serialize;

use crate::diagnostics::Span;
use crate::sfc::Anchor;
use crate::template::Attribute;

use super::classify::{Classification, LiteralBinding};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ToggleKind {
    #[serde(rename = "toggle-binding/remove")]
    RemoveBinding,
    #[serde(rename = "toggle-binding/add")]
    AddBinding,
}

impl ToggleKind {
    /// Stable action kind, also used as the LSP code action kind.
    pub const fn tag(self) -> &'static str {
        match self {
            ToggleKind::RemoveBinding => "toggle-binding/remove",
            ToggleKind::AddBinding => "toggle-binding/add",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            ToggleKind::RemoveBinding => "Remove v-bind from attribute",
            ToggleKind::AddBinding => "Add v-bind to attribute",
        }
    }
}

/// Replacement of `span` (document offsets) by `new_text`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextEdit {
    pub span: Span,
    pub new_text: String,
}

impl TextEdit {
    pub fn delete(span: Span) -> Self {
        Self {
            span,
            new_text: String::new(),
        }
    }

    pub fn insert(at: usize, text: &str) -> Self {
        Self {
            span: Span::empty(at),
            new_text: text.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToggleAction {
    pub title: String,
    pub kind: ToggleKind,
    pub edits: Vec<TextEdit>,
    /// Caret offset in the text produced by applying `edits`.
    pub cursor: Option<usize>,
}

impl ToggleAction {
    fn new(kind: ToggleKind, edits: Vec<TextEdit>, cursor: Option<usize>) -> Self {
        Self {
            title: kind.title().to_string(),
            kind,
            edits,
            cursor,
        }
    }
}

pub fn synthesize(
    attribute: &Attribute,
    classification: &Classification,
    anchor: Anchor,
) -> Option<ToggleAction> {
    match classification {
        Classification::Ineligible(_) => None,
        Classification::Removable(binding) => Some(remove_binding(binding, anchor)),
        Classification::Addable { has_value } => {
            Some(add_binding(attribute.span(), *has_value, anchor))
        }
    }
}

/// Drops the binding marker and the literal's quotes. Everything between the
/// value delimiter and the opening quote goes too, as does everything after
/// the closing quote.
fn remove_binding(binding: &LiteralBinding, anchor: Anchor) -> ToggleAction {
    let expression = binding.expression;
    let opening_end =
        expression.start + binding.statement_pos + binding.leading_trivia_width + 1;
    let closing_start = expression.start + binding.literal.end - 1;
    let edits = [
        binding.prefix,
        Span::new(expression.start, opening_end),
        Span::new(closing_start, expression.end),
    ]
    .into_iter()
    .map(|span| TextEdit::delete(anchor.to_document(span)))
    .collect();
    ToggleAction::new(ToggleKind::RemoveBinding, edits, None)
}

fn add_binding(span: Span, has_value: bool, anchor: Anchor) -> ToggleAction {
    let span = anchor.to_document(span);
    let mut edits = vec![TextEdit::insert(span.start, ":")];
    let mut cursor = None;
    if !has_value {
        edits.push(TextEdit::insert(span.end, "=\"\""));
        // Shifted by the inserted `:` and `="`.
        cursor = Some(span.end + 3);
    }
    ToggleAction::new(ToggleKind::AddBinding, edits, cursor)
}

/// Applies non-overlapping edits to `text`. Edits that overlap an earlier
/// one or fall outside the text are dropped.
pub fn apply_edits(text: &str, edits: &[TextEdit]) -> String {
    let mut sorted: Vec<&TextEdit> = edits.iter().collect();
    sorted.sort_by_key(|edit| (edit.span.start, edit.span.end));

    let mut output = String::with_capacity(text.len());
    let mut last = 0usize;
    for edit in sorted {
        let Some(kept) = text
            .get(last..edit.span.start)
            .filter(|_| text.get(edit.span.start..edit.span.end).is_some())
        else {
            tracing::warn!(
                start = edit.span.start,
                end = edit.span.end,
                "dropping overlapping or out of range edit"
            );
            continue;
        };
        output.push_str(kept);
        output.push_str(&edit.new_text);
        last = edit.span.end;
    }
    output.push_str(&text[last..]);
    output
}
