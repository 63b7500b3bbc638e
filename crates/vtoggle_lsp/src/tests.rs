use tower_lsp::lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, DiagnosticSeverity, NumberOrString, Position,
    Range, Url,
};
use vtoggle::{parse_sfc, CancelToken, LineIndex, Span};

use crate::backend::Backend;
use crate::config::{ToggleBindingSettings, VtoggleConfig, DEFAULT_SET_SELECTION_COMMAND};

fn sample_text() -> &'static str {
    r#"<script setup>
const kind = 'text'
</script>

<template>
  <form>
    <input :type="'password'" disabled>
    <input type="text" :value="kind">
  </form>
</template>
"#
}

fn sample_uri() -> Url {
    Url::parse("file:///App.vue").expect("valid test uri")
}

fn position_for(text: &str, needle: &str) -> Position {
    let offset = text.find(needle).expect("needle exists");
    let mut line = 0u32;
    let mut column = 0u32;
    for (idx, ch) in text.char_indices() {
        if idx == offset {
            break;
        }
        if ch == '\n' {
            line += 1;
            column = 0;
        } else {
            column += ch.len_utf16() as u32;
        }
    }
    Position::new(line, column)
}

fn caret_range(text: &str, needle: &str) -> Range {
    let position = position_for(text, needle);
    let position = Position::new(position.line, position.character + 1);
    Range::new(position, position)
}

fn actions_for(text: &str, range: Range) -> Vec<CodeAction> {
    actions_with(text, range, None, &ToggleBindingSettings::default())
}

fn actions_with(
    text: &str,
    range: Range,
    only: Option<&[CodeActionKind]>,
    settings: &ToggleBindingSettings,
) -> Vec<CodeAction> {
    let sfc = parse_sfc(text);
    Backend::build_toggle_binding_actions(
        text,
        &sfc,
        &sample_uri(),
        range,
        only,
        settings,
        &CancelToken::new(),
    )
    .into_iter()
    .map(|action| match action {
        CodeActionOrCommand::CodeAction(action) => action,
        CodeActionOrCommand::Command(command) => panic!("unexpected bare command {command:?}"),
    })
    .collect()
}

fn apply_lsp_edits(text: &str, action: &CodeAction) -> String {
    let changes = action
        .edit
        .as_ref()
        .and_then(|edit| edit.changes.as_ref())
        .expect("workspace edit");
    let edits = changes.get(&sample_uri()).expect("edits for the document");
    let index = LineIndex::new(text);
    let mut spans: Vec<(Span, &str)> = edits
        .iter()
        .map(|edit| (Backend::range_to_span(&index, edit.range), edit.new_text.as_str()))
        .collect();
    spans.sort_by_key(|(span, _)| std::cmp::Reverse(span.start));
    let mut out = text.to_string();
    for (span, new_text) in spans {
        out.replace_range(span.start..span.end, new_text);
    }
    out
}

#[test]
fn remove_binding_action_has_three_deletions() {
    let text = sample_text();
    let actions = actions_for(text, caret_range(text, "type=\"'password'\""));
    assert_eq!(actions.len(), 1);
    let action = &actions[0];
    assert_eq!(action.title, "Remove v-bind from attribute");
    assert_eq!(
        action.kind,
        Some(CodeActionKind::new("toggle-binding/remove"))
    );
    assert!(action.command.is_none());
    let edits = &action.edit.as_ref().and_then(|e| e.changes.as_ref()).expect("changes")[&sample_uri()];
    assert_eq!(edits.len(), 3);
    assert!(edits.iter().all(|edit| edit.new_text.is_empty()));
    assert!(apply_lsp_edits(text, action).contains(r#"<input type="password" disabled>"#));
}

#[test]
fn add_binding_action_requests_cursor_placement() {
    let text = sample_text();
    let actions = actions_for(text, caret_range(text, "disabled"));
    assert_eq!(actions.len(), 1);
    let action = &actions[0];
    assert_eq!(action.kind, Some(CodeActionKind::new("toggle-binding/add")));

    let edited = apply_lsp_edits(text, action);
    assert!(edited.contains(r#"<input :type="'password'" :disabled="">"#));

    let command = action.command.as_ref().expect("cursor command");
    assert_eq!(command.command, DEFAULT_SET_SELECTION_COMMAND);
    let arguments = command.arguments.as_ref().expect("arguments");
    let expected = position_for(&edited, ":disabled=\"\"");
    let expected = Position::new(expected.line, expected.character + ":disabled=\"".len() as u32);
    assert_eq!(
        arguments[0],
        serde_json::json!({ "line": expected.line, "character": expected.character })
    );
}

#[test]
fn add_binding_to_valued_attribute_has_no_command() {
    let text = sample_text();
    let actions = actions_for(text, caret_range(text, "type=\"text\""));
    assert_eq!(actions.len(), 1);
    assert!(actions[0].command.is_none());
    assert!(apply_lsp_edits(text, &actions[0]).contains(r#"<input :type="text" :value="kind">"#));
}

#[test]
fn identifier_binding_offers_nothing() {
    let text = sample_text();
    assert!(actions_for(text, caret_range(text, ":value")).is_empty());
}

#[test]
fn selections_outside_attributes_offer_nothing() {
    let text = sample_text();
    assert!(actions_for(text, caret_range(text, "const kind")).is_empty());
    assert!(actions_for(text, caret_range(text, "<form>")).is_empty());

    let start = position_for(text, "type=\"text\"");
    let end = position_for(text, ":value");
    assert!(actions_for(text, Range::new(start, end)).is_empty());
    assert!(actions_for("", Range::default()).is_empty());
}

#[test]
fn disabled_setting_turns_actions_off() {
    let text = sample_text();
    let settings = ToggleBindingSettings {
        enabled: false,
        ..ToggleBindingSettings::default()
    };
    let actions = actions_with(text, caret_range(text, "disabled"), None, &settings);
    assert!(actions.is_empty());
}

#[test]
fn only_filter_matches_kind_prefixes() {
    let text = sample_text();
    let range = caret_range(text, "disabled");
    let settings = ToggleBindingSettings::default();

    let prefix = [CodeActionKind::new("toggle-binding")];
    assert_eq!(actions_with(text, range, Some(&prefix), &settings).len(), 1);
    let exact = [CodeActionKind::new("toggle-binding/add")];
    assert_eq!(actions_with(text, range, Some(&exact), &settings).len(), 1);
    let other = [CodeActionKind::QUICKFIX];
    assert!(actions_with(text, range, Some(&other), &settings).is_empty());
    let partial = [CodeActionKind::new("toggle")];
    assert!(actions_with(text, range, Some(&partial), &settings).is_empty());
}

#[test]
fn custom_selection_command_is_used() {
    let text = sample_text();
    let settings = ToggleBindingSettings {
        set_selection_command: "editor.setSelection".to_string(),
        ..ToggleBindingSettings::default()
    };
    let actions = actions_with(text, caret_range(text, "disabled"), None, &settings);
    let command = actions[0].command.as_ref().expect("cursor command");
    assert_eq!(command.command, "editor.setSelection");
}

#[test]
fn build_diagnostics_reports_template_errors() {
    let text = "<template>\n  <div :title=\"'x'>\n</template>\n";
    let sfc = parse_sfc(text);
    let diagnostics = Backend::build_diagnostics(text, &sfc);
    assert!(!diagnostics.is_empty());
    assert_eq!(diagnostics[0].severity, Some(DiagnosticSeverity::ERROR));
    assert_eq!(diagnostics[0].source.as_deref(), Some("vtoggle"));
    assert!(diagnostics.iter().any(|diag| {
        matches!(diag.code.as_ref(), Some(NumberOrString::String(code)) if code == "T1001")
    }));
}

#[test]
fn build_diagnostics_is_empty_for_clean_documents() {
    let text = sample_text();
    assert!(Backend::build_diagnostics(text, &parse_sfc(text)).is_empty());
}

#[test]
fn diagnostics_ranges_use_document_lines() {
    let text = "<template>\n<p>\n</template>\n";
    let diagnostics = Backend::build_diagnostics(text, &parse_sfc(text));
    let unclosed = diagnostics
        .iter()
        .find(|diag| diag.code == Some(NumberOrString::String("T1002".to_string())))
        .expect("unclosed element");
    assert_eq!(unclosed.range.start, Position::new(1, 0));
    assert_eq!(unclosed.range.end, Position::new(1, 2));
}

#[test]
fn range_conversion_counts_utf16_units() {
    let text = "<template><p title=\"\u{1F600}\" lang=\"x\"></p></template>";
    let index = LineIndex::new(text);
    let range = caret_range(text, "lang");
    let span = Backend::range_to_span(&index, range);
    assert_eq!(span.start, text.find("lang").expect("lang") + 1);
    assert_eq!(Backend::span_to_range(&index, span), range);
}

#[test]
fn config_parses_bare_and_sectioned_settings() {
    let mut settings = ToggleBindingSettings::default();
    VtoggleConfig::from_settings(serde_json::json!({
        "toggleBinding": { "enabled": false }
    }))
    .expect("valid config")
    .apply_to(&mut settings);
    assert!(!settings.enabled);
    assert_eq!(settings.set_selection_command, DEFAULT_SET_SELECTION_COMMAND);

    VtoggleConfig::from_settings(serde_json::json!({
        "vtoggle": { "toggleBinding": { "enabled": true, "setSelectionCommand": "x.select" } }
    }))
    .expect("valid config")
    .apply_to(&mut settings);
    assert!(settings.enabled);
    assert_eq!(settings.set_selection_command, "x.select");

    VtoggleConfig::from_settings(serde_json::Value::Null)
        .expect("null settings")
        .apply_to(&mut settings);
    assert_eq!(settings.set_selection_command, "x.select");
}

#[test]
fn config_rejects_wrong_types() {
    let result = VtoggleConfig::from_settings(serde_json::json!({
        "toggleBinding": { "enabled": "yes" }
    }));
    assert!(result.is_err());
}
