use std::collections::HashMap;

use tower_lsp::lsp_types::{
    CodeAction, CodeActionKind, CodeActionOrCommand, Command, Range, TextEdit, Url, WorkspaceEdit,
};
use vtoggle::{apply_edits, toggle_binding_actions, CancelToken, LineIndex, SfcDocument, ToggleAction};

use crate::backend::Backend;
use crate::config::ToggleBindingSettings;

impl Backend {
    /// Toggle actions for `range`. `sfc` must be the parse of `text`. When
    /// `only` is given, actions whose kind is not covered by one of its
    /// entries are left out.
    pub(super) fn build_toggle_binding_actions(
        text: &str,
        sfc: &SfcDocument,
        uri: &Url,
        range: Range,
        only: Option<&[CodeActionKind]>,
        settings: &ToggleBindingSettings,
        cancel: &CancelToken,
    ) -> Vec<CodeActionOrCommand> {
        if !settings.enabled {
            return Vec::new();
        }
        let index = LineIndex::new(text);
        let selection = Self::range_to_span(&index, range);
        toggle_binding_actions(sfc, selection, cancel)
            .into_iter()
            .filter(|action| Self::kind_requested(action.kind.tag(), only))
            .map(|action| {
                CodeActionOrCommand::CodeAction(Self::toggle_to_code_action(
                    text, &index, uri, action, settings,
                ))
            })
            .collect()
    }

    /// `refactor` covers `refactor.rewrite`; kinds nest on `.` and `/`.
    fn kind_requested(tag: &str, only: Option<&[CodeActionKind]>) -> bool {
        let Some(only) = only else {
            return true;
        };
        only.iter().any(|kind| {
            let kind = kind.as_str();
            tag == kind
                || tag
                    .strip_prefix(kind)
                    .is_some_and(|rest| rest.starts_with(['.', '/']))
        })
    }

    fn toggle_to_code_action(
        text: &str,
        index: &LineIndex,
        uri: &Url,
        action: ToggleAction,
        settings: &ToggleBindingSettings,
    ) -> CodeAction {
        let command = action.cursor.map(|cursor| {
            let edited = apply_edits(text, &action.edits);
            let position = LineIndex::new(&edited).position_at(cursor);
            Command {
                title: "Place cursor".to_string(),
                command: settings.set_selection_command.clone(),
                arguments: Some(vec![serde_json::json!({
                    "line": position.line,
                    "character": position.character,
                })]),
            }
        });
        let edits = action
            .edits
            .into_iter()
            .map(|edit| TextEdit {
                range: Self::span_to_range(index, edit.span),
                new_text: edit.new_text,
            })
            .collect();

        CodeAction {
            title: action.title,
            kind: Some(CodeActionKind::new(action.kind.tag())),
            diagnostics: None,
            edit: Some(WorkspaceEdit {
                changes: Some(HashMap::from([(uri.clone(), edits)])),
                document_changes: None,
                change_annotations: None,
            }),
            command,
            is_preferred: None,
            disabled: None,
            data: None,
        }
    }
}
