use std::collections::HashMap;
use std::sync::Arc;

use tower_lsp::lsp_types::Url;
use vtoggle::{CancelToken, SfcDocument};

use crate::config::ToggleBindingSettings;

/// One open document. Text and parse are immutable snapshots; an edit
/// replaces the whole entry and cancels the token handed out for the old one.
pub(super) struct DocumentState {
    pub(super) text: Arc<str>,
    pub(super) sfc: Arc<SfcDocument>,
    pub(super) version: Option<i32>,
    pub(super) cancel: CancelToken,
}

#[derive(Default)]
pub(super) struct BackendState {
    pub(super) documents: HashMap<Url, DocumentState>,
    pub(super) toggle_binding: ToggleBindingSettings,
}
