use std::sync::Arc;

use tokio::sync::Mutex;
use tower_lsp::lsp_types::{Position, Range, Url};
use tower_lsp::Client;
use vtoggle::{parse_sfc, CancelToken, LineIndex, LinePosition, SfcDocument, Span};

use crate::state::{BackendState, DocumentState};

pub(super) struct Backend {
    pub(super) client: Client,
    pub(super) state: Arc<Mutex<BackendState>>,
}

impl Backend {
    pub(super) fn new(client: Client) -> Self {
        Self {
            client,
            state: Arc::new(Mutex::new(BackendState::default())),
        }
    }

    pub(super) fn to_lsp_position(position: LinePosition) -> Position {
        Position::new(position.line, position.character)
    }

    pub(super) fn span_to_range(index: &LineIndex, span: Span) -> Range {
        Range::new(
            Self::to_lsp_position(index.position_at(span.start)),
            Self::to_lsp_position(index.position_at(span.end)),
        )
    }

    pub(super) fn range_to_span(index: &LineIndex, range: Range) -> Span {
        let start = index.offset_at(LinePosition::new(range.start.line, range.start.character));
        let end = index.offset_at(LinePosition::new(range.end.line, range.end.character));
        Span::new(start.min(end), start.max(end))
    }

    /// Stores a fresh snapshot of `text` and returns it with its parse. Any
    /// request still running against the previous snapshot is cancelled.
    pub(super) async fn update_document(
        &self,
        uri: Url,
        text: String,
        version: Option<i32>,
    ) -> (Arc<str>, Arc<SfcDocument>) {
        let sfc = Arc::new(parse_sfc(&text));
        let text: Arc<str> = Arc::from(text);
        let document = DocumentState {
            text: Arc::clone(&text),
            sfc: Arc::clone(&sfc),
            version,
            cancel: CancelToken::new(),
        };
        let mut state = self.state.lock().await;
        if let Some(previous) = state.documents.insert(uri, document) {
            previous.cancel.cancel();
        }
        (text, sfc)
    }

    pub(super) async fn remove_document(&self, uri: &Url) {
        let mut state = self.state.lock().await;
        if let Some(previous) = state.documents.remove(uri) {
            previous.cancel.cancel();
        }
    }

    pub(super) async fn with_document<F, R>(&self, uri: &Url, f: F) -> Option<R>
    where
        F: FnOnce(&DocumentState) -> R,
    {
        let state = self.state.lock().await;
        state.documents.get(uri).map(f)
    }
}
