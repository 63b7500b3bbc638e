use std::sync::Arc;

use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::{
    CodeActionKind, CodeActionOptions, CodeActionOrCommand, CodeActionParams,
    CodeActionProviderCapability, DidChangeConfigurationParams, DidChangeTextDocumentParams,
    DidCloseTextDocumentParams, DidOpenTextDocumentParams, InitializeParams, InitializeResult,
    InitializedParams, MessageType, ServerCapabilities, ServerInfo, TextDocumentSyncCapability,
    TextDocumentSyncKind, Url,
};
use tower_lsp::{LanguageServer, LspService, Server};
use vtoggle::{render_diagnostics, ToggleKind};

use crate::backend::Backend;
use crate::config::VtoggleConfig;

impl Backend {
    async fn apply_settings(&self, settings: serde_json::Value) {
        let config = match VtoggleConfig::from_settings(settings) {
            Ok(config) => config,
            Err(err) => {
                self.client
                    .log_message(
                        MessageType::WARNING,
                        format!("Failed to parse configuration: {err}"),
                    )
                    .await;
                return;
            }
        };
        let mut state = self.state.lock().await;
        config.apply_to(&mut state.toggle_binding);
        tracing::debug!(settings = ?state.toggle_binding, "configuration updated");
    }

    async fn refresh_document(&self, uri: Url, text: String, version: Option<i32>) {
        let (text, sfc) = self.update_document(uri.clone(), text, version).await;
        if !sfc.diagnostics.is_empty() {
            tracing::debug!(
                "template problems:\n{}",
                render_diagnostics(uri.path(), &sfc.diagnostics)
            );
        }
        let diagnostics = Self::build_diagnostics(&text, &sfc);
        self.client
            .publish_diagnostics(uri, diagnostics, version)
            .await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for Backend {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        if let Some(options) = params.initialization_options {
            self.apply_settings(options).await;
        }

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),
                code_action_provider: Some(CodeActionProviderCapability::Options(
                    CodeActionOptions {
                        code_action_kinds: Some(vec![
                            CodeActionKind::new(ToggleKind::RemoveBinding.tag()),
                            CodeActionKind::new(ToggleKind::AddBinding.tag()),
                        ]),
                        ..CodeActionOptions::default()
                    },
                )),
                ..ServerCapabilities::default()
            },
            server_info: Some(ServerInfo {
                name: "vtoggle-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _params: InitializedParams) {
        self.client
            .log_message(MessageType::INFO, "vtoggle-lsp initialized")
            .await;
    }

    async fn did_change_configuration(&self, params: DidChangeConfigurationParams) {
        self.apply_settings(params.settings).await;
    }

    async fn shutdown(&self) -> Result<()> {
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        let uri = params.text_document.uri;
        let text = params.text_document.text;
        let version = params.text_document.version;
        self.refresh_document(uri, text, Some(version)).await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        let uri = params.text_document.uri;
        let version = params.text_document.version;
        // Full sync: the last change carries the whole text.
        if let Some(change) = params.content_changes.into_iter().last() {
            self.refresh_document(uri, change.text, Some(version)).await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        let uri = params.text_document.uri;
        self.remove_document(&uri).await;
        self.client.publish_diagnostics(uri, Vec::new(), None).await;
    }

    async fn code_action(
        &self,
        params: CodeActionParams,
    ) -> Result<Option<Vec<CodeActionOrCommand>>> {
        let uri = params.text_document.uri;
        let range = params.range;
        let only = params.context.only;

        let settings = self.state.lock().await.toggle_binding.clone();
        let Some((text, sfc, version, cancel)) = self
            .with_document(&uri, |doc| {
                (
                    Arc::clone(&doc.text),
                    Arc::clone(&doc.sfc),
                    doc.version,
                    doc.cancel.clone(),
                )
            })
            .await
        else {
            tracing::debug!(%uri, "code action requested for unknown document");
            return Ok(Some(Vec::new()));
        };

        tracing::debug!(%uri, ?version, ?range, "computing toggle actions");
        let task_uri = uri.clone();
        let actions = tokio::task::spawn_blocking(move || {
            Backend::build_toggle_binding_actions(
                &text,
                &sfc,
                &task_uri,
                range,
                only.as_deref(),
                &settings,
                &cancel,
            )
        })
        .await;

        match actions {
            Ok(actions) => Ok(Some(actions)),
            Err(err) => {
                tracing::warn!(%uri, error = %err, "toggle action task failed");
                Ok(Some(Vec::new()))
            }
        }
    }
}

pub async fn run() {
    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();
    let (service, socket) = LspService::new(Backend::new);
    Server::new(stdin, stdout, socket).serve(service).await;
}
