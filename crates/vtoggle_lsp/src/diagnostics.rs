use tower_lsp::lsp_types::{Diagnostic, DiagnosticSeverity, NumberOrString};
use vtoggle::{LineIndex, SfcDocument};

use crate::backend::Backend;

impl Backend {
    /// Template parse problems of `sfc`, which must be the parse of `text`.
    pub(super) fn build_diagnostics(text: &str, sfc: &SfcDocument) -> Vec<Diagnostic> {
        if sfc.diagnostics.is_empty() {
            return Vec::new();
        }
        let index = LineIndex::new(text);
        sfc.diagnostics
            .iter()
            .map(|diag| Diagnostic {
                range: Self::span_to_range(&index, diag.span),
                severity: Some(DiagnosticSeverity::ERROR),
                code: Some(NumberOrString::String(diag.code.clone())),
                code_description: None,
                source: Some("vtoggle".to_string()),
                message: diag.message.clone(),
                related_information: None,
                tags: None,
                data: None,
            })
            .collect()
    }
}
