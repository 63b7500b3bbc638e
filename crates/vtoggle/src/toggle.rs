//! The "toggle v-bind" refactoring: find the attributes under a selection,
//! decide which direction each can be toggled in and build the edits.

mod classify;
mod locator;
mod synthesize;

pub use classify::{classify, Classification, IneligibleReason, LiteralBinding};
pub use locator::{locate, AttributeMatch};
pub use synthesize::{apply_edits, synthesize, TextEdit, ToggleAction, ToggleKind};

use crate::cancel::CancelToken;
use crate::diagnostics::Span;
use crate::sfc::SfcDocument;

/// Every toggle action offered for `selection` (document offsets), in
/// traversal order. Documents without a parsed template yield nothing.
pub fn toggle_binding_actions(
    document: &SfcDocument,
    selection: Span,
    cancel: &CancelToken,
) -> Vec<ToggleAction> {
    let Some(template) = document.template.as_ref() else {
        return Vec::new();
    };

    let mut actions = Vec::new();
    for found in locate(&template.ast, template.anchor, selection, cancel) {
        let classification = classify(found.attribute);
        if let Classification::Ineligible(reason) = &classification {
            tracing::trace!(
                attribute = found.attribute.raw_name(),
                %reason,
                "attribute cannot be toggled"
            );
        }
        actions.extend(synthesize(found.attribute, &classification, template.anchor));
    }
    actions
}
