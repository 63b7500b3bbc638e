pub mod cancel;
pub mod diagnostics;
pub mod expr;
pub mod line_index;
pub mod sfc;
pub mod template;
pub mod toggle;

pub use cancel::CancelToken;
pub use diagnostics::{render_diagnostics, Diagnostic, Span};
pub use line_index::{LineIndex, LinePosition};
pub use sfc::{parse_sfc, Anchor, SfcDocument, SfcTemplate};
pub use template::{parse_template, Attribute, Element, TemplateAst};
pub use toggle::{
    apply_edits, classify, locate, synthesize, toggle_binding_actions, Classification, TextEdit,
    ToggleAction, ToggleKind,
};
