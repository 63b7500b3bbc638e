use crate::cancel::CancelToken;
use crate::diagnostics::Span;
use crate::sfc::Anchor;
use crate::template::{Attribute, Element, TemplateAst};

/// An attribute whose span fully contains the selection, with its owner.
#[derive(Debug, Clone, Copy)]
pub struct AttributeMatch<'a> {
    pub element: &'a Element,
    pub attribute: &'a Attribute,
}

/// Finds every attribute that fully contains `selection`, in depth-first
/// source order. `selection` is in document coordinates.
///
/// Elements the selection cannot touch are pruned together with their
/// subtree. Attributes with a span that is inverted or escapes the owning
/// element are skipped. A cancelled walk returns the matches found so far.
pub fn locate<'a>(
    ast: &'a TemplateAst,
    anchor: Anchor,
    selection: Span,
    cancel: &CancelToken,
) -> Vec<AttributeMatch<'a>> {
    let Some(selection) = anchor.to_template(selection) else {
        return Vec::new();
    };
    if selection.is_inverted() {
        return Vec::new();
    }

    let mut matches = Vec::new();
    let mut stack: Vec<&Element> = ast.roots.iter().rev().collect();
    while let Some(element) = stack.pop() {
        if cancel.is_cancelled() {
            tracing::debug!(found = matches.len(), "attribute walk cancelled");
            break;
        }
        if element.span.is_disjoint(selection) {
            continue;
        }

        for attribute in &element.attributes {
            let span = attribute.span();
            if span.is_inverted() || !element.span.contains_span(span) {
                tracing::debug!(
                    tag = %element.tag,
                    attribute = attribute.raw_name(),
                    start = span.start,
                    end = span.end,
                    "skipping attribute with inconsistent span"
                );
                continue;
            }
            if span.contains_span(selection) {
                matches.push(AttributeMatch { element, attribute });
            }
        }
        stack.extend(element.children.iter().rev());
    }
    matches
}
