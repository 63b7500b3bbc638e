use serde::Serialize;

use crate::diagnostics::Span;
use crate::expr::{parse_program, Expr, ParseError, Statement};
use crate::template::{Attribute, Directive, DirectivePrefix};

#[derive(Debug, Clone, PartialEq)]
pub enum Classification {
    Ineligible(IneligibleReason),
    Removable(LiteralBinding),
    Addable { has_value: bool },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum IneligibleReason {
    #[error("`{0}` is not a v-bind directive")]
    NotABinding(String),
    #[error("binding `{0}` has a dynamic argument, modifiers or no argument")]
    UnsupportedBindingForm(String),
    #[error("binding has no expression")]
    MissingExpression,
    #[error("expression does not parse: {0}")]
    Parse(#[from] ParseError),
    #[error("expected exactly one statement, found {0}")]
    StatementCount(usize),
    #[error("statement is not an expression")]
    NotAnExpressionStatement,
    #[error("expression is not a plain string literal")]
    NotAStringLiteral,
    #[error("string literal contains escape sequences")]
    EscapedLiteral,
}

/// A `:name="'literal'"` binding. Spans are template-relative except
/// `literal`, which is relative to the expression source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LiteralBinding {
    /// The `:` or `v-bind:` marker in front of the attribute name.
    pub prefix: Span,
    /// The expression source between the value quotes.
    pub expression: Span,
    /// Full start of the statement inside the expression source.
    pub statement_pos: usize,
    pub leading_trivia_width: usize,
    /// The literal token, quotes included.
    pub literal: Span,
}

pub fn classify(attribute: &Attribute) -> Classification {
    match attribute {
        Attribute::Static(attr) => Classification::Addable {
            has_value: attr.value.is_some(),
        },
        Attribute::Directive(directive) => match classify_directive(directive) {
            Ok(binding) => Classification::Removable(binding),
            Err(reason) => Classification::Ineligible(reason),
        },
    }
}

fn classify_directive(directive: &Directive) -> Result<LiteralBinding, IneligibleReason> {
    if !directive.is_binding() {
        return Err(IneligibleReason::NotABinding(directive.raw_name.clone()));
    }
    let static_arg = directive.arg.as_ref().is_some_and(|arg| arg.is_static);
    let plain_prefix = matches!(directive.prefix, DirectivePrefix::Colon | DirectivePrefix::Long);
    if !static_arg || !plain_prefix || !directive.modifiers.is_empty() {
        return Err(IneligibleReason::UnsupportedBindingForm(
            directive.raw_name.clone(),
        ));
    }
    let Some(expression) = directive.expression.as_ref() else {
        return Err(IneligibleReason::MissingExpression);
    };

    let program = parse_program(&expression.source)?;
    let [statement] = program.statements.as_slice() else {
        return Err(IneligibleReason::StatementCount(program.statements.len()));
    };
    let Statement::Expression(statement) = statement else {
        return Err(IneligibleReason::NotAnExpressionStatement);
    };
    let escaped = match &statement.expr {
        Expr::StringLiteral(literal) => literal.has_escape,
        Expr::Template { raw, .. } if statement.expr.is_string_literal_like() => raw.contains('\\'),
        _ => return Err(IneligibleReason::NotAStringLiteral),
    };
    if escaped {
        return Err(IneligibleReason::EscapedLiteral);
    }

    Ok(LiteralBinding {
        prefix: directive.prefix_span,
        expression: expression.span,
        statement_pos: statement.pos,
        leading_trivia_width: statement.leading_trivia_width,
        literal: statement.expr.span(),
    })
}
