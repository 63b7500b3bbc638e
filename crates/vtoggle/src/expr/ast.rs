use crate::diagnostics::Span;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Expression(ExpressionStatement),
    /// A lone `;`.
    Empty { pos: usize, span: Span },
}

/// `pos` is the full start of the statement, leading trivia included; the
/// first token starts at `pos + leading_trivia_width`. `end` covers a
/// terminating `;` when there is one.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpressionStatement {
    pub expr: Expr,
    pub pos: usize,
    pub leading_trivia_width: usize,
    pub end: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StringLiteral {
    pub raw: String,
    pub quote: char,
    pub has_escape: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    StringLiteral(StringLiteral),
    NumericLiteral {
        raw: String,
        span: Span,
    },
    Template {
        raw: String,
        has_substitutions: bool,
        span: Span,
    },
    Identifier(Identifier),
    /// `true`, `false`, `null`, `this`, `super`.
    Keyword(Identifier),
    Member {
        object: Box<Expr>,
        property: Identifier,
        optional: bool,
        span: Span,
    },
    Index {
        object: Box<Expr>,
        index: Box<Expr>,
        optional: bool,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        optional: bool,
        span: Span,
    },
    TaggedTemplate {
        tag: Box<Expr>,
        span: Span,
    },
    New {
        callee: Box<Expr>,
        args: Vec<Expr>,
        span: Span,
    },
    Unary {
        op: String,
        operand: Box<Expr>,
        span: Span,
    },
    Update {
        op: String,
        prefix: bool,
        operand: Box<Expr>,
        span: Span,
    },
    Binary {
        op: String,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    Assign {
        op: String,
        target: Box<Expr>,
        value: Box<Expr>,
        span: Span,
    },
    Conditional {
        test: Box<Expr>,
        consequent: Box<Expr>,
        alternate: Box<Expr>,
        span: Span,
    },
    Sequence {
        exprs: Vec<Expr>,
        span: Span,
    },
    Array {
        elements: Vec<Expr>,
        span: Span,
    },
    Object {
        values: Vec<Expr>,
        span: Span,
    },
    Spread {
        argument: Box<Expr>,
        span: Span,
    },
    Arrow {
        params: Span,
        body: Span,
        span: Span,
    },
    Paren {
        inner: Box<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::StringLiteral(lit) => lit.span,
            Expr::Identifier(ident) | Expr::Keyword(ident) => ident.span,
            Expr::NumericLiteral { span, .. }
            | Expr::Template { span, .. }
            | Expr::Member { span, .. }
            | Expr::Index { span, .. }
            | Expr::Call { span, .. }
            | Expr::TaggedTemplate { span, .. }
            | Expr::New { span, .. }
            | Expr::Unary { span, .. }
            | Expr::Update { span, .. }
            | Expr::Binary { span, .. }
            | Expr::Assign { span, .. }
            | Expr::Conditional { span, .. }
            | Expr::Sequence { span, .. }
            | Expr::Array { span, .. }
            | Expr::Object { span, .. }
            | Expr::Spread { span, .. }
            | Expr::Arrow { span, .. }
            | Expr::Paren { span, .. } => *span,
        }
    }

    /// A quoted string literal, or a template literal without substitutions.
    pub fn is_string_literal_like(&self) -> bool {
        matches!(
            self,
            Expr::StringLiteral(_)
                | Expr::Template {
                    has_substitutions: false,
                    ..
                }
        )
    }
}
