use crate::diagnostics::Span;

use super::ast::*;
use super::lexer::{lex, Token, TokenKind};
use super::ParseError;

pub const MAX_DEPTH: usize = 128;

const KEYWORD_LITERALS: &[&str] = &["true", "false", "null", "this", "super"];

const RESERVED: &[&str] = &[
    "break", "case", "catch", "class", "const", "continue", "debugger", "default", "do",
    "else", "export", "extends", "finally", "for", "function", "if", "import", "let", "return",
    "switch", "throw", "try", "var", "while", "with", "yield",
];

const ASSIGN_OPS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "**=", "<<=", ">>=", ">>>=", "&=", "|=", "^=", "&&=",
    "||=", "??=",
];

const PREFIX_OPS: &[&str] = &["!", "~", "+", "-"];

const PREFIX_KEYWORDS: &[&str] = &["typeof", "void", "delete", "await"];

/// Parses `src` as a standalone program made of expression statements.
pub fn parse_program(src: &str) -> Result<Program, ParseError> {
    let tokens = lex(src)?;
    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    parser.parse_statements()
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn peek(&self) -> &Token {
        &self.tokens[self.pos.min(self.tokens.len() - 1)]
    }

    fn peek_at(&self, offset: usize) -> &Token {
        &self.tokens[(self.pos + offset).min(self.tokens.len() - 1)]
    }

    fn advance(&mut self) -> Token {
        let token = self.peek().clone();
        if token.kind != TokenKind::Eof {
            self.pos += 1;
        }
        token
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn check(&self, punct: &str) -> bool {
        self.peek().is_punct(punct)
    }

    fn consume(&mut self, punct: &str) -> bool {
        if self.check(punct) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn expect(&mut self, punct: &str) -> Result<Token, ParseError> {
        if self.check(punct) {
            Ok(self.advance())
        } else {
            Err(self.unexpected())
        }
    }

    fn unexpected(&self) -> ParseError {
        let token = self.peek();
        if token.kind == TokenKind::Eof {
            ParseError::UnexpectedEof
        } else {
            ParseError::UnexpectedToken {
                found: token.text.clone(),
                offset: token.span.start,
            }
        }
    }

    fn enter(&mut self) -> Result<(), ParseError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ParseError::TooDeep(MAX_DEPTH));
        }
        Ok(())
    }

    fn leave(&mut self) {
        self.depth -= 1;
    }

    fn previous_end(&self) -> usize {
        self.pos
            .checked_sub(1)
            .map_or(0, |idx| self.tokens[idx].span.end)
    }

    fn parse_statements(&mut self) -> Result<Program, ParseError> {
        let mut statements = Vec::new();
        while !self.at_eof() {
            let first = self.peek().clone();
            if first.is_punct(";") {
                self.pos += 1;
                statements.push(Statement::Empty {
                    pos: first.full_start,
                    span: first.span,
                });
                continue;
            }

            let expr = self.parse_expression()?;
            let end = if self.check(";") {
                self.advance().span.end
            } else if self.at_eof() || self.peek().newline_before {
                expr.span().end
            } else {
                return Err(self.unexpected());
            };
            statements.push(Statement::Expression(ExpressionStatement {
                expr,
                pos: first.full_start,
                leading_trivia_width: first.leading_trivia_width(),
                end,
            }));
        }
        Ok(Program { statements })
    }

    fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_assignment()?;
        if !self.check(",") {
            return Ok(first);
        }
        let start = first.span().start;
        let mut exprs = vec![first];
        while self.consume(",") {
            exprs.push(self.parse_assignment()?);
        }
        Ok(Expr::Sequence {
            exprs,
            span: Span::new(start, self.previous_end()),
        })
    }

    fn parse_assignment(&mut self) -> Result<Expr, ParseError> {
        self.enter()?;
        let result = self.parse_assignment_inner();
        self.leave();
        result
    }

    fn parse_assignment_inner(&mut self) -> Result<Expr, ParseError> {
        if let Some(arrow) = self.try_parse_arrow()? {
            return Ok(arrow);
        }
        let target = self.parse_conditional()?;
        let op_token = self.peek().clone();
        if op_token.kind == TokenKind::Punct && ASSIGN_OPS.contains(&op_token.text.as_str()) {
            self.pos += 1;
            let value = self.parse_assignment()?;
            let span = Span::new(target.span().start, value.span().end);
            return Ok(Expr::Assign {
                op: op_token.text,
                target: Box::new(target),
                value: Box::new(value),
                span,
            });
        }
        Ok(target)
    }

    /// Recognizes `x => ...`, `(a, b) => ...` and `async` variants.
    fn try_parse_arrow(&mut self) -> Result<Option<Expr>, ParseError> {
        let start_pos = self.pos;
        let start = self.peek().span.start;
        if self.peek().is_ident("async")
            && !self.peek_at(1).newline_before
            && (self.peek_at(1).kind == TokenKind::Ident || self.peek_at(1).is_punct("("))
        {
            self.pos += 1;
        }

        let params_start = self.peek().span.start;
        let params_end = if self.peek().kind == TokenKind::Ident && self.peek_at(1).is_punct("=>")
        {
            self.advance().span.end
        } else if self.check("(") {
            match self.matching_close(self.pos) {
                Some(close) if self.tokens[close + 1].is_punct("=>") => {
                    self.pos = close + 1;
                    self.tokens[close].span.end
                }
                _ => {
                    self.pos = start_pos;
                    return Ok(None);
                }
            }
        } else {
            self.pos = start_pos;
            return Ok(None);
        };

        self.expect("=>")?;
        let body = if self.check("{") {
            let Some(close) = self.matching_close(self.pos) else {
                return Err(ParseError::UnexpectedEof);
            };
            let span = Span::new(self.peek().span.start, self.tokens[close].span.end);
            self.pos = close + 1;
            span
        } else {
            self.parse_assignment()?.span()
        };
        Ok(Some(Expr::Arrow {
            params: Span::new(params_start, params_end),
            body,
            span: Span::new(start, body.end),
        }))
    }

    /// Index of the bracket closing the one at `open`, balancing all bracket
    /// kinds.
    fn matching_close(&self, open: usize) -> Option<usize> {
        let mut depth = 0usize;
        for (idx, token) in self.tokens.iter().enumerate().skip(open) {
            if token.kind != TokenKind::Punct {
                if token.kind == TokenKind::Eof {
                    return None;
                }
                continue;
            }
            match token.text.as_str() {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(idx);
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn parse_conditional(&mut self) -> Result<Expr, ParseError> {
        let test = self.parse_binary(0)?;
        if !self.consume("?") {
            return Ok(test);
        }
        let consequent = self.parse_assignment()?;
        self.expect(":")?;
        let alternate = self.parse_assignment()?;
        let span = Span::new(test.span().start, alternate.span().end);
        Ok(Expr::Conditional {
            test: Box::new(test),
            consequent: Box::new(consequent),
            alternate: Box::new(alternate),
            span,
        })
    }

    fn binary_precedence(token: &Token) -> Option<u8> {
        let prec = match (&token.kind, token.text.as_str()) {
            (TokenKind::Punct, "??") => 1,
            (TokenKind::Punct, "||") => 2,
            (TokenKind::Punct, "&&") => 3,
            (TokenKind::Punct, "|") => 4,
            (TokenKind::Punct, "^") => 5,
            (TokenKind::Punct, "&") => 6,
            (TokenKind::Punct, "==" | "!=" | "===" | "!==") => 7,
            (TokenKind::Punct, "<" | ">" | "<=" | ">=") => 8,
            (TokenKind::Ident, "instanceof" | "in") => 8,
            (TokenKind::Punct, "<<" | ">>" | ">>>") => 9,
            (TokenKind::Punct, "+" | "-") => 10,
            (TokenKind::Punct, "*" | "/" | "%") => 11,
            (TokenKind::Punct, "**") => 12,
            _ => return None,
        };
        Some(prec)
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        self.enter()?;
        let result = self.parse_binary_inner(min_prec);
        self.leave();
        result
    }

    fn parse_binary_inner(&mut self, min_prec: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = self.peek().clone();
            let Some(prec) = Self::binary_precedence(&op) else {
                break;
            };
            if prec <= min_prec {
                break;
            }
            self.pos += 1;
            // `**` is right associative.
            let next_min = if op.text == "**" { prec - 1 } else { prec };
            let right = self.parse_binary(next_min)?;
            let span = Span::new(left.span().start, right.span().end);
            left = Expr::Binary {
                op: op.text,
                left: Box::new(left),
                right: Box::new(right),
                span,
            };
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        let is_prefix = (token.kind == TokenKind::Punct
            && PREFIX_OPS.contains(&token.text.as_str()))
            || (token.kind == TokenKind::Ident && PREFIX_KEYWORDS.contains(&token.text.as_str()));
        if is_prefix {
            self.pos += 1;
            self.enter()?;
            let operand = self.parse_unary();
            self.leave();
            let operand = operand?;
            let span = Span::new(token.span.start, operand.span().end);
            return Ok(Expr::Unary {
                op: token.text,
                operand: Box::new(operand),
                span,
            });
        }
        if token.is_punct("++") || token.is_punct("--") {
            self.pos += 1;
            self.enter()?;
            let operand = self.parse_unary();
            self.leave();
            let operand = operand?;
            let span = Span::new(token.span.start, operand.span().end);
            return Ok(Expr::Update {
                op: token.text,
                prefix: true,
                operand: Box::new(operand),
                span,
            });
        }

        let expr = self.parse_postfix()?;
        let next = self.peek().clone();
        if (next.is_punct("++") || next.is_punct("--")) && !next.newline_before {
            self.pos += 1;
            let span = Span::new(expr.span().start, next.span.end);
            return Ok(Expr::Update {
                op: next.text,
                prefix: false,
                operand: Box::new(expr),
                span,
            });
        }
        Ok(expr)
    }

    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        loop {
            let start = expr.span().start;
            if self.consume(".") {
                let property = self.parse_property_name()?;
                let span = Span::new(start, property.span.end);
                expr = Expr::Member {
                    object: Box::new(expr),
                    property,
                    optional: false,
                    span,
                };
            } else if self.consume("?.") {
                if self.check("(") {
                    let args = self.parse_arguments()?;
                    expr = Expr::Call {
                        callee: Box::new(expr),
                        args,
                        optional: true,
                        span: Span::new(start, self.previous_end()),
                    };
                } else if self.consume("[") {
                    let index = self.parse_expression()?;
                    self.expect("]")?;
                    expr = Expr::Index {
                        object: Box::new(expr),
                        index: Box::new(index),
                        optional: true,
                        span: Span::new(start, self.previous_end()),
                    };
                } else {
                    let property = self.parse_property_name()?;
                    let span = Span::new(start, property.span.end);
                    expr = Expr::Member {
                        object: Box::new(expr),
                        property,
                        optional: true,
                        span,
                    };
                }
            } else if self.consume("[") {
                let index = self.parse_expression()?;
                self.expect("]")?;
                expr = Expr::Index {
                    object: Box::new(expr),
                    index: Box::new(index),
                    optional: false,
                    span: Span::new(start, self.previous_end()),
                };
            } else if self.check("(") {
                let args = self.parse_arguments()?;
                expr = Expr::Call {
                    callee: Box::new(expr),
                    args,
                    optional: false,
                    span: Span::new(start, self.previous_end()),
                };
            } else if matches!(self.peek().kind, TokenKind::Template { .. }) {
                let template = self.advance();
                expr = Expr::TaggedTemplate {
                    tag: Box::new(expr),
                    span: Span::new(start, template.span.end),
                };
            } else {
                return Ok(expr);
            }
        }
    }

    fn parse_property_name(&mut self) -> Result<Identifier, ParseError> {
        let token = self.peek().clone();
        let token = if token.is_punct("#") && self.peek_at(1).kind == TokenKind::Ident {
            self.pos += 1;
            let name = self.advance();
            Token {
                text: format!("#{}", name.text),
                span: Span::new(token.span.start, name.span.end),
                ..name
            }
        } else if token.kind == TokenKind::Ident {
            self.advance()
        } else {
            return Err(self.unexpected());
        };
        Ok(Identifier {
            name: token.text,
            span: token.span,
        })
    }

    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        self.expect("(")?;
        let mut args = Vec::new();
        while !self.check(")") {
            args.push(self.parse_element()?);
            if !self.consume(",") {
                break;
            }
        }
        self.expect(")")?;
        Ok(args)
    }

    /// An array element or call argument: an assignment expression or a spread.
    fn parse_element(&mut self) -> Result<Expr, ParseError> {
        if self.check("...") {
            let start = self.advance().span.start;
            let argument = self.parse_assignment()?;
            let span = Span::new(start, argument.span().end);
            return Ok(Expr::Spread {
                argument: Box::new(argument),
                span,
            });
        }
        self.parse_assignment()
    }

    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let token = self.peek().clone();
        match &token.kind {
            TokenKind::String { quote, has_escape } => {
                self.pos += 1;
                Ok(Expr::StringLiteral(StringLiteral {
                    raw: token.text,
                    quote: *quote,
                    has_escape: *has_escape,
                    span: token.span,
                }))
            }
            TokenKind::Number => {
                self.pos += 1;
                Ok(Expr::NumericLiteral {
                    raw: token.text,
                    span: token.span,
                })
            }
            TokenKind::Template { has_substitutions } => {
                self.pos += 1;
                Ok(Expr::Template {
                    raw: token.text,
                    has_substitutions: *has_substitutions,
                    span: token.span,
                })
            }
            TokenKind::Ident => self.parse_identifier_like(token),
            TokenKind::Punct => match token.text.as_str() {
                "(" => {
                    self.pos += 1;
                    let inner = self.parse_expression()?;
                    let close = self.expect(")")?;
                    Ok(Expr::Paren {
                        inner: Box::new(inner),
                        span: Span::new(token.span.start, close.span.end),
                    })
                }
                "[" => self.parse_array(),
                "{" => self.parse_object(),
                _ => Err(self.unexpected()),
            },
            TokenKind::Eof => Err(ParseError::UnexpectedEof),
        }
    }

    fn parse_identifier_like(&mut self, token: Token) -> Result<Expr, ParseError> {
        let name = token.text.as_str();
        if RESERVED.contains(&name) {
            return Err(self.unexpected());
        }
        if name == "new" {
            self.pos += 1;
            self.enter()?;
            let callee = self.parse_new_callee();
            self.leave();
            let callee = callee?;
            let args = if self.check("(") {
                self.parse_arguments()?
            } else {
                Vec::new()
            };
            return Ok(Expr::New {
                callee: Box::new(callee),
                args,
                span: Span::new(token.span.start, self.previous_end()),
            });
        }
        self.pos += 1;
        let ident = Identifier {
            name: token.text.clone(),
            span: token.span,
        };
        if KEYWORD_LITERALS.contains(&name) {
            Ok(Expr::Keyword(ident))
        } else {
            Ok(Expr::Identifier(ident))
        }
    }

    /// `new` binds to a member expression without call arguments.
    fn parse_new_callee(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;
        while self.consume(".") {
            let property = self.parse_property_name()?;
            let span = Span::new(expr.span().start, property.span.end);
            expr = Expr::Member {
                object: Box::new(expr),
                property,
                optional: false,
                span,
            };
        }
        Ok(expr)
    }

    fn parse_array(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect("[")?;
        let mut elements = Vec::new();
        loop {
            if self.check("]") {
                break;
            }
            if self.consume(",") {
                continue;
            }
            elements.push(self.parse_element()?);
            if !self.consume(",") {
                break;
            }
        }
        let close = self.expect("]")?;
        Ok(Expr::Array {
            elements,
            span: Span::new(open.span.start, close.span.end),
        })
    }

    fn parse_object(&mut self) -> Result<Expr, ParseError> {
        let open = self.expect("{")?;
        let mut values = Vec::new();
        while !self.check("}") {
            if self.check("...") {
                values.push(self.parse_element()?);
            } else {
                let key = self.peek().clone();
                match &key.kind {
                    TokenKind::Ident | TokenKind::String { .. } | TokenKind::Number => {
                        self.pos += 1;
                    }
                    TokenKind::Punct if key.text == "[" => {
                        self.pos += 1;
                        self.parse_assignment()?;
                        self.expect("]")?;
                    }
                    _ => return Err(self.unexpected()),
                }
                if self.consume(":") {
                    values.push(self.parse_assignment()?);
                } else if key.kind == TokenKind::Ident {
                    values.push(Expr::Identifier(Identifier {
                        name: key.text,
                        span: key.span,
                    }));
                } else {
                    return Err(self.unexpected());
                }
            }
            if !self.consume(",") {
                break;
            }
        }
        let close = self.expect("}")?;
        Ok(Expr::Object {
            values,
            span: Span::new(open.span.start, close.span.end),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn single_expr(src: &str) -> Expr {
        let program = parse_program(src).expect("parses");
        assert_eq!(program.statements.len(), 1, "{program:#?}");
        match program.statements.into_iter().next() {
            Some(Statement::Expression(stmt)) => stmt.expr,
            other => panic!("expected expression statement, got {other:?}"),
        }
    }

    #[test]
    fn string_literal_statement_records_trivia() {
        let src = "  /*c*/ 'value'  ";
        let program = parse_program(src).expect("parses");
        let [Statement::Expression(stmt)] = program.statements.as_slice() else {
            panic!("expected one expression statement");
        };
        assert_eq!(stmt.pos, 0);
        assert_eq!(stmt.leading_trivia_width, 8);
        assert_eq!(stmt.end, 15);
        let Expr::StringLiteral(lit) = &stmt.expr else {
            panic!("expected string literal");
        };
        assert_eq!(lit.raw, "'value'");
        assert_eq!(lit.span, Span::new(8, 15));
    }

    #[test]
    fn semicolon_is_part_of_the_statement() {
        let program = parse_program("'x';").expect("parses");
        let [Statement::Expression(stmt)] = program.statements.as_slice() else {
            panic!("expected one expression statement");
        };
        assert_eq!(stmt.end, 4);
        assert_eq!(stmt.expr.span(), Span::new(0, 3));
    }

    #[test]
    fn statements_split_on_semicolons_and_line_breaks() {
        assert_eq!(parse_program("a; b").expect("parses").statements.len(), 2);
        assert_eq!(parse_program("a\nb").expect("parses").statements.len(), 2);
        assert_eq!(parse_program(";'x'").expect("parses").statements.len(), 2);
        assert_eq!(parse_program("").expect("parses").statements.len(), 0);
        assert!(matches!(
            parse_program("a b"),
            Err(ParseError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn operators_follow_precedence() {
        let Expr::Binary { op, right, .. } = single_expr("'a' + 'b' * c") else {
            panic!("expected binary expression");
        };
        assert_eq!(op, "+");
        assert!(matches!(*right, Expr::Binary { ref op, .. } if op == "*"));

        let Expr::Binary { op, right, .. } = single_expr("2 ** 3 ** 2") else {
            panic!("expected binary expression");
        };
        assert_eq!(op, "**");
        assert!(matches!(*right, Expr::Binary { .. }));
    }

    #[test]
    fn member_call_and_conditional_shapes() {
        assert!(matches!(single_expr("foo.bar"), Expr::Member { .. }));
        assert!(matches!(single_expr("a?.[0]"), Expr::Index { optional: true, .. }));
        assert!(matches!(single_expr("t('key', ...rest)"), Expr::Call { ref args, .. } if args.len() == 2));
        assert!(matches!(single_expr("ok ? 'a' : 'b'"), Expr::Conditional { .. }));
        assert!(matches!(single_expr("new Date()"), Expr::New { .. }));
        assert!(matches!(single_expr("{ a: 1, b, ...c, [d]: 2 }"), Expr::Object { .. }));
        assert!(matches!(single_expr("[1, , 2]"), Expr::Array { ref elements, .. } if elements.len() == 2));
        assert!(matches!(single_expr("html`x`"), Expr::TaggedTemplate { .. }));
        assert!(matches!(single_expr("count++"), Expr::Update { prefix: false, .. }));
        assert!(matches!(single_expr("typeof x"), Expr::Unary { .. }));
        assert!(matches!(single_expr("a = 1"), Expr::Assign { .. }));
        assert!(matches!(single_expr("a, b"), Expr::Sequence { .. }));
        assert!(matches!(single_expr("('x')"), Expr::Paren { .. }));
    }

    #[test]
    fn arrow_functions() {
        let Expr::Arrow { body, .. } = single_expr("(e) => { go(e) }") else {
            panic!("expected arrow");
        };
        assert_eq!(body, Span::new(7, 16));
        assert!(matches!(single_expr("x => x + 1"), Expr::Arrow { .. }));
        assert!(matches!(single_expr("async () => load()"), Expr::Arrow { .. }));
        assert!(matches!(single_expr("(a)"), Expr::Paren { .. }));
    }

    #[test]
    fn string_literal_like_predicate() {
        assert!(single_expr("'x'").is_string_literal_like());
        assert!(single_expr("\"x\"").is_string_literal_like());
        assert!(single_expr("`x`").is_string_literal_like());
        assert!(!single_expr("`${x}`").is_string_literal_like());
        assert!(!single_expr("foo").is_string_literal_like());
        assert!(!single_expr("1").is_string_literal_like());
        assert!(!single_expr("'a' + 'b'").is_string_literal_like());
    }

    #[test]
    fn rejects_statements_and_unbalanced_input() {
        assert!(parse_program("if (a) b").is_err());
        assert!(parse_program("(a").is_err());
        assert!(parse_program("a +").is_err());
        assert!(matches!(parse_program("'x' 'y'"), Err(ParseError::UnexpectedToken { offset: 4, .. })));
    }

    #[test]
    fn nesting_is_bounded() {
        let deep = format!("{}x{}", "(".repeat(500), ")".repeat(500));
        assert_eq!(parse_program(&deep), Err(ParseError::TooDeep(MAX_DEPTH)));
    }
}
