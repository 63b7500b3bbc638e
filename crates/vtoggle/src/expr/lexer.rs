use crate::diagnostics::Span;

use super::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    Number,
    String { quote: char, has_escape: bool },
    Template { has_substitutions: bool },
    Punct,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Start of the leading trivia that precedes this token.
    pub full_start: usize,
    pub span: Span,
    /// A line terminator appears between the previous token and this one.
    pub newline_before: bool,
}

impl Token {
    pub fn is_punct(&self, punct: &str) -> bool {
        self.kind == TokenKind::Punct && self.text == punct
    }

    pub fn is_ident(&self, name: &str) -> bool {
        self.kind == TokenKind::Ident && self.text == name
    }

    pub fn leading_trivia_width(&self) -> usize {
        self.span.start - self.full_start
    }
}

const PUNCTUATORS: &[&str] = &[
    ">>>=", "...", "===", "!==", "**=", "<<=", ">>=", ">>>", "&&=", "||=", "??=", "=>", "==",
    "!=", "<=", ">=", "&&", "||", "??", "?.", "++", "--", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", "**", "<<", ">>", "{", "}", "(", ")", "[", "]", ";", ",", "<", ">", "+", "-",
    "*", "/", "%", "&", "|", "^", "!", "~", "?", ":", "=", ".", "@", "#",
];

/// Splits `src` into tokens, attaching whitespace and comments to the token
/// that follows them. The returned list always ends with an `Eof` token.
pub fn lex(src: &str) -> Result<Vec<Token>, ParseError> {
    let mut lexer = Lexer { src, pos: 0 };
    let mut tokens = Vec::new();
    loop {
        let full_start = lexer.pos;
        let newline_before = lexer.skip_trivia()?;
        let start = lexer.pos;
        let Some(ch) = lexer.peek() else {
            tokens.push(Token {
                kind: TokenKind::Eof,
                text: String::new(),
                full_start,
                span: Span::empty(start),
                newline_before,
            });
            return Ok(tokens);
        };

        let kind = if is_ident_start(ch) {
            lexer.bump_while(is_ident_continue);
            TokenKind::Ident
        } else if ch.is_ascii_digit()
            || (ch == '.' && lexer.peek_nth(1).is_some_and(|c| c.is_ascii_digit()))
        {
            lexer.lex_number();
            TokenKind::Number
        } else if ch == '"' || ch == '\'' {
            let has_escape = lexer.lex_string(ch)?;
            TokenKind::String {
                quote: ch,
                has_escape,
            }
        } else if ch == '`' {
            let has_substitutions = lexer.lex_template()?;
            TokenKind::Template { has_substitutions }
        } else if let Some(punct) = lexer.match_punct() {
            lexer.pos += punct.len();
            TokenKind::Punct
        } else {
            return Err(ParseError::UnexpectedChar { ch, offset: start });
        };

        tokens.push(Token {
            kind,
            text: src[start..lexer.pos].to_string(),
            full_start,
            span: Span::new(start, lexer.pos),
            newline_before,
        });
    }
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
}

impl Lexer<'_> {
    fn rest(&self) -> &str {
        &self.src[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn peek_nth(&self, n: usize) -> Option<char> {
        self.rest().chars().nth(n)
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.peek()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    fn bump_while(&mut self, pred: impl Fn(char) -> bool) {
        while let Some(ch) = self.peek() {
            if !pred(ch) {
                break;
            }
            self.pos += ch.len_utf8();
        }
    }

    /// Skips whitespace and comments. Returns whether a line break was seen.
    fn skip_trivia(&mut self) -> Result<bool, ParseError> {
        let mut newline = false;
        loop {
            let Some(ch) = self.peek() else {
                return Ok(newline);
            };
            if is_line_terminator(ch) {
                newline = true;
                self.bump();
            } else if ch.is_whitespace() || ch == '\u{feff}' {
                self.bump();
            } else if self.rest().starts_with("//") {
                self.bump_while(|c| !is_line_terminator(c));
            } else if self.rest().starts_with("/*") {
                let start = self.pos;
                let Some(end) = self.src[start + 2..].find("*/") else {
                    return Err(ParseError::UnterminatedComment(start));
                };
                let body = &self.src[start + 2..start + 2 + end];
                newline |= body.chars().any(is_line_terminator);
                self.pos = start + 2 + end + 2;
            } else {
                return Ok(newline);
            }
        }
    }

    fn lex_number(&mut self) {
        let rest = self.rest();
        if rest.len() > 1
            && rest.starts_with('0')
            && matches!(rest.as_bytes()[1], b'x' | b'X' | b'o' | b'O' | b'b' | b'B')
        {
            self.pos += 2;
            self.bump_while(|c| c.is_ascii_hexdigit() || c == '_');
        } else {
            self.bump_while(|c| c.is_ascii_digit() || c == '_');
            if self.peek() == Some('.') {
                self.bump();
                self.bump_while(|c| c.is_ascii_digit() || c == '_');
            }
            if matches!(self.peek(), Some('e' | 'E')) {
                let exponent_digit = match self.peek_nth(1) {
                    Some('+' | '-') => self.peek_nth(2),
                    other => other,
                };
                if exponent_digit.is_some_and(|c| c.is_ascii_digit()) {
                    self.bump();
                    if matches!(self.peek(), Some('+' | '-')) {
                        self.bump();
                    }
                    self.bump_while(|c| c.is_ascii_digit() || c == '_');
                }
            }
        }
        if self.peek() == Some('n') {
            self.bump();
        }
    }

    /// Returns whether the literal contains an escape sequence.
    fn lex_string(&mut self, quote: char) -> Result<bool, ParseError> {
        let start = self.pos;
        self.bump();
        let mut has_escape = false;
        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedString(start)),
                Some(c) if c == quote => return Ok(has_escape),
                Some('\\') => {
                    has_escape = true;
                    if self.bump().is_none() {
                        return Err(ParseError::UnterminatedString(start));
                    }
                }
                Some('\n' | '\r') => return Err(ParseError::UnterminatedString(start)),
                Some(_) => {}
            }
        }
    }

    /// Scans a whole template literal, substitutions included. Returns
    /// whether it contains at least one `${...}`.
    fn lex_template(&mut self) -> Result<bool, ParseError> {
        let start = self.pos;
        self.bump();
        let mut has_substitutions = false;
        loop {
            match self.bump() {
                None => return Err(ParseError::UnterminatedTemplate(start)),
                Some('`') => return Ok(has_substitutions),
                Some('\\') => {
                    if self.bump().is_none() {
                        return Err(ParseError::UnterminatedTemplate(start));
                    }
                }
                Some('$') if self.peek() == Some('{') => {
                    self.bump();
                    has_substitutions = true;
                    self.skip_substitution(start)?;
                }
                Some(_) => {}
            }
        }
    }

    fn skip_substitution(&mut self, template_start: usize) -> Result<(), ParseError> {
        let mut depth = 1usize;
        while depth > 0 {
            match self.peek() {
                None => return Err(ParseError::UnterminatedTemplate(template_start)),
                Some('{') => {
                    depth += 1;
                    self.bump();
                }
                Some('}') => {
                    depth -= 1;
                    self.bump();
                }
                Some(q @ ('"' | '\'')) => {
                    self.lex_string(q)?;
                }
                Some('`') => {
                    self.lex_template()?;
                }
                Some(_) => {
                    self.bump();
                }
            }
        }
        Ok(())
    }

    fn match_punct(&self) -> Option<&'static str> {
        let rest = self.rest();
        PUNCTUATORS
            .iter()
            .copied()
            // `a?.5:b` is a conditional, not optional chaining.
            .filter(|p| *p != "?." || !rest.as_bytes().get(2).is_some_and(u8::is_ascii_digit))
            .find(|p| rest.starts_with(p))
    }
}

fn is_line_terminator(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

fn is_ident_start(ch: char) -> bool {
    ch.is_alphabetic() || ch == '_' || ch == '$'
}

fn is_ident_continue(ch: char) -> bool {
    ch.is_alphanumeric() || ch == '_' || ch == '$' || ch == '\u{200c}' || ch == '\u{200d}'
}
