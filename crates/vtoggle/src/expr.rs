//! A small JavaScript expression parser, just enough to tell the shape of a
//! binding expression apart.

mod ast;
mod lexer;
mod parser;

pub use ast::*;
pub use lexer::{lex, Token, TokenKind};
pub use parser::{parse_program, MAX_DEPTH};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("unterminated string literal at {0}")]
    UnterminatedString(usize),
    #[error("unterminated template literal at {0}")]
    UnterminatedTemplate(usize),
    #[error("unterminated comment at {0}")]
    UnterminatedComment(usize),
    #[error("unexpected character `{ch}` at {offset}")]
    UnexpectedChar { ch: char, offset: usize },
    #[error("unexpected token `{found}` at {offset}")]
    UnexpectedToken { found: String, offset: usize },
    #[error("unexpected end of input")]
    UnexpectedEof,
    #[error("expression nested deeper than {0} levels")]
    TooDeep(usize),
}
