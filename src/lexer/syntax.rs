//! Structural character lexing.

use crate::combinator::Parser;
use crate::cursor::Cursor;
use crate::error::Diagnostic;
use crate::token::{Syntax, TokenKind};

/// Lexes one of `, : [ ] { }`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SyntaxLexer;

impl<'a> Parser<Cursor<'a>> for SyntaxLexer {
    type Output = TokenKind;
    type Error = Diagnostic;

    fn parse(&mut self, input: &mut Cursor<'a>) -> Result<TokenKind, Diagnostic> {
        let pos = input.position();
        match input.peek() {
            None => Err(Diagnostic::UnexpectedEndOfInput { pos }),
            Some(byte) => match Syntax::from_byte(byte) {
                Some(syntax) => {
                    input.advance_by(1);
                    Ok(TokenKind::Syntax(syntax))
                }
                None => Err(Diagnostic::ExpectedASyntax { pos }),
            },
        }
    }
}
