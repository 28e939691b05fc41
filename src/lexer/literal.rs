//! Literal lexing.

use crate::combinator::{Cycle, Parser};
use crate::cursor::Cursor;
use crate::error::Diagnostic;
use crate::scan::CharParser;
use crate::token::{Literal, TokenKind};

/// Lexes `null`, `true` or `false` from a maximal run of ASCII letters.
///
/// Taking the whole run first means `nullx` is reported as one invalid
/// literal rather than `null` followed by garbage.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralLexer;

impl<'a> Parser<Cursor<'a>> for LiteralLexer {
    type Output = TokenKind;
    type Error = Diagnostic;

    fn parse(&mut self, input: &mut Cursor<'a>) -> Result<TokenKind, Diagnostic> {
        let start = input.position();
        let mut letters =
            Cycle::new(CharParser::new(|byte: u8| byte.is_ascii_alphabetic(), "a letter"));
        let (run, _) = letters.run(input);
        if run.is_empty() {
            return Err(match input.peek() {
                None => Diagnostic::UnexpectedEndOfInput { pos: start },
                Some(_) => Diagnostic::ExpectedALiteral { pos: start },
            });
        }
        let lexeme: String = run.iter().map(|&byte| byte as char).collect();
        match lexeme.as_str() {
            "null" => Ok(TokenKind::Literal(Literal::Null)),
            "true" => Ok(TokenKind::Literal(Literal::Bool(true))),
            "false" => Ok(TokenKind::Literal(Literal::Bool(false))),
            _ => {
                input.set_position(start);
                Err(Diagnostic::InvalidLiteral { pos: start, lexeme })
            }
        }
    }
}
