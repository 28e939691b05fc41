//! JSON lexing.
//!
//! Turns raw bytes into a stream of positioned tokens. The four token
//! shapes live in submodules; [`JsonLexer`] drives them, skipping
//! whitespace between tokens and classifying whatever stops the stream
//! early.

pub mod literal;
pub mod number;
pub mod string;
pub mod syntax;

pub use literal::LiteralLexer;
pub use number::NumberLexer;
pub use string::StringLexer;
pub use syntax::SyntaxLexer;

use std::convert::Infallible;

use crate::combinator::{Checkpoint, Cycle, CycleStop, Or, Parser};
use crate::cursor::Cursor;
use crate::error::Diagnostic;
use crate::token::Token;

/// Whitespace accepted between tokens.
fn is_whitespace(byte: u8) -> bool {
    matches!(byte, b'\t' | b'\n' | b'\r' | b' ')
}

fn skip_whitespace(input: &mut Cursor<'_>) {
    while let Some(byte) = input.peek() {
        if !is_whitespace(byte) {
            break;
        }
        input.advance_by(1);
    }
}

/// Consumes a possibly empty whitespace run; never fails.
#[derive(Debug, Clone, Copy, Default)]
struct WhitespaceLexer;

impl<'a> Parser<Cursor<'a>> for WhitespaceLexer {
    type Output = ();
    type Error = Infallible;

    fn parse(&mut self, input: &mut Cursor<'a>) -> Result<(), Infallible> {
        skip_whitespace(input);
        Ok(())
    }
}

/// Lexes one positioned token of any of the four shapes.
///
/// The error is the four sub-lexer errors in priority order: literal,
/// number, string, syntax.
#[derive(Debug, Clone, Copy, Default)]
struct TokenLexer;

impl<'a> Parser<Cursor<'a>> for TokenLexer {
    type Output = Token;
    type Error = Vec<Diagnostic>;

    fn parse(&mut self, input: &mut Cursor<'a>) -> Result<Token, Vec<Diagnostic>> {
        let pos = input.position();
        let mut alternatives = Or::new((LiteralLexer, NumberLexer, StringLexer, SyntaxLexer));
        let (_, kind, _) = alternatives.parse(input)?;
        Ok(Token { kind, pos })
    }
}

/// Tokenizer for a whole input.
///
/// With `require_full_input` set (the parse entry point always sets it),
/// the token stream must cover the entire input. When it stops early, the
/// most informative sub-lexer failure becomes the diagnostic: a sub-lexer
/// that got past its first byte knows better than one that never started,
/// and end-of-input failures say nothing at all. If every shape merely
/// failed to start, the offending byte itself is reported.
#[derive(Debug, Clone, Copy)]
pub struct JsonLexer {
    require_full_input: bool,
}

impl JsonLexer {
    /// A lexer; `require_full_input` controls the end-of-input check.
    pub fn new(require_full_input: bool) -> Self {
        JsonLexer { require_full_input }
    }
}

impl<'a> Parser<Cursor<'a>> for JsonLexer {
    type Output = Vec<Token>;
    type Error = Diagnostic;

    fn parse(&mut self, input: &mut Cursor<'a>) -> Result<Vec<Token>, Diagnostic> {
        let start = input.mark();
        skip_whitespace(input);
        let mut stream = Cycle::with_separator(TokenLexer, WhitespaceLexer);
        let (tokens, stop) = stream.run(input);

        if self.require_full_input {
            if let Some(byte) = input.peek() {
                let errors = match stop {
                    CycleStop::Element { error, .. } => error,
                    CycleStop::Separator { error } => match error {},
                };
                for error in errors {
                    if !could_not_start(&error) {
                        input.restore(start);
                        return Err(error);
                    }
                }
                let pos = input.position();
                input.restore(start);
                return Err(Diagnostic::UnexpectedCharacter {
                    pos,
                    found: byte as char,
                    expected: String::from(
                        "a literal, a number, a string, or a syntax character",
                    ),
                });
            }
        }
        Ok(tokens)
    }
}

/// True for errors that mean "this token shape could not even start here",
/// as opposed to a malformed token of that shape.
fn could_not_start(error: &Diagnostic) -> bool {
    matches!(
        error,
        Diagnostic::ExpectedALiteral { .. }
            | Diagnostic::ExpectedANumber { .. }
            | Diagnostic::ExpectedAString { .. }
            | Diagnostic::ExpectedASyntax { .. }
            | Diagnostic::UnexpectedEndOfInput { .. }
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;
    use crate::token::{Literal, Number, Syntax, TokenKind};

    fn at(pos: usize, line: usize, col: usize) -> Position {
        Position { pos, line, col }
    }

    fn lex(input: &[u8]) -> Result<Vec<Token>, Diagnostic> {
        JsonLexer::new(true).parse(&mut Cursor::new(input))
    }

    fn kinds(input: &[u8]) -> Vec<TokenKind> {
        lex(input)
            .unwrap()
            .into_iter()
            .map(|token| token.kind)
            .collect()
    }

    #[test]
    fn test_empty_input_lexes_to_no_tokens() {
        assert_eq!(lex(b"").unwrap(), vec![]);
        assert_eq!(lex(b"  \t\r\n ").unwrap(), vec![]);
    }

    #[test]
    fn test_token_sequence_with_positions() {
        let tokens = lex(b"[1, true]").unwrap();
        let expected = [
            (TokenKind::Syntax(Syntax::LeftBracket), at(0, 0, 0)),
            (TokenKind::Number(Number::Int(1)), at(1, 0, 1)),
            (TokenKind::Syntax(Syntax::Comma), at(2, 0, 2)),
            (TokenKind::Literal(Literal::Bool(true)), at(4, 0, 4)),
            (TokenKind::Syntax(Syntax::RightBracket), at(8, 0, 8)),
        ];
        assert_eq!(tokens.len(), expected.len());
        for (token, (kind, pos)) in tokens.into_iter().zip(expected) {
            assert_eq!(token.kind, kind);
            assert_eq!(token.pos, pos);
        }
    }

    #[test]
    fn test_positions_cross_lines() {
        let tokens = lex(b"[\n1,\n2]\n").unwrap();
        assert_eq!(tokens[0].pos, at(0, 0, 0));
        assert_eq!(tokens[1].pos, at(2, 1, 0));
        assert_eq!(tokens[2].pos, at(3, 1, 1));
        assert_eq!(tokens[3].pos, at(5, 2, 0));
        assert_eq!(tokens[4].pos, at(6, 2, 1));
    }

    #[test]
    fn test_all_token_shapes() {
        assert_eq!(
            kinds(br#"null -2 "hi" :"#),
            vec![
                TokenKind::Literal(Literal::Null),
                TokenKind::Number(Number::Int(-2)),
                TokenKind::String(String::from("hi")),
                TokenKind::Syntax(Syntax::Colon),
            ]
        );
    }

    #[test]
    fn test_literal_failure_takes_priority() {
        // A malformed literal wins over the later sub-lexers' failures.
        assert_eq!(
            lex(b"tru "),
            Err(Diagnostic::InvalidLiteral {
                pos: at(0, 0, 0),
                lexeme: String::from("tru"),
            })
        );
    }

    #[test]
    fn test_number_failure_surfaces_when_literal_could_not_start() {
        assert_eq!(
            lex(b"1e"),
            Err(Diagnostic::ExpectedADigitOrASign { pos: at(2, 0, 2), found: None })
        );
    }

    #[test]
    fn test_string_failure_surfaces_when_earlier_shapes_could_not_start() {
        let error = lex(b"\"a\x02b\"").unwrap_err();
        assert_eq!(
            error,
            Diagnostic::UnexpectedControlCharacter { pos: at(2, 0, 2), byte: 0x02 }
        );
    }

    #[test]
    fn test_unstartable_byte_is_reported_directly() {
        assert_eq!(
            lex(b"@"),
            Err(Diagnostic::UnexpectedCharacter {
                pos: at(0, 0, 0),
                found: '@',
                expected: String::from("a literal, a number, a string, or a syntax character"),
            })
        );
    }

    #[test]
    fn test_unterminated_string_reports_the_opening_quote() {
        // Every sub-lexer failure here is either "could not start" or end
        // of input, so the remaining byte itself is reported.
        assert_eq!(
            lex(br#""abc"#),
            Err(Diagnostic::UnexpectedCharacter {
                pos: at(0, 0, 0),
                found: '"',
                expected: String::from("a literal, a number, a string, or a syntax character"),
            })
        );
    }

    #[test]
    fn test_failure_restores_the_cursor() {
        let mut cursor = Cursor::new(b"1 2 tru");
        assert!(JsonLexer::new(true).parse(&mut cursor).is_err());
        assert_eq!(cursor.position().pos, 0);
    }

    #[test]
    fn test_without_full_input_requirement_lexes_a_prefix() {
        let mut cursor = Cursor::new(b"1 2 @rest");
        let tokens = JsonLexer::new(false).parse(&mut cursor).unwrap();
        assert_eq!(tokens.len(), 2);
        assert_eq!(cursor.position().pos, 4);
    }

    #[test]
    fn test_trailing_whitespace_is_consumed() {
        let mut cursor = Cursor::new(b"7 \n ");
        let tokens = JsonLexer::new(true).parse(&mut cursor).unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(cursor.position().pos, 4);
    }
}
