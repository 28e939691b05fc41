//! Token-to-value parsing.
//!
//! Consumes the positioned token stream produced by the lexer and builds a
//! [`JsonValue`], or reports the most specific structural diagnostic it
//! can. Every sub-parser consumes at most one token directly and restores
//! its position on failure; arrays and objects recurse through
//! [`JsonParser`] via the combinators.

use std::collections::HashMap;

use crate::combinator::{Checkpoint, Cycle, CycleStop, Or, Parser, Seq, SeqError};
use crate::cursor::Cursor;
use crate::error::{Diagnostic, ParseResult};
use crate::lexer::JsonLexer;
use crate::position::Position;
use crate::token::{Literal, Number, Syntax, Token, TokenKind};
use crate::types::JsonValue;

/// Parse a byte buffer holding one JSON document.
///
/// The input is expected to be UTF-8; byte-order marks are not stripped.
/// The whole input is lexed, the token stream is parsed into a single
/// value, and leftover tokens are rejected.
pub fn parse_bytes(input: &[u8]) -> ParseResult<JsonValue> {
    let mut cursor = Cursor::new(input);
    let mut lexer = JsonLexer::new(true);
    let lexed = lexer.parse(&mut cursor)?;
    let mut tokens = TokenCursor::new(&lexed, cursor.position());
    let mut parser = JsonParser;
    let value = parser.parse(&mut tokens)?;
    if tokens.peek().is_some() {
        return Err(Diagnostic::ExpectedAValue { pos: tokens.position() });
    }
    Ok(value)
}

/// Cursor over the lexed tokens.
///
/// Carries the lexer's final position so that diagnostics issued past the
/// last token still point at the right place.
#[derive(Debug, Clone)]
pub struct TokenCursor<'t> {
    tokens: &'t [Token],
    index: usize,
    end_pos: Position,
}

impl<'t> TokenCursor<'t> {
    /// A cursor at the first token; `end_pos` is where the lexer stopped.
    pub fn new(tokens: &'t [Token], end_pos: Position) -> Self {
        TokenCursor { tokens, index: 0, end_pos }
    }

    /// The current token, if any.
    pub fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.index)
    }

    /// Consume and return the current token.
    pub fn advance(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.index)?;
        self.index += 1;
        Some(token)
    }

    /// Position of the current token, or of the input's end when past the
    /// last token.
    pub fn position(&self) -> Position {
        self.tokens.get(self.index).map_or(self.end_pos, |token| token.pos)
    }
}

impl Checkpoint for TokenCursor<'_> {
    type Mark = usize;

    fn mark(&self) -> usize {
        self.index
    }

    fn restore(&mut self, mark: usize) {
        self.index = mark;
    }
}

/// Parses a literal token into `Null` or `Bool`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LiteralParser;

impl<'t> Parser<TokenCursor<'t>> for LiteralParser {
    type Output = JsonValue;
    type Error = Diagnostic;

    fn parse(&mut self, input: &mut TokenCursor<'t>) -> Result<JsonValue, Diagnostic> {
        match input.peek() {
            Some(Token { kind: TokenKind::Literal(literal), .. }) => {
                let value = match literal {
                    Literal::Null => JsonValue::Null,
                    Literal::Bool(flag) => JsonValue::Bool(*flag),
                };
                input.advance();
                Ok(value)
            }
            _ => Err(Diagnostic::ExpectedALiteral { pos: input.position() }),
        }
    }
}

/// Parses a number token into `Int` or `Float`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberParser;

impl<'t> Parser<TokenCursor<'t>> for NumberParser {
    type Output = JsonValue;
    type Error = Diagnostic;

    fn parse(&mut self, input: &mut TokenCursor<'t>) -> Result<JsonValue, Diagnostic> {
        match input.peek() {
            Some(Token { kind: TokenKind::Number(number), .. }) => {
                let value = match number {
                    Number::Int(value) => JsonValue::Int(*value),
                    Number::Float(value) => JsonValue::Float(*value),
                };
                input.advance();
                Ok(value)
            }
            _ => Err(Diagnostic::ExpectedANumber { pos: input.position() }),
        }
    }
}

/// Parses a string token into a string value.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringParser;

impl<'t> Parser<TokenCursor<'t>> for StringParser {
    type Output = JsonValue;
    type Error = Diagnostic;

    fn parse(&mut self, input: &mut TokenCursor<'t>) -> Result<JsonValue, Diagnostic> {
        match input.peek() {
            Some(Token { kind: TokenKind::String(text), .. }) => {
                let value = JsonValue::String(text.clone());
                input.advance();
                Ok(value)
            }
            _ => Err(Diagnostic::ExpectedAString { pos: input.position() }),
        }
    }
}

/// Parses a string token into a raw object key.
///
/// Same token as [`StringParser`], different output: the alternation over
/// value shapes needs a `JsonValue` from every branch, while object
/// members need the key text itself.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyParser;

impl<'t> Parser<TokenCursor<'t>> for KeyParser {
    type Output = String;
    type Error = Diagnostic;

    fn parse(&mut self, input: &mut TokenCursor<'t>) -> Result<String, Diagnostic> {
        match input.peek() {
            Some(Token { kind: TokenKind::String(text), .. }) => {
                let key = text.clone();
                input.advance();
                Ok(key)
            }
            _ => Err(Diagnostic::ExpectedAString { pos: input.position() }),
        }
    }
}

/// Parses one specific structural token.
#[derive(Debug, Clone, Copy)]
pub struct SyntaxParser {
    expected: Syntax,
}

impl SyntaxParser {
    /// Parser for exactly `expected`.
    pub fn new(expected: Syntax) -> Self {
        SyntaxParser { expected }
    }
}

impl<'t> Parser<TokenCursor<'t>> for SyntaxParser {
    type Output = ();
    type Error = Diagnostic;

    fn parse(&mut self, input: &mut TokenCursor<'t>) -> Result<(), Diagnostic> {
        match input.peek() {
            Some(Token { kind: TokenKind::Syntax(syntax), .. }) if *syntax == self.expected => {
                input.advance();
                Ok(())
            }
            _ => Err(Diagnostic::ExpectedASyntax { pos: input.position() }),
        }
    }
}

/// Parses `[` elements `]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayParser;

impl<'t> Parser<TokenCursor<'t>> for ArrayParser {
    type Output = JsonValue;
    type Error = Diagnostic;

    fn parse(&mut self, input: &mut TokenCursor<'t>) -> Result<JsonValue, Diagnostic> {
        let entry = input.mark();
        let mut open = SyntaxParser::new(Syntax::LeftBracket);
        if open.parse(input).is_err() {
            return Err(Diagnostic::ExpectedArrayStart { pos: input.position() });
        }
        let mut elements = Cycle::with_separator(JsonParser, SyntaxParser::new(Syntax::Comma));
        let (values, stop) = elements.run(input);
        let mut close = SyntaxParser::new(Syntax::RightBracket);
        match stop {
            CycleStop::Element { at_start: true, error } => {
                if close.parse(input).is_ok() {
                    return Ok(JsonValue::Array(values));
                }
                input.restore(entry);
                Err(element_or_array_end(error))
            }
            // A comma was consumed but no element followed. A dangling
            // separator is invalid even when `]` comes next, so the
            // closing bracket is not even tried.
            CycleStop::Element { at_start: false, error } => {
                input.restore(entry);
                Err(element_or_array_end(error))
            }
            CycleStop::Separator { .. } => {
                if close.parse(input).is_ok() {
                    return Ok(JsonValue::Array(values));
                }
                let pos = input.position();
                input.restore(entry);
                Err(Diagnostic::ExpectedCommaOrArrayEnd { pos })
            }
        }
    }
}

/// An element failure next to a possible `]`: a value that could not start
/// becomes "expected a value or ']'", while a structural failure inside
/// the value surfaces unchanged.
fn element_or_array_end(error: Diagnostic) -> Diagnostic {
    match error {
        Diagnostic::ExpectedAValue { pos } => Diagnostic::ExpectedAValueOrArrayEnd { pos },
        other => other,
    }
}

/// Parses `{` members `}`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ObjectParser;

impl<'t> Parser<TokenCursor<'t>> for ObjectParser {
    type Output = JsonValue;
    type Error = Diagnostic;

    fn parse(&mut self, input: &mut TokenCursor<'t>) -> Result<JsonValue, Diagnostic> {
        let entry = input.mark();
        let mut open = SyntaxParser::new(Syntax::LeftBrace);
        if open.parse(input).is_err() {
            return Err(Diagnostic::ExpectedObjectStart { pos: input.position() });
        }
        let mut members = Cycle::with_separator(
            Seq::new((KeyParser, SyntaxParser::new(Syntax::Colon), JsonParser)),
            SyntaxParser::new(Syntax::Comma),
        );
        let (pairs, stop) = members.run(input);
        let mut close = SyntaxParser::new(Syntax::RightBrace);
        match stop {
            CycleStop::Element { at_start: true, error } => {
                if close.parse(input).is_ok() {
                    return Ok(collect(pairs));
                }
                input.restore(entry);
                Err(member_error(error))
            }
            // Dangling comma; `}` is not tried.
            CycleStop::Element { at_start: false, error } => {
                input.restore(entry);
                Err(member_error(error))
            }
            CycleStop::Separator { .. } => {
                if close.parse(input).is_ok() {
                    return Ok(collect(pairs));
                }
                let pos = input.position();
                input.restore(entry);
                Err(Diagnostic::ExpectedCommaOrObjectEnd { pos })
            }
        }
    }
}

/// Later occurrences of a key override earlier ones.
fn collect(pairs: Vec<(String, (), JsonValue)>) -> JsonValue {
    let mut fields = HashMap::with_capacity(pairs.len());
    for (key, _, value) in pairs {
        fields.insert(key, value);
    }
    JsonValue::Object(fields)
}

/// Maps a member failure onto the object grammar: key, colon, value.
fn member_error(error: SeqError<Diagnostic>) -> Diagnostic {
    match (error.index, error.error) {
        (0, Diagnostic::ExpectedAString { pos }) => {
            Diagnostic::ExpectedAStringOrObjectEnd { pos }
        }
        (1, Diagnostic::ExpectedASyntax { pos }) => Diagnostic::ExpectedColon { pos },
        (_, other) => other,
    }
}

/// Parses one JSON value of any shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonParser;

impl<'t> Parser<TokenCursor<'t>> for JsonParser {
    type Output = JsonValue;
    type Error = Diagnostic;

    fn parse(&mut self, input: &mut TokenCursor<'t>) -> Result<JsonValue, Diagnostic> {
        let mut alternatives = Or::new((
            LiteralParser,
            NumberParser,
            StringParser,
            ArrayParser,
            ObjectParser,
        ));
        match alternatives.parse(input) {
            Ok((_, value, _)) => Ok(value),
            Err(errors) => Err(value_error(errors, input.position())),
        }
    }
}

/// Every value shape failed: an array or object that got past its opening
/// bracket has the real story; otherwise no value could start here.
fn value_error(errors: Vec<Diagnostic>, pos: Position) -> Diagnostic {
    for error in errors.into_iter().skip(3) {
        let opened = !matches!(
            error,
            Diagnostic::ExpectedArrayStart { .. } | Diagnostic::ExpectedObjectStart { .. }
        );
        if opened {
            return error;
        }
    }
    Diagnostic::ExpectedAValue { pos }
}
