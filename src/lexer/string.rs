//! String lexing.
//!
//! The body is decoded codepoint by codepoint: unescaped control
//! characters are rejected, escape sequences are resolved, and `\u`
//! escapes combine UTF-16 surrogate pairs into a single codepoint. Because
//! escapes rewrite the text, the result is always built into an owned
//! buffer rather than borrowed from the input.

use crate::combinator::Parser;
use crate::cursor::Cursor;
use crate::error::{Diagnostic, ParseResult};
use crate::position::Position;
use crate::scan::{HexDigitParser, Utf8CodePointParser};
use crate::token::TokenKind;

/// Lexes a string token, producing the unescaped text.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringLexer;

impl<'a> Parser<Cursor<'a>> for StringLexer {
    type Output = TokenKind;
    type Error = Diagnostic;

    fn parse(&mut self, input: &mut Cursor<'a>) -> Result<TokenKind, Diagnostic> {
        let start = input.position();
        match input.peek() {
            None => return Err(Diagnostic::UnexpectedEndOfInput { pos: start }),
            Some(b'"') => {
                input.advance_by(1);
            }
            Some(_) => return Err(Diagnostic::ExpectedAString { pos: start }),
        }
        lex_body(input).map_err(|error| {
            input.set_position(start);
            error
        })
    }
}

fn lex_body(input: &mut Cursor<'_>) -> ParseResult<TokenKind> {
    let mut decoder = Utf8CodePointParser;
    let mut text = String::new();
    loop {
        let pos = input.position();
        let decoded = decoder.parse(input)?;
        match decoded {
            '"' => return Ok(TokenKind::String(text)),
            '\\' => lex_escape(input, pos, &mut text)?,
            ch if (ch as u32) < 0x20 => {
                return Err(Diagnostic::UnexpectedControlCharacter { pos, byte: ch as u8 });
            }
            ch => text.push(ch),
        }
    }
}

fn lex_escape(
    input: &mut Cursor<'_>,
    escape_start: Position,
    text: &mut String,
) -> ParseResult<()> {
    let selector_pos = input.position();
    let selector = match input.advance() {
        Some(byte) => byte,
        None => return Err(Diagnostic::UnexpectedEndOfInput { pos: selector_pos }),
    };
    let unescaped = match selector {
        b'"' => '"',
        b'\\' => '\\',
        b'/' => '/',
        b'b' => '\x08',
        b'f' => '\x0C',
        b'n' => '\n',
        b'r' => '\r',
        b't' => '\t',
        b'u' => {
            let decoded = lex_unicode_escape(input, escape_start)?;
            text.push(decoded);
            return Ok(());
        }
        other => {
            return Err(Diagnostic::InvalidEscape {
                pos: escape_start,
                lexeme: format!("\\{}", other as char),
            });
        }
    };
    text.push(unescaped);
    Ok(())
}

/// The four hex digits after `\u`, then a second escape when the value is
/// a high surrogate.
fn lex_unicode_escape(input: &mut Cursor<'_>, escape_start: Position) -> ParseResult<char> {
    let first = lex_code_unit(input, escape_start)?;
    if (0xDC00..=0xDFFF).contains(&first) {
        return Err(Diagnostic::InvalidEncoding {
            pos: escape_start,
            detail: String::from("low surrogate not after a high surrogate"),
            encoding: "utf-16",
        });
    }
    if (0xD800..=0xDBFF).contains(&first) {
        if input.peek_by(2) != &b"\\u"[..] {
            return Err(Diagnostic::InvalidEncoding {
                pos: escape_start,
                detail: String::from("high surrogate not followed by a low surrogate"),
                encoding: "utf-16",
            });
        }
        let second_start = input.position();
        input.advance_by(2);
        let second = lex_code_unit(input, second_start)?;
        if !(0xDC00..=0xDFFF).contains(&second) {
            return Err(Diagnostic::InvalidEncoding {
                pos: escape_start,
                detail: String::from("high surrogate not followed by a low surrogate"),
                encoding: "utf-16",
            });
        }
        let codepoint =
            0x10000 + ((u32::from(first) & 0x3FF) << 10 | (u32::from(second) & 0x3FF));
        return char::from_u32(codepoint).ok_or_else(|| Diagnostic::InvalidEncoding {
            pos: escape_start,
            detail: format!("codepoint U+{codepoint:X} is out of range"),
            encoding: "utf-16",
        });
    }
    char::from_u32(u32::from(first)).ok_or_else(|| Diagnostic::InvalidEncoding {
        pos: escape_start,
        detail: format!("code unit U+{first:04X} is not a scalar value"),
        encoding: "utf-16",
    })
}

/// Exactly four hex digits forming one UTF-16 code unit. On failure the
/// offending escape lexeme, up to six characters from its backslash, is
/// reported.
fn lex_code_unit(input: &mut Cursor<'_>, escape_start: Position) -> ParseResult<u16> {
    let mut hex = HexDigitParser;
    let mut value: u16 = 0;
    for _ in 0..4 {
        let digit = match hex.parse(input) {
            Ok(digit) => digit,
            Err(_) => {
                input.set_position(escape_start);
                return Err(Diagnostic::InvalidEscape {
                    pos: escape_start,
                    lexeme: String::from_utf8_lossy(input.peek_by(6)).into_owned(),
                });
            }
        };
        value = (value << 4) | u16::from(digit);
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn at(pos: usize, line: usize, col: usize) -> Position {
        Position { pos, line, col }
    }

    fn lex(input: &[u8]) -> Result<TokenKind, Diagnostic> {
        StringLexer.parse(&mut Cursor::new(input))
    }

    fn text(input: &[u8]) -> String {
        match lex(input) {
            Ok(TokenKind::String(text)) => text,
            other => panic!("expected a string token, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_strings() {
        assert_eq!(text(br#""""#), "");
        assert_eq!(text(br#""hello""#), "hello");
        assert_eq!(text(br#""with spaces""#), "with spaces");
    }

    #[test]
    fn test_multibyte_text_is_preserved() {
        assert_eq!(text("\"héllo €😀\"".as_bytes()), "héllo €😀");
    }

    #[test]
    fn test_single_character_escapes() {
        assert_eq!(text(br#""\"\\\/""#), "\"\\/");
        assert_eq!(text(br#""\b\f\n\r\t""#), "\x08\x0C\n\r\t");
    }

    #[test]
    fn test_unicode_escape() {
        assert_eq!(text(br#""\u0041""#), "A");
        assert_eq!(text(br#""\u00E9""#), "\u{E9}");
        assert_eq!(text(br#""\u20AC""#), "\u{20AC}");
        assert_eq!(text(br#""\uAB98""#), "\u{AB98}");
    }

    #[test]
    fn test_surrogate_pair_combines() {
        assert_eq!(text(br#""\uD83D\uDE00""#), "\u{1F600}");
        assert_eq!(text(br#""\uD834\uDD1E""#), "\u{1D11E}");
    }

    #[test]
    fn test_missing_opening_quote() {
        assert_eq!(
            lex(b"abc"),
            Err(Diagnostic::ExpectedAString { pos: at(0, 0, 0) })
        );
    }

    #[test]
    fn test_unterminated_string() {
        let mut cursor = Cursor::new(br#""abc"#);
        assert_eq!(
            StringLexer.parse(&mut cursor),
            Err(Diagnostic::UnexpectedEndOfInput { pos: at(4, 0, 4) })
        );
        assert_eq!(cursor.position().pos, 0);
    }

    #[test]
    fn test_control_character_is_rejected_at_its_byte() {
        let mut cursor = Cursor::new(b"\"ab\x01c\"");
        assert_eq!(
            StringLexer.parse(&mut cursor),
            Err(Diagnostic::UnexpectedControlCharacter { pos: at(3, 0, 3), byte: 0x01 })
        );
        assert_eq!(cursor.position().pos, 0);
    }

    #[test]
    fn test_invalid_escape_selector() {
        assert_eq!(
            lex(br#""\q""#),
            Err(Diagnostic::InvalidEscape {
                pos: at(1, 0, 1),
                lexeme: String::from("\\q"),
            })
        );
    }

    #[test]
    fn test_bad_hex_reports_the_escape_lexeme() {
        assert_eq!(
            lex(br#""\u12G4""#),
            Err(Diagnostic::InvalidEscape {
                pos: at(1, 0, 1),
                lexeme: String::from("\\u12G4"),
            })
        );
    }

    #[test]
    fn test_truncated_unicode_escape() {
        assert_eq!(
            lex(br#""\u12"#),
            Err(Diagnostic::InvalidEscape {
                pos: at(1, 0, 1),
                lexeme: String::from("\\u12"),
            })
        );
    }

    #[test]
    fn test_lone_low_surrogate() {
        let error = lex(br#""\uDC00""#).unwrap_err();
        assert_eq!(
            error,
            Diagnostic::InvalidEncoding {
                pos: at(1, 0, 1),
                detail: String::from("low surrogate not after a high surrogate"),
                encoding: "utf-16",
            }
        );
    }

    #[test]
    fn test_high_surrogate_without_second_escape() {
        let error = lex(br#""\uD83Dx""#).unwrap_err();
        assert_eq!(
            error,
            Diagnostic::InvalidEncoding {
                pos: at(1, 0, 1),
                detail: String::from("high surrogate not followed by a low surrogate"),
                encoding: "utf-16",
            }
        );
    }

    #[test]
    fn test_high_surrogate_with_non_low_second_escape() {
        let error = lex(br#""\uD83D\u0041""#).unwrap_err();
        assert_eq!(
            error,
            Diagnostic::InvalidEncoding {
                pos: at(1, 0, 1),
                detail: String::from("high surrogate not followed by a low surrogate"),
                encoding: "utf-16",
            }
        );
    }

    #[test]
    fn test_invalid_utf8_in_body_propagates() {
        let mut cursor = Cursor::new(&[b'"', 0xFF, b'"']);
        let error = StringLexer.parse(&mut cursor).unwrap_err();
        assert!(matches!(error, Diagnostic::InvalidEncoding { encoding: "utf-8", .. }));
        assert_eq!(cursor.position().pos, 0);
    }

    #[test]
    fn test_failures_restore_the_cursor() {
        let mut cursor = Cursor::new(br#""abc\q""#);
        assert!(StringLexer.parse(&mut cursor).is_err());
        assert_eq!(cursor.position().pos, 0);
    }
}
