//! Diagnostics.
//!
//! Every error the reader can produce is a variant of [`Diagnostic`], each
//! carrying the position at which it was detected plus whatever payload the
//! kind needs for a useful message. The taxonomy is closed: parsing either
//! yields a value or exactly one of these.

use thiserror::Error;

use crate::position::Position;

/// Result alias for parsing operations.
pub type ParseResult<T> = Result<T, Diagnostic>;

/// A single positioned parse error.
///
/// Combinators either surface a sub-error unchanged or translate it into a
/// more specific kind when the calling grammar knows more (for example a
/// missing digit inside an unsigned exponent becomes
/// [`ExpectedADigitOrASign`](Diagnostic::ExpectedADigitOrASign)). Before an
/// error is returned, any input the failing parser consumed has been given
/// back.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Diagnostic {
    /// A byte no applicable grammar rule accepts.
    #[error("unexpected character ('{found}') at {pos}, expected {expected}")]
    UnexpectedCharacter {
        /// Where the byte was found.
        pos: Position,
        /// The offending byte.
        found: char,
        /// Description of what would have been acceptable.
        expected: String,
    },

    /// An unescaped control character inside a string.
    #[error(
        "unexpected control character ({}) at {pos}, control characters must be escaped as \\u{byte:04X}",
        control_name(.byte)
    )]
    UnexpectedControlCharacter {
        /// Where the byte was found.
        pos: Position,
        /// The control byte (below 0x20).
        byte: u8,
    },

    /// The input ended where more bytes were required.
    #[error("unexpected end of input at {pos}")]
    UnexpectedEndOfInput {
        /// The end of the input.
        pos: Position,
    },

    /// A decimal digit was required.
    #[error("expected a digit at {pos}, found {}", found_text(.found))]
    ExpectedADigit {
        /// Where the digit was required.
        pos: Position,
        /// The byte found instead, if the input did not simply end.
        found: Option<char>,
    },

    /// A hexadecimal digit was required.
    #[error("expected a hex digit at {pos}, found {}", found_text(.found))]
    ExpectedAHexDigit {
        /// Where the digit was required.
        pos: Position,
        /// The byte found instead, if the input did not simply end.
        found: Option<char>,
    },

    /// A digit or an exponent sign was required.
    #[error("expected a digit or a sign at {pos}, found {}", found_text(.found))]
    ExpectedADigitOrASign {
        /// Where the digit or sign was required.
        pos: Position,
        /// The byte found instead, if the input did not simply end.
        found: Option<char>,
    },

    /// A malformed UTF-8 sequence or UTF-16 escape pair.
    #[error("invalid {encoding} encoding at {pos}: {detail}")]
    InvalidEncoding {
        /// Where the sequence started.
        pos: Position,
        /// What was wrong with it.
        detail: String,
        /// The encoding being decoded (`utf-8` or `utf-16`).
        encoding: &'static str,
    },

    /// A run of letters that is not `null`, `true` or `false`.
    #[error("invalid literal (\"{lexeme}\") at {pos}, expected \"null\", \"true\" or \"false\"")]
    InvalidLiteral {
        /// Where the run started.
        pos: Position,
        /// The offending run of letters.
        lexeme: String,
    },

    /// A backslash followed by something that is not a valid escape.
    #[error("invalid escape sequence (\"{lexeme}\") at {pos}")]
    InvalidEscape {
        /// Position of the backslash.
        pos: Position,
        /// The offending escape text, backslash included.
        lexeme: String,
    },

    /// No literal could start here.
    #[error("expected a literal at {pos}")]
    ExpectedALiteral {
        /// Where a literal was expected.
        pos: Position,
    },

    /// No number could start here.
    #[error("expected a number at {pos}")]
    ExpectedANumber {
        /// Where a number was expected.
        pos: Position,
    },

    /// No string could start here.
    #[error("expected a string at {pos}")]
    ExpectedAString {
        /// Where a string was expected.
        pos: Position,
    },

    /// No structural character could start here.
    #[error("expected a syntax character at {pos}")]
    ExpectedASyntax {
        /// Where a structural character was expected.
        pos: Position,
    },

    /// An array was required but `[` was missing.
    #[error("expected '[' at {pos}")]
    ExpectedArrayStart {
        /// Where `[` was expected.
        pos: Position,
    },

    /// An object was required but `{` was missing.
    #[error("expected '{{' at {pos}")]
    ExpectedObjectStart {
        /// Where `{` was expected.
        pos: Position,
    },

    /// A value of some shape was required.
    #[error("expected a value at {pos}")]
    ExpectedAValue {
        /// Where a value was expected.
        pos: Position,
    },

    /// Inside an object: either a key or the closing brace.
    #[error("expected a string or '}}' at {pos}")]
    ExpectedAStringOrObjectEnd {
        /// Where a key or `}` was expected.
        pos: Position,
    },

    /// The `:` between a key and its value was missing.
    #[error("expected ':' at {pos}")]
    ExpectedColon {
        /// Where `:` was expected.
        pos: Position,
    },

    /// Inside an object: either a comma or the closing brace.
    #[error("expected ',' or '}}' at {pos}")]
    ExpectedCommaOrObjectEnd {
        /// Where `,` or `}` was expected.
        pos: Position,
    },

    /// Inside an array: either an element or the closing bracket.
    #[error("expected a value or ']' at {pos}")]
    ExpectedAValueOrArrayEnd {
        /// Where an element or `]` was expected.
        pos: Position,
    },

    /// Inside an array: either a comma or the closing bracket.
    #[error("expected ',' or ']' at {pos}")]
    ExpectedCommaOrArrayEnd {
        /// Where `,` or `]` was expected.
        pos: Position,
    },
}

impl Diagnostic {
    /// The source position at which the error was detected.
    pub fn pos(&self) -> Position {
        match self {
            Diagnostic::UnexpectedCharacter { pos, .. }
            | Diagnostic::UnexpectedControlCharacter { pos, .. }
            | Diagnostic::UnexpectedEndOfInput { pos }
            | Diagnostic::ExpectedADigit { pos, .. }
            | Diagnostic::ExpectedAHexDigit { pos, .. }
            | Diagnostic::ExpectedADigitOrASign { pos, .. }
            | Diagnostic::InvalidEncoding { pos, .. }
            | Diagnostic::InvalidLiteral { pos, .. }
            | Diagnostic::InvalidEscape { pos, .. }
            | Diagnostic::ExpectedALiteral { pos }
            | Diagnostic::ExpectedANumber { pos }
            | Diagnostic::ExpectedAString { pos }
            | Diagnostic::ExpectedASyntax { pos }
            | Diagnostic::ExpectedArrayStart { pos }
            | Diagnostic::ExpectedObjectStart { pos }
            | Diagnostic::ExpectedAValue { pos }
            | Diagnostic::ExpectedAStringOrObjectEnd { pos }
            | Diagnostic::ExpectedColon { pos }
            | Diagnostic::ExpectedCommaOrObjectEnd { pos }
            | Diagnostic::ExpectedAValueOrArrayEnd { pos }
            | Diagnostic::ExpectedCommaOrArrayEnd { pos } => *pos,
        }
    }
}

/// Standard abbreviations for the C0 control characters.
const CONTROL_NAMES: [&str; 32] = [
    "NUL", "SOH", "STX", "ETX", "EOT", "ENQ", "ACK", "BEL", "BS", "HT", "LF", "VT", "FF", "CR",
    "SO", "SI", "DLE", "DC1", "DC2", "DC3", "DC4", "NAK", "SYN", "ETB", "CAN", "EM", "SUB", "ESC",
    "FS", "GS", "RS", "US",
];

fn control_name(byte: &u8) -> &'static str {
    CONTROL_NAMES.get(usize::from(*byte)).copied().unwrap_or("control")
}

fn found_text(found: &Option<char>) -> String {
    match found {
        Some(ch) => format!("'{ch}'"),
        None => String::from("end of input"),
    }
}
