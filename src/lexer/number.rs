//! Number lexing.
//!
//! Grammar: `-? (0 | [1-9][0-9]*) ( "." [0-9]+ )? ( [eE] [+-]? [0-9]+ )?`.
//!
//! An integer and a floating-point reading are accumulated in parallel.
//! The token stays an integer until the whole part overflows `i64` or a
//! fraction or exponent appears; from then on only the float reading
//! matters, but digits are still consumed normally. Exponents beyond twice
//! the decade range of `f64` clamp to a signed infinity or a signed zero
//! instead of erroring.

use crate::combinator::Parser;
use crate::cursor::Cursor;
use crate::error::{Diagnostic, ParseResult};
use crate::scan::DigitParser;
use crate::token::{Number, TokenKind};

/// Decimal exponents above this produce a signed infinity.
const EXP_CLAMP_MAX: i64 = 2 * f64::MAX_10_EXP as i64;
/// Decimal exponents below this produce a signed zero.
const EXP_CLAMP_MIN: i64 = 2 * f64::MIN_10_EXP as i64;

/// Lexes a number token.
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberLexer;

impl<'a> Parser<Cursor<'a>> for NumberLexer {
    type Output = TokenKind;
    type Error = Diagnostic;

    fn parse(&mut self, input: &mut Cursor<'a>) -> Result<TokenKind, Diagnostic> {
        let start = input.position();
        match input.peek() {
            None => return Err(Diagnostic::UnexpectedEndOfInput { pos: start }),
            Some(byte) if byte != b'-' && !byte.is_ascii_digit() => {
                return Err(Diagnostic::ExpectedANumber { pos: start });
            }
            Some(_) => {}
        }
        lex(input).map_err(|error| {
            input.set_position(start);
            error
        })
    }
}

fn lex(input: &mut Cursor<'_>) -> ParseResult<TokenKind> {
    let mut digit = DigitParser;
    let negative = input.peek() == Some(b'-');
    if negative {
        input.advance_by(1);
    }

    let first = digit.parse(input)?;
    let mut is_int = true;
    let mut int_value: i64 = if negative {
        -i64::from(first)
    } else {
        i64::from(first)
    };
    let mut magnitude = f64::from(first);

    // A leading zero stands alone; any other first digit opens a run.
    if first != 0 {
        loop {
            let byte = match input.peek() {
                Some(byte) if byte.is_ascii_digit() => byte,
                _ => break,
            };
            input.advance_by(1);
            let value = i64::from(byte - b'0');
            if is_int {
                let next = if negative {
                    int_value.checked_mul(10).and_then(|v| v.checked_sub(value))
                } else {
                    int_value.checked_mul(10).and_then(|v| v.checked_add(value))
                };
                match next {
                    Some(widened) => int_value = widened,
                    None => is_int = false,
                }
            }
            magnitude = magnitude * 10.0 + f64::from(byte - b'0');
        }
    }

    let mut final_exp: i64 = 0;

    if input.peek() == Some(b'.') {
        input.advance_by(1);
        is_int = false;
        let first = digit.parse(input).map_err(expect_digit)?;
        magnitude = magnitude * 10.0 + f64::from(first);
        final_exp -= 1;
        loop {
            let byte = match input.peek() {
                Some(byte) if byte.is_ascii_digit() => byte,
                _ => break,
            };
            input.advance_by(1);
            magnitude = magnitude * 10.0 + f64::from(byte - b'0');
            final_exp -= 1;
        }
    }

    if matches!(input.peek(), Some(b'e' | b'E')) {
        input.advance_by(1);
        is_int = false;
        let (saw_sign, exp_negative) = match input.peek() {
            Some(b'+') => {
                input.advance_by(1);
                (true, false)
            }
            Some(b'-') => {
                input.advance_by(1);
                (true, true)
            }
            _ => (false, false),
        };
        let first = digit
            .parse(input)
            .map_err(|error| expect_exponent_digit(error, saw_sign))?;
        let mut exponent = i64::from(first);
        loop {
            let byte = match input.peek() {
                Some(byte) if byte.is_ascii_digit() => byte,
                _ => break,
            };
            input.advance_by(1);
            exponent = exponent.saturating_mul(10).saturating_add(i64::from(byte - b'0'));
        }
        final_exp = final_exp.saturating_add(if exp_negative { -exponent } else { exponent });
    }

    if is_int {
        return Ok(TokenKind::Number(Number::Int(int_value)));
    }

    let value = if final_exp > EXP_CLAMP_MAX {
        f64::INFINITY
    } else if final_exp < EXP_CLAMP_MIN {
        0.0
    } else {
        scale(magnitude, final_exp)
    };
    Ok(TokenKind::Number(Number::Float(if negative { -value } else { value })))
}

/// A missing digit at end of input still means "expected a digit" here.
fn expect_digit(error: Diagnostic) -> Diagnostic {
    match error {
        Diagnostic::UnexpectedEndOfInput { pos } => Diagnostic::ExpectedADigit { pos, found: None },
        other => other,
    }
}

/// Before any exponent sign has been seen, a sign would also have been
/// acceptable, and the diagnostic says so.
fn expect_exponent_digit(error: Diagnostic, saw_sign: bool) -> Diagnostic {
    let (pos, found) = match error {
        Diagnostic::ExpectedADigit { pos, found } => (pos, found),
        Diagnostic::UnexpectedEndOfInput { pos } => (pos, None),
        other => return other,
    };
    if saw_sign {
        Diagnostic::ExpectedADigit { pos, found }
    } else {
        Diagnostic::ExpectedADigitOrASign { pos, found }
    }
}

/// Multiply or divide by ten `exp` times. Digit-wise accumulation plus
/// repeated scaling is not guaranteed correctly rounded for every decimal.
fn scale(mut value: f64, exp: i64) -> f64 {
    if exp >= 0 {
        for _ in 0..exp {
            value *= 10.0;
        }
    } else {
        for _ in 0..-exp {
            value /= 10.0;
        }
    }
    value
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::Position;

    fn at(pos: usize, line: usize, col: usize) -> Position {
        Position { pos, line, col }
    }

    fn lex_number(input: &[u8]) -> Result<TokenKind, Diagnostic> {
        NumberLexer.parse(&mut Cursor::new(input))
    }

    fn int(input: &[u8]) -> i64 {
        match lex_number(input) {
            Ok(TokenKind::Number(Number::Int(value))) => value,
            other => panic!("expected an integer token, got {other:?}"),
        }
    }

    fn float(input: &[u8]) -> f64 {
        match lex_number(input) {
            Ok(TokenKind::Number(Number::Float(value))) => value,
            other => panic!("expected a float token, got {other:?}"),
        }
    }

    #[test]
    fn test_plain_integers() {
        assert_eq!(int(b"0"), 0);
        assert_eq!(int(b"7"), 7);
        assert_eq!(int(b"1234567890"), 1_234_567_890);
        assert_eq!(int(b"-42"), -42);
    }

    #[test]
    fn test_negative_zero_is_integer_zero() {
        assert_eq!(int(b"-0"), 0);
    }

    #[test]
    fn test_i64_extremes_stay_integral() {
        assert_eq!(int(b"9223372036854775807"), i64::MAX);
        assert_eq!(int(b"-9223372036854775808"), i64::MIN);
    }

    #[test]
    fn test_overflow_switches_to_float() {
        assert_eq!(float(b"9223372036854775808"), 9.223372036854776e18);
        assert_eq!(float(b"-9223372036854775809"), -9.223372036854776e18);
    }

    #[test]
    fn test_fractions() {
        assert_eq!(float(b"0.5"), 0.5);
        assert_eq!(float(b"1.5"), 1.5);
        assert_eq!(float(b"-2.25"), -2.25);
        assert_eq!(float(b"0.25"), 0.25);
    }

    #[test]
    fn test_exponents() {
        assert_eq!(float(b"1e5"), 100_000.0);
        assert_eq!(float(b"1E2"), 100.0);
        assert_eq!(float(b"2e+3"), 2000.0);
        assert_eq!(float(b"25e-2"), 0.25);
        assert_eq!(float(b"1e00"), 1.0);
    }

    #[test]
    fn test_fraction_and_exponent_combine() {
        assert_eq!(float(b"1.5e2"), 150.0);
        assert_eq!(float(b"12.5e-1"), 1.25);
    }

    #[test]
    fn test_huge_exponents_clamp_to_signed_infinity() {
        assert_eq!(float(b"1e1000"), f64::INFINITY);
        assert_eq!(float(b"-1e1000"), f64::NEG_INFINITY);
    }

    #[test]
    fn test_tiny_exponents_clamp_to_signed_zero() {
        let positive = float(b"1e-1000");
        assert_eq!(positive, 0.0);
        assert!(positive.is_sign_positive());
        let negative = float(b"-1e-1000");
        assert_eq!(negative, 0.0);
        assert!(negative.is_sign_negative());
    }

    #[test]
    fn test_preflight_rejects_without_consuming() {
        let mut cursor = Cursor::new(b"x");
        assert_eq!(
            NumberLexer.parse(&mut cursor),
            Err(Diagnostic::ExpectedANumber { pos: at(0, 0, 0) })
        );
        assert_eq!(cursor.position().pos, 0);
    }

    #[test]
    fn test_end_of_input_preflight() {
        assert_eq!(
            lex_number(b""),
            Err(Diagnostic::UnexpectedEndOfInput { pos: at(0, 0, 0) })
        );
    }

    #[test]
    fn test_bare_exponent_marker() {
        assert_eq!(
            lex_number(b"1e"),
            Err(Diagnostic::ExpectedADigitOrASign { pos: at(2, 0, 2), found: None })
        );
    }

    #[test]
    fn test_exponent_marker_with_junk() {
        assert_eq!(
            lex_number(b"1ex"),
            Err(Diagnostic::ExpectedADigitOrASign { pos: at(2, 0, 2), found: Some('x') })
        );
    }

    #[test]
    fn test_signed_exponent_without_digits() {
        assert_eq!(
            lex_number(b"1e+"),
            Err(Diagnostic::ExpectedADigit { pos: at(3, 0, 3), found: None })
        );
    }

    #[test]
    fn test_dot_without_digits() {
        assert_eq!(
            lex_number(b"1."),
            Err(Diagnostic::ExpectedADigit { pos: at(2, 0, 2), found: None })
        );
        assert_eq!(
            lex_number(b"1.x"),
            Err(Diagnostic::ExpectedADigit { pos: at(2, 0, 2), found: Some('x') })
        );
    }

    #[test]
    fn test_failures_roll_the_cursor_back() {
        let mut cursor = Cursor::new(b"12.x");
        assert!(NumberLexer.parse(&mut cursor).is_err());
        assert_eq!(cursor.position().pos, 0);
    }

    #[test]
    fn test_minus_without_digits() {
        let mut cursor = Cursor::new(b"-a");
        assert_eq!(
            NumberLexer.parse(&mut cursor),
            Err(Diagnostic::ExpectedADigit { pos: at(1, 0, 1), found: Some('a') })
        );
        assert_eq!(cursor.position().pos, 0);
    }

    #[test]
    fn test_leading_zero_stops_the_integer_part() {
        let mut cursor = Cursor::new(b"01");
        assert_eq!(
            NumberLexer.parse(&mut cursor),
            Ok(TokenKind::Number(Number::Int(0)))
        );
        assert_eq!(cursor.position().pos, 1);
    }
}
