use winnow::ascii::{digit0, digit1};
use winnow::combinator::{alt, eof, opt, terminated};
use winnow::error::ModalResult;
use winnow::prelude::*;
use winnow::token::{one_of, take_while};

// -- Operator tokens --------------------------------------------------------

/// `~`? `:`? name, where the name runs up to the first `?`.
pub(super) fn operator_token<'i>(input: &mut &'i str) -> ModalResult<(bool, &'i str)> {
    let negate = opt('~').parse_next(input)?.is_some();
    let _: Option<char> = opt(':').parse_next(input)?;
    let name = take_while(1.., |c: char| c != '?').parse_next(input)?;
    Ok((negate, name))
}

// -- Regular expression literals --------------------------------------------

fn regexp_flags<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    terminated(take_while(0.., ['i', 'm', 'u']), eof).parse_next(input)
}

/// Split `/pattern/flags` into its parts. The pattern extends to the last `/`.
pub(crate) fn regexp_literal(input: &str) -> Option<(&str, &str)> {
    if input.contains(['\n', '\r', '\u{2028}', '\u{2029}']) {
        return None;
    }
    let (pattern, mut flags) = input.strip_prefix('/')?.rsplit_once('/')?;
    let flags = regexp_flags.parse_next(&mut flags).ok()?;
    Some((pattern, flags))
}

// -- Numbers ----------------------------------------------------------------

fn unsigned_decimal<'i>(input: &mut &'i str) -> ModalResult<&'i str> {
    (
        alt(((digit1, opt(('.', digit0))).void(), ('.', digit1).void())),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .parse_next(input)
}

fn signed_number(input: &mut &str) -> ModalResult<f64> {
    let sign = opt(one_of(['+', '-'])).parse_next(input)?;
    let magnitude = alt((
        "Infinity".value(f64::INFINITY),
        unsigned_decimal.try_map(str::parse::<f64>),
    ))
    .parse_next(input)?;
    Ok(if sign == Some('-') { -magnitude } else { magnitude })
}

fn trim_js(input: &str) -> &str {
    input.trim_matches(|c: char| c.is_whitespace() || c == '\u{feff}')
}

/// Browser `Number(string)`: the whole trimmed string must be numeric, an
/// empty string is zero, anything else is NaN.
#[allow(clippy::cast_precision_loss)]
pub(crate) fn string_to_number(input: &str) -> f64 {
    let trimmed = trim_js(input);
    if trimmed.is_empty() {
        return 0.0;
    }
    for (prefix, radix) in [("0x", 16), ("0X", 16), ("0o", 8), ("0O", 8), ("0b", 2), ("0B", 2)] {
        if let Some(digits) = trimmed.strip_prefix(prefix) {
            return u64::from_str_radix(digits, radix).map_or(f64::NAN, |n| n as f64);
        }
    }
    terminated(signed_number, eof)
        .parse(trimmed)
        .unwrap_or(f64::NAN)
}

/// Browser `parseFloat`: reads the longest numeric prefix after leading
/// whitespace, NaN when there is none.
pub(crate) fn parse_float(input: &str) -> f64 {
    let mut rest = input.trim_start_matches(|c: char| c.is_whitespace() || c == '\u{feff}');
    signed_number.parse_next(&mut rest).unwrap_or(f64::NAN)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn token(input: &str) -> Option<(bool, &str)> {
        let mut input = input;
        operator_token.parse_next(&mut input).ok()
    }

    #[test]
    fn operator_plain() {
        assert_eq!(token("filled"), Some((false, "filled")));
    }

    #[test]
    fn operator_negated_with_colon() {
        assert_eq!(token("~:equal"), Some((true, "equal")));
    }

    #[test]
    fn operator_stops_at_question_mark() {
        assert_eq!(token(":filled?x=1"), Some((false, "filled")));
    }

    #[test]
    fn operator_empty_is_rejected() {
        assert_eq!(token("~"), None);
        assert_eq!(token(""), None);
        assert_eq!(token("?"), None);
    }

    #[test]
    fn regexp_literal_splits_on_last_slash() {
        assert_eq!(regexp_literal("/a\\/b/i"), Some(("a\\/b", "i")));
        assert_eq!(regexp_literal("/[0-9]+/"), Some(("[0-9]+", "")));
        assert_eq!(regexp_literal("/x/imu"), Some(("x", "imu")));
    }

    #[test]
    fn regexp_literal_rejects_bad_shapes() {
        assert_eq!(regexp_literal("abc"), None);
        assert_eq!(regexp_literal("/abc"), None);
        assert_eq!(regexp_literal("/abc/g"), None);
        assert_eq!(regexp_literal("/a\nb/"), None);
    }

    #[test]
    fn number_whole_string() {
        assert_eq!(string_to_number("42"), 42.0);
        assert_eq!(string_to_number("  -3.5 "), -3.5);
        assert_eq!(string_to_number(".5"), 0.5);
        assert_eq!(string_to_number("5."), 5.0);
        assert_eq!(string_to_number("1e3"), 1000.0);
        assert_eq!(string_to_number(""), 0.0);
        assert_eq!(string_to_number("   "), 0.0);
        assert_eq!(string_to_number("0x1F"), 31.0);
        assert_eq!(string_to_number("-Infinity"), f64::NEG_INFINITY);
        assert!(string_to_number("12px").is_nan());
        assert!(string_to_number("1,5").is_nan());
        assert!(string_to_number("inf").is_nan());
        assert!(string_to_number("-0x10").is_nan());
    }

    #[test]
    fn float_prefix() {
        assert_eq!(parse_float("12px"), 12.0);
        assert_eq!(parse_float("  7"), 7.0);
        assert_eq!(parse_float("1e"), 1.0);
        assert_eq!(parse_float("-.25x"), -0.25);
        assert_eq!(parse_float("3,5"), 3.0);
        assert!(parse_float("x").is_nan());
        assert!(parse_float("").is_nan());
    }
}
