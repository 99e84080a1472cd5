mod error;
mod grammar;
mod record;

pub use error::ParseError;
pub(crate) use record::RuleRecord;

/// Operator token split into its negation flag and normalized name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct OperatorToken {
    pub(crate) negate: bool,
    pub(crate) name: String,
}

/// Parse serialized rule metadata into raw records.
///
/// # Errors
///
/// Returns [`ParseError::Json`] if the input is not a valid record list.
pub(crate) fn parse_records(input: &str) -> Result<Vec<RuleRecord>, ParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }
    let records = if trimmed.starts_with('[') {
        serde_json::from_str(trimmed)?
    } else {
        serde_json::from_str(&format!("[{trimmed}]"))?
    };
    Ok(records)
}

/// Parse an operator token such as `~:equal` or `Shop\Rules::isbn`.
///
/// Namespace separators collapse to `_` and backslashes are dropped.
///
/// # Errors
///
/// Returns [`ParseError::Operator`] when no operator name remains.
pub(crate) fn parse_operator(token: &str) -> Result<OperatorToken, ParseError> {
    use winnow::Parser;

    let mut input = token;
    let (negate, raw) = grammar::operator_token
        .parse_next(&mut input)
        .map_err(|_| ParseError::Operator {
            token: token.to_owned(),
        })?;
    let name = raw.replace("::", "_").replace('\\', "");
    if name.is_empty() {
        return Err(ParseError::Operator {
            token: token.to_owned(),
        });
    }
    Ok(OperatorToken { negate, name })
}

pub(crate) use grammar::{parse_float, regexp_literal, string_to_number};
