use thiserror::Error;

use crate::ConfigError;
use crate::parse::ParseError;

/// Unified error type covering metadata parsing, engine configuration and
/// the binary cache.
///
/// Expected validation failures are never errors; they are reported through
/// [`Feedback`](crate::Feedback).
#[derive(Debug, Error)]
pub enum RuleformError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Serialize(#[from] crate::serial::SerializeError),

    #[cfg(feature = "binary-cache")]
    #[error(transparent)]
    Deserialize(#[from] crate::serial::DeserializeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RuleList;

    #[test]
    fn parse_errors_convert() {
        fn load(input: &str) -> Result<RuleList, RuleformError> {
            Ok(RuleList::parse(input)?)
        }
        let err = load("{").unwrap_err();
        assert!(matches!(err, RuleformError::Parse(ParseError::Json(_))));
        assert!(err.to_string().starts_with("malformed rule metadata"));
    }

    #[test]
    fn config_errors_convert() {
        let err: RuleformError = ConfigError::ZeroDepth.into();
        assert!(matches!(err, RuleformError::Config(_)));
    }
}
