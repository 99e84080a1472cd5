use std::fmt;

/// Operators understood by the engine.
///
/// Names outside the built-in set compile to [`Operator::Custom`] and are
/// resolved against the engine's custom operator table when evaluated.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Filled,
    Valid,
    Equal,
    MinLength,
    MaxLength,
    Length,
    Email,
    Url,
    RegExp,
    Pattern,
    Integer,
    Float,
    Range,
    Submitted,
    Custom(String),
}

impl Operator {
    /// Map a normalized operator name to an operator. Names are case-sensitive.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "filled" => Operator::Filled,
            "valid" => Operator::Valid,
            "equal" => Operator::Equal,
            "minLength" => Operator::MinLength,
            "maxLength" => Operator::MaxLength,
            "length" => Operator::Length,
            "email" => Operator::Email,
            "url" => Operator::Url,
            "regexp" => Operator::RegExp,
            "pattern" => Operator::Pattern,
            "integer" => Operator::Integer,
            "float" => Operator::Float,
            "range" => Operator::Range,
            "submitted" => Operator::Submitted,
            other => Operator::Custom(other.to_owned()),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Operator::Filled => "filled",
            Operator::Valid => "valid",
            Operator::Equal => "equal",
            Operator::MinLength => "minLength",
            Operator::MaxLength => "maxLength",
            Operator::Length => "length",
            Operator::Email => "email",
            Operator::Url => "url",
            Operator::RegExp => "regexp",
            Operator::Pattern => "pattern",
            Operator::Integer => "integer",
            Operator::Float => "float",
            Operator::Range => "range",
            Operator::Submitted => "submitted",
            Operator::Custom(name) => name,
        }
    }

    #[must_use]
    pub fn is_builtin(&self) -> bool {
        !matches!(self, Operator::Custom(_))
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
