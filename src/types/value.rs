use std::borrow::Cow;
use std::fmt;

/// Current semantic value of a control.
///
/// An absent value (an unselected radio group, a missing control) is modelled
/// as `Option::<Value>::None` rather than as a variant here.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Trimmed text of a text-like field, the selected option of a select,
    /// or the value of the checked member of a radio group.
    Text(String),
    /// Checked state of a checkbox.
    Checked(bool),
}

/// A literal scalar carried inside a rule argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    /// Explicit `null`. Inside a bound pair it means "unbounded on this side".
    Null,
    /// A boolean literal.
    Bool(bool),
    /// A numeric literal.
    Number(f64),
    /// A string literal.
    String(String),
}

impl Value {
    /// Whether this value counts as "not filled".
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Value::Text(s) => s.is_empty(),
            Value::Checked(checked) => !checked,
        }
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            Value::Checked(_) => None,
        }
    }

    /// Length in UTF-16 code units, the unit browsers report for `value.length`.
    /// Checkbox states have no length.
    #[must_use]
    pub fn text_len(&self) -> Option<usize> {
        self.as_text().map(|s| s.encode_utf16().count())
    }

    /// Numeric conversion following browser `Number(value)` rules.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Value::Text(s) => crate::parse::string_to_number(s),
            Value::Checked(b) => bool_to_number(*b),
        }
    }

    /// String form used by pattern operators.
    #[must_use]
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Value::Text(s) => Cow::Borrowed(s),
            Value::Checked(b) => Cow::Owned(b.to_string()),
        }
    }

    fn as_scalar(&self) -> Scalar {
        match self {
            Value::Text(s) => Scalar::String(s.clone()),
            Value::Checked(b) => Scalar::Bool(*b),
        }
    }
}

impl Scalar {
    /// Numeric conversion following browser `Number(value)` rules.
    #[must_use]
    pub fn to_number(&self) -> f64 {
        match self {
            Scalar::Null => 0.0,
            Scalar::Bool(b) => bool_to_number(*b),
            Scalar::Number(n) => *n,
            Scalar::String(s) => crate::parse::string_to_number(s),
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Scalar::Null)
    }
}

fn bool_to_number(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Loose (coercive) equality between a control value and a literal, with
/// browser `==` semantics: strings and booleans compare numerically against
/// numbers, and an absent value equals only `null`.
#[must_use]
pub fn loose_eq(value: Option<&Value>, other: &Scalar) -> bool {
    let Some(value) = value else {
        return other.is_null();
    };
    match (value, other) {
        (_, Scalar::Null) => false,
        (Value::Text(a), Scalar::String(b)) => a == b,
        (Value::Checked(a), Scalar::Bool(b)) => a == b,
        (Value::Text(_) | Value::Checked(_), Scalar::Number(_) | Scalar::Bool(_)) => {
            value.to_number() == other.to_number()
        }
        (Value::Checked(_), Scalar::String(_)) => value.to_number() == other.to_number(),
    }
}

/// Loose equality between two control values.
#[must_use]
pub fn loose_eq_values(value: Option<&Value>, other: Option<&Value>) -> bool {
    match other {
        Some(other) => loose_eq(value, &other.as_scalar()),
        None => value.is_none(),
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_owned())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Checked(v)
    }
}

impl From<bool> for Scalar {
    fn from(v: bool) -> Self {
        Scalar::Bool(v)
    }
}

impl From<f64> for Scalar {
    fn from(v: f64) -> Self {
        Scalar::Number(v)
    }
}

impl From<i64> for Scalar {
    #[allow(clippy::cast_precision_loss)]
    fn from(v: i64) -> Self {
        Scalar::Number(v as f64)
    }
}

impl From<&str> for Scalar {
    fn from(v: &str) -> Self {
        Scalar::String(v.to_owned())
    }
}

impl From<String> for Scalar {
    fn from(v: String) -> Self {
        Scalar::String(v)
    }
}

impl<T: Into<Scalar>> From<Option<T>> for Scalar {
    fn from(v: Option<T>) -> Self {
        v.map_or(Scalar::Null, Into::into)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(v) => write!(f, "{v}"),
            Value::Checked(v) => write!(f, "{v}"),
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => write!(f, "null"),
            Scalar::Bool(v) => write!(f, "{v}"),
            Scalar::Number(v) => write!(f, "{v}"),
            Scalar::String(v) => write!(f, "\"{v}\""),
        }
    }
}
