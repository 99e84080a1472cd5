//! Built-in operators and operand resolution.

use std::sync::{Arc, LazyLock};

use regex::{Regex, RegexBuilder};
use tracing::debug;

use crate::types::{loose_eq, loose_eq_values};
use crate::{ArgItem, Argument, Control, Form, Operator, Outcome, Scalar, Value};

/// A registered custom operator.
pub type CustomOperator = Arc<dyn Fn(&OperatorInput<'_>) -> Outcome + Send + Sync>;

/// One resolved argument item.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Literal(Scalar),
    /// Current value of a referenced control.
    Value(Option<Value>),
}

/// A rule argument with its control references resolved.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Operands {
    #[default]
    Absent,
    Single(Operand),
    List(Vec<Operand>),
}

/// Everything an operator sees.
#[derive(Clone, Copy)]
pub struct OperatorInput<'a> {
    pub form: &'a dyn Form,
    /// The control the rule is evaluated against.
    pub control: &'a Control,
    /// Its value, with the empty sentinel already applied.
    pub value: Option<&'a Value>,
    pub operands: &'a Operands,
}

impl Operand {
    /// Loose equality against a control value.
    #[must_use]
    pub fn matches(&self, value: Option<&Value>) -> bool {
        match self {
            Operand::Literal(scalar) => loose_eq(value, scalar),
            Operand::Value(other) => loose_eq_values(value, other.as_ref()),
        }
    }

    #[must_use]
    pub fn number(&self) -> f64 {
        match self {
            Operand::Literal(scalar) => scalar.to_number(),
            Operand::Value(Some(value)) => value.to_number(),
            Operand::Value(None) => f64::NAN,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Operand::Literal(Scalar::String(s)) => Some(s),
            Operand::Value(Some(value)) => value.as_text(),
            _ => None,
        }
    }

    /// A literal `null` bound.
    #[must_use]
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Operand::Literal(Scalar::Null))
    }
}

impl Operands {
    /// Alternatives to compare against: the single operand or every list item.
    #[must_use]
    pub fn alternatives(&self) -> &[Operand] {
        match self {
            Operands::Absent => &[],
            Operands::Single(op) => std::slice::from_ref(op),
            Operands::List(items) => items,
        }
    }

    /// A `[min, max]` pair, if the argument has exactly that shape.
    #[must_use]
    pub fn pair(&self) -> Option<(&Operand, &Operand)> {
        match self {
            Operands::List(items) if items.len() == 2 => Some((&items[0], &items[1])),
            _ => None,
        }
    }

    fn single(&self) -> Option<&Operand> {
        match self {
            Operands::Single(op) => Some(op),
            _ => None,
        }
    }
}

/// Resolve control references in `argument`. Returns `None` when a referenced
/// control does not exist or the argument has an unsupported shape.
pub(crate) fn resolve(form: &dyn Form, argument: &Argument) -> Option<Operands> {
    let item = |item: &ArgItem| -> Option<Operand> {
        match item {
            ArgItem::Scalar(scalar) => Some(Operand::Literal(scalar.clone())),
            ArgItem::Control(name) => {
                let control = form.control(name)?;
                Some(Operand::Value(crate::extract::operand_value(form, &control)))
            }
            ArgItem::Unsupported(_) => None,
        }
    };
    Some(match argument {
        Argument::Absent => Operands::Absent,
        Argument::Single(it) => Operands::Single(item(it)?),
        Argument::List(items) => Operands::List(items.iter().map(item).collect::<Option<_>>()?),
    })
}

/// Evaluate a built-in operator. `valid` and custom operators need the
/// walker and are dispatched there.
pub(crate) fn apply(operator: &Operator, input: &OperatorInput<'_>) -> Outcome {
    match operator {
        Operator::Filled => filled(input),
        Operator::Equal => equal(input),
        Operator::MinLength => min_length(input),
        Operator::MaxLength => max_length(input),
        Operator::Length => length(input),
        Operator::Email => test_static(&EMAIL, input),
        Operator::Url => test_static(&URL, input),
        Operator::RegExp => regexp(input),
        Operator::Pattern => pattern(input),
        Operator::Integer => test_static(&INTEGER, input),
        Operator::Float => test_static(&FLOAT, input),
        Operator::Range => range(input),
        Operator::Submitted => submitted(input),
        Operator::Valid | Operator::Custom(_) => Outcome::NotApplicable,
    }
}

static EMAIL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^[^@\s]+@[^@\s]+\.[a-z]{2,10}$").ok());
static URL: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"(?i)^.+\.[a-z]{2,6}(/.*)?$").ok());
static INTEGER: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"^-?[0-9]+$").ok());
static FLOAT: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^-?[0-9]*[.,]?[0-9]+$").ok());

fn text(value: Option<&Value>) -> std::borrow::Cow<'_, str> {
    value.map_or(std::borrow::Cow::Borrowed(""), Value::to_text)
}

/// Length of the value; an absent value counts as empty, a checkbox has none.
fn text_len(value: Option<&Value>) -> Option<usize> {
    value.map_or(Some(0), Value::text_len)
}

#[allow(clippy::cast_precision_loss)]
fn len_f64(len: usize) -> f64 {
    len as f64
}

fn within(x: f64, min: &Operand, max: &Operand) -> bool {
    (min.is_unbounded() || x >= min.number()) && (max.is_unbounded() || x <= max.number())
}

fn filled(input: &OperatorInput<'_>) -> Outcome {
    input.value.is_some_and(|v| !v.is_blank()).into()
}

fn equal(input: &OperatorInput<'_>) -> Outcome {
    if matches!(input.operands, Operands::Absent) {
        return Outcome::NotApplicable;
    }
    input
        .operands
        .alternatives()
        .iter()
        .any(|alt| alt.matches(input.value))
        .into()
}

fn compare_len(input: &OperatorInput<'_>, cmp: impl Fn(f64, f64) -> bool) -> Outcome {
    let Some(limit) = input.operands.single() else {
        return Outcome::NotApplicable;
    };
    match text_len(input.value) {
        Some(len) => cmp(len_f64(len), limit.number()).into(),
        None => Outcome::Violated,
    }
}

fn min_length(input: &OperatorInput<'_>) -> Outcome {
    compare_len(input, |len, limit| len >= limit)
}

fn max_length(input: &OperatorInput<'_>) -> Outcome {
    compare_len(input, |len, limit| len <= limit)
}

fn length(input: &OperatorInput<'_>) -> Outcome {
    let (min, max) = match input.operands {
        Operands::Single(op) => (op, op),
        other => match other.pair() {
            Some(pair) => pair,
            None => return Outcome::NotApplicable,
        },
    };
    match text_len(input.value) {
        Some(len) => within(len_f64(len), min, max).into(),
        None => Outcome::Violated,
    }
}

fn range(input: &OperatorInput<'_>) -> Outcome {
    let Some((min, max)) = input.operands.pair() else {
        return Outcome::NotApplicable;
    };
    let number = match input.value {
        Some(Value::Text(s)) => crate::parse::parse_float(s),
        _ => f64::NAN,
    };
    within(number, min, max).into()
}

fn test_static(re: &Option<Regex>, input: &OperatorInput<'_>) -> Outcome {
    re.as_ref()
        .map(|re| re.is_match(&text(input.value)))
        .into()
}

fn regexp(input: &OperatorInput<'_>) -> Outcome {
    let Some(literal) = input.operands.single().and_then(Operand::as_str) else {
        return Outcome::NotApplicable;
    };
    let Some((pattern, flags)) = crate::parse::regexp_literal(literal) else {
        debug!(literal, "not a /pattern/flags literal, rule skipped");
        return Outcome::NotApplicable;
    };
    let built = RegexBuilder::new(pattern)
        .case_insensitive(flags.contains('i'))
        .multi_line(flags.contains('m'))
        .build();
    match built {
        Ok(re) => re.is_match(&text(input.value)).into(),
        Err(err) => {
            debug!(pattern, error = %err, "invalid regexp, rule skipped");
            Outcome::NotApplicable
        }
    }
}

fn pattern(input: &OperatorInput<'_>) -> Outcome {
    let Some(pattern) = input.operands.single().and_then(Operand::as_str) else {
        return Outcome::NotApplicable;
    };
    match Regex::new(&format!("^(?:{pattern})$")) {
        Ok(re) => re.is_match(&text(input.value)).into(),
        Err(err) => {
            debug!(pattern, error = %err, "invalid pattern, rule skipped");
            Outcome::NotApplicable
        }
    }
}

fn submitted(input: &OperatorInput<'_>) -> Outcome {
    input
        .form
        .submitter()
        .is_some_and(|id| input.control.contains(id))
        .into()
}
