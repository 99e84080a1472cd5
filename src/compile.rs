use serde_json::Value as Json;

use crate::parse::{parse_operator, ParseError, RuleRecord};
use crate::{ArgItem, Argument, Operator, Rule, RuleBody, RuleList, Scalar};

/// Largest integer magnitude that `f64` represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Compile raw records into an immutable rule tree.
///
/// A record carrying `rules` or `toggle` becomes a gate; anything else is a
/// constraint.
pub(crate) fn compile(records: Vec<RuleRecord>) -> Result<RuleList, ParseError> {
    records
        .into_iter()
        .map(compile_record)
        .collect::<Result<Vec<_>, _>>()
        .map(RuleList::new)
}

fn compile_record(record: RuleRecord) -> Result<Rule, ParseError> {
    let token = parse_operator(&record.op)?;
    let operator = Operator::from_name(&token.name);
    let argument = record.arg.map_or(Argument::Absent, compile_argument);
    let body = if record.rules.is_some() || record.toggle.is_some() {
        RuleBody::Gate {
            children: compile(record.rules.unwrap_or_default())?,
            toggle: record.toggle.unwrap_or_default(),
        }
    } else {
        RuleBody::Constraint {
            message: record.msg,
        }
    };
    Ok(Rule {
        negate: token.negate,
        operator,
        argument,
        control: record.control,
        body,
    })
}

fn compile_argument(json: Json) -> Argument {
    match json {
        Json::Array(items) => Argument::List(items.into_iter().map(compile_item).collect()),
        other => Argument::Single(compile_item(other)),
    }
}

/// Objects other than `{"control": name}` and nested arrays compile to
/// [`ArgItem::Unsupported`], so only the rule carrying them is inapplicable.
fn compile_item(json: Json) -> ArgItem {
    let scalar = match json {
        Json::Null => Scalar::Null,
        Json::Bool(b) => Scalar::Bool(b),
        Json::Number(n) => Scalar::Number(n.as_f64().unwrap_or(f64::NAN)),
        Json::String(s) => Scalar::String(s),
        Json::Object(ref map) => {
            return match map.get("control") {
                Some(Json::String(name)) => ArgItem::Control(name.clone()),
                _ => ArgItem::Unsupported(json.to_string()),
            };
        }
        Json::Array(_) => return ArgItem::Unsupported(json.to_string()),
    };
    ArgItem::Scalar(scalar)
}

/// Turn a rule tree back into records. Inverse of [`compile`].
pub(crate) fn decompile(rules: &RuleList) -> Vec<RuleRecord> {
    rules.iter().map(decompile_rule).collect()
}

fn decompile_rule(rule: &Rule) -> RuleRecord {
    let prefix = if rule.operator.is_builtin() { ":" } else { "" };
    let op = format!(
        "{}{prefix}{}",
        if rule.negate { "~" } else { "" },
        rule.operator.name()
    );
    let arg = match &rule.argument {
        Argument::Absent => None,
        Argument::Single(item) => Some(item_to_json(item)),
        Argument::List(items) => Some(Json::Array(items.iter().map(item_to_json).collect())),
    };
    let (msg, rules, toggle) = match &rule.body {
        RuleBody::Constraint { message } => (message.clone(), None, None),
        RuleBody::Gate { children, toggle } => (
            None,
            Some(decompile(children)),
            (!toggle.is_empty()).then(|| toggle.clone()),
        ),
    };
    RuleRecord {
        op,
        msg,
        arg,
        control: rule.control.clone(),
        rules,
        toggle,
    }
}

fn item_to_json(item: &ArgItem) -> Json {
    match item {
        ArgItem::Control(name) => serde_json::json!({ "control": name }),
        ArgItem::Unsupported(json) => serde_json::from_str(json).unwrap_or(Json::Null),
        ArgItem::Scalar(Scalar::Null) => Json::Null,
        ArgItem::Scalar(Scalar::Bool(b)) => Json::Bool(*b),
        ArgItem::Scalar(Scalar::String(s)) => Json::String(s.clone()),
        ArgItem::Scalar(Scalar::Number(n)) => number_to_json(*n),
    }
}

#[allow(clippy::cast_possible_truncation)] // guarded by the integral + range check
fn number_to_json(n: f64) -> Json {
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        Json::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Json::Null, Json::Number)
    }
}
