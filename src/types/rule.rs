use std::collections::BTreeMap;
use std::fmt;

use super::operator::Operator;
use super::value::Scalar;

/// One element of a rule argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgItem {
    Scalar(Scalar),
    /// Reference to another control in the same form, resolved by name at
    /// evaluation time.
    Control(String),
    /// An argument shape no operator understands, kept as its JSON text.
    /// Rules carrying one never apply.
    Unsupported(String),
}

/// Argument attached to a rule.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Argument {
    /// No argument was given (distinct from an explicit `null`).
    #[default]
    Absent,
    Single(ArgItem),
    /// Ordered alternatives or a `[min, max]` bound pair.
    List(Vec<ArgItem>),
}

/// Body of a rule: a terminal constraint or a conditional gate.
#[derive(Debug, Clone, PartialEq)]
pub enum RuleBody {
    /// Pass/fail check. The message is reported when it fails.
    Constraint { message: Option<String> },
    /// Guards a nested scope of rules and optionally drives the visibility of
    /// other elements.
    Gate {
        children: RuleList,
        toggle: BTreeMap<String, bool>,
    },
}

/// A single parsed rule. Rules are immutable once built.
///
/// Rules are usually produced by [`RuleList::parse`] from control metadata,
/// but can also be assembled directly:
///
/// ```
/// use ruleform::{Operator, Rule, RuleList};
///
/// let rules = RuleList::new(vec![
///     Rule::new(Operator::Filled).message("Enter your e-mail"),
///     Rule::new(Operator::Filled).when(vec![
///         Rule::new(Operator::Email).message("'%value' is not an e-mail address"),
///     ]),
/// ]);
/// assert_eq!(rules.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Rule {
    pub negate: bool,
    pub operator: Operator,
    pub argument: Argument,
    /// Evaluate against this named control instead of the owning one.
    pub control: Option<String>,
    pub body: RuleBody,
}

/// Ordered list of rules attached to one control (or one nested scope).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RuleList {
    rules: Vec<Rule>,
}

impl Rule {
    /// A constraint with no argument, no message and no redirect.
    #[must_use]
    pub fn new(operator: Operator) -> Self {
        Self {
            negate: false,
            operator,
            argument: Argument::Absent,
            control: None,
            body: RuleBody::Constraint { message: None },
        }
    }

    /// Flip the rule's result.
    #[must_use]
    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    #[must_use]
    pub fn arg(mut self, value: impl Into<Scalar>) -> Self {
        self.argument = Argument::Single(ArgItem::Scalar(value.into()));
        self
    }

    /// Use the value of another control as the argument.
    #[must_use]
    pub fn arg_control(mut self, name: &str) -> Self {
        self.argument = Argument::Single(ArgItem::Control(name.to_owned()));
        self
    }

    #[must_use]
    pub fn args(mut self, items: impl IntoIterator<Item = ArgItem>) -> Self {
        self.argument = Argument::List(items.into_iter().collect());
        self
    }

    /// A `[min, max]` pair; `None` leaves that side unbounded.
    #[must_use]
    pub fn bounds(self, min: Option<f64>, max: Option<f64>) -> Self {
        self.args([
            ArgItem::Scalar(Scalar::from(min)),
            ArgItem::Scalar(Scalar::from(max)),
        ])
    }

    /// Evaluate against another named control.
    #[must_use]
    pub fn on(mut self, control: &str) -> Self {
        self.control = Some(control.to_owned());
        self
    }

    /// Set the failure message. Turns a gate back into a constraint.
    #[must_use]
    pub fn message(mut self, message: &str) -> Self {
        self.body = RuleBody::Constraint {
            message: Some(message.to_owned()),
        };
        self
    }

    /// Make this rule a gate guarding `children`.
    #[must_use]
    pub fn when(mut self, children: Vec<Rule>) -> Self {
        let toggle = self.take_toggle();
        self.body = RuleBody::Gate {
            children: RuleList::new(children),
            toggle,
        };
        self
    }

    /// Make this rule a gate that shows `target` while it holds (or hides it,
    /// when `visible` is false).
    #[must_use]
    pub fn toggles(mut self, target: &str, visible: bool) -> Self {
        match &mut self.body {
            RuleBody::Gate { toggle, .. } => {
                toggle.insert(target.to_owned(), visible);
            }
            RuleBody::Constraint { .. } => {
                let mut toggle = BTreeMap::new();
                toggle.insert(target.to_owned(), visible);
                self.body = RuleBody::Gate {
                    children: RuleList::default(),
                    toggle,
                };
            }
        }
        self
    }

    fn take_toggle(&mut self) -> BTreeMap<String, bool> {
        match &mut self.body {
            RuleBody::Gate { toggle, .. } => std::mem::take(toggle),
            RuleBody::Constraint { .. } => BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn is_gate(&self) -> bool {
        matches!(self.body, RuleBody::Gate { .. })
    }
}

impl RuleList {
    #[must_use]
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Parse serialized rule metadata.
    ///
    /// Accepts a JSON array of rule records or the bare comma-separated record
    /// list that form renderers emit. Blank input yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError`](crate::ParseError) for malformed JSON, unusable
    /// argument shapes or empty operator tokens.
    pub fn parse(input: &str) -> Result<Self, crate::ParseError> {
        let records = crate::parse::parse_records(input)?;
        crate::compile::compile(records)
    }

    /// Serialize back into the metadata format accepted by [`parse`](Self::parse).
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`](crate::ParseError::Json) if encoding fails.
    pub fn to_json(&self) -> Result<String, crate::ParseError> {
        let records = crate::compile::decompile(self);
        Ok(serde_json::to_string(&records)?)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Rule] {
        &self.rules
    }
}

impl<'a> IntoIterator for &'a RuleList {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl From<Vec<Rule>> for RuleList {
    fn from(rules: Vec<Rule>) -> Self {
        Self::new(rules)
    }
}

#[cfg(feature = "binary-cache")]
impl RuleList {
    /// Serialize this rule list to a byte vector.
    ///
    /// The optional `source_text` (usually the metadata the list was parsed
    /// from) is hashed with BLAKE3 and embedded, so a cache can be checked
    /// against its source with [`from_bytes_for`](Self::from_bytes_for).
    ///
    /// # Errors
    ///
    /// Returns [`SerializeError`](crate::serial::SerializeError) if encoding fails.
    pub fn to_bytes(
        &self,
        source_text: Option<&str>,
    ) -> Result<Vec<u8>, crate::serial::SerializeError> {
        crate::serial::encode(self, source_text)
    }

    /// Deserialize a rule list previously produced by [`to_bytes`](Self::to_bytes).
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError`](crate::serial::DeserializeError) on
    /// format, integrity, or validation failure.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, crate::serial::DeserializeError> {
        crate::serial::decode(bytes).map(|(rules, _)| rules)
    }

    /// Like [`from_bytes`](Self::from_bytes), but also rejects a cache that
    /// was not built from `source_text`.
    ///
    /// # Errors
    ///
    /// Returns [`DeserializeError::StaleSource`](crate::serial::DeserializeError::StaleSource)
    /// when the embedded digest is missing or differs.
    pub fn from_bytes_for(
        bytes: &[u8],
        source_text: &str,
    ) -> Result<Self, crate::serial::DeserializeError> {
        let (rules, digest) = crate::serial::decode(bytes)?;
        if digest != Some(*blake3::hash(source_text.as_bytes()).as_bytes()) {
            return Err(crate::serial::DeserializeError::StaleSource);
        }
        Ok(rules)
    }
}

impl fmt::Display for ArgItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgItem::Scalar(s) => write!(f, "{s}"),
            ArgItem::Control(name) => write!(f, "@{name}"),
            ArgItem::Unsupported(json) => write!(f, "{json}"),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.negate {
            write!(f, "~")?;
        }
        write!(f, "{}", self.operator)?;
        match &self.argument {
            Argument::Absent => {}
            Argument::Single(item) => write!(f, "({item})")?,
            Argument::List(items) => {
                let items: Vec<String> = items.iter().map(ToString::to_string).collect();
                write!(f, "([{}])", items.join(", "))?;
            }
        }
        if let Some(control) = &self.control {
            write!(f, " on {control}")?;
        }
        if let RuleBody::Gate { children, .. } = &self.body {
            write!(f, " {{{} rules}}", children.len())?;
        }
        Ok(())
    }
}
