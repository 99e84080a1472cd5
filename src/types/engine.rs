use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, warn};

use super::attachment::Attachment;
use super::control::{Control, ElementId};
use super::error::ConfigError;
use super::form::{Feedback, Form, Recorder, Silent, Visibility};
use super::operator::Operator;
use super::outcome::Outcome;
use super::report::ValidationReport;
use super::rule::RuleList;
use crate::evaluate::Walker;
use crate::operators::{CustomOperator, OperatorInput};

/// Default nesting limit for `valid` re-validation.
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Default placeholder substituted with the control's value in messages.
pub const DEFAULT_VALUE_PLACEHOLDER: &str = "%value";

/// Builder for an [`Engine`].
///
/// # Example
///
/// ```
/// use ruleform::Engine;
///
/// let engine = Engine::builder()
///     .max_depth(8)
///     .operator("Shop::even", |input| {
///         input.value.map(|v| v.to_number() % 2.0 == 0.0).into()
///     })
///     .build()
///     .unwrap();
/// assert_eq!(engine.max_depth(), 8);
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    max_depth: Option<usize>,
    value_placeholder: Option<String>,
    operators: Vec<(String, CustomOperator)>,
}

impl EngineBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limit how deeply `valid` may re-validate other controls.
    #[must_use]
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Placeholder replaced by the control's value in failure messages.
    #[must_use]
    pub fn value_placeholder(mut self, placeholder: &str) -> Self {
        self.value_placeholder = Some(placeholder.to_owned());
        self
    }

    /// Register a custom operator.
    ///
    /// The name is normalized like an operator token in rule metadata, so
    /// `Shop::isbn` and `Shop_isbn` register the same operator.
    #[must_use]
    pub fn operator(
        mut self,
        name: &str,
        f: impl Fn(&OperatorInput<'_>) -> Outcome + Send + Sync + 'static,
    ) -> Self {
        self.operators.push((name.to_owned(), Arc::new(f)));
        self
    }

    /// Finish configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a custom operator name is invalid, clashes
    /// with a built-in or another registration, or if a limit is out of range.
    pub fn build(self) -> Result<Engine, ConfigError> {
        let max_depth = self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH);
        if max_depth == 0 {
            return Err(ConfigError::ZeroDepth);
        }
        let value_placeholder = self
            .value_placeholder
            .unwrap_or_else(|| DEFAULT_VALUE_PLACEHOLDER.to_owned());
        if value_placeholder.is_empty() {
            return Err(ConfigError::EmptyPlaceholder);
        }

        let mut operators = HashMap::with_capacity(self.operators.len());
        for (raw, f) in self.operators {
            let token = match crate::parse::parse_operator(&raw) {
                Ok(token) if !token.negate => token,
                _ => return Err(ConfigError::InvalidOperatorName { name: raw }),
            };
            if Operator::from_name(&token.name).is_builtin() {
                return Err(ConfigError::BuiltinOperator { name: token.name });
            }
            if operators.insert(token.name.clone(), f).is_some() {
                return Err(ConfigError::DuplicateOperator { name: token.name });
            }
        }

        debug!(
            max_depth,
            custom_operators = operators.len(),
            "engine configured"
        );
        Ok(Engine {
            max_depth,
            value_placeholder,
            operators,
        })
    }
}

impl fmt::Debug for EngineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EngineBuilder")
            .field("max_depth", &self.max_depth)
            .field("value_placeholder", &self.value_placeholder)
            .field(
                "operators",
                &self.operators.iter().map(|(n, _)| n).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Validation and conditional-visibility engine.
///
/// An engine holds configuration only. Rules are read from the form on every
/// pass, so one engine serves any number of forms and is safe to share
/// between threads.
#[derive(Clone)]
pub struct Engine {
    max_depth: usize,
    value_placeholder: String,
    operators: HashMap<String, CustomOperator>,
}

impl Default for Engine {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            value_placeholder: DEFAULT_VALUE_PLACEHOLDER.to_owned(),
            operators: HashMap::new(),
        }
    }
}

impl Engine {
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::new()
    }

    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    #[must_use]
    pub fn value_placeholder(&self) -> &str {
        &self.value_placeholder
    }

    /// Names of the registered custom operators, sorted.
    #[must_use]
    pub fn custom_operators(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.operators.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub(crate) fn custom_operator(&self, name: &str) -> Option<&CustomOperator> {
        self.operators.get(name)
    }

    /// Compiled rules of `control`. Malformed metadata is logged and treated
    /// as no rules.
    #[must_use]
    pub fn rules_of(&self, control: &Control) -> RuleList {
        let Some(attr) = control.rules_attr() else {
            return RuleList::default();
        };
        RuleList::parse(attr).unwrap_or_else(|err| {
            warn!(
                control = control.name(),
                error = %err,
                "malformed rule metadata, control left unconstrained"
            );
            RuleList::default()
        })
    }

    /// Validate every eligible control in document order.
    ///
    /// Stops at the first failing control, which is reported to `feedback`.
    /// Submitting through an element flagged to skip validation passes
    /// without checking anything.
    pub fn validate_form(&self, form: &impl Form, feedback: &mut impl Feedback) -> bool {
        if skips_validation(form) {
            debug!("submitter skips validation");
            return true;
        }
        self.validate_elements(form, feedback, |_| {})
    }

    /// Like [`validate_form`](Self::validate_form) but returns diagnostics
    /// instead of reporting to a host.
    pub fn validate_form_report(&self, form: &impl Form) -> ValidationReport {
        let start = Instant::now();
        if skips_validation(form) {
            return ValidationReport::new(true, true, Vec::new(), None, start.elapsed());
        }
        let mut recorder = Recorder::default();
        let mut checked = Vec::new();
        let passed = self.validate_elements(form, &mut recorder, |control| {
            checked.push(control.name().to_owned());
        });
        ValidationReport::new(passed, false, checked, recorder.failure, start.elapsed())
    }

    /// Validate the control at `id` against its own rules, reporting the
    /// first failure. A missing element has nothing to fail.
    pub fn validate_control(
        &self,
        form: &impl Form,
        id: ElementId,
        feedback: &mut impl Feedback,
    ) -> bool {
        let Some(element) = form.element(id) else {
            return true;
        };
        Walker::new(self, form).validate(&Control::Single(element), feedback)
    }

    /// Check the control at `id` without reporting anything.
    pub fn check_control(&self, form: &impl Form, id: ElementId) -> bool {
        self.validate_control(form, id, &mut Silent)
    }

    /// Apply the visibility effects of every control's rules.
    pub fn toggle_form(&self, form: &impl Form, visibility: &mut impl Visibility) {
        self.toggle_pass(form, visibility);
    }

    /// Apply the visibility effects of one control's rules. Returns whether
    /// any gate had an effect.
    pub fn toggle_control(
        &self,
        form: &impl Form,
        id: ElementId,
        visibility: &mut impl Visibility,
    ) -> bool {
        let Some(element) = form.element(id) else {
            return false;
        };
        Walker::new(self, form).toggle(&Control::Single(element), visibility)
    }

    /// Run an initial visibility pass and return a handle that reacts to
    /// form events.
    pub fn attach(&self, form: &impl Form, visibility: &mut impl Visibility) -> Attachment<'_> {
        let drivers = self.toggle_pass(form, visibility);
        debug!(drivers = drivers.len(), "attached to form");
        Attachment::new(self, drivers)
    }

    pub(crate) fn toggle_pass(
        &self,
        form: &dyn Form,
        visibility: &mut dyn Visibility,
    ) -> BTreeSet<ElementId> {
        let mut walker = Walker::new(self, form);
        for id in form.elements() {
            if let Some(element) = form.element(id) {
                walker.toggle(&Control::Single(element), visibility);
            }
        }
        walker.into_drivers()
    }

    fn validate_elements(
        &self,
        form: &dyn Form,
        feedback: &mut dyn Feedback,
        mut visit: impl FnMut(&Control),
    ) -> bool {
        let mut walker = Walker::new(self, form);
        for id in form.elements() {
            let Some(element) = form.element(id) else {
                continue;
            };
            if !element.is_validatable() {
                continue;
            }
            let control = Control::Single(element);
            visit(&control);
            if !walker.validate(&control, feedback) {
                return false;
            }
        }
        true
    }
}

fn skips_validation(form: &dyn Form) -> bool {
    form.submitter()
        .and_then(|id| form.element(id))
        .is_some_and(|el| el.skip_validation)
}

impl fmt::Debug for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Engine")
            .field("max_depth", &self.max_depth)
            .field("value_placeholder", &self.value_placeholder)
            .field("operators", &self.custom_operators())
            .finish()
    }
}

impl fmt::Display for Engine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Engine(max depth {}, {} custom operators)",
            self.max_depth,
            self.operators.len()
        )
    }
}
