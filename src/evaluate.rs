use std::borrow::Cow;
use std::collections::BTreeSet;

use tracing::{debug, trace, warn};

use crate::extract::{operand_value, value_of};
use crate::operators::{self, OperatorInput};
use crate::types::Silent;
use crate::{
    Control, ElementId, Engine, Failure, Feedback, Form, Operator, Outcome, Rule, RuleBody,
    RuleList, Visibility,
};

/// Walks rule trees for one pass over a form.
///
/// A walker lives for a single validation or visibility pass. It reads the
/// form afresh for every rule and keeps only the re-validation chain used to
/// cut cycles through `valid`.
pub(crate) struct Walker<'a> {
    engine: &'a Engine,
    form: &'a dyn Form,
    /// Controls currently being re-validated through `valid`, outermost first.
    chain: Vec<String>,
    /// Elements whose value drives at least one effective gate.
    drivers: BTreeSet<ElementId>,
}

impl<'a> Walker<'a> {
    pub(crate) fn new(engine: &'a Engine, form: &'a dyn Form) -> Self {
        Self {
            engine,
            form,
            chain: Vec::new(),
            drivers: BTreeSet::new(),
        }
    }

    pub(crate) fn into_drivers(self) -> BTreeSet<ElementId> {
        self.drivers
    }

    /// Validate `subject` against its own rules, reporting the first failure.
    pub(crate) fn validate(&mut self, subject: &Control, feedback: &mut dyn Feedback) -> bool {
        let rules = self.engine.rules_of(subject);
        self.is_valid(subject, &rules, feedback)
    }

    /// Apply the visibility effects of `subject`'s rules. Returns whether any
    /// gate had an effect.
    pub(crate) fn toggle(&mut self, subject: &Control, visibility: &mut dyn Visibility) -> bool {
        let rules = self.engine.rules_of(subject);
        self.is_active(subject, &rules, visibility)
    }

    /// Validation mode. Rules run in order; the first failing constraint is
    /// reported and stops the walk.
    pub(crate) fn is_valid(
        &mut self,
        subject: &Control,
        rules: &RuleList,
        feedback: &mut dyn Feedback,
    ) -> bool {
        for rule in rules {
            let Some(target) = self.target(subject, rule) else {
                continue;
            };
            let Some(success) = self.evaluate(&target, rule).as_bool() else {
                continue;
            };
            match &rule.body {
                RuleBody::Gate { children, .. } => {
                    if success && !self.is_valid(subject, children, feedback) {
                        return false;
                    }
                }
                RuleBody::Constraint { message } => {
                    if success {
                        continue;
                    }
                    if target.is_disabled() {
                        trace!(control = target.name(), %rule, "disabled control, failure ignored");
                        continue;
                    }
                    let failure = self.failure(&target, message.as_deref());
                    debug!(control = %failure.control, %rule, "constraint failed");
                    feedback.report_error(&failure);
                    return false;
                }
            }
        }
        true
    }

    /// Toggle mode. Only gates are considered; constraints are skipped.
    pub(crate) fn is_active(
        &mut self,
        subject: &Control,
        rules: &RuleList,
        visibility: &mut dyn Visibility,
    ) -> bool {
        let mut has_effect = false;
        for rule in rules {
            let RuleBody::Gate { children, toggle } = &rule.body else {
                continue;
            };
            let Some(target) = self.target(subject, rule) else {
                continue;
            };
            let Some(success) = self.evaluate(&target, rule).as_bool() else {
                continue;
            };
            if self.is_active(subject, children, visibility) || !toggle.is_empty() {
                has_effect = true;
                self.drivers.extend(target.elements().iter().map(|el| el.id));
                for (id, &visible) in toggle {
                    let shown = if success { visible } else { !visible };
                    trace!(target = %id, shown, "visibility");
                    visibility.set_visible(id, shown);
                }
            }
        }
        has_effect
    }

    /// Evaluate one rule against its resolved target, negation applied.
    pub(crate) fn evaluate(&mut self, target: &Control, rule: &Rule) -> Outcome {
        let outcome = match &rule.operator {
            Operator::Valid => self.check(target),
            operator => self.apply(operator, target, rule),
        };
        let outcome = outcome.negated_if(rule.negate);
        trace!(control = target.name(), %rule, %outcome, "rule evaluated");
        outcome
    }

    fn apply(&self, operator: &Operator, target: &Control, rule: &Rule) -> Outcome {
        let Some(operands) = operators::resolve(self.form, &rule.argument) else {
            debug!(%rule, "argument refers to a missing control, rule skipped");
            return Outcome::NotApplicable;
        };
        let value = operand_value(self.form, target);
        let input = OperatorInput {
            form: self.form,
            control: target,
            value: value.as_ref(),
            operands: &operands,
        };
        match operator {
            Operator::Custom(name) => match self.engine.custom_operator(name) {
                Some(custom) => custom(&input),
                None => {
                    debug!(operator = %name, "unknown operator, rule skipped");
                    Outcome::NotApplicable
                }
            },
            builtin => operators::apply(builtin, &input),
        }
    }

    /// The `valid` operator: re-validate `target` against its own rules
    /// without reporting anything.
    fn check(&mut self, target: &Control) -> Outcome {
        let name = target.name();
        if self.chain.iter().any(|n| n == name) {
            warn!(control = name, chain = ?self.chain, "cyclic `valid` reference, rule skipped");
            return Outcome::NotApplicable;
        }
        if self.chain.len() >= self.engine.max_depth() {
            warn!(
                control = name,
                depth = self.chain.len(),
                "`valid` nesting too deep, rule skipped"
            );
            return Outcome::NotApplicable;
        }
        let rules = self.engine.rules_of(target);
        self.chain.push(name.to_owned());
        let valid = self.is_valid(target, &rules, &mut Silent);
        self.chain.pop();
        valid.into()
    }

    /// The control a rule applies to: the subject itself, or the control its
    /// `control` key names.
    fn target<'c>(&self, subject: &'c Control, rule: &Rule) -> Option<Cow<'c, Control>> {
        match &rule.control {
            None => Some(Cow::Borrowed(subject)),
            Some(name) => {
                let control = self.form.control(name);
                if control.is_none() {
                    debug!(control = %name, %rule, "rule refers to a missing control, skipped");
                }
                control.map(Cow::Owned)
            }
        }
    }

    fn failure(&self, target: &Control, message: Option<&str>) -> Failure {
        let value = value_of(self.form, Some(target))
            .map(|v| v.to_string())
            .unwrap_or_default();
        Failure {
            element: target.focus_target(),
            control: target.name().to_owned(),
            message: message
                .unwrap_or_default()
                .replacen(self.engine.value_placeholder(), &value, 1),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::{ArgItem, Argument, MemoryForm, Recording};

    fn walk_valid(
        engine: &Engine,
        form: &MemoryForm,
        name: &str,
        rules: Vec<Rule>,
    ) -> (bool, Recording) {
        let mut rec = Recording::new();
        let subject = form.control(name).unwrap();
        let mut walker = Walker::new(engine, form);
        let ok = walker.is_valid(&subject, &RuleList::new(rules), &mut rec);
        (ok, rec)
    }

    fn walk_active(
        engine: &Engine,
        form: &MemoryForm,
        name: &str,
        rules: Vec<Rule>,
    ) -> (bool, Recording) {
        let mut rec = Recording::new();
        let subject = form.control(name).unwrap();
        let mut walker = Walker::new(engine, form);
        let active = walker.is_active(&subject, &RuleList::new(rules), &mut rec);
        (active, rec)
    }

    #[test]
    fn empty_rules_are_valid_and_inactive() {
        let engine = Engine::default();
        let form = MemoryForm::new().text("a", "");
        assert!(walk_valid(&engine, &form, "a", vec![]).0);
        assert!(!walk_active(&engine, &form, "a", vec![]).0);
    }

    #[test]
    fn first_failure_wins() {
        let engine = Engine::default();
        let form = MemoryForm::new().text("a", "");
        let (ok, rec) = walk_valid(
            &engine,
            &form,
            "a",
            vec![
                Rule::new(Operator::Filled).message("first"),
                Rule::new(Operator::Filled).message("second"),
            ],
        );
        assert!(!ok);
        assert_eq!(rec.messages, vec!["first"]);
        assert_eq!(rec.focused, vec![ElementId(0)]);
    }

    #[test]
    fn short_circuit_skips_later_siblings() {
        let calls = Arc::new(AtomicUsize::new(0));
        let spy = Arc::clone(&calls);
        let engine = Engine::builder()
            .operator("spy", move |_| {
                spy.fetch_add(1, Ordering::SeqCst);
                Outcome::Violated
            })
            .build()
            .unwrap();
        let form = MemoryForm::new().text("a", "");
        let spy_rule = || Rule::new(Operator::Custom("spy".into())).message("spy");
        let (ok, rec) = walk_valid(&engine, &form, "a", vec![spy_rule(), spy_rule()]);
        assert!(!ok);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(rec.messages.len(), 1);
    }

    #[test]
    fn not_applicable_rules_are_skipped() {
        let engine = Engine::default();
        let form = MemoryForm::new().text("a", "x");
        let (ok, rec) = walk_valid(
            &engine,
            &form,
            "a",
            vec![
                Rule::new(Operator::Equal).message("never reported"),
                Rule::new(Operator::Custom("nope".into())).message("never reported"),
                Rule::new(Operator::Filled).on("missing").message("never reported"),
            ],
        );
        assert!(ok);
        assert!(rec.messages.is_empty());
    }

    #[test]
    fn negation_never_touches_not_applicable() {
        let engine = Engine::default();
        let form = MemoryForm::new().text("a", "x");
        let (ok, _) = walk_valid(
            &engine,
            &form,
            "a",
            vec![Rule::new(Operator::Range).negated().message("skipped")],
        );
        assert!(ok);
    }

    #[test]
    fn false_gate_skips_children() {
        let engine = Engine::default();
        let form = MemoryForm::new().text("a", "");
        let (ok, _) = walk_valid(
            &engine,
            &form,
            "a",
            vec![Rule::new(Operator::Filled).when(vec![Rule::new(Operator::Email).message("bad")])],
        );
        assert!(ok);
    }

    #[test]
    fn true_gate_delegates_to_children() {
        let engine = Engine::default();
        let form = MemoryForm::new().text("a", "not-an-email");
        let (ok, rec) = walk_valid(
            &engine,
            &form,
            "a",
            vec![
                Rule::new(Operator::Filled)
                    .when(vec![Rule::new(Operator::Email).message("bad %value")]),
            ],
        );
        assert!(!ok);
        assert_eq!(rec.messages, vec!["bad not-an-email"]);
    }

    #[test]
    fn only_first_placeholder_is_substituted() {
        let engine = Engine::default();
        let form = MemoryForm::new().text("a", "x");
        let rules = vec![Rule::new(Operator::Integer).message("%value, not %value")];
        let (_, rec) = walk_valid(&engine, &form, "a", rules);
        assert_eq!(rec.messages, vec!["x, not %value"]);
    }

    #[test]
    fn unsupported_argument_is_not_applicable() {
        let engine = Engine::default();
        let form = MemoryForm::new().text("a", "");
        let mut rule = Rule::new(Operator::Equal).message("odd");
        rule.argument = Argument::Single(ArgItem::Unsupported(r#"{"x":1}"#.into()));
        let rules = vec![rule, Rule::new(Operator::Filled).message("required")];
        let (ok, rec) = walk_valid(&engine, &form, "a", rules);
        assert!(!ok);
        assert_eq!(rec.messages, vec!["required"]);
    }

    #[test]
    fn failure_on_disabled_target_is_ignored() {
        let engine = Engine::default();
        let form = MemoryForm::new().text("a", "").text("b", "").disabled();
        let (ok, rec) = walk_valid(
            &engine,
            &form,
            "a",
            vec![Rule::new(Operator::Filled).on("b").message("b required")],
        );
        assert!(ok);
        assert!(rec.messages.is_empty());
    }

    #[test]
    fn cross_control_failure_focuses_target() {
        let engine = Engine::default();
        let form = MemoryForm::new().text("a", "x").text("b", "");
        let (ok, rec) = walk_valid(
            &engine,
            &form,
            "a",
            vec![Rule::new(Operator::Filled).on("b").message("b required")],
        );
        assert!(!ok);
        assert_eq!(rec.focused, vec![ElementId(1)]);
    }

    #[test]
    fn valid_operator_checks_other_control_silently() {
        let engine = Engine::default();
        let form = MemoryForm::new()
            .text("a", "")
            .text("b", "")
            .rules(r#"[{"op":":filled","msg":"b required"}]"#);
        let (ok, rec) = walk_valid(
            &engine,
            &form,
            "a",
            vec![Rule::new(Operator::Valid).on("b").message("fix b first")],
        );
        assert!(!ok);
        assert_eq!(rec.messages, vec!["fix b first"]);
    }

    #[test]
    fn self_referencing_valid_terminates() {
        let engine = Engine::default();
        let form = MemoryForm::new()
            .text("a", "")
            .rules(r#"[{"op":":valid","msg":"loop"}]"#);
        let rules = vec![Rule::new(Operator::Valid).message("loop")];
        let (ok, _) = walk_valid(&engine, &form, "a", rules);
        assert!(ok);
    }

    #[test]
    fn mutual_valid_references_terminate() {
        let engine = Engine::default();
        let form = MemoryForm::new()
            .text("a", "")
            .rules(r#"[{"op":":valid","control":"b","msg":"a"}]"#)
            .text("b", "")
            .rules(r#"[{"op":":valid","control":"a","msg":"b"},{"op":":filled","msg":"b empty"}]"#);
        let mut walker = Walker::new(&engine, &form);
        let mut rec = Recording::new();
        let a = form.control("a").unwrap();
        assert!(!walker.validate(&a, &mut rec));
        assert_eq!(rec.messages, vec!["a"]);
    }

    #[test]
    fn depth_limit_makes_valid_not_applicable() {
        let engine = Engine::builder().max_depth(1).build().unwrap();
        let form = MemoryForm::new()
            .text("a", "")
            .text("b", "")
            .rules(r#"[{"op":":valid","control":"c","msg":"b"}]"#)
            .text("c", "")
            .rules(r#"[{"op":":filled","msg":"c"}]"#);
        let (ok, _) = walk_valid(
            &engine,
            &form,
            "a",
            vec![Rule::new(Operator::Valid).on("b").message("a")],
        );
        // a -> b is allowed, b -> c exceeds the limit and is skipped, so b passes
        assert!(ok);
    }

    #[test]
    fn toggle_applies_declared_or_complement() {
        let engine = Engine::default();
        let mut form = MemoryForm::new().checkbox("ship", true);
        let rules = || vec![Rule::new(Operator::Filled).toggles("address", true)];

        let (active, rec) = walk_active(&engine, &form, "ship", rules());
        assert!(active);
        assert_eq!(rec.is_visible("address"), Some(true));

        form.set_checked("ship", false);
        let (active, rec) = walk_active(&engine, &form, "ship", rules());
        assert!(active);
        assert_eq!(rec.is_visible("address"), Some(false));
    }

    #[test]
    fn toggle_skips_constraints() {
        let engine = Engine::default();
        let form = MemoryForm::new().text("a", "");
        let (active, rec) = walk_active(
            &engine,
            &form,
            "a",
            vec![Rule::new(Operator::Filled).message("required")],
        );
        assert!(!active);
        assert!(rec.changes.is_empty());
    }

    #[test]
    fn nested_toggle_propagates_effect() {
        let engine = Engine::default();
        let form = MemoryForm::new().text("a", "x").checkbox("b", false);
        let (active, rec) = walk_active(
            &engine,
            &form,
            "a",
            vec![Rule::new(Operator::Filled).when(vec![
                Rule::new(Operator::Filled).on("b").toggles("extra", true),
            ])],
        );
        assert!(active);
        assert_eq!(rec.is_visible("extra"), Some(false));
    }

    #[test]
    fn gate_without_effect_is_inactive() {
        let engine = Engine::default();
        let form = MemoryForm::new().text("a", "x");
        let (active, _) = walk_active(
            &engine,
            &form,
            "a",
            vec![Rule::new(Operator::Filled).when(vec![Rule::new(Operator::Email).message("m")])],
        );
        assert!(!active);
    }

    #[test]
    fn drivers_collect_gate_targets() {
        let engine = Engine::default();
        let form = MemoryForm::new()
            .text("a", "")
            .radio("pay", "card", true)
            .radio("pay", "cash", false);
        let subject = form.control("a").unwrap();
        let mut walker = Walker::new(&engine, &form);
        let rules = RuleList::new(vec![
            Rule::new(Operator::Equal).on("pay").arg("card").toggles("card-box", true),
        ]);
        let mut rec = Recording::new();
        walker.is_active(&subject, &rules, &mut rec);
        let drivers = walker.into_drivers();
        assert_eq!(
            drivers.into_iter().collect::<Vec<_>>(),
            vec![ElementId(1), ElementId(2)]
        );
        assert_eq!(rec.is_visible("card-box"), Some(true));
    }
}
