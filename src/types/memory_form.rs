use std::collections::BTreeMap;

use super::control::{Element, ElementId, ElementKind};
use super::form::{Feedback, Form, Visibility};

/// In-memory form host.
///
/// Elements are added with chained builder calls; modifiers such as
/// [`rules`](Self::rules) apply to the most recently added element.
///
/// ```
/// use ruleform::{Form, MemoryForm};
///
/// let form = MemoryForm::new()
///     .text("email", "ada@example.com")
///     .rules(r#"{"op":":email","msg":"Invalid e-mail"}"#)
///     .submit("send");
/// assert_eq!(form.elements().len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryForm {
    elements: Vec<Element>,
    submitter: Option<ElementId>,
}

impl MemoryForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an arbitrary element. Its id is reassigned to its position.
    #[must_use]
    pub fn with_element(mut self, mut element: Element) -> Self {
        element.id = ElementId(self.elements.len());
        self.elements.push(element);
        self
    }

    fn push(self, name: &str, kind: ElementKind, value: &str, checked: bool) -> Self {
        self.with_element(Element {
            name: name.to_owned(),
            kind,
            value: value.to_owned(),
            checked,
            ..Element::default()
        })
    }

    #[must_use]
    pub fn text(self, name: &str, value: &str) -> Self {
        self.push(name, ElementKind::Text, value, false)
    }

    #[must_use]
    pub fn password(self, name: &str, value: &str) -> Self {
        self.push(name, ElementKind::Password, value, false)
    }

    #[must_use]
    pub fn textarea(self, name: &str, value: &str) -> Self {
        self.push(name, ElementKind::TextArea, value, false)
    }

    /// A single-select with `value` selected.
    #[must_use]
    pub fn select(self, name: &str, value: &str) -> Self {
        self.push(name, ElementKind::Select, value, false)
    }

    #[must_use]
    pub fn checkbox(self, name: &str, checked: bool) -> Self {
        self.push(name, ElementKind::Checkbox, "on", checked)
    }

    /// One member of the radio group `name`.
    #[must_use]
    pub fn radio(self, name: &str, value: &str, checked: bool) -> Self {
        self.push(name, ElementKind::Radio, value, checked)
    }

    #[must_use]
    pub fn hidden(self, name: &str, value: &str) -> Self {
        self.push(name, ElementKind::Hidden, value, false)
    }

    #[must_use]
    pub fn submit(self, name: &str) -> Self {
        self.push(name, ElementKind::Submit, "", false)
    }

    #[must_use]
    pub fn button(self, name: &str) -> Self {
        self.push(name, ElementKind::Button, "", false)
    }

    fn last(mut self, f: impl FnOnce(&mut Element)) -> Self {
        if let Some(el) = self.elements.last_mut() {
            f(el);
        }
        self
    }

    /// Attach serialized rule metadata to the last element.
    #[must_use]
    pub fn rules(self, rules: &str) -> Self {
        self.last(|el| el.rules = Some(rules.to_owned()))
    }

    /// Mark a value of the last element as logically empty.
    #[must_use]
    pub fn empty_value(self, sentinel: &str) -> Self {
        self.last(|el| el.empty_value = Some(sentinel.to_owned()))
    }

    #[must_use]
    pub fn disabled(self) -> Self {
        self.last(|el| el.disabled = true)
    }

    #[must_use]
    pub fn read_only(self) -> Self {
        self.last(|el| el.read_only = true)
    }

    /// Submitting through the last element bypasses validation.
    #[must_use]
    pub fn skip_validation(self) -> Self {
        self.last(|el| el.skip_validation = true)
    }

    /// Id of the first element called `name`.
    #[must_use]
    pub fn id_of(&self, name: &str) -> Option<ElementId> {
        self.elements.iter().find(|el| el.name == name).map(|el| el.id)
    }

    /// Replace the raw value of the first element called `name`.
    pub fn set_value(&mut self, name: &str, value: &str) {
        if let Some(el) = self.elements.iter_mut().find(|el| el.name == name) {
            value.clone_into(&mut el.value);
        }
    }

    /// Set the checked state of the first element called `name`.
    pub fn set_checked(&mut self, name: &str, checked: bool) {
        if let Some(el) = self.elements.iter_mut().find(|el| el.name == name) {
            el.checked = checked;
        }
    }

    /// Check the member of radio group `name` whose value is `value` and
    /// uncheck the rest.
    pub fn choose(&mut self, name: &str, value: &str) {
        for el in self.elements.iter_mut().filter(|el| el.name == name) {
            el.checked = el.value == value;
        }
    }

    pub fn set_disabled(&mut self, name: &str, disabled: bool) {
        for el in self.elements.iter_mut().filter(|el| el.name == name) {
            el.disabled = disabled;
        }
    }

    /// Record the element that triggered the current submission.
    pub fn set_submitter(&mut self, id: Option<ElementId>) {
        self.submitter = id;
    }
}

impl Form for MemoryForm {
    fn elements(&self) -> Vec<ElementId> {
        self.elements.iter().map(|el| el.id).collect()
    }

    fn element(&self, id: ElementId) -> Option<Element> {
        self.elements.get(id.0).cloned()
    }

    fn named(&self, name: &str) -> Vec<ElementId> {
        self.elements
            .iter()
            .filter(|el| el.name == name)
            .map(|el| el.id)
            .collect()
    }

    fn submitter(&self) -> Option<ElementId> {
        self.submitter
    }
}

/// Records feedback and visibility side effects instead of performing them.
#[derive(Debug, Clone, Default)]
pub struct Recording {
    pub focused: Vec<ElementId>,
    pub messages: Vec<String>,
    /// Last visibility applied to each target.
    pub visible: BTreeMap<String, bool>,
    /// Every visibility change, in order.
    pub changes: Vec<(String, bool)>,
}

impl Recording {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current visibility of `target`, `None` if it was never toggled.
    #[must_use]
    pub fn is_visible(&self, target: &str) -> Option<bool> {
        self.visible.get(target).copied()
    }
}

impl Feedback for Recording {
    fn focus(&mut self, id: ElementId) {
        self.focused.push(id);
    }

    fn show_message(&mut self, message: &str) {
        self.messages.push(message.to_owned());
    }
}

impl Visibility for Recording {
    fn set_visible(&mut self, target: &str, visible: bool) {
        self.visible.insert(target.to_owned(), visible);
        self.changes.push((target.to_owned(), visible));
    }
}
