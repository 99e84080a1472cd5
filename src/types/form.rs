use std::fmt;

use super::control::{Control, Element, ElementId};

/// Read access to a live form, supplied by the host.
///
/// Every call must reflect the current state of the form; the engine never
/// caches what it reads.
pub trait Form {
    /// All elements in document order.
    fn elements(&self) -> Vec<ElementId>;

    /// Snapshot of one element, or `None` if it no longer exists.
    fn element(&self, id: ElementId) -> Option<Element>;

    /// Elements sharing `name`, in document order.
    fn named(&self, name: &str) -> Vec<ElementId>;

    /// The element that triggered the current submission, if any.
    fn submitter(&self) -> Option<ElementId> {
        None
    }

    /// Look a control up by name. Several same-named elements form a group.
    fn control(&self, name: &str) -> Option<Control> {
        let mut members: Vec<Element> = self
            .named(name)
            .into_iter()
            .filter_map(|id| self.element(id))
            .collect();
        match members.len() {
            0 => None,
            1 => members.pop().map(Control::Single),
            _ => Some(Control::Group(members)),
        }
    }
}

/// A failed constraint, as surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    /// Element to focus.
    pub element: Option<ElementId>,
    /// Name of the control that failed.
    pub control: String,
    /// Message with placeholders substituted. May be empty.
    pub message: String,
}

/// Side-effecting error reporting, supplied by the host.
pub trait Feedback {
    fn focus(&mut self, id: ElementId);

    fn show_message(&mut self, message: &str);

    /// Focus the failing control, then show the message when there is one.
    fn report_error(&mut self, failure: &Failure) {
        if let Some(id) = failure.element {
            self.focus(id);
        }
        if !failure.message.is_empty() {
            self.show_message(&failure.message);
        }
    }
}

/// Show/hide of elements by identifier, supplied by the host.
pub trait Visibility {
    fn set_visible(&mut self, target: &str, visible: bool);
}

/// Feedback sink for check-only passes.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Silent;

impl Feedback for Silent {
    fn focus(&mut self, _id: ElementId) {}

    fn show_message(&mut self, _message: &str) {}

    fn report_error(&mut self, _failure: &Failure) {}
}

/// Feedback sink that keeps the first failure instead of showing it.
#[derive(Debug, Default)]
pub(crate) struct Recorder {
    pub(crate) failure: Option<Failure>,
}

impl Feedback for Recorder {
    fn focus(&mut self, _id: ElementId) {}

    fn show_message(&mut self, _message: &str) {}

    fn report_error(&mut self, failure: &Failure) {
        if self.failure.is_none() {
            self.failure = Some(failure.clone());
        }
    }
}

/// A form seen with an overridden submitter.
pub(crate) struct Submitted<'a, F: ?Sized> {
    pub(crate) form: &'a F,
    pub(crate) by: Option<ElementId>,
}

impl<F: Form + ?Sized> Form for Submitted<'_, F> {
    fn elements(&self) -> Vec<ElementId> {
        self.form.elements()
    }

    fn element(&self, id: ElementId) -> Option<Element> {
        self.form.element(id)
    }

    fn named(&self, name: &str) -> Vec<ElementId> {
        self.form.named(name)
    }

    fn submitter(&self) -> Option<ElementId> {
        self.by
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.control, self.message)
    }
}
