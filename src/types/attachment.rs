use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::control::{ElementId, ElementKind};
use super::engine::Engine;
use super::form::{Feedback, Form, Submitted, Visibility};

/// An engine bound to one form's events.
///
/// Created by [`Engine::attach`]. The host forwards clicks, changes and
/// submissions; the attachment keeps visibility current and remembers which
/// element submitted the form.
///
/// ```
/// use ruleform::{Engine, MemoryForm, Recording};
///
/// let mut form = MemoryForm::new()
///     .checkbox("ship", false)
///     .rules(r#"{"op":":filled","toggle":{"address":true}}"#);
/// let engine = Engine::default();
/// let mut view = Recording::new();
///
/// let mut attachment = engine.attach(&form, &mut view);
/// assert_eq!(view.is_visible("address"), Some(false));
///
/// form.set_checked("ship", true);
/// let ship = form.id_of("ship").unwrap();
/// attachment.on_click(&form, ship, &mut view);
/// assert_eq!(view.is_visible("address"), Some(true));
/// ```
#[derive(Debug)]
pub struct Attachment<'e> {
    engine: &'e Engine,
    drivers: BTreeSet<ElementId>,
    submitted_by: Option<ElementId>,
}

impl<'e> Attachment<'e> {
    pub(crate) fn new(engine: &'e Engine, drivers: BTreeSet<ElementId>) -> Self {
        Self {
            engine,
            drivers,
            submitted_by: None,
        }
    }

    /// Elements whose value drives visibility.
    pub fn drivers(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.drivers.iter().copied()
    }

    /// The submit or image button clicked last, if the last click was one.
    #[must_use]
    pub fn submitted_by(&self) -> Option<ElementId> {
        self.submitted_by
    }

    /// A click anywhere in the form.
    ///
    /// Clicking a submit or image button records it as the submitter; any
    /// other click clears it. Clicking a driver other than a select
    /// re-evaluates visibility.
    pub fn on_click(&mut self, form: &impl Form, id: ElementId, visibility: &mut impl Visibility) {
        let element = form.element(id);
        self.submitted_by = element
            .as_ref()
            .filter(|el| el.kind.submits())
            .map(|el| el.id);
        trace!(element = %id, submitter = ?self.submitted_by, "click");
        let is_select = element.is_some_and(|el| el.kind == ElementKind::Select);
        if !is_select && self.drivers.contains(&id) {
            self.refresh(form, visibility);
        }
    }

    /// A change of a control's value.
    pub fn on_change(&mut self, form: &impl Form, id: ElementId, visibility: &mut impl Visibility) {
        if self.drivers.contains(&id) {
            self.refresh(form, visibility);
        }
    }

    /// A submission attempt. Returns whether the form may be submitted.
    pub fn on_submit(&self, form: &impl Form, feedback: &mut impl Feedback) -> bool {
        let submitted = Submitted {
            form,
            by: self.submitted_by.or_else(|| form.submitter()),
        };
        let passed = self.engine.validate_form(&submitted, feedback);
        debug!(passed, "submit");
        passed
    }

    /// Re-run the visibility pass over the whole form.
    pub fn refresh(&mut self, form: &impl Form, visibility: &mut impl Visibility) {
        let drivers = self.engine.toggle_pass(form, visibility);
        self.drivers.extend(drivers);
    }

    /// Stop reacting to the form.
    pub fn detach(self) {
        debug!(drivers = self.drivers.len(), "detached from form");
    }
}
