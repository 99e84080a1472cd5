//! Reading the current semantic value of a control.

use crate::{Control, Element, ElementKind, Form, Value};

/// Current value of `control`, or `None` when it has none (no control, or a
/// radio group with nothing selected).
#[must_use]
pub fn value_of(form: &dyn Form, control: Option<&Control>) -> Option<Value> {
    match control? {
        Control::Group(members) => checked_member(members.iter()),
        Control::Single(el) => element_value(form, el),
    }
}

fn element_value(form: &dyn Form, el: &Element) -> Option<Value> {
    match el.kind {
        ElementKind::Select => Some(Value::Text(el.value.clone())),
        ElementKind::Checkbox => Some(Value::Checked(el.checked)),
        ElementKind::Radio => {
            let members: Vec<Element> = form
                .named(&el.name)
                .into_iter()
                .filter_map(|id| form.element(id))
                .collect();
            checked_member(members.iter())
        }
        _ => Some(Value::Text(el.value.trim().to_owned())),
    }
}

fn checked_member<'a>(mut members: impl Iterator<Item = &'a Element>) -> Option<Value> {
    members
        .find(|el| el.checked)
        .map(|el| Value::Text(el.value.clone()))
}

/// Value handed to operators: the control's value with its empty sentinel
/// replaced by an empty string.
#[must_use]
pub fn operand_value(form: &dyn Form, control: &Control) -> Option<Value> {
    let value = value_of(form, Some(control));
    match (value, control.empty_value()) {
        (Some(Value::Text(text)), Some(sentinel)) if text == sentinel => {
            Some(Value::Text(String::new()))
        }
        (value, _) => value,
    }
}
