use std::fmt;

/// Position of a native element in its form, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ElementId(pub usize);

/// HTML tag family of an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Input,
    Select,
    TextArea,
    Button,
}

/// Kind of a native form element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElementKind {
    #[default]
    Text,
    Password,
    TextArea,
    Select,
    Checkbox,
    Radio,
    Hidden,
    File,
    Submit,
    Image,
    Reset,
    /// A `<button>` element.
    Button,
}

impl ElementKind {
    #[must_use]
    pub fn tag(self) -> Tag {
        match self {
            ElementKind::TextArea => Tag::TextArea,
            ElementKind::Select => Tag::Select,
            ElementKind::Button => Tag::Button,
            _ => Tag::Input,
        }
    }

    /// Whether clicking this element submits the form.
    #[must_use]
    pub fn submits(self) -> bool {
        matches!(self, ElementKind::Submit | ElementKind::Image)
    }
}

/// Snapshot of one native element, read fresh from the host on every lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub name: String,
    pub kind: ElementKind,
    /// Raw value as the host reports it (untrimmed).
    pub value: String,
    pub checked: bool,
    pub disabled: bool,
    pub read_only: bool,
    /// The element bypasses validation when it submits the form.
    pub skip_validation: bool,
    /// Serialized rule-list attribute, if any.
    pub rules: Option<String>,
    /// Value to treat as logically empty.
    pub empty_value: Option<String>,
}

impl Element {
    /// Whether the validation pass visits this element: an enabled, writable
    /// input, select or textarea that is not hidden or a button-like input.
    #[must_use]
    pub fn is_validatable(&self) -> bool {
        let tag_ok = matches!(self.kind.tag(), Tag::Input | Tag::Select | Tag::TextArea);
        let kind_excluded = matches!(
            self.kind,
            ElementKind::Hidden | ElementKind::Submit | ElementKind::Image | ElementKind::Reset
        );
        tag_ok && !kind_excluded && !self.disabled && !self.read_only
    }
}

/// Result of looking a control up by name: a single element, or a group of
/// same-named elements such as a radio set.
#[derive(Debug, Clone, PartialEq)]
pub enum Control {
    Single(Element),
    Group(Vec<Element>),
}

impl Control {
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Control::Single(el) => &el.name,
            Control::Group(members) => members.first().map_or("", |el| el.name.as_str()),
        }
    }

    /// Elements backing this control.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        match self {
            Control::Single(el) => std::slice::from_ref(el),
            Control::Group(members) => members,
        }
    }

    /// A group counts as disabled only when every member is.
    #[must_use]
    pub fn is_disabled(&self) -> bool {
        match self {
            Control::Single(el) => el.disabled,
            Control::Group(members) => !members.is_empty() && members.iter().all(|el| el.disabled),
        }
    }

    /// Element that receives focus when this control fails.
    #[must_use]
    pub fn focus_target(&self) -> Option<ElementId> {
        self.elements().first().map(|el| el.id)
    }

    /// Rule metadata of the control (the first member's, for a group).
    #[must_use]
    pub fn rules_attr(&self) -> Option<&str> {
        self.elements().first().and_then(|el| el.rules.as_deref())
    }

    /// Empty sentinel of the control (the first member's, for a group).
    #[must_use]
    pub fn empty_value(&self) -> Option<&str> {
        self.elements().first().and_then(|el| el.empty_value.as_deref())
    }

    #[must_use]
    pub fn contains(&self, id: ElementId) -> bool {
        self.elements().iter().any(|el| el.id == id)
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(kind: ElementKind) -> Element {
        Element {
            name: "field".into(),
            kind,
            ..Element::default()
        }
    }

    #[test]
    fn tags() {
        assert_eq!(ElementKind::Text.tag(), Tag::Input);
        assert_eq!(ElementKind::Checkbox.tag(), Tag::Input);
        assert_eq!(ElementKind::Select.tag(), Tag::Select);
        assert_eq!(ElementKind::TextArea.tag(), Tag::TextArea);
        assert_eq!(ElementKind::Button.tag(), Tag::Button);
    }

    #[test]
    fn validatable_kinds() {
        assert!(element(ElementKind::Text).is_validatable());
        assert!(element(ElementKind::Select).is_validatable());
        assert!(element(ElementKind::Checkbox).is_validatable());
        assert!(!element(ElementKind::Hidden).is_validatable());
        assert!(!element(ElementKind::Submit).is_validatable());
        assert!(!element(ElementKind::Image).is_validatable());
        assert!(!element(ElementKind::Reset).is_validatable());
        assert!(!element(ElementKind::Button).is_validatable());
    }

    #[test]
    fn disabled_and_read_only_are_skipped() {
        let mut el = element(ElementKind::Text);
        el.disabled = true;
        assert!(!el.is_validatable());
        let mut el = element(ElementKind::Text);
        el.read_only = true;
        assert!(!el.is_validatable());
    }

    #[test]
    fn group_disabled_only_when_all_members_are() {
        let mut a = element(ElementKind::Radio);
        let b = element(ElementKind::Radio);
        a.disabled = true;
        assert!(!Control::Group(vec![a.clone(), b]).is_disabled());
        assert!(Control::Group(vec![a.clone(), a]).is_disabled());
    }

    #[test]
    fn group_reads_first_member_metadata() {
        let mut a = element(ElementKind::Radio);
        a.id = ElementId(3);
        a.rules = Some(r#"[{"op":":filled"}]"#.into());
        let mut b = element(ElementKind::Radio);
        b.id = ElementId(4);
        let group = Control::Group(vec![a, b]);
        assert_eq!(group.rules_attr(), Some(r#"[{"op":":filled"}]"#));
        assert_eq!(group.focus_target(), Some(ElementId(3)));
        assert!(group.contains(ElementId(4)));
        assert_eq!(group.name(), "field");
    }
}
