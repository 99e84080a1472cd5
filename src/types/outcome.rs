use std::fmt;
use std::ops::Not;

/// Tri-state result of evaluating one operator or rule.
///
/// `NotApplicable` means the rule is inert for this pass: it is skipped, never
/// reported, and never affected by negation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[must_use]
pub enum Outcome {
    Satisfied,
    Violated,
    NotApplicable,
}

impl Outcome {
    /// `Some(true)` / `Some(false)` for applicable outcomes, `None` otherwise.
    #[must_use]
    pub fn as_bool(self) -> Option<bool> {
        match self {
            Outcome::Satisfied => Some(true),
            Outcome::Violated => Some(false),
            Outcome::NotApplicable => None,
        }
    }

    #[must_use]
    pub fn is_applicable(self) -> bool {
        self != Outcome::NotApplicable
    }

    /// Negate when `negate` is set. `NotApplicable` is left untouched.
    pub fn negated_if(self, negate: bool) -> Self {
        if negate { !self } else { self }
    }
}

impl Not for Outcome {
    type Output = Outcome;

    fn not(self) -> Outcome {
        match self {
            Outcome::Satisfied => Outcome::Violated,
            Outcome::Violated => Outcome::Satisfied,
            Outcome::NotApplicable => Outcome::NotApplicable,
        }
    }
}

impl From<bool> for Outcome {
    fn from(v: bool) -> Self {
        if v {
            Outcome::Satisfied
        } else {
            Outcome::Violated
        }
    }
}

impl From<Option<bool>> for Outcome {
    fn from(v: Option<bool>) -> Self {
        v.map_or(Outcome::NotApplicable, Outcome::from)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Satisfied => write!(f, "satisfied"),
            Outcome::Violated => write!(f, "violated"),
            Outcome::NotApplicable => write!(f, "not applicable"),
        }
    }
}
