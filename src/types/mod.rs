mod attachment;
mod control;
mod engine;
mod error;
mod form;
mod memory_form;
mod operator;
mod outcome;
mod report;
mod rule;
mod value;

pub use attachment::Attachment;
pub use control::{Control, Element, ElementId, ElementKind, Tag};
pub use engine::{Engine, EngineBuilder, DEFAULT_MAX_DEPTH, DEFAULT_VALUE_PLACEHOLDER};
pub use error::ConfigError;
pub use form::{Failure, Feedback, Form, Visibility};
pub use memory_form::{MemoryForm, Recording};
pub use operator::Operator;
pub use outcome::Outcome;
pub use report::ValidationReport;
pub use rule::{ArgItem, Argument, Rule, RuleBody, RuleList};
pub use value::{Scalar, Value};

pub(crate) use form::Silent;
pub(crate) use value::{loose_eq, loose_eq_values};
