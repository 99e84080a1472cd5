//! Declarative form validation and conditional visibility.
//!
//! Every form control may carry a JSON rule list. The [`Engine`] walks those
//! lists to decide whether a form may be submitted and which dependent
//! elements should be shown. The host form is reached only through the
//! [`Form`], [`Feedback`] and [`Visibility`] traits; [`MemoryForm`] is an
//! in-memory implementation of all three.
//!
//! ```
//! use ruleform::{Engine, MemoryForm, Recording};
//!
//! let form = MemoryForm::new()
//!     .text("email", "ada@example")
//!     .rules(r#"{"op":":filled","msg":"Enter your e-mail"},
//!               {"op":":email","msg":"'%value' is not an e-mail address"}"#);
//!
//! let mut feedback = Recording::new();
//! assert!(!Engine::default().validate_form(&form, &mut feedback));
//! assert_eq!(feedback.messages, vec!["'ada@example' is not an e-mail address"]);
//! ```

mod compile;
mod error;
mod evaluate;
mod extract;
mod operators;
mod parse;
#[cfg(feature = "binary-cache")]
pub mod serial;
mod types;

pub use error::RuleformError;
pub use extract::{operand_value, value_of};
pub use operators::{CustomOperator, Operand, Operands, OperatorInput};
pub use parse::ParseError;
#[cfg(feature = "binary-cache")]
pub use serial::{DeserializeError, SerializeError};
pub use types::{
    ArgItem, Argument, Attachment, ConfigError, Control, Element, ElementId, ElementKind, Engine,
    EngineBuilder, Failure, Feedback, Form, MemoryForm, Operator, Outcome, Recording, Rule,
    RuleBody, RuleList, Scalar, Tag, ValidationReport, Value, Visibility, DEFAULT_MAX_DEPTH,
    DEFAULT_VALUE_PLACEHOLDER,
};
