//! Binary serialization and deserialization of compiled rule lists.
//!
//! Parsing rule metadata is cheap, but hosts that validate the same forms
//! over and over (server-side pre-checks, test fixtures) can cache the
//! compiled [`RuleList`](crate::RuleList) instead. The format consists of a
//! 32-byte fixed header followed by a bincode-encoded payload.
//!
//! ## Wire Format
//!
//! ```text
//! Offset  Size  Field
//! 0       4     Magic bytes: b"RFRM"
//! 4       2     Format version (u16, little-endian)
//! 6       2     Engine version (u16, little-endian)
//! 8       4     Flags (u32, reserved)
//! 12      4     Payload length in bytes (u32, little-endian)
//! 16      16    BLAKE3 hash of the payload (truncated to 16 bytes)
//! 32..    var   Bincode-encoded payload
//! ```
//!
//! ## Versioning
//!
//! The format version in the header must match exactly. If it does not,
//! deserialization fails immediately with [`DeserializeError::IncompatibleVersion`].
//! The engine version is informational only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{ArgItem, Argument, Operator, Rule, RuleBody, RuleList, Scalar};

const MAGIC: &[u8; 4] = b"RFRM";
const FORMAT_VERSION: u16 = 1;
const ENGINE_VERSION: u16 = 1;
const HEADER_SIZE: usize = 32;

/// Deepest gate nesting accepted from a cache.
const MAX_NESTING: usize = 64;

/// Errors that can occur when serializing a [`RuleList`](crate::RuleList) to bytes.
#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("failed to encode rule list: {0}")]
    Encode(#[from] bincode::error::EncodeError),
}

/// Errors that can occur when deserializing a [`RuleList`](crate::RuleList) from bytes.
#[derive(Debug, Error)]
pub enum DeserializeError {
    #[error("not a ruleform binary: invalid magic bytes")]
    BadMagic,

    #[error("incompatible format version: blob is v{blob}, engine supports v{supported}")]
    IncompatibleVersion { blob: u16, supported: u16 },

    #[error("integrity check failed: BLAKE3 checksum mismatch")]
    ChecksumMismatch,

    #[error("payload length mismatch: expected {expected} bytes, got {actual}")]
    LengthMismatch { expected: u32, actual: usize },

    #[error("failed to decode payload: {0}")]
    Decode(#[from] bincode::error::DecodeError),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("cache was not built from the given source")]
    StaleSource,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRuleList {
    metadata: ListMetadata,
    rules: Vec<SerializedRule>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ListMetadata {
    /// Rules at every nesting level.
    rule_count: usize,
    source_digest: Option<[u8; 32]>,
}

#[derive(Debug, Serialize, Deserialize)]
struct SerializedRule {
    negate: bool,
    operator: String,
    argument: SerializedArgument,
    control: Option<String>,
    body: SerializedBody,
}

#[derive(Debug, Serialize, Deserialize)]
enum SerializedArgument {
    Absent,
    Single(SerializedItem),
    List(Vec<SerializedItem>),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum SerializedItem {
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Control(String),
    Unsupported(String),
}

#[derive(Debug, Serialize, Deserialize)]
enum SerializedBody {
    Constraint {
        message: Option<String>,
    },
    Gate {
        children: Vec<SerializedRule>,
        toggle: Vec<(String, bool)>,
    },
}

fn serialize_item(item: &ArgItem) -> SerializedItem {
    match item {
        ArgItem::Scalar(Scalar::Null) => SerializedItem::Null,
        ArgItem::Scalar(Scalar::Bool(b)) => SerializedItem::Bool(*b),
        ArgItem::Scalar(Scalar::Number(n)) => SerializedItem::Number(*n),
        ArgItem::Scalar(Scalar::String(s)) => SerializedItem::Str(s.clone()),
        ArgItem::Control(name) => SerializedItem::Control(name.clone()),
        ArgItem::Unsupported(json) => SerializedItem::Unsupported(json.clone()),
    }
}

fn deserialize_item(item: SerializedItem) -> ArgItem {
    match item {
        SerializedItem::Null => ArgItem::Scalar(Scalar::Null),
        SerializedItem::Bool(b) => ArgItem::Scalar(Scalar::Bool(b)),
        SerializedItem::Number(n) => ArgItem::Scalar(Scalar::Number(n)),
        SerializedItem::Str(s) => ArgItem::Scalar(Scalar::String(s)),
        SerializedItem::Control(name) => ArgItem::Control(name),
        SerializedItem::Unsupported(json) => ArgItem::Unsupported(json),
    }
}

fn serialize_rule(rule: &Rule) -> SerializedRule {
    let argument = match &rule.argument {
        Argument::Absent => SerializedArgument::Absent,
        Argument::Single(item) => SerializedArgument::Single(serialize_item(item)),
        Argument::List(items) => {
            SerializedArgument::List(items.iter().map(serialize_item).collect())
        }
    };
    let body = match &rule.body {
        RuleBody::Constraint { message } => SerializedBody::Constraint {
            message: message.clone(),
        },
        RuleBody::Gate { children, toggle } => SerializedBody::Gate {
            children: children.iter().map(serialize_rule).collect(),
            toggle: toggle.iter().map(|(k, v)| (k.clone(), *v)).collect(),
        },
    };
    SerializedRule {
        negate: rule.negate,
        operator: rule.operator.name().to_owned(),
        argument,
        control: rule.control.clone(),
        body,
    }
}

fn deserialize_rule(rule: SerializedRule) -> Rule {
    let argument = match rule.argument {
        SerializedArgument::Absent => Argument::Absent,
        SerializedArgument::Single(item) => Argument::Single(deserialize_item(item)),
        SerializedArgument::List(items) => {
            Argument::List(items.into_iter().map(deserialize_item).collect())
        }
    };
    let body = match rule.body {
        SerializedBody::Constraint { message } => RuleBody::Constraint { message },
        SerializedBody::Gate { children, toggle } => RuleBody::Gate {
            children: RuleList::new(children.into_iter().map(deserialize_rule).collect()),
            toggle: toggle.into_iter().collect::<BTreeMap<_, _>>(),
        },
    };
    Rule {
        negate: rule.negate,
        operator: Operator::from_name(&rule.operator),
        argument,
        control: rule.control,
        body,
    }
}

fn count_rules(rules: &RuleList) -> usize {
    rules
        .iter()
        .map(|rule| match &rule.body {
            RuleBody::Gate { children, .. } => 1 + count_rules(children),
            RuleBody::Constraint { .. } => 1,
        })
        .sum()
}

fn validate(ser: &SerializedRuleList) -> Result<(), DeserializeError> {
    let mut count = 0;
    for rule in &ser.rules {
        validate_rule(rule, 1, &mut count)?;
    }
    if ser.metadata.rule_count != count {
        return Err(DeserializeError::Validation(format!(
            "metadata says {} rules but payload has {}",
            ser.metadata.rule_count, count
        )));
    }
    Ok(())
}

fn validate_rule(
    rule: &SerializedRule,
    depth: usize,
    count: &mut usize,
) -> Result<(), DeserializeError> {
    if depth > MAX_NESTING {
        return Err(DeserializeError::Validation(format!(
            "rules nested deeper than {MAX_NESTING} levels"
        )));
    }
    *count += 1;
    if rule.operator.is_empty() {
        return Err(DeserializeError::Validation(
            "rule with empty operator name".to_owned(),
        ));
    }
    if let SerializedBody::Gate { children, toggle } = &rule.body {
        // toggle targets are written from an ordered map
        if toggle.windows(2).any(|w| w[0].0 >= w[1].0) {
            return Err(DeserializeError::Validation(
                "toggle targets not sorted or not unique".to_owned(),
            ));
        }
        for child in children {
            validate_rule(child, depth + 1, count)?;
        }
    }
    Ok(())
}

fn write_header(buf: &mut Vec<u8>, payload: &[u8]) {
    let hash = blake3::hash(payload);
    let hash_bytes = hash.as_bytes();

    buf.extend_from_slice(MAGIC);
    buf.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    buf.extend_from_slice(&ENGINE_VERSION.to_le_bytes());
    buf.extend_from_slice(&0u32.to_le_bytes()); // flags (reserved)
    #[allow(clippy::cast_possible_truncation)] // rule metadata never approaches 4 GiB
    let payload_len = payload.len() as u32;
    buf.extend_from_slice(&payload_len.to_le_bytes());
    buf.extend_from_slice(&hash_bytes[..16]);
}

#[allow(clippy::cast_possible_truncation)] // HEADER_SIZE is 32, always fits in u32
fn read_header(bytes: &[u8]) -> Result<(u16, u32, [u8; 16]), DeserializeError> {
    if bytes.len() < HEADER_SIZE {
        return Err(DeserializeError::LengthMismatch {
            expected: HEADER_SIZE as u32,
            actual: bytes.len(),
        });
    }

    if &bytes[0..4] != MAGIC {
        return Err(DeserializeError::BadMagic);
    }

    let format_version = u16::from_le_bytes([bytes[4], bytes[5]]);
    // bytes[6..8] engine version, bytes[8..12] flags
    let payload_len = u32::from_le_bytes([bytes[12], bytes[13], bytes[14], bytes[15]]);

    let mut hash = [0u8; 16];
    hash.copy_from_slice(&bytes[16..32]);

    Ok((format_version, payload_len, hash))
}

pub(crate) fn encode(
    rules: &RuleList,
    source_text: Option<&str>,
) -> Result<Vec<u8>, SerializeError> {
    let serialized = SerializedRuleList {
        metadata: ListMetadata {
            rule_count: count_rules(rules),
            source_digest: source_text.map(|s| *blake3::hash(s.as_bytes()).as_bytes()),
        },
        rules: rules.iter().map(serialize_rule).collect(),
    };
    let payload = bincode::serde::encode_to_vec(&serialized, bincode::config::standard())?;

    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    write_header(&mut buf, &payload);
    buf.extend_from_slice(&payload);
    Ok(buf)
}

/// Decode a rule list and the source digest embedded with it.
pub(crate) fn decode(bytes: &[u8]) -> Result<(RuleList, Option<[u8; 32]>), DeserializeError> {
    let (format_version, payload_len, stored_hash) = read_header(bytes)?;

    if format_version != FORMAT_VERSION {
        return Err(DeserializeError::IncompatibleVersion {
            blob: format_version,
            supported: FORMAT_VERSION,
        });
    }

    let payload_end = HEADER_SIZE + payload_len as usize;
    if bytes.len() < payload_end {
        return Err(DeserializeError::LengthMismatch {
            expected: payload_len,
            actual: bytes.len() - HEADER_SIZE,
        });
    }
    let payload = &bytes[HEADER_SIZE..payload_end];

    if blake3::hash(payload).as_bytes()[..16] != stored_hash {
        return Err(DeserializeError::ChecksumMismatch);
    }

    let (serialized, _): (SerializedRuleList, usize) =
        bincode::serde::decode_from_slice(payload, bincode::config::standard())?;
    validate(&serialized)?;

    let digest = serialized.metadata.source_digest;
    let rules = RuleList::new(serialized.rules.into_iter().map(deserialize_rule).collect());
    Ok((rules, digest))
}
