//! Shared contract of all OCEL formats
use serde::{Deserialize, Serialize};

use super::{io::OCELIOError, ocel_struct::OCEL};

///
/// Whitespace layout of serialized output
///
/// Only affects whitespace, never the semantic content of the output.
///
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Formatting {
    /// No optional whitespace
    #[default]
    Compact,
    /// Line breaks and indentation for human readers
    Indented,
}

///
/// Format adapter for reading and writing [`OCEL`]s
///
/// Every format (JSON, XML, document store) implements the same four operations:
///
/// - [`OCELCodec::validate`] / [`OCELCodec::validate_with_errors`] only check the raw input against the format's schema and never fail
/// - [`OCELCodec::deserialize`] parses the raw input into an [`OCEL`], optionally validating it first
/// - [`OCELCodec::serialize_into`] writes an [`OCEL`] into the format's target, optionally validating the produced output
///
pub trait OCELCodec {
    /// Raw input representation (e.g., [`str`] for text formats)
    type Raw: ?Sized;
    /// Target written to on serialization
    type Target: ?Sized;

    ///
    /// Validate raw input against the format schema
    ///
    /// Returns whether the input is valid and all diagnostic messages (in validator order).
    ///
    fn validate_with_errors(raw: &Self::Raw) -> (bool, Vec<String>);

    /// Validate raw input against the format schema
    fn validate(raw: &Self::Raw) -> bool {
        Self::validate_with_errors(raw).0
    }

    ///
    /// Parse raw input into an [`OCEL`]
    ///
    /// If `validate_first` is set, the input is validated before parsing and rejected with
    /// [`OCELIOError::SchemaViolation`] if it is not valid.
    /// A partially parsed [`OCEL`] is never returned.
    ///
    fn deserialize(raw: &Self::Raw, validate_first: bool) -> Result<OCEL, OCELIOError>;

    ///
    /// Write an [`OCEL`] into `target`
    ///
    /// If `validate_after` is set, the written output is validated and
    /// [`OCELIOError::SchemaViolation`] is returned if it does not pass.
    ///
    fn serialize_into(
        ocel: &OCEL,
        target: &mut Self::Target,
        formatting: Formatting,
        validate_after: bool,
    ) -> Result<(), OCELIOError>;
}

/// Turn validation messages into an error, if there are any
pub(crate) fn schema_result(messages: Vec<String>) -> Result<(), OCELIOError> {
    if messages.is_empty() {
        Ok(())
    } else {
        Err(OCELIOError::SchemaViolation(messages))
    }
}

/// Global-log entries derived from the log itself by the text formats
pub(crate) const RESERVED_GLOBAL_KEYS: [&str; 2] = ["attribute-names", "object-types"];

///
/// Reject global attributes whose names collide with a derived global-log entry
///
/// Such attributes could not be read back, so serialization fails instead of dropping them.
///
pub(crate) fn check_reserved_global_keys(ocel: &OCEL) -> Result<(), OCELIOError> {
    match ocel
        .global_attributes
        .keys()
        .find(|k| RESERVED_GLOBAL_KEYS.contains(&k.as_str()))
    {
        Some(key) => Err(OCELIOError::UnsupportedValueType(format!(
            "global attribute '{key}' is reserved for the derived log summary"
        ))),
        None => Ok(()),
    }
}
