//! OCEL JSON Format (`.jsonocel`) Import/Export
use std::{fs::File, io::Write, path::Path};

use serde_json::Value;

use crate::core::event_data::object_centric::{
    codec::{schema_result, Formatting, OCELCodec},
    io::OCELIOError,
    ocel_struct::OCEL,
};

/// Conversion of JSON documents to [`OCEL`]
mod json_ocel_import;
/// Conversion of [`OCEL`] to JSON documents
mod json_ocel_export;
/// Structural validation of JSON documents
mod json_validation;

/// Property names of the JSON layout
pub(crate) mod keys {
    pub const PREFIX: &str = "ocel:";
    pub const GLOBAL_EVENT: &str = "ocel:global-event";
    pub const GLOBAL_OBJECT: &str = "ocel:global-object";
    pub const GLOBAL_LOG: &str = "ocel:global-log";
    pub const ATTRIBUTE_NAMES: &str = "ocel:attribute-names";
    pub const OBJECT_TYPES: &str = "ocel:object-types";
    pub const EVENTS: &str = "ocel:events";
    pub const OBJECTS: &str = "ocel:objects";
    pub const ACTIVITY: &str = "ocel:activity";
    pub const TIMESTAMP: &str = "ocel:timestamp";
    pub const OMAP: &str = "ocel:omap";
    pub const VMAP: &str = "ocel:vmap";
    pub const TYPE: &str = "ocel:type";
    pub const OVMAP: &str = "ocel:ovmap";
}

///
/// JSON format for [`OCEL`]s
///
/// Events and objects are stored as JSON objects keyed by their ID, with event attributes in
/// `ocel:vmap`, object attributes in `ocel:ovmap` and referenced object IDs in `ocel:omap`.
/// Global attributes are stored in `ocel:global-log`, prefixed with `ocel:`.
///
/// Strings which are valid RFC 3339 date-times are read as timestamps.
///
/// ```rust
/// use ocel::core::event_data::object_centric::{Formatting, JsonOCEL, OCELCodec, OCEL};
/// let json = JsonOCEL::serialize(&OCEL::default(), Formatting::Compact, true).unwrap();
/// assert!(JsonOCEL::validate(&json));
/// assert_eq!(JsonOCEL::deserialize(&json, true).unwrap(), OCEL::default());
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonOCEL;

impl JsonOCEL {
    ///
    /// Serialize an [`OCEL`] to a JSON [`String`]
    ///
    /// If `validate_after` is set, the produced JSON is validated before it is returned.
    ///
    pub fn serialize(
        ocel: &OCEL,
        formatting: Formatting,
        validate_after: bool,
    ) -> Result<String, OCELIOError> {
        let doc = json_ocel_export::ocel_to_json_value(ocel)?;
        let json = match formatting {
            Formatting::Compact => serde_json::to_string(&doc)?,
            Formatting::Indented => serde_json::to_string_pretty(&doc)?,
        };
        if validate_after {
            schema_result(json_validation::validate_json_str(&json))?;
        }
        Ok(json)
    }
}

impl OCELCodec for JsonOCEL {
    type Raw = str;
    type Target = dyn Write;

    fn validate_with_errors(raw: &str) -> (bool, Vec<String>) {
        let messages = json_validation::validate_json_str(raw);
        (messages.is_empty(), messages)
    }

    fn deserialize(raw: &str, validate_first: bool) -> Result<OCEL, OCELIOError> {
        let doc: Value = serde_json::from_str(raw)
            .map_err(|e| OCELIOError::MalformedInput(format!("invalid JSON: {e}")))?;
        if validate_first {
            let messages = json_validation::validate_json_value(&doc);
            if !messages.is_empty() {
                log::warn!(
                    "Rejecting OCEL JSON input with {} schema violation(s)",
                    messages.len()
                );
            }
            schema_result(messages)?;
        }
        json_ocel_import::ocel_from_json_value(&doc)
    }

    fn serialize_into(
        ocel: &OCEL,
        target: &mut Self::Target,
        formatting: Formatting,
        validate_after: bool,
    ) -> Result<(), OCELIOError> {
        let json = Self::serialize(ocel, formatting, validate_after)?;
        target.write_all(json.as_bytes())?;
        Ok(())
    }
}

///
/// Import [`OCEL`] from a JSON file given by a filepath
///
/// The file is validated before parsing.
///
/// See also [`import_ocel_json_from_slice`].
///
pub fn import_ocel_json_from_path<P: AsRef<Path>>(path: P) -> Result<OCEL, OCELIOError> {
    let json = std::fs::read_to_string(path)?;
    JsonOCEL::deserialize(&json, true)
}

///
/// Import [`OCEL`] from a JSON byte slice
///
/// See also [`import_ocel_json_from_path`].
///
pub fn import_ocel_json_from_slice(slice: &[u8]) -> Result<OCEL, OCELIOError> {
    let json = std::str::from_utf8(slice)
        .map_err(|e| OCELIOError::MalformedInput(format!("invalid UTF-8: {e}")))?;
    JsonOCEL::deserialize(json, true)
}

///
/// Export [`OCEL`] to a JSON file at the specified path
///
/// To import an OCEL .jsonocel file see [`import_ocel_json_from_path`] instead.
///
pub fn export_ocel_json_path<P: AsRef<Path>>(ocel: &OCEL, path: P) -> Result<(), OCELIOError> {
    let mut writer = std::io::BufWriter::new(File::create(path)?);
    JsonOCEL::serialize_into(ocel, &mut writer, Formatting::Indented, false)?;
    writer.flush()?;
    Ok(())
}

///
/// Export [`OCEL`] to JSON in a byte array ([`Vec<u8>`])
///
pub fn export_ocel_json_to_vec(ocel: &OCEL) -> Result<Vec<u8>, OCELIOError> {
    Ok(JsonOCEL::serialize(ocel, Formatting::Compact, false)?.into_bytes())
}
