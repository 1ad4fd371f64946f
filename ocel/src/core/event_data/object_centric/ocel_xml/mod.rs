//! OCEL XML Format (`.xmlocel`) Import/Export
use std::io::Write;

use crate::core::event_data::object_centric::{
    codec::{schema_result, Formatting, OCELCodec},
    io::OCELIOError,
    ocel_struct::OCEL,
};

/// XML Export for OCEL
pub mod xml_ocel_export;
/// Parser for the OCEL XML format
pub mod xml_ocel_import;
/// Generic XML element tree
mod xml_tree;
/// Structural validation of XML documents
mod xml_validation;

#[doc(inline)]
pub use xml_ocel_export::{export_ocel_xml, export_ocel_xml_path};
#[doc(inline)]
pub use xml_ocel_import::{import_ocel_xml_from_path, import_ocel_xml_slice};

/// Element names
pub(crate) mod tags {
    pub const LOG: &str = "log";
    pub const GLOBAL: &str = "global";
    pub const EVENTS: &str = "events";
    pub const EVENT: &str = "event";
    pub const OBJECTS: &str = "objects";
    pub const OBJECT: &str = "object";
    pub const STRING: &str = "string";
    pub const DATE: &str = "date";
    pub const INT: &str = "int";
    pub const FLOAT: &str = "float";
    pub const BOOLEAN: &str = "boolean";
    pub const LIST: &str = "list";
    pub const MAP: &str = "map";
}

/// Keys of the structural fields of events, objects and the global log
pub(crate) mod fields {
    pub const ID: &str = "id";
    pub const ACTIVITY: &str = "activity";
    pub const TIMESTAMP: &str = "timestamp";
    pub const OMAP: &str = "omap";
    pub const VMAP: &str = "vmap";
    pub const TYPE: &str = "type";
    pub const OVMAP: &str = "ovmap";
    pub const ATTRIBUTE_NAMES: &str = "attribute-names";
    pub const OBJECT_TYPES: &str = "object-types";
}

///
/// XML format for [`OCEL`]s
///
/// All data is stored in keyed value elements (e.g., `<int key="count" value="3"/>`).
/// Lists (`<list>`) keep the order of their children, maps (`<map>`) use the children's keys.
///
/// ```rust
/// use ocel::core::event_data::object_centric::{Formatting, OCELCodec, XmlOCEL, OCEL};
/// let xml = XmlOCEL::serialize(&OCEL::default(), Formatting::Indented, true).unwrap();
/// let (valid, errors) = XmlOCEL::validate_with_errors(&xml);
/// assert!(valid, "{errors:?}");
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlOCEL;

impl XmlOCEL {
    ///
    /// Serialize an [`OCEL`] to an XML [`String`]
    ///
    /// If `validate_after` is set, the produced XML is validated before it is returned.
    ///
    pub fn serialize(
        ocel: &OCEL,
        formatting: Formatting,
        validate_after: bool,
    ) -> Result<String, OCELIOError> {
        let mut writer = xml_ocel_export::formatted_writer(Vec::new(), formatting);
        export_ocel_xml(&mut writer, ocel)?;
        let xml = String::from_utf8(writer.into_inner())
            .map_err(|e| OCELIOError::MalformedInput(format!("invalid UTF-8 output: {e}")))?;
        if validate_after {
            schema_result(xml_validation::validate_xml_str(&xml))?;
        }
        Ok(xml)
    }
}

impl OCELCodec for XmlOCEL {
    type Raw = str;
    type Target = dyn Write;

    fn validate_with_errors(raw: &str) -> (bool, Vec<String>) {
        let messages = xml_validation::validate_xml_str(raw);
        (messages.is_empty(), messages)
    }

    fn deserialize(raw: &str, validate_first: bool) -> Result<OCEL, OCELIOError> {
        let root = xml_tree::parse_xml_tree(raw).map_err(OCELIOError::MalformedInput)?;
        if validate_first {
            let messages = xml_validation::validate_xml_tree(&root);
            if !messages.is_empty() {
                log::warn!(
                    "Rejecting OCEL XML input with {} schema violation(s)",
                    messages.len()
                );
            }
            schema_result(messages)?;
        }
        xml_ocel_import::ocel_from_xml_tree(&root)
    }

    fn serialize_into(
        ocel: &OCEL,
        target: &mut Self::Target,
        formatting: Formatting,
        validate_after: bool,
    ) -> Result<(), OCELIOError> {
        let xml = Self::serialize(ocel, formatting, validate_after)?;
        target.write_all(xml.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, TimeZone};

    use super::*;
    use crate::core::event_data::object_centric::{
        Attributes, OCELEvent, OCELObject, OCELValue,
    };

    fn sample() -> OCEL {
        let tz = FixedOffset::west_opt(3 * 3600).unwrap();
        let mut ocel = OCEL::default();
        ocel.global_attributes
            .insert("note", OCELValue::from("a <quoted> \"value\" & more"));
        let mut inner = Attributes::new();
        inner.insert("ok", OCELValue::from(false));
        inner.insert("empty", OCELValue::List(Vec::new()));
        ocel.events.insert(
            "e1",
            OCELEvent::new(
                "check",
                tz.with_ymd_and_hms(2022, 2, 2, 8, 0, 0).unwrap(),
                ["o1", "o2"],
                [
                    ("ratio", OCELValue::from(0.1)),
                    ("nan", OCELValue::from(f64::NAN)),
                    ("nested", OCELValue::Map(inner)),
                    ("empty-map", OCELValue::Map(Attributes::new())),
                ],
            ),
        );
        ocel.objects
            .insert("o1", OCELObject::new("item", [("n", OCELValue::from(-4_i64))]));
        ocel.objects.insert(
            "o2",
            OCELObject::new(
                "item",
                [(
                    "seen",
                    OCELValue::from(DateTime::parse_from_rfc3339("2022-02-01T00:00:00Z").unwrap()),
                )],
            ),
        );
        ocel
    }

    #[test]
    fn round_trip_both_formattings() {
        let ocel = sample();
        for formatting in [Formatting::Compact, Formatting::Indented] {
            let xml = XmlOCEL::serialize(&ocel, formatting, true).unwrap();
            let back = XmlOCEL::deserialize(&xml, true).unwrap();
            assert_eq!(back, ocel);
            assert_eq!(
                back.events.get("e1").unwrap().timestamp.offset(),
                &FixedOffset::west_opt(3 * 3600).unwrap()
            );
        }
    }

    #[test]
    fn schema_violation_only_when_validating() {
        let xml = r#"<log><events><event>
            <string key="id" value="e1"/>
            <string key="activity" value="a"/>
            <date key="timestamp" value="2023-10-06 09:30:21"/>
            <list key="omap"/>
            <list key="vmap"/>
        </event></events><objects/></log>"#;
        assert!(!XmlOCEL::validate(xml));
        assert!(matches!(
            XmlOCEL::deserialize(xml, true),
            Err(OCELIOError::SchemaViolation(m)) if m.len() == 1
        ));
        let ocel = XmlOCEL::deserialize(xml, false).unwrap();
        assert_eq!(ocel.events.len(), 1);
    }

    #[test]
    fn broken_xml_is_malformed() {
        assert!(matches!(
            XmlOCEL::deserialize("<log><events></log>", false),
            Err(OCELIOError::MalformedInput(_))
        ));
    }
}
