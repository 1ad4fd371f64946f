//! IO implementations for OCEL

use std::io::{Read, Write};
use std::path::Path;

use flate2::{read::GzDecoder, write::GzEncoder, Compression};

use crate::core::event_data::object_centric::{
    codec::{Formatting, OCELCodec},
    ocel_json::JsonOCEL,
    ocel_struct::OCEL,
    ocel_xml::XmlOCEL,
};
use crate::core::io::{Exportable, Importable};

/// Error type for OCEL IO operations
#[derive(Debug)]
pub enum OCELIOError {
    /// IO Error
    Io(std::io::Error),
    /// JSON (de-)serialization error of stored documents
    Json(serde_json::Error),
    /// XML writing error
    Xml(quick_xml::Error),
    #[cfg(feature = "ocel-sqlite")]
    /// `SQLite` Error
    Sqlite(rusqlite::Error),
    /// Input does not conform to the format schema (with all validation messages)
    SchemaViolation(Vec<String>),
    /// Input could not be parsed as the underlying structure (JSON, XML, database)
    MalformedInput(String),
    /// A value of a kind outside of the supported [`OCELValue`](super::OCELValue) variants was encountered
    UnsupportedValueType(String),
    /// Unsupported Format
    UnsupportedFormat(String),
}

impl std::fmt::Display for OCELIOError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OCELIOError::Io(e) => write!(f, "IO Error: {}", e),
            OCELIOError::Json(e) => write!(f, "JSON Error: {}", e),
            OCELIOError::Xml(e) => write!(f, "XML Error: {}", e),
            #[cfg(feature = "ocel-sqlite")]
            OCELIOError::Sqlite(e) => write!(f, "SQLite Error: {}", e),
            OCELIOError::SchemaViolation(messages) => {
                write!(f, "Schema Violation: {}", messages.join("; "))
            }
            OCELIOError::MalformedInput(s) => write!(f, "Malformed Input: {}", s),
            OCELIOError::UnsupportedValueType(s) => write!(f, "Unsupported Value Type: {}", s),
            OCELIOError::UnsupportedFormat(s) => write!(f, "Unsupported Format: {}", s),
        }
    }
}

impl std::error::Error for OCELIOError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            OCELIOError::Io(e) => Some(e),
            OCELIOError::Json(e) => Some(e),
            OCELIOError::Xml(e) => Some(e),
            #[cfg(feature = "ocel-sqlite")]
            OCELIOError::Sqlite(e) => Some(e),
            OCELIOError::SchemaViolation(_)
            | OCELIOError::MalformedInput(_)
            | OCELIOError::UnsupportedValueType(_)
            | OCELIOError::UnsupportedFormat(_) => None,
        }
    }
}

impl From<std::io::Error> for OCELIOError {
    fn from(e: std::io::Error) -> Self {
        OCELIOError::Io(e)
    }
}

impl From<serde_json::Error> for OCELIOError {
    fn from(e: serde_json::Error) -> Self {
        OCELIOError::Json(e)
    }
}

impl From<quick_xml::Error> for OCELIOError {
    fn from(e: quick_xml::Error) -> Self {
        OCELIOError::Xml(e)
    }
}

#[cfg(feature = "ocel-sqlite")]
impl From<rusqlite::Error> for OCELIOError {
    fn from(e: rusqlite::Error) -> Self {
        OCELIOError::Sqlite(e)
    }
}

fn read_text<R: Read>(mut reader: R, gz: bool) -> Result<String, OCELIOError> {
    let mut s = String::new();
    if gz {
        GzDecoder::new(reader).read_to_string(&mut s)?;
    } else {
        reader.read_to_string(&mut s)?;
    }
    Ok(s)
}

fn write_text<W: Write>(writer: W, text: &str, gz: bool) -> Result<(), OCELIOError> {
    if gz {
        let mut encoder = GzEncoder::new(writer, Compression::fast());
        encoder.write_all(text.as_bytes())?;
        encoder.finish()?.flush()?;
    } else {
        let mut writer = writer;
        writer.write_all(text.as_bytes())?;
        writer.flush()?;
    }
    Ok(())
}

fn is_sqlite_format(format: &str) -> bool {
    matches!(format, "sqlite" | "db")
}

impl Importable for OCEL {
    type Error = OCELIOError;

    fn import_from_path<P: AsRef<Path>>(path: P) -> Result<Self, Self::Error> {
        let path = path.as_ref();
        let format = <Self as Importable>::infer_format(path).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Could not infer format from path",
            )
        })?;

        if is_sqlite_format(&format) {
            #[cfg(feature = "ocel-sqlite")]
            return crate::core::event_data::object_centric::ocel_sqlite::import_ocel_sqlite_from_path(path);
            #[cfg(not(feature = "ocel-sqlite"))]
            return Err(OCELIOError::UnsupportedFormat(
                "SQLite support not enabled".to_string(),
            ));
        }
        let file = std::fs::File::open(path)?;
        let reader = std::io::BufReader::new(file);
        Self::import_from_reader(reader, &format)
    }

    fn import_from_reader<R: Read>(reader: R, format: &str) -> Result<Self, Self::Error> {
        match format {
            "json" | "jsonocel" | "json.gz" | "jsonocel.gz" => {
                let text = read_text(reader, format.ends_with(".gz"))?;
                JsonOCEL::deserialize(&text, true)
            }
            "xml" | "xmlocel" | "xml.gz" | "xmlocel.gz" => {
                let text = read_text(reader, format.ends_with(".gz"))?;
                XmlOCEL::deserialize(&text, true)
            }
            f if is_sqlite_format(f) => {
                #[cfg(feature = "ocel-sqlite")]
                {
                    let mut reader = reader;
                    let mut bytes = Vec::new();
                    reader.read_to_end(&mut bytes)?;
                    crate::core::event_data::object_centric::ocel_sqlite::import_ocel_sqlite_from_slice(&bytes)
                }
                #[cfg(not(feature = "ocel-sqlite"))]
                {
                    let _ = reader;
                    Err(OCELIOError::UnsupportedFormat(
                        "SQLite support not enabled".to_string(),
                    ))
                }
            }
            _ => Err(OCELIOError::UnsupportedFormat(format.to_string())),
        }
    }
}

impl Exportable for OCEL {
    type Error = OCELIOError;

    fn export_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), Self::Error> {
        let path = path.as_ref();
        let format = <Self as Exportable>::infer_format(path).ok_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Could not infer format from path",
            )
        })?;

        if is_sqlite_format(&format) {
            #[cfg(feature = "ocel-sqlite")]
            return crate::core::event_data::object_centric::ocel_sqlite::export_ocel_sqlite_to_path(self, path);
            #[cfg(not(feature = "ocel-sqlite"))]
            return Err(OCELIOError::UnsupportedFormat(
                "SQLite support not enabled".to_string(),
            ));
        }
        let file = std::fs::File::create(path)?;
        let writer = std::io::BufWriter::new(file);
        Self::export_to_writer(self, writer, &format)
    }

    fn export_to_writer<W: Write>(&self, writer: W, format: &str) -> Result<(), Self::Error> {
        match format {
            "json" | "jsonocel" | "json.gz" | "jsonocel.gz" => {
                let text = JsonOCEL::serialize(self, Formatting::Indented, false)?;
                write_text(writer, &text, format.ends_with(".gz"))
            }
            "xml" | "xmlocel" | "xml.gz" | "xmlocel.gz" => {
                let text = XmlOCEL::serialize(self, Formatting::Indented, false)?;
                write_text(writer, &text, format.ends_with(".gz"))
            }
            f if is_sqlite_format(f) => {
                #[cfg(feature = "ocel-sqlite")]
                {
                    let bytes = crate::core::event_data::object_centric::ocel_sqlite::export_ocel_sqlite_to_vec(self)?;
                    let mut writer = writer;
                    writer.write_all(&bytes)?;
                    writer.flush()?;
                    Ok(())
                }
                #[cfg(not(feature = "ocel-sqlite"))]
                {
                    let _ = writer;
                    Err(OCELIOError::UnsupportedFormat(
                        "SQLite support not enabled".to_string(),
                    ))
                }
            }
            _ => Err(OCELIOError::UnsupportedFormat(format.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;
    use crate::core::event_data::object_centric::{Attributes, OCELEvent, OCELObject, OCELValue};

    fn small_ocel() -> OCEL {
        let mut ocel = OCEL::default();
        ocel.global_attributes
            .insert("version", OCELValue::from("1.0"));
        ocel.events.insert(
            "e1",
            OCELEvent::new(
                "place order",
                DateTime::parse_from_rfc3339("2021-03-01T10:00:00+02:00").unwrap(),
                ["o1"],
                [("total", OCELValue::from(12.5))],
            ),
        );
        ocel.objects
            .insert("o1", OCELObject::new("order", Attributes::new()));
        ocel
    }

    #[test]
    fn path_round_trip_all_formats() {
        let dir = tempfile::tempdir().unwrap();
        let ocel = small_ocel();
        let mut names = vec!["log.jsonocel", "log.xmlocel", "log.xmlocel.gz", "log.json.gz"];
        if cfg!(feature = "ocel-sqlite") {
            names.push("log.sqlite");
        }
        for name in names {
            let path = dir.path().join(name);
            ocel.export_to_path(&path).unwrap();
            let back = OCEL::import_from_path(&path).unwrap();
            assert_eq!(ocel, back, "round trip through {name}");
        }
    }

    #[test]
    fn unknown_format_is_rejected() {
        let res = OCEL::import_from_bytes(b"irrelevant", "csv");
        assert!(matches!(res, Err(OCELIOError::UnsupportedFormat(_))));
    }
}
