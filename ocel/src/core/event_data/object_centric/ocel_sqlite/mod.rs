//! `SQLite` document store for OCEL
//!
//! Events, objects and global attributes are stored in three tables keyed by their ID.
//! Each row holds the JSON document of the entry (see [`ocel_document_schema`](super::ocel_document_schema)).
use std::collections::HashSet;

use rusqlite::Connection;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::event_data::object_centric::{
    codec::{schema_result, Formatting, OCELCodec},
    io::OCELIOError,
    ocel_struct::{OCELEvent, OCELObject, OCELValue, OCEL},
};

/// Export to `SQLite` document stores
pub mod sqlite_ocel_export;
/// Import from `SQLite` document stores
pub mod sqlite_ocel_import;

#[doc(inline)]
pub use sqlite_ocel_export::{
    export_ocel_sqlite_to_con, export_ocel_sqlite_to_path, export_ocel_sqlite_to_vec,
};
#[doc(inline)]
pub use sqlite_ocel_import::{
    import_ocel_sqlite_from_con, import_ocel_sqlite_from_path, import_ocel_sqlite_from_slice,
};

pub(crate) const EVENTS_TABLE: &str = "events";
pub(crate) const OBJECTS_TABLE: &str = "objects";
pub(crate) const GLOBAL_ATTRIBUTES_TABLE: &str = "global_attributes";
pub(crate) const ID_COLUMN: &str = "id";
pub(crate) const DOCUMENT_COLUMN: &str = "document";
pub(crate) const TABLES: [&str; 3] = [EVENTS_TABLE, OBJECTS_TABLE, GLOBAL_ATTRIBUTES_TABLE];

pub(crate) fn table_exists(con: &Connection, table: &str) -> Result<bool, rusqlite::Error> {
    let count: i64 = con.query_row(
        "SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        [table],
        |r| r.get(0),
    )?;
    Ok(count > 0)
}

/// All `(id, document)` rows of a table in insertion order
pub(crate) fn read_documents(
    con: &Connection,
    table: &str,
) -> Result<Vec<(String, String)>, rusqlite::Error> {
    let mut s = con.prepare(&format!(
        r#"SELECT "{ID_COLUMN}", "{DOCUMENT_COLUMN}" FROM "{table}" ORDER BY rowid"#
    ))?;
    let rows = s.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?;
    rows.collect()
}

/// Drop `null` entries of a serialized attribute set, including nested maps
fn drop_null_attributes(attributes: &mut Value) {
    if attributes.is_null() {
        *attributes = Value::Object(Map::new());
    }
    if let Value::Object(entries) = attributes {
        entries.retain(|_, v| !v.is_null());
        entries.values_mut().for_each(drop_nested_nulls);
    }
}

fn drop_nested_nulls(value: &mut Value) {
    let kind = value.get("type").and_then(Value::as_str);
    let is_map = kind == Some("map");
    let is_list = kind == Some("list");
    match value.get_mut("value") {
        Some(inner) if is_map => drop_null_attributes(inner),
        Some(Value::Array(items)) if is_list => items.iter_mut().for_each(drop_nested_nulls),
        _ => {}
    }
}

///
/// Decode one stored document
///
/// Absent (`null`) attribute values are dropped. A `null` global attribute yields `None`.
///
pub(crate) fn decode_document<T: DeserializeOwned>(
    table: &str,
    doc: &str,
) -> Result<Option<T>, serde_json::Error> {
    let mut value: Value = serde_json::from_str(doc)?;
    if table == GLOBAL_ATTRIBUTES_TABLE {
        if value.is_null() {
            return Ok(None);
        }
        drop_nested_nulls(&mut value);
    } else if let Some(attributes) = value.get_mut("attributes") {
        drop_null_attributes(attributes);
    }
    serde_json::from_value(value).map(Some)
}

fn check_documents(con: &Connection) -> Result<Vec<String>, rusqlite::Error> {
    let mut messages = Vec::new();
    for table in TABLES {
        if !table_exists(con, table)? {
            messages.push(format!("{table}: missing table"));
        }
    }
    if !messages.is_empty() {
        return Ok(messages);
    }

    let mut object_ids = HashSet::new();
    for (id, doc) in read_documents(con, OBJECTS_TABLE)? {
        if let Err(e) = decode_document::<OCELObject>(OBJECTS_TABLE, &doc) {
            messages.push(format!("{OBJECTS_TABLE}[{id}]: invalid document: {e}"));
        }
        object_ids.insert(id);
    }
    for (id, doc) in read_documents(con, EVENTS_TABLE)? {
        match decode_document::<OCELEvent>(EVENTS_TABLE, &doc) {
            Ok(None) => {}
            Ok(Some(ev)) => {
                for o in &ev.object_refs {
                    if !object_ids.contains(o) {
                        messages.push(format!(
                            "{EVENTS_TABLE}[{id}]: references missing object '{o}'"
                        ));
                    }
                }
            }
            Err(e) => messages.push(format!("{EVENTS_TABLE}[{id}]: invalid document: {e}")),
        }
    }
    for (id, doc) in read_documents(con, GLOBAL_ATTRIBUTES_TABLE)? {
        if let Err(e) = decode_document::<OCELValue>(GLOBAL_ATTRIBUTES_TABLE, &doc) {
            messages.push(format!(
                "{GLOBAL_ATTRIBUTES_TABLE}[{id}]: invalid document: {e}"
            ));
        }
    }
    Ok(messages)
}

///
/// `SQLite` document store format for [`OCEL`]s
///
/// Works on any [`Connection`], i.e., file-backed or in-memory databases.
/// Serializing into a database which already contains entries upserts them by ID.
///
/// ```rust
/// use ocel::core::event_data::object_centric::{Formatting, OCELCodec, SqliteOCEL, OCEL};
/// let mut con = rusqlite::Connection::open_in_memory().unwrap();
/// SqliteOCEL::serialize_into(&OCEL::default(), &mut con, Formatting::Compact, true).unwrap();
/// assert!(SqliteOCEL::validate(&con));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteOCEL;

impl OCELCodec for SqliteOCEL {
    type Raw = Connection;
    type Target = Connection;

    /// Checks that all tables exist, all documents decode and all referenced objects exist
    fn validate_with_errors(con: &Connection) -> (bool, Vec<String>) {
        let messages = check_documents(con).unwrap_or_else(|e| vec![format!("database: {e}")]);
        (messages.is_empty(), messages)
    }

    fn deserialize(con: &Connection, validate_first: bool) -> Result<OCEL, OCELIOError> {
        if validate_first {
            let (_, messages) = Self::validate_with_errors(con);
            if !messages.is_empty() {
                log::warn!(
                    "Rejecting OCEL document store with {} violation(s)",
                    messages.len()
                );
            }
            schema_result(messages)?;
        }
        sqlite_ocel_import::ocel_from_con(con)
    }

    fn serialize_into(
        ocel: &OCEL,
        con: &mut Connection,
        formatting: Formatting,
        validate_after: bool,
    ) -> Result<(), OCELIOError> {
        sqlite_ocel_export::upsert_ocel(con, ocel, formatting)?;
        if validate_after {
            schema_result(Self::validate_with_errors(con).1)?;
        }
        Ok(())
    }
}
