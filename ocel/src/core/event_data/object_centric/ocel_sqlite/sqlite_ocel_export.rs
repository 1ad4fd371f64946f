use std::path::Path;

use rusqlite::Connection;
use serde::Serialize;

use super::{DOCUMENT_COLUMN, EVENTS_TABLE, GLOBAL_ATTRIBUTES_TABLE, ID_COLUMN, OBJECTS_TABLE, TABLES};
use crate::core::event_data::object_centric::{
    codec::{Formatting, OCELCodec},
    io::OCELIOError,
    ocel_struct::{Attributes, OCELValue, OCEL},
};

use super::SqliteOCEL;

/// Fail on floats that have no JSON representation
fn check_finite(value: &OCELValue, path: &str) -> Result<(), OCELIOError> {
    match value {
        OCELValue::Float(f) if !f.is_finite() => Err(OCELIOError::UnsupportedValueType(format!(
            "{path}: non-finite float {f} cannot be stored"
        ))),
        OCELValue::List(items) => items
            .iter()
            .enumerate()
            .try_for_each(|(i, v)| check_finite(v, &format!("{path}/{i}"))),
        OCELValue::Map(m) => check_attributes_finite(m, path),
        _ => Ok(()),
    }
}

fn check_attributes_finite(attributes: &Attributes, path: &str) -> Result<(), OCELIOError> {
    attributes
        .iter()
        .try_for_each(|(k, v)| check_finite(v, &format!("{path}/{k}")))
}

fn to_document<T: Serialize>(value: &T, formatting: Formatting) -> Result<String, OCELIOError> {
    Ok(match formatting {
        Formatting::Compact => serde_json::to_string(value)?,
        Formatting::Indented => serde_json::to_string_pretty(value)?,
    })
}

fn create_tables(con: &Connection) -> Result<(), rusqlite::Error> {
    for table in TABLES {
        con.execute(
            &format!(
                r#"CREATE TABLE IF NOT EXISTS "{table}" ("{ID_COLUMN}" TEXT NOT NULL, "{DOCUMENT_COLUMN}" TEXT NOT NULL, PRIMARY KEY("{ID_COLUMN}"))"#
            ),
            [],
        )?;
    }
    Ok(())
}

///
/// Insert or update all entries of an [`OCEL`] in one transaction
///
/// Entries are matched by ID; rows not part of the [`OCEL`] are left untouched.
///
pub(crate) fn upsert_ocel(
    con: &Connection,
    ocel: &OCEL,
    formatting: Formatting,
) -> Result<(), OCELIOError> {
    check_attributes_finite(&ocel.global_attributes, GLOBAL_ATTRIBUTES_TABLE)?;
    for (id, ev) in &ocel.events {
        check_attributes_finite(&ev.attributes, &format!("{EVENTS_TABLE}[{id}]"))?;
    }
    for (id, ob) in &ocel.objects {
        check_attributes_finite(&ob.attributes, &format!("{OBJECTS_TABLE}[{id}]"))?;
    }

    create_tables(con)?;
    let tx = con.unchecked_transaction()?;
    let upsert = |table: &str| {
        format!(
            r#"INSERT INTO "{table}" ("{ID_COLUMN}", "{DOCUMENT_COLUMN}") VALUES (?1, ?2) ON CONFLICT("{ID_COLUMN}") DO UPDATE SET "{DOCUMENT_COLUMN}" = excluded."{DOCUMENT_COLUMN}""#
        )
    };
    {
        let mut s = tx.prepare(&upsert(OBJECTS_TABLE))?;
        for (id, ob) in &ocel.objects {
            s.execute((id, to_document(ob, formatting)?))?;
        }
        let mut s = tx.prepare(&upsert(EVENTS_TABLE))?;
        for (id, ev) in &ocel.events {
            s.execute((id, to_document(ev, formatting)?))?;
        }
        let mut s = tx.prepare(&upsert(GLOBAL_ATTRIBUTES_TABLE))?;
        for (key, value) in &ocel.global_attributes {
            s.execute((key, to_document(value, formatting)?))?;
        }
    }
    tx.commit()?;
    log::debug!(
        "Upserted {} events, {} objects and {} global attributes",
        ocel.events.len(),
        ocel.objects.len(),
        ocel.global_attributes.len()
    );
    Ok(())
}

///
/// Export an [`OCEL`] to a `SQLite` file at the specified path
///
/// If the file already holds a document store, its entries are upserted by ID.
///
/// Note: This function is only available if the `ocel-sqlite` feature is enabled.
///
pub fn export_ocel_sqlite_to_path<P: AsRef<Path>>(ocel: &OCEL, path: P) -> Result<(), OCELIOError> {
    let mut con = Connection::open(path)?;
    export_ocel_sqlite_to_con(&mut con, ocel)
}

///
/// Export an [`OCEL`] to a `SQLite` database image (byte array)
///
/// Note: This function is only available if the `ocel-sqlite` feature is enabled.
///
pub fn export_ocel_sqlite_to_vec(ocel: &OCEL) -> Result<Vec<u8>, OCELIOError> {
    let mut con = Connection::open_in_memory()?;
    export_ocel_sqlite_to_con(&mut con, ocel)?;
    let data = con.serialize(rusqlite::MAIN_DB)?;
    Ok((*data).to_vec())
}

///
/// Export an [`OCEL`] to a `SQLite` connection
///
/// Note: This function is only available if the `ocel-sqlite` feature is enabled.
///
pub fn export_ocel_sqlite_to_con(con: &mut Connection, ocel: &OCEL) -> Result<(), OCELIOError> {
    SqliteOCEL::serialize_into(ocel, con, Formatting::Compact, false)
}
