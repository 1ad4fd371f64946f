use std::path::Path;

use rusqlite::Connection;
use serde::de::DeserializeOwned;

use super::{
    decode_document, read_documents, table_exists, EVENTS_TABLE, GLOBAL_ATTRIBUTES_TABLE,
    OBJECTS_TABLE, TABLES,
};
use crate::core::event_data::object_centric::{
    codec::OCELCodec,
    indexed_map::IndexedMap,
    io::OCELIOError,
    ocel_struct::OCEL,
};

use super::SqliteOCEL;

fn decode_table<T: DeserializeOwned>(
    con: &Connection,
    table: &str,
) -> Result<IndexedMap<T>, OCELIOError> {
    let mut decoded = IndexedMap::new();
    for (id, doc) in read_documents(con, table)? {
        let value = decode_document(table, &doc).map_err(|e| {
            OCELIOError::MalformedInput(format!("{table}[{id}]: invalid document: {e}"))
        })?;
        if let Some(value) = value {
            decoded.insert(id, value);
        }
    }
    Ok(decoded)
}

/// Read all three tables into an [`OCEL`] (without validation)
pub(crate) fn ocel_from_con(con: &Connection) -> Result<OCEL, OCELIOError> {
    for table in TABLES {
        if !table_exists(con, table)? {
            return Err(OCELIOError::MalformedInput(format!("{table}: missing table")));
        }
    }
    Ok(OCEL {
        global_attributes: decode_table(con, GLOBAL_ATTRIBUTES_TABLE)?,
        events: decode_table(con, EVENTS_TABLE)?,
        objects: decode_table(con, OBJECTS_TABLE)?,
    })
}

///
/// Import an [`OCEL`] from a `SQLite` connection
///
/// The stored data is validated before parsing.
/// If you want to import from a filepath, see [`import_ocel_sqlite_from_path`] instead.
///
pub fn import_ocel_sqlite_from_con(con: &Connection) -> Result<OCEL, OCELIOError> {
    SqliteOCEL::deserialize(con, true)
}

///
/// Import an [`OCEL`] `SQLite` file from the given path
///
pub fn import_ocel_sqlite_from_path<P: AsRef<Path>>(path: P) -> Result<OCEL, OCELIOError> {
    let con = Connection::open(path)?;
    import_ocel_sqlite_from_con(&con)
}

///
/// Import an [`OCEL`] from a `SQLite` database image (byte slice)
///
pub fn import_ocel_sqlite_from_slice(bytes: &[u8]) -> Result<OCEL, OCELIOError> {
    let mut con = Connection::open_in_memory()?;
    con.deserialize_read_exact(rusqlite::MAIN_DB, bytes, bytes.len(), true)?;
    import_ocel_sqlite_from_con(&con)
}
