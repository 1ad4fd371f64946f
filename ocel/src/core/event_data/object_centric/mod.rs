//! Object-centric Event Data (OCEL)
//!
//! The in-memory model ([`OCEL`], [`OCELEvent`], [`OCELObject`], [`OCELValue`]),
//! the format codecs implementing [`OCELCodec`] and structural transformations ([`utils`]).

/// Shared contract of all formats
pub mod codec;
/// Insertion-ordered keyed map
pub mod indexed_map;
/// Path-based import/export and the [`OCELIOError`] type
pub mod io;
/// Macros for the creation of [`ocel_struct::OCEL`]
pub mod macros;
pub mod ocel_json;
/// `SQLite` document store
#[cfg(feature = "ocel-sqlite")]
pub mod ocel_sqlite;
/// OCEL struct and sub-structs
pub mod ocel_struct;
pub mod ocel_xml;
pub mod utils;

#[doc(inline)]
pub use codec::{Formatting, OCELCodec};
#[doc(inline)]
pub use indexed_map::IndexedMap;
#[doc(inline)]
pub use io::OCELIOError;
#[doc(inline)]
pub use ocel_json::JsonOCEL;
#[cfg(feature = "ocel-sqlite")]
#[doc(inline)]
pub use ocel_sqlite::SqliteOCEL;
#[doc(inline)]
pub use ocel_struct::{
    ocel_document_schema, Attributes, AttributesExt, OCELEvent, OCELObject, OCELValue, OCEL,
};
#[doc(inline)]
pub use ocel_xml::XmlOCEL;
