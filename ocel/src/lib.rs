#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]

#![doc = include_str!("../README.md")]

/// Core event data structures and IO traits
pub mod core;

/// Util module with smaller helper functions, structs or enums
pub mod utils;

#[doc(inline)]
pub use crate::core::event_data::object_centric::{
    Attributes, Formatting, JsonOCEL, OCELCodec, OCELEvent, OCELIOError, OCELObject, OCELValue,
    XmlOCEL, OCEL,
};

#[cfg(feature = "ocel-sqlite")]
#[doc(inline)]
pub use crate::core::event_data::object_centric::SqliteOCEL;

#[doc(inline)]
pub use crate::core::event_data::object_centric::ocel_json::{
    export_ocel_json_path, export_ocel_json_to_vec, import_ocel_json_from_path,
    import_ocel_json_from_slice,
};

#[doc(inline)]
pub use crate::core::event_data::object_centric::ocel_xml::{
    export_ocel_xml, export_ocel_xml_path, import_ocel_xml_from_path, import_ocel_xml_slice,
};

#[cfg(feature = "ocel-sqlite")]
#[doc(inline)]
pub use crate::core::event_data::object_centric::ocel_sqlite::{
    export_ocel_sqlite_to_con, export_ocel_sqlite_to_path, export_ocel_sqlite_to_vec,
    import_ocel_sqlite_from_con, import_ocel_sqlite_from_path, import_ocel_sqlite_from_slice,
};

#[doc(inline)]
pub use crate::core::io::{Exportable, Importable};
