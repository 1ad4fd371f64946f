//! Structural transformations of [`OCEL`](super::OCEL)s
//!
//! All transformations take their input by reference and return a new log.

/// Conversion between objects and event attributes
pub mod conversion;
/// Merging of logs and duplicate objects
pub mod merge;

#[doc(inline)]
pub use conversion::{convert_attributes_to_objects, convert_objects_to_attributes};
#[doc(inline)]
pub use merge::{merge_duplicate_objects, merge_ocels};
