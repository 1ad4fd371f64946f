//! Event Data
//!
//! Object-centric event logs and adjacent utilities
pub mod object_centric;
/// Lenient parsing of timestamps in common formats
pub mod timestamp_utils;
#[cfg(test)]
mod tests;

#[doc(inline)]
pub use object_centric::OCEL;
