//! Row structs for the catalog tables.
//!
//! Each submodule holds a `FromRow` struct matching the table's column
//! names and a conversion into the corresponding `bridge_core` type.

pub mod frame;
pub mod recording;
pub mod schema;
