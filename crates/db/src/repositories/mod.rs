//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async read methods
//! that accept `&PgPool` as the first argument.

pub mod frame_repo;
pub mod recording_repo;
pub mod schema_repo;

pub use frame_repo::FrameRepo;
pub use recording_repo::RecordingRepo;
pub use schema_repo::SchemaRepo;
