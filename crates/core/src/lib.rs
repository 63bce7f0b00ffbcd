//! Domain logic for the Horus bridge.
//!
//! Nothing in this crate talks to a database or the network directly; the
//! catalog and the image source are reached through traits so the same
//! logic runs against PostgreSQL/Horus and against in-memory fixtures.

pub mod catalog;
pub mod config;
pub mod connection;
pub mod error;
pub mod frames;
pub mod imaging;
pub mod locator;
pub mod types;
