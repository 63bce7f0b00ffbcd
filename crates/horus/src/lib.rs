//! HTTP client for the Horus media web service.
//!
//! Covers the two calls the bridge needs: a reachability handshake against
//! the service root, and spherical image renders of individual frames.

pub mod api;
pub mod payload;

pub use api::{HorusApiError, HorusClient};
