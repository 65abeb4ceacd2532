//! gradtrack_server: REST surface of the graduation tracker.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
