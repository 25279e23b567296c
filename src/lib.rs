//! get-analysis-id - HTTP lookup proxy for analysis IDs
//!
//! A thin service in front of the apps API: callers POST an external ID and
//! get back the internal ID of the first analysis associated with it. Used
//! as the resource name when checking permissions.

pub mod api;
pub mod apps;
pub mod config;
pub mod error;
pub mod server;

pub use error::{Error, Result};
