//! Stream application publishing subsystem.
//!
//! # Data Flow
//! ```text
//! enriched payload
//!     → service.rs (status check, `message` extraction, failure logging)
//!     → client.rs (POST {c8_url}/_fabric/{fabric}/_api/streamapps/http/{app}/{stream})
//!     → stream platform
//! ```

pub mod client;
pub mod error;
pub mod service;

pub use client::{StreamClient, ORIGIN_HEADER};
pub use error::PublishError;
pub use service::{PublishService, Published};
