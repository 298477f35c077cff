//! Edge stream publisher library.
//!
//! Accepts SMS auth events over HTTP, tags them with a SHA-256 digest of the
//! user id, and publishes them to a Macrometa stream application.

pub mod config;
pub mod digest;
pub mod handler;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod stream;

pub use config::schema::PublisherConfig;
pub use handler::SmsEventHandler;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
