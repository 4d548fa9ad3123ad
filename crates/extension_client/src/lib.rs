//! Talks to extensions: local executables and HTTP endpoints.
//!
//! A local extension prints its manifest when run without arguments and runs
//! `entrypoint <command>` with the JSON payload on stdin. A remote extension
//! serves its manifest on `GET origin` and runs commands on
//! `POST origin/<command>`. Both return raw bytes; the caller picks the schema.

pub mod client;
pub mod config;
pub mod error;
pub mod extension;
mod file;
mod http;
pub mod origin;

pub use client::ExtensionClient;
pub use config::ClientConfig;
pub use error::{ExecutionError, ExtensionError, TransportError};
pub use extension::{Extension, PAYLOAD_ENV};
pub use file::CHILD_ENV;
pub use origin::Origin;
