use std::io;
use std::path::PathBuf;

use sunbeam_protocol::ProtocolError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtensionError {
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("extension `{extension}` has no command named `{command}`")]
    UnknownCommand { extension: String, command: String },

    /// Required params have no bound value. Callers collect them with a form
    /// instead of reporting an error.
    #[error("missing required params: {}", .names.join(", "))]
    MissingParams { names: Vec<String> },

    #[error("invalid origin `{origin}`: {reason}")]
    InvalidOrigin { origin: String, reason: String },

    #[error("{0}")]
    Unsupported(String),
}

impl ExtensionError {
    #[must_use]
    pub fn invalid_origin(origin: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidOrigin {
            origin: origin.into(),
            reason: reason.into(),
        }
    }
}

/// The extension ran and reported failure.
#[derive(Debug, Error)]
pub enum ExecutionError {
    #[error("{}", command_failed_message(.stderr, .code))]
    CommandFailed { stderr: String, code: Option<i32> },

    #[error("extension responded with HTTP {status}")]
    HttpStatus { status: u16 },
}

/// The extension could not be reached.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error while {operation}: {source}")]
    Io {
        operation: &'static str,
        #[source]
        source: io::Error,
    },

    #[error("request failed: {0}")]
    Http(#[source] reqwest::Error),
}

impl TransportError {
    #[must_use]
    pub fn io(operation: &'static str, source: io::Error) -> Self {
        Self::Io { operation, source }
    }
}

fn command_failed_message(stderr: &str, code: &Option<i32>) -> String {
    match (stderr.is_empty(), code) {
        (false, _) => format!("command failed: {stderr}"),
        (true, Some(code)) => format!("command exited with status {code}"),
        (true, None) => "command was terminated by a signal".to_string(),
    }
}
