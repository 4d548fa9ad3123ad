use std::io;

use extension_client::ExtensionError;
use sunbeam_protocol::SchemaError;
use sunbeam_store::StoreError;
use thiserror::Error;

/// Failures that stop the launcher before or while it owns the terminal.
#[derive(Debug, Error)]
pub enum LauncherError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("failed to load extension `{alias}`: {source}")]
    Extension {
        alias: String,
        #[source]
        source: ExtensionError,
    },

    #[error("failed to create the extension client: {0}")]
    Client(#[source] ExtensionError),

    #[error("no extension named `{0}`")]
    UnknownExtension(String),

    #[error("invalid param `{0}`, expected KEY=VALUE")]
    InvalidParam(String),

    #[error("terminal error: {0}")]
    Terminal(#[from] io::Error),
}
