use std::fmt;

use thiserror::Error;

/// Which embedded schema a document is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SchemaKind {
    Manifest,
    Page,
    Command,
}

impl SchemaKind {
    pub const ALL: [SchemaKind; 3] = [SchemaKind::Manifest, SchemaKind::Page, SchemaKind::Command];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Manifest => "manifest",
            Self::Page => "page",
            Self::Command => "command",
        }
    }
}

impl fmt::Display for SchemaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An embedded schema failed to compile.
#[derive(Debug, Error)]
#[error("embedded {kind} schema is invalid: {message}")]
pub struct SchemaError {
    pub kind: SchemaKind,
    pub message: String,
}

/// A document an extension produced could not be turned into typed values.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("invalid JSON: {0}")]
    Json(#[source] serde_json::Error),

    #[error("invalid {kind}: `{path}` is not valid: {message}")]
    Schema {
        kind: SchemaKind,
        path: String,
        message: String,
    },

    #[error("unknown {kind} type `{found}`")]
    UnknownType { kind: SchemaKind, found: String },

    #[error("failed to decode {kind}: {source}")]
    Decode {
        kind: SchemaKind,
        #[source]
        source: serde_json::Error,
    },
}

impl ProtocolError {
    #[must_use]
    pub fn decode(kind: SchemaKind, source: serde_json::Error) -> Self {
        Self::Decode { kind, source }
    }
}
