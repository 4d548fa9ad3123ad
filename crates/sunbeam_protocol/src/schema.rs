//! Embedded JSON Schemas (draft 7) for everything an extension emits.

use std::collections::HashMap;

use jsonschema::Validator;
use serde_json::Value;

use crate::error::{ProtocolError, SchemaError, SchemaKind};

const DEFINITIONS: &str = include_str!("../schemas/definitions.json");
const MANIFEST_SCHEMA: &str = include_str!("../schemas/manifest.schema.json");
const PAGE_SCHEMA: &str = include_str!("../schemas/page.schema.json");
const COMMAND_SCHEMA: &str = include_str!("../schemas/command.schema.json");

/// Compiled validators for the manifest, page and command documents.
///
/// Built once at startup and shared by reference.
pub struct SchemaValidator {
    validators: HashMap<SchemaKind, Validator>,
}

impl std::fmt::Debug for SchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaValidator").finish_non_exhaustive()
    }
}

impl SchemaValidator {
    pub fn new() -> Result<Self, SchemaError> {
        let definitions: Value =
            serde_json::from_str(DEFINITIONS).map_err(|error| SchemaError {
                kind: SchemaKind::Manifest,
                message: format!("shared definitions: {error}"),
            })?;

        let mut validators = HashMap::new();
        for kind in SchemaKind::ALL {
            let mut schema: Value =
                serde_json::from_str(source_for(kind)).map_err(|error| SchemaError {
                    kind,
                    message: error.to_string(),
                })?;
            if let Value::Object(map) = &mut schema {
                map.insert("definitions".to_string(), definitions.clone());
            }
            let validator = jsonschema::draft7::new(&schema).map_err(|error| SchemaError {
                kind,
                message: error.to_string(),
            })?;
            validators.insert(kind, validator);
        }
        Ok(Self { validators })
    }

    /// Parses `bytes` and checks the result against the `kind` schema.
    ///
    /// On a violation the error carries the JSON pointer of the failing
    /// instance location, with `/` for the document root.
    pub fn validate(&self, kind: SchemaKind, bytes: &[u8]) -> Result<Value, ProtocolError> {
        let value: Value = serde_json::from_slice(bytes).map_err(ProtocolError::Json)?;
        self.validate_value(kind, &value)?;
        Ok(value)
    }

    pub fn validate_value(&self, kind: SchemaKind, value: &Value) -> Result<(), ProtocolError> {
        let Some(validator) = self.validators.get(&kind) else {
            return Ok(());
        };
        let Some(error) = validator.iter_errors(value).next() else {
            return Ok(());
        };
        let path = error.instance_path().as_str().to_string();
        Err(ProtocolError::Schema {
            kind,
            path: if path.is_empty() { "/".to_string() } else { path },
            message: error.to_string(),
        })
    }
}

fn source_for(kind: SchemaKind) -> &'static str {
    match kind {
        SchemaKind::Manifest => MANIFEST_SCHEMA,
        SchemaKind::Page => PAGE_SCHEMA,
        SchemaKind::Command => COMMAND_SCHEMA,
    }
}
