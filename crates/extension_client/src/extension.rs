use std::collections::BTreeMap;
use std::process::Command;
use std::sync::Arc;

use sunbeam_protocol::{CommandSpec, InputSpec, Manifest, ParamValue, Payload};

use crate::client::ExtensionClient;
use crate::error::ExtensionError;
use crate::file;
use crate::origin::Origin;

/// Env var carrying the payload for commands that own the terminal.
pub const PAYLOAD_ENV: &str = "SUNBEAM_PAYLOAD";

/// A loaded extension: where it lives, what it offers and its preferences.
#[derive(Debug, Clone)]
pub struct Extension {
    pub alias: String,
    pub origin: Origin,
    pub manifest: Manifest,
    /// Stored values layered over the manifest defaults.
    pub preferences: BTreeMap<String, ParamValue>,
    client: Arc<ExtensionClient>,
}

impl Extension {
    pub fn load(
        client: Arc<ExtensionClient>,
        alias: impl Into<String>,
        origin: Origin,
        stored_preferences: BTreeMap<String, ParamValue>,
    ) -> Result<Self, ExtensionError> {
        let manifest = client.load_manifest(&origin)?;
        Ok(Self::new(client, alias, origin, manifest, stored_preferences))
    }

    pub fn new(
        client: Arc<ExtensionClient>,
        alias: impl Into<String>,
        origin: Origin,
        manifest: Manifest,
        stored_preferences: BTreeMap<String, ParamValue>,
    ) -> Self {
        let mut preferences: BTreeMap<String, ParamValue> = manifest
            .preferences
            .iter()
            .filter_map(|spec| Some((spec.name.clone(), spec.default.clone()?)))
            .collect();
        preferences.extend(stored_preferences);
        Self {
            alias: alias.into(),
            origin,
            manifest,
            preferences,
            client,
        }
    }

    pub fn command(&self, name: &str) -> Result<&CommandSpec, ExtensionError> {
        self.manifest
            .command(name)
            .ok_or_else(|| ExtensionError::UnknownCommand {
                extension: self.alias.clone(),
                command: name.to_string(),
            })
    }

    /// Required preferences without a value.
    #[must_use]
    pub fn missing_preferences(&self) -> Vec<&InputSpec> {
        self.manifest
            .preferences
            .iter()
            .filter(|spec| spec.required && !self.preferences.contains_key(&spec.name))
            .collect()
    }

    pub fn set_preferences(&mut self, preferences: BTreeMap<String, ParamValue>) {
        self.preferences = preferences;
    }

    /// Builds the payload for `command`. Defaults fill unset optional params;
    /// required params must already be bound.
    pub fn payload(
        &self,
        command: &str,
        params: &BTreeMap<String, ParamValue>,
        query: Option<&str>,
    ) -> Result<Payload, ExtensionError> {
        let spec = self.command(command)?;
        let mut bound = params.clone();
        let mut missing = Vec::new();
        for param in &spec.params {
            if bound.contains_key(&param.name) {
                continue;
            }
            if param.required {
                missing.push(param.name.clone());
            } else if let Some(default) = &param.default {
                bound.insert(param.name.clone(), default.clone());
            }
        }
        if !missing.is_empty() {
            return Err(ExtensionError::MissingParams { names: missing });
        }

        let cwd = std::env::current_dir()
            .map(|path| path.display().to_string())
            .unwrap_or_default();
        Ok(Payload {
            command: command.to_string(),
            params: bound,
            preferences: self.preferences.clone(),
            query: query.map(str::to_string),
            cwd,
        })
    }

    /// Runs `command` and returns its raw output.
    pub fn run(
        &self,
        command: &str,
        params: &BTreeMap<String, ParamValue>,
        query: Option<&str>,
    ) -> Result<Vec<u8>, ExtensionError> {
        let payload = self.payload(command, params, query)?;
        self.client.run_command(&self.origin, command, &payload)
    }

    /// Process for a command that takes over the terminal. The payload travels
    /// in [`PAYLOAD_ENV`] since stdin belongs to the user.
    pub fn tty_command(
        &self,
        command: &str,
        params: &BTreeMap<String, ParamValue>,
    ) -> Result<Command, ExtensionError> {
        let payload = self.payload(command, params, None)?;
        let Origin::File(entrypoint) = &self.origin else {
            return Err(ExtensionError::Unsupported(format!(
                "command `{command}` needs a terminal and cannot run on a remote extension"
            )));
        };
        let encoded = serde_json::to_string(&payload).map_err(|error| {
            ExtensionError::Unsupported(format!("failed to encode payload: {error}"))
        })?;
        let mut process = file::command(entrypoint, &[command]);
        process.env(PAYLOAD_ENV, encoded);
        Ok(process)
    }

    pub fn client(&self) -> &Arc<ExtensionClient> {
        &self.client
    }
}
