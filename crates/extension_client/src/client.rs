use std::sync::Arc;

use reqwest::blocking::Client;
use sunbeam_protocol::{decode_manifest, Manifest, Payload, SchemaValidator};

use crate::config::ClientConfig;
use crate::error::{ExtensionError, TransportError};
use crate::origin::Origin;
use crate::{file, http};

/// Loads manifests and runs commands for any origin.
#[derive(Debug)]
pub struct ExtensionClient {
    http: Client,
    config: ClientConfig,
    validator: Arc<SchemaValidator>,
}

impl ExtensionClient {
    pub fn new(config: ClientConfig, validator: Arc<SchemaValidator>) -> Result<Self, ExtensionError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(TransportError::Http)?;
        Ok(Self {
            http,
            config,
            validator,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn validator(&self) -> &SchemaValidator {
        &self.validator
    }

    pub fn load_manifest(&self, origin: &Origin) -> Result<Manifest, ExtensionError> {
        let bytes = match origin {
            Origin::File(entrypoint) => file::load_manifest(entrypoint)?,
            Origin::Http(url) => http::send(http::manifest_request(&self.http, url))?,
        };
        Ok(decode_manifest(&self.validator, &bytes)?)
    }

    /// Runs `name` and returns the raw output. Decoding is left to the caller,
    /// since what the output means depends on the command mode.
    pub fn run_command(
        &self,
        origin: &Origin,
        name: &str,
        payload: &Payload,
    ) -> Result<Vec<u8>, ExtensionError> {
        let body = serde_json::to_vec(payload).map_err(|error| {
            TransportError::io("encoding the payload", std::io::Error::other(error))
        })?;
        tracing::debug!(%origin, command = name, "running extension command");
        match origin {
            Origin::File(entrypoint) => file::run_command(entrypoint, name, &body),
            Origin::Http(url) => http::send(http::command_request(&self.http, url, name, body)),
        }
    }

    /// Request that [`ExtensionClient::run_command`] would send to an HTTP
    /// origin.
    pub fn command_request(
        &self,
        origin: &reqwest::Url,
        name: &str,
        payload: &Payload,
    ) -> Result<reqwest::blocking::Request, ExtensionError> {
        let body = serde_json::to_vec(payload).map_err(|error| {
            TransportError::io("encoding the payload", std::io::Error::other(error))
        })?;
        Ok(http::command_request(&self.http, origin, name, body)
            .build()
            .map_err(TransportError::Http)?)
    }
}
