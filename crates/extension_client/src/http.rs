//! Extensions served over HTTP.

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Url;

use crate::error::{ExecutionError, ExtensionError, TransportError};

/// Splits a bearer token out of the URL userinfo.
///
/// Only a username without a password is treated as a token; the request URL
/// never carries userinfo.
fn split_credentials(origin: &Url) -> (Url, Option<String>) {
    let mut url = origin.clone();
    let token = (!origin.username().is_empty() && origin.password().is_none())
        .then(|| origin.username().to_string());
    let _ = url.set_username("");
    let _ = url.set_password(None);
    (url, token)
}

fn with_token(request: RequestBuilder, token: Option<String>) -> RequestBuilder {
    match token {
        Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
        None => request,
    }
}

pub(crate) fn manifest_request(client: &Client, origin: &Url) -> RequestBuilder {
    let (url, token) = split_credentials(origin);
    with_token(client.get(url), token)
}

/// `POST {origin}/{name}` with the JSON payload as body.
pub(crate) fn command_request(
    client: &Client,
    origin: &Url,
    name: &str,
    payload: Vec<u8>,
) -> RequestBuilder {
    let (mut url, token) = split_credentials(origin);
    let path = format!(
        "{}/{}",
        url.path().trim_end_matches('/'),
        name.trim_start_matches('/')
    );
    url.set_path(&path);
    with_token(
        client
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .body(payload),
        token,
    )
}

pub(crate) fn send(request: RequestBuilder) -> Result<Vec<u8>, ExtensionError> {
    let response = request.send().map_err(TransportError::Http)?;
    let status = response.status();
    if !status.is_success() {
        tracing::debug!(%status, "extension request failed");
        return Err(ExecutionError::HttpStatus {
            status: status.as_u16(),
        }
        .into());
    }
    let body = response.bytes().map_err(TransportError::Http)?;
    Ok(body.to_vec())
}
