//! Stateless HTTP request builder and response parser for the Bot API.
//!
//! # Design
//! `BotClient` holds the base URL, the token and the client-level
//! `Configuration`, and carries no mutable state between calls. Every call is
//! split into a `build_*` method that produces an `HttpRequest` and a `parse_*`
//! method that consumes an `HttpResponse`. `Bot` glues the two halves to a
//! `Transport`; tests and embedders can also run the round-trip themselves.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::config::Configuration;
use crate::envelope::Envelope;
use crate::error::ClientError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::methods::Params;
use crate::token::Token;

pub const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Synchronous, stateless client for the Bot API.
#[derive(Debug, Clone)]
pub struct BotClient {
    base_url: String,
    token: Token,
    config: Configuration,
}

impl BotClient {
    /// Client for the public Bot API host.
    pub fn new(token: &str) -> Result<Self, ClientError> {
        Self::with_base_url(DEFAULT_BASE_URL, token)
    }

    /// Client for a self-hosted Bot API server or a test double.
    pub fn with_base_url(base_url: &str, token: &str) -> Result<Self, ClientError> {
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: Token::new(token)?,
            config: Configuration::empty(),
        })
    }

    /// Replace the client-level configuration.
    pub fn with_config(mut self, config: Configuration) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    pub fn token(&self) -> &Token {
        &self.token
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build the request for `method`.
    ///
    /// Empty `params` produce a bodiless `GET`; otherwise a `POST` with a JSON
    /// object body. `call_config` is layered over the client configuration.
    pub fn build_call(
        &self,
        method: &str,
        params: &Params,
        call_config: &Configuration,
    ) -> Result<HttpRequest, ClientError> {
        validate_method(method)?;
        let url = format!("{}/bot{}/{method}", self.base_url, self.token.expose());

        if params.is_empty() {
            debug!(method, "building bodiless call");
            return Ok(HttpRequest {
                method: HttpMethod::Get,
                url,
                headers: Vec::new(),
                body: None,
            });
        }

        let resolved = self.config.merge(call_config).resolve();
        let body = if resolved.pretty_json {
            serde_json::to_string_pretty(params)
        } else {
            serde_json::to_string(params)
        };
        let body = body.map_err(ClientError::Serialization)?;

        debug!(method, params = params.len(), pretty = resolved.pretty_json, "building call");
        Ok(HttpRequest {
            method: HttpMethod::Post,
            url,
            headers: vec![("content-type".to_string(), "application/json".to_string())],
            body: Some(body),
        })
    }

    /// Like `build_call`, for a typed parameter record.
    pub fn build_call_with<P: Serialize + ?Sized>(
        &self,
        method: &str,
        params: &P,
        call_config: &Configuration,
    ) -> Result<HttpRequest, ClientError> {
        let params = to_params(params)?;
        self.build_call(method, &params, call_config)
    }

    /// Decode the response body as `Envelope<T>`.
    ///
    /// The HTTP status is not inspected: the Bot API answers rejected calls
    /// with 4xx statuses and an `ok: false` envelope, which is returned as-is.
    pub fn parse_envelope<T: DeserializeOwned>(
        &self,
        response: HttpResponse,
    ) -> Result<Envelope<T>, ClientError> {
        let envelope: Envelope<T> =
            serde_json::from_slice(&response.body).map_err(|source| ClientError::Deserialization {
                status: response.status,
                source,
            })?;
        debug!(status = response.status, ok = envelope.ok, "parsed envelope");
        Ok(envelope)
    }

    /// Build the request that fetches a file's content.
    ///
    /// `file_path` comes from the `File` returned by `getFile`.
    pub fn build_download_file(&self, file_path: &str) -> Result<HttpRequest, ClientError> {
        let path = file_path.trim_start_matches('/');
        if path.is_empty() || path.split('/').any(|segment| segment == "..") {
            return Err(ClientError::InvalidFilePath(file_path.to_string()));
        }
        Ok(HttpRequest {
            method: HttpMethod::Get,
            url: format!("{}/file/bot{}/{path}", self.base_url, self.token.expose()),
            headers: Vec::new(),
            body: None,
        })
    }

    pub fn parse_download_file(&self, response: HttpResponse) -> Result<Vec<u8>, ClientError> {
        if !response.is_success() {
            return Err(ClientError::Download {
                status: response.status,
            });
        }
        Ok(response.body)
    }
}

/// Serialize a parameter record into the flat mapping sent on the wire.
pub fn to_params<P: Serialize + ?Sized>(params: &P) -> Result<Params, ClientError> {
    match serde_json::to_value(params).map_err(ClientError::Serialization)? {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Null => Err(ClientError::ParametersNotAnObject("null")),
        serde_json::Value::Bool(_) => Err(ClientError::ParametersNotAnObject("a boolean")),
        serde_json::Value::Number(_) => Err(ClientError::ParametersNotAnObject("a number")),
        serde_json::Value::String(_) => Err(ClientError::ParametersNotAnObject("a string")),
        serde_json::Value::Array(_) => Err(ClientError::ParametersNotAnObject("an array")),
    }
}

/// Method names are plain identifiers like `getMe`; anything else could
/// escape the URL path segment.
fn validate_method(method: &str) -> Result<(), ClientError> {
    if method.is_empty() || !method.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(ClientError::InvalidMethod(method.to_string()));
    }
    Ok(())
}
