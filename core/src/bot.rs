//! Executing client: `BotClient` plus a `Transport`.
//!
//! # Design
//! Each call is one stateless transaction: build the request, run it through
//! the transport, decode the envelope. Nothing here inspects `ok`, retries, or
//! acts on `retry_after`/`migrate_to_chat_id`; those belong to the caller.
//! Each remote method gets a typed function returning its concrete envelope;
//! `invoke` stays available for methods without one.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::client::{to_params, BotClient};
use crate::config::Configuration;
use crate::envelope::Envelope;
use crate::error::ClientError;
use crate::methods::{self, GetFile, GetUpdates, Params, SendMessage};
use crate::transport::{Transport, UreqTransport};
use crate::types::{File, Message, Update, User};

/// Bot API client that performs the HTTP round-trip itself.
#[derive(Debug, Clone)]
pub struct Bot<T = UreqTransport> {
    client: BotClient,
    transport: T,
}

impl Bot<UreqTransport> {
    /// Bot for the public Bot API host.
    pub fn new(token: &str) -> Result<Self, ClientError> {
        Ok(Self::with_transport(BotClient::new(token)?, UreqTransport::new()))
    }

    /// Bot for a self-hosted Bot API server or a test double.
    pub fn with_base_url(base_url: &str, token: &str) -> Result<Self, ClientError> {
        Ok(Self::with_transport(
            BotClient::with_base_url(base_url, token)?,
            UreqTransport::new(),
        ))
    }
}

impl<T: Transport> Bot<T> {
    pub fn with_transport(client: BotClient, transport: T) -> Self {
        Self { client, transport }
    }

    /// Replace the client-level configuration.
    pub fn with_config(mut self, config: Configuration) -> Self {
        self.client = self.client.with_config(config);
        self
    }

    pub fn client(&self) -> &BotClient {
        &self.client
    }

    /// Call `method` and decode its result as `R`.
    ///
    /// Only transport and decoding failures are errors; a rejected call comes
    /// back as `Ok` with `ok == false`.
    pub fn invoke<R: DeserializeOwned>(
        &self,
        method: &str,
        params: &Params,
        config: &Configuration,
    ) -> Result<Envelope<R>, ClientError> {
        let request = self.client.build_call(method, params, config)?;
        let response = self.transport.execute(request).map_err(|source| {
            warn!(method, error = %source, "Bot API call failed");
            ClientError::Transport {
                method: method.to_string(),
                source,
            }
        })?;
        debug!(method, status = response.status, "Bot API call completed");
        self.client.parse_envelope(response)
    }

    /// `invoke` with a typed parameter record.
    pub fn invoke_with<P, R>(
        &self,
        method: &str,
        params: &P,
        config: &Configuration,
    ) -> Result<Envelope<R>, ClientError>
    where
        P: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        self.invoke(method, &to_params(params)?, config)
    }

    /// `invoke` for methods whose result is a JSON object of arbitrary keys.
    pub fn invoke_map(
        &self,
        method: &str,
        params: &Params,
        config: &Configuration,
    ) -> Result<Envelope<Params>, ClientError> {
        self.invoke(method, params, config)
    }

    /// `invoke` for methods whose result is a list.
    pub fn invoke_list<R: DeserializeOwned>(
        &self,
        method: &str,
        params: &Params,
        config: &Configuration,
    ) -> Result<Envelope<Vec<R>>, ClientError> {
        self.invoke(method, params, config)
    }

    /// Identify the bot. Useful to check that the token works.
    pub fn get_me(&self) -> Result<Envelope<User>, ClientError> {
        self.invoke(methods::GET_ME, &Params::new(), &Configuration::empty())
    }

    /// Fetch pending updates with a single request.
    pub fn get_updates(&self, params: &GetUpdates) -> Result<Envelope<Vec<Update>>, ClientError> {
        self.invoke_with(methods::GET_UPDATES, params, &Configuration::empty())
    }

    /// Prepare a file for download and return its `file_path`.
    pub fn get_file(&self, file_id: &str) -> Result<Envelope<File>, ClientError> {
        let params = GetFile {
            file_id: file_id.to_string(),
        };
        self.invoke_with(methods::GET_FILE, &params, &Configuration::empty())
    }

    pub fn send_message(&self, params: &SendMessage) -> Result<Envelope<Message>, ClientError> {
        self.invoke_with(methods::SEND_MESSAGE, params, &Configuration::empty())
    }

    /// Download a file's raw content. `file_path` comes from `get_file`.
    pub fn download_file(&self, file_path: &str) -> Result<Vec<u8>, ClientError> {
        let request = self.client.build_download_file(file_path)?;
        let response = self.transport.execute(request).map_err(|source| {
            warn!(error = %source, "file download failed");
            ClientError::Transport {
                method: "downloadFile".to_string(),
                source,
            }
        })?;
        self.client.parse_download_file(response)
    }
}
