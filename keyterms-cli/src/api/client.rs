//! HTTP client for the keyterms transform, ISO and emote endpoints

use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;

use super::config::ClientConfig;
use super::models::{Emote, EmoteToken, IsoKind, IsoRecord, ScriptProfile};
use crate::catalog::{KeySource, TransformKey};
use crate::services::{ReferenceBackend, TransformBackend};

const TRANSFORM_KEYS_PATH: &str = "transform/transform_keys";
const TRANSFORM_PATH: &str = "transform/transform";
const PROFILE_TEXT_PATH: &str = "transform/profile_text";
const ISO_PATH: &str = "iso";
const EMOTE_TOKENIZE_PATH: &str = "emote/tokenize";
const EMOTE_DEFINE_PATH: &str = "emote/define";

/// API client for the keyterms REST service
#[derive(Debug, Clone)]
pub struct KeytermsClient {
    client: Client,
    config: ClientConfig,
}

impl KeytermsClient {
    /// Creates a new API client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Fetches every transformation key the service offers.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn transform_keys(&self) -> Result<Vec<TransformKey>> {
        let url = self.config.endpoint(TRANSFORM_KEYS_PATH);
        debug!("GET {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Failed to send transform key request")?;

        parse_json(response).await
    }

    /// Applies the transformation identified by `key` to `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the service reports an error.
    pub async fn transform(&self, text: &str, key: &TransformKey) -> Result<String> {
        let url = self.config.endpoint(TRANSFORM_PATH);
        debug!("POST {} key={}", url, key.text);

        let response = self
            .client
            .post(&url)
            .query(&[("key", key.text.as_str())])
            .body(text.to_string())
            .send()
            .await
            .context("Failed to send transform request")?;

        let response = check_status(response).await?;
        response
            .text()
            .await
            .context("Failed to read transformed text")
    }

    /// Profiles the writing scripts used in `text`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn profile_text(&self, text: &str) -> Result<ScriptProfile> {
        let url = self.config.endpoint(PROFILE_TEXT_PATH);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .body(text.to_string())
            .send()
            .await
            .context("Failed to send profile request")?;

        parse_json(response).await
    }

    /// Looks up ISO standard records of `kind` matching `query`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn iso_lookup(&self, kind: IsoKind, query: &str) -> Result<Vec<IsoRecord>> {
        let url = self.config.endpoint(&format!("{}/{}", ISO_PATH, kind.as_str()));
        debug!("GET {} query={}", url, query);

        let response = self
            .client
            .get(&url)
            .query(&[("query", query)])
            .send()
            .await
            .context("Failed to send ISO lookup request")?;

        parse_json(response).await
    }

    /// Splits `text` into emoji, emoticon and plain text tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn emote_tokenize(&self, text: &str) -> Result<Vec<EmoteToken>> {
        let url = self.config.endpoint(EMOTE_TOKENIZE_PATH);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .header(CONTENT_TYPE, "application/json")
            .body(text.to_string())
            .send()
            .await
            .context("Failed to send tokenize request")?;

        parse_json(response).await
    }

    /// Fetches the emoji or emoticon definition for `text`, if the service
    /// knows one.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn emote_define(&self, text: &str) -> Result<Option<Emote>> {
        let url = self.config.endpoint(EMOTE_DEFINE_PATH);
        debug!("GET {} text={}", url, text);

        let response = self
            .client
            .get(&url)
            .query(&[("text", text)])
            .send()
            .await
            .context("Failed to send emote definition request")?;

        // unknown emotes come back as 204 with no body
        let body = check_status(response)
            .await?
            .text()
            .await
            .context("Failed to read emote definition")?;
        if body.trim().is_empty() {
            return Ok(None);
        }
        serde_json::from_str(&body).context("Failed to parse emote definition")
    }
}

#[async_trait]
impl KeySource for KeytermsClient {
    async fn fetch_keys(&self) -> Result<Vec<TransformKey>> {
        self.transform_keys().await
    }
}

#[async_trait]
impl TransformBackend for KeytermsClient {
    async fn transform(&self, text: &str, key: &TransformKey) -> Result<String> {
        KeytermsClient::transform(self, text, key).await
    }

    async fn profile_text(&self, text: &str) -> Result<ScriptProfile> {
        KeytermsClient::profile_text(self, text).await
    }
}

#[async_trait]
impl ReferenceBackend for KeytermsClient {
    async fn iso_lookup(&self, kind: IsoKind, query: &str) -> Result<Vec<IsoRecord>> {
        KeytermsClient::iso_lookup(self, kind, query).await
    }

    async fn emote_tokenize(&self, text: &str) -> Result<Vec<EmoteToken>> {
        KeytermsClient::emote_tokenize(self, text).await
    }

    async fn emote_define(&self, text: &str) -> Result<Option<Emote>> {
        KeytermsClient::emote_define(self, text).await
    }
}

async fn check_status(response: Response) -> Result<Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        anyhow::bail!("API error ({status}): {body}")
    }
}

async fn parse_json<T: DeserializeOwned>(response: Response) -> Result<T> {
    check_status(response)
        .await?
        .json()
        .await
        .context("Failed to parse response")
}
