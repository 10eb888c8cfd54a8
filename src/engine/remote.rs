//! HTTP client engine.
//!
//! Proxies analysis to a morphology service that exposes the same shapes
//! over HTTP: `GET /version`, `POST /token`, `POST /text`. A non-success
//! status or malformed body is an engine failure and takes the bridge down,
//! same as a local engine crash.

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::engine::{Engine, TextAnalysis};

#[derive(Deserialize)]
struct VersionBody {
    version: String,
}

#[derive(Deserialize)]
struct TokenBody {
    tag: Value,
}

#[derive(Deserialize)]
struct TextBody {
    tokens_count: usize,
    unique_tokens_count: usize,
    #[serde(rename = "sentenes_count")]
    sentences_count: usize,
    sentences: Vec<Value>,
}

pub struct RemoteEngine {
    client: reqwest::Client,
    endpoint: String,
    version: String,
}

impl RemoteEngine {
    /// Connect to a service at `endpoint` (no trailing slash) and fetch its
    /// version once; the bridge reports that version for its lifetime.
    pub async fn connect(endpoint: &str) -> Result<Self> {
        crate::engine::validate_entry_points()?;
        let client = reqwest::Client::new();
        let endpoint = endpoint.trim_end_matches('/').to_string();
        let body: VersionBody = client
            .get(format!("{endpoint}/version"))
            .send()
            .await
            .context("failed to reach morphology service")?
            .error_for_status()
            .context("morphology service rejected version request")?
            .json()
            .await
            .context("malformed version response")?;
        Ok(Self {
            client,
            endpoint,
            version: body.version,
        })
    }
}

#[async_trait]
impl Engine for RemoteEngine {
    fn version(&self) -> &str {
        &self.version
    }

    async fn analyse(&self, token: &str) -> Result<Value> {
        let body: TokenBody = self
            .client
            .post(format!("{}/token", self.endpoint))
            .json(&json!({ "token": token }))
            .send()
            .await
            .context("token request failed")?
            .error_for_status()
            .context("morphology service rejected token request")?
            .json()
            .await
            .context("malformed token response")?;
        Ok(body.tag)
    }

    async fn analyse_text(&self, text: &str) -> Result<TextAnalysis> {
        let body: TextBody = self
            .client
            .post(format!("{}/text", self.endpoint))
            .json(&json!({ "text": text }))
            .send()
            .await
            .context("text request failed")?
            .error_for_status()
            .context("morphology service rejected text request")?
            .json()
            .await
            .context("malformed text response")?;
        Ok(TextAnalysis {
            tokens_count: body.tokens_count,
            unique_tokens_count: body.unique_tokens_count,
            sentences_count: body.sentences_count,
            sentences: body.sentences,
        })
    }
}
