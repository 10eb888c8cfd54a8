//! A deterministic engine for tests.

use anyhow::{Result, bail};
use async_trait::async_trait;
use serde_json::{Value, json};

use crate::engine::{Engine, TextAnalysis};

/// Scripted engine: tags every token `<token>+N+Sg`, whitespace-tokenizes
/// text into a single sentence, and optionally fails on demand so the
/// propagation contract can be exercised.
pub struct MockEngine {
    version: String,
    fail: bool,
}

impl MockEngine {
    pub fn new() -> Self {
        Self {
            version: "9.9.9-test".to_string(),
            fail: false,
        }
    }

    /// Every analysis call returns an error.
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::new()
        }
    }
}

impl Default for MockEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Engine for MockEngine {
    fn version(&self) -> &str {
        &self.version
    }

    async fn analyse(&self, token: &str) -> Result<Value> {
        if self.fail {
            bail!("mock engine failure on token {token:?}");
        }
        Ok(Value::String(format!("{token}+N+Sg")))
    }

    async fn analyse_text(&self, text: &str) -> Result<TextAnalysis> {
        if self.fail {
            bail!("mock engine failure on text");
        }
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let mut unique: Vec<String> = Vec::new();
        for token in &tokens {
            let lowered = token.to_lowercase();
            if !unique.contains(&lowered) {
                unique.push(lowered);
            }
        }
        let sentences = if tokens.is_empty() {
            Vec::new()
        } else {
            let pairs: Vec<Value> = tokens
                .iter()
                .map(|token| json!([token, format!("{token}+N+Sg")]))
                .collect();
            vec![Value::Array(pairs)]
        };
        Ok(TextAnalysis {
            tokens_count: tokens.len(),
            unique_tokens_count: unique.len(),
            sentences_count: sentences.len(),
            sentences,
        })
    }
}
