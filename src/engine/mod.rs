//! The analysis capability behind the bridge.
//!
//! `main.rs` constructs exactly one engine for the process lifetime and
//! injects it into the bridge, so tests can substitute [`mock::MockEngine`].

pub mod lexicon;
pub mod mock;
pub mod remote;
pub mod suffix;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

use crate::compat::{self, FullArgSpec};

/// Validate the analysis entry points through the legacy inspection call.
/// Every engine constructor runs this before first use.
pub fn validate_entry_points() -> Result<()> {
    compat::check_entry_point(
        "analyse",
        &FullArgSpec::for_method(&["token"]),
        &["self", "token"],
    )?;
    compat::check_entry_point(
        "analyse_text",
        &FullArgSpec::for_method(&["text"]),
        &["self", "text"],
    )?;
    Ok(())
}

/// Text-level analysis. `sentences` carries engine-defined per-sentence
/// results that the bridge passes through to the wire unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct TextAnalysis {
    pub tokens_count: usize,
    pub unique_tokens_count: usize,
    pub sentences_count: usize,
    pub sentences: Vec<Value>,
}

/// A morphological-analysis engine. Failures are not the bridge's to
/// recover from: they propagate and take the process down.
#[async_trait]
pub trait Engine: Send + Sync {
    /// Engine version identifier, reported in every analysis response.
    fn version(&self) -> &str;

    /// Analyse a single token, producing an engine-defined tag.
    async fn analyse(&self, token: &str) -> Result<Value>;

    /// Segment and analyse a passage of text.
    async fn analyse_text(&self, text: &str) -> Result<TextAnalysis>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compat::ensure_getargspec;

    #[test]
    fn entry_points_validate_once_the_shim_is_installed() {
        ensure_getargspec();
        assert!(validate_entry_points().is_ok());
    }
}
