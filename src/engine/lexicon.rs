//! Dictionary-backed analysis engine.
//!
//! Reproduces the tokenisation and token-level annotations of the original
//! `py_tat_morphan` package from pre-generated markup: a TSV dictionary maps
//! token text to its analysis, everything else is classified by shape.
//! Out-of-vocabulary Cyrillic words can be handed to the naive suffix
//! analyzer instead of being reported as `NR`.

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::Mutex;

use anyhow::{Context as _, Result};
use regex::Regex;
use serde_json::{Value, json};

use crate::engine::suffix::{Analysis, SuffixAnalyzer};
use crate::engine::{Engine, TextAnalysis};

const VERSION: &str = "1.2.10-rs";

const SPLIT_PATTERN: &str =
    r#"([ .,!?\n\r\t“”„‘«»≪≫{}()\[\]:;'"+=*—_^…|/\\]|[0-9]+)"#;
const DIGITS: &str = "^[0-9]+$";
const LATIN: &str = "^[a-zA-Z]+$";
const SINGLE_CYRILLIC: &str = "^[а-эА-ЭөүһңҗҺҮӨҖҢӘЁё]$";
const NON_CYRILLIC: &str = "^[^а-яА-ЯөүһңҗәҺҮӨҖҢӘЁё]+$";

const SENTENCE_PUNCTUATION: [&str; 4] = [".", "!", "?", "…"];
const COMMA_LIKE: [&str; 7] = [",", ":", ";", "—", "–", "-", "_"];
const BRACKETS: [&str; 6] = ["(", ")", "[", "]", "{", "}"];
const QUOTES: [&str; 10] = ["“", "”", "\"", "'", "»", "«", "≪", "≫", "„", "‘"];

pub struct LexiconEngine {
    dictionary: HashMap<String, String>,
    fallback: Option<SuffixAnalyzer>,
    // Memoized analyses, invalidated whenever the dictionary changes.
    token_cache: Mutex<HashMap<String, String>>,
    text_cache: Mutex<HashMap<String, TextAnalysis>>,
    splitter: Regex,
    digits: Regex,
    latin: Regex,
    single_cyrillic: Regex,
    non_cyrillic: Regex,
}

impl LexiconEngine {
    pub fn new() -> Result<Self> {
        crate::engine::validate_entry_points()?;
        Ok(Self {
            dictionary: HashMap::new(),
            fallback: None,
            token_cache: Mutex::new(HashMap::new()),
            text_cache: Mutex::new(HashMap::new()),
            splitter: Regex::new(SPLIT_PATTERN).context("bad split pattern")?,
            digits: Regex::new(DIGITS).context("bad digits pattern")?,
            latin: Regex::new(LATIN).context("bad latin pattern")?,
            single_cyrillic: Regex::new(SINGLE_CYRILLIC).context("bad cyrillic pattern")?,
            non_cyrillic: Regex::new(NON_CYRILLIC).context("bad non-cyrillic pattern")?,
        })
    }

    /// Attach the naive suffix analyzer for out-of-vocabulary words.
    pub fn with_fallback(mut self, analyzer: SuffixAnalyzer) -> Self {
        self.fallback = Some(analyzer);
        self
    }

    /// Load a markup dictionary: one `token<TAB>analysis` per line. Earlier
    /// entries win, both within a file and across files.
    pub fn load_markup(&mut self, path: &Path) -> Result<usize> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("failed to read markup file {}", path.display()))?;
        let mut added = 0;
        for (number, line) in content.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let Some((token, analysis)) = line.split_once('\t') else {
                anyhow::bail!(
                    "invalid markup line {} in {}: {line}",
                    number + 1,
                    path.display()
                );
            };
            if !self.dictionary.contains_key(token) {
                self.dictionary
                    .insert(token.to_string(), analysis.to_string());
                added += 1;
            }
        }
        if added > 0 {
            self.clear_caches();
        }
        Ok(added)
    }

    /// Insert a single dictionary entry unless the token is already known.
    pub fn add_entry(&mut self, token: &str, analysis: &str) {
        self.dictionary
            .entry(token.to_string())
            .or_insert_with(|| analysis.to_string());
        self.clear_caches();
    }

    fn clear_caches(&self) {
        self.token_cache.lock().unwrap().clear();
        self.text_cache.lock().unwrap().clear();
    }

    fn classify(&self, token: &str) -> &'static str {
        if token.is_empty() {
            return "NR";
        }
        if self.digits.is_match(token) {
            return "Num";
        }
        if SENTENCE_PUNCTUATION.contains(&token) {
            return "Type1";
        }
        if COMMA_LIKE.contains(&token) {
            return "Type2";
        }
        if BRACKETS.contains(&token) {
            return "Type3";
        }
        if QUOTES.contains(&token) {
            return "Type4";
        }
        if self.single_cyrillic.is_match(token) {
            return "Letter";
        }
        if self.latin.is_match(token) {
            return "Latin";
        }
        if self.non_cyrillic.is_match(token) {
            return "Sign";
        }
        "NR"
    }

    fn analyse_one(&self, token: &str) -> String {
        if let Some(analysis) = self.dictionary.get(token) {
            return analysis.clone();
        }
        let class = self.classify(token);
        if class == "NR"
            && let Some(fallback) = &self.fallback
            && let Some(reading) = fallback.analyze(token).first()
        {
            return Analysis::to_hfst(reading);
        }
        class.to_string()
    }

    /// Split into tokens: separators and digit runs are tokens themselves,
    /// whitespace is discarded.
    fn tokenize(&self, text: &str) -> Vec<(String, String)> {
        let mut tokens = Vec::new();
        let mut last = 0;
        for found in self.splitter.find_iter(text) {
            if found.start() > last {
                self.push_token(&mut tokens, &text[last..found.start()]);
            }
            self.push_token(&mut tokens, found.as_str());
            last = found.end();
        }
        if last < text.len() {
            self.push_token(&mut tokens, &text[last..]);
        }
        tokens
    }

    fn push_token(&self, tokens: &mut Vec<(String, String)>, token: &str) {
        if token.is_empty() || token.chars().all(char::is_whitespace) {
            return;
        }
        tokens.push((token.to_string(), self.analyse_one(token)));
    }
}

#[async_trait::async_trait]
impl Engine for LexiconEngine {
    fn version(&self) -> &str {
        VERSION
    }

    async fn analyse(&self, token: &str) -> Result<Value> {
        if let Some(cached) = self.token_cache.lock().unwrap().get(token) {
            return Ok(Value::String(cached.clone()));
        }
        let analysis = self.analyse_one(token);
        self.token_cache
            .lock()
            .unwrap()
            .insert(token.to_string(), analysis.clone());
        Ok(Value::String(analysis))
    }

    async fn analyse_text(&self, text: &str) -> Result<TextAnalysis> {
        if let Some(cached) = self.text_cache.lock().unwrap().get(text) {
            return Ok(cached.clone());
        }
        let tokens = self.tokenize(text);

        let mut unique: Vec<String> = Vec::new();
        for (token, _) in &tokens {
            let lowered = token.to_lowercase();
            if !unique.contains(&lowered) {
                unique.push(lowered);
            }
        }

        // A sentence ends after each sentence-final punctuation token.
        let mut sentences: Vec<Value> = Vec::new();
        let mut current: Vec<Value> = Vec::new();
        for (token, analysis) in &tokens {
            current.push(json!([token, analysis]));
            if analysis == "Type1" {
                sentences.push(Value::Array(std::mem::take(&mut current)));
            }
        }
        if !current.is_empty() {
            sentences.push(Value::Array(current));
        }

        let analysis = TextAnalysis {
            tokens_count: tokens.len(),
            unique_tokens_count: unique.len(),
            sentences_count: sentences.len(),
            sentences,
        };
        self.text_cache
            .lock()
            .unwrap()
            .insert(text.to_string(), analysis.clone());
        Ok(analysis)
    }
}
