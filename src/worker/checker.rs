//! Grammar checker boundary
//!
//! The checker is an external service; workers only see the
//! [`GrammarChecker`] trait. [`LanguageToolChecker`] talks to a
//! LanguageTool server over its `/v2/check` HTTP API.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// A single grammar or spelling match reported by the checker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GrammarMatch {
    pub message: String,
    pub sentence: String,
    /// The offending span of the checked text
    pub matched_text: String,
    /// Suggested replacements, best first
    pub replacements: Vec<String>,
}

#[derive(Debug, Error)]
pub enum CheckerError {
    #[error("Checker request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Checker returned HTTP {0}")]
    Status(u16),

    #[error("Invalid checker endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Checks a piece of plain text in a given language
#[async_trait]
pub trait GrammarChecker: Send + Sync {
    async fn check(&self, text: &str, language: &str) -> Result<Vec<GrammarMatch>, CheckerError>;
}

/// Client for a LanguageTool HTTP server
pub struct LanguageToolChecker {
    client: Client,
    endpoint: Url,
}

impl LanguageToolChecker {
    pub fn new(client: Client, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    fn check_url(&self) -> Result<Url, url::ParseError> {
        let mut base = self.endpoint.clone();
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        base.join("v2/check")
    }
}

#[derive(Debug, Deserialize)]
struct CheckResponse {
    #[serde(default)]
    matches: Vec<RawMatch>,
}

#[derive(Debug, Deserialize)]
struct RawMatch {
    #[serde(default)]
    message: String,
    #[serde(default)]
    sentence: Option<String>,
    #[serde(default)]
    context: Option<RawContext>,
    offset: usize,
    length: usize,
    #[serde(default)]
    replacements: Vec<RawReplacement>,
}

#[derive(Debug, Deserialize)]
struct RawContext {
    text: String,
}

#[derive(Debug, Deserialize)]
struct RawReplacement {
    value: String,
}

#[async_trait]
impl GrammarChecker for LanguageToolChecker {
    async fn check(&self, text: &str, language: &str) -> Result<Vec<GrammarMatch>, CheckerError> {
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        let language = normalize_language(language);
        let response = self
            .client
            .post(self.check_url()?)
            .form(&[("text", text), ("language", language.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(CheckerError::Status(status.as_u16()));
        }

        let body: CheckResponse = response.json().await?;

        Ok(body
            .matches
            .into_iter()
            .map(|raw| GrammarMatch {
                matched_text: utf16_slice(text, raw.offset, raw.length),
                sentence: raw
                    .sentence
                    .or_else(|| raw.context.map(|c| c.text))
                    .unwrap_or_default(),
                message: raw.message,
                replacements: raw.replacements.into_iter().map(|r| r.value).collect(),
            })
            .collect())
    }
}

/// Normalizes a language tag to the casing LanguageTool expects
///
/// `en-us` becomes `en-US`; tags without a region are only lowercased.
pub fn normalize_language(language: &str) -> String {
    let language = language.trim();
    match language.split_once(['-', '_']) {
        Some((lang, region)) if region.len() == 2 => {
            format!("{}-{}", lang.to_ascii_lowercase(), region.to_ascii_uppercase())
        }
        Some((lang, rest)) => format!("{}-{}", lang.to_ascii_lowercase(), rest),
        None => language.to_ascii_lowercase(),
    }
}

/// LanguageTool reports offsets in UTF-16 code units
fn utf16_slice(text: &str, offset: usize, length: usize) -> String {
    let units: Vec<u16> = text.encode_utf16().collect();
    let end = offset.saturating_add(length).min(units.len());
    let start = offset.min(end);
    String::from_utf16_lossy(&units[start..end])
}
