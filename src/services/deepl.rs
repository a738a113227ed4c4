use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use reqwest::{header, Client, StatusCode};
use serde::{Deserialize, Serialize};

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::segment_store::escape_line_breaks;

/// Maximum number of texts per API request
const MAX_BATCH_SIZE: usize = 50;

/// Maximum total characters per API request
const MAX_BATCH_CHARS: usize = 90_000;

/// Retry attempts on rate limiting before giving up
const MAX_RETRIES: u32 = 5;

/// Initial backoff, grown linearly by the same amount per retry
const RETRY_BASE: Duration = Duration::from_millis(5_000);

/// DeepL request body
#[derive(Debug, Serialize)]
struct DeepLRequest<'a> {
    /// The texts to translate, order-preserving
    text: Vec<&'a str>,
    /// Source language code
    source_lang: String,
    /// Target language code
    target_lang: String,
}

/// DeepL response body
#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

/// DeepL error body, best effort
#[derive(Debug, Deserialize, Default)]
struct DeepLErrorBody {
    #[serde(default)]
    message: String,
}

/// Client for the DeepL translation API
#[derive(Debug)]
pub struct DeepLTranslator {
    /// HTTP client for API requests
    client: Client,
    /// API key for authentication
    api_key: String,
    /// API endpoint URL
    endpoint: String,
    /// Uppercased source language for the request body
    source_lang: String,
    /// Uppercased target language for the request body
    target_lang: String,
}

impl DeepLTranslator {
    /// Build the client from the application configuration, reading the
    /// API key from the configured key file
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let key_path = &config.translation.api_key_file;
        let api_key = std::fs::read_to_string(key_path)
            .map_err(|e| {
                anyhow::anyhow!("Failed to read API key file {}: {}", key_path.display(), e)
            })?
            .trim()
            .to_string();
        if api_key.is_empty() {
            anyhow::bail!("API key file {} is empty", key_path.display());
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;

        Ok(Self {
            client,
            api_key,
            endpoint: config.translation.endpoint.clone(),
            source_lang: config.source_language.to_uppercase(),
            target_lang: config.target_language.to_uppercase(),
        })
    }

    /// Send one batch of record bodies, retrying on rate limiting with a
    /// linearly growing delay
    async fn translate_batch(&self, texts: &[&str]) -> Result<Vec<String>, TranslationError> {
        let request = DeepLRequest {
            text: texts.to_vec(),
            source_lang: self.source_lang.clone(),
            target_lang: self.target_lang.clone(),
        };

        let mut attempt = 0u32;
        loop {
            attempt += 1;
            let response = self
                .client
                .post(&self.endpoint)
                .header(
                    header::AUTHORIZATION,
                    format!("DeepL-Auth-Key {}", self.api_key),
                )
                .json(&request)
                .send()
                .await
                .map_err(|e| TranslationError::RequestFailed(e.to_string()))?;

            let status = response.status();
            if status == StatusCode::TOO_MANY_REQUESTS && attempt <= MAX_RETRIES {
                let delay = RETRY_BASE * attempt;
                warn!(
                    "rate limited, retry {}/{} in {}ms",
                    attempt,
                    MAX_RETRIES,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
                continue;
            }
            if !status.is_success() {
                let body: DeepLErrorBody = response.json().await.unwrap_or_default();
                return Err(TranslationError::ApiError {
                    status_code: status.as_u16(),
                    message: body.message,
                });
            }

            let body: DeepLResponse = response
                .json()
                .await
                .map_err(|e| TranslationError::RequestFailed(e.to_string()))?;
            if body.translations.len() != texts.len() {
                return Err(TranslationError::IncompleteResponse {
                    sent: texts.len(),
                    received: body.translations.len(),
                });
            }
            return Ok(body.translations.into_iter().map(|t| t.text).collect());
        }
    }
}

#[async_trait]
impl super::Translator for DeepLTranslator {
    fn name(&self) -> &'static str {
        "deepl"
    }

    /// Translate the record bodies of a line file, preserving the
    /// `@(<id>):` prefixes untouched.
    ///
    /// Bodies are batched under both a record-count and a character cap so
    /// no request exceeds the API limits.
    async fn translate(&self, input: &Path, output: &Path) -> Result<(), TranslationError> {
        let content = std::fs::read_to_string(input)?;
        let (records, malformed) = crate::segment_store::parse_translation_lines(&content);
        if malformed > 0 {
            warn!("{} malformed line(s) ignored in {}", malformed, input.display());
        }

        let entries: Vec<(u32, String)> = records.into_iter().collect();
        let mut translated: Vec<(u32, String)> = Vec::with_capacity(entries.len());

        let mut batch_start = 0;
        while batch_start < entries.len() {
            let mut batch_end = batch_start;
            let mut batch_chars = 0;
            while batch_end < entries.len()
                && batch_end - batch_start < MAX_BATCH_SIZE
                && batch_chars + entries[batch_end].1.len() <= MAX_BATCH_CHARS
            {
                batch_chars += entries[batch_end].1.len();
                batch_end += 1;
            }
            // A single oversized body still goes out alone
            if batch_end == batch_start {
                batch_end += 1;
            }

            let texts: Vec<&str> = entries[batch_start..batch_end]
                .iter()
                .map(|(_, body)| body.as_str())
                .collect();
            debug!(
                "sending batch of {} text(s), {} chars",
                texts.len(),
                batch_chars
            );
            let results = self.translate_batch(&texts).await?;
            for ((id, _), text) in entries[batch_start..batch_end].iter().zip(results) {
                translated.push((*id, text));
            }
            batch_start = batch_end;
        }

        let mut out = String::new();
        for (id, text) in &translated {
            out.push_str(&format!("@({}):{}\n", id, escape_line_breaks(text)));
        }
        std::fs::write(output, out)?;
        info!(
            "translated {} record(s) from {}",
            translated.len(),
            input.display()
        );
        Ok(())
    }
}
