use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::default::Default;
use std::path::{Path, PathBuf};

use crate::restorer::PostPassRule;

/// Application configuration module
/// This module handles the application configuration including loading,
/// validating and saving configuration settings.
/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Config {
    /// Source language code (ISO)
    #[serde(default = "default_source_language")]
    pub source_language: String,

    /// Target language code (ISO)
    #[serde(default = "default_target_language")]
    pub target_language: String,

    /// Decoder/encoder tool config
    #[serde(default)]
    pub ipe: IpeConfig,

    /// Working directory layout
    #[serde(default)]
    pub directories: DirectoryConfig,

    /// Translation backend config
    #[serde(default)]
    pub translation: TranslationConfig,

    /// Source download config
    #[serde(default)]
    pub download: DownloadConfig,

    /// Literal rewrites applied after placeholder substitution
    #[serde(default = "PostPassRule::defaults")]
    pub post_pass: Vec<PostPassRule>,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// Translation backend type
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum TranslationService {
    // @service: DeepL REST API
    #[default]
    Automated,
    // @service: Offline per-document glossaries
    Dictionary,
    // @service: Identity pass-through
    Null,
}

impl TranslationService {
    // @returns: Lowercase service identifier
    pub fn to_lowercase_string(&self) -> String {
        match self {
            Self::Automated => "automated".to_string(),
            Self::Dictionary => "dictionary".to_string(),
            Self::Null => "null".to_string(),
        }
    }
}

impl std::fmt::Display for TranslationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_lowercase_string())
    }
}

impl std::str::FromStr for TranslationService {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "automated" | "deepl" => Ok(Self::Automated),
            "dictionary" => Ok(Self::Dictionary),
            "null" | "identity" => Ok(Self::Null),
            _ => Err(anyhow!("Invalid translation service: {}", s)),
        }
    }
}

/// Decoder/encoder subprocess configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct IpeConfig {
    // @field: Decoder binary, extracts the XML payload from a container
    #[serde(default = "default_decoder")]
    pub decoder: String,

    // @field: Encoder binary, re-encodes XML into a container
    #[serde(default = "default_encoder")]
    pub encoder: String,

    // @field: Per-invocation timeout in seconds
    #[serde(default = "default_tool_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for IpeConfig {
    fn default() -> Self {
        Self {
            decoder: default_decoder(),
            encoder: default_encoder(),
            timeout_secs: default_tool_timeout_secs(),
        }
    }
}

/// Working directory layout
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DirectoryConfig {
    // @field: Where source containers live
    #[serde(default = "default_input_dir")]
    pub input: PathBuf,

    // @field: Intermediate artifacts root
    #[serde(default = "default_work_dir")]
    pub work: PathBuf,

    // @field: Where re-encoded containers are written
    #[serde(default = "default_output_dir")]
    pub output: PathBuf,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            input: default_input_dir(),
            work: default_work_dir(),
            output: default_output_dir(),
        }
    }
}

impl DirectoryConfig {
    pub fn decoded_dir(&self) -> PathBuf {
        self.work.join("decoded")
    }

    pub fn translated_dir(&self) -> PathBuf {
        self.work.join("translated")
    }

    pub fn restored_dir(&self) -> PathBuf {
        self.work.join("restored")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.work.join("logs")
    }
}

/// Translation backend configuration
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct TranslationConfig {
    // @field: Backend selector
    #[serde(default)]
    pub service: TranslationService,

    // @field: File holding the DeepL API key, one line
    #[serde(default = "default_api_key_file")]
    pub api_key_file: PathBuf,

    // @field: DeepL endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    // @field: Directory of per-document dictionary files
    #[serde(default = "default_dictionary_dir")]
    pub dictionary_dir: PathBuf,
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            service: TranslationService::default(),
            api_key_file: default_api_key_file(),
            endpoint: default_endpoint(),
            dictionary_dir: default_dictionary_dir(),
        }
    }
}

/// Source download configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct DownloadConfig {
    // @field: Index page listing the source containers
    #[serde(default)]
    pub course_url: Option<String>,
}

/// Log level for the application
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            Self::Error => log::LevelFilter::Error,
            Self::Warn => log::LevelFilter::Warn,
            Self::Info => log::LevelFilter::Info,
            Self::Debug => log::LevelFilter::Debug,
            Self::Trace => log::LevelFilter::Trace,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_language: default_source_language(),
            target_language: default_target_language(),
            ipe: IpeConfig::default(),
            directories: DirectoryConfig::default(),
            translation: TranslationConfig::default(),
            download: DownloadConfig::default(),
            post_pass: PostPassRule::defaults(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Load a configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save the configuration as pretty-printed JSON
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content =
            serde_json::to_string_pretty(self).context("Failed to serialize configuration")?;
        crate::file_utils::FileManager::write_to_file(path, &content)
    }

    /// Load a configuration file, or create one with defaults when missing
    pub fn from_file_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.is_file() {
            Self::from_file(path)
        } else {
            let config = Config::default();
            config.save_to_file(path)?;
            log::info!("created default configuration at {}", path.display());
            Ok(config)
        }
    }

    /// Validate the configuration values
    pub fn validate(&self) -> Result<()> {
        if self.source_language.trim().is_empty() {
            return Err(anyhow!("Source language cannot be empty"));
        }
        if self.target_language.trim().is_empty() {
            return Err(anyhow!("Target language cannot be empty"));
        }
        if self.ipe.decoder.trim().is_empty() {
            return Err(anyhow!("Decoder tool cannot be empty"));
        }
        if self.ipe.encoder.trim().is_empty() {
            return Err(anyhow!("Encoder tool cannot be empty"));
        }
        if self.ipe.timeout_secs == 0 {
            return Err(anyhow!("Tool timeout must be at least 1 second"));
        }
        if self.translation.service == TranslationService::Automated
            && self.translation.endpoint.trim().is_empty()
        {
            return Err(anyhow!("Translation endpoint cannot be empty"));
        }
        Ok(())
    }
}

fn default_source_language() -> String {
    "de".to_string()
}

fn default_target_language() -> String {
    "en-US".to_string()
}

fn default_decoder() -> String {
    "ipeextract".to_string()
}

fn default_encoder() -> String {
    "ipe2ipe".to_string()
}

fn default_tool_timeout_secs() -> u64 {
    120
}

fn default_input_dir() -> PathBuf {
    PathBuf::from("input")
}

fn default_work_dir() -> PathBuf {
    PathBuf::from("work")
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_api_key_file() -> PathBuf {
    PathBuf::from("deepl.key")
}

fn default_endpoint() -> String {
    "https://api-free.deepl.com/v2/translate".to_string()
}

fn default_dictionary_dir() -> PathBuf {
    PathBuf::from("dictionaries")
}
