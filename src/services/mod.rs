/*!
 * Translation service implementations.
 *
 * This module contains the backends the pipeline can delegate the line
 * file to:
 * - DeepL: automated machine translation over the DeepL REST API
 * - Dictionary: offline lookup against reviewed per-document glossaries
 * - Null: identity pass-through for pipeline verification
 *
 * Every backend honours the same contract: consume a line file of
 * `@(<id>):<text>` records, produce a line file with the same id set, and
 * leave the record prefixes untouched.
 */

use std::fmt::Debug;
use std::path::Path;

use async_trait::async_trait;

use crate::app_config::{Config, TranslationService};
use crate::errors::TranslationError;

pub mod deepl;
pub mod dictionary;
pub mod null;

/// Common trait for all translation backends.
///
/// A backend transforms one line file into another; it never sees the
/// structure document and cannot affect restoration beyond the record
/// bodies it returns.
#[async_trait]
pub trait Translator: Send + Sync + Debug {
    /// Human-readable backend name for logs and summaries
    fn name(&self) -> &'static str;

    /// Translate the line file at `input` into a line file at `output`
    async fn translate(&self, input: &Path, output: &Path) -> Result<(), TranslationError>;
}

/// Build the backend selected by the configuration
pub fn create_translator(config: &Config) -> anyhow::Result<Box<dyn Translator>> {
    match config.translation.service {
        TranslationService::Automated => Ok(Box::new(deepl::DeepLTranslator::from_config(config)?)),
        TranslationService::Dictionary => {
            Ok(Box::new(dictionary::DictionaryTranslator::from_config(config)))
        }
        TranslationService::Null => Ok(Box::new(null::NullTranslator)),
    }
}
