use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use log::{info, warn};
use serde::Deserialize;

use crate::app_config::Config;
use crate::errors::TranslationError;
use crate::segment_store::escape_line_breaks;

/// One reviewed dictionary entry
#[derive(Debug, Deserialize)]
struct DictionaryEntry {
    /// The reviewed target-language text
    english: String,
}

/// Offline backend backed by per-document JSON glossaries.
///
/// Each document gets a dictionary file named after its line file stem,
/// mapping segment id to a reviewed translation. A record with no entry is
/// a hard error; reviewed dictionaries are complete by definition, so a
/// gap means the dictionary is stale.
#[derive(Debug)]
pub struct DictionaryTranslator {
    dictionary_dir: PathBuf,
}

impl DictionaryTranslator {
    pub fn from_config(config: &Config) -> Self {
        Self {
            dictionary_dir: config.translation.dictionary_dir.clone(),
        }
    }

    fn dictionary_path(&self, input: &Path) -> PathBuf {
        let stem = crate::file_utils::FileManager::file_stem(input);
        self.dictionary_dir.join(format!("{}.json", stem))
    }
}

#[async_trait]
impl super::Translator for DictionaryTranslator {
    fn name(&self) -> &'static str {
        "dictionary"
    }

    async fn translate(&self, input: &Path, output: &Path) -> Result<(), TranslationError> {
        let content = std::fs::read_to_string(input)?;
        let (records, malformed) = crate::segment_store::parse_translation_lines(&content);
        if malformed > 0 {
            warn!("{} malformed line(s) ignored in {}", malformed, input.display());
        }

        let dict_path = self.dictionary_path(input);
        let dictionary: BTreeMap<u32, DictionaryEntry> = if dict_path.is_file() {
            let raw = std::fs::read_to_string(&dict_path)?;
            serde_json::from_str(&raw)
                .map_err(|e| TranslationError::RequestFailed(format!(
                    "invalid dictionary {}: {}",
                    dict_path.display(),
                    e
                )))?
        } else {
            warn!(
                "no dictionary at {}, keeping source text",
                dict_path.display()
            );
            BTreeMap::new()
        };

        let mut out = String::new();
        for (id, body) in &records {
            let text = if dict_path.is_file() {
                match dictionary.get(id) {
                    Some(entry) => entry.english.as_str(),
                    None => {
                        return Err(TranslationError::MissingDictionaryEntry {
                            id: *id,
                            path: dict_path,
                        })
                    }
                }
            } else {
                body.as_str()
            };
            out.push_str(&format!("@({}):{}\n", id, escape_line_breaks(text)));
        }
        std::fs::write(output, out)?;
        info!(
            "dictionary pass wrote {} record(s) to {}",
            records.len(),
            output.display()
        );
        Ok(())
    }
}
