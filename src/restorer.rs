use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::path::Path;

use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::errors::RestoreError;
use crate::segment_store::parse_translation_lines;

// @module: Placeholder substitution and post-pass rewrites

static PLACEHOLDER_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"@PLACEHOLDER\((\d+)\)@").unwrap());

/// One literal find/replace applied to the document after all placeholders
/// are substituted
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostPassRule {
    /// Literal text to search for
    pub find: String,
    /// Literal replacement
    pub replace: String,
}

impl PostPassRule {
    /// The default rewrite set: flip the pre-title language toggle so the
    /// re-encoded document renders its English variant
    pub fn defaults() -> Vec<PostPassRule> {
        vec![PostPassRule {
            find: "\\germantrue".to_string(),
            replace: "\\germanfalse".to_string(),
        }]
    }
}

/// Result of one restoration pass
#[derive(Debug)]
pub struct RestoreOutcome {
    /// The restored XML payload
    pub xml: String,
    /// Placeholder ids still present because no translation covered them
    pub unfilled_ids: Vec<u32>,
    /// Translations substituted
    pub applied: usize,
    /// Translations whose token never appeared in the structure
    pub ignored: usize,
}

impl RestoreOutcome {
    /// True when every placeholder was filled
    pub fn is_complete(&self) -> bool {
        self.unfilled_ids.is_empty()
    }
}

/// Substitute translations into a placeholder-bearing structure document
/// and apply the post-pass rewrites.
///
/// Substitution is literal text replacement per token. Tokens end with a
/// closing `)@`, so no token is a prefix of another and the replacement
/// order cannot change the result. Ids with no translation are left in
/// place and reported, never failed.
pub fn restore(
    structure: &str,
    translations: &BTreeMap<u32, String>,
    post_pass: &[PostPassRule],
) -> RestoreOutcome {
    let mut xml = structure.to_string();
    let mut applied = 0;
    let mut ignored = 0;

    for (id, text) in translations {
        let token = crate::segment_store::placeholder_token(*id);
        if xml.contains(&token) {
            xml = xml.replace(&token, text);
            applied += 1;
        } else {
            debug!("translation {} has no matching placeholder", id);
            ignored += 1;
        }
    }

    let unfilled: BTreeSet<u32> = PLACEHOLDER_TOKEN
        .captures_iter(&xml)
        .filter_map(|caps| caps[1].parse().ok())
        .collect();
    let unfilled_ids: Vec<u32> = unfilled.into_iter().collect();
    if !unfilled_ids.is_empty() {
        warn!(
            "partial restoration: {} placeholder(s) left unfilled: {:?}",
            unfilled_ids.len(),
            unfilled_ids
        );
    }

    for rule in post_pass {
        if xml.contains(&rule.find) {
            debug!("post-pass rewrite: {:?} -> {:?}", rule.find, rule.replace);
            xml = xml.replace(&rule.find, &rule.replace);
        }
    }

    RestoreOutcome {
        xml,
        unfilled_ids,
        applied,
        ignored,
    }
}

/// File-level entry point: read the structure file and the translated line
/// file, substitute, and return the outcome.
pub fn restore_files(
    structure_path: &Path,
    lines_path: &Path,
    post_pass: &[PostPassRule],
) -> Result<RestoreOutcome, RestoreError> {
    let structure = read_artifact(structure_path)?;
    let lines = read_artifact(lines_path)?;
    let (translations, malformed) = parse_translation_lines(&lines);
    if malformed > 0 {
        warn!(
            "{} malformed line(s) skipped in {}",
            malformed,
            lines_path.display()
        );
    }
    Ok(restore(&structure, &translations, post_pass))
}

fn read_artifact(path: &Path) -> Result<String, RestoreError> {
    if !path.is_file() {
        return Err(RestoreError::MissingArtifact(path.to_path_buf()));
    }
    std::fs::read_to_string(path).map_err(|source| RestoreError::Io {
        path: path.to_path_buf(),
        source,
    })
}
