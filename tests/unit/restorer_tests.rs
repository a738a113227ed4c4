/*!
 * Tests for placeholder substitution and post-pass rewrites
 */

use std::collections::BTreeMap;

use anyhow::Result;
use ipetrans::restorer::{restore, restore_files, PostPassRule};

use crate::common;

fn translations(pairs: &[(u32, &str)]) -> BTreeMap<u32, String> {
    pairs.iter().map(|(id, t)| (*id, t.to_string())).collect()
}

/// Every token with a translation is substituted literally
#[test]
fn test_restore_withFullTranslations_shouldFillAllTokens() {
    let structure = "<ipe><text>@PLACEHOLDER(1)@</text><text>@PLACEHOLDER(2)@</text></ipe>";
    let outcome = restore(
        structure,
        &translations(&[(1, "first"), (2, "second")]),
        &[],
    );

    assert_eq!(
        outcome.xml,
        "<ipe><text>first</text><text>second</text></ipe>"
    );
    assert!(outcome.is_complete());
    assert_eq!(outcome.applied, 2);
    assert_eq!(outcome.ignored, 0);
}

/// Token ids are matched exactly; id 1 never fills id 10
#[test]
fn test_restore_withPrefixIds_shouldNotCrossMatch() {
    let structure = "<a>@PLACEHOLDER(1)@ @PLACEHOLDER(10)@</a>";
    let outcome = restore(structure, &translations(&[(1, "eins"), (10, "zehn")]), &[]);
    assert_eq!(outcome.xml, "<a>eins zehn</a>");
}

/// Missing translations leave their token in place and are reported
#[test]
fn test_restore_withMissingTranslation_shouldReportUnfilled() {
    let structure = "<a>@PLACEHOLDER(1)@ @PLACEHOLDER(2)@</a>";
    let outcome = restore(structure, &translations(&[(1, "eins")]), &[]);

    assert!(!outcome.is_complete());
    assert_eq!(outcome.unfilled_ids, vec![2]);
    assert!(outcome.xml.contains("@PLACEHOLDER(2)@"));
    assert!(!outcome.xml.contains("@PLACEHOLDER(1)@"));
}

/// Translations without a matching token are counted, not failed
#[test]
fn test_restore_withUnknownTranslation_shouldIgnoreIt() {
    let structure = "<a>@PLACEHOLDER(1)@</a>";
    let outcome = restore(structure, &translations(&[(1, "eins"), (7, "stray")]), &[]);
    assert_eq!(outcome.applied, 1);
    assert_eq!(outcome.ignored, 1);
}

/// The default post-pass flips the language toggle
#[test]
fn test_restore_withDefaultPostPass_shouldFlipLanguageToggle() {
    let structure = "<preamble>\\germantrue</preamble>";
    let outcome = restore(structure, &BTreeMap::new(), &PostPassRule::defaults());
    assert_eq!(outcome.xml, "<preamble>\\germanfalse</preamble>");
}

/// Post-pass rules run after substitution, so they see translated text
#[test]
fn test_restore_withPostPassRule_shouldApplyAfterSubstitution() {
    let structure = "<a>@PLACEHOLDER(1)@</a>";
    let rules = vec![PostPassRule {
        find: "colour".to_string(),
        replace: "color".to_string(),
    }];
    let outcome = restore(structure, &translations(&[(1, "the colour red")]), &rules);
    assert_eq!(outcome.xml, "<a>the color red</a>");
}

/// A translation containing a token-like string is substituted verbatim
#[test]
fn test_restore_withTokenLikeTranslation_shouldNotRecurse() {
    let structure = "<a>@PLACEHOLDER(1)@</a>";
    let outcome = restore(structure, &translations(&[(1, "literal @PLACEHOLDER(1)@")]), &[]);
    // The re-introduced text is reported as unfilled but left alone
    assert_eq!(outcome.xml, "<a>literal @PLACEHOLDER(1)@</a>");
    assert_eq!(outcome.applied, 1);
}

/// File-level restoration reads both artifacts and substitutes
#[test]
fn test_restore_files_withArtifacts_shouldSubstitute() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let structure = common::create_test_file(&dir, "doc.xml", "<a>@PLACEHOLDER(1)@</a>")?;
    let lines = common::create_test_file(&dir, "doc.txt", "@(1):translated text\n")?;

    let outcome = restore_files(&structure, &lines, &[])?;
    assert_eq!(outcome.xml, "<a>translated text</a>");
    Ok(())
}

/// A missing artifact is a hard error naming the file
#[test]
fn test_restore_files_withMissingArtifact_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let structure = common::create_test_file(&dir, "doc.xml", "<a/>")?;

    let result = restore_files(&structure, &dir.join("missing.txt"), &[]);
    assert!(result.is_err());
    Ok(())
}

/// Escaped newlines in the line file come back as real newlines
#[test]
fn test_restore_files_withEscapedNewline_shouldUnescape() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let structure = common::create_test_file(&dir, "doc.xml", "<a>@PLACEHOLDER(1)@</a>")?;
    let lines = common::create_test_file(&dir, "doc.txt", "@(1):zwei\\nZeilen\n")?;

    let outcome = restore_files(&structure, &lines, &[])?;
    assert_eq!(outcome.xml, "<a>zwei\nZeilen</a>");
    Ok(())
}
