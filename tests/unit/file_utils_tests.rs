/*!
 * Tests for file utility functions
 */

use anyhow::Result;
use ipetrans::file_utils::FileManager;

use crate::common;

/// Test that file_exists returns true for existing files
#[test]
fn test_file_exists_withExistingFile_shouldReturnTrue() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let test_file = common::create_test_file(
        &temp_dir.path().to_path_buf(),
        "exists.tmp",
        "test content",
    )?;
    assert!(FileManager::file_exists(&test_file));
    Ok(())
}

/// Test that file_exists returns false for non-existent files
#[test]
fn test_file_exists_withNonExistentFile_shouldReturnFalse() {
    assert!(!FileManager::file_exists("non_existent_file.tmp"));
}

/// Test that write_to_file creates intermediate directories
#[test]
fn test_write_to_file_withNestedPath_shouldCreateParents() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let nested = temp_dir.path().join("a").join("b").join("c.txt");

    FileManager::write_to_file(&nested, "inhalt")?;
    assert_eq!(FileManager::read_to_string(&nested)?, "inhalt");
    Ok(())
}

/// Test that copy_file copies content and creates the destination parents
#[test]
fn test_copy_file_withNestedDestination_shouldCopy() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    let source = common::create_test_file(&dir, "source.txt", "kopiert")?;
    let destination = dir.join("sub").join("copy.txt");

    FileManager::copy_file(&source, &destination)?;
    assert_eq!(std::fs::read_to_string(&destination)?, "kopiert");
    Ok(())
}

/// Test that find_files only matches the requested extension, sorted
#[test]
fn test_find_files_withMixedExtensions_shouldFilterAndSort() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    common::create_test_file(&dir, "b.pdf", "")?;
    common::create_test_file(&dir, "a.pdf", "")?;
    common::create_test_file(&dir, "notes.txt", "")?;
    common::create_test_file(&dir, "caps.PDF", "")?;

    let found = FileManager::find_files(&dir, "pdf")?;
    let names: Vec<String> = found.iter().map(FileManager::file_stem).collect();
    assert_eq!(names, vec!["a", "b", "caps"]);
    Ok(())
}

/// Test that find_files does not descend into subdirectories
#[test]
fn test_find_files_withSubdirectory_shouldStayShallow() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().to_path_buf();
    common::create_test_file(&dir, "top.pdf", "")?;
    let sub = dir.join("sub");
    std::fs::create_dir_all(&sub)?;
    common::create_test_file(&sub, "deep.pdf", "")?;

    let found = FileManager::find_files(&dir, "pdf")?;
    assert_eq!(found.len(), 1);
    Ok(())
}

/// Test that file_stem strips directory and extension
#[test]
fn test_file_stem_withPath_shouldReturnStem() {
    assert_eq!(FileManager::file_stem("input/lecture01.pdf"), "lecture01");
    assert_eq!(FileManager::file_stem("bare"), "bare");
}

/// Test that ensure_dir is idempotent
#[test]
fn test_ensure_dir_calledTwice_shouldSucceed() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path().join("made");
    FileManager::ensure_dir(&dir)?;
    FileManager::ensure_dir(&dir)?;
    assert!(FileManager::dir_exists(&dir));
    Ok(())
}
