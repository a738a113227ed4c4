use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;

// @module: Segment table, placeholder encoding, and exchange formats

// @const: Line-file record pattern
static LINE_RECORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^@\((\d+)\):(.*)$").unwrap());

/// Placeholder token inserted at a Segment's site in the structure file.
///
/// The form carries no alphabetic content a translation engine would touch,
/// and the `@` sentinels keep tokenizers from splitting it. The closing `)@`
/// makes tokens prefix-free, so id 1 never matches inside id 10.
pub fn placeholder_token(id: u32) -> String {
    format!("@PLACEHOLDER({})@", id)
}

/// What kind of site a segment was extracted from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Text content of an element
    ElementText,
    /// Value of a named translatable attribute
    Attribute(String),
    /// The `\newcommand{\prestitle}{…}` macro argument in the preamble
    Prestitle,
}

impl fmt::Display for SegmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElementText => write!(f, "element_text"),
            Self::Attribute(name) => write!(f, "attribute_{}", name),
            Self::Prestitle => write!(f, "prestitle"),
        }
    }
}

/// Advisory context captured alongside a segment.
///
/// Context never alters restoration semantics; it exists for diagnostics
/// and for downstream consumers of the segment table.
#[derive(Debug, Clone, Default)]
pub struct SegmentContext {
    /// Tag of the element the text was found on
    pub parent_tag: String,
    /// Attributes of that element, in document order
    pub parent_attributes: Vec<(String, String)>,
    /// The element's `style` attribute, when present
    pub style: Option<String>,
    /// Style is `math` or the text contains an unescaped `$`
    pub is_math: bool,
    /// The text contains a backslash-command pattern
    pub is_latex: bool,
}

/// One translatable text span with a stable id
#[derive(Debug, Clone)]
pub struct Segment {
    /// Unique within the document, dense 1..N in traversal order
    pub id: u32,
    /// Advisory path to the origin site; uniqueness comes from `id`
    pub locator: String,
    /// Exact substring that appeared at the site
    pub original_text: String,
    /// Site kind
    pub kind: SegmentKind,
    /// Advisory context
    pub context: SegmentContext,
}

impl Segment {
    /// The placeholder token standing in for this segment
    pub fn placeholder(&self) -> String {
        placeholder_token(self.id)
    }
}

/// Translations read back from a line file
#[derive(Debug, Default)]
pub struct TranslationSet {
    /// id → translated text, ascending
    pub translations: BTreeMap<u32, String>,
    /// Ids present in the store but absent from the file (advisory)
    pub missing: Vec<u32>,
    /// Records for ids the store never produced (ignored)
    pub unknown: usize,
    /// Non-blank lines that did not match the record format (skipped)
    pub malformed: usize,
}

/// The authoritative segment table for one document.
///
/// Owns id allocation, the segment list, the structure document produced by
/// the extractor, and the on-disk exchange formats the translation
/// collaborator consumes.
#[derive(Debug, Default)]
pub struct SegmentStore {
    segments: Vec<Segment>,
    structure_xml: Option<String>,
}

impl SegmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a segment and allocate the next dense id
    pub fn emit(
        &mut self,
        locator: String,
        original_text: String,
        kind: SegmentKind,
        context: SegmentContext,
    ) -> u32 {
        let id = self.segments.len() as u32 + 1;
        debug!("segment {} [{}] at {}: {:?}", id, kind, locator, original_text);
        self.segments.push(Segment {
            id,
            locator,
            original_text,
            kind,
            context,
        });
        id
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn get(&self, id: u32) -> Option<&Segment> {
        self.segments.get(id.checked_sub(1)? as usize)
    }

    /// Attach the placeholder-bearing XML produced by the extractor
    pub fn set_structure(&mut self, xml: String) {
        self.structure_xml = Some(xml);
    }

    pub fn structure(&self) -> Option<&str> {
        self.structure_xml.as_deref()
    }

    /// Render the line file: one `@(<id>):<escaped_original>` record per
    /// segment, ascending id order
    pub fn lines_document(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push_str("@(");
            out.push_str(&segment.id.to_string());
            out.push_str("):");
            out.push_str(&escape_line_breaks(&segment.original_text));
            out.push('\n');
        }
        out
    }

    /// Write the structure file and the line file for the translator
    pub fn write_artifacts(&self, structure_path: &Path, lines_path: &Path) -> Result<()> {
        let structure = self
            .structure_xml
            .as_deref()
            .context("no structure document attached to the segment store")?;
        crate::file_utils::FileManager::write_to_file(structure_path, structure)?;
        crate::file_utils::FileManager::write_to_file(lines_path, &self.lines_document())?;
        Ok(())
    }

    /// Read a translated line file back into an id → text mapping.
    ///
    /// Unknown ids are ignored, missing ids are reported as an advisory
    /// list, malformed lines are skipped with a warning. Reading the same
    /// file twice yields the same result.
    pub fn load_translations(&self, lines_path: &Path) -> Result<TranslationSet> {
        let content = crate::file_utils::FileManager::read_to_string(lines_path)?;
        let (records, malformed) = parse_translation_lines(&content);

        let mut set = TranslationSet {
            malformed,
            ..TranslationSet::default()
        };
        for (id, text) in records {
            if self.get(id).is_some() {
                set.translations.insert(id, text);
            } else {
                set.unknown += 1;
            }
        }
        for segment in &self.segments {
            if !set.translations.contains_key(&segment.id) {
                set.missing.push(segment.id);
            }
        }
        if !set.missing.is_empty() {
            warn!(
                "translation file {} is missing {} of {} segment(s)",
                lines_path.display(),
                set.missing.len(),
                self.segments.len()
            );
        }
        Ok(set)
    }
}

/// Parse `@(<id>):<text>` records, unescaping `\n` sequences back to real
/// newlines. Returns the records plus a count of skipped malformed lines.
pub fn parse_translation_lines(content: &str) -> (BTreeMap<u32, String>, usize) {
    let mut records = BTreeMap::new();
    let mut malformed = 0;
    for line in content.lines() {
        if line.trim().is_empty() {
            continue;
        }
        match LINE_RECORD.captures(line) {
            Some(caps) => {
                let id: u32 = match caps[1].parse() {
                    Ok(id) => id,
                    Err(_) => {
                        warn!("line file id out of range: {}", line);
                        malformed += 1;
                        continue;
                    }
                };
                records.insert(id, unescape_line_breaks(&caps[2]));
            }
            None => {
                warn!("line does not match expected format: {}", line);
                malformed += 1;
            }
        }
    }
    (records, malformed)
}

/// Escape line breaks for the one-record-per-line format
pub fn escape_line_breaks(text: &str) -> String {
    text.replace('\r', "\\n").replace('\n', "\\n")
}

/// Undo [`escape_line_breaks`] on read
pub fn unescape_line_breaks(text: &str) -> String {
    text.replace("\\n", "\n")
}
