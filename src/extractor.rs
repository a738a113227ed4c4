use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::classify::{self, TRANSLATABLE_ATTRIBUTES};
use crate::document::{Document, Element, Node};
use crate::errors::ExtractError;
use crate::segment_store::{placeholder_token, SegmentContext, SegmentKind, SegmentStore};

// @module: Extraction walk over a decoded XML payload

/// Container and graphics tags whose subtrees never carry prose.
/// Matched case-insensitively.
const SKIPPED_TAGS: [&str; 21] = [
    "svg", "g", "path", "rect", "circle", "ellipse", "line", "polyline", "polygon", "image",
    "defs", "clippath", "mask", "pattern", "marker", "gradient", "stop", "use", "symbol",
    "metadata", "style",
];

/// An element carrying any of these attributes is geometry, not prose
const GRAPHICS_ATTRIBUTES: [&str; 9] = ["d", "points", "x1", "y1", "x2", "y2", "cx", "cy", "r"];

// The document preamble may define a pre-title macro whose argument is prose
static PRESTITLE_MACRO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\\newcommand\{\\prestitle\}\{([^}]*)\}").unwrap());

/// Counters describing one extraction walk
#[derive(Debug, Default, Clone, Copy)]
pub struct ExtractionStats {
    /// Elements visited by the walk
    pub elements_scanned: usize,
    /// Subtrees pruned as graphics or container markup
    pub elements_skipped: usize,
    /// Segments emitted
    pub segments: usize,
}

impl ExtractionStats {
    /// Pruned subtrees per visited element, skipped/scanned
    pub fn noise_reduction(&self) -> f64 {
        if self.elements_scanned == 0 {
            return 0.0;
        }
        self.elements_skipped as f64 / self.elements_scanned as f64
    }
}

/// Result of extracting one document
pub struct Extraction {
    /// Segment table with the structure document attached
    pub store: SegmentStore,
    /// The placeholder-bearing XML
    pub placeholder_xml: String,
    /// Walk counters
    pub stats: ExtractionStats,
}

/// Walk a decoded XML payload, replace every translatable span with a
/// placeholder token, and collect the segment table.
///
/// The walk is a single depth-first pass; ids are dense 1..N in visit
/// order, so the same payload always yields the same table.
pub fn extract(payload: &str) -> Result<Extraction, ExtractError> {
    let mut document = Document::parse(payload)?;
    let mut store = SegmentStore::new();
    let mut stats = ExtractionStats::default();
    let mut text_counter = 0usize;

    let root_path = format!("/{}", document.root.name);
    walk_element(&mut document.root, &root_path, &mut store, &mut stats, &mut text_counter);

    // A payload that already contains a token the walk emitted cannot be
    // restored unambiguously
    for segment in store.segments() {
        if payload.contains(&segment.placeholder()) {
            return Err(ExtractError::PlaceholderCollision { id: segment.id });
        }
    }

    stats.segments = store.len();
    let placeholder_xml = document.to_xml();
    store.set_structure(placeholder_xml.clone());

    info!(
        "extracted {} segment(s) from {} element(s), {} subtree(s) pruned ({:.0}% noise)",
        stats.segments,
        stats.elements_scanned,
        stats.elements_skipped,
        stats.noise_reduction() * 100.0
    );

    Ok(Extraction {
        store,
        placeholder_xml,
        stats,
    })
}

fn walk_element(
    element: &mut Element,
    path: &str,
    store: &mut SegmentStore,
    stats: &mut ExtractionStats,
    text_counter: &mut usize,
) {
    let tag = element.name.to_ascii_lowercase();

    if SKIPPED_TAGS.contains(&tag.as_str()) || has_graphics_attribute(element) {
        stats.elements_skipped += 1;
        debug!("pruning <{}> subtree", element.name);
        return;
    }
    stats.elements_scanned += 1;

    match tag.as_str() {
        // The preamble holds the LaTeX setup; only the pre-title macro
        // argument is candidate prose
        "preamble" => {
            extract_prestitle(element, path, store);
        }
        // Primary text carrier, judged by the fast-path rule
        "text" => {
            *text_counter += 1;
            let locator = format!("/text[{}]", text_counter);
            if element.children.iter().all(|c| matches!(c, Node::Text(_))) {
                let content = element.text_content();
                if classify::keeps_real_word(&content) {
                    let context = context_for(element, &content);
                    let id = store.emit(locator, content, SegmentKind::ElementText, context);
                    element.set_text(placeholder_token(id));
                }
            } else {
                // Mixed content: substitute node by node so no text moves
                // relative to its element siblings
                extract_text_children(element, &locator, store, true);
            }
        }
        _ => {
            if tag == "page" {
                extract_attribute(element, path, "title", store);
            }
            extract_general(element, path, store);
            walk_children(element, path, store, stats, text_counter);
        }
    }
}

fn walk_children(
    element: &mut Element,
    path: &str,
    store: &mut SegmentStore,
    stats: &mut ExtractionStats,
    text_counter: &mut usize,
) {
    let mut sibling_index: std::collections::HashMap<String, usize> =
        std::collections::HashMap::new();

    for child in &mut element.children {
        if let Node::Element(child_element) = child {
            let index = sibling_index
                .entry(child_element.name.clone())
                .and_modify(|n| *n += 1)
                .or_insert(0);
            let child_path = format!("{}/{}[{}]", path, child_element.name, index);
            walk_element(child_element, &child_path, store, stats, text_counter);
        }
    }
}

/// Classify the immediate text nodes and the translatable attributes of an
/// element outside the special-cased tags
fn extract_general(element: &mut Element, path: &str, store: &mut SegmentStore) {
    extract_text_children(element, path, store, false);

    for attribute in TRANSLATABLE_ATTRIBUTES {
        // page titles are handled by the caller ahead of the general pass
        if element.name.eq_ignore_ascii_case("page") && attribute == "title" {
            continue;
        }
        extract_attribute(element, path, attribute, store);
    }
}

/// Classify each immediate text node and substitute its token in place.
/// Text never changes position relative to element or raw siblings, so the
/// restored tree keeps the source's node order.
fn extract_text_children(
    element: &mut Element,
    path: &str,
    store: &mut SegmentStore,
    fast_path: bool,
) {
    let parent_tag = element.name.clone();
    let parent_attributes = element.attributes.clone();
    let style = element.attr("style").map(str::to_owned);

    let mut text_index = 0usize;
    for child in &mut element.children {
        let Node::Text(text) = child else { continue };
        text_index += 1;
        if text.trim().is_empty() {
            continue;
        }
        let accepted = if fast_path {
            classify::keeps_real_word(text)
        } else {
            match classify::classify(text) {
                Ok(()) => true,
                Err(reason) => {
                    debug!("rejecting <{}> text: {}", parent_tag, reason);
                    false
                }
            }
        };
        if !accepted {
            continue;
        }
        let locator = format!("{}#text[{}]", path, text_index);
        let context = SegmentContext {
            parent_tag: parent_tag.clone(),
            parent_attributes: parent_attributes.clone(),
            style: style.clone(),
            is_math: style.as_deref() == Some("math")
                || classify::contains_unescaped_dollar(text),
            is_latex: classify::contains_latex_command(text),
        };
        let id = store.emit(locator, std::mem::take(text), SegmentKind::ElementText, context);
        *text = placeholder_token(id);
    }
}

fn extract_attribute(
    element: &mut Element,
    path: &str,
    attribute: &str,
    store: &mut SegmentStore,
) {
    let Some(value) = element.attr(attribute).map(str::to_owned) else {
        return;
    };
    match classify::classify(&value) {
        Ok(()) => {
            let locator = format!("{}@{}", path, attribute);
            let context = context_for(element, &value);
            let id = store.emit(
                locator,
                value,
                SegmentKind::Attribute(attribute.to_string()),
                context,
            );
            element.set_attr(attribute, placeholder_token(id));
        }
        Err(reason) => debug!(
            "rejecting {}=\"…\" on <{}>: {}",
            attribute, element.name, reason
        ),
    }
}

/// Replace the pre-title macro argument inside the preamble with a token,
/// when the argument passes classification. The rewrite happens inside the
/// text node that carries the macro; sibling nodes are untouched.
fn extract_prestitle(element: &mut Element, path: &str, store: &mut SegmentStore) {
    let parent_tag = element.name.clone();
    let parent_attributes = element.attributes.clone();
    let style = element.attr("style").map(str::to_owned);

    for child in &mut element.children {
        let Node::Text(text) = child else { continue };
        let Some(caps) = PRESTITLE_MACRO.captures(text) else {
            continue;
        };
        let argument = caps[1].to_string();
        match classify::classify(&argument) {
            Ok(()) => {
                let locator = format!("{}#prestitle", path);
                let context = SegmentContext {
                    parent_tag: parent_tag.clone(),
                    parent_attributes: parent_attributes.clone(),
                    style: style.clone(),
                    is_math: classify::contains_unescaped_dollar(&argument),
                    is_latex: classify::contains_latex_command(&argument),
                };
                let id = store.emit(locator, argument, SegmentKind::Prestitle, context);
                *text = PRESTITLE_MACRO
                    .replace(
                        text,
                        format!("\\newcommand{{\\prestitle}}{{{}}}", placeholder_token(id)),
                    )
                    .into_owned();
            }
            Err(reason) => debug!("rejecting pre-title macro argument: {}", reason),
        }
        return;
    }
}

fn has_graphics_attribute(element: &Element) -> bool {
    element
        .attributes
        .iter()
        .any(|(name, _)| GRAPHICS_ATTRIBUTES.contains(&name.to_ascii_lowercase().as_str()))
}

fn context_for(element: &Element, text: &str) -> SegmentContext {
    let style = element.attr("style").map(str::to_owned);
    let is_math = style.as_deref() == Some("math") || classify::contains_unescaped_dollar(text);
    SegmentContext {
        parent_tag: element.name.clone(),
        parent_attributes: element.attributes.clone(),
        style,
        is_math,
        is_latex: classify::contains_latex_command(text),
    }
}
