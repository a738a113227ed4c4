/*!
 * Tests for the extraction walk
 */

use ipetrans::classify::is_translatable;
use ipetrans::extractor::extract;
use ipetrans::segment_store::SegmentKind;

use crate::common;

/// The sample payload yields the pre-title, the page title, and the prose
/// text element, with dense ids in traversal order
#[test]
fn test_extract_withSamplePayload_shouldEmitExpectedSegments() {
    let extraction = extract(common::sample_payload()).unwrap();
    let segments = extraction.store.segments();

    assert_eq!(segments.len(), 3);
    assert_eq!(segments[0].id, 1);
    assert_eq!(segments[0].kind, SegmentKind::Prestitle);
    assert_eq!(segments[0].original_text, "Vorlesung Algorithmen");

    assert_eq!(segments[1].id, 2);
    assert_eq!(segments[1].kind, SegmentKind::Attribute("title".to_string()));
    assert_eq!(segments[1].original_text, "Sortieren und Suchen");

    assert_eq!(segments[2].id, 3);
    assert_eq!(segments[2].kind, SegmentKind::ElementText);
    assert_eq!(segments[2].original_text, "Der Algorithmus terminiert immer.");
    assert_eq!(segments[2].locator, "/text[1]");
}

/// Every original text was replaced by its token in the structure document
#[test]
fn test_extract_withSamplePayload_shouldReplaceTextWithTokens() {
    let extraction = extract(common::sample_payload()).unwrap();
    let xml = &extraction.placeholder_xml;

    assert!(xml.contains("@PLACEHOLDER(1)@"));
    assert!(xml.contains("title=\"@PLACEHOLDER(2)@\""));
    assert!(xml.contains("@PLACEHOLDER(3)@"));
    assert!(!xml.contains("Vorlesung Algorithmen"));
    assert!(!xml.contains("Sortieren und Suchen"));
    assert!(!xml.contains("Der Algorithmus terminiert immer."));
}

/// Every emitted segment passes the general predicate
#[test]
fn test_extract_withSamplePayload_shouldOnlyEmitTranslatableText() {
    let extraction = extract(common::sample_payload()).unwrap();
    for segment in extraction.store.segments() {
        assert!(
            is_translatable(&segment.original_text),
            "segment {} failed the predicate: {:?}",
            segment.id,
            segment.original_text
        );
    }
}

/// Geometry subtrees are pruned wholesale and never yield segments
#[test]
fn test_extract_withGraphicsSubtrees_shouldPruneThem() {
    let extraction = extract(common::sample_payload()).unwrap();

    // The <g> subtree contains prose, but the walk never enters it
    assert!(extraction
        .placeholder_xml
        .contains("innerhalb der Gruppe"));
    assert!(extraction.stats.elements_skipped >= 2);
    assert!(extraction.stats.noise_reduction() > 0.0);
}

/// The noise figure is pruned subtrees per visited element
#[test]
fn test_noise_reduction_shouldDivideSkippedByScanned() {
    let extraction = extract(common::sample_payload()).unwrap();
    let stats = extraction.stats;

    // ipe, preamble, page, and both text elements are visited; the path
    // and g subtrees are pruned
    assert_eq!(stats.elements_scanned, 5);
    assert_eq!(stats.elements_skipped, 2);
    assert!((stats.noise_reduction() - 2.0 / 5.0).abs() < f64::EPSILON);
}

/// An element with a geometry attribute is pruned even under a prose tag
#[test]
fn test_extract_withGraphicsAttribute_shouldPruneElement() {
    let xml = r#"<ipe><page><note cx="4" cy="5">Kreismittelpunkt und Radius</note></page></ipe>"#;
    let extraction = extract(xml).unwrap();
    assert!(extraction.store.is_empty());
    assert_eq!(extraction.stats.elements_skipped, 1);
}

/// Text mixed with child elements is substituted node by node, so every
/// text node keeps its position relative to its element siblings
#[test]
fn test_extract_withMixedContent_shouldKeepNodePositions() {
    let xml = "<ipe><page><note>Hallo liebe <b>Welt</b> und alle zusammen</note></page></ipe>";
    let extraction = extract(xml).unwrap();

    assert_eq!(extraction.store.len(), 3);
    assert_eq!(
        extraction.store.segments()[0].original_text,
        "Hallo liebe "
    );
    assert_eq!(
        extraction.store.segments()[1].original_text,
        " und alle zusammen"
    );
    assert_eq!(extraction.store.segments()[2].original_text, "Welt");
    assert!(extraction
        .placeholder_xml
        .contains("<note>@PLACEHOLDER(1)@<b>@PLACEHOLDER(3)@</b>@PLACEHOLDER(2)@</note>"));
}

/// A text element with nested markup is substituted node by node as well;
/// the nested element stays where it was
#[test]
fn test_extract_withMixedTextElement_shouldSubstitutePerNode() {
    let xml = "<ipe><page><text>Der Wert <b>x</b> bleibt konstant</text></page></ipe>";
    let extraction = extract(xml).unwrap();

    assert_eq!(extraction.store.len(), 2);
    assert!(extraction
        .placeholder_xml
        .contains("<text>@PLACEHOLDER(1)@<b>x</b>@PLACEHOLDER(2)@</text>"));
}

/// Math-only text elements are rejected by the fast-path rule
#[test]
fn test_extract_withMathText_shouldNotEmitSegment() {
    let extraction = extract(common::sample_payload()).unwrap();
    assert!(extraction.placeholder_xml.contains(r"O(n \log n)"));
}

/// Running the walk twice over the same payload yields identical tables
#[test]
fn test_extract_withSameInput_shouldBeDeterministic() {
    let first = extract(common::sample_payload()).unwrap();
    let second = extract(common::sample_payload()).unwrap();

    assert_eq!(first.placeholder_xml, second.placeholder_xml);
    assert_eq!(first.store.len(), second.store.len());
    for (a, b) in first.store.segments().iter().zip(second.store.segments()) {
        assert_eq!(a.id, b.id);
        assert_eq!(a.original_text, b.original_text);
        assert_eq!(a.locator, b.locator);
    }
}

/// A payload that already contains an emitted token must abort extraction
#[test]
fn test_extract_withPreexistingToken_shouldFail() {
    let xml = r#"<ipe><page><text>Der Wert von @PLACEHOLDER(1)@ ist offen</text></page></ipe>"#;
    let result = extract(xml);
    assert!(result.is_err());
}

/// Malformed XML is fatal to the document
#[test]
fn test_extract_withMalformedXml_shouldFail() {
    assert!(extract("<ipe><page>").is_err());
    assert!(extract("kein XML").is_err());
}

/// Segment context records the math and style hints
#[test]
fn test_extract_withStyledText_shouldCaptureContext() {
    let extraction = extract(common::sample_payload()).unwrap();
    let prose = &extraction.store.segments()[2];
    assert_eq!(prose.context.parent_tag, "text");
    assert!(!prose.context.is_math);
    assert!(!prose.context.is_latex);
}

/// An empty or text-free payload yields an empty table, not an error
#[test]
fn test_extract_withNoTranslatableText_shouldYieldEmptyStore() {
    let xml = r#"<ipe><page><path stroke="black">0 0 m 8 8 l</path></page></ipe>"#;
    let extraction = extract(xml).unwrap();
    assert!(extraction.store.is_empty());
    assert_eq!(extraction.stats.segments, 0);
}
