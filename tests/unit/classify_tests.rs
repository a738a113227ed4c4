/*!
 * Tests for the translatability predicate
 */

use ipetrans::classify::{
    classify, contains_latex_command, contains_unescaped_dollar, is_translatable, keeps_real_word,
    RejectReason,
};

/// Ordinary prose must be accepted
#[test]
fn test_classify_withGermanProse_shouldAccept() {
    assert!(is_translatable("Der Algorithmus terminiert immer."));
    assert!(is_translatable("Sortieren und Suchen"));
    assert!(is_translatable("Größe des Eingabefeldes"));
}

/// Anything shorter than two characters is rejected
#[test]
fn test_classify_withSingleChar_shouldRejectTooShort() {
    assert_eq!(classify("a"), Err(RejectReason::TooShort));
    assert_eq!(classify(""), Err(RejectReason::TooShort));
    assert_eq!(classify("   "), Err(RejectReason::TooShort));
}

/// Long base64 and hex runs are machine data
#[test]
fn test_classify_withEncodedContent_shouldRejectBinary() {
    let base64 = "QWxsZSBtZW5zY2hlbiBzaW5kIGZyZWkgdW5kIGdsZWljaA==".repeat(3);
    assert_eq!(classify(&base64), Err(RejectReason::BinaryContent));

    let hex = "deadbeef0123456789abcdef".repeat(3);
    assert_eq!(classify(&hex), Err(RejectReason::BinaryContent));
}

/// A single word over one hundred characters cannot be prose
#[test]
fn test_classify_withOversizedToken_shouldRejectBinary() {
    let token = "ü".repeat(101);
    assert_eq!(classify(&token), Err(RejectReason::BinaryContent));
}

/// Digits and operators without a backslash are plain math
#[test]
fn test_classify_withPureMath_shouldReject() {
    assert_eq!(classify("2 + 2 = 4"), Err(RejectReason::PureMath));
    assert_eq!(classify("(1/2) * [3^4]"), Err(RejectReason::PureMath));
}

/// URLs and filesystem paths never go to a translator
#[test]
fn test_classify_withUrlOrPath_shouldReject() {
    assert_eq!(
        classify("https://example.org/skript.pdf"),
        Err(RejectReason::UrlLike)
    );
    assert_eq!(classify("file:///tmp/a.pdf"), Err(RejectReason::UrlLike));
    assert_eq!(classify(r"C:\Users\docs"), Err(RejectReason::UrlLike));
}

/// Short fragments with CSS punctuation look like markup, unless a word
/// follows a colon or the string carries three or more words
#[test]
fn test_classify_withCssFragment_shouldReject() {
    assert_eq!(classify("a{b};"), Err(RejectReason::CssFragment));
    assert_eq!(
        classify(r"\textbf{Wichtig}"),
        Err(RejectReason::CssFragment)
    );
    // A letter after a colon rescues the string
    assert!(is_translatable("fill:none;"));
    assert!(is_translatable("Hinweis: siehe Anhang"));
}

/// A string that is itself an XML element is markup, not prose
#[test]
fn test_classify_withEmbeddedXml_shouldReject() {
    assert_eq!(
        classify("<b>wichtig</b>"),
        Err(RejectReason::EmbeddedXml)
    );
}

/// Many whitespace-separated numbers are a coordinate list; with decimal
/// commas they dodge the pure-math rule but not this one
#[test]
fn test_classify_withCoordinateList_shouldReject() {
    assert_eq!(classify("16 32 64.5 128 256"), Err(RejectReason::PureMath));
    assert_eq!(
        classify("16,0 32,5 64,1 128,9"),
        Err(RejectReason::CoordinateList)
    );
}

/// A bare LaTeX command without a brace argument carries no prose
#[test]
fn test_classify_withBareLatexCommand_shouldReject() {
    assert_eq!(classify(r"\germantrue"), Err(RejectReason::BareLatexCommand));
    // With a brace argument and enough words the content may be prose
    assert!(is_translatable(r"\textbf{Der wichtige Hinweis}"));
}

/// Two consecutive letters are required somewhere in the string
#[test]
fn test_classify_withNoLetterRun_shouldReject() {
    assert_eq!(classify("a1 b2 c3"), Err(RejectReason::NoLetterRun));
}

/// The fast-path rule keeps strings with a real word after stripping
#[test]
fn test_keeps_real_word_withProse_shouldAccept() {
    assert!(keeps_real_word("Der Algorithmus terminiert"));
    assert!(keeps_real_word(r"\textbf{Laufzeit} der Schleife"));
    // Formatting command content survives stripping
    assert!(keeps_real_word(r"\emph{wichtig}"));
}

/// The fast-path rule drops formulas whose letters are all short
#[test]
fn test_keeps_real_word_withFormula_shouldReject() {
    assert!(!keeps_real_word(r"O(n \log n)"));
    assert!(!keeps_real_word(r"$x = y + z$"));
    assert!(!keeps_real_word(r"\alpha + \beta"));
}

/// Stripping a formatting command must not eat the prose around it
#[test]
fn test_keeps_real_word_withMixedContent_shouldAccept() {
    assert!(keeps_real_word(r"Sei $n$ die Anzahl der Elemente"));
}

/// LaTeX detection looks for backslash commands
#[test]
fn test_contains_latex_command_shouldDetectCommands() {
    assert!(contains_latex_command(r"\textbf{fett}"));
    assert!(!contains_latex_command("kein Befehl"));
}

/// An escaped dollar is not a math delimiter
#[test]
fn test_contains_unescaped_dollar_withEscapedDollar_shouldReturnFalse() {
    assert!(contains_unescaped_dollar("$x$"));
    assert!(!contains_unescaped_dollar(r"Preis: \$5"));
    assert!(contains_unescaped_dollar(r"\\$x$"));
}
