use once_cell::sync::Lazy;
use regex::Regex;

// @module: Classification of candidate strings as translatable text

// Content that is clearly machine data rather than prose
static BASE64_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Za-z0-9+/=\s]+$").unwrap());
static HEX_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9A-Fa-f\s]+$").unwrap());
static COORDINATES_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d\s,.\-]+$").unwrap());
static URL_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(https?://|file://|[A-Za-z]:\\)").unwrap());
static CSS_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[{};:]").unwrap());
static CSS_VALUE_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r":\s*[A-Za-zÄÖÜäöüß]").unwrap());
static XML_FRAGMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^<[^>]+>.*</[^>]+>$").unwrap());
static PURE_MATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[\d\s+\-*/=()\[\]{}^$.<>]+$").unwrap());
static LATEX_CMD_WITH_BRACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\\[A-Za-z]+\{[^}]+\}").unwrap());
static SINGLE_NON_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^A-Za-zäöüÄÖÜß]$").unwrap());
static MULTI_LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-zÄÖÜäöüß]{2,}").unwrap());
static ANY_LETTER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-zA-ZäöüÄÖÜßàáâãçèéêëìíîïñòóôõùúûüýÿ]").unwrap());

// Fast-path patterns for <text> element content
static FORMATTING_LATEX_CMD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"\\(?:textbf|emph|textit|text|section|subsection|chapter|title|label|mathrm|mathit|mathbf)\{([^}]*)\}",
    )
    .unwrap()
});
static OTHER_LATEX_CMD: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[a-zA-Z]+(\{[^}]*\})?").unwrap());
static MATH_PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[${}()\[\]\\=<>+*/\-]").unwrap());
static REAL_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Za-zÄÖÜäöüß]{3,}").unwrap());

// Context helpers
static LATEX_COMMAND: Lazy<Regex> = Lazy::new(|| Regex::new(r"\\[A-Za-z]+").unwrap());

/// Attribute names whose values are candidates for translation.
/// All other attributes are never classified.
pub const TRANSLATABLE_ATTRIBUTES: [&str; 6] = [
    "title",
    "alt",
    "aria-label",
    "aria-description",
    "placeholder",
    "desc",
];

/// Why a candidate string was rejected by the general predicate.
///
/// Rejections are advisory diagnostics, surfaced as log events; they never
/// abort extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    TooShort,
    BinaryContent,
    PureMath,
    SingleNonLetter,
    UrlLike,
    CssFragment,
    EmbeddedXml,
    CoordinateList,
    BareLatexCommand,
    NoLetterRun,
    NoLatinLetter,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::TooShort => "text too short (< 2 chars)",
            Self::BinaryContent => "binary or encoded content",
            Self::PureMath => "pure math pattern without LaTeX",
            Self::SingleNonLetter => "single non-letter character",
            Self::UrlLike => "URL or filesystem path",
            Self::CssFragment => "CSS-like fragment",
            Self::EmbeddedXml => "embedded XML element",
            Self::CoordinateList => "coordinate list",
            Self::BareLatexCommand => "LaTeX command without brace argument",
            Self::NoLetterRun => "no run of consecutive letters",
            Self::NoLatinLetter => "no Latin letter",
        };
        write!(f, "{}", text)
    }
}

/// Decide whether `text` is translatable human-language text.
///
/// The predicate is pure and deterministic; the rules carry the domain
/// knowledge that separates prose from graphics data, math, and markup.
/// Returns the first rule that rejects, or `Ok(())` on acceptance.
pub fn classify(text: &str) -> Result<(), RejectReason> {
    let text = text.trim();

    if text.chars().count() < 2 {
        return Err(RejectReason::TooShort);
    }
    if is_binary_or_encoded(text) {
        return Err(RejectReason::BinaryContent);
    }
    if PURE_MATH.is_match(text) && !text.contains('\\') {
        return Err(RejectReason::PureMath);
    }
    if SINGLE_NON_LETTER.is_match(text) {
        return Err(RejectReason::SingleNonLetter);
    }
    if URL_PREFIX.is_match(text) {
        return Err(RejectReason::UrlLike);
    }
    if CSS_CHARS.is_match(text)
        && text.split_whitespace().count() < 3
        && !CSS_VALUE_WORD.is_match(text)
    {
        return Err(RejectReason::CssFragment);
    }
    if XML_FRAGMENT.is_match(text) {
        return Err(RejectReason::EmbeddedXml);
    }
    if COORDINATES_ONLY.is_match(text) && text.split_whitespace().count() > 3 {
        return Err(RejectReason::CoordinateList);
    }
    if text.starts_with('\\') && !LATEX_CMD_WITH_BRACES.is_match(text) {
        return Err(RejectReason::BareLatexCommand);
    }
    if !MULTI_LETTERS.is_match(text) {
        return Err(RejectReason::NoLetterRun);
    }
    if !ANY_LETTER.is_match(text) {
        return Err(RejectReason::NoLatinLetter);
    }

    Ok(())
}

/// Convenience wrapper over [`classify`]
pub fn is_translatable(text: &str) -> bool {
    classify(text).is_ok()
}

/// Fast-path rule for the primary text-bearing element (`text`).
///
/// Strips simple formatting and math commands down to their brace content,
/// removes remaining LaTeX commands and math punctuation, and accepts iff a
/// real word (three or more consecutive letters) survives.
pub fn keeps_real_word(text: &str) -> bool {
    // Replace formatting commands with their brace content
    let extracted = FORMATTING_LATEX_CMD.replace_all(text, "$1");

    // Remove any remaining LaTeX command, with or without braces
    let extracted = OTHER_LATEX_CMD.replace_all(&extracted, "");

    // Blank out math punctuation so only prose candidates remain
    let cleaned = MATH_PUNCTUATION.replace_all(&extracted, " ");

    cleaned.split_whitespace().any(|word| REAL_WORD.is_match(word))
}

/// True iff the string looks like base64, hex, or carries an oversized token
fn is_binary_or_encoded(text: &str) -> bool {
    if text.is_empty() {
        return false;
    }
    let len = text.chars().count();
    if len > 100 && BASE64_ONLY.is_match(text) {
        return true;
    }
    if len > 50 && HEX_ONLY.is_match(text) {
        return true;
    }
    text.split_whitespace().any(|word| word.chars().count() > 100)
}

/// True iff the text contains a backslash-command pattern
pub fn contains_latex_command(text: &str) -> bool {
    LATEX_COMMAND.is_match(text)
}

/// True iff the text contains a `$` not escaped by a backslash
pub fn contains_unescaped_dollar(text: &str) -> bool {
    let mut escaped = false;
    for c in text.chars() {
        match c {
            '\\' => escaped = !escaped,
            '$' if !escaped => return true,
            _ => escaped = false,
        }
    }
    false
}
