//! Sanitizers for documentation text copied from remote documents

use once_cell::sync::Lazy;
use regex::Regex;

static UNICODE_PUNCTUATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\u{2018}\u{2019}\u{201C}\u{201D}\u{2013}\u{2014}]").expect("valid unicode regex")
});
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static HTML_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("valid tag regex"));

/// Flatten free-form description text into a single rustdoc-safe line.
///
/// This function:
/// - Replaces smart quotes and dashes with ASCII equivalents
/// - Strips HTML tags
/// - Collapses all whitespace, including newlines, into single spaces
/// - Escapes square brackets so rustdoc does not read them as links
///
/// # Examples
/// ```
/// use apiweave::generation::sanitizers::sanitize_doc_text;
///
/// let output = sanitize_doc_text("Gets a user\u{2019}s <b>friends</b>\n  [paged]");
/// assert_eq!(output, "Gets a user's friends \\[paged\\]");
/// ```
pub fn sanitize_doc_text(input: &str) -> String {
    let ascii = UNICODE_PUNCTUATION.replace_all(input, |caps: &regex::Captures| match &caps[0] {
        "\u{2018}" | "\u{2019}" => "'",
        "\u{201C}" | "\u{201D}" => "\"",
        _ => "-",
    });
    let untagged = HTML_TAG.replace_all(&ascii, "");
    WHITESPACE
        .replace_all(untagged.trim(), " ")
        .replace('[', "\\[")
        .replace(']', "\\]")
}
