//! Text reduction and normalization for scraped article pages.
//!
//! Article pages are reduced to their visible text, the body is isolated
//! between the `contents start` / `contents end` markers the blog template
//! emits, and the body is pushed through a fixed cleaning chain.
//!
//! # Cleaning chain
//!
//! The steps run in this order and each one assumes the previous ones ran:
//!
//! 1. NFKC normalization
//! 2. Strip tabs, line breaks, `#`, Japanese punctuation, dashes and spaces
//! 3. Trim and lower-case
//! 4. Strip `YYYY.MM.DD ... tech|` byline runs
//! 5. Strip `http(s)://` URLs
//! 6. Drop the first 3 characters (the blog's fixed label prefix)
//! 7. Strip digits
//! 8. Strip ASCII punctuation

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Node};
use unicode_normalization::UnicodeNormalization;

/// Parent tags whose text never counts as article content.
///
/// `[document]` stands for the document root: text or comments sitting
/// directly under it have no element parent.
pub const PARENT_BLACKLIST: [&str; 9] = [
    "[document]",
    "noscript",
    "header",
    "html",
    "meta",
    "head",
    "input",
    "script",
    "style",
];

/// Number of leading characters removed by step 6.
pub const LABEL_PREFIX_CHARS: usize = 3;

static CONTENT_REGION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)contents start(.*?)contents end").unwrap());

static SPECIAL_CHARS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\t\n\r#。、「」・”─ –]").unwrap());

static BYLINE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}\.\d{2}\.\d{2}.*?tech\|").unwrap());

static URL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"https?://(?:[a-zA-Z]|[0-9]|[$-_@.&+]|[!*\\(\\),]|(?:%[0-9a-fA-F][0-9a-fA-F]))+",
    )
    .unwrap()
});

static DIGIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d").unwrap());

/// Outcome of reducing and cleaning one article page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleText {
    /// Cleaned body, or the unfiltered reduced text when no markers matched.
    pub text: String,
    /// Whether the `contents start` / `contents end` region was found.
    pub matched: bool,
}

/// Concatenate every text and comment node whose parent is not blacklisted.
///
/// Nodes are visited in document order. Comments are included because the
/// content markers are emitted as HTML comments.
pub fn reduce_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut reduced = String::new();

    for node in document.tree.root().descendants() {
        let piece: &str = match node.value() {
            Node::Text(text) => &**text,
            Node::Comment(comment) => &**comment,
            _ => continue,
        };

        let parent_name = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name()))
            .unwrap_or("[document]");

        if !PARENT_BLACKLIST.contains(&parent_name) {
            reduced.push_str(piece);
        }
    }

    reduced
}

/// Text strictly between the first `contents start` and the next `contents end`.
pub fn extract_content_region(reduced: &str) -> Option<&str> {
    CONTENT_REGION_RE
        .captures(reduced)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// Step 1.
pub fn normalize_nfkc(text: &str) -> String {
    text.nfkc().collect()
}

/// Step 2.
pub fn strip_special_chars(text: &str) -> String {
    SPECIAL_CHARS_RE.replace_all(text, "").into_owned()
}

/// Step 3.
pub fn trim_and_lowercase(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Step 4: byline artifacts like `2021.04.12 ... tech|`.
pub fn strip_bylines(text: &str) -> String {
    BYLINE_RE.replace_all(text, "").into_owned()
}

/// Step 5.
pub fn strip_urls(text: &str) -> String {
    URL_RE.replace_all(text, "").into_owned()
}

/// Step 6: positional, not content-matched.
///
/// Strings shorter than `count` characters come back empty.
pub fn drop_leading_chars(text: &str, count: usize) -> String {
    text.chars().skip(count).collect()
}

/// Step 7.
pub fn strip_digits(text: &str) -> String {
    DIGIT_RE.replace_all(text, "").into_owned()
}

/// Step 8. Full-width punctuation is left alone.
pub fn strip_ascii_punctuation(text: &str) -> String {
    text.chars().filter(|c| !c.is_ascii_punctuation()).collect()
}

/// Run the full cleaning chain over an isolated content region.
pub fn clean_content(region: &str) -> String {
    let text = normalize_nfkc(region);
    let text = strip_special_chars(&text);
    let text = trim_and_lowercase(&text);
    let text = strip_bylines(&text);
    let text = strip_urls(&text);
    let text = drop_leading_chars(&text, LABEL_PREFIX_CHARS);
    let text = strip_digits(&text);
    strip_ascii_punctuation(&text)
}

/// Reduce a raw article page and clean its content region.
///
/// When the markers are missing the reduced text is returned untouched with
/// `matched == false`; the caller decides how to report it.
pub fn extract_article_text(html: &str) -> ArticleText {
    let reduced = reduce_text(html);
    match extract_content_region(&reduced) {
        Some(region) => ArticleText {
            text: clean_content(region),
            matched: true,
        },
        None => ArticleText {
            text: reduced,
            matched: false,
        },
    }
}
