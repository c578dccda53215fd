//! Japanese tokenization and token filtering.
//!
//! Japanese has no whitespace word boundaries, so text is segmented by a
//! morphological analyzer ([`vibrato`] with a system dictionary). The
//! surface forms are then filtered:
//!
//! - tokens in the injected [`StopWords`] set are dropped
//! - tokens made only of hiragana are dropped (particles, auxiliaries and
//!   other function words the stopword list misses)

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use std::error::Error;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{info, instrument};
use vibrato::{Dictionary, Tokenizer};

static HIRAGANA_ONLY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[ぁ-ゖ]+$").unwrap());

/// Splits text into surface-form tokens.
pub trait Segmenter {
    fn segment(&self, text: &str) -> Vec<String>;
}

/// [`Segmenter`] backed by a vibrato tokenizer.
pub struct VibratoSegmenter {
    tokenizer: Tokenizer,
}

impl VibratoSegmenter {
    /// Load a vibrato system dictionary. Files ending in `.zst` are
    /// decompressed on the fly, as distributed dictionaries are.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let file = File::open(path)?;
        let dictionary = if path.extension().is_some_and(|ext| ext == "zst") {
            Dictionary::read(zstd::Decoder::new(file)?)?
        } else {
            Dictionary::read(BufReader::new(file))?
        };
        info!("Loaded tokenizer dictionary");
        Ok(Self {
            tokenizer: Tokenizer::new(dictionary),
        })
    }
}

impl Segmenter for VibratoSegmenter {
    fn segment(&self, text: &str) -> Vec<String> {
        let mut worker = self.tokenizer.new_worker();
        worker.reset_sentence(text);
        worker.tokenize();
        worker
            .token_iter()
            .map(|t| t.surface().to_string())
            .filter(|s| !s.trim().is_empty())
            .collect()
    }
}

/// Stopword set, loaded once and passed to every [`tokenize`] call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StopWords {
    words: HashSet<String>,
}

impl StopWords {
    /// Read a newline-delimited word list. Blank lines are ignored.
    #[instrument(level = "info", skip_all, fields(path = %path.display()))]
    pub fn load(path: &Path) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path)?;
        let stopwords = Self::parse(&raw);
        info!(count = stopwords.len(), "Loaded stopwords");
        Ok(stopwords)
    }

    pub fn parse(raw: &str) -> Self {
        raw.lines().collect()
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl<'a> FromIterator<&'a str> for StopWords {
    fn from_iter<I: IntoIterator<Item = &'a str>>(iter: I) -> Self {
        Self {
            words: iter
                .into_iter()
                .map(str::trim)
                .filter(|w| !w.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }
}

/// Whether `token` consists of hiragana only.
pub fn is_hiragana_only(token: &str) -> bool {
    HIRAGANA_ONLY_RE.is_match(token)
}

/// Segment `text` and drop stopwords and hiragana-only tokens.
pub fn tokenize<S: Segmenter + ?Sized>(segmenter: &S, stopwords: &StopWords, text: &str) -> Vec<String> {
    segmenter
        .segment(text)
        .into_iter()
        .filter(|t| !stopwords.contains(t))
        .filter(|t| !is_hiragana_only(t))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Splits on whitespace, standing in for the morphological analyzer.
    struct Whitespace;

    impl Segmenter for Whitespace {
        fn segment(&self, text: &str) -> Vec<String> {
            text.split_whitespace().map(str::to_string).collect()
        }
    }

    #[test]
    fn test_stopwords_parse_ignores_blank_lines() {
        let stopwords = StopWords::parse("これ\nそれ\n\n  あれ  \n");
        assert_eq!(stopwords.len(), 3);
        assert!(stopwords.contains("あれ"));
        assert!(!stopwords.contains(""));
    }

    #[test]
    fn test_is_hiragana_only() {
        assert!(is_hiragana_only("です"));
        assert!(is_hiragana_only("を"));
        assert!(!is_hiragana_only("データ"));
        assert!(!is_hiragana_only("分析する"));
        assert!(!is_hiragana_only("rust"));
        assert!(!is_hiragana_only(""));
    }

    #[test]
    fn test_only_content_word_survives_stopwords() {
        let stopwords = StopWords::parse("事\n為\n年\n");
        let tokens = tokenize(&Whitespace, &stopwords, "事 為 年 機械学習 為 事");
        assert_eq!(tokens, vec!["機械学習"]);
    }

    #[test]
    fn test_tokenize_drops_hiragana_tokens_and_keeps_order() {
        let stopwords = StopWords::default();
        let tokens = tokenize(&Whitespace, &stopwords, "データ を 分析 する こと で 価値 が 生まれる");
        assert_eq!(tokens, vec!["データ", "分析", "価値", "生まれる"]);
    }

    #[test]
    fn test_stopwords_load_from_file() {
        let path = std::env::temp_dir().join(format!("tech_blog_topics_stop_{}.txt", std::process::id()));
        std::fs::write(&path, "もの\nこと\n").unwrap();
        let stopwords = StopWords::load(&path).unwrap();
        assert_eq!(stopwords.len(), 2);
        assert!(stopwords.contains("こと"));
        std::fs::remove_file(&path).ok();
    }
}
