//! Data models shared by the pipeline stages.
//!
//! - [`ArticleRecord`]: one scraped article, URL plus cleaned text
//! - [`ArticleCorpus`]: every record from a run, one per URL
//! - [`Topic`] / [`TopicWord`]: a fitted topic and its weighted words
//! - [`ArticleTopics`]: the topics fitted for one article, as exported to JSON

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A single article as stored in the Parquet table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ArticleRecord {
    /// The article page URL.
    pub article_url: String,
    /// Cleaned text, or the unfiltered page text when no content markers matched.
    pub article_text: String,
}

/// URL → text mapping produced by the cleaning stage.
///
/// Keys are unique; inserting the same URL twice keeps the latest text.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ArticleCorpus {
    records: BTreeMap<String, String>,
}

impl ArticleCorpus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the text for `url`, returning the previous text if any.
    pub fn insert(&mut self, url: impl Into<String>, text: impl Into<String>) -> Option<String> {
        self.records.insert(url.into(), text.into())
    }

    #[cfg(test)]
    pub fn get(&self, url: &str) -> Option<&str> {
        self.records.get(url).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate `(url, text)` pairs ordered by URL.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.records.iter().map(|(u, t)| (u.as_str(), t.as_str()))
    }
}

impl FromIterator<ArticleRecord> for ArticleCorpus {
    fn from_iter<I: IntoIterator<Item = ArticleRecord>>(iter: I) -> Self {
        let mut corpus = ArticleCorpus::new();
        for record in iter {
            corpus.insert(record.article_url, record.article_text);
        }
        corpus
    }
}

/// A word and its probability under one topic.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct TopicWord {
    pub word: String,
    pub weight: f64,
}

/// One fitted topic: its index and its most probable words, heaviest first.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Topic {
    pub index: usize,
    pub words: Vec<TopicWord>,
}

impl fmt::Display for Topic {
    /// Renders the words as `0.123*"word" + 0.045*"other"`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, w) in self.words.iter().enumerate() {
            if i > 0 {
                f.write_str(" + ")?;
            }
            write!(f, "{:.3}*\"{}\"", w.weight, w.word)?;
        }
        Ok(())
    }
}

/// Topics fitted for a single article, as written by the JSON export.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArticleTopics {
    pub article_url: String,
    pub topics: Vec<Topic>,
    /// Dominant topic for each vocabulary word.
    pub word_topics: Vec<(String, usize)>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_corpus_keeps_one_record_per_url() {
        let mut corpus = ArticleCorpus::new();
        assert!(corpus.insert("https://example.com/a", "first").is_none());
        assert_eq!(
            corpus.insert("https://example.com/a", "second"),
            Some("first".to_string())
        );
        corpus.insert("https://example.com/b", "");

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get("https://example.com/a"), Some("second"));
        assert_eq!(corpus.get("https://example.com/b"), Some(""));
    }

    #[test]
    fn test_corpus_from_records_orders_by_url() {
        let records = vec![
            ArticleRecord {
                article_url: "https://example.com/2".to_string(),
                article_text: "二".to_string(),
            },
            ArticleRecord {
                article_url: "https://example.com/1".to_string(),
                article_text: "一".to_string(),
            },
        ];
        let corpus: ArticleCorpus = records.into_iter().collect();
        let urls: Vec<&str> = corpus.iter().map(|(u, _)| u).collect();
        assert_eq!(urls, vec!["https://example.com/1", "https://example.com/2"]);
        assert_eq!(corpus.get("https://example.com/1"), Some("一"));
    }

    #[test]
    fn test_topic_display() {
        let topic = Topic {
            index: 0,
            words: vec![
                TopicWord {
                    word: "機械".to_string(),
                    weight: 0.25,
                },
                TopicWord {
                    word: "学習".to_string(),
                    weight: 0.125,
                },
            ],
        };
        assert_eq!(topic.to_string(), "0.250*\"機械\" + 0.125*\"学習\"");
    }

    #[test]
    fn test_article_topics_serialization() {
        let at = ArticleTopics {
            article_url: "https://example.com/a".to_string(),
            topics: vec![],
            word_topics: vec![("機械".to_string(), 1)],
        };
        let json = serde_json::to_string(&at).unwrap();
        assert!(json.contains("https://example.com/a"));
        assert!(json.contains("機械"));
    }
}
