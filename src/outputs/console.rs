//! Plain-text rendering of fitted topics for stdout.
//!
//! Each article is printed as its URL followed by one block per topic:
//!
//! ```text
//! Article: https://www.flywheel.jp/topics/...
//! Topic: 0
//! Words: 0.041*"データ" + 0.033*"分析" + ...
//! ```

use crate::models::Topic;
use std::fmt::Write;

/// Render one article's topics.
pub fn render_topics(article_url: &str, topics: &[Topic]) -> String {
    let mut out = String::new();
    writeln!(out, "Article: {article_url}").unwrap();
    for topic in topics {
        writeln!(out, "Topic: {}", topic.index).unwrap();
        writeln!(out, "Words: {topic}").unwrap();
    }
    out
}

/// Render an article's filtered tokens.
pub fn render_tokens(tokens: &[String]) -> String {
    format!("Below are the tokens:\n{tokens:?}\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TopicWord;

    #[test]
    fn test_render_topics() {
        let topics = vec![
            Topic {
                index: 0,
                words: vec![TopicWord {
                    word: "データ".to_string(),
                    weight: 0.5,
                }],
            },
            Topic {
                index: 1,
                words: vec![TopicWord {
                    word: "分析".to_string(),
                    weight: 0.25,
                }],
            },
        ];
        let out = render_topics("https://blog.example.jp/a/", &topics);
        assert_eq!(
            out,
            "Article: https://blog.example.jp/a/\nTopic: 0\nWords: 0.500*\"データ\"\nTopic: 1\nWords: 0.250*\"分析\"\n"
        );
    }

    #[test]
    fn test_render_tokens() {
        let out = render_tokens(&["機械".to_string(), "学習".to_string()]);
        assert_eq!(out, "Below are the tokens:\n[\"機械\", \"学習\"]\n");
    }
}
