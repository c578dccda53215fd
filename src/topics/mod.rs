//! Per-article topic modeling.
//!
//! Two free functions do the work, with every dependency passed in:
//!
//! - [`tokenize`]: segment the text and filter stopwords and hiragana-only
//!   tokens
//! - [`fit_topics`]: fit an LDA model to that one document
//!
//! [`analyze_article`] chains them for the pipeline.

pub mod lda;
pub mod tokenizer;

pub use lda::{LdaParams, ModelError, TopicModel, fit_topics};
pub use tokenizer::{Segmenter, StopWords, VibratoSegmenter, tokenize};

/// Tokens and fitted topics for one article.
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleAnalysis {
    pub tokens: Vec<String>,
    pub model: TopicModel,
}

/// Tokenize `text` and fit topics to it.
pub fn analyze_article<S: Segmenter + ?Sized>(
    segmenter: &S,
    stopwords: &StopWords,
    text: &str,
    params: &LdaParams,
) -> Result<ArticleAnalysis, ModelError> {
    let tokens = tokenize(segmenter, stopwords, text);
    let model = fit_topics(&tokens, params)?;
    Ok(ArticleAnalysis { tokens, model })
}
