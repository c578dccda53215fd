//! Latent Dirichlet Allocation fitted by collapsed Gibbs sampling.
//!
//! Each article is modeled on its own: the token sequence is mapped through
//! a [`Vocabulary`] into a bag of words, and that single document is the
//! whole corpus handed to the sampler.
//!
//! # Priors
//!
//! - topic-word prior `eta` is symmetric, `1 / K`
//! - document-topic prior `alpha` starts at `1 / K` per topic and is
//!   re-estimated during the second half of sampling with Minka's
//!   fixed-point update, so it ends up asymmetric
//!
//! Sampling is seeded, so the same tokens and parameters always produce the
//! same topics.

use crate::config::ModelConfig;
use crate::models::{Topic, TopicWord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, instrument};

/// Lower bound for every `alpha` component.
const MIN_ALPHA: f64 = 1e-3;
/// Sweeps between two `alpha` re-estimations once burn-in is over.
const ALPHA_UPDATE_INTERVAL: usize = 10;

/// Token → id mapping, ids assigned in order of first appearance.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    ids: HashMap<String, usize>,
    words: Vec<String>,
}

impl Vocabulary {
    pub fn from_documents<D: AsRef<[String]>>(documents: &[D]) -> Self {
        let mut vocab = Self::default();
        for doc in documents {
            for token in doc.as_ref() {
                if !vocab.ids.contains_key(token) {
                    vocab.ids.insert(token.clone(), vocab.words.len());
                    vocab.words.push(token.clone());
                }
            }
        }
        vocab
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn id(&self, word: &str) -> Option<usize> {
        self.ids.get(word).copied()
    }

    pub fn word(&self, id: usize) -> Option<&str> {
        self.words.get(id).map(String::as_str)
    }

    /// `(id, count)` pairs sorted by id. Unknown tokens are skipped.
    pub fn doc2bow(&self, tokens: &[String]) -> Vec<(usize, u32)> {
        let mut counts: HashMap<usize, u32> = HashMap::new();
        for token in tokens {
            if let Some(id) = self.id(token) {
                *counts.entry(id).or_insert(0) += 1;
            }
        }
        let mut bow: Vec<(usize, u32)> = counts.into_iter().collect();
        bow.sort_unstable_by_key(|&(id, _)| id);
        bow
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LdaParams {
    pub num_topics: usize,
    pub random_seed: u64,
    pub iterations: usize,
    pub top_words: usize,
}

impl Default for LdaParams {
    fn default() -> Self {
        Self::from(&ModelConfig::default())
    }
}

impl From<&ModelConfig> for LdaParams {
    fn from(config: &ModelConfig) -> Self {
        Self {
            num_topics: config.num_topics,
            random_seed: config.random_seed,
            iterations: config.iterations,
            top_words: config.top_words,
        }
    }
}

/// A fitted model, reduced to what gets reported.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicModel {
    /// Exactly `num_topics` topics, each with its heaviest words first.
    pub topics: Vec<Topic>,
    /// Dominant topic of every vocabulary word, in vocabulary order.
    pub word_topics: Vec<(String, usize)>,
    /// Final document-topic prior.
    pub alpha: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    /// No tokens survived filtering.
    EmptyDocument,
    /// `num_topics` was zero.
    NoTopics,
}

impl fmt::Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::EmptyDocument => f.write_str("document has no tokens to model"),
            ModelError::NoTopics => f.write_str("topic count must be at least 1"),
        }
    }
}

impl std::error::Error for ModelError {}

/// Fit topics to a single document's tokens.
#[instrument(level = "debug", skip_all, fields(tokens = tokens.len(), k = params.num_topics))]
pub fn fit_topics(tokens: &[String], params: &LdaParams) -> Result<TopicModel, ModelError> {
    let vocab = Vocabulary::from_documents(&[tokens]);
    let corpus = vec![vocab.doc2bow(tokens)];
    fit_corpus(&corpus, &vocab, params)
}

/// Fit topics to a bag-of-words corpus over `vocab`.
pub fn fit_corpus(
    corpus: &[Vec<(usize, u32)>],
    vocab: &Vocabulary,
    params: &LdaParams,
) -> Result<TopicModel, ModelError> {
    let k = params.num_topics;
    if k == 0 {
        return Err(ModelError::NoTopics);
    }

    let docs: Vec<Vec<usize>> = corpus
        .iter()
        .map(|bow| {
            bow.iter()
                .flat_map(|&(id, count)| std::iter::repeat_n(id, count as usize))
                .collect()
        })
        .collect();
    if vocab.is_empty() || docs.iter().all(Vec::is_empty) {
        return Err(ModelError::EmptyDocument);
    }

    let mut sampler = GibbsSampler::new(&docs, vocab.len(), k, params.random_seed);
    let burn_in = params.iterations / 2;
    for sweep in 0..params.iterations {
        sampler.sweep();
        if sweep >= burn_in && (sweep - burn_in) % ALPHA_UPDATE_INTERVAL == 0 {
            sampler.update_alpha();
        }
    }
    debug!(alpha = ?sampler.alpha, "Finished sampling");

    Ok(sampler.into_model(vocab, params.top_words))
}

struct GibbsSampler<'a> {
    docs: &'a [Vec<usize>],
    num_words: usize,
    eta: f64,
    alpha: Vec<f64>,
    /// Topic of every token position.
    assignments: Vec<Vec<usize>>,
    /// Tokens per (document, topic).
    doc_topic: Vec<Vec<u32>>,
    /// Tokens per (topic, word).
    topic_word: Vec<Vec<u32>>,
    /// Tokens per topic.
    topic_totals: Vec<u32>,
    rng: StdRng,
    weights: Vec<f64>,
}

impl<'a> GibbsSampler<'a> {
    fn new(docs: &'a [Vec<usize>], num_words: usize, k: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut doc_topic = vec![vec![0u32; k]; docs.len()];
        let mut topic_word = vec![vec![0u32; num_words]; k];
        let mut topic_totals = vec![0u32; k];

        let assignments = docs
            .iter()
            .enumerate()
            .map(|(d, doc)| {
                doc.iter()
                    .map(|&w| {
                        let t = rng.random_range(0..k);
                        doc_topic[d][t] += 1;
                        topic_word[t][w] += 1;
                        topic_totals[t] += 1;
                        t
                    })
                    .collect()
            })
            .collect();

        Self {
            docs,
            num_words,
            eta: 1.0 / k as f64,
            alpha: vec![1.0 / k as f64; k],
            assignments,
            doc_topic,
            topic_word,
            topic_totals,
            rng,
            weights: vec![0.0; k],
        }
    }

    fn sweep(&mut self) {
        let v_eta = self.num_words as f64 * self.eta;
        for (d, doc) in self.docs.iter().enumerate() {
            for (i, &w) in doc.iter().enumerate() {
                let old = self.assignments[d][i];
                self.doc_topic[d][old] -= 1;
                self.topic_word[old][w] -= 1;
                self.topic_totals[old] -= 1;

                let mut total = 0.0;
                for (t, weight) in self.weights.iter_mut().enumerate() {
                    *weight = (self.doc_topic[d][t] as f64 + self.alpha[t])
                        * (self.topic_word[t][w] as f64 + self.eta)
                        / (self.topic_totals[t] as f64 + v_eta);
                    total += *weight;
                }

                let mut target = self.rng.random::<f64>() * total;
                let mut new = self.weights.len() - 1;
                for (t, &weight) in self.weights.iter().enumerate() {
                    if target < weight {
                        new = t;
                        break;
                    }
                    target -= weight;
                }

                self.assignments[d][i] = new;
                self.doc_topic[d][new] += 1;
                self.topic_word[new][w] += 1;
                self.topic_totals[new] += 1;
            }
        }
    }

    /// One Minka fixed-point step for the document-topic prior.
    fn update_alpha(&mut self) {
        let alpha_sum: f64 = self.alpha.iter().sum();
        let denominator: f64 = self
            .docs
            .iter()
            .map(|doc| digamma(doc.len() as f64 + alpha_sum) - digamma(alpha_sum))
            .sum();
        if denominator <= 0.0 {
            return;
        }

        for t in 0..self.alpha.len() {
            let a = self.alpha[t];
            let numerator: f64 = self
                .doc_topic
                .iter()
                .map(|counts| digamma(counts[t] as f64 + a) - digamma(a))
                .sum();
            self.alpha[t] = (a * numerator / denominator).max(MIN_ALPHA);
        }
    }

    fn into_model(self, vocab: &Vocabulary, top_words: usize) -> TopicModel {
        let v_eta = self.num_words as f64 * self.eta;

        let topics = self
            .topic_word
            .iter()
            .zip(&self.topic_totals)
            .enumerate()
            .map(|(index, (counts, &total))| {
                let mut weighted: Vec<(usize, f64)> = counts
                    .iter()
                    .enumerate()
                    .map(|(w, &c)| (w, (c as f64 + self.eta) / (total as f64 + v_eta)))
                    .collect();
                weighted.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
                let words = weighted
                    .into_iter()
                    .take(top_words.max(1))
                    .filter_map(|(w, weight)| {
                        vocab.word(w).map(|word| TopicWord {
                            word: word.to_string(),
                            weight,
                        })
                    })
                    .collect();
                Topic { index, words }
            })
            .collect();

        let word_topics = (0..self.num_words)
            .filter_map(|w| {
                let mut best = 0;
                for t in 1..self.topic_word.len() {
                    if self.topic_word[t][w] > self.topic_word[best][w] {
                        best = t;
                    }
                }
                vocab.word(w).map(|word| (word.to_string(), best))
            })
            .collect();

        TopicModel {
            topics,
            word_topics,
            alpha: self.alpha,
        }
    }
}

/// Digamma function for positive arguments.
fn digamma(mut x: f64) -> f64 {
    let mut result = 0.0;
    while x < 6.0 {
        result -= 1.0 / x;
        x += 1.0;
    }
    let inv2 = 1.0 / (x * x);
    result + x.ln()
        - 0.5 / x
        - inv2 * (1.0 / 12.0 - inv2 * (1.0 / 120.0 - inv2 * (1.0 / 252.0 - inv2 * (1.0 / 240.0 - inv2 / 132.0))))
}
