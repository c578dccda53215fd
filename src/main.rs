//! # Tech Blog Topics
//!
//! A one-shot pipeline that scrapes every article from a Japanese tech blog's
//! tag listing, cleans the article text, stores it as a Parquet table and
//! fits a small LDA topic model to each article.
//!
//! ## Usage
//!
//! ```sh
//! tech_blog_topics                      # crawl, clean, store, model
//! tech_blog_topics --from-parquet       # model an existing table
//! ```
//!
//! ## Architecture
//!
//! The pipeline runs its stages sequentially:
//! 1. **Indexing**: walk the listing and its pagination in a browser and
//!    collect article URLs
//! 2. **Fetching**: download each article, reduce it to visible text and run
//!    the cleaning chain
//! 3. **Storage**: write `article_url` / `article_text` to Parquet
//! 4. **Modeling**: tokenize each article and print its topics

use clap::Parser;
use std::error::Error;
use tracing::{debug, info, instrument, warn};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

mod browser;
mod cleaning;
mod cli;
mod config;
mod models;
mod outputs;
mod scrapers;
mod topics;
mod utils;

use cli::Cli;
use config::PipelineConfig;
use models::{ArticleCorpus, ArticleTopics};
use outputs::{console, json, table};
use scrapers::tech_blog;
use topics::{LdaParams, StopWords, VibratoSegmenter, analyze_article};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("tech_blog_topics starting up");

    let args = Cli::parse();
    debug!(?args, "Parsed CLI arguments");

    let mut config = PipelineConfig::load(args.config.as_deref())?;
    args.apply_overrides(&mut config);

    let corpus = if args.from_parquet {
        table::read_articles(&config.output.parquet_path)?
    } else {
        let corpus = scrape_corpus(&config).await?;
        table::write_articles(&corpus, &config.output.parquet_path)?;
        corpus
    };
    if corpus.is_empty() {
        warn!("No articles collected; nothing to model");
    }
    info!(articles = corpus.len(), "Article corpus ready");

    let exported = model_corpus(&corpus, &config, !args.hide_tokens)?;

    if let Some(ref path) = args.topics_json {
        json::write_topics(&exported, path).await?;
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}

/// Crawl the listing in a browser session, then fetch and clean each article.
#[instrument(level = "info", skip_all, fields(seed_url = %config.crawl.seed_url))]
async fn scrape_corpus(config: &PipelineConfig) -> Result<ArticleCorpus, Box<dyn Error>> {
    let seed_url = config.crawl.seed_url.clone();
    let render_delay = config.crawl.render_delay();

    let article_urls = browser::with_browser(&config.crawl, |browser| async move {
        tech_blog::index_articles(&browser, &seed_url, render_delay).await
    })
    .await?;

    tech_blog::fetch_articles(article_urls).await
}

/// Fit and print topics for every article in `corpus`.
///
/// Articles left with no tokens after filtering are skipped with a warning.
#[instrument(level = "info", skip_all, fields(articles = corpus.len()))]
fn model_corpus(
    corpus: &ArticleCorpus,
    config: &PipelineConfig,
    show_tokens: bool,
) -> Result<Vec<ArticleTopics>, Box<dyn Error>> {
    let stopwords = StopWords::load(&config.model.stopwords_path)?;
    if stopwords.is_empty() {
        warn!(path = %config.model.stopwords_path.display(), "Stopword list is empty");
    }
    let segmenter = VibratoSegmenter::load(&config.model.dictionary_path)?;
    let params = LdaParams::from(&config.model);

    let mut exported = Vec::with_capacity(corpus.len());
    for (url, text) in corpus.iter() {
        match analyze_article(&segmenter, &stopwords, text, &params) {
            Ok(analysis) => {
                print!("{}", console::render_topics(url, &analysis.model.topics));
                if show_tokens {
                    print!("{}", console::render_tokens(&analysis.tokens));
                }
                exported.push(ArticleTopics {
                    article_url: url.to_string(),
                    topics: analysis.model.topics,
                    word_topics: analysis.model.word_topics,
                });
            }
            Err(e) => {
                warn!(%url, error = %e, "Skipping article");
            }
        }
    }

    info!(
        modeled = exported.len(),
        skipped = corpus.len() - exported.len(),
        "Finished topic modeling"
    );
    Ok(exported)
}
