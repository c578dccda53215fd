//! Command-line interface definitions for the topic pipeline.
//!
//! Every flag is optional: without arguments the pipeline crawls the default
//! blog, writes `./article_data.parquet` and prints topics for each article.
//! Flags override the matching fields of the YAML configuration file.

use crate::config::PipelineConfig;
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the scrape → clean → model pipeline.
///
/// # Examples
///
/// ```sh
/// # Full run with defaults
/// tech_blog_topics
///
/// # Reuse an existing article table, printing topics only
/// tech_blog_topics --from-parquet --hide-tokens
///
/// # Export topics as JSON
/// tech_blog_topics -c pipeline.yaml --topics-json ./topics.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML configuration file
    #[arg(short, long, env = "TECH_BLOG_TOPICS_CONFIG")]
    pub config: Option<PathBuf>,

    /// Listing page to start the crawl from
    #[arg(long)]
    pub seed_url: Option<String>,

    /// Path to the WebDriver (chromedriver) binary
    #[arg(long, env = "CHROMEDRIVER_PATH")]
    pub chromedriver: Option<PathBuf>,

    /// Article table to write (or read with --from-parquet)
    #[arg(short, long)]
    pub parquet: Option<PathBuf>,

    /// Newline-delimited stopword file
    #[arg(long)]
    pub stopwords: Option<PathBuf>,

    /// Vibrato system dictionary
    #[arg(long, env = "VIBRATO_DICTIONARY")]
    pub dictionary: Option<PathBuf>,

    /// Skip crawling and model the articles already stored in the Parquet file
    #[arg(long)]
    pub from_parquet: bool,

    /// Don't print each article's filtered tokens after its topics
    #[arg(long)]
    pub hide_tokens: bool,

    /// Write every article's topics to this JSON file
    #[arg(long)]
    pub topics_json: Option<PathBuf>,
}

impl Cli {
    /// Apply the flags that were given on top of `config`.
    pub fn apply_overrides(&self, config: &mut PipelineConfig) {
        if let Some(ref seed_url) = self.seed_url {
            config.crawl.seed_url = seed_url.clone();
        }
        if let Some(ref chromedriver) = self.chromedriver {
            config.crawl.chromedriver_path = chromedriver.clone();
        }
        if let Some(ref parquet) = self.parquet {
            config.output.parquet_path = parquet.clone();
        }
        if let Some(ref stopwords) = self.stopwords {
            config.model.stopwords_path = stopwords.clone();
        }
        if let Some(ref dictionary) = self.dictionary {
            config.model.dictionary_path = dictionary.clone();
        }
    }
}
