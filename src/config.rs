//! Pipeline configuration.
//!
//! Every knob has a default matching the blog being scraped, so the pipeline
//! runs with no configuration at all. An optional YAML file can override any
//! subset of fields:
//!
//! ```yaml
//! crawl:
//!   seed_url: https://www.flywheel.jp/topics-tag/tech/
//!   render_delay_secs: 5
//! output:
//!   parquet_path: ./article_data.parquet
//! model:
//!   num_topics: 3
//!   random_seed: 0
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, instrument};

pub const DEFAULT_SEED_URL: &str = "https://www.flywheel.jp/topics-tag/tech/";

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub crawl: CrawlConfig,
    pub output: OutputConfig,
    pub model: ModelConfig,
}

/// Link collection and browser settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CrawlConfig {
    /// Tag listing page the crawl starts from.
    pub seed_url: String,
    /// WebDriver server binary.
    pub chromedriver_path: PathBuf,
    /// Port the WebDriver server listens on.
    pub webdriver_port: u16,
    /// Run the browser without a window.
    pub headless: bool,
    /// Fixed wait after each listing page load.
    pub render_delay_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_url: DEFAULT_SEED_URL.to_string(),
            chromedriver_path: PathBuf::from("./chromedriver"),
            webdriver_port: 9515,
            headless: true,
            render_delay_secs: 5,
        }
    }
}

impl CrawlConfig {
    pub fn render_delay(&self) -> Duration {
        Duration::from_secs(self.render_delay_secs)
    }

    pub fn webdriver_url(&self) -> String {
        format!("http://localhost:{}", self.webdriver_port)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Article table, overwritten on each run.
    pub parquet_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            parquet_path: PathBuf::from("./article_data.parquet"),
        }
    }
}

/// Tokenizer and topic model settings.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Newline-delimited stopword list.
    pub stopwords_path: PathBuf,
    /// Vibrato system dictionary, plain or `.zst` compressed.
    pub dictionary_path: PathBuf,
    pub num_topics: usize,
    pub random_seed: u64,
    /// Gibbs sampling sweeps over the document.
    pub iterations: usize,
    /// Words reported per topic.
    pub top_words: usize,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            stopwords_path: PathBuf::from("japanese_stopwords.txt"),
            dictionary_path: PathBuf::from("system.dic.zst"),
            num_topics: 3,
            random_seed: 0,
            iterations: 200,
            top_words: 10,
        }
    }
}

impl PipelineConfig {
    /// Load from a YAML file, or fall back to defaults when `path` is `None`.
    #[instrument(level = "info")]
    pub fn load(path: Option<&Path>) -> Result<Self, Box<dyn Error>> {
        match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)?;
                let config = Self::from_yaml(&raw)?;
                info!(path = %p.display(), "Loaded configuration file");
                Ok(config)
            }
            None => {
                info!("No configuration file given; using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_yaml(raw: &str) -> Result<Self, Box<dyn Error>> {
        Ok(serde_yaml::from_str(raw)?)
    }
}
