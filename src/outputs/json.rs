//! JSON export of fitted topics.
//!
//! Written only when `--topics-json` is given. The file holds one entry per
//! modeled article:
//!
//! ```text
//! [
//!   {
//!     "article_url": "https://...",
//!     "topics": [{ "index": 0, "words": [{ "word": "...", "weight": 0.05 }] }],
//!     "word_topics": [["...", 0]]
//!   }
//! ]
//! ```

use crate::models::ArticleTopics;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{error, info, instrument};

/// Serialize `articles` to `path`, creating parent directories as needed.
#[instrument(level = "info", skip_all, fields(path = %path.display(), articles = articles.len()))]
pub async fn write_topics(articles: &[ArticleTopics], path: &Path) -> Result<(), Box<dyn Error>> {
    let json = serde_json::to_string_pretty(articles)?;

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        if let Err(e) = fs::create_dir_all(dir).await {
            error!(dir = %dir.display(), error = %e, "Failed to create JSON dir");
            return Err(e.into());
        }
    }

    fs::write(path, json).await?;
    info!("Wrote topics JSON");
    Ok(())
}
