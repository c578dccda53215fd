//! Output generation for the article table, topic reports and JSON export.
//!
//! # Submodules
//!
//! - [`table`]: writes and reads the Parquet `article_url` / `article_text` table
//! - [`console`]: renders topics and tokens for stdout
//! - [`json`]: writes every article's topics to a JSON file
//!
//! # Output Structure
//!
//! ```text
//! ./article_data.parquet   # overwritten each run
//! <topics_json>            # only with --topics-json
//! ```

pub mod console;
pub mod json;
pub mod table;
