//! Scrapers for the blog being modeled.
//!
//! The scraper follows a two-phase pattern:
//!
//! 1. **Indexing**: walk the tag listing and its pagination through a
//!    browser and collect article URLs
//! 2. **Fetching**: download each article with a plain HTTP GET and clean
//!    its text
//!
//! | Source | Module | Indexing | Fetching |
//! |--------|--------|----------|----------|
//! | Flywheel tech blog | [`tech_blog`] | WebDriver, rendered listing pages | `reqwest`, static article pages |

pub mod tech_blog;
