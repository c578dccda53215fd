//! Flywheel tech blog scraper.
//!
//! Scrapes the [tech tag listing](https://www.flywheel.jp/topics-tag/tech/)
//! and the articles it links to.
//!
//! # Listing markup
//!
//! - Pagination links are `<a class="page larger" href="...">`
//! - Article cards are `<li class="pb-100 pb-sp-70">`; the article link is
//!   the card's anchor that carries no `class` attribute (the classed
//!   anchors point at tags and categories)
//!
//! Listing pages are rendered client-side, so they go through a browser.
//! Article pages are static and are fetched with a plain GET.

use crate::browser::RenderPage;
use crate::cleaning::{ArticleText, extract_article_text};
use crate::models::ArticleCorpus;
use crate::utils::truncate_for_log;
use futures::stream::{self, StreamExt, TryStreamExt};
use itertools::Itertools;
use reqwest::get;
use scraper::{Html, Selector};
use std::error::Error;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};
use url::Url;

const PAGINATION_SELECTOR: &str = "a.page.larger";
const ARTICLE_LINK_SELECTOR: &str = "li.pb-100.pb-sp-70 a:not([class])";

/// Every listing page: the pagination links in document order, then the seed.
///
/// A pagination anchor without an `href` is an error, like an article anchor
/// without one.
pub fn pagination_urls(html: &str, seed_url: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let base = Url::parse(seed_url)?;
    let document = Html::parse_document(html);
    let selector = Selector::parse(PAGINATION_SELECTOR)?;

    let mut pages = Vec::new();
    for element in document.select(&selector) {
        let href = element
            .value()
            .attr("href")
            .ok_or_else(|| format!("pagination anchor without href on {seed_url}"))?;
        pages.push(base.join(href)?.to_string());
    }
    pages.push(seed_url.to_string());
    Ok(pages)
}

/// Article URLs linked from one rendered listing page.
///
/// An article anchor without an `href` means the markup changed under us and
/// is reported as an error.
pub fn article_links(html: &str, page_url: &str) -> Result<Vec<String>, Box<dyn Error>> {
    let base = Url::parse(page_url)?;
    let document = Html::parse_document(html);
    let selector = Selector::parse(ARTICLE_LINK_SELECTOR)?;

    let mut links = Vec::new();
    for element in document.select(&selector) {
        let href = element
            .value()
            .attr("href")
            .ok_or_else(|| format!("article anchor without href on {page_url}"))?;
        links.push(base.join(href)?.to_string());
    }
    Ok(links)
}

/// Collect the deduplicated article URLs reachable from `seed_url`.
///
/// Each listing page is given `render_delay` to finish client-side rendering
/// before its source is read. An article listed on several pages (e.g. the
/// seed page and its own page) is returned once, in first-seen order.
#[instrument(level = "info", skip(browser))]
pub async fn index_articles<R: RenderPage>(
    browser: &R,
    seed_url: &str,
    render_delay: Duration,
) -> Result<Vec<String>, Box<dyn Error>> {
    browser.goto(seed_url).await?;
    let seed_html = browser.source().await?;
    let pages = pagination_urls(&seed_html, seed_url)?;
    info!(count = pages.len(), "Collected listing pages");

    let mut article_urls = Vec::new();
    for page in &pages {
        browser.goto(page).await?;
        sleep(render_delay).await;
        let html = browser.source().await?;

        for link in article_links(&html, page)? {
            article_urls.push(link);
            info!(scraped = article_urls.len(), "Article URLs scraped so far");
        }
    }

    let total = article_urls.len();
    let article_urls: Vec<String> = article_urls.into_iter().unique().collect();
    info!(
        scraped = total,
        unique = article_urls.len(),
        "Indexed article URLs"
    );
    debug!(urls = ?article_urls, "Article URLs");

    Ok(article_urls)
}

/// Download one article page.
#[instrument(level = "debug", skip_all, fields(%url))]
pub async fn fetch_article(url: &str) -> Result<String, Box<dyn Error>> {
    let body = get(url).await?.text().await?;
    debug!(bytes = body.len(), "Fetched article");
    Ok(body)
}

/// Fetch and clean every article, one at a time.
///
/// Any fetch failure aborts the stage. Articles without content markers are
/// still recorded, with their unfiltered text.
#[instrument(level = "info", skip_all, fields(count = urls.len()))]
pub async fn fetch_articles(urls: Vec<String>) -> Result<ArticleCorpus, Box<dyn Error>> {
    let pages: Vec<(String, String)> = stream::iter(urls)
        .then(|url: String| async move {
            let html = fetch_article(&url).await?;
            Ok::<_, Box<dyn Error>>((url, html))
        })
        .try_collect()
        .await?;

    Ok(clean_pages(pages))
}

/// Clean fetched `(url, html)` pages into one record per URL.
pub fn clean_pages<I>(pages: I) -> ArticleCorpus
where
    I: IntoIterator<Item = (String, String)>,
{
    let mut corpus = ArticleCorpus::new();
    let mut matched = 0usize;
    let mut fallback = 0usize;

    for (url, html) in pages {
        let ArticleText { text, matched: hit } = extract_article_text(&html);
        if hit {
            matched += 1;
            debug!(%url, chars = text.chars().count(), "Cleaned article");
        } else {
            fallback += 1;
            warn!(
                %url,
                preview = %truncate_for_log(&text, 80),
                "No content markers found; keeping unfiltered text"
            );
        }
        corpus.insert(url, text);
    }

    info!(
        records = corpus.len(),
        matched,
        fallback,
        "Cleaned article texts"
    );
    corpus
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    const SEED: &str = "https://blog.example.jp/topics-tag/tech/";

    struct CannedPages {
        pages: HashMap<String, String>,
        visited: RefCell<Vec<String>>,
    }

    impl CannedPages {
        fn new(pages: &[(&str, String)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(u, h)| (u.to_string(), h.clone()))
                    .collect(),
                visited: RefCell::new(Vec::new()),
            }
        }
    }

    impl RenderPage for CannedPages {
        async fn goto(&self, url: &str) -> Result<(), Box<dyn Error>> {
            if !self.pages.contains_key(url) {
                return Err(format!("no page for {url}").into());
            }
            self.visited.borrow_mut().push(url.to_string());
            Ok(())
        }

        async fn source(&self) -> Result<String, Box<dyn Error>> {
            let visited = self.visited.borrow();
            let current = visited.last().ok_or("no page loaded")?;
            Ok(self.pages[current].clone())
        }
    }

    fn listing(pagination: &[&str], articles: &[&str]) -> String {
        let mut html = String::from("<html><body><div class=\"nav\">");
        for p in pagination {
            html.push_str(&format!("<a class=\"page larger\" href=\"{p}\">n</a>"));
        }
        html.push_str("<a class=\"page\" href=\"/ignored/\">x</a></div><ul>");
        for a in articles {
            html.push_str(&format!(
                "<li class=\"pb-100 pb-sp-70\"><a href=\"{a}\">title</a><a class=\"tag\" href=\"/tag/rust/\">rust</a></li>"
            ));
        }
        html.push_str("<li class=\"other\"><a href=\"/not-an-article/\">x</a></li></ul></body></html>");
        html
    }

    #[test]
    fn test_pagination_urls_appends_seed() {
        let html = listing(&["/topics-tag/tech/page/2/", "/topics-tag/tech/page/3/"], &[]);
        let pages = pagination_urls(&html, SEED).unwrap();
        assert_eq!(
            pages,
            vec![
                "https://blog.example.jp/topics-tag/tech/page/2/",
                "https://blog.example.jp/topics-tag/tech/page/3/",
                SEED,
            ]
        );
    }

    #[test]
    fn test_pagination_anchor_without_href_is_an_error() {
        let html = "<a class=\"page larger\">2</a><a class=\"page larger\" href=\"/p/3/\">3</a>";
        let err = pagination_urls(html, SEED).unwrap_err();
        assert!(err.to_string().contains("pagination anchor without href"));
    }

    #[test]
    fn test_article_links_skip_classed_anchors() {
        let html = listing(&[], &["https://blog.example.jp/topics/a/", "/topics/b/"]);
        let links = article_links(&html, SEED).unwrap();
        assert_eq!(
            links,
            vec![
                "https://blog.example.jp/topics/a/",
                "https://blog.example.jp/topics/b/",
            ]
        );
    }

    #[test]
    fn test_article_link_without_href_is_an_error() {
        let html = "<ul><li class=\"pb-100 pb-sp-70\"><a>broken</a></li></ul>";
        assert!(article_links(html, SEED).is_err());
    }

    #[tokio::test]
    async fn test_index_articles_deduplicates_across_pages() {
        let page2 = "https://blog.example.jp/topics-tag/tech/page/2/";
        let browser = CannedPages::new(&[
            (
                SEED,
                listing(&[page2], &["/topics/new/", "/topics/shared/"]),
            ),
            (page2, listing(&[], &["/topics/shared/", "/topics/old/"])),
        ]);

        let urls = index_articles(&browser, SEED, Duration::ZERO).await.unwrap();

        assert_eq!(
            urls,
            vec![
                "https://blog.example.jp/topics/shared/",
                "https://blog.example.jp/topics/old/",
                "https://blog.example.jp/topics/new/",
            ]
        );
        assert_eq!(*browser.visited.borrow(), vec![SEED, page2, SEED]);
    }

    #[tokio::test]
    async fn test_index_articles_propagates_load_failure() {
        let browser = CannedPages::new(&[(
            SEED,
            listing(&["https://blog.example.jp/missing/"], &[]),
        )]);
        assert!(index_articles(&browser, SEED, Duration::ZERO).await.is_err());
    }

    #[test]
    fn test_clean_pages_one_record_per_url() {
        let with_markers = "<html><body><div><!-- contents start -->ブログ本文です<!-- contents end --></div></body></html>";
        let without_markers = "<html><body><p>plain page</p></body></html>";
        let corpus = clean_pages(vec![
            ("https://blog.example.jp/a/".to_string(), with_markers.to_string()),
            ("https://blog.example.jp/b/".to_string(), without_markers.to_string()),
        ]);

        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.get("https://blog.example.jp/a/"), Some("本文です"));
        assert_eq!(corpus.get("https://blog.example.jp/b/"), Some("plain page"));
    }
}
