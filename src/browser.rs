//! Browser automation for pages that render client-side.
//!
//! The blog's listing pages fill in their article cards with JavaScript, so
//! they are loaded through a real browser driven over WebDriver. A
//! [`BrowserSession`] owns both the `chromedriver` subprocess and the
//! WebDriver session on top of it; [`with_browser`] scopes it so the session
//! is ended and the subprocess killed on every exit path.
//!
//! [`run_session`] holds that scoping for any [`Session`], so the release
//! path can be exercised without a driver binary.

use crate::config::CrawlConfig;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use std::error::Error;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::{Child, Command};
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// How many times to try reaching a freshly spawned driver.
const CONNECT_ATTEMPTS: usize = 50;
const CONNECT_INTERVAL: Duration = Duration::from_millis(100);

/// Something that can load a page and hand back its rendered markup.
pub trait RenderPage {
    /// Navigate to `url`.
    async fn goto(&self, url: &str) -> Result<(), Box<dyn Error>>;

    /// Markup of the current page as rendered so far.
    async fn source(&self) -> Result<String, Box<dyn Error>>;
}

/// A live browser session that hands out page handles and must be released.
pub trait Session {
    type Page: RenderPage;

    /// A handle for driving pages in this session.
    fn page(&self) -> Self::Page;

    /// Release the session. Failures are logged, not returned.
    async fn shutdown(self);
}

/// Cheap, cloneable handle to a live WebDriver session.
#[derive(Clone)]
pub struct Browser {
    client: Client,
}

impl RenderPage for Browser {
    #[instrument(level = "debug", skip(self))]
    async fn goto(&self, url: &str) -> Result<(), Box<dyn Error>> {
        self.client.goto(url).await?;
        Ok(())
    }

    async fn source(&self) -> Result<String, Box<dyn Error>> {
        let source = self.client.source().await?;
        debug!(bytes = source.len(), "Read page source");
        Ok(source)
    }
}

/// A WebDriver server process plus the session opened on it.
pub struct BrowserSession {
    client: Client,
    driver: Child,
}

impl BrowserSession {
    /// Spawn the driver binary and open a session on it.
    ///
    /// The subprocess is `kill_on_drop`, so an error or panic before
    /// [`shutdown`](Self::shutdown) still takes it down.
    #[instrument(level = "info", skip_all, fields(driver = %config.chromedriver_path.display(), port = config.webdriver_port))]
    pub async fn launch(config: &CrawlConfig) -> Result<Self, Box<dyn Error>> {
        let driver = Command::new(&config.chromedriver_path)
            .arg(format!("--port={}", config.webdriver_port))
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()?;
        info!("Spawned WebDriver server");

        let mut args = vec!["--disable-gpu", "--no-sandbox"];
        if config.headless {
            args.push("--headless=new");
        }
        let mut capabilities = serde_json::Map::new();
        capabilities.insert("goog:chromeOptions".to_string(), json!({ "args": args }));

        // reqwest and the WebDriver connector pull in different rustls
        // backends; an error here only means one is already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let webdriver_url = config.webdriver_url();
        let mut attempt = 0usize;
        let client = loop {
            attempt += 1;
            let mut builder = ClientBuilder::rustls()?;
            builder.capabilities(capabilities.clone());
            match builder.connect(&webdriver_url).await {
                Ok(client) => break client,
                Err(e) if attempt < CONNECT_ATTEMPTS => {
                    debug!(attempt, error = %e, "WebDriver not ready yet");
                    sleep(CONNECT_INTERVAL).await;
                }
                Err(e) => return Err(e.into()),
            }
        };
        info!(attempt, "WebDriver session opened");

        Ok(Self { client, driver })
    }
}

impl Session for BrowserSession {
    type Page = Browser;

    fn page(&self) -> Browser {
        Browser {
            client: self.client.clone(),
        }
    }

    /// End the WebDriver session, then kill the driver process.
    #[instrument(level = "info", skip_all)]
    async fn shutdown(mut self) {
        if let Err(e) = self.client.close().await {
            warn!(error = %e, "Failed to close WebDriver session");
        }
        if let Err(e) = self.driver.kill().await {
            warn!(error = %e, "Failed to stop WebDriver server");
        }
        info!("Browser session released");
    }
}

/// Run `f` against a fresh browser session and release it afterwards.
pub async fn with_browser<T, F, Fut>(config: &CrawlConfig, f: F) -> Result<T, Box<dyn Error>>
where
    F: FnOnce(Browser) -> Fut,
    Fut: Future<Output = Result<T, Box<dyn Error>>>,
{
    let session = BrowserSession::launch(config).await?;
    run_session(session, f).await
}

/// Run `f` against `session`, then shut the session down.
///
/// The session is released whether `f` succeeds or fails, and `f`'s result
/// is returned unchanged.
pub async fn run_session<S, T, F, Fut>(session: S, f: F) -> Result<T, Box<dyn Error>>
where
    S: Session,
    F: FnOnce(S::Page) -> Fut,
    Fut: Future<Output = Result<T, Box<dyn Error>>>,
{
    let outcome = f(session.page()).await;
    session.shutdown().await;
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Clone)]
    struct BlankPage;

    impl RenderPage for BlankPage {
        async fn goto(&self, _url: &str) -> Result<(), Box<dyn Error>> {
            Ok(())
        }

        async fn source(&self) -> Result<String, Box<dyn Error>> {
            Ok("<html></html>".to_string())
        }
    }

    struct TrackedSession {
        released: Rc<Cell<bool>>,
    }

    impl Session for TrackedSession {
        type Page = BlankPage;

        fn page(&self) -> BlankPage {
            BlankPage
        }

        async fn shutdown(self) {
            self.released.set(true);
        }
    }

    #[tokio::test]
    async fn test_session_released_when_work_fails() {
        let released = Rc::new(Cell::new(false));
        let session = TrackedSession {
            released: released.clone(),
        };

        let outcome = run_session(session, |page| async move {
            page.goto("https://blog.example.jp/").await?;
            Err::<(), Box<dyn Error>>("listing markup changed".into())
        })
        .await;

        assert!(released.get());
        assert_eq!(outcome.unwrap_err().to_string(), "listing markup changed");
    }

    #[tokio::test]
    async fn test_session_released_after_success() {
        let released = Rc::new(Cell::new(false));
        let session = TrackedSession {
            released: released.clone(),
        };

        let html = run_session(session, |page| async move { page.source().await })
            .await
            .unwrap();

        assert!(released.get());
        assert_eq!(html, "<html></html>");
    }
}
