//! Browser Session Module
//!
//! Thin wrapper over a thirtyfour WebDriver session against a local
//! chromedriver. Owns exactly one headless Chrome session; detail pages open
//! in a short-lived extra tab so the listing page stays loaded.

use std::time::Duration;

use anyhow::{Context, Result};
use thirtyfour::prelude::*;

const DEFAULT_WEBDRIVER_URL: &str = "http://localhost:9515";

/// Identifying user agent sent with every page load.
pub const USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 \
    (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 HackScrapeBot/1.0";

/// Page-load budget for both the listing and detail pages.
pub const PAGE_LOAD_TIMEOUT_MS: u64 = 20_000;

/// Best-effort wait for the listing heading marker to render.
pub const HEADING_WAIT_MS: u64 = 10_000;

const POLL_INTERVAL_MS: u64 = 500;

pub struct BrowserSession {
    driver: WebDriver,
}

impl BrowserSession {
    /// Connect to chromedriver (`WEBDRIVER_URL`, default localhost:9515) and
    /// start a headless Chrome session with the identifying user agent.
    pub async fn launch() -> Result<Self> {
        let mut caps = DesiredCapabilities::chrome();
        caps.add_chrome_option(
            "args",
            vec![
                "--headless=new".to_string(),
                "--no-sandbox".to_string(),
                "--disable-dev-shm-usage".to_string(),
                "--disable-gpu".to_string(),
                "--window-size=1920,1080".to_string(),
                format!("--user-agent={}", USER_AGENT),
            ],
        )?;

        let webdriver_url = std::env::var("WEBDRIVER_URL")
            .unwrap_or_else(|_| DEFAULT_WEBDRIVER_URL.to_string());
        let driver = WebDriver::new(&webdriver_url, caps)
            .await
            .context("Failed to connect to ChromeDriver")?;
        driver
            .set_page_load_timeout(Duration::from_millis(PAGE_LOAD_TIMEOUT_MS))
            .await
            .context("Failed to set page load timeout")?;

        Ok(Self { driver })
    }

    pub async fn goto(&self, url: &str) -> Result<()> {
        self.driver
            .goto(url)
            .await
            .with_context(|| format!("Failed to navigate to {}", url))
    }

    /// URL the browser actually landed on, if it can be read.
    pub async fn current_url(&self) -> Option<String> {
        self.driver.current_url().await.ok().map(|url| url.to_string())
    }

    /// Wait up to `timeout` for `css` to appear. A miss is tolerated, since
    /// extraction itself tolerates zero results.
    pub async fn wait_for(&self, css: &str, timeout: Duration) -> bool {
        self.driver
            .query(By::Css(css))
            .wait(timeout, Duration::from_millis(POLL_INTERVAL_MS))
            .first()
            .await
            .is_ok()
    }

    pub async fn source(&self) -> Result<String> {
        self.driver
            .source()
            .await
            .context("Failed to get page source")
    }

    /// Load `url` in a new tab and return its page source. Navigation or tab
    /// failures yield `None`; the tab is closed and focus restored on every
    /// path, best-effort.
    pub async fn fetch_detail(&self, url: &str) -> Option<String> {
        let original = match self.driver.window().await {
            Ok(handle) => handle,
            Err(e) => {
                println!("Warning: could not read current window handle: {}", e);
                return None;
            }
        };
        let tab = match self.driver.new_tab().await {
            Ok(handle) => handle,
            Err(e) => {
                println!("Warning: could not open detail tab for {}: {}", url, e);
                return None;
            }
        };
        if let Err(e) = self.driver.switch_to_window(tab).await {
            println!("Warning: could not switch to detail tab: {}", e);
            return None;
        }

        let html = match self.driver.goto(url).await {
            Ok(()) => self.driver.source().await.ok(),
            Err(e) => {
                // Timeouts degrade to listing-only data, they are not fatal
                println!("Detail page load failed for {}: {}", url, e);
                None
            }
        };

        if let Err(e) = self.driver.close_window().await {
            eprintln!("Warning: failed to close detail tab: {}", e);
        }
        if let Err(e) = self.driver.switch_to_window(original).await {
            eprintln!("Warning: failed to restore listing tab: {}", e);
        }

        html
    }

    /// Tear the session down; close failures are logged, never escalated.
    pub async fn quit(self) {
        if let Err(e) = self.driver.quit().await {
            eprintln!("Warning: failed to quit browser: {}", e);
        }
    }
}
