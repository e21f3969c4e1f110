//! HTTP scraper
//!
//! # Example
//!
//! ```rust,no_run
//! use rust_text_topics::config::ScraperConfig;
//! use rust_text_topics::scraping::WebScraper;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let scraper = WebScraper::new(&ScraperConfig::default())?;
//!     let doc = scraper.fetch_document("https://es.wikipedia.org/wiki/Python").await?;
//!     println!("{}: {} words", doc.title, doc.word_count);
//!     Ok(())
//! }
//! ```

use super::html::parse_page;
use crate::config::ScraperConfig;
use crate::data::Dataset;
use crate::models::Document;
use anyhow::{Context, Result};
use chrono::Utc;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, warn};

/// Sequential article scraper
#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
    delay: Duration,
}

impl WebScraper {
    pub fn new(config: &ScraperConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;

        let delay = Duration::try_from_secs_f64(config.delay_secs)
            .with_context(|| format!("Invalid scraper delay: {} seconds", config.delay_secs))?;

        Ok(Self { client, delay })
    }

    /// Override the pause between consecutive requests
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Download a page and extract its title and paragraph text
    pub async fn fetch_document(&self, url: &str) -> Result<Document> {
        info!("Fetching {}", url);

        let html = self
            .client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Request to {} failed", url))?
            .error_for_status()
            .with_context(|| format!("{} returned an error status", url))?
            .text()
            .await
            .with_context(|| format!("Failed to read body of {}", url))?;

        let mut document = parse_page(url, &html);
        document.scraped_at = Some(Utc::now());
        Ok(document)
    }

    /// Fetch every URL in order, skipping the ones that fail.
    ///
    /// Sleeps for the configured delay between requests, not after the last.
    pub async fn fetch_many(&self, urls: &[String]) -> Dataset {
        let mut dataset = Dataset::new();
        let total = urls.len();

        for (i, url) in urls.iter().enumerate() {
            info!("[{}/{}] Processing URL", i + 1, total);

            match self.fetch_document(url).await {
                Ok(document) => dataset.push(document),
                Err(e) => warn!("Skipping {}: {:#}", url, e),
            }

            if i + 1 < total && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!("Extracted {} of {} documents", dataset.len(), total);
        dataset
    }
}
