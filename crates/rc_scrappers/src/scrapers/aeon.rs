use async_trait::async_trait;
use rc_core::{EssayCandidate, Error, Result};
use reqwest::Client;
use scraper::Html;
use std::time::Duration;
use tracing::debug;

use super::utils::{self, extract_text, extract_texts, is_prose};
use super::{parse_feed, EssayPage, Scraper, SourceMetadata};

const USER_AGENT: &str = "Mozilla/5.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Layout of a site published on the Aeon platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SiteProfile {
    pub name: &'static str,
    pub emoji: &'static str,
    pub cli_name: &'static str,
    pub host: &'static str,
    pub base_url: &'static str,
    pub feed_url: &'static str,
    /// Paragraphs inside the article body; every `<p>` is used when this matches nothing
    pub body_selector: &'static str,
}

pub const AEON: SiteProfile = SiteProfile {
    name: "Aeon",
    emoji: "🏛️",
    cli_name: "aeon",
    host: "aeon.co",
    base_url: "https://aeon.co",
    feed_url: "https://aeon.co/feed.rss",
    body_selector: "div.article__body p",
};

pub const PSYCHE: SiteProfile = SiteProfile {
    name: "Psyche",
    emoji: "🧠",
    cli_name: "psyche",
    host: "psyche.co",
    base_url: "https://psyche.co",
    feed_url: "https://psyche.co/feed",
    body_selector: "div.article__body p",
};

pub struct AeonScraper {
    profile: SiteProfile,
    feed_url: String,
    client: Client,
}

impl AeonScraper {
    pub fn new(profile: SiteProfile) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            profile,
            feed_url: profile.feed_url.to_string(),
            client,
        })
    }

    pub fn with_feed_url(mut self, feed_url: impl Into<String>) -> Self {
        self.feed_url = feed_url.into();
        self
    }

    fn absolute_link(&self, link: &str) -> String {
        match utils::parse_url(self.profile.base_url).and_then(|base| {
            base.join(link)
                .map_err(|e| Error::InvalidUrl(format!("{}: {}", link, e)))
        }) {
            Ok(url) => url.to_string(),
            Err(_) => link.to_string(),
        }
    }
}

/// Pull the title and prose paragraphs out of an essay page.
pub fn extract_essay(html: &str, profile: &SiteProfile) -> Result<EssayPage> {
    let document = Html::parse_document(html);

    let title = extract_text(&document, "h1")?;
    let mut paragraphs = extract_texts(&document, profile.body_selector)?;
    if paragraphs.is_empty() {
        debug!("No article body found, falling back to every paragraph");
        paragraphs = extract_texts(&document, "p")?;
    }
    paragraphs.retain(|p| is_prose(p));

    Ok(EssayPage { title, paragraphs })
}

#[async_trait]
impl Scraper for AeonScraper {
    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            name: self.profile.name,
            emoji: self.profile.emoji,
            feed_url: self.feed_url.clone(),
        }
    }

    fn can_handle(&self, url: &str) -> bool {
        utils::parse_url(url)
            .ok()
            .and_then(|url| url.host_str().map(|host| host.ends_with(self.profile.host)))
            .unwrap_or(false)
    }

    fn cli_names(&self) -> Vec<&str> {
        vec![self.profile.cli_name]
    }

    async fn get_candidates(&self) -> Result<Vec<EssayCandidate>> {
        let response = self
            .client
            .get(&self.feed_url)
            .send()
            .await
            .map_err(|e| Error::Feed(format!("Failed to fetch {}: {}", self.feed_url, e)))?;
        if !response.status().is_success() {
            return Err(Error::Feed(format!(
                "Feed {} returned {}",
                self.feed_url,
                response.status()
            )));
        }
        let xml = response
            .text()
            .await
            .map_err(|e| Error::Feed(format!("Failed to read {}: {}", self.feed_url, e)))?;

        Ok(parse_feed(&xml)?
            .into_iter()
            .map(|c| EssayCandidate::new(self.absolute_link(&c.link), c.title))
            .collect())
    }

    async fn fetch_essay(&self, url: &str) -> Result<EssayPage> {
        utils::parse_url(url)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Scraping(format!("Failed to fetch {}: {}", url, e)))?;
        if !response.status().is_success() {
            return Err(Error::Scraping(format!("{} returned {}", url, response.status())));
        }
        let html = response
            .text()
            .await
            .map_err(|e| Error::Scraping(format!("Failed to read {}: {}", url, e)))?;

        extract_essay(&html, &self.profile)
    }
}
