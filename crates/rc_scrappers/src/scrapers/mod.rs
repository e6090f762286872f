use async_trait::async_trait;
use rc_core::{EssayCandidate, Error, Result};
use scraper::{Html, Selector};
use url::Url;

pub mod aeon;
pub mod feed;

pub use aeon::{AeonScraper, SiteProfile, AEON, PSYCHE};
pub use feed::parse_feed;

/// Paragraphs with this many words or fewer are captions, bylines and the like.
pub const MIN_PARAGRAPH_WORDS: usize = 25;

pub const UNKNOWN_TITLE: &str = "Unknown Title";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMetadata {
    pub name: &'static str,
    pub emoji: &'static str,
    pub feed_url: String,
}

/// Extracted content of one essay page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EssayPage {
    pub title: Option<String>,
    pub paragraphs: Vec<String>,
}

#[async_trait]
pub trait Scraper: Send + Sync {
    /// Returns the name and feed of the essay source
    fn source_metadata(&self) -> SourceMetadata;

    /// Returns true if this scraper can handle the given URL
    fn can_handle(&self, url: &str) -> bool;

    /// Candidate essays from the source feed, newest first
    async fn get_candidates(&self) -> Result<Vec<EssayCandidate>>;

    /// Fetches an essay page and extracts its prose paragraphs
    async fn fetch_essay(&self, url: &str) -> Result<EssayPage>;

    /// Returns a list of CLI shorthand names for this scraper
    fn cli_names(&self) -> Vec<&str> {
        vec![]
    }
}

pub type ScraperFactory = Box<dyn Fn() -> Result<Box<dyn Scraper>> + Send + Sync>;

fn aeon_factory(profile: SiteProfile) -> ScraperFactory {
    Box::new(move || Ok(Box::new(AeonScraper::new(profile)?) as Box<dyn Scraper>))
}

pub fn get_scraper_factories() -> Vec<ScraperFactory> {
    vec![aeon_factory(AEON), aeon_factory(PSYCHE)]
}

/// Look up a source by one of its CLI names.
pub fn get_scraper(name: &str) -> Result<Box<dyn Scraper>> {
    let name = name.to_lowercase();
    for factory in get_scraper_factories() {
        let scraper = factory()?;
        if scraper.cli_names().contains(&name.as_str()) {
            return Ok(scraper);
        }
    }
    Err(Error::Config(format!("Unknown source: {}", name)))
}

/// Same lookup as `get_scraper`, reading candidates from another feed.
pub fn get_scraper_with_feed(name: &str, feed_url: &str) -> Result<Box<dyn Scraper>> {
    let name = name.to_lowercase();
    let profile = [AEON, PSYCHE]
        .into_iter()
        .find(|profile| profile.cli_name == name)
        .ok_or_else(|| Error::Config(format!("Unknown source: {}", name)))?;
    Ok(Box::new(AeonScraper::new(profile)?.with_feed_url(feed_url)))
}

/// Common utilities for scrapers
pub(crate) mod utils {
    use super::*;

    pub fn parse_url(url: &str) -> Result<Url> {
        Url::parse(url).map_err(|e| Error::InvalidUrl(format!("{}: {}", url, e)))
    }

    pub fn selector(selector: &str) -> Result<Selector> {
        Selector::parse(selector)
            .map_err(|e| Error::Scraping(format!("Invalid selector {}: {}", selector, e)))
    }

    /// Collapse runs of whitespace (including the newlines left by inline markup) into single spaces.
    pub fn normalize_whitespace(text: &str) -> String {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    pub fn extract_text(document: &Html, selector: &str) -> Result<Option<String>> {
        let selector = self::selector(selector)?;
        Ok(document
            .select(&selector)
            .next()
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .filter(|text| !text.is_empty()))
    }

    pub fn extract_texts(document: &Html, selector: &str) -> Result<Vec<String>> {
        let selector = self::selector(selector)?;
        Ok(document
            .select(&selector)
            .map(|el| normalize_whitespace(&el.text().collect::<String>()))
            .collect())
    }

    const BOILERPLATE: &[&str] = &[
        "subscribe to our",
        "our newsletter",
        "sign up for our",
        "donate now",
        "support aeon",
        "become a friend of aeon",
        "all rights reserved",
    ];

    pub fn is_boilerplate(paragraph: &str) -> bool {
        let lower = paragraph.to_lowercase();
        BOILERPLATE.iter().any(|marker| lower.contains(marker))
    }

    /// Plausible essay prose: long enough and not a subscription prompt.
    pub fn is_prose(paragraph: &str) -> bool {
        paragraph.split_whitespace().count() > MIN_PARAGRAPH_WORDS && !is_boilerplate(paragraph)
    }
}
