use chrono::{Local, NaiveDate};
use rc_core::chunker::word_count;
use rc_core::{
    assemble, chunk_paragraphs, Analysis, Dataset, DatasetStorage, Delay, EssayCandidate, Error,
    Result, TokioDelay,
};
use rc_inference::AnalysisGenerator;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::logging::Logger;
use crate::scrapers::{Scraper, UNKNOWN_TITLE};
use crate::selector::EssaySelector;

pub const DEFAULT_RATE_LIMIT: Duration = Duration::from_secs(4);

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub target_words: usize,
    /// Pause after every passage to stay under provider quotas
    pub rate_limit: Duration,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            target_words: rc_core::chunker::DEFAULT_TARGET_WORDS,
            rate_limit: DEFAULT_RATE_LIMIT,
        }
    }
}

/// Runs one essay through selection, chunking and analysis, then persists the dataset.
pub struct PipelineManager {
    scraper: Box<dyn Scraper>,
    storage: Arc<dyn DatasetStorage>,
    generator: AnalysisGenerator,
    delay: Arc<dyn Delay>,
    settings: PipelineSettings,
}

impl PipelineManager {
    pub fn new(
        scraper: Box<dyn Scraper>,
        storage: Arc<dyn DatasetStorage>,
        generator: AnalysisGenerator,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            scraper,
            storage,
            generator,
            delay: Arc::new(TokioDelay),
            settings,
        }
    }

    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    pub fn scraper(&self) -> &dyn Scraper {
        self.scraper.as_ref()
    }

    fn logger(&self) -> Logger {
        let meta = self.scraper.source_metadata();
        Logger::new().with_prefix(format!("{} [{}]", meta.emoji, meta.name))
    }

    /// Read the feed and the previous output and decide which essay to process.
    pub async fn select_candidate(&self) -> Result<EssayCandidate> {
        let logger = self.logger();
        let previous = self.storage.previous_source().await;
        match &previous {
            Some(source) => logger.info(&format!("📂 Previous dataset source: {}", source)),
            None => logger.info("📂 No previous dataset found"),
        }

        logger.info(&format!(
            "📡 Fetching feed {}",
            self.scraper.source_metadata().feed_url
        ));
        let candidates = self.scraper.get_candidates().await?;
        logger.info(&format!("✨ Found {} candidate essays", candidates.len()));

        let mut rng = rand::thread_rng();
        EssaySelector::select(&candidates, previous.as_deref(), &mut rng).cloned()
    }

    /// Full run: select, process and persist. Acquisition failures return early
    /// and leave the previous output untouched.
    pub async fn run(&self) -> Result<Dataset> {
        let candidate = self.select_candidate().await?;
        self.process_candidate(&candidate).await
    }

    /// Process an essay given directly by URL, bypassing the feed.
    pub async fn process_url(&self, url: &str) -> Result<Dataset> {
        if !self.scraper.can_handle(url) {
            warn!(
                "{} does not look like a {} URL, trying anyway",
                url,
                self.scraper.source_metadata().name
            );
        }
        self.process_candidate(&EssayCandidate::new(url, "")).await
    }

    pub async fn process_candidate(&self, candidate: &EssayCandidate) -> Result<Dataset> {
        let dataset = self
            .build_dataset(candidate, Local::now().date_naive())
            .await?;

        self.storage.store_dataset(&dataset).await?;
        self.logger().info(&format!(
            "💾 Stored {} passages from {}",
            dataset.passages.len(),
            dataset.metadata.source
        ));
        Ok(dataset)
    }

    /// Fetch, chunk and analyse one essay without persisting anything.
    pub async fn build_dataset(&self, candidate: &EssayCandidate, date: NaiveDate) -> Result<Dataset> {
        let logger = self.logger();
        logger.info(&format!("🦗 Scraping {}", candidate.link));

        let page = self.scraper.fetch_essay(&candidate.link).await?;
        let paragraphs: Vec<String> = page
            .paragraphs
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect();
        if paragraphs.is_empty() {
            return Err(Error::NoParagraphs(candidate.link.clone()));
        }

        let title = Some(candidate.title.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .or(page.title)
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string());

        let chunks = chunk_paragraphs(&paragraphs, self.settings.target_words);
        logger.info(&format!(
            "📑 {} paragraphs grouped into {} passages (target {} words)",
            paragraphs.len(),
            chunks.len(),
            self.settings.target_words
        ));

        let total = chunks.len();
        let mut analysed: Vec<(String, Analysis)> = Vec::with_capacity(total);
        let mut fallbacks = 0;
        for (i, chunk) in chunks.into_iter().enumerate() {
            let passage_logger = logger
                .clone()
                .with_prefix(format!("[passage {}/{}]", i + 1, total));
            passage_logger.debug(&format!("{} words", word_count(&chunk)));
            passage_logger.info(&format!("🤖 Generating analysis with {}", self.generator.model_name()));

            let outcome = self.generator.analyze(&chunk).await;
            if outcome.is_fallback() {
                fallbacks += 1;
                passage_logger.warn(&format!(
                    "⚠️ Using fallback analysis after {} attempts",
                    outcome.attempts()
                ));
            } else {
                passage_logger.info(&format!("✨ Analysis ready after {} attempt(s)", outcome.attempts()));
            }
            analysed.push((chunk, outcome.into_analysis()));

            self.delay.sleep(self.settings.rate_limit).await;
        }

        if fallbacks > 0 {
            warn!("{} of {} passages have no generated questions", fallbacks, total);
        }
        info!("✅ Dataset assembled: {}", title);

        Ok(assemble(&title, &candidate.link, date, analysed))
    }
}
