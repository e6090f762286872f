pub mod cli;
pub mod logging;
pub mod manager;
pub mod scrapers;
pub mod selector;

pub use cli::{handle_command, ScraperArgs, ScraperCommands};
pub use manager::{PipelineManager, PipelineSettings};
pub use scrapers::{get_scraper, get_scraper_factories, get_scraper_with_feed, EssayPage, Scraper};
pub use selector::EssaySelector;

pub mod prelude {
    pub use super::manager::{PipelineManager, PipelineSettings};
    pub use super::scrapers::{EssayPage, Scraper};
    pub use super::selector::EssaySelector;
    pub use rc_core::{Dataset, EssayCandidate, Error, Result};
}
