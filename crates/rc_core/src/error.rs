use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("No essay candidates available")]
    NoCandidates,

    #[error("No usable paragraphs extracted from {0}")]
    NoParagraphs(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Schema error: {0}")]
    Schema(String),

    #[error("Storage error: {0}")]
    Storage(String),
}

impl Error {
    /// Failures while finding or fetching the essay. These end the run
    /// before anything is written.
    pub fn is_acquisition(&self) -> bool {
        matches!(
            self,
            Error::Feed(_)
                | Error::NoCandidates
                | Error::NoParagraphs(_)
                | Error::Scraping(_)
                | Error::InvalidUrl(_)
        )
    }

    /// Failures of a single generation attempt, retried by the analysis loop.
    pub fn is_generation(&self) -> bool {
        matches!(self, Error::Transport(_) | Error::Schema(_))
    }
}
