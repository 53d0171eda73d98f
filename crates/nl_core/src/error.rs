use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search error: {0}")]
    Search(String),

    #[error("search returned no results")]
    NoResults,

    #[error("Generation error: {0}")]
    Generation(String),

    #[error("rate limited: {0}")]
    RateLimited(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    /// The one failure class the generation retry policy acts on.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Error::RateLimited(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
