pub mod error;
pub mod retry;
pub mod traits;
pub mod types;

pub use error::Error;
pub use retry::{Backoff, RetryPolicy};
pub use traits::{NewsSearch, TextGenerator};
pub use types::{
    AnalysisEntry, AnalysisResult, Article, Pov, RawArticle, RemoveOutcome, SaveOutcome,
    TimeWindow,
};

pub type Result<T> = std::result::Result<T, Error>;
