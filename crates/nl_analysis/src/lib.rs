pub mod analyzer;
pub mod cache;
pub mod output;
pub mod pov;
pub mod providers;

pub use analyzer::AnalysisOrchestrator;
pub use cache::{AnalysisCache, MAX_CACHE_SIZE};
pub use pov::PovOrchestrator;
pub use providers::gemini::GeminiClient;
