pub mod cache;
pub mod mock;
pub mod orchestrator;
pub mod providers;

pub use cache::SearchCache;
pub use orchestrator::{SearchOrchestrator, DEFAULT_MAX_RESULTS};
pub use providers::ddg::DdgNewsClient;
