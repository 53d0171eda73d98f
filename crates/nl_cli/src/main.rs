use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nl_analysis::{AnalysisCache, AnalysisOrchestrator, GeminiClient, PovOrchestrator};
use nl_core::{Result, TextGenerator};
use nl_search::{DdgNewsClient, SearchCache, SearchOrchestrator, DEFAULT_MAX_RESULTS};
use nl_store::SavedArticlesStore;
use nl_web::AppState;

#[derive(Parser, Debug)]
#[command(author, version, about = "News aggregation with AI analysis and opposing viewpoints", long_about = None)]
struct Cli {
    /// Address to serve on
    #[arg(long, default_value = "127.0.0.1:5000")]
    listen: String,
    /// Gemini API key; falls back to the GEMINI_API_KEY environment variable
    #[arg(long)]
    api_key: Option<String>,
    /// Generation model to use
    #[arg(long)]
    model: Option<String>,
    /// Directory holding the search-cache and saved-articles files
    #[arg(long, default_value = ".")]
    data_dir: PathBuf,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Run the web server (the default)
    Serve,
    /// One-shot news search, printed as JSON
    Search {
        query: String,
        #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
        max_results: usize,
    },
    /// List the generation collaborator's available models
    Models,
}

fn build_state(cli: &Cli) -> AppState {
    let api_key = cli
        .api_key
        .clone()
        .or_else(|| std::env::var("GEMINI_API_KEY").ok())
        .unwrap_or_default();
    if api_key.is_empty() {
        warn!("no Gemini API key configured, analysis will be simulated");
    }

    let search_client = Arc::new(DdgNewsClient::new());
    let generator: Arc<dyn TextGenerator> =
        Arc::new(GeminiClient::new(api_key, cli.model.clone()));

    AppState {
        search: SearchOrchestrator::new(
            search_client.clone(),
            SearchCache::load(cli.data_dir.join("search_cache.json")),
        ),
        analyzer: AnalysisOrchestrator::new(generator.clone()),
        pov: PovOrchestrator::new(search_client, generator.clone()),
        analysis_cache: AnalysisCache::new(),
        saved: SavedArticlesStore::load(cli.data_dir.join("saved_articles.json")),
        generator,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();
    let cli = Cli::parse();
    let state = build_state(&cli);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let app = nl_web::create_app(state).await;
            let listener = tokio::net::TcpListener::bind(&cli.listen).await?;
            info!("📰 NewsLens listening on {}", cli.listen);
            axum::serve(listener, app).await?;
        }
        Commands::Search { query, max_results } => {
            let articles = state.search.search_news(&query, max_results).await;
            info!("found {} articles", articles.len());
            println!("{}", serde_json::to_string_pretty(&articles)?);
        }
        Commands::Models => {
            match state.generator.list_models().await {
                Ok(models) => {
                    for model in models {
                        println!("{}", model);
                    }
                }
                Err(e) => eprintln!("failed to list models: {}", e),
            }
        }
    }

    Ok(())
}
