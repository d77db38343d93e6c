//! Composition root for the threat analysis HTTP service.
//!
//! Mirrors `security_api/crates/api/src/main.rs`'s role: load `.env`,
//! build the shared dependencies once, inject them into handlers via
//! `axum::Extension`, and log startup/request milestones with plain
//! `println!`/`eprintln!` rather than a structured logging crate — the
//! same posture the teacher's binary uses throughout.

mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::CorsLayer;

use threat_common::Config;
use threat_llm_client::{new_http_client, new_mock_client, LlmClient};
use threat_orchestrator::{Orchestrator, Registry};

const DEFAULT_LLM_BASE_URL: &str = "https://llm.internal.example";

pub struct AppState {
    orchestrator: Orchestrator,
    registry: Arc<Registry>,
}

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();

    println!("Starting Threat Analysis API...");
    let config = Config::from_env();

    let llm: Arc<dyn LlmClient> = if config.is_configured() {
        let base_url = std::env::var("LLM_BASE_URL").unwrap_or_else(|_| DEFAULT_LLM_BASE_URL.to_string());
        println!("[INFO] LLM client configured for model {}", config.llm_model);
        Arc::new(new_http_client(base_url, config.llm_api_key.clone(), config.llm_model.clone(), config.cache_max_entries))
    } else {
        eprintln!("[WARN] LLM_API_KEY not set — running with a mock LLM client, analyses will use canned responses");
        Arc::new(new_mock_client())
    };

    let registry = Arc::new(Registry::new(llm.clone()));
    if let Ok(seed_path) = std::env::var("PATTERN_CATALOG_SEED") {
        match registry.load_catalog_seed(&seed_path) {
            Ok(loaded) if loaded > 0 => println!("[INFO] loaded {loaded} patterns from {seed_path}"),
            Ok(_) => {}
            Err(e) => eprintln!("[WARN] failed to load pattern catalog seed {seed_path}: {e}"),
        }
    }

    let orchestrator = Orchestrator::new(llm, registry.clone());
    let state = Arc::new(AppState { orchestrator, registry });

    let app = Router::new()
        .route("/health", get(handlers::health))
        .route("/api/v1/", get(handlers::root))
        .route("/api/v1/analyze/complete", post(handlers::analyze_complete))
        .route("/api/v1/admin/stats", get(handlers::admin_stats))
        .layer(axum::Extension(state))
        .layer(CorsLayer::permissive());

    let addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();

    println!("Threat Analysis API listening on http://{addr}");
    axum::serve(listener, app).await.unwrap();
}
