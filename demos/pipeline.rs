//! Query Pipeline Demo
//!
//! Analyzes a handful of queries, derives their cache keys and runs them
//! through the two-tier cache, simulating generation on a miss.
//!
//! Usage:
//!   cargo run --example pipeline
//!
//! Environment variables (also read from `.env`):
//!   REDIS_URL            - networked tier address (default: redis://localhost:6379/0)
//!   REDIS_CACHE_ENABLED  - set to false to run local-only (default: true)
//!   RUST_LOG             - log filter (default: query_tier=info,pipeline=info)

use query_tier::{analyze, GenerationParams, QueryCache, Settings};
use serde_json::json;
use tracing::info;
use tracing_subscriber::prelude::*;

const QUERIES: [&str; 4] = [
    "What is trading?",
    "How do moving averages work and when should I use them?",
    "Explain the relationship between liquidity, spreads and volatility in futures markets during earnings season",
    "Provide a comprehensive, in-depth, thorough analysis of market conditions",
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "query_tier=info,pipeline=info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("=== Query Pipeline Demo ===");

    let settings = Settings::from_env()?;
    let cache = QueryCache::from_settings(&settings)?;

    if let Some(networked) = cache.networked() {
        let health = networked.health_check_async().await;
        info!(
            "Networked tier: {:?} ({}ms)",
            health.status, health.response_time_ms
        );
    } else {
        info!("Networked tier disabled");
    }

    // Two passes: the second should be served from cache
    for pass in 1..=2 {
        info!("\n--- Pass {} ---", pass);

        for query in QUERIES {
            let analysis = analyze(query);
            let params = GenerationParams::new(analysis.recommended_model.as_str(), 0.1, 2000, "qa");

            info!(
                "{:?} -> {} (score {:.2}, model {}, top_k {}/{}/{})",
                query,
                analysis.complexity_level,
                analysis.complexity_score,
                analysis.recommended_model,
                analysis.recommended_retrieval_params.vector_top_k,
                analysis.recommended_retrieval_params.keyword_top_k,
                analysis.recommended_retrieval_params.final_top_k,
            );

            match cache.lookup_async(query, &params).await {
                Some(_) => info!("  ✓ cache hit"),
                None => {
                    let response = json!({
                        "answer": format!("[{}] generated answer", analysis.complexity_level),
                        "analysis": analysis,
                    });
                    let shared = cache.store_async(query, &params, response).await;
                    info!("  ✗ cache miss, stored (networked: {})", shared);
                }
            }
        }
    }

    let stats = cache.stats_async().await;
    info!("\n--- Statistics ---");
    info!("{}", stats);

    Ok(())
}
