mod config;
mod db;
mod editor;
mod error;
mod llm;
mod project;
mod routes;
mod services;
mod state;

use std::sync::Arc;

use crate::llm::LlmChat;
use crate::services::transform::{HttpTransformClient, LlmTransform, TextTransform};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = config::AppConfig::from_env();
    let port = config.port;

    let pool = match config.database_url.as_deref() {
        Some(url) => Some(
            db::init_pool(url, config.db_max_connections)
                .await
                .expect("database init failed"),
        ),
        None => {
            tracing::warn!("DATABASE_URL not set; projects are kept in memory only");
            None
        }
    };

    let llm: Option<Arc<dyn LlmChat>> = match llm::LlmClient::from_env() {
        Ok(client) => {
            tracing::info!(model = client.model(), "llm client configured");
            Some(Arc::new(client) as Arc<dyn LlmChat>)
        }
        Err(e) => {
            tracing::warn!(error = %e, "llm client unavailable; AI suggestions disabled");
            None
        }
    };

    let transform: Option<Arc<dyn TextTransform>> = match config.transform_endpoint_url.as_deref() {
        Some(url) => {
            let client =
                HttpTransformClient::new(url, config.transform_timeout_secs).expect("transform client build failed");
            tracing::info!(url = client.url(), "transform endpoint configured");
            Some(Arc::new(client))
        }
        None => llm
            .clone()
            .map(|llm| Arc::new(LlmTransform::new(llm, config.ai_max_tokens)) as Arc<dyn TextTransform>),
    };
    if transform.is_none() {
        tracing::warn!("no transform backend; the editor's AI assist will report failures");
    }

    let flush_interval_ms = config.flush_interval_ms;
    let state = state::AppState::new(config, pool, llm, transform);

    // Hydrate from Postgres, then keep flushing dirty projects.
    let _persistence = if let Some(pool) = state.pool.clone() {
        let projects = services::persistence::load_projects(&pool)
            .await
            .expect("loading projects failed");
        state.store.hydrate(projects).await;
        Some(services::persistence::spawn_persistence_task(
            state.store.clone(),
            pool,
            flush_interval_ms,
        ))
    } else {
        None
    };

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "studyflow listening");
    axum::serve(listener, app).await.expect("server failed");
}
