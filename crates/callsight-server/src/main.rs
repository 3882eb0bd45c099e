use anyhow::Context;
use axum::{routing::get, Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod adapters;
mod application;
mod config;
mod models;
mod routes;

use adapters::{GeminiProvider, PgCallRepository, PgPromptRepository};
use application::{seed_knowledge, Gateway, PromptWriter, TranscriptionPipeline};
use callsight::{DomainKnowledge, InferenceProvider};
use config::AppConfig;

/// Pipeline wired to the concrete adapters
pub type AppPipeline = TranscriptionPipeline<GeminiProvider, PgPromptRepository, PgCallRepository>;

/// Application state shared across all routes
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<AppPipeline>,
    pub knowledge: Arc<DomainKnowledge>,
    pub prompts: Arc<PgPromptRepository>,
    pub calls: Arc<PgCallRepository>,
    pub gateway: Gateway,
}

#[derive(Serialize)]
struct HealthCheck {
    status: String,
    message: String,
    version: String,
}

async fn health_check() -> Json<HealthCheck> {
    Json(HealthCheck {
        status: "ok".to_string(),
        message: "Callsight API is running".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[shuttle_runtime::main]
async fn main(
    #[shuttle_shared_db::Postgres] pool: sqlx::PgPool,
    #[shuttle_runtime::Secrets] secrets: shuttle_runtime::SecretStore,
) -> shuttle_axum::ShuttleAxum {
    tracing::info!("🎧 Callsight API initializing...");

    let config = AppConfig::from_lookup(|key| secrets.get(key))?;

    // Run migrations
    sqlx::migrate!()
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("✅ Database migrations completed");

    let gateway = Gateway::new(config.gateway.clone());
    let inference = Arc::new(
        GeminiProvider::new(&config.gemini_api_key)
            .with_model(&config.gemini_model)
            .with_base_url(&config.gemini_base_url),
    );
    tracing::info!(
        "🤖 Inference provider: {} ({})",
        inference.provider_name(),
        inference.model_id()
    );

    let prompts = Arc::new(PgPromptRepository::new(pool.clone()));
    let calls = Arc::new(PgCallRepository::new(pool));

    let knowledge = Arc::new(DomainKnowledge::with_defaults());
    seed_knowledge(&knowledge, prompts.as_ref(), &gateway).await;

    let (writer, _writer_handle) =
        PromptWriter::spawn(prompts.clone(), gateway.clone(), config.prompt_queue_capacity);

    let pipeline = Arc::new(TranscriptionPipeline::new(
        inference,
        prompts.clone(),
        calls.clone(),
        knowledge.clone(),
        writer,
        gateway.clone(),
        config.example_prompt_ids.clone(),
    ));

    // Create application state
    let state = AppState {
        pipeline,
        knowledge,
        prompts,
        calls,
        gateway,
    };

    // OpenAPI documentation
    let openapi = routes::swagger::ApiDoc::openapi();

    // Build router with shared state
    let router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", openapi))
        .route("/health", get(health_check))
        .merge(routes::transcribe::router(config.max_upload_bytes))
        .merge(routes::domain::router())
        .merge(routes::call::router())
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        )
        .with_state(state);

    tracing::info!("📚 Swagger UI: /swagger-ui");
    tracing::info!("✅ Callsight API ready");

    Ok(router.into())
}
