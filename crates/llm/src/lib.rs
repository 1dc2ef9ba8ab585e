use axum::{
    Json, Router,
    extract::State,
    response::IntoResponse,
    routing::{get, post},
};
use axum_serde::Sonic;

mod dispatcher;
mod error;
mod messages;
mod provider;
mod registry;

pub use dispatcher::Dispatcher;
pub use error::{LlmError, LlmResult as Result};
pub use messages::{ERROR_PREFIX, LlmResponse, ModelEntry, ModelsResponse, QueryRequest};
pub use provider::Provider;
pub use registry::ProviderRegistry;

/// Creates an axum router for the dispatch endpoints.
pub fn router(config: &config::Config) -> anyhow::Result<Router> {
    let registry = ProviderRegistry::from_config(&config.llm)
        .map_err(|e| anyhow::anyhow!("Failed to initialize LLM providers: {e}"))?;

    Ok(router_with(Dispatcher::new(registry, config.llm.max_concurrent_calls)))
}

/// Creates the dispatch router around an existing dispatcher.
pub fn router_with(dispatcher: Dispatcher) -> Router {
    Router::new()
        .route("/ask", post(ask))
        .route("/models", get(list_models))
        .with_state(dispatcher)
}

/// Fan a query out to the requested models and return every answer.
async fn ask(State(dispatcher): State<Dispatcher>, Sonic(request): Sonic<QueryRequest>) -> Result<impl IntoResponse> {
    log::debug!("Ask handler called for models: {:?}", request.models);

    let responses = dispatcher.dispatch(&request.query, &request.models).await?;

    log::debug!("Returning {} responses", responses.len());
    Ok(Json(responses))
}

/// List the registered models.
async fn list_models(State(dispatcher): State<Dispatcher>) -> impl IntoResponse {
    let models = dispatcher
        .registry()
        .entries()
        .map(|(id, name)| ModelEntry {
            id: id.to_string(),
            name: name.to_string(),
        })
        .collect();

    Json(ModelsResponse { models })
}
