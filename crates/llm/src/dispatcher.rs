//! Concurrent fan-out of one query to several providers.

use std::{
    num::NonZeroUsize,
    sync::Arc,
    time::{Duration, Instant},
};

use futures::future::join_all;
use indexmap::IndexMap;
use tokio::sync::Semaphore;

use crate::{error::LlmError, messages::LlmResponse, provider::Provider, registry::ProviderRegistry};

/// Runs a query against every requested provider at once and collects the answers.
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<DispatcherInner>,
}

struct DispatcherInner {
    registry: ProviderRegistry,
    /// Caps outbound calls across all overlapping dispatches when configured.
    permits: Option<Arc<Semaphore>>,
}

/// Outcome of one provider call, measured inside its task.
struct Timed {
    outcome: crate::Result<String>,
    elapsed: Duration,
}

impl Dispatcher {
    pub fn new(registry: ProviderRegistry, max_concurrent_calls: Option<NonZeroUsize>) -> Self {
        let permits = max_concurrent_calls.map(|limit| Arc::new(Semaphore::new(limit.get())));

        Self {
            shared: Arc::new(DispatcherInner { registry, permits }),
        }
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.shared.registry
    }

    /// Send `query` to every registered provider named in `requested`.
    ///
    /// Each distinct registered identifier yields exactly one entry, in the
    /// order of its first occurrence. A failing provider does not fail the
    /// dispatch; its entry carries the error text instead. Fails with
    /// [`LlmError::NoValidProviders`] before any call when nothing resolves.
    pub async fn dispatch(&self, query: &str, requested: &[String]) -> crate::Result<Vec<LlmResponse>> {
        let selected = self.resolve(requested);

        if selected.is_empty() {
            log::debug!("None of the requested models {requested:?} is registered");
            return Err(LlmError::NoValidProviders);
        }

        log::debug!("Dispatching query to {} provider(s)", selected.len());

        let prompt: Arc<str> = Arc::from(query);

        let calls = selected.into_iter().map(|(identifier, provider)| {
            let prompt = Arc::clone(&prompt);
            let permits = self.shared.permits.clone();

            let started = Instant::now();
            let handle = tokio::spawn(async move { invoke(provider, prompt, permits).await });

            async move {
                match handle.await {
                    Ok(Timed { outcome, elapsed }) => into_response(identifier, outcome, elapsed),
                    Err(join_error) => {
                        log::error!("Provider '{identifier}' task failed: {join_error}");

                        let message = format!("provider task failed: {join_error}");
                        LlmResponse::failed(identifier, &message, started.elapsed())
                    }
                }
            }
        });

        Ok(join_all(calls).await)
    }

    /// Resolved providers in first occurrence order. Duplicates collapse to one call.
    fn resolve(&self, requested: &[String]) -> IndexMap<String, Arc<dyn Provider>> {
        let mut selected = IndexMap::new();

        for identifier in requested {
            if selected.contains_key(identifier) {
                continue;
            }

            match self.shared.registry.lookup(identifier) {
                Some(provider) => {
                    selected.insert(identifier.clone(), provider);
                }
                None => log::debug!("Skipping unknown model '{identifier}'"),
            }
        }

        selected
    }
}

async fn invoke(provider: Arc<dyn Provider>, prompt: Arc<str>, permits: Option<Arc<Semaphore>>) -> Timed {
    // The semaphore is never closed, acquisition only waits.
    let _permit = match permits {
        Some(permits) => permits.acquire_owned().await.ok(),
        None => None,
    };

    let started = Instant::now();
    let outcome = provider.generate(&prompt).await;

    Timed {
        outcome,
        elapsed: started.elapsed(),
    }
}

fn into_response(identifier: String, outcome: crate::Result<String>, elapsed: Duration) -> LlmResponse {
    match outcome {
        Ok(text) => {
            let response = LlmResponse::new(identifier, text, elapsed);

            log::debug!(
                "Model '{}' answered in {}ms with {} words",
                response.model,
                response.latency_ms,
                response.word_count
            );

            response
        }
        Err(error) => {
            log::warn!("Model '{identifier}' failed after {}ms: {error}", elapsed.as_millis());
            LlmResponse::failed(identifier, &error.client_message(), elapsed)
        }
    }
}
