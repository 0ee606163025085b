use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use tokio::{sync::watch, task::JoinHandle, time};
use tracing::{debug, warn};

use super::SuggestionSource;
use crate::models::LocationSuggestion;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Suggestions {
    pub query: String,
    pub items: Vec<LocationSuggestion>,
    pub error: Option<String>,
}

/// Cancel-on-supersede lookups: only the latest input, once it has been left
/// alone for `delay`, reaches the source.
pub struct Debouncer<S> {
    source: Arc<S>,
    delay: Duration,
    min_len: usize,
    pending: Mutex<Option<JoinHandle<()>>>,
    generation: Arc<AtomicU64>,
    results: Arc<watch::Sender<Suggestions>>,
}

impl<S: SuggestionSource> Debouncer<S> {
    pub fn new(source: S, delay: Duration, min_len: usize) -> Self {
        let (results, _) = watch::channel(Suggestions::default());
        Self {
            source: Arc::new(source),
            delay,
            min_len,
            pending: Mutex::new(None),
            generation: Arc::new(AtomicU64::new(0)),
            results: Arc::new(results),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Suggestions> {
        self.results.subscribe()
    }

    pub fn latest(&self) -> Suggestions {
        self.results.borrow().clone()
    }

    /// Feeds the current input text. Any lookup still waiting or in flight is dropped.
    pub fn input(&self, text: &str) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;

        let query = text.trim().to_string();
        if query.chars().count() < self.min_len {
            self.results.send_replace(Suggestions {
                query,
                ..Default::default()
            });
            return;
        }

        let source = self.source.clone();
        let results = self.results.clone();
        let current = self.generation.clone();
        let delay = self.delay;
        *pending = Some(tokio::spawn(async move {
            time::sleep(delay).await;
            debug!("Looking up `{query}`");
            let outcome = source.suggest(query.clone()).await;
            if current.load(Ordering::SeqCst) != generation {
                return;
            }
            let suggestions = match outcome {
                Ok(items) => Suggestions {
                    query,
                    items,
                    error: None,
                },
                Err(err) => {
                    warn!("Suggestion lookup failed: {err}");
                    Suggestions {
                        query,
                        items: Vec::new(),
                        error: Some(err.to_string()),
                    }
                }
            };
            results.send_replace(suggestions);
        }));
    }

    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(previous) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            previous.abort();
        }
    }
}

impl<S> Drop for Debouncer<S> {
    fn drop(&mut self) {
        let pending = self.pending.get_mut().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }
}
