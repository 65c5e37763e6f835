//! RAG service: the public `answer_query` / `store_query` surface

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::pipeline::Pipeline;
use crate::pipeline::Query;
use crate::steps;
use crate::transport::HttpTransport;
use crate::transport::Transport;

/// Final answer of a query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Answer {
    pub query: String,
    pub answer: String,
    /// Retrieved texts the prompt was grounded on, in store order
    pub contexts: Vec<String>,
}

/// Acknowledgment of a stored query
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoreAck {
    pub id: String,
    pub namespace: String,
}

/// Holds the two pipelines and the transport they share.
///
/// Cheap to clone; every call runs on its own stash, so one service can serve
/// concurrent queries.
#[derive(Clone)]
pub struct RagService {
    answer_pipeline: Pipeline,
    store_pipeline: Pipeline,
    transport: Arc<dyn Transport>,
    namespace: String,
}

impl std::fmt::Debug for RagService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RagService")
            .field("answer_pipeline", &self.answer_pipeline)
            .field("store_pipeline", &self.store_pipeline)
            .field("namespace", &self.namespace)
            .finish_non_exhaustive()
    }
}

impl RagService {
    /// Create a service talking to the configured endpoints over HTTP
    ///
    /// # Errors
    /// - Configuration errors (invalid endpoints, invalid pipeline settings)
    /// - HTTP client build errors
    pub fn new(config: &AppConfig) -> Result<Self> {
        let transport = Arc::new(HttpTransport::new(config)?);
        Self::with_transport(config, transport)
    }

    /// Create a service on top of any transport
    pub fn with_transport(config: &AppConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            answer_pipeline: steps::answer_pipeline(config)?,
            store_pipeline: steps::store_pipeline(config)?,
            transport,
            namespace: config.vector_store.namespace.clone(),
        })
    }

    /// Answer a question from retrieved contexts.
    ///
    /// Returns either the model's answer or the first error any step hit;
    /// there is no partial result.
    ///
    /// # Errors
    /// - `Validation` for an empty query (no collaborator is called)
    /// - `Collaborator` with the upstream status and body verbatim
    /// - `Transport` for unreachable services, timeouts and unparseable replies
    pub async fn answer_query(&self, text: &str) -> Result<Answer> {
        let query = Query::new(text)?;
        info!("Processing query: {}", query);

        let stash = self
            .answer_pipeline
            .run(&query, self.transport.as_ref())
            .await
            .map_err(|e| {
                warn!("Query failed: {}", e);
                e
            })?;
        let (answer, contexts) = stash.into_answer()?;

        info!("Query answered using {} contexts", contexts.len());
        Ok(Answer {
            query: query.as_str().to_string(),
            answer,
            contexts,
        })
    }

    /// Store the query text as a new vector in the namespace
    ///
    /// # Errors
    /// - `Validation` for an empty query (no collaborator is called)
    /// - `Collaborator` with the upstream status and body verbatim
    /// - `Transport` for unreachable services, timeouts and unparseable replies
    pub async fn store_query(&self, text: &str) -> Result<StoreAck> {
        let query = Query::new(text)?;
        info!("Storing query text ({} chars)", query.as_str().chars().count());

        let stash = self
            .store_pipeline
            .run(&query, self.transport.as_ref())
            .await
            .map_err(|e| {
                warn!("Store failed: {}", e);
                e
            })?;

        Ok(StoreAck {
            id: stash.vector_id()?.to_string(),
            namespace: self.namespace.clone(),
        })
    }

    pub const fn answer_pipeline(&self) -> &Pipeline {
        &self.answer_pipeline
    }

    pub const fn store_pipeline(&self) -> &Pipeline {
        &self.store_pipeline
    }
}
