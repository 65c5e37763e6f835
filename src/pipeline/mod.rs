//! Step pipeline: Build request -> Call collaborator -> Fold response into stash
//!
//! A [`Pipeline`] is an ordered list of [`Step`]s fixed at construction time.
//! Running it on a [`Query`] creates a fresh [`Stash`], executes each step in
//! order, and stops at the first failure. The ordering is checked once in
//! [`PipelineBuilder::build`]: a step may only read stash fields that an
//! earlier step writes, and no two steps may write the same field.
//!
//! # Examples
//!
//! ```rust,no_run
//! use computeless_rag::config::AppConfig;
//! use computeless_rag::pipeline::Query;
//! use computeless_rag::steps;
//! use computeless_rag::transport::HttpTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let transport = HttpTransport::new(&config)?;
//!     let pipeline = steps::answer_pipeline(&config)?;
//!
//!     let stash = pipeline.run(&Query::new("What is the notice period?")?, &transport).await?;
//!     println!("Answer: {}", stash.query_answer()?);
//!     Ok(())
//! }
//! ```

pub mod stash;
pub mod step;

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;
use tracing::info;
use tracing::info_span;
use tracing::warn;
use tracing::Instrument;

pub use stash::Stash;
pub use stash::StashField;
pub use step::Collaborator;
pub use step::CollaboratorResponse;
pub use step::Query;
pub use step::RequestDescriptor;
pub use step::Step;
pub use step::StepRequest;

use crate::errors::RagError;
use crate::errors::Result;
use crate::transport::Transport;

/// Ordered, immutable chain of steps
#[derive(Clone)]
pub struct Pipeline {
    name: &'static str,
    steps: Vec<Arc<dyn Step>>,
}

impl Pipeline {
    pub fn builder(name: &'static str) -> PipelineBuilder {
        PipelineBuilder {
            name,
            steps: Vec::new(),
        }
    }

    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Step names in execution order
    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Execute every step in order against a fresh stash.
    ///
    /// # Errors
    /// - `Collaborator` when a service answers with a non-200 status (status and body verbatim)
    /// - `Transport` when a service is unreachable, times out, or returns an unparseable body
    /// - `MissingField` / `FieldAlreadySet` when a step breaks the stash contract
    pub async fn run(&self, query: &Query, transport: &dyn Transport) -> Result<Stash> {
        let span = info_span!("pipeline", pipeline = self.name);
        self.run_steps(query, transport).instrument(span).await
    }

    async fn run_steps(&self, query: &Query, transport: &dyn Transport) -> Result<Stash> {
        let mut stash = Stash::new();

        for (idx, step) in self.steps.iter().enumerate() {
            debug!("Step {}: {}", idx + 1, step.name());

            let response = match step.build_request(query, &stash)? {
                StepRequest::Remote(request) => {
                    let collaborator = request.collaborator;
                    let response = transport.send(request).await.map_err(|e| {
                        warn!("Step '{}' failed calling {}: {}", step.name(), collaborator, e);
                        e
                    })?;
                    debug!(
                        "Step '{}' got status {} from {}",
                        step.name(),
                        response.status,
                        collaborator
                    );
                    Some(response)
                }
                StepRequest::Local => None,
            };

            if let Err(e) = step.handle_response(query, response, &mut stash) {
                warn!("Step '{}' failed: {}", step.name(), e);
                return Err(e);
            }
        }

        info!("Pipeline '{}' completed {} steps", self.name, self.steps.len());
        Ok(stash)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("name", &self.name)
            .field("steps", &self.step_names())
            .finish()
    }
}

/// Collects steps and validates their ordering
pub struct PipelineBuilder {
    name: &'static str,
    steps: Vec<Arc<dyn Step>>,
}

impl PipelineBuilder {
    #[must_use]
    pub fn step(mut self, step: impl Step + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn build(self) -> Result<Pipeline> {
        if self.steps.is_empty() {
            return Err(RagError::PipelineOrder(format!(
                "pipeline '{}' has no steps",
                self.name
            )));
        }

        let mut available: HashSet<StashField> = HashSet::new();
        for step in &self.steps {
            for field in step.reads() {
                if !available.contains(field) {
                    return Err(RagError::PipelineOrder(format!(
                        "step '{}' reads '{}' before any earlier step writes it",
                        step.name(),
                        field
                    )));
                }
            }
            for field in step.writes() {
                if !available.insert(*field) {
                    return Err(RagError::PipelineOrder(format!(
                        "step '{}' writes '{}' which an earlier step already writes",
                        step.name(),
                        field
                    )));
                }
            }
        }

        Ok(Pipeline {
            name: self.name,
            steps: self.steps,
        })
    }
}
