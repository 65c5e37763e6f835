//! Step contract: build an outbound call, then fold its response into the stash

use std::fmt;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::errors::RagError;
use crate::errors::Result;
use crate::pipeline::Stash;
use crate::pipeline::StashField;

/// Status code a collaborator must answer with for a call to count as successful
pub const SUCCESS_STATUS: u16 = 200;

/// Validated query text. Immutable once a pipeline starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query(String);

impl Query {
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(RagError::Validation("query must not be empty".to_string()));
        }
        if text.contains('\0') {
            return Err(RagError::Validation(
                "query must not contain NUL characters".to_string(),
            ));
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// External services the pipeline talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collaborator {
    SecretStore,
    EmbeddingModel,
    VectorStore,
    GenerationModel,
}

impl Collaborator {
    pub const ALL: [Self; 4] = [
        Self::SecretStore,
        Self::EmbeddingModel,
        Self::VectorStore,
        Self::GenerationModel,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SecretStore => "secret store",
            Self::EmbeddingModel => "embedding model",
            Self::VectorStore => "vector store",
            Self::GenerationModel => "generation model",
        }
    }
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Description of one outbound call. Building it never performs I/O.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub collaborator: Collaborator,
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: serde_json::Value,
}

impl RequestDescriptor {
    pub fn post(collaborator: Collaborator, path: impl Into<String>) -> Self {
        Self {
            collaborator,
            method: Method::POST,
            path: path.into(),
            headers: Vec::new(),
            body: serde_json::Value::Null,
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    pub fn json<T: Serialize>(mut self, body: &T) -> Result<Self> {
        self.body = serde_json::to_value(body)?;
        Ok(self)
    }

    /// Case-insensitive header lookup
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw collaborator reply: status code and body, uninterpreted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollaboratorResponse {
    pub collaborator: Collaborator,
    pub status: u16,
    pub body: String,
}

impl CollaboratorResponse {
    pub fn new(collaborator: Collaborator, status: u16, body: impl Into<String>) -> Self {
        Self {
            collaborator,
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == SUCCESS_STATUS
    }

    /// Fail with the status and body untouched unless the call succeeded
    pub fn ensure_success(&self) -> Result<()> {
        if self.is_success() {
            Ok(())
        } else {
            Err(RagError::Collaborator {
                collaborator: self.collaborator,
                status: self.status,
                body: self.body.clone(),
            })
        }
    }

    /// Check the status, then decode the body. A body that does not decode is a transport failure.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        self.ensure_success()?;
        serde_json::from_str(&self.body).map_err(|e| {
            RagError::transport(self.collaborator, format!("unparseable response body: {e}"))
        })
    }
}

/// What a step needs done before its response handler can run
#[derive(Debug, Clone)]
pub enum StepRequest {
    /// Call a collaborator and hand the reply to `handle_response`
    Remote(RequestDescriptor),
    /// Pure step; `handle_response` runs with no reply
    Local,
}

/// One stage of a pipeline.
///
/// Steps hold configuration only and keep no per-query state, so one instance
/// can serve any number of concurrent pipeline runs.
pub trait Step: Send + Sync {
    fn name(&self) -> &'static str;

    /// Stash fields this step expects earlier steps to have written
    fn reads(&self) -> &'static [StashField];

    /// Stash fields this step writes
    fn writes(&self) -> &'static [StashField];

    fn build_request(&self, query: &Query, stash: &Stash) -> Result<StepRequest>;

    fn handle_response(
        &self,
        query: &Query,
        response: Option<CollaboratorResponse>,
        stash: &mut Stash,
    ) -> Result<()>;
}

/// Unwrap the reply a remote step was promised
pub(crate) fn expect_response(
    step: &'static str,
    response: Option<CollaboratorResponse>,
) -> Result<CollaboratorResponse> {
    response.ok_or_else(|| RagError::PipelineOrder(format!("step '{step}' ran without a response")))
}
