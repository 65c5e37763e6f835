//! Embedder step: turns the query text into a vector

use serde::Deserialize;
use serde::Serialize;

use crate::errors::RagError;
use crate::errors::Result;
use crate::pipeline::step::expect_response;
use crate::pipeline::Collaborator;
use crate::pipeline::CollaboratorResponse;
use crate::pipeline::Query;
use crate::pipeline::RequestDescriptor;
use crate::pipeline::Stash;
use crate::pipeline::StashField;
use crate::pipeline::Step;
use crate::pipeline::StepRequest;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EmbeddingRequest<'a> {
    input_text: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Writes the query embedding into `queryEmbedding`
pub struct Embedder {
    model: String,
    dimension: Option<usize>,
}

impl Embedder {
    pub fn new(model: impl Into<String>, dimension: Option<usize>) -> Self {
        Self {
            model: model.into(),
            dimension,
        }
    }
}

impl Step for Embedder {
    fn name(&self) -> &'static str {
        "embed_query"
    }

    fn reads(&self) -> &'static [StashField] {
        &[]
    }

    fn writes(&self) -> &'static [StashField] {
        &[StashField::QueryEmbedding]
    }

    fn build_request(&self, query: &Query, _stash: &Stash) -> Result<StepRequest> {
        let request = RequestDescriptor::post(
            Collaborator::EmbeddingModel,
            format!("/model/{}/invoke", self.model),
        )
        .header("content-type", "application/json")
        .header("accept", "*/*")
        .json(&EmbeddingRequest {
            input_text: query.as_str(),
        })?;
        Ok(StepRequest::Remote(request))
    }

    fn handle_response(
        &self,
        _query: &Query,
        response: Option<CollaboratorResponse>,
        stash: &mut Stash,
    ) -> Result<()> {
        let response = expect_response(self.name(), response)?;
        let parsed: EmbeddingResponse = response.parse()?;

        if parsed.embedding.is_empty() {
            return Err(RagError::transport(
                response.collaborator,
                "embedding response contained an empty vector",
            ));
        }
        if let Some(expected) = self.dimension {
            if parsed.embedding.len() != expected {
                return Err(RagError::transport(
                    response.collaborator,
                    format!(
                        "embedding has {} dimensions, expected {expected}",
                        parsed.embedding.len()
                    ),
                ));
            }
        }

        stash.set_query_embedding(parsed.embedding)
    }
}
