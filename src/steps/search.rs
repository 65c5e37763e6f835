//! Retriever step: nearest-neighbour search against the vector store

use serde::Deserialize;
use serde::Serialize;

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
struct SearchRequest<'a> {
    namespace: &'a str,
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
}

#[derive(Deserialize)]
struct SearchResponse {
    #[serde(default)]
    matches: Vec<SearchMatch>,
}

#[derive(Deserialize)]
struct SearchMatch {
    metadata: MatchMetadata,
}

#[derive(Deserialize)]
struct MatchMetadata {
    text: String,
}

/// Writes the stored text of the top-K matches into `queryContexts`.
///
/// Matches keep the order the store returned them in; no re-ranking happens
/// here. Zero matches yields an empty list, not an error.
pub struct Retriever {
    namespace: String,
    top_k: usize,
}

impl Retriever {
    pub fn new(namespace: impl Into<String>, top_k: usize) -> Self {
        Self {
            namespace: namespace.into(),
            top_k,
        }
    }
}

impl Step for Retriever {
    fn name(&self) -> &'static str {
        "search_contexts"
    }

    fn reads(&self) -> &'static [StashField] {
        &[StashField::QueryEmbedding, StashField::PineconeApiKey]
    }

    fn writes(&self) -> &'static [StashField] {
        &[StashField::QueryContexts]
    }

    fn build_request(&self, _query: &Query, stash: &Stash) -> Result<StepRequest> {
        let request = RequestDescriptor::post(Collaborator::VectorStore, "/query")
            .header("Content-Type", "application/json")
            .header("Api-Key", stash.pinecone_api_key()?)
            .json(&SearchRequest {
                namespace: &self.namespace,
                vector: stash.query_embedding()?,
                top_k: self.top_k,
                include_metadata: true,
            })?;
        Ok(StepRequest::Remote(request))
    }

    fn handle_response(
        &self,
        _query: &Query,
        response: Option<CollaboratorResponse>,
        stash: &mut Stash,
    ) -> Result<()> {
        let parsed: SearchResponse = expect_response(self.name(), response)?.parse()?;
        let contexts = parsed
            .matches
            .into_iter()
            .take(self.top_k)
            .map(|m| m.metadata.text)
            .collect();
        stash.set_query_contexts(contexts)
    }
}
