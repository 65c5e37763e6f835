//! Write path steps: assign a vector id, then upsert the query as a vector

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

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

/// Writes a fresh UUID v4 into `vectorId`
pub struct AssignVectorId;

impl Step for AssignVectorId {
    fn name(&self) -> &'static str {
        "assign_vector_id"
    }

    fn reads(&self) -> &'static [StashField] {
        &[]
    }

    fn writes(&self) -> &'static [StashField] {
        &[StashField::VectorId]
    }

    fn build_request(&self, _query: &Query, _stash: &Stash) -> Result<StepRequest> {
        Ok(StepRequest::Local)
    }

    fn handle_response(
        &self,
        _query: &Query,
        _response: Option<CollaboratorResponse>,
        stash: &mut Stash,
    ) -> Result<()> {
        stash.set_vector_id(Uuid::new_v4().to_string())
    }
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    namespace: &'a str,
    vectors: [Vector<'a>; 1],
}

#[derive(Serialize)]
struct Vector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: VectorMetadata<'a>,
}

#[derive(Serialize)]
struct VectorMetadata<'a> {
    text: &'a str,
}

/// Stores `{query text, queryEmbedding}` under `vectorId` in the namespace
pub struct Upserter {
    namespace: String,
}

impl Upserter {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }
}

impl Step for Upserter {
    fn name(&self) -> &'static str {
        "upsert_vector"
    }

    fn reads(&self) -> &'static [StashField] {
        &[
            StashField::VectorId,
            StashField::QueryEmbedding,
            StashField::PineconeApiKey,
        ]
    }

    fn writes(&self) -> &'static [StashField] {
        &[]
    }

    fn build_request(&self, query: &Query, stash: &Stash) -> Result<StepRequest> {
        let request = RequestDescriptor::post(Collaborator::VectorStore, "/vectors/upsert")
            .header("Content-Type", "application/json")
            .header("Api-Key", stash.pinecone_api_key()?)
            .json(&UpsertRequest {
                namespace: &self.namespace,
                vectors: [Vector {
                    id: stash.vector_id()?,
                    values: stash.query_embedding()?,
                    metadata: VectorMetadata {
                        text: query.as_str(),
                    },
                }],
            })?;
        Ok(StepRequest::Remote(request))
    }

    fn handle_response(
        &self,
        _query: &Query,
        response: Option<CollaboratorResponse>,
        stash: &mut Stash,
    ) -> Result<()> {
        expect_response(self.name(), response)?.ensure_success()?;
        info!(
            "Vector upsert succeeded: id={} namespace={}",
            stash.vector_id()?,
            self.namespace
        );
        Ok(())
    }
}
