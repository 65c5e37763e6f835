//! Secret provider step: fetches the vector-store API key

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
#[serde(rename_all = "PascalCase")]
struct GetSecretValueRequest<'a> {
    secret_id: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "PascalCase")]
struct GetSecretValueResponse {
    secret_string: String,
}

/// Reads the vector-store key from the secret store into `pineconeApiKey`
pub struct SecretProvider {
    secret_id: String,
}

impl SecretProvider {
    pub fn new(secret_id: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
        }
    }
}

impl Step for SecretProvider {
    fn name(&self) -> &'static str {
        "fetch_secret"
    }

    fn reads(&self) -> &'static [StashField] {
        &[]
    }

    fn writes(&self) -> &'static [StashField] {
        &[StashField::PineconeApiKey]
    }

    fn build_request(&self, _query: &Query, _stash: &Stash) -> Result<StepRequest> {
        let request = RequestDescriptor::post(Collaborator::SecretStore, "/")
            .header("content-type", "application/x-amz-json-1.1")
            .header("X-Amz-Target", "secretsmanager.GetSecretValue")
            .json(&GetSecretValueRequest {
                secret_id: &self.secret_id,
            })?;
        Ok(StepRequest::Remote(request))
    }

    fn handle_response(
        &self,
        _query: &Query,
        response: Option<CollaboratorResponse>,
        stash: &mut Stash,
    ) -> Result<()> {
        let secret: GetSecretValueResponse = expect_response(self.name(), response)?.parse()?;
        stash.set_pinecone_api_key(secret.secret_string)
    }
}
