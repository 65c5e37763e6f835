//! Generator step: asks the language model for the answer

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
struct InvokeRequest<'a> {
    anthropic_version: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'static str,
    content: [ContentBlock<'a>; 1],
}

#[derive(Serialize)]
struct ContentBlock<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    text: &'a str,
}

#[derive(Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
struct ResponseBlock {
    text: String,
}

/// Sends `prompt` as the only user message and writes the reply to `queryAnswer`
pub struct Generator {
    model: String,
    anthropic_version: String,
    max_tokens: u32,
}

impl Generator {
    pub fn new(
        model: impl Into<String>,
        anthropic_version: impl Into<String>,
        max_tokens: u32,
    ) -> Self {
        Self {
            model: model.into(),
            anthropic_version: anthropic_version.into(),
            max_tokens,
        }
    }
}

impl Step for Generator {
    fn name(&self) -> &'static str {
        "generate_answer"
    }

    fn reads(&self) -> &'static [StashField] {
        &[StashField::Prompt]
    }

    fn writes(&self) -> &'static [StashField] {
        &[StashField::QueryAnswer]
    }

    fn build_request(&self, _query: &Query, stash: &Stash) -> Result<StepRequest> {
        let request = RequestDescriptor::post(
            Collaborator::GenerationModel,
            format!("/model/{}/invoke", self.model),
        )
        .header("content-type", "application/json")
        .header("accept", "*/*")
        .json(&InvokeRequest {
            anthropic_version: &self.anthropic_version,
            max_tokens: self.max_tokens,
            messages: [Message {
                role: "user",
                content: [ContentBlock {
                    kind: "text",
                    text: stash.prompt()?,
                }],
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
        let response = expect_response(self.name(), response)?;
        let parsed: InvokeResponse = response.parse()?;
        let answer = parsed
            .content
            .into_iter()
            .next()
            .map(|block| block.text)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                RagError::transport(response.collaborator, "model reply contained no text")
            })?;
        stash.set_query_answer(answer)
    }
}
