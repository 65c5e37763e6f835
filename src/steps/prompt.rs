//! Prompt builder step: renders question, contexts and answering rules

use crate::errors::Result;
use crate::pipeline::CollaboratorResponse;
use crate::pipeline::Query;
use crate::pipeline::Stash;
use crate::pipeline::StashField;
use crate::pipeline::Step;
use crate::pipeline::StepRequest;

/// Sentence the model must answer with, verbatim, when it lacks the information
pub const FALLBACK_ANSWER: &str = "I do not have the necessary information to answer.";

/// Build the grounded prompt for a question.
///
/// Pure and deterministic: the same question, contexts and role always give
/// a byte-identical prompt. Each context becomes one `* ` bullet line; with no
/// contexts the block between the tags is empty.
pub fn build_prompt(question: &str, contexts: &[String], assistant_role: &str) -> String {
    let bullets: String = contexts
        .iter()
        .map(|context| format!("* {context}\n"))
        .collect();

    format!(
        r#"<Question>{question}</Question>
<Contextual Information>
{bullets}</Contextual Information>
<Instructions>
1. Provide a direct answer to the question from your own knowledge, without referencing or mentioning the provided "Contextual Information".
2. Respond as a knowledgeable {assistant_role} who has internalized the relevant information, without pointing to separate pieces of context.
3. If you do not have enough information to answer the question, respond with '{FALLBACK_ANSWER}', nothing more, nothing less.
4. Avoid any meta-references to the process of consulting the "Contextual Information" or to the structure of this query.
5. Keep your answer as short as possible while still fully addressing the question.
6. Validate that you are complying with ALL the above instructions before answering.
</Instructions>
Your Answer:"#
    )
}

/// Renders `prompt` from the query and `queryContexts`. Performs no I/O.
pub struct PromptBuilder {
    assistant_role: String,
}

impl PromptBuilder {
    pub fn new(assistant_role: impl Into<String>) -> Self {
        Self {
            assistant_role: assistant_role.into(),
        }
    }
}

impl Step for PromptBuilder {
    fn name(&self) -> &'static str {
        "build_prompt"
    }

    fn reads(&self) -> &'static [StashField] {
        &[StashField::QueryContexts]
    }

    fn writes(&self) -> &'static [StashField] {
        &[StashField::Prompt]
    }

    fn build_request(&self, _query: &Query, _stash: &Stash) -> Result<StepRequest> {
        Ok(StepRequest::Local)
    }

    fn handle_response(
        &self,
        query: &Query,
        _response: Option<CollaboratorResponse>,
        stash: &mut Stash,
    ) -> Result<()> {
        let prompt = build_prompt(
            query.as_str(),
            stash.query_contexts()?,
            &self.assistant_role,
        );
        stash.set_prompt(prompt)
    }
}
