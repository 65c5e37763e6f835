//! Per-query state threaded between pipeline steps

use std::fmt;

use crate::errors::RagError;
use crate::errors::Result;

/// Names of the values a step may read from or write to the stash
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StashField {
    QueryEmbedding,
    PineconeApiKey,
    QueryContexts,
    Prompt,
    QueryAnswer,
    VectorId,
}

impl StashField {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QueryEmbedding => "queryEmbedding",
            Self::PineconeApiKey => "pineconeApiKey",
            Self::QueryContexts => "queryContexts",
            Self::Prompt => "prompt",
            Self::QueryAnswer => "queryAnswer",
            Self::VectorId => "vectorId",
        }
    }
}

impl fmt::Display for StashField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Mutable field bag owned by a single pipeline run.
///
/// Every field is write-once: a second `set_*` for the same field fails with
/// [`RagError::FieldAlreadySet`]. Reading a field nobody wrote yet fails with
/// [`RagError::MissingField`]. The order in which fields were written is kept
/// and exposed through [`Stash::written`].
#[derive(Default)]
pub struct Stash {
    query_embedding: Option<Vec<f32>>,
    pinecone_api_key: Option<String>,
    query_contexts: Option<Vec<String>>,
    prompt: Option<String>,
    query_answer: Option<String>,
    vector_id: Option<String>,
    written: Vec<StashField>,
}

fn put<T>(
    slot: &mut Option<T>,
    field: StashField,
    value: T,
    written: &mut Vec<StashField>,
) -> Result<()> {
    if slot.is_some() {
        return Err(RagError::FieldAlreadySet(field));
    }
    *slot = Some(value);
    written.push(field);
    Ok(())
}

fn get<T>(slot: Option<&T>, field: StashField) -> Result<&T> {
    slot.ok_or(RagError::MissingField(field))
}

impl Stash {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fields in the order they were written
    pub fn written(&self) -> &[StashField] {
        &self.written
    }

    pub fn contains(&self, field: StashField) -> bool {
        self.written.contains(&field)
    }

    pub fn query_embedding(&self) -> Result<&[f32]> {
        get(self.query_embedding.as_ref(), StashField::QueryEmbedding).map(Vec::as_slice)
    }

    pub fn set_query_embedding(&mut self, embedding: Vec<f32>) -> Result<()> {
        put(
            &mut self.query_embedding,
            StashField::QueryEmbedding,
            embedding,
            &mut self.written,
        )
    }

    pub fn pinecone_api_key(&self) -> Result<&str> {
        get(self.pinecone_api_key.as_ref(), StashField::PineconeApiKey).map(String::as_str)
    }

    pub fn set_pinecone_api_key(&mut self, key: String) -> Result<()> {
        put(
            &mut self.pinecone_api_key,
            StashField::PineconeApiKey,
            key,
            &mut self.written,
        )
    }

    pub fn query_contexts(&self) -> Result<&[String]> {
        get(self.query_contexts.as_ref(), StashField::QueryContexts).map(Vec::as_slice)
    }

    pub fn set_query_contexts(&mut self, contexts: Vec<String>) -> Result<()> {
        put(
            &mut self.query_contexts,
            StashField::QueryContexts,
            contexts,
            &mut self.written,
        )
    }

    pub fn prompt(&self) -> Result<&str> {
        get(self.prompt.as_ref(), StashField::Prompt).map(String::as_str)
    }

    pub fn set_prompt(&mut self, prompt: String) -> Result<()> {
        put(&mut self.prompt, StashField::Prompt, prompt, &mut self.written)
    }

    pub fn query_answer(&self) -> Result<&str> {
        get(self.query_answer.as_ref(), StashField::QueryAnswer).map(String::as_str)
    }

    pub fn set_query_answer(&mut self, answer: String) -> Result<()> {
        put(
            &mut self.query_answer,
            StashField::QueryAnswer,
            answer,
            &mut self.written,
        )
    }

    pub fn vector_id(&self) -> Result<&str> {
        get(self.vector_id.as_ref(), StashField::VectorId).map(String::as_str)
    }

    pub fn set_vector_id(&mut self, id: String) -> Result<()> {
        put(&mut self.vector_id, StashField::VectorId, id, &mut self.written)
    }

    /// Move the final answer out, consuming the stash
    pub fn into_answer(self) -> Result<(String, Vec<String>)> {
        let answer = self
            .query_answer
            .ok_or(RagError::MissingField(StashField::QueryAnswer))?;
        Ok((answer, self.query_contexts.unwrap_or_default()))
    }
}

// The api key never shows up in debug output
impl fmt::Debug for Stash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stash")
            .field("written", &self.written)
            .field(
                "query_embedding_dim",
                &self.query_embedding.as_ref().map(Vec::len),
            )
            .field("query_contexts", &self.query_contexts)
            .field("prompt_len", &self.prompt.as_ref().map(String::len))
            .field("query_answer", &self.query_answer)
            .field("vector_id", &self.vector_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_before_write_is_missing_field() {
        let stash = Stash::new();
        let err = stash.prompt().unwrap_err();
        assert!(matches!(err, RagError::MissingField(StashField::Prompt)));
    }

    #[test]
    fn test_fields_are_write_once() {
        let mut stash = Stash::new();
        stash.set_prompt("first".to_string()).unwrap();
        let err = stash.set_prompt("second".to_string()).unwrap_err();
        assert!(matches!(err, RagError::FieldAlreadySet(StashField::Prompt)));
        assert_eq!(stash.prompt().unwrap(), "first");
    }

    #[test]
    fn test_written_order_is_kept() {
        let mut stash = Stash::new();
        stash.set_pinecone_api_key("key".to_string()).unwrap();
        stash.set_query_embedding(vec![0.1, 0.2]).unwrap();
        stash.set_query_contexts(vec![]).unwrap();
        assert_eq!(
            stash.written(),
            &[
                StashField::PineconeApiKey,
                StashField::QueryEmbedding,
                StashField::QueryContexts
            ]
        );
        assert!(stash.contains(StashField::QueryContexts));
        assert!(!stash.contains(StashField::Prompt));
    }

    #[test]
    fn test_empty_contexts_are_a_value() {
        let mut stash = Stash::new();
        stash.set_query_contexts(Vec::new()).unwrap();
        assert!(stash.query_contexts().unwrap().is_empty());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let mut stash = Stash::new();
        stash
            .set_pinecone_api_key("super-secret-key".to_string())
            .unwrap();
        let debug = format!("{stash:?}");
        assert!(!debug.contains("super-secret-key"));
    }

    #[test]
    fn test_into_answer_requires_answer() {
        let stash = Stash::new();
        assert!(matches!(
            stash.into_answer(),
            Err(RagError::MissingField(StashField::QueryAnswer))
        ));
    }
}
