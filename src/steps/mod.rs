//! Concrete pipeline steps and the two pipelines built from them
//!
//! Read path: fetch_secret -> embed_query -> search_contexts -> build_prompt -> generate_answer
//! Write path: fetch_secret -> embed_query -> assign_vector_id -> upsert_vector

pub mod embed;
pub mod generate;
pub mod prompt;
pub mod search;
pub mod secret;
pub mod upsert;

pub use embed::Embedder;
pub use generate::Generator;
pub use prompt::build_prompt;
pub use prompt::PromptBuilder;
pub use prompt::FALLBACK_ANSWER;
pub use search::Retriever;
pub use secret::SecretProvider;
pub use upsert::AssignVectorId;
pub use upsert::Upserter;

use crate::config::AppConfig;
use crate::errors::Result;
use crate::pipeline::Pipeline;

/// Pipeline answering a question from retrieved contexts
pub fn answer_pipeline(config: &AppConfig) -> Result<Pipeline> {
    Pipeline::builder("answer_query")
        .step(SecretProvider::new(&config.secrets.secret_id))
        .step(Embedder::new(
            &config.embeddings.model,
            config.embeddings.dimension,
        ))
        .step(Retriever::new(
            &config.vector_store.namespace,
            config.vector_store.top_k,
        ))
        .step(PromptBuilder::new(&config.prompt.assistant_role))
        .step(Generator::new(
            &config.generation.model,
            &config.generation.anthropic_version,
            config.generation.max_tokens,
        ))
        .build()
}

/// Pipeline storing the query text as a new vector
pub fn store_pipeline(config: &AppConfig) -> Result<Pipeline> {
    Pipeline::builder("store_query")
        .step(SecretProvider::new(&config.secrets.secret_id))
        .step(Embedder::new(
            &config.embeddings.model,
            config.embeddings.dimension,
        ))
        .step(AssignVectorId)
        .step(Upserter::new(&config.vector_store.namespace))
        .build()
}
