//! Unit tests for error handling
//!
//! Tests error types, conversions, and error message formatting.

#[cfg(test)]
mod tests {
    use std::io;

    use crate::errors::RagError;
    use crate::pipeline::Collaborator;
    use crate::pipeline::StashField;

    // ====== Error Type Tests ======

    #[test]
    fn test_collaborator_error_keeps_status_and_body() {
        let error = RagError::Collaborator {
            collaborator: Collaborator::VectorStore,
            status: 500,
            body: "{\"error\":\"internal\"}".to_string(),
        };
        assert!(error.is_collaborator());
        assert_eq!(error.status(), Some(500));
        assert_eq!(error.body(), Some("{\"error\":\"internal\"}"));
        assert_eq!(error.kind(), "collaborator_error");
        assert_eq!(
            error.to_string(),
            "vector store returned status 500: {\"error\":\"internal\"}"
        );
    }

    #[test]
    fn test_transport_error() {
        let error = RagError::transport(Collaborator::EmbeddingModel, "request timed out");
        assert!(error.is_transport());
        assert!(!error.is_collaborator());
        assert_eq!(error.status(), None);
        assert_eq!(error.body(), None);
        assert!(error.to_string().contains("embedding model"));
    }

    #[test]
    fn test_validation_error() {
        let error = RagError::Validation("query must not be empty".to_string());
        assert!(error.is_validation());
        assert_eq!(error.kind(), "validation_error");
    }

    #[test]
    fn test_stash_errors_name_the_field() {
        let error = RagError::MissingField(StashField::QueryEmbedding);
        assert!(error.to_string().contains("queryEmbedding"));
        let error = RagError::FieldAlreadySet(StashField::Prompt);
        assert!(error.to_string().contains("prompt"));
        assert_eq!(error.kind(), "pipeline_error");
    }

    // ====== Error Conversion Tests ======

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let rag_err: RagError = io_err.into();
        assert!(matches!(rag_err, RagError::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let rag_err: RagError = json_err.into();
        assert!(matches!(rag_err, RagError::Serialization(_)));
    }

    #[test]
    fn test_error_from_toml() {
        let toml_err = toml::from_str::<toml::Value>("= broken").unwrap_err();
        let rag_err: RagError = toml_err.into();
        assert_eq!(rag_err.kind(), "config_error");
    }
}
