//! Unit tests for configuration module
//!
//! These tests validate configuration parsing, defaults, and validation.

#[cfg(test)]
mod tests {
    use std::io::Write;

    use crate::config::*;
    use crate::RagError;

    const MINIMAL: &str = r#"
[secrets]
endpoint = "http://localhost:4566"

[embeddings]
endpoint = "http://localhost:8081"

[vector_store]
endpoint = "http://localhost:5080"

[generation]
endpoint = "http://localhost:8082"
"#;

    // ====== Default Value Tests ======

    #[test]
    fn test_minimal_config_gets_defaults() {
        let config = AppConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(config.secrets.secret_id, "pineconeApiKey");
        assert_eq!(config.embeddings.model, "amazon.titan-embed-text-v1");
        assert_eq!(config.embeddings.dimension, None);
        assert_eq!(
            config.embeddings.dimension,
            AppConfig::default().embeddings.dimension
        );
        assert_eq!(config.vector_store.namespace, "computeless-rag");
        assert_eq!(config.vector_store.top_k, 3);
        assert_eq!(
            config.generation.model,
            "anthropic.claude-3-haiku-20240307-v1:0"
        );
        assert_eq!(config.generation.max_tokens, 1000);
        assert_eq!(config.generation.anthropic_version, "bedrock-2023-05-31");
        assert_eq!(config.prompt.assistant_role, "HR assistant");
        assert_eq!(config.http.timeout_secs, 30);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().validate().is_ok());
    }

    // ====== Parsing Tests ======

    #[test]
    fn test_extra_headers_are_parsed() {
        let text = format!(
            "{MINIMAL}\n[vector_store.headers]\nX-Pinecone-API-Version = \"2024-07\"\n"
        );
        let config = AppConfig::from_toml_str(&text).unwrap();
        assert_eq!(
            config
                .vector_store
                .headers
                .get("X-Pinecone-API-Version")
                .map(String::as_str),
            Some("2024-07")
        );
    }

    #[test]
    fn test_missing_section_is_parse_error() {
        let err = AppConfig::from_toml_str("[secrets]\nendpoint = \"x\"\n").unwrap_err();
        assert!(matches!(err, RagError::TomlParsing(_)));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MINIMAL.as_bytes()).unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.vector_store.endpoint, "http://localhost:5080");
    }

    #[test]
    fn test_from_missing_file_is_io_error() {
        let err = AppConfig::from_file("/definitely/not/here.toml").unwrap_err();
        assert!(matches!(err, RagError::Io(_)));
    }

    // ====== Validation Tests ======

    #[test]
    fn test_zero_top_k_rejected() {
        let mut config = AppConfig::default();
        config.vector_store.top_k = 0;
        assert!(matches!(config.validate(), Err(RagError::ConfigError(_))));
    }

    #[test]
    fn test_empty_endpoint_rejected() {
        let mut config = AppConfig::default();
        config.generation.endpoint = "  ".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("generation model"));
    }

    #[test]
    fn test_zero_max_tokens_rejected() {
        let mut config = AppConfig::default();
        config.generation.max_tokens = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let mut config = AppConfig::default();
        config.embeddings.dimension = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_lookup() {
        let config = AppConfig::from_toml_str(MINIMAL).unwrap();
        assert_eq!(
            config.endpoint(crate::pipeline::Collaborator::SecretStore),
            "http://localhost:4566"
        );
        assert_eq!(
            config.endpoint(crate::pipeline::Collaborator::GenerationModel),
            "http://localhost:8082"
        );
    }
}
