//! Command handlers

use tracing::info;

use crate::api::serve_api;
use crate::config::AppConfig;
use crate::service::RagService;
use crate::Result;

pub async fn handle_ask(
    config: &AppConfig,
    query: &str,
    show_contexts: bool,
    json: bool,
) -> Result<()> {
    let service = RagService::new(config)?;
    let answer = service.answer_query(query).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&answer)?);
        return Ok(());
    }

    println!("{}", answer.answer);
    if show_contexts {
        println!();
        println!("Contexts ({}):", answer.contexts.len());
        for (idx, context) in answer.contexts.iter().enumerate() {
            println!("  {}. {}", idx + 1, context);
        }
    }
    Ok(())
}

pub async fn handle_store(config: &AppConfig, query: &str) -> Result<()> {
    let service = RagService::new(config)?;
    let ack = service.store_query(query).await?;
    info!("Stored vector {} in namespace {}", ack.id, ack.namespace);
    println!("Stored: {} (namespace: {})", ack.id, ack.namespace);
    Ok(())
}

pub async fn handle_serve(
    config: &AppConfig,
    host: Option<String>,
    port: Option<u16>,
    cors: bool,
) -> Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    serve_api(config, host, port, cors || config.server.enable_cors).await
}

pub fn handle_config(config: &AppConfig) -> Result<()> {
    println!("📋 computeless-rag Configuration");
    println!("===============================");
    println!();
    for line in config_summary(config) {
        println!("{line}");
    }
    Ok(())
}

fn config_summary(config: &AppConfig) -> Vec<String> {
    let mut lines = vec![
        format!("Secret store:     {}", config.secrets.endpoint),
        format!("  secret id:      {}", config.secrets.secret_id),
        format!("Embedding model:  {}", config.embeddings.endpoint),
        format!("  model:          {}", config.embeddings.model),
    ];
    if let Some(dimension) = config.embeddings.dimension {
        lines.push(format!("  dimension:      {dimension}"));
    }
    lines.extend([
        format!("Vector store:     {}", config.vector_store.endpoint),
        format!("  namespace:      {}", config.vector_store.namespace),
        format!("  top_k:          {}", config.vector_store.top_k),
        format!("Generation model: {}", config.generation.endpoint),
        format!("  model:          {}", config.generation.model),
        format!("  max_tokens:     {}", config.generation.max_tokens),
        format!("Assistant role:   {}", config.prompt.assistant_role),
        format!("HTTP timeout:     {}s", config.http.timeout_secs),
        format!(
            "Server:           {}:{} (cors: {})",
            config.server.host, config.server.port, config.server.enable_cors
        ),
        format!(
            "Logging:          {} (backtrace: {})",
            config.logging.level, config.logging.backtrace
        ),
    ]);
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_summary_shows_logging() {
        let mut config = AppConfig::default();
        config.logging.backtrace = true;
        let summary = config_summary(&config);
        assert!(summary
            .iter()
            .any(|line| line.starts_with("Logging:") && line.ends_with("(backtrace: true)")));
    }

    #[test]
    fn test_config_summary_omits_unset_dimension() {
        let summary = config_summary(&AppConfig::default());
        assert!(!summary.iter().any(|line| line.contains("dimension")));
        assert!(summary.iter().any(|line| line.contains("computeless-rag")));
    }
}
