//! Collaborator transport: executes request descriptors over HTTP

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::RagError;
use crate::errors::Result;
use crate::pipeline::Collaborator;
use crate::pipeline::CollaboratorResponse;
use crate::pipeline::RequestDescriptor;

/// Sends a step's outbound call and returns the raw reply.
///
/// Implementations return `Ok` for any status code the collaborator answers
/// with; only failures to obtain a reply at all (unreachable, timeout, broken
/// body) are `Err(RagError::Transport)`.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: RequestDescriptor) -> Result<CollaboratorResponse>;
}

struct Route {
    base_url: String,
    headers: Vec<(String, String)>,
}

/// reqwest-backed transport with one base URL per collaborator
pub struct HttpTransport {
    client: Client,
    routes: HashMap<Collaborator, Route>,
}

impl HttpTransport {
    /// Create a transport from the configured endpoints
    ///
    /// # Errors
    /// - HTTP client build errors (invalid configuration)
    pub fn new(config: &AppConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.http.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RagError::HttpError(e.to_string()))?;

        let routes = Collaborator::ALL
            .into_iter()
            .map(|collaborator| {
                let route = Route {
                    base_url: config
                        .endpoint(collaborator)
                        .trim_end_matches('/')
                        .to_string(),
                    headers: config
                        .extra_headers(collaborator)
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect(),
                };
                (collaborator, route)
            })
            .collect();

        Ok(Self { client, routes })
    }

    fn url_for(&self, request: &RequestDescriptor) -> Result<(String, &Route)> {
        let route = self.routes.get(&request.collaborator).ok_or_else(|| {
            RagError::ConfigError(format!("no endpoint for {}", request.collaborator))
        })?;
        Ok((format!("{}{}", route.base_url, request.path), route))
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<CollaboratorResponse> {
        let collaborator = request.collaborator;
        let (url, route) = self.url_for(&request)?;
        debug!("Calling {} {}: {}", collaborator, request.method, url);

        let body = serde_json::to_vec(&request.body)?;
        let mut builder = self.client.request(request.method.clone(), &url);
        for (name, value) in route.headers.iter().chain(request.headers.iter()) {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let response = builder.body(body).send().await.map_err(|e| {
            let message = if e.is_timeout() {
                format!("request timed out: {e}")
            } else {
                e.to_string()
            };
            RagError::transport(collaborator, message)
        })?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| RagError::transport(collaborator, format!("failed to read body: {e}")))?;

        Ok(CollaboratorResponse::new(collaborator, status, text))
    }
}
