//! Scripted stand-in for every collaborator.
//!
//! Embeddings are a deterministic bag-of-words hash, the vector store keeps
//! upserts in memory and ranks by cosine similarity, and each collaborator can
//! be switched to a fixed reply or a timeout.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use computeless_rag::pipeline::Collaborator;
use computeless_rag::pipeline::CollaboratorResponse;
use computeless_rag::pipeline::RequestDescriptor;
use computeless_rag::transport::Transport;
use computeless_rag::AppConfig;
use computeless_rag::RagError;
use computeless_rag::Result;
use serde_json::json;

pub const DIM: usize = 16;
pub const API_KEY: &str = "pc-test-key";

#[derive(Clone)]
pub enum Behavior {
    /// Act like the real service
    Faithful,
    /// Always answer with this status and body
    Reply(u16, String),
    /// Act like the real service after a pause
    Delayed(Duration),
    /// Never answer
    TimeOut,
}

struct StoredVector {
    id: String,
    values: Vec<f32>,
    text: String,
    namespace: String,
}

#[derive(Default)]
struct State {
    behaviors: HashMap<Collaborator, Behavior>,
    calls: HashMap<Collaborator, usize>,
    requests: Vec<RequestDescriptor>,
    vectors: Vec<StoredVector>,
    answer: Option<String>,
}

#[derive(Default)]
pub struct StubTransport {
    state: Mutex<State>,
}

pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.embeddings.dimension = Some(DIM);
    config
}

pub fn embed(text: &str) -> Vec<f32> {
    let mut vector = vec![0.0_f32; DIM];
    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let hash = word
            .to_lowercase()
            .bytes()
            .fold(7_usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
        vector[hash % DIM] += 1.0;
    }
    vector
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

impl StubTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(self, collaborator: Collaborator, behavior: Behavior) -> Self {
        self.state
            .lock()
            .unwrap()
            .behaviors
            .insert(collaborator, behavior);
        self
    }

    /// Fixed text the generation model answers with
    pub fn answering(self, answer: &str) -> Self {
        self.state.lock().unwrap().answer = Some(answer.to_string());
        self
    }

    /// Pre-load the vector store
    pub fn seed(self, namespace: &str, texts: &[&str]) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            for (idx, text) in texts.iter().enumerate() {
                state.vectors.push(StoredVector {
                    id: format!("seed-{idx}"),
                    values: embed(text),
                    text: (*text).to_string(),
                    namespace: namespace.to_string(),
                });
            }
        }
        self
    }

    pub fn calls(&self, collaborator: Collaborator) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(&collaborator)
            .copied()
            .unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.state.lock().unwrap().calls.values().sum()
    }

    pub fn requests_to(&self, collaborator: Collaborator) -> Vec<RequestDescriptor> {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.collaborator == collaborator)
            .cloned()
            .collect()
    }

    /// Prompt text of the last generation call
    pub fn last_prompt(&self) -> Option<String> {
        self.requests_to(Collaborator::GenerationModel)
            .last()
            .and_then(|r| r.body["messages"][0]["content"][0]["text"].as_str().map(str::to_string))
    }

    pub fn stored_ids(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .vectors
            .iter()
            .map(|v| v.id.clone())
            .collect()
    }

    fn respond(&self, request: &RequestDescriptor) -> CollaboratorResponse {
        let mut state = self.state.lock().unwrap();
        Self::faithful(&mut state, request)
    }

    fn faithful(state: &mut State, request: &RequestDescriptor) -> CollaboratorResponse {
        let collaborator = request.collaborator;
        let ok = |body: serde_json::Value| {
            CollaboratorResponse::new(collaborator, 200, body.to_string())
        };
        let forbidden = || {
            CollaboratorResponse::new(collaborator, 401, r#"{"message":"Invalid API Key"}"#)
        };

        match (collaborator, request.path.as_str()) {
            (Collaborator::SecretStore, "/") => ok(json!({
                "Name": request.body["SecretId"],
                "SecretString": API_KEY,
            })),
            (Collaborator::EmbeddingModel, _) => {
                let text = request.body["inputText"].as_str().unwrap_or_default();
                ok(json!({ "embedding": embed(text), "inputTextTokenCount": 4 }))
            }
            (Collaborator::VectorStore, "/query") => {
                if request.header_value("Api-Key") != Some(API_KEY) {
                    return forbidden();
                }
                let namespace = request.body["namespace"].as_str().unwrap_or_default();
                let top_k = request.body["topK"].as_u64().unwrap_or(0) as usize;
                let vector: Vec<f32> = serde_json::from_value(request.body["vector"].clone())
                    .unwrap_or_default();
                let mut scored: Vec<(f32, &StoredVector)> = state
                    .vectors
                    .iter()
                    .filter(|v| v.namespace == namespace)
                    .map(|v| (cosine(&vector, &v.values), v))
                    .collect();
                scored.sort_by(|a, b| b.0.total_cmp(&a.0));
                let matches: Vec<_> = scored
                    .into_iter()
                    .take(top_k)
                    .map(|(score, v)| {
                        json!({ "id": v.id, "score": score, "metadata": { "text": v.text } })
                    })
                    .collect();
                ok(json!({ "matches": matches, "namespace": namespace }))
            }
            (Collaborator::VectorStore, "/vectors/upsert") => {
                if request.header_value("Api-Key") != Some(API_KEY) {
                    return forbidden();
                }
                let namespace = request.body["namespace"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string();
                let vectors = request.body["vectors"].as_array().cloned().unwrap_or_default();
                for v in &vectors {
                    state.vectors.push(StoredVector {
                        id: v["id"].as_str().unwrap_or_default().to_string(),
                        values: serde_json::from_value(v["values"].clone()).unwrap_or_default(),
                        text: v["metadata"]["text"].as_str().unwrap_or_default().to_string(),
                        namespace: namespace.clone(),
                    });
                }
                ok(json!({ "upsertedCount": vectors.len() }))
            }
            (Collaborator::GenerationModel, _) => {
                let text = state.answer.clone().unwrap_or_else(|| {
                    "I do not have the necessary information to answer.".to_string()
                });
                ok(json!({
                    "id": "msg_stub",
                    "type": "message",
                    "role": "assistant",
                    "content": [{ "type": "text", "text": text }],
                    "stop_reason": "end_turn"
                }))
            }
            _ => CollaboratorResponse::new(collaborator, 404, "not found"),
        }
    }
}

#[async_trait]
impl Transport for StubTransport {
    async fn send(&self, request: RequestDescriptor) -> Result<CollaboratorResponse> {
        let behavior = {
            let mut state = self.state.lock().unwrap();
            *state.calls.entry(request.collaborator).or_insert(0) += 1;
            state.requests.push(request.clone());
            state
                .behaviors
                .get(&request.collaborator)
                .cloned()
                .unwrap_or(Behavior::Faithful)
        };

        match behavior {
            Behavior::Faithful => Ok(self.respond(&request)),
            Behavior::Delayed(pause) => {
                tokio::time::sleep(pause).await;
                Ok(self.respond(&request))
            }
            Behavior::Reply(status, body) => {
                Ok(CollaboratorResponse::new(request.collaborator, status, body))
            }
            Behavior::TimeOut => Err(RagError::transport(
                request.collaborator,
                "request timed out",
            )),
        }
    }
}
