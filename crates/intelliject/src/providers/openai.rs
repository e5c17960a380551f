//! OpenAI-compatible providers (chat completions + embeddings)

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use crate::config::OpenAiConfig;
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;
use super::llm::LlmProvider;
use super::retry_request;

/// Client for an OpenAI-compatible HTTP API
pub struct OpenAiClient {
    client: Client,
    config: OpenAiConfig,
}

impl OpenAiClient {
    /// Create a new client; the API key must be configured
    pub fn new(config: &OpenAiConfig) -> Result<Self> {
        if config.api_key.is_none() {
            return Err(Error::Config("OPENAI_API_KEY is not set".to_string()));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    async fn post_json(&self, path: &str, body: &Value) -> Result<Value> {
        let mut request = self.client.post(self.url(path)).json(body);
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(Error::Internal(format!("HTTP {} from {}: {}", status, path, text)));
        }

        Ok(response.json().await?)
    }

    /// Embed a batch of texts, results in input order
    pub async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = serde_json::json!({
            "model": self.config.embed_model,
            "input": texts,
        });
        let body = &body;

        retry_request(self.config.max_retries, || async move {
            let json = self
                .post_json("/embeddings", body)
                .await
                .map_err(|e| Error::embedding(e.to_string()))?;
            parse_embedding_response(json)
        })
        .await
    }

    /// Single-message chat completion
    pub async fn chat(&self, prompt: &str) -> Result<String> {
        let body = serde_json::json!({
            "model": self.config.chat_model,
            "temperature": self.config.temperature,
            "messages": [{ "role": "user", "content": prompt }],
        });
        let body = &body;

        retry_request(self.config.max_retries, || async move {
            let json = self
                .post_json("/chat/completions", body)
                .await
                .map_err(|e| Error::llm(e.to_string()))?;
            parse_chat_response(json)
        })
        .await
    }

    /// Check that the models endpoint answers
    pub async fn health_check(&self) -> Result<bool> {
        let mut request = self.client.get(self.url("/models"));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        match request.send().await {
            Ok(response) => Ok(response.status().is_success()),
            Err(_) => Ok(false),
        }
    }
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
    let data = json
        .get("data")
        .and_then(|v| v.as_array())
        .ok_or_else(|| Error::embedding("Embedding response is missing data array"))?;

    let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());
    for (fallback_index, item) in data.iter().enumerate() {
        let index = item
            .get("index")
            .and_then(|v| v.as_u64())
            .map(|v| v as usize)
            .unwrap_or(fallback_index);
        let embedding = item
            .get("embedding")
            .and_then(|v| v.as_array())
            .ok_or_else(|| Error::embedding("Embedding item missing embedding array"))?;
        let vector = embedding
            .iter()
            .map(|value| {
                value
                    .as_f64()
                    .map(|n| n as f32)
                    .ok_or_else(|| Error::embedding("Embedding value must be numeric"))
            })
            .collect::<Result<Vec<f32>>>()?;
        indexed.push((index, vector));
    }

    indexed.sort_by_key(|(index, _)| *index);

    Ok(indexed.into_iter().map(|(_, v)| v).collect())
}

fn parse_chat_response(json: Value) -> Result<String> {
    json.get("choices")
        .and_then(|v| v.as_array())
        .and_then(|arr| arr.first())
        .and_then(|choice| choice.get("message"))
        .and_then(|msg| msg.get("content"))
        .and_then(|c| c.as_str())
        .map(str::to_string)
        .ok_or_else(|| Error::llm("Chat response is missing message content"))
}

/// OpenAI embedding provider
pub struct OpenAiEmbedder {
    client: Arc<OpenAiClient>,
    model: String,
}

impl OpenAiEmbedder {
    pub fn from_client(client: Arc<OpenAiClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.client
            .embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding("Empty embedding response"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self.client.embed(texts).await?;
        if vectors.len() != texts.len() {
            return Err(Error::embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                vectors.len()
            )));
        }
        Ok(vectors)
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// OpenAI chat completion provider
pub struct OpenAiLlm {
    client: Arc<OpenAiClient>,
    model: String,
}

impl OpenAiLlm {
    pub fn from_client(client: Arc<OpenAiClient>, model: String) -> Self {
        Self { client, model }
    }
}

#[async_trait]
impl LlmProvider for OpenAiLlm {
    async fn complete(&self, prompt: &str) -> Result<String> {
        self.client.chat(prompt).await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client.health_check().await
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.model
    }
}

/// Build both OpenAI providers sharing a single client
pub fn providers(config: &OpenAiConfig) -> Result<(OpenAiEmbedder, OpenAiLlm)> {
    let client = Arc::new(OpenAiClient::new(config)?);
    Ok((
        OpenAiEmbedder::from_client(Arc::clone(&client), config.embed_model.clone()),
        OpenAiLlm::from_client(client, config.chat_model.clone()),
    ))
}
