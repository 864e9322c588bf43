use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;

/// Embedding capability used by the ground-truth retriever.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;
    fn model_id(&self) -> String;
}

/// Embeddings client for any OpenAI-compatible endpoint.
pub struct OpenAiEmbedder {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    /// Bound on the whole call, request through body read.
    pub timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiEmbedder {
    pub fn new(model: String, api_key: String, base_url: String) -> Self {
        Self {
            model,
            api_key,
            base_url,
            timeout: Duration::from_secs(60),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let url = format!("{}/embeddings", self.base_url.trim_end_matches('/'));
        let body = json!({
            "input": text,
            "model": self.model,
            "encoding_format": "float"
        });

        let fut = async {
            let resp = self
                .client
                .post(&url)
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await?;

            if !resp.status().is_success() {
                let status = resp.status();
                let error_text = resp.text().await.unwrap_or_default();
                anyhow::bail!("embeddings API error (status {}): {}", status, error_text);
            }

            let json: serde_json::Value = resp.json().await?;
            let vec = json
                .pointer("/data/0/embedding")
                .and_then(|v| v.as_array())
                .ok_or_else(|| anyhow::anyhow!("embeddings API response missing embedding field"))?;

            anyhow::Ok(
                vec.iter()
                    .map(|x| x.as_f64().unwrap_or(0.0) as f32)
                    .collect::<Vec<f32>>(),
            )
        };

        timeout(self.timeout, fut)
            .await
            .map_err(|_| anyhow::anyhow!("embeddings API timeout after {:?}", self.timeout))?
    }

    fn model_id(&self) -> String {
        self.model.clone()
    }
}

/// Deterministic test embedder: folds bytes into a small fixed-width vector.
/// Same text always maps to the same vector, which is all the retrieval
/// independence tests need.
pub struct FakeEmbedder;

#[async_trait]
impl Embedder for FakeEmbedder {
    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        let mut v = [0f32; 8];
        for (i, b) in text.bytes().enumerate() {
            v[i % 8] += f32::from(b) / 255.0;
        }
        Ok(v.to_vec())
    }

    fn model_id(&self) -> String {
        "fake-embedder".to_string()
    }
}
