use crate::model::LlmResponse;
use async_trait::async_trait;
use serde_json::json;
use std::time::Duration;
use tokio::time::timeout;

/// Judge-model capability: one prompt in, free-form text out.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> anyhow::Result<LlmResponse>;
    fn provider_name(&self) -> &'static str;
}

/// Chat-completions client for any OpenAI-compatible endpoint.
///
/// The original judge ran against a vendor API with the same wire shape, so
/// the base URL is configurable rather than hardcoded.
pub struct OpenAiCompatClient {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Bound on the whole call, request through body read.
    pub timeout: Duration,
    client: reqwest::Client,
}

impl OpenAiCompatClient {
    pub fn new(model: String, api_key: String, base_url: String) -> Self {
        Self {
            model,
            api_key,
            base_url,
            temperature: 0.0,
            max_tokens: 2000,
            timeout: Duration::from_secs(60),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl LlmClient for OpenAiCompatClient {
    async fn complete(&self, prompt: &str) -> anyhow::Result<LlmResponse> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));

        let body = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
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
                anyhow::bail!("judge chat API error (status {}): {}", status, error_text);
            }

            let json: serde_json::Value = resp.json().await?;
            let text = json
                .pointer("/choices/0/message/content")
                .and_then(|v| v.as_str())
                .ok_or_else(|| anyhow::anyhow!("judge chat API response missing content"))?
                .trim()
                .to_string();
            anyhow::Ok(text)
        };

        let text = timeout(self.timeout, fut)
            .await
            .map_err(|_| anyhow::anyhow!("judge chat API timeout after {:?}", self.timeout))??;

        Ok(LlmResponse {
            text,
            provider: self.provider_name().to_string(),
            model: self.model.clone(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "openai-compat"
    }
}

/// Scripted client for tests: returns queued responses in order.
pub struct FakeClient {
    responses: std::sync::Mutex<Vec<String>>,
}

impl FakeClient {
    pub fn scripted(responses: Vec<String>) -> Self {
        Self {
            responses: std::sync::Mutex::new(responses),
        }
    }
}

#[async_trait]
impl LlmClient for FakeClient {
    async fn complete(&self, _prompt: &str) -> anyhow::Result<LlmResponse> {
        let mut resps = self.responses.lock().unwrap();
        if resps.is_empty() {
            anyhow::bail!("no more scripted responses");
        }
        let text = resps.remove(0);
        Ok(LlmResponse {
            text,
            provider: "fake".to_string(),
            model: "fake".to_string(),
        })
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
