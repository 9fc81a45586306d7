use crate::{LlmProvider, ProviderError};
use bytes::Bytes;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

const GENERATE_METHOD: &str = "generateContent";

#[derive(Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Substring a discovered model name should contain, e.g. `gemini-1.5`.
    pub preferred_family: String,
    /// Used when discovery fails or returns nothing usable.
    pub default_model: String,
}

/// Google Generative Language backend.
///
/// Each `generate` call lists the models the key can see and picks one
/// before sending the prompt. Nothing is cached between calls.
#[derive(Clone)]
pub struct GeminiProvider {
    client: Client,
    cfg: Arc<GeminiConfig>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub supported_generation_methods: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModelList {
    #[serde(default)]
    models: Vec<ModelInfo>,
    next_page_token: Option<String>,
}

/// Follows `nextPageToken` until the listing is exhausted.
async fn collect_pages<F, Fut>(mut fetch: F) -> Result<Vec<ModelInfo>, ProviderError>
where
    F: FnMut(Option<String>) -> Fut,
    Fut: Future<Output = Result<ModelList, ProviderError>>,
{
    let mut models = Vec::new();
    let mut token: Option<String> = None;
    loop {
        let page = fetch(token.clone()).await?;
        models.extend(page.models);
        match page.next_page_token.filter(|t| !t.is_empty()) {
            // a repeated token would loop forever
            Some(next) if token.as_deref() != Some(next.as_str()) => token = Some(next),
            _ => return Ok(models),
        }
    }
}

impl GeminiProvider {
    pub fn new(cfg: GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            cfg: Arc::new(cfg),
        }
    }

    fn base(&self) -> &str {
        self.cfg.base_url.trim_end_matches('/')
    }

    pub async fn list_models(&self) -> Result<Vec<ModelInfo>, ProviderError> {
        collect_pages(|token| self.list_models_page(token)).await
    }

    async fn list_models_page(&self, token: Option<String>) -> Result<ModelList, ProviderError> {
        let mut builder = self
            .client
            .get(format!("{}/v1beta/models", self.base()))
            .header("x-goog-api-key", &self.cfg.api_key);
        if let Some(t) = &token {
            builder = builder.query(&[("pageToken", t.as_str())]);
        }
        let resp = builder
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
            return Err(ProviderError::RequestFailed(format!(
                "status {} body {:?}",
                status, body
            )));
        }
        resp.json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))
    }

    async fn resolve_model(&self) -> String {
        match self.list_models().await {
            Ok(models) => select_model(&models, &self.cfg.preferred_family)
                .unwrap_or_else(|| self.cfg.default_model.clone()),
            Err(e) => {
                warn!("model discovery failed, using {}: {}", self.cfg.default_model, e);
                self.cfg.default_model.clone()
            }
        }
    }
}

/// Picks a model that supports free-form generation, preferring `family`,
/// then any `gemini` model, then whatever is listed first.
pub fn select_model(models: &[ModelInfo], family: &str) -> Option<String> {
    let usable: Vec<&ModelInfo> = models
        .iter()
        .filter(|m| {
            m.supported_generation_methods
                .iter()
                .any(|g| g == GENERATE_METHOD)
        })
        .collect();
    usable
        .iter()
        .find(|m| !family.is_empty() && m.name.contains(family))
        .or_else(|| usable.iter().find(|m| m.name.contains("gemini")))
        .or_else(|| usable.first())
        .map(|m| m.name.clone())
}

#[async_trait::async_trait]
impl LlmProvider for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<String, ProviderError> {
        #[derive(Serialize)]
        struct Part<'a> {
            text: &'a str,
        }
        #[derive(Serialize)]
        struct Content<'a> {
            parts: Vec<Part<'a>>,
        }
        #[derive(Serialize)]
        struct GenerateRequest<'a> {
            contents: Vec<Content<'a>>,
        }
        #[derive(Deserialize)]
        struct RespPart {
            #[serde(default)]
            text: String,
        }
        #[derive(Deserialize)]
        struct RespContent {
            #[serde(default)]
            parts: Vec<RespPart>,
        }
        #[derive(Deserialize)]
        struct Candidate {
            content: Option<RespContent>,
        }
        #[derive(Deserialize)]
        struct GenerateResponse {
            #[serde(default)]
            candidates: Vec<Candidate>,
        }

        let model = self.resolve_model().await;
        let model = if model.starts_with("models/") {
            model
        } else {
            format!("models/{}", model)
        };
        debug!("generating with {}", model);

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };
        let resp = self
            .client
            .post(format!("{}/v1beta/{}:{}", self.base(), model, GENERATE_METHOD))
            .header("x-goog-api-key", &self.cfg.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.bytes().await.unwrap_or(Bytes::from_static(b""));
            return Err(ProviderError::RequestFailed(format!(
                "status {} body {:?}",
                status, body
            )));
        }

        let parsed: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| ProviderError::RequestFailed(e.to_string()))?;
        let text: String = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        if text.is_empty() {
            return Err(ProviderError::RequestFailed(
                "response had no candidate text".into(),
            ));
        }
        Ok(text)
    }
}
