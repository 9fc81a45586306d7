//! Extraction service adapter: turns a free-text profile into a
//! [`StructuredProfile`] through the generative service, or through a fixed
//! fallback when no credential is configured or the service misbehaves.

use crate::models::StructuredProfile;
use crate::prompts;
use providers::{LlmProvider, ProviderError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

pub const FALLBACK_HEADLINE: &str = "Pending Review | Manual Vetting | Unanalyzed Profile";
pub const FALLBACK_DOMAINS: &[&str] = &["Unclassified"];
pub const FALLBACK_ICP: &str = "Unknown";
pub const NO_CREDENTIAL_SUMMARY: &str =
    "No generative service credential configured; profile stored without analysis.";

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("no generative service credential configured")]
    MissingCredential,
    #[error("service call failed: {0}")]
    ServiceCallFailure(#[from] ProviderError),
    #[error("malformed service response: {0}")]
    MalformedResponse(String),
}

/// What the adapter talks to, chosen once from credential presence.
#[derive(Clone)]
pub enum ServiceMode {
    Live(Arc<dyn LlmProvider>),
    Fallback,
}

#[derive(Clone)]
pub struct ExtractionService {
    mode: ServiceMode,
}

/// Service output before defaults are applied. Each field tolerates the wrong
/// JSON type on its own: a bad field reads as absent instead of failing the
/// whole payload.
#[derive(Debug, Deserialize)]
struct RawProfile {
    #[serde(default, deserialize_with = "lenient_string")]
    headline: Option<String>,
    #[serde(default, deserialize_with = "lenient_strings")]
    domains: Option<Vec<String>>,
    #[serde(default, deserialize_with = "lenient_string")]
    icp_focus: Option<String>,
    #[serde(default, deserialize_with = "lenient_weights")]
    strength_mix: Option<BTreeMap<String, f64>>,
    #[serde(default, deserialize_with = "lenient_number")]
    confidence_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    vetting_summary: Option<String>,
}

fn number_of(v: &Value) -> Option<f64> {
    match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }
}

fn lenient_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_strings<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Vec<String>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(|i| match i {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        Value::String(s) => Some(
            s.split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(String::from)
                .collect(),
        ),
        _ => None,
    })
}

fn lenient_number<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(number_of(&Value::deserialize(d)?))
}

fn lenient_weights<'de, D: Deserializer<'de>>(
    d: D,
) -> Result<Option<BTreeMap<String, f64>>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Object(map) => Some(
            map.into_iter()
                .filter_map(|(axis, w)| number_of(&w).map(|w| (axis, w)))
                .collect(),
        ),
        _ => None,
    })
}

impl From<RawProfile> for StructuredProfile {
    fn from(raw: RawProfile) -> Self {
        Self {
            headline: raw.headline.unwrap_or_else(|| "New Expert".to_string()),
            domains: raw.domains.unwrap_or_default(),
            icp_focus: raw.icp_focus.unwrap_or_else(|| "General".to_string()),
            strength_mix: raw
                .strength_mix
                .unwrap_or_default()
                .into_iter()
                .map(|(axis, w)| (axis.trim().to_lowercase(), w))
                .collect(),
            confidence_score: clamp_score(raw.confidence_score.unwrap_or(50.0)),
            vetting_summary: raw.vetting_summary.unwrap_or_default(),
        }
    }
}

fn clamp_score(raw: f64) -> u8 {
    if raw.is_nan() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

impl StructuredProfile {
    /// The fixed profile used whenever the service can't be consulted.
    pub fn fallback(summary: impl Into<String>) -> Self {
        Self {
            headline: FALLBACK_HEADLINE.to_string(),
            domains: FALLBACK_DOMAINS.iter().map(|d| d.to_string()).collect(),
            icp_focus: FALLBACK_ICP.to_string(),
            strength_mix: BTreeMap::from([
                ("strategy".to_string(), 0.0),
                ("execution".to_string(), 0.0),
            ]),
            confidence_score: 0,
            vetting_summary: summary.into(),
        }
    }
}

/// Removes markdown code fences the service may wrap its JSON in.
pub fn strip_code_fences(text: &str) -> &str {
    text.trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

impl ExtractionService {
    pub fn new(mode: ServiceMode) -> Self {
        Self { mode }
    }

    pub fn live(provider: Arc<dyn LlmProvider>) -> Self {
        Self::new(ServiceMode::Live(provider))
    }

    pub fn fallback() -> Self {
        Self::new(ServiceMode::Fallback)
    }

    pub fn is_live(&self) -> bool {
        matches!(self.mode, ServiceMode::Live(_))
    }

    /// Sends one prompt and parses the fenced-or-bare JSON reply as `T`.
    pub async fn complete_json<T: DeserializeOwned>(&self, prompt: &str) -> Result<T, ServiceError> {
        let provider = match &self.mode {
            ServiceMode::Live(p) => p,
            ServiceMode::Fallback => return Err(ServiceError::MissingCredential),
        };
        let text = provider.generate(prompt).await?;
        debug!("service replied with {} bytes", text.len());
        serde_json::from_str(strip_code_fences(&text))
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))
    }

    /// Like [`analyze`](Self::analyze) but reports why the service wasn't used.
    pub async fn try_analyze(
        &self,
        name: &str,
        bio: &str,
        links: &str,
    ) -> Result<StructuredProfile, ServiceError> {
        let prompt = prompts::extraction_prompt(name, bio, links);
        let raw: RawProfile = self.complete_json(&prompt).await?;
        Ok(raw.into())
    }

    /// Never fails: any service problem degrades to [`StructuredProfile::fallback`].
    pub async fn analyze(&self, name: &str, bio: &str, links: &str) -> StructuredProfile {
        match self.try_analyze(name, bio, links).await {
            Ok(profile) => {
                info!(
                    "extracted profile for {} (confidence {})",
                    name, profile.confidence_score
                );
                profile
            }
            Err(ServiceError::MissingCredential) => {
                info!("no service credential, using fallback profile for {}", name);
                StructuredProfile::fallback(NO_CREDENTIAL_SUMMARY)
            }
            Err(e) => {
                warn!("analysis of {} failed: {}", name, e);
                StructuredProfile::fallback(format!("Analysis failed: {}", e))
            }
        }
    }
}
