use crate::extractor::{ExtractionService, ServiceError};
use crate::models::MatchResult;
use crate::prompts;
use crate::repository::ExpertRepository;
use serde::Deserialize;
use tracing::{debug, info, warn};

/// `expert_name` of the single card returned when the service fails.
pub const SERVICE_FAILED: &str = "service failed";
/// Prefix tagging every reason that came back from the service.
pub const AI_MATCH_PREFIX: &str = "⚡ [AI MATCH]: ";

#[derive(Debug, Deserialize)]
struct RawMatch {
    #[serde(default)]
    expert_name: String,
    #[serde(default)]
    score: f64,
    #[serde(default)]
    reason: String,
}

impl From<RawMatch> for MatchResult {
    fn from(raw: RawMatch) -> Self {
        Self {
            expert_name: raw.expert_name,
            score: raw.score.round() as i64,
            reason: format!("{}{}", AI_MATCH_PREFIX, raw.reason),
        }
    }
}

impl MatchResult {
    pub fn service_failed(detail: impl Into<String>) -> Self {
        Self {
            expert_name: SERVICE_FAILED.to_string(),
            score: 0,
            reason: detail.into(),
        }
    }

    pub fn is_service_failure(&self) -> bool {
        self.expert_name == SERVICE_FAILED
    }
}

/// Ranks stored experts against a free-text need.
///
/// Returns an empty list when there are no experts (no service call is made)
/// or when no credential is configured. A failed call or unparseable reply
/// yields exactly one [`MatchResult::service_failed`] card. Results keep the
/// order the service gave them.
pub async fn find_best_matches(
    service: &ExtractionService,
    repo: &dyn ExpertRepository,
    need: &str,
    top_k: usize,
) -> anyhow::Result<Vec<MatchResult>> {
    let experts = repo.list_all().await?;
    if experts.is_empty() {
        debug!("no experts stored, skipping match");
        return Ok(Vec::new());
    }
    info!("matching need against {} experts", experts.len());

    let prompt = prompts::matching_prompt(need, &experts, top_k);
    match service.complete_json::<Vec<RawMatch>>(&prompt).await {
        Ok(raw) => Ok(raw.into_iter().map(MatchResult::from).collect()),
        Err(ServiceError::MissingCredential) => {
            info!("no service credential, returning no matches");
            Ok(Vec::new())
        }
        Err(e) => {
            warn!("matching failed: {}", e);
            Ok(vec![MatchResult::service_failed(e.to_string())])
        }
    }
}
