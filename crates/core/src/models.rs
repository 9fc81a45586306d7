use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use std::collections::BTreeMap;
use storage::models::ExpertRow;

/// A vetted expert as persisted by the repository.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expert {
    /// Assigned on first insert; `None` until then.
    pub id: Option<i64>,
    pub name: String,
    pub headline: String,
    pub rate: f64,
    pub links: Vec<String>,
    pub domains: Vec<String>,
    pub icp_focus: String,
    pub strength_mix: BTreeMap<String, f64>,
    pub confidence_score: u8,
    pub mini_case_response: String,
    pub vetting_summary: String,
}

/// Everything the extraction service infers about a profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructuredProfile {
    pub headline: String,
    pub domains: Vec<String>,
    pub icp_focus: String,
    pub strength_mix: BTreeMap<String, f64>,
    pub confidence_score: u8,
    pub vetting_summary: String,
}

/// One ranked candidate for a business need.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub expert_name: String,
    pub score: i64,
    pub reason: String,
}

impl Expert {
    /// A fresh, unsaved record for `name` built from an extraction.
    pub fn from_profile(name: &str, bio: &str, links: Vec<String>, profile: StructuredProfile) -> Self {
        let mut expert = Self {
            id: None,
            name: name.to_string(),
            headline: String::new(),
            rate: 0.0,
            links: Vec::new(),
            domains: Vec::new(),
            icp_focus: String::new(),
            strength_mix: BTreeMap::new(),
            confidence_score: 0,
            mini_case_response: String::new(),
            vetting_summary: String::new(),
        };
        expert.apply_profile(bio, links, profile);
        expert
    }

    /// Overwrites every inferred field plus the submitted bio and links.
    /// `id`, `name` and `rate` are left alone.
    pub fn apply_profile(&mut self, bio: &str, links: Vec<String>, profile: StructuredProfile) {
        self.headline = profile.headline;
        self.domains = profile.domains;
        self.icp_focus = profile.icp_focus;
        self.strength_mix = profile.strength_mix;
        self.confidence_score = profile.confidence_score.min(100);
        self.vetting_summary = profile.vetting_summary;
        self.mini_case_response = bio.to_string();
        self.links = links;
    }
}

impl From<ExpertRow> for Expert {
    fn from(row: ExpertRow) -> Self {
        Self {
            id: Some(row.id),
            name: row.name,
            headline: row.headline,
            rate: row.rate,
            links: row.links.0,
            domains: row.domains.0,
            icp_focus: row.icp_focus,
            strength_mix: row.strength_mix.0,
            confidence_score: row.confidence_score.clamp(0, 100) as u8,
            mini_case_response: row.mini_case_response,
            vetting_summary: row.vetting_summary,
        }
    }
}

impl From<&Expert> for ExpertRow {
    fn from(e: &Expert) -> Self {
        Self {
            id: e.id.unwrap_or_default(),
            name: e.name.clone(),
            headline: e.headline.clone(),
            rate: e.rate,
            links: Json(e.links.clone()),
            domains: Json(e.domains.clone()),
            icp_focus: e.icp_focus.clone(),
            strength_mix: Json(e.strength_mix.clone()),
            confidence_score: i64::from(e.confidence_score.min(100)),
            mini_case_response: e.mini_case_response.clone(),
            vetting_summary: e.vetting_summary.clone(),
        }
    }
}

/// Splits the raw comma-separated links field, dropping blanks.
pub fn parse_links(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect()
}
