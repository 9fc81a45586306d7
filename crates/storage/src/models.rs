use sqlx::types::Json;
use sqlx::FromRow;
use std::collections::BTreeMap;

/// One row of the `experts` table. List and map columns are stored as JSON text.
#[derive(Debug, Clone, FromRow)]
pub struct ExpertRow {
    pub id: i64,
    pub name: String,
    pub headline: String,
    pub rate: f64,
    pub links: Json<Vec<String>>,
    pub domains: Json<Vec<String>>,
    pub icp_focus: String,
    pub strength_mix: Json<BTreeMap<String, f64>>,
    pub confidence_score: i64,
    pub mini_case_response: String,
    pub vetting_summary: String,
}
