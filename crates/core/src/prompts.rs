// Prompt templates for the generative service.

use crate::models::Expert;

const EXTRACTION_PROMPT: &str = r#"You are a Forensic Data Extractor for an Expert Marketplace.

INPUT PROFILE:
Name: {name}
Bio/Context: {bio}
Links: {links}

TASK:
Extract specific hard skills and attributes.
Do NOT summarize into generic titles like "Digital Marketer". Be specific.

OUTPUT JSON ONLY:
{
    "headline": "A sharp, 3-part pipe-separated headline of specific skills (e.g. 'Facebook Ads | Conversion API | Pinterest Marketing')",
    "domains": ["List", "of", "10+", "specific", "tags", "found", "in", "text"],
    "icp_focus": "The exact business type they help (e.g. 'E-commerce Brands', 'Local Biz')",
    "strength_mix": { "strategy": 0.0, "execution": 0.0 },
    "confidence_score": 90,
    "vetting_summary": "2 sentences analyzing their specific expertise based on the text provided."
}

RULES:
1. confidence_score is an integer from 0 to 100 rating how specific the profile is.
2. strength_mix weights are fractions between 0 and 1.
3. Return ONLY the JSON object."#;

const MATCHING_PROMPT: &str = r#"Act as a Matchmaker.
SME PROBLEM: "{need}"
CANDIDATES:
{candidates}
TASK: Pick the top {top_k} experts. Return JSON ONLY.
[ { "expert_name": "Name", "score": 90, "reason": "Why..." } ]"#;

/// Substitutes `{key}` placeholders in one left-to-right pass. Substituted
/// text is never rescanned; unknown braces are copied through.
fn fill(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let hit = vars.iter().find(|(key, _)| {
            tail.len() > key.len() + 1
                && tail[1..].starts_with(key)
                && tail[1 + key.len()..].starts_with('}')
        });
        match hit {
            Some((key, value)) => {
                out.push_str(value);
                rest = &tail[key.len() + 2..];
            }
            None => {
                out.push('{');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

pub fn extraction_prompt(name: &str, bio: &str, links: &str) -> String {
    fill(
        EXTRACTION_PROMPT,
        &[("name", name), ("bio", bio), ("links", links)],
    )
}

pub fn matching_prompt(need: &str, experts: &[Expert], top_k: usize) -> String {
    let candidates: String = experts
        .iter()
        .map(|e| {
            format!(
                "- Name: {} | Headline: {} | Skills: {}\n",
                e.name,
                e.headline,
                e.domains.join(", ")
            )
        })
        .collect();
    let top_k = top_k.to_string();
    fill(
        MATCHING_PROMPT,
        &[
            ("need", need),
            ("candidates", candidates.trim_end()),
            ("top_k", &top_k),
        ],
    )
}
