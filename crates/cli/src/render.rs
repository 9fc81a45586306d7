use nexa_core::models::{Expert, MatchResult};
use std::fmt::Write;

pub fn expert_card(e: &Expert) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Expert '{}' ingested (id {})", e.name, id_label(e));
    let _ = writeln!(out, "Confidence Score: {}/100", e.confidence_score);
    let _ = writeln!(out, "Headline: {}", e.headline);
    let _ = writeln!(out, "Vetting Summary: {}", e.vetting_summary);
    let _ = writeln!(out, "ICP Focus: {}", e.icp_focus);
    if !e.strength_mix.is_empty() {
        let mix: Vec<String> = e
            .strength_mix
            .iter()
            .map(|(axis, w)| format!("{} {:.0}%", axis, w * 100.0))
            .collect();
        let _ = writeln!(out, "Strength Mix: {}", mix.join(" / "));
    }
    let skills: Vec<String> = e.domains.iter().map(|d| format!("`{}`", d)).collect();
    let _ = writeln!(out, "Extracted Skills: {}", skills.join(" "));
    if !e.links.is_empty() {
        let _ = writeln!(out, "Links: {}", e.links.join(", "));
    }
    out
}

pub fn match_cards(matches: &[MatchResult]) -> String {
    if matches.is_empty() {
        return "No suitable matches found.\n".to_string();
    }
    let mut out = String::new();
    if let [only] = matches {
        if only.is_service_failure() {
            let _ = writeln!(out, "Matching failed: {}", only.reason);
            return out;
        }
    }
    let _ = writeln!(out, "Found {} AI-Ranked Matches:", matches.len());
    for m in matches {
        let _ = writeln!(out);
        let _ = writeln!(out, "{}  (Match Score {}/100)", m.expert_name, m.score);
        let _ = writeln!(out, "  Why: {}", m.reason);
    }
    out
}

pub fn expert_list(experts: &[Expert]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Total Experts: {}", experts.len());
    for e in experts {
        let _ = writeln!(
            out,
            "  [{}] {} | {} | confidence {}",
            id_label(e),
            e.name,
            e.headline,
            e.confidence_score
        );
    }
    out
}

pub fn status(live: bool, experts: &[Expert]) -> String {
    let mode = if live {
        "Generative service credential detected (live mode)"
    } else {
        "No credential found (fallback mode)"
    };
    format!("{}\n{}", mode, expert_list(experts))
}

fn id_label(e: &Expert) -> String {
    e.id.map(|id| id.to_string()).unwrap_or_else(|| "-".to_string())
}
