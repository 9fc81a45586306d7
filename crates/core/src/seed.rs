use crate::models::Expert;
use crate::repository::ExpertRepository;
use std::collections::BTreeMap;
use tracing::info;

struct Demo {
    name: &'static str,
    headline: &'static str,
    rate: f64,
    domains: &'static [&'static str],
    icp_focus: &'static str,
    strategy: f64,
    confidence_score: u8,
    mini_case_response: &'static str,
    vetting_summary: &'static str,
}

const DEMO: &[Demo] = &[
    Demo {
        name: "Elena 'The Strategist' V.",
        headline: "B2B SaaS Growth Strategy for Series A+",
        rate: 350.0,
        domains: &["B2B Lead Gen", "SaaS Pricing", "GTM Strategy"],
        icp_focus: "Post-PMF SaaS Scale-ups",
        strategy: 0.9,
        confidence_score: 95,
        mini_case_response: "To fix the leaky bucket, I'd first audit the churn analytics by cohort. Usually, it's an activation problem, not a retention one. I'd implement a concierge onboarding flow for high-value tiers.",
        vetting_summary: "Top-tier strategic thinker. Expensive but high leverage. Best for teams that have developers to execute but lack direction.",
    },
    Demo {
        name: "Mark 'The Builder' S.",
        headline: "HubSpot Implementation & Automation Specialist",
        rate: 85.0,
        domains: &["CRM Setup", "Email Automation", "HubSpot"],
        icp_focus: "Early-stage Solopreneurs / Small Teams",
        strategy: 0.2,
        confidence_score: 88,
        mini_case_response: "I'll set up 3 core workflows: Lead Nurture, Deal Pipeline automations, and a Re-engagement campaign. I can get this live in 48 hours if you provide the copy.",
        vetting_summary: "Pure executor. Great value for money if you know exactly what you want built. Not a strategist.",
    },
    Demo {
        name: "Sarah 'Niche' K.",
        headline: "FinTech Compliance & Risk Consultant",
        rate: 200.0,
        domains: &["FinTech", "Compliance", "Risk Management"],
        icp_focus: "FinTech Startups (Seed to Series B)",
        strategy: 0.6,
        confidence_score: 92,
        mini_case_response: "For the new lending product, we need to review the KYC flow against the latest AML directives. I'd propose a risk-based approach to minimize friction for low-risk users.",
        vetting_summary: "Deep domain expert in a high-stakes niche. Essential for FinTechs, irrelevant for everyone else.",
    },
    Demo {
        name: "David 'The Scaling' R.",
        headline: "Performance Marketing (FB/Google Ads)",
        rate: 150.0,
        domains: &["Paid Social", "PPC", "Creative Strategy"],
        icp_focus: "E-commerce & D2C Brands",
        strategy: 0.4,
        confidence_score: 85,
        mini_case_response: "I'd A/B test 5 creative variations on FB focusing on UGC style ads. For Google, we need to tighten the negative keywords list to stop wasting spend on 'free' seekers.",
        vetting_summary: "Solid performance marketer. Good balance of thinking and doing. metrics-driven.",
    },
    Demo {
        name: "Jessica 'The Fixer' L.",
        headline: "Operational Efficiency & Process Design",
        rate: 120.0,
        domains: &["Notion", "Zapier", "SOP Creation"],
        icp_focus: "Agencies & Service Businesses",
        strategy: 0.5,
        confidence_score: 90,
        mini_case_response: "Your team is drowning because knowledge is siloed. I'll build a central team wiki in Notion and automate the client onboarding handoff using Zapier.",
        vetting_summary: "Excellent at bringing order to chaos. Very practical and hands-on.",
    },
];

pub fn demo_experts() -> Vec<Expert> {
    DEMO.iter()
        .map(|d| Expert {
            id: None,
            name: d.name.to_string(),
            headline: d.headline.to_string(),
            rate: d.rate,
            links: Vec::new(),
            domains: d.domains.iter().map(|s| s.to_string()).collect(),
            icp_focus: d.icp_focus.to_string(),
            strength_mix: BTreeMap::from([
                ("strategy".to_string(), d.strategy),
                ("execution".to_string(), ((1.0 - d.strategy) * 10.0).round() / 10.0),
            ]),
            confidence_score: d.confidence_score,
            mini_case_response: d.mini_case_response.to_string(),
            vetting_summary: d.vetting_summary.to_string(),
        })
        .collect()
}

/// Inserts the demo roster unless the store already has experts.
/// Returns how many were added.
pub async fn seed(repo: &dyn ExpertRepository) -> anyhow::Result<usize> {
    if !repo.list_all().await?.is_empty() {
        info!("store already holds experts, skipping seed");
        return Ok(0);
    }
    let experts = demo_experts();
    let n = experts.len();
    for e in experts {
        repo.insert(e).await?;
    }
    info!("seeded {} experts", n);
    Ok(n)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::InMemoryExpertRepository;

    #[tokio::test]
    async fn seeds_once() {
        let repo = InMemoryExpertRepository::new();
        assert_eq!(seed(&repo).await.unwrap(), 5);
        assert_eq!(seed(&repo).await.unwrap(), 0);
        assert_eq!(repo.len(), 5);
    }

    #[test]
    fn demo_mix_is_complementary() {
        let mark = demo_experts()
            .into_iter()
            .find(|e| e.name.starts_with("Mark"))
            .unwrap();
        assert_eq!(mark.strength_mix["strategy"], 0.2);
        assert_eq!(mark.strength_mix["execution"], 0.8);
    }
}
