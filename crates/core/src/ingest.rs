use crate::extractor::ExtractionService;
use crate::models::{parse_links, Expert};
use crate::repository::ExpertRepository;
use tracing::info;

/// Analyzes a submitted profile and upserts it by name.
///
/// The name is trimmed of surrounding whitespace, then matched exactly
/// (case-sensitive) against stored names: `" Bob"` and `"Bob"` are the same
/// expert, `"bob"` is not. The trimmed name is what gets stored.
///
/// An existing record keeps its id, name and rate; everything inferred is
/// overwritten with the new extraction. Service trouble never surfaces here:
/// the extraction degrades to the fallback profile. Only a blank name or bio
/// and repository failures are errors.
///
/// Concurrent calls for the same name are not serialized against each other.
pub async fn ingest(
    service: &ExtractionService,
    repo: &dyn ExpertRepository,
    name: &str,
    bio: &str,
    links: &str,
) -> anyhow::Result<Expert> {
    let name = name.trim();
    anyhow::ensure!(!name.is_empty(), "expert name must not be empty");
    anyhow::ensure!(!bio.trim().is_empty(), "expert bio must not be empty");

    let profile = service.analyze(name, bio, links).await;
    let links = parse_links(links);

    match repo.find_by_name(name).await? {
        Some(mut existing) => {
            info!("updating expert {} (id {:?})", name, existing.id);
            existing.apply_profile(bio, links, profile);
            repo.update(existing).await
        }
        None => {
            info!("creating expert {}", name);
            repo.insert(Expert::from_profile(name, bio, links, profile))
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::testing::ScriptedProvider;
    use crate::extractor::FALLBACK_HEADLINE;
    use crate::repository::InMemoryExpertRepository;
    use std::sync::Arc;

    const BOB: &str = r#"{"headline":"X | Y | Z","domains":["a","b"],"icp_focus":"Z","strength_mix":{"strategy":0.5,"execution":0.5},"confidence_score":77,"vetting_summary":"s"}"#;

    #[tokio::test]
    async fn live_extraction_is_persisted() {
        let repo = InMemoryExpertRepository::new();
        let svc = ExtractionService::live(Arc::new(ScriptedProvider::replying(vec![Ok(BOB)])));

        let e = ingest(&svc, &repo, "Bob", "bio", "l1,l2").await.unwrap();
        assert_eq!(e.name, "Bob");
        assert_eq!(e.confidence_score, 77);
        assert_eq!(e.links, vec!["l1", "l2"]);
        assert_eq!(e.mini_case_response, "bio");
        assert!(e.id.is_some());

        let stored = repo.find_by_name("Bob").await.unwrap().unwrap();
        assert_eq!(stored, e);
    }

    #[tokio::test]
    async fn same_name_updates_instead_of_duplicating() {
        let repo = InMemoryExpertRepository::new();
        let svc = ExtractionService::live(Arc::new(ScriptedProvider::replying(vec![
            Ok(BOB),
            Ok(r#"{"headline":"New | Skills | Here","domains":["c"],"icp_focus":"Agencies","strength_mix":{},"confidence_score":40,"vetting_summary":"t"}"#),
        ])));

        let first = ingest(&svc, &repo, "Bob", "bio", "l1,l2").await.unwrap();
        let second = ingest(&svc, &repo, "Bob", "bio v2", "").await.unwrap();

        assert_eq!(repo.len(), 1);
        assert_eq!(first.id, second.id);
        let stored = repo.find_by_name("Bob").await.unwrap().unwrap();
        assert_eq!(stored.headline, "New | Skills | Here");
        assert_eq!(stored.domains, vec!["c"]);
        assert_eq!(stored.confidence_score, 40);
        assert_eq!(stored.mini_case_response, "bio v2");
        assert!(stored.links.is_empty());
    }

    #[tokio::test]
    async fn fallback_mode_still_persists() {
        let repo = InMemoryExpertRepository::new();
        let e = ingest(&ExtractionService::fallback(), &repo, "A", "bio", "")
            .await
            .unwrap();
        assert_eq!(e.headline, FALLBACK_HEADLINE);
        assert_eq!(e.domains, vec!["Unclassified"]);
        assert_eq!(e.rate, 0.0);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn malformed_reply_still_returns_expert() {
        let repo = InMemoryExpertRepository::new();
        let svc = ExtractionService::live(Arc::new(ScriptedProvider::replying(vec![Ok(
            "{\"headline\": ",
        )])));
        let e = ingest(&svc, &repo, "A", "bio", "").await.unwrap();
        assert_eq!(e.headline, FALLBACK_HEADLINE);
        assert_eq!(e.confidence_score, 0);
    }

    #[tokio::test]
    async fn blank_input_is_rejected_before_any_call() {
        let repo = InMemoryExpertRepository::new();
        let provider = Arc::new(ScriptedProvider::replying(vec![Ok(BOB)]));
        let svc = ExtractionService::live(provider.clone());
        assert!(ingest(&svc, &repo, "  ", "bio", "").await.is_err());
        assert!(ingest(&svc, &repo, "A", "", "").await.is_err());
        assert_eq!(provider.calls(), 0);
        assert!(repo.is_empty());
    }

    #[tokio::test]
    async fn name_key_is_trimmed_but_case_sensitive() {
        let repo = InMemoryExpertRepository::new();
        let svc = ExtractionService::fallback();
        let a = ingest(&svc, &repo, " Bob ", "bio", "").await.unwrap();
        let b = ingest(&svc, &repo, "Bob", "bio", "").await.unwrap();
        assert_eq!(a.name, "Bob");
        assert_eq!(a.id, b.id);
        assert_eq!(repo.len(), 1);

        ingest(&svc, &repo, "bob", "bio", "").await.unwrap();
        assert_eq!(repo.len(), 2);
    }
}
