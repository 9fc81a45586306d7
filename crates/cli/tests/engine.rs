use nexa_core::config::AppConfig;
use nexa_core::extractor::{ExtractionService, FALLBACK_HEADLINE};
use nexa_core::matcher::SERVICE_FAILED;
use nexa_core::pipeline::{self, Engine};
use nexa_core::repository::{ExpertRepository, SqliteExpertRepository};
use providers::{LlmProvider, ProviderError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

struct Canned {
    replies: Mutex<VecDeque<Result<String, String>>>,
    calls: AtomicUsize,
}

impl Canned {
    fn new(replies: &[Result<&str, &str>]) -> Arc<Self> {
        Arc::new(Self {
            replies: Mutex::new(
                replies
                    .iter()
                    .copied()
                    .map(|r| r.map(String::from).map_err(String::from))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait::async_trait]
impl LlmProvider for Canned {
    async fn generate(&self, _prompt: &str) -> Result<String, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(text)) => Ok(text),
            Some(Err(e)) => Err(ProviderError::RequestFailed(e)),
            None => Err(ProviderError::NotImplemented),
        }
    }
}

async fn sqlite_repo() -> Arc<SqliteExpertRepository> {
    let pool = storage::connect("sqlite::memory:").await.unwrap();
    storage::migrate(&pool).await.unwrap();
    Arc::new(SqliteExpertRepository::new(pool))
}

const BOB: &str = r#"{"headline":"X | Y | Z","domains":["a","b"],"icp_focus":"Z","strength_mix":{"strategy":0.5,"execution":0.5},"confidence_score":77,"vetting_summary":"s"}"#;

#[tokio::test]
async fn ingest_then_match_against_sqlite() {
    let provider = Canned::new(&[
        Ok(BOB),
        Ok("```json\n{\"headline\":\"CRM | HubSpot | Zapier\",\"domains\":[\"HubSpot\"],\"icp_focus\":\"Small teams\",\"strength_mix\":{\"Execution\":0.8},\"confidence_score\":140,\"vetting_summary\":\"builder\"}\n```"),
        Ok("[{\"expert_name\":\"Ann\",\"score\":88,\"reason\":\"knows HubSpot\"},{\"expert_name\":\"Bob\",\"score\":91,\"reason\":\"generalist\"}]"),
    ]);
    let repo = sqlite_repo().await;
    let engine = Engine::new(ExtractionService::live(provider.clone()), repo.clone(), 3);
    assert!(engine.is_live());

    let bob = engine.ingest("Bob", "bio", "l1,l2").await.unwrap();
    assert_eq!(bob.confidence_score, 77);
    assert_eq!(bob.links, vec!["l1", "l2"]);

    let ann = engine.ingest("Ann", "HubSpot builder", "").await.unwrap();
    assert_eq!(ann.confidence_score, 100);
    assert_eq!(ann.strength_mix.get("execution"), Some(&0.8));

    let matches = engine.find_matches("set up my CRM").await.unwrap();
    assert_eq!(provider.calls.load(Ordering::SeqCst), 3);
    let names: Vec<&str> = matches.iter().map(|m| m.expert_name.as_str()).collect();
    assert_eq!(names, vec!["Ann", "Bob"]);
    assert!(matches[0].reason.ends_with("knows HubSpot"));
    assert_ne!(matches[0].reason, "knows HubSpot");
}

#[tokio::test]
async fn reingest_keeps_one_row_per_name() {
    let provider = Canned::new(&[Ok(BOB), Err("timeout")]);
    let repo = sqlite_repo().await;
    let engine = Engine::new(ExtractionService::live(provider), repo.clone(), 3);

    let first = engine.ingest("Bob", "bio", "l1").await.unwrap();
    let second = engine.ingest("Bob", "bio again", "").await.unwrap();
    assert_eq!(first.id, second.id);
    assert_eq!(second.headline, FALLBACK_HEADLINE);

    let all = repo.list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].mini_case_response, "bio again");
    assert_eq!(all[0].confidence_score, 0);
}

#[tokio::test]
async fn fallback_engine_ingests_but_never_matches() {
    let repo = sqlite_repo().await;
    let engine = Engine::new(ExtractionService::fallback(), repo, 3);

    assert!(engine.find_matches("anything").await.unwrap().is_empty());
    let a = engine.ingest("A", "bio", "").await.unwrap();
    assert_eq!(a.headline, FALLBACK_HEADLINE);
    assert_eq!(a.domains, vec!["Unclassified"]);
    assert!(engine.find_matches("need").await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_match_is_a_single_card() {
    let provider = Canned::new(&[Ok(BOB), Err("503 unavailable")]);
    let repo = sqlite_repo().await;
    let engine = Engine::new(ExtractionService::live(provider), repo, 3);
    engine.ingest("Bob", "bio", "").await.unwrap();

    let matches = engine.find_matches("need").await.unwrap();
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].expert_name, SERVICE_FAILED);
    assert_eq!(matches[0].score, 0);
    assert!(matches[0].reason.contains("503 unavailable"));
}

#[tokio::test]
async fn seeding_populates_an_empty_store_once() {
    let repo = sqlite_repo().await;
    assert_eq!(nexa_core::seed::seed(repo.as_ref()).await.unwrap(), 5);
    assert_eq!(nexa_core::seed::seed(repo.as_ref()).await.unwrap(), 0);
    let sarah = repo.find_by_name("Sarah 'Niche' K.").await.unwrap().unwrap();
    assert_eq!(sarah.rate, 200.0);
    assert_eq!(storage::experts::delete_all(repo.pool()).await.unwrap(), 5);
}

#[tokio::test]
async fn file_backed_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = AppConfig::default();
    cfg.database.path = dir
        .path()
        .join("data")
        .join("nexa.db")
        .to_string_lossy()
        .into_owned();
    cfg.llm.api_key_env = "NEXA_CLI_TEST_UNSET_KEY".into();

    let (engine, pool) = pipeline::open(&cfg).await.unwrap();
    assert!(!engine.is_live());
    engine.ingest("Bob", "bio", "l1, l2").await.unwrap();
    pool.close().await;
    drop(engine);

    let (engine, _pool) = pipeline::open(&cfg).await.unwrap();
    engine.ingest("Bob", "bio v2", "").await.unwrap();
    let all = engine.repository().list_all().await.unwrap();
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].mini_case_response, "bio v2");
    assert!(dir.path().join("data").join("nexa.db").exists());
}
