use crate::config::AppConfig;
use crate::extractor::ExtractionService;
use crate::models::{Expert, MatchResult};
use crate::repository::{ExpertRepository, SqliteExpertRepository};
use crate::{ingest, matcher};
use anyhow::Context;
use providers::gemini::{GeminiConfig, GeminiProvider};
use providers::openai::{OpenAiConfig, OpenAiProvider};
use providers::ProviderRegistry;
use sqlx::SqlitePool;
use std::sync::Arc;
use storage::{connect, migrate};
use tracing::{info, warn};

/// The two entry points a front end calls, bound to one service and store.
pub struct Engine {
    service: ExtractionService,
    repo: Arc<dyn ExpertRepository>,
    top_k: usize,
}

impl Engine {
    pub fn new(service: ExtractionService, repo: Arc<dyn ExpertRepository>, top_k: usize) -> Self {
        Self {
            service,
            repo,
            top_k,
        }
    }

    pub fn is_live(&self) -> bool {
        self.service.is_live()
    }

    pub fn repository(&self) -> &dyn ExpertRepository {
        self.repo.as_ref()
    }

    pub async fn ingest(&self, name: &str, bio: &str, links: &str) -> anyhow::Result<Expert> {
        ingest::ingest(&self.service, self.repo.as_ref(), name, bio, links).await
    }

    pub async fn find_matches(&self, need: &str) -> anyhow::Result<Vec<MatchResult>> {
        matcher::find_best_matches(&self.service, self.repo.as_ref(), need, self.top_k).await
    }
}

/// Connects and migrates the configured database and builds an [`Engine`] on it.
/// The pool is returned for administrative commands.
pub async fn open(config: &AppConfig) -> anyhow::Result<(Engine, SqlitePool)> {
    let pool = connect(&config.database.path).await.context("db connect")?;
    migrate(&pool).await.context("db migrate")?;
    let repo = Arc::new(SqliteExpertRepository::new(pool.clone()));
    let engine = Engine::new(build_service(config), repo, config.matching.top_k);
    Ok((engine, pool))
}

pub fn build_registry(config: &AppConfig) -> ProviderRegistry {
    let mut reg = ProviderRegistry::new();
    let llm = &config.llm;

    if let Some(key) = llm.api_key() {
        match llm.provider.as_str() {
            "gemini" => {
                let provider = GeminiProvider::new(GeminiConfig {
                    api_key: key,
                    base_url: llm.base_url.clone(),
                    preferred_family: llm.preferred_model_family.clone(),
                    default_model: llm.default_model.clone(),
                });
                reg = reg.with_llm("gemini", Arc::new(provider));
            }
            "openai" => {
                let provider = OpenAiProvider::new(OpenAiConfig {
                    api_key: key,
                    base_url: llm.base_url.clone(),
                    chat_model: llm.default_model.clone(),
                });
                reg = reg.with_llm("openai", Arc::new(provider));
            }
            other => warn!("unknown llm provider {:?}", other),
        }
    }

    reg.set_preferred_llm(&llm.provider)
}

/// Live mode when the configured provider has a credential, fallback otherwise.
pub fn build_service(config: &AppConfig) -> ExtractionService {
    match build_registry(config).llm(None) {
        Ok(provider) => {
            info!("{} credential detected, using live service", config.llm.provider);
            ExtractionService::live(provider)
        }
        Err(_) => {
            info!("no {} credential found, using fallback mode", config.llm.api_key_env);
            ExtractionService::fallback()
        }
    }
}
