use crate::models::Expert;
use sqlx::SqlitePool;
use std::sync::Mutex;
use storage::models::ExpertRow;

/// Persistence boundary for experts. No business rules live here.
#[async_trait::async_trait]
pub trait ExpertRepository: Send + Sync {
    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Expert>>;
    /// Stores a new record and returns it with its assigned id.
    async fn insert(&self, expert: Expert) -> anyhow::Result<Expert>;
    async fn update(&self, expert: Expert) -> anyhow::Result<Expert>;
    async fn list_all(&self) -> anyhow::Result<Vec<Expert>>;
}

pub struct SqliteExpertRepository {
    pool: SqlitePool,
}

impl SqliteExpertRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl ExpertRepository for SqliteExpertRepository {
    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Expert>> {
        Ok(storage::experts::find_by_name(&self.pool, name)
            .await?
            .map(Expert::from))
    }

    async fn insert(&self, mut expert: Expert) -> anyhow::Result<Expert> {
        let id = storage::experts::insert(&self.pool, &ExpertRow::from(&expert)).await?;
        expert.id = Some(id);
        Ok(expert)
    }

    async fn update(&self, expert: Expert) -> anyhow::Result<Expert> {
        if expert.id.is_none() {
            anyhow::bail!("cannot update unsaved expert {}", expert.name);
        }
        storage::experts::update(&self.pool, &ExpertRow::from(&expert)).await?;
        Ok(expert)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Expert>> {
        Ok(storage::experts::list_all(&self.pool)
            .await?
            .into_iter()
            .map(Expert::from)
            .collect())
    }
}

/// Process-local store, handy for tests and dry runs.
#[derive(Default)]
pub struct InMemoryExpertRepository {
    experts: Mutex<Vec<Expert>>,
}

impl InMemoryExpertRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Expert>> {
        self.experts.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait::async_trait]
impl ExpertRepository for InMemoryExpertRepository {
    async fn find_by_name(&self, name: &str) -> anyhow::Result<Option<Expert>> {
        Ok(self.lock().iter().find(|e| e.name == name).cloned())
    }

    async fn insert(&self, mut expert: Expert) -> anyhow::Result<Expert> {
        let mut experts = self.lock();
        let next = experts.iter().filter_map(|e| e.id).max().unwrap_or(0) + 1;
        expert.id = Some(next);
        experts.push(expert.clone());
        Ok(expert)
    }

    async fn update(&self, expert: Expert) -> anyhow::Result<Expert> {
        let mut experts = self.lock();
        let slot = experts
            .iter_mut()
            .find(|e| e.id.is_some() && e.id == expert.id)
            .ok_or_else(|| anyhow::anyhow!("no expert with id {:?}", expert.id))?;
        *slot = expert.clone();
        Ok(expert)
    }

    async fn list_all(&self) -> anyhow::Result<Vec<Expert>> {
        Ok(self.lock().clone())
    }
}
