use crate::models::ExpertRow;
use sqlx::SqlitePool;
use tracing::debug;

const COLUMNS: &str = "id, name, headline, rate, links, domains, icp_focus, strength_mix, \
                       confidence_score, mini_case_response, vetting_summary";

/// First expert stored under exactly `name`, oldest first.
pub async fn find_by_name(pool: &SqlitePool, name: &str) -> anyhow::Result<Option<ExpertRow>> {
    let sql = format!(
        "SELECT {} FROM experts WHERE name = ?1 ORDER BY id LIMIT 1",
        COLUMNS
    );
    let row = sqlx::query_as::<_, ExpertRow>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

pub async fn list_all(pool: &SqlitePool) -> anyhow::Result<Vec<ExpertRow>> {
    let sql = format!("SELECT {} FROM experts ORDER BY id", COLUMNS);
    let rows = sqlx::query_as::<_, ExpertRow>(&sql).fetch_all(pool).await?;
    Ok(rows)
}

/// Inserts `row` ignoring its `id`; returns the id SQLite assigned.
pub async fn insert(pool: &SqlitePool, row: &ExpertRow) -> anyhow::Result<i64> {
    let res = sqlx::query(
        "INSERT INTO experts (name, headline, rate, links, domains, icp_focus, strength_mix, \
         confidence_score, mini_case_response, vetting_summary) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
    )
    .bind(&row.name)
    .bind(&row.headline)
    .bind(row.rate)
    .bind(&row.links)
    .bind(&row.domains)
    .bind(&row.icp_focus)
    .bind(&row.strength_mix)
    .bind(row.confidence_score)
    .bind(&row.mini_case_response)
    .bind(&row.vetting_summary)
    .execute(pool)
    .await?;
    let id = res.last_insert_rowid();
    debug!("inserted expert {} as id {}", row.name, id);
    Ok(id)
}

/// Overwrites every column of the row with `row.id`.
pub async fn update(pool: &SqlitePool, row: &ExpertRow) -> anyhow::Result<()> {
    let res = sqlx::query(
        "UPDATE experts SET name = ?1, headline = ?2, rate = ?3, links = ?4, domains = ?5, \
         icp_focus = ?6, strength_mix = ?7, confidence_score = ?8, mini_case_response = ?9, \
         vetting_summary = ?10 WHERE id = ?11",
    )
    .bind(&row.name)
    .bind(&row.headline)
    .bind(row.rate)
    .bind(&row.links)
    .bind(&row.domains)
    .bind(&row.icp_focus)
    .bind(&row.strength_mix)
    .bind(row.confidence_score)
    .bind(&row.mini_case_response)
    .bind(&row.vetting_summary)
    .bind(row.id)
    .execute(pool)
    .await?;
    if res.rows_affected() == 0 {
        anyhow::bail!("no expert with id {}", row.id);
    }
    Ok(())
}

pub async fn count(pool: &SqlitePool) -> anyhow::Result<i64> {
    let n: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM experts")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

/// Removes every expert. Administrative reset only.
pub async fn delete_all(pool: &SqlitePool) -> anyhow::Result<u64> {
    let res = sqlx::query("DELETE FROM experts").execute(pool).await?;
    Ok(res.rows_affected())
}
