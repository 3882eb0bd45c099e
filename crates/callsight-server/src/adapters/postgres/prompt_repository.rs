//! PostgreSQL implementation of PromptRepository

use async_trait::async_trait;
use sqlx::PgPool;

use callsight::{DomainCategoryPair, DomainError, PromptRecord, PromptRepository};

use super::repository_error;

/// PostgreSQL implementation of PromptRepository
pub struct PgPromptRepository {
    pool: PgPool,
}

impl PgPromptRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct PromptRow {
    id: i64,
    domain: String,
    category: String,
    prompt_text: String,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<PromptRow> for PromptRecord {
    fn from(row: PromptRow) -> Self {
        Self {
            id: row.id,
            domain: row.domain,
            category: row.category,
            text: row.prompt_text,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PairRow {
    domain: String,
    category: String,
}

#[async_trait]
impl PromptRepository for PgPromptRepository {
    async fn find_by_ids(&self, ids: &[i64]) -> Result<Vec<PromptRecord>, DomainError> {
        let rows = sqlx::query_as::<_, PromptRow>(
            "SELECT * FROM prompts WHERE id = ANY($1) ORDER BY id",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(repository_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_pair(
        &self,
        pair: &DomainCategoryPair,
    ) -> Result<Option<PromptRecord>, DomainError> {
        // Duplicates are allowed; the oldest row wins
        let row = sqlx::query_as::<_, PromptRow>(
            r#"
            SELECT * FROM prompts
            WHERE domain = $1 AND category = $2
            ORDER BY id ASC
            LIMIT 1
            "#,
        )
        .bind(&pair.domain)
        .bind(&pair.category)
        .fetch_optional(&self.pool)
        .await
        .map_err(repository_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_known_pairs(&self) -> Result<Vec<DomainCategoryPair>, DomainError> {
        let rows = sqlx::query_as::<_, PairRow>(
            "SELECT DISTINCT domain, category FROM prompts ORDER BY domain, category",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(repository_error)?;

        Ok(rows
            .into_iter()
            .map(|row| DomainCategoryPair::new(row.domain, row.category))
            .collect())
    }

    async fn insert(&self, pair: &DomainCategoryPair, text: &str) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO prompts (domain, category, prompt_text)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(&pair.domain)
        .bind(&pair.category)
        .bind(text)
        .fetch_one(&self.pool)
        .await
        .map_err(repository_error)
    }

    async fn count(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM prompts")
            .fetch_one(&self.pool)
            .await
            .map_err(repository_error)
    }
}
