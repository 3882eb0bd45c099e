//! PostgreSQL implementation of CallRepository
//!
//! `general` holds one row per call; `domain_specific` and `tonal_analysis`
//! reference it by `call_id`. Every insert is an independent statement.

use async_trait::async_trait;
use sqlx::PgPool;

use callsight::{
    CallMetadata, CallRecord, CallRepository, CallStats, DomainError, DomainSpecificRecord,
    NewCallRecord, NewTonalAnalysis, TonalAnalysis,
};

use super::repository_error;

/// PostgreSQL implementation of CallRepository
pub struct PgCallRepository {
    pool: PgPool,
}

impl PgCallRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Internal row type for sqlx mapping
#[derive(sqlx::FromRow)]
struct GeneralRow {
    id: i64,
    file_name: String,
    domain: String,
    category: String,
    agent_name: String,
    customer_name: String,
    call_direction: String,
    interaction_type: String,
    sentiment: String,
    intent: String,
    tokens_input: i64,
    tokens_output: i64,
    total_tokens: i64,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<GeneralRow> for CallRecord {
    fn from(row: GeneralRow) -> Self {
        Self {
            id: row.id,
            file_name: row.file_name,
            domain: row.domain,
            category: row.category,
            metadata: CallMetadata {
                agent_name: row.agent_name,
                customer_name: row.customer_name,
                call_direction: row.call_direction,
                interaction_type: row.interaction_type,
                sentiment: row.sentiment,
                intent: row.intent,
            },
            tokens_input: row.tokens_input,
            tokens_output: row.tokens_output,
            total_tokens: row.total_tokens,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct DomainSpecificRow {
    id: i64,
    call_id: i64,
    data: serde_json::Value,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<DomainSpecificRow> for DomainSpecificRecord {
    fn from(row: DomainSpecificRow) -> Self {
        Self {
            id: row.id,
            call_id: row.call_id,
            data: row.data,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct TonalAnalysisRow {
    id: i64,
    call_id: Option<i64>,
    file_name: String,
    data: serde_json::Value,
    tokens_input: i64,
    tokens_output: i64,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<TonalAnalysisRow> for TonalAnalysis {
    fn from(row: TonalAnalysisRow) -> Self {
        Self {
            id: row.id,
            call_id: row.call_id,
            file_name: row.file_name,
            data: row.data,
            tokens_input: row.tokens_input,
            tokens_output: row.tokens_output,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl CallRepository for PgCallRepository {
    async fn insert_call(&self, record: &NewCallRecord) -> Result<i64, DomainError> {
        let meta = &record.metadata;
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO general (
                file_name, domain, category,
                agent_name, customer_name, call_direction, interaction_type, sentiment, intent,
                tokens_input, tokens_output, total_tokens
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING id
            "#,
        )
        .bind(&record.file_name)
        .bind(&record.domain)
        .bind(&record.category)
        .bind(&meta.agent_name)
        .bind(&meta.customer_name)
        .bind(&meta.call_direction)
        .bind(&meta.interaction_type)
        .bind(&meta.sentiment)
        .bind(&meta.intent)
        .bind(record.tokens_input)
        .bind(record.tokens_output)
        .bind(record.total_tokens)
        .fetch_one(&self.pool)
        .await
        .map_err(repository_error)
    }

    async fn insert_domain_specific(
        &self,
        call_id: i64,
        payload: &serde_json::Value,
    ) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(
            "INSERT INTO domain_specific (call_id, data) VALUES ($1, $2) RETURNING id",
        )
        .bind(call_id)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(repository_error)
    }

    async fn insert_tonal_analysis(&self, analysis: &NewTonalAnalysis) -> Result<i64, DomainError> {
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO tonal_analysis (call_id, file_name, data, tokens_input, tokens_output)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(analysis.call_id)
        .bind(&analysis.file_name)
        .bind(&analysis.data)
        .bind(analysis.tokens_input)
        .bind(analysis.tokens_output)
        .fetch_one(&self.pool)
        .await
        .map_err(repository_error)
    }

    async fn find_call(&self, id: i64) -> Result<Option<CallRecord>, DomainError> {
        let row = sqlx::query_as::<_, GeneralRow>("SELECT * FROM general WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(repository_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_domain_specific(
        &self,
        call_id: i64,
    ) -> Result<Option<DomainSpecificRecord>, DomainError> {
        let row = sqlx::query_as::<_, DomainSpecificRow>(
            "SELECT * FROM domain_specific WHERE call_id = $1 ORDER BY id ASC LIMIT 1",
        )
        .bind(call_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(repository_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_tonal_analysis(&self, call_id: i64) -> Result<Option<TonalAnalysis>, DomainError> {
        let row = sqlx::query_as::<_, TonalAnalysisRow>(
            "SELECT * FROM tonal_analysis WHERE call_id = $1 ORDER BY id ASC LIMIT 1",
        )
        .bind(call_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(repository_error)?;

        Ok(row.map(Into::into))
    }

    async fn stats(&self) -> Result<CallStats, DomainError> {
        let (total_calls, domain_specific_records) = sqlx::query_as::<_, (i64, i64)>(
            r#"
            SELECT
                (SELECT COUNT(*) FROM general),
                (SELECT COUNT(*) FROM domain_specific)
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(repository_error)?;

        Ok(CallStats {
            total_calls,
            domain_specific_records,
        })
    }
}
