// src/store/postgres.rs

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, types::Json};

use crate::{
    models::{
        response::{ResponseId, ResponseRecord},
        submission::Answers,
    },
    store::{ResponseStore, RetryPolicy, StoreError},
};

/// Helper struct for reading rows of `survey_responses`.
#[derive(sqlx::FromRow)]
struct ResponseRow {
    id: i64,
    respondent_name: String,
    submitted_at: DateTime<Utc>,
    answers: Json<Answers>,
}

impl From<ResponseRow> for ResponseRecord {
    fn from(row: ResponseRow) -> Self {
        Self {
            id: row.id,
            respondent_name: row.respondent_name,
            submitted_at: row.submitted_at,
            answers: row.answers.0,
        }
    }
}

/// PostgreSQL-backed store. Schema lives in `migrations/`.
pub struct PgResponseStore {
    pool: PgPool,
    retry: RetryPolicy,
}

impl PgResponseStore {
    pub fn new(pool: PgPool, retry: RetryPolicy) -> Self {
        Self { pool, retry }
    }
}

/// True for failures that mean the database could not be reached at all.
fn is_connectivity_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    )
}

fn write_error(err: sqlx::Error) -> StoreError {
    if is_connectivity_error(&err) {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::WriteFailed(err.to_string())
    }
}

fn read_error(err: sqlx::Error) -> StoreError {
    if is_connectivity_error(&err) {
        StoreError::Unavailable(err.to_string())
    } else {
        StoreError::ReadFailed(err.to_string())
    }
}

#[async_trait]
impl ResponseStore for PgResponseStore {
    fn backend_tag(&self) -> &'static str {
        "postgres"
    }

    /// Not retried: a lost acknowledgement could otherwise insert twice.
    async fn append(
        &self,
        respondent_name: &str,
        answers: &Answers,
    ) -> Result<ResponseId, StoreError> {
        let (id,): (i64,) = sqlx::query_as(
            r#"
            INSERT INTO survey_responses (respondent_name, answers)
            VALUES ($1, $2)
            RETURNING id
            "#,
        )
        .bind(respondent_name)
        .bind(Json(answers))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to insert survey response: {:?}", e);
            write_error(e)
        })?;

        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<ResponseRecord>, StoreError> {
        let pool = &self.pool;
        self.retry
            .run("list_all", || async move {
                sqlx::query_as::<_, ResponseRow>(
                    r#"
                    SELECT id, respondent_name, submitted_at, answers
                    FROM survey_responses
                    ORDER BY submitted_at DESC, id DESC
                    "#,
                )
                .fetch_all(pool)
                .await
                .map(|rows| rows.into_iter().map(ResponseRecord::from).collect())
                .map_err(read_error)
            })
            .await
    }

    /// Returns only once PostgreSQL has acknowledged the delete.
    async fn wipe_all(&self) -> Result<u64, StoreError> {
        let pool = &self.pool;
        self.retry
            .run("wipe_all", || async move {
                sqlx::query("DELETE FROM survey_responses")
                    .execute(pool)
                    .await
                    .map(|result| result.rows_affected())
                    .map_err(|e| {
                        tracing::error!("Failed to wipe survey responses: {:?}", e);
                        write_error(e)
                    })
            })
            .await
    }
}
