//! Repository for account relationship data
//!
//! Reads follower lists for graph construction and writes
//! PageRank scores back in batched statements.

use crate::db::models::{RelationshipRow, ScoreUpdate};
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement, Value};
use tracing::debug;

/// Accounts that have at least one recorded follower
const RELATIONSHIPS_SQL: &str = r#"
    SELECT username, followed_by
    FROM instagram_accounts
    WHERE followed_by IS NOT NULL
      AND array_length(followed_by, 1) > 0
"#;

/// Repository over the `instagram_accounts` table
#[derive(Clone)]
pub struct AccountRepository {
    pool: DbPool,
}

impl AccountRepository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get the read connection
    fn read_conn(&self) -> &DatabaseConnection {
        self.pool.read()
    }

    /// Get the write connection
    fn write_conn(&self) -> &DatabaseConnection {
        self.pool.write()
    }

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    /// Load every account with a non-empty follower list.
    ///
    /// Rows without a readable username are dropped; an unreadable
    /// `followed_by` column yields an empty follower list.
    pub async fn fetch_relationship_rows(&self) -> Result<Vec<RelationshipRow>> {
        let rows = self
            .read_conn()
            .query_all(Statement::from_string(DbBackend::Postgres, RELATIONSHIPS_SQL))
            .await?;

        let mut records = Vec::with_capacity(rows.len());
        let mut skipped = 0usize;

        for row in rows {
            let username = match row.try_get::<String>("", "username") {
                Ok(username) => username,
                Err(e) => {
                    skipped += 1;
                    debug!(error = %e, "Skipping account row without username");
                    continue;
                }
            };

            let followed_by = row
                .try_get::<Option<Vec<String>>>("", "followed_by")
                .ok()
                .flatten();

            records.push(RelationshipRow::from_columns(username, followed_by));
        }

        if skipped > 0 {
            debug!(skipped, "Malformed account rows ignored");
        }

        Ok(records)
    }

    /// Write one batch of scores, returning the number of rows updated
    pub async fn write_pagerank_scores(&self, batch: &[ScoreUpdate]) -> Result<u64> {
        if batch.is_empty() {
            return Ok(0);
        }

        let result = self
            .write_conn()
            .execute(score_update_statement(batch))
            .await
            .map_err(|e| AppError::Persistence {
                message: format!("batch of {} accounts: {}", batch.len(), e),
            })?;

        Ok(result.rows_affected())
    }
}

/// Build the `UPDATE ... FROM (VALUES ...)` statement for one batch.
///
/// Each account contributes two positional parameters; the score is
/// rounded to two decimals by the database as well.
pub fn score_update_statement(batch: &[ScoreUpdate]) -> Statement {
    let mut tuples = Vec::with_capacity(batch.len());
    let mut values: Vec<Value> = Vec::with_capacity(batch.len() * 2);

    for (idx, update) in batch.iter().enumerate() {
        tuples.push(format!(
            "(${}::text, ROUND(${}::numeric, 2))",
            idx * 2 + 1,
            idx * 2 + 2
        ));
        values.push(update.account.clone().into());
        values.push(update.score.into());
    }

    let sql = format!(
        r#"
        WITH data(username, score) AS (VALUES {})
        UPDATE instagram_accounts ia
        SET pagerank_score = data.score
        FROM data
        WHERE ia.username = data.username
        "#,
        tuples.join(", ")
    );

    Statement::from_sql_and_values(DbBackend::Postgres, sql, values)
}
