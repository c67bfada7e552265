//! Batch application of client-submitted article records.
//!
//! Two modes with different failure semantics:
//!
//! - **Row-by-row** ([`Database::upsert_row_by_row`]): each record is checked
//!   and written on its own. A bad record is reported and skipped; records
//!   already written stay written. Records without a code are errors.
//! - **Batch-atomic** ([`Database::upsert_batch_atomic`]): every record goes
//!   through `INSERT ... ON CONFLICT DO UPDATE` inside one transaction. Any
//!   failure rolls the whole call back. Records without a code are skipped
//!   silently.
use sqlx::{Sqlite, SqliteConnection, Transaction};

use super::schema::Database;
use super::types::{
    Article, ArticleRecord, DatabaseError, RecordOutcome, RecordStatus, UpsertReport,
};

const MISSING_CODE: &str = "Código de artículo requerido";

impl Database {
    // ========================================================================
    // Row-by-row
    // ========================================================================

    /// Apply each record independently: existence check, then UPDATE or INSERT.
    ///
    /// One pooled connection serves the whole call and is returned to the pool
    /// when this function exits, whatever the outcome.
    ///
    /// # Errors
    ///
    /// Only a failure to acquire the connection fails the call. Per-record
    /// storage errors are captured in the report.
    pub async fn upsert_row_by_row(
        &self,
        records: &[ArticleRecord],
    ) -> Result<UpsertReport, DatabaseError> {
        let mut conn = self.pool.acquire().await?;
        let mut report = UpsertReport {
            total: records.len(),
            ..UpsertReport::default()
        };

        for record in records {
            let Some(article) = record.to_article() else {
                report.record(RecordOutcome::failed(record.codart, MISSING_CODE));
                continue;
            };

            match upsert_one(&mut conn, &article).await {
                Ok(status) => report.record(RecordOutcome::ok(article.codart, status)),
                Err(e) => {
                    tracing::warn!(codart = article.codart, error = %e, "Failed to upsert article");
                    report.record(RecordOutcome::failed(Some(article.codart), e.to_string()));
                }
            }
        }

        tracing::info!(
            inserted = report.inserted,
            updated = report.updated,
            errors = report.errors,
            total = report.total,
            "Row-by-row upsert finished"
        );

        Ok(report)
    }

    // ========================================================================
    // Batch-atomic
    // ========================================================================

    /// Apply all records in a single transaction using native upsert.
    ///
    /// Returns the number of records received, skipped ones included.
    ///
    /// # Errors
    ///
    /// Any statement failure rolls back every write made by this call and is
    /// returned as one error.
    pub async fn upsert_batch_atomic(
        &self,
        records: &[ArticleRecord],
    ) -> Result<usize, DatabaseError> {
        let mut tx = self.pool.begin().await?;

        match apply_batch(&mut tx, records).await {
            Ok(skipped) => {
                tx.commit().await?;
                tracing::info!(total = records.len(), skipped, "Batch upsert committed");
                Ok(records.len())
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    tracing::error!(error = %rollback_err, "Batch upsert rollback failed");
                }
                tracing::error!(error = %e, total = records.len(), "Batch upsert rolled back");
                Err(DatabaseError::Other(e))
            }
        }
    }
}

/// Existence check followed by the matching write, on a single connection
async fn upsert_one(
    conn: &mut SqliteConnection,
    article: &Article,
) -> Result<RecordStatus, sqlx::Error> {
    let exists = sqlx::query("SELECT 1 FROM _articulos WHERE codart = ?")
        .bind(article.codart)
        .fetch_optional(&mut *conn)
        .await?
        .is_some();

    if exists {
        sqlx::query(
            r#"
            UPDATE _articulos
            SET npm = ?, stock = ?, pcosto = ?, pordif = ?
            WHERE codart = ?
        "#,
        )
        .bind(&article.npm)
        .bind(article.stock)
        .bind(article.pcosto)
        .bind(article.pordif)
        .bind(article.codart)
        .execute(&mut *conn)
        .await?;
        Ok(RecordStatus::Updated)
    } else {
        sqlx::query(
            r#"
            INSERT INTO _articulos (codart, npm, stock, pcosto, pordif)
            VALUES (?, ?, ?, ?, ?)
        "#,
        )
        .bind(article.codart)
        .bind(&article.npm)
        .bind(article.stock)
        .bind(article.pcosto)
        .bind(article.pordif)
        .execute(&mut *conn)
        .await?;
        Ok(RecordStatus::Inserted)
    }
}

/// Run one native upsert per coded record. Returns how many records were skipped.
async fn apply_batch(
    tx: &mut Transaction<'_, Sqlite>,
    records: &[ArticleRecord],
) -> Result<usize, sqlx::Error> {
    let mut skipped = 0;

    for record in records {
        let Some(article) = record.to_article() else {
            skipped += 1;
            continue;
        };

        sqlx::query(
            r#"
            INSERT INTO _articulos (codart, npm, stock, pcosto, pordif)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (codart) DO UPDATE SET
                npm = excluded.npm,
                stock = excluded.stock,
                pcosto = excluded.pcosto,
                pordif = excluded.pordif
        "#,
        )
        .bind(article.codart)
        .bind(&article.npm)
        .bind(article.stock)
        .bind(article.pcosto)
        .bind(article.pordif)
        .execute(&mut **tx)
        .await?;
    }

    Ok(skipped)
}
