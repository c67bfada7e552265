use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Storage errors surfaced to the API layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    /// Schema creation or seeding failed
    #[error("Database migration failed: {0}")]
    Migration(String),

    /// Insert collided with an existing primary key
    #[error("Duplicate key: {0}")]
    Duplicate(String),

    /// Generic database error (connectivity, constraint, query)
    #[error("Database error: {0}")]
    Other(#[from] sqlx::Error),
}

impl DatabaseError {
    /// Classify a sqlx error, pulling unique-key violations out of the generic bucket
    pub(crate) fn from_sqlx(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Database(db_err)
                if db_err.is_unique_violation()
                    || db_err.message().contains("UNIQUE constraint failed") =>
            {
                DatabaseError::Duplicate(db_err.message().to_string())
            }
            _ => DatabaseError::Other(err),
        }
    }
}

// ============================================================================
// Articles
// ============================================================================

/// A row of `_articulos`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Article {
    pub codart: i64,
    pub npm: Option<String>,
    pub stock: Option<i64>,
    pub pcosto: Option<f64>,
    pub pordif: Option<f64>,
}

/// An article as submitted by a client, before the code has been checked.
///
/// Used by create and by both upsert modes. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleRecord {
    pub codart: Option<i64>,
    pub npm: Option<String>,
    #[serde(deserialize_with = "rounded_quantity")]
    pub stock: Option<i64>,
    pub pcosto: Option<f64>,
    pub pordif: Option<f64>,
}

impl ArticleRecord {
    /// The article code, treating `null`, absent and `0` alike as missing
    pub fn code(&self) -> Option<i64> {
        self.codart.filter(|code| *code != 0)
    }

    /// Promote to a full article if the code is present
    pub fn to_article(&self) -> Option<Article> {
        self.code().map(|codart| Article {
            codart,
            npm: self.npm.clone(),
            stock: self.stock,
            pcosto: self.pcosto,
            pordif: self.pordif,
        })
    }
}

/// Non-key fields for a full update. Absent fields are written as NULL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArticleChanges {
    pub npm: Option<String>,
    #[serde(deserialize_with = "rounded_quantity")]
    pub stock: Option<i64>,
    pub pcosto: Option<f64>,
    pub pordif: Option<f64>,
}

/// Accept any JSON number for a whole-unit quantity, rounding half away from zero.
///
/// Out-of-range results saturate and are then rejected by the column CHECK.
fn rounded_quantity<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<f64>::deserialize(deserializer)?.map(|value| value.round() as i64))
}

// ============================================================================
// Price Lists
// ============================================================================

/// A row of `_listas`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct PriceList {
    pub codlis: i16,
    pub nomlis: Option<String>,
    pub porlis: Option<f64>,
}

// ============================================================================
// Pagination
// ============================================================================

/// A validated page request: `page >= 1`, `limit >= 1`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    limit: i64,
}

impl PageRequest {
    pub const DEFAULT_PAGE: i64 = 1;
    pub const DEFAULT_LIMIT: i64 = 10;

    /// Returns `None` when either value is below 1
    pub fn new(page: i64, limit: i64) -> Option<Self> {
        (page >= 1 && limit >= 1).then_some(Self { page, limit })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn limit(&self) -> i64 {
        self.limit
    }

    /// Rows to skip: `(page - 1) * limit`
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// `ceil(total / limit)`, zero for an empty table
    pub fn total_pages(&self, total: i64) -> i64 {
        if total <= 0 {
            return 0;
        }
        total / self.limit + i64::from(total % self.limit != 0)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: Self::DEFAULT_PAGE,
            limit: Self::DEFAULT_LIMIT,
        }
    }
}

/// One page of articles plus the counters needed to render pagination
#[derive(Debug, Clone, PartialEq)]
pub struct ArticlePage {
    pub articles: Vec<Article>,
    pub total: i64,
    pub page: i64,
    pub total_pages: i64,
}

// ============================================================================
// Upsert Results
// ============================================================================

/// Outcome of a single record in row-by-row mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordStatus {
    Inserted,
    Updated,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecordOutcome {
    pub codart: Option<i64>,
    pub status: RecordStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RecordOutcome {
    pub(crate) fn ok(codart: i64, status: RecordStatus) -> Self {
        Self {
            codart: Some(codart),
            status,
            error: None,
        }
    }

    pub(crate) fn failed(codart: Option<i64>, error: impl Into<String>) -> Self {
        Self {
            codart,
            status: RecordStatus::Error,
            error: Some(error.into()),
        }
    }
}

/// Aggregate result of a row-by-row upsert. `detalles` follows input order.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpsertReport {
    pub inserted: usize,
    pub updated: usize,
    pub errors: usize,
    pub total: usize,
    pub detalles: Vec<RecordOutcome>,
}

impl UpsertReport {
    pub(crate) fn record(&mut self, outcome: RecordOutcome) {
        match outcome.status {
            RecordStatus::Inserted => self.inserted += 1,
            RecordStatus::Updated => self.updated += 1,
            RecordStatus::Error => self.errors += 1,
        }
        self.detalles.push(outcome);
    }
}
