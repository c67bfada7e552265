mod articles;
mod price_lists;
mod schema;
mod types;
mod upsert;

pub use schema::Database;
pub use types::{
    Article, ArticleChanges, ArticlePage, ArticleRecord, DatabaseError, PageRequest, PriceList,
    RecordOutcome, RecordStatus, UpsertReport,
};
