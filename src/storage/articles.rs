use super::schema::Database;
use super::types::{Article, ArticleChanges, ArticlePage, DatabaseError, PageRequest};

impl Database {
    // ========================================================================
    // Article Queries
    // ========================================================================

    /// Fetch one page of articles ordered by code, with the table's total row count
    pub async fn list_articles(&self, page: PageRequest) -> Result<ArticlePage, DatabaseError> {
        let articles = sqlx::query_as::<_, Article>(
            r#"
            SELECT codart, npm, stock, pcosto, pordif
            FROM _articulos
            ORDER BY codart
            LIMIT ? OFFSET ?
        "#,
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        let total: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _articulos")
            .fetch_one(&self.pool)
            .await?;

        Ok(ArticlePage {
            articles,
            total: total.0,
            page: page.page(),
            total_pages: page.total_pages(total.0),
        })
    }

    pub async fn get_article(&self, codart: i64) -> Result<Option<Article>, DatabaseError> {
        let article = sqlx::query_as::<_, Article>(
            "SELECT codart, npm, stock, pcosto, pordif FROM _articulos WHERE codart = ?",
        )
        .bind(codart)
        .fetch_optional(&self.pool)
        .await?;

        Ok(article)
    }

    /// Count every article row
    pub async fn count_articles(&self) -> Result<i64, DatabaseError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM _articulos")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    // ========================================================================
    // Article Writes
    // ========================================================================

    /// Insert a new article and return the stored row.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Duplicate` when the code is already taken.
    pub async fn insert_article(&self, article: &Article) -> Result<Article, DatabaseError> {
        sqlx::query_as::<_, Article>(
            r#"
            INSERT INTO _articulos (codart, npm, stock, pcosto, pordif)
            VALUES (?, ?, ?, ?, ?)
            RETURNING codart, npm, stock, pcosto, pordif
        "#,
        )
        .bind(article.codart)
        .bind(&article.npm)
        .bind(article.stock)
        .bind(article.pcosto)
        .bind(article.pordif)
        .fetch_one(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)
    }

    /// Overwrite every non-key field. Returns `None` if the code does not exist.
    pub async fn update_article(
        &self,
        codart: i64,
        changes: &ArticleChanges,
    ) -> Result<Option<Article>, DatabaseError> {
        let article = sqlx::query_as::<_, Article>(
            r#"
            UPDATE _articulos
            SET npm = ?, stock = ?, pcosto = ?, pordif = ?
            WHERE codart = ?
            RETURNING codart, npm, stock, pcosto, pordif
        "#,
        )
        .bind(&changes.npm)
        .bind(changes.stock)
        .bind(changes.pcosto)
        .bind(changes.pordif)
        .bind(codart)
        .fetch_optional(&self.pool)
        .await?;

        Ok(article)
    }

    /// Delete an article. Returns whether a row was removed.
    pub async fn delete_article(&self, codart: i64) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM _articulos WHERE codart = ?")
            .bind(codart)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{Article, ArticleChanges, Database, DatabaseError, PageRequest};
    use pretty_assertions::assert_eq;

    async fn test_db() -> Database {
        Database::open(":memory:").await.unwrap()
    }

    fn test_article(codart: i64) -> Article {
        Article {
            codart,
            npm: Some(format!("ARTICULO {codart}")),
            stock: Some(10),
            pcosto: Some(1589.57),
            pordif: Some(0.0),
        }
    }

    #[tokio::test]
    async fn test_insert_then_get_returns_same_record() {
        let db = test_db().await;
        let article = test_article(1);

        let stored = db.insert_article(&article).await.unwrap();
        assert_eq!(stored, article);

        let fetched = db.get_article(1).await.unwrap();
        assert_eq!(fetched, Some(article));
    }

    #[tokio::test]
    async fn test_insert_duplicate_is_classified() {
        let db = test_db().await;
        db.insert_article(&test_article(5)).await.unwrap();

        let err = db.insert_article(&test_article(5)).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Duplicate(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn test_insert_out_of_range_is_not_duplicate() {
        let db = test_db().await;
        let mut article = test_article(7);
        article.stock = Some(-1);

        let err = db.insert_article(&article).await.unwrap_err();
        assert!(matches!(err, DatabaseError::Other(_)), "got {err:?}");
        assert_eq!(db.count_articles().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_get_missing_article() {
        let db = test_db().await;
        assert_eq!(db.get_article(404).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_overwrites_all_fields() {
        let db = test_db().await;
        db.insert_article(&test_article(3)).await.unwrap();

        let changes = ArticleChanges {
            npm: Some("RENOMBRADO".to_string()),
            stock: None,
            pcosto: Some(2.5),
            pordif: None,
        };
        let updated = db.update_article(3, &changes).await.unwrap().unwrap();
        assert_eq!(
            updated,
            Article {
                codart: 3,
                npm: Some("RENOMBRADO".to_string()),
                stock: None,
                pcosto: Some(2.5),
                pordif: None,
            }
        );
    }

    #[tokio::test]
    async fn test_update_missing_article() {
        let db = test_db().await;
        let result = db
            .update_article(99, &ArticleChanges::default())
            .await
            .unwrap();
        assert_eq!(result, None);
        assert_eq!(db.count_articles().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_article() {
        let db = test_db().await;
        db.insert_article(&test_article(8)).await.unwrap();

        assert!(db.delete_article(8).await.unwrap());
        assert!(!db.delete_article(8).await.unwrap());
        assert_eq!(db.get_article(8).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_list_articles_paginates() {
        let db = test_db().await;
        for codart in 1..=25 {
            db.insert_article(&test_article(codart)).await.unwrap();
        }

        let page = db
            .list_articles(PageRequest::new(2, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(page.articles.len(), 10);
        assert_eq!(page.articles[0].codart, 11);
        assert_eq!(page.total, 25);
        assert_eq!(page.page, 2);
        assert_eq!(page.total_pages, 3);

        let last = db
            .list_articles(PageRequest::new(3, 10).unwrap())
            .await
            .unwrap();
        assert_eq!(last.articles.len(), 5);
    }

    #[tokio::test]
    async fn test_list_articles_empty_table() {
        let db = test_db().await;
        let page = db.list_articles(PageRequest::default()).await.unwrap();
        assert!(page.articles.is_empty());
        assert_eq!(page.total, 0);
        assert_eq!(page.total_pages, 0);
    }
}
