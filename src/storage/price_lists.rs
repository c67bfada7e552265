use super::schema::Database;
use super::types::{DatabaseError, PriceList};

impl Database {
    // ========================================================================
    // Price List Queries
    // ========================================================================

    /// All price lists ordered by code
    pub async fn list_price_lists(&self) -> Result<Vec<PriceList>, DatabaseError> {
        let lists = sqlx::query_as::<_, PriceList>(
            "SELECT codlis, nomlis, porlis FROM _listas ORDER BY codlis",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(lists)
    }

    pub async fn get_price_list(&self, codlis: i16) -> Result<Option<PriceList>, DatabaseError> {
        let list = sqlx::query_as::<_, PriceList>(
            "SELECT codlis, nomlis, porlis FROM _listas WHERE codlis = ?",
        )
        .bind(codlis)
        .fetch_optional(&self.pool)
        .await?;
        Ok(list)
    }
}

#[cfg(test)]
mod tests {
    use crate::storage::{Database, PriceList};
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_seeded_price_lists() {
        let db = Database::open(":memory:").await.unwrap();
        let lists = db.list_price_lists().await.unwrap();

        let expected = vec![
            PriceList {
                codlis: 1,
                nomlis: Some("ENTIDADES PUBLICAS".to_string()),
                porlis: Some(45.0),
            },
            PriceList {
                codlis: 2,
                nomlis: Some("INSTITUCIONES PRIVADAS".to_string()),
                porlis: Some(40.0),
            },
            PriceList {
                codlis: 3,
                nomlis: Some("FARMACIAS".to_string()),
                porlis: Some(37.0),
            },
        ];
        assert_eq!(lists, expected);
    }

    #[tokio::test]
    async fn test_get_price_list() {
        let db = Database::open(":memory:").await.unwrap();

        let farmacias = db.get_price_list(3).await.unwrap().unwrap();
        assert_eq!(farmacias.nomlis.as_deref(), Some("FARMACIAS"));

        assert_eq!(db.get_price_list(9).await.unwrap(), None);
    }
}
