use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::api::models::{Amount, WithdrawalId};
use crate::db::store::{StoreError, WithdrawalStore};

/// Reservations kept in the `withdrawal_reservations` table.
#[derive(Debug, Clone)]
pub struct PostgresWithdrawalStore {
    pool: PgPool,
}

impl PostgresWithdrawalStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        Ok(Self::new(pool))
    }

    pub async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl WithdrawalStore for PostgresWithdrawalStore {
    async fn put(&self, id: WithdrawalId, reserved_amount: Amount) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO withdrawal_reservations (id, reserved_amount)
            VALUES ($1, $2)
            "#,
        )
        .bind(id.0)
        .bind(reserved_amount.value())
        .execute(&self.pool)
        .await
        .map_err(|e| match e.as_database_error() {
            Some(db_err) if db_err.is_unique_violation() => StoreError::DuplicateId(id),
            _ => StoreError::Database(e),
        })?;

        Ok(())
    }

    async fn exists(&self, id: WithdrawalId) -> Result<bool, StoreError> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS(SELECT 1 FROM withdrawal_reservations WHERE id = $1)"#,
        )
        .bind(id.0)
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn get_reserved_amount(&self, id: WithdrawalId) -> Result<Option<Amount>, StoreError> {
        let amount = sqlx::query_scalar::<_, f64>(
            r#"SELECT reserved_amount FROM withdrawal_reservations WHERE id = $1"#,
        )
        .bind(id.0)
        .fetch_optional(&self.pool)
        .await?;

        Ok(amount.map(Amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store() -> PostgresWithdrawalStore {
        dotenv::dotenv().ok();
        let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
        let store = PostgresWithdrawalStore::connect(&database_url, 2)
            .await
            .expect("Failed to connect to test database");
        store.run_migrations().await.expect("Failed to run migrations");
        store
    }

    #[tokio::test]
    #[ignore = "requires DATABASE_URL pointing at a Postgres instance"]
    async fn test_put_then_read() {
        let store = test_store().await;
        let id = crate::utils::id::generate_withdrawal_id();

        assert!(!store.exists(id).await.unwrap());
        store.put(id, Amount(500.0)).await.unwrap();
        assert!(store.exists(id).await.unwrap());
        assert_eq!(
            store.get_reserved_amount(id).await.unwrap(),
            Some(Amount(500.0))
        );

        assert!(matches!(
            store.put(id, Amount(1.0)).await,
            Err(StoreError::DuplicateId(_))
        ));
    }
}
