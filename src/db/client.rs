use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use crate::config::{StorageBackend, StorageConfig};
use crate::db::file::FileWithdrawalStore;
use crate::db::memory::InMemoryWithdrawalStore;
use crate::db::postgres::PostgresWithdrawalStore;
use crate::db::store::WithdrawalStore;

pub type SharedStore = Arc<dyn WithdrawalStore>;

/// Builds the configured store, running migrations for Postgres.
pub async fn connect_store(config: &StorageConfig) -> Result<SharedStore> {
    let store: SharedStore = match config.backend {
        StorageBackend::Memory => {
            info!("Using in-memory withdrawal store");
            Arc::new(InMemoryWithdrawalStore::new())
        }
        StorageBackend::File => {
            info!(path = %config.file_path.display(), "Using file withdrawal store");
            let store = FileWithdrawalStore::open(&config.file_path)
                .await
                .with_context(|| {
                    format!("failed to prepare ledger at {}", config.file_path.display())
                })?;
            Arc::new(store)
        }
        StorageBackend::Postgres => {
            let database_url = config.get_db_url()?;
            let store = PostgresWithdrawalStore::connect(&database_url, config.max_connections)
                .await
                .context("failed to connect to database")?;

            info!("Running database migrations");
            store
                .run_migrations()
                .await
                .context("failed to run migrations")?;
            Arc::new(store)
        }
    };

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::{Amount, WithdrawalId};

    #[tokio::test]
    async fn test_connect_memory_store() {
        let config = StorageConfig {
            backend: StorageBackend::Memory,
            file_path: "unused.json".into(),
            max_connections: 1,
        };
        let store = connect_store(&config).await.unwrap();
        store.put(WithdrawalId(1), Amount(2.0)).await.unwrap();
        assert!(store.exists(WithdrawalId(1)).await.unwrap());
    }

    #[tokio::test]
    async fn test_connect_file_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("nested").join("withdrawals.json");
        let config = StorageConfig {
            backend: StorageBackend::File,
            file_path: path.clone(),
            max_connections: 1,
        };
        let store = connect_store(&config).await.unwrap();
        store.put(WithdrawalId(5), Amount(10.0)).await.unwrap();
        assert!(path.exists());
    }
}
