use async_trait::async_trait;
use thiserror::Error;

use crate::api::models::{Amount, WithdrawalId};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Corrupt ledger: {0}")]
    Corrupt(String),

    #[error("Withdrawal id already reserved: {0}")]
    DuplicateId(WithdrawalId),
}

/// Persistence for reservations: a write-once mapping from withdrawal id to
/// the amount reserved under it.
///
/// Implementations must serialize concurrent `put` calls, and a `put` that
/// returned `Ok` must be visible to every subsequent read.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WithdrawalStore: Send + Sync {
    /// Records a new reservation. Fails with [`StoreError::DuplicateId`]
    /// rather than replacing an existing amount.
    async fn put(&self, id: WithdrawalId, reserved_amount: Amount) -> Result<(), StoreError>;

    async fn exists(&self, id: WithdrawalId) -> Result<bool, StoreError>;

    async fn get_reserved_amount(&self, id: WithdrawalId) -> Result<Option<Amount>, StoreError>;
}
