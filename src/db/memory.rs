use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::api::models::{Amount, WithdrawalId};
use crate::db::store::{StoreError, WithdrawalStore};

/// Volatile store used by tests and by the `memory` backend.
#[derive(Debug, Default)]
pub struct InMemoryWithdrawalStore {
    reservations: RwLock<HashMap<WithdrawalId, Amount>>,
}

impl InMemoryWithdrawalStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.reservations.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.reservations.read().await.is_empty()
    }
}

#[async_trait]
impl WithdrawalStore for InMemoryWithdrawalStore {
    async fn put(&self, id: WithdrawalId, reserved_amount: Amount) -> Result<(), StoreError> {
        let mut reservations = self.reservations.write().await;
        if reservations.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        reservations.insert(id, reserved_amount);
        Ok(())
    }

    async fn exists(&self, id: WithdrawalId) -> Result<bool, StoreError> {
        Ok(self.reservations.read().await.contains_key(&id))
    }

    async fn get_reserved_amount(&self, id: WithdrawalId) -> Result<Option<Amount>, StoreError> {
        Ok(self.reservations.read().await.get(&id).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_put_then_read() {
        let store = InMemoryWithdrawalStore::new();
        let id = WithdrawalId(1_700_000_000_000_001);

        assert!(!store.exists(id).await.unwrap());
        assert_eq!(store.get_reserved_amount(id).await.unwrap(), None);

        store.put(id, Amount(500.0)).await.unwrap();

        assert!(store.exists(id).await.unwrap());
        assert_eq!(
            store.get_reserved_amount(id).await.unwrap(),
            Some(Amount(500.0))
        );
    }

    #[tokio::test]
    async fn test_put_never_overwrites() {
        let store = InMemoryWithdrawalStore::new();
        let id = WithdrawalId(42);
        store.put(id, Amount(500.0)).await.unwrap();

        let err = store.put(id, Amount(1.0)).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(dup) if dup == id));
        assert_eq!(
            store.get_reserved_amount(id).await.unwrap(),
            Some(Amount(500.0))
        );
    }

    #[tokio::test]
    async fn test_concurrent_puts_are_not_lost() {
        let store = Arc::new(InMemoryWithdrawalStore::new());
        let handles: Vec<_> = (0..64)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.put(WithdrawalId(i), Amount(i as f64 + 1.0)).await })
            })
            .collect();

        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.len().await, 64);
        for i in 0..64 {
            assert_eq!(
                store.get_reserved_amount(WithdrawalId(i)).await.unwrap(),
                Some(Amount(i as f64 + 1.0))
            );
        }
    }
}
