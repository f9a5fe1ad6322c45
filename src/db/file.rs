use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::debug;

use crate::api::models::{Amount, WithdrawalId};
use crate::db::store::{StoreError, WithdrawalStore};

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct LedgerEntry {
    #[serde(rename = "reservedAmount")]
    reserved_amount: Amount,
}

type Ledger = BTreeMap<WithdrawalId, LedgerEntry>;

/// Flat JSON file ledger of the form `{"<id>": {"reservedAmount": <n>}}`.
///
/// Writers hold `write_lock` across the whole read-modify-write cycle, and
/// the new ledger replaces the old one by rename so readers never observe a
/// partially written file.
#[derive(Debug)]
pub struct FileWithdrawalStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FileWithdrawalStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Creates the parent directory of the ledger if needed.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let store = Self::new(path);
        if let Some(parent) = store.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        Ok(store)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_ledger(&self) -> Result<Ledger, StoreError> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Ledger::new()),
            Err(e) => return Err(e.into()),
        };

        if data.iter().all(u8::is_ascii_whitespace) {
            return Ok(Ledger::new());
        }

        serde_json::from_slice(&data)
            .map_err(|e| StoreError::Corrupt(format!("{}: {}", self.path.display(), e)))
    }

    async fn write_ledger(&self, ledger: &Ledger) -> Result<(), StoreError> {
        let data = serde_json::to_vec(ledger)?;

        let mut tmp_name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_else(|| OsString::from("withdrawals.json"));
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);

        let mut file = fs::File::create(&tmp_path).await?;
        file.write_all(&data).await?;
        file.sync_all().await?;
        drop(file);

        fs::rename(&tmp_path, &self.path).await?;
        Ok(())
    }
}

#[async_trait]
impl WithdrawalStore for FileWithdrawalStore {
    async fn put(&self, id: WithdrawalId, reserved_amount: Amount) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;

        let mut ledger = self.read_ledger().await?;
        if ledger.contains_key(&id) {
            return Err(StoreError::DuplicateId(id));
        }
        ledger.insert(id, LedgerEntry { reserved_amount });
        self.write_ledger(&ledger).await?;

        debug!(%id, entries = ledger.len(), "ledger written");
        Ok(())
    }

    async fn exists(&self, id: WithdrawalId) -> Result<bool, StoreError> {
        Ok(self.read_ledger().await?.contains_key(&id))
    }

    async fn get_reserved_amount(&self, id: WithdrawalId) -> Result<Option<Amount>, StoreError> {
        Ok(self
            .read_ledger()
            .await?
            .get(&id)
            .map(|entry| entry.reserved_amount))
    }
}
