//! Flat-file JSON transaction storage.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::store::TransactionStore;
use super::transaction::{NewTransaction, Transaction};
use crate::error::Result;

/// Transactions stored as one JSON array in a file.
///
/// Each operation reads the whole file; writes replace it atomically via a
/// sibling temporary file. The mutex serializes read-modify-write cycles
/// within this process.
pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Vec<Transaction>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(Vec::new()),
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, transactions: &[Transaction]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(transactions)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, bytes).await?;
        if let Err(e) = tokio::fs::rename(&tmp, &self.path).await {
            if let Err(cleanup) = tokio::fs::remove_file(&tmp).await {
                warn!(
                    path = %tmp.display(),
                    error = %cleanup,
                    "Failed to remove temporary transaction file"
                );
            }
            return Err(e.into());
        }

        debug!(
            path = %self.path.display(),
            count = transactions.len(),
            "Transactions written"
        );
        Ok(())
    }
}

#[async_trait]
impl TransactionStore for JsonFileStore {
    async fn list(&self) -> Result<Vec<Transaction>> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn get(&self, id: Uuid) -> Result<Option<Transaction>> {
        let _guard = self.lock.lock().await;
        Ok(self.load().await?.into_iter().find(|tx| tx.id == id))
    }

    async fn insert(&self, transaction: Transaction) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut transactions = self.load().await?;
        transactions.push(transaction);
        self.save(&transactions).await
    }

    async fn update(&self, id: Uuid, input: NewTransaction) -> Result<Option<Transaction>> {
        let _guard = self.lock.lock().await;
        let mut transactions = self.load().await?;

        let Some(tx) = transactions.iter_mut().find(|tx| tx.id == id) else {
            return Ok(None);
        };
        tx.apply(input);
        let updated = tx.clone();

        self.save(&transactions).await?;
        Ok(Some(updated))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut transactions = self.load().await?;

        let before = transactions.len();
        transactions.retain(|tx| tx.id != id);
        if transactions.len() == before {
            return Ok(false);
        }

        self.save(&transactions).await?;
        Ok(true)
    }
}
