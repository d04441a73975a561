//! Transaction storage trait and the in-memory backend.

use async_trait::async_trait;
use parking_lot::RwLock;
use uuid::Uuid;

use super::transaction::{NewTransaction, Transaction};
use crate::error::Result;

/// Trait for transaction storage backends.
///
/// This trait abstracts over the in-memory and file-backed stores so the
/// HTTP handlers can work with either.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    /// All transactions, oldest first.
    async fn list(&self) -> Result<Vec<Transaction>>;

    async fn get(&self, id: Uuid) -> Result<Option<Transaction>>;

    async fn insert(&self, transaction: Transaction) -> Result<()>;

    /// Replace the editable fields of a transaction.
    ///
    /// Returns `None` if no transaction has the given id.
    async fn update(&self, id: Uuid, input: NewTransaction) -> Result<Option<Transaction>>;

    /// Returns `true` if a transaction was removed.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Transactions kept in process memory.
#[derive(Default)]
pub struct MemoryStore {
    transactions: RwLock<Vec<Transaction>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TransactionStore for MemoryStore {
    async fn list(&self) -> Result<Vec<Transaction>> {
        Ok(self.transactions.read().clone())
    }

    async fn get(&self, id: Uuid) -> Result<Option<Transaction>> {
        Ok(self.transactions.read().iter().find(|tx| tx.id == id).cloned())
    }

    async fn insert(&self, transaction: Transaction) -> Result<()> {
        self.transactions.write().push(transaction);
        Ok(())
    }

    async fn update(&self, id: Uuid, input: NewTransaction) -> Result<Option<Transaction>> {
        let mut transactions = self.transactions.write();
        Ok(transactions.iter_mut().find(|tx| tx.id == id).map(|tx| {
            tx.apply(input);
            tx.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut transactions = self.transactions.write();
        let before = transactions.len();
        transactions.retain(|tx| tx.id != id);
        Ok(transactions.len() != before)
    }
}
