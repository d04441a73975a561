//! Transaction records and their storage backends.

mod file_store;
mod store;
mod transaction;

pub use file_store::JsonFileStore;
pub use store::{MemoryStore, TransactionStore};
pub use transaction::{Balance, NewTransaction, Transaction, TransactionKind, MAX_AMOUNT};
