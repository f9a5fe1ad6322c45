pub mod client;
pub mod file;
pub mod memory;
pub mod postgres;
pub mod store;

pub use client::{connect_store, SharedStore};
pub use file::FileWithdrawalStore;
pub use memory::InMemoryWithdrawalStore;
pub use postgres::PostgresWithdrawalStore;
pub use store::{StoreError, WithdrawalStore};
