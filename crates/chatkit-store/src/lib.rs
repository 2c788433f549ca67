pub mod dbs;
pub mod error;
pub mod models;
pub mod pagination;
pub mod trait_store;

pub use dbs::memory::MemoryStore;
pub use error::{Result, StoreError};
pub use models::StoredItem;
pub use pagination::paginate;
pub use trait_store::Store;
