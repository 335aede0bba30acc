pub mod error;
pub mod health;
pub mod indices;
pub mod pool;
pub mod quotes;

pub use error::StoreError;
pub use pool::{database_url, init_pg_pool};
