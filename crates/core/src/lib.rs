pub mod config;
pub mod error;
pub mod heartbeat;
pub mod types;
pub mod validation;

pub use config::Config;
pub use error::{ErrorKind, QuotronError};
pub use types::*;
