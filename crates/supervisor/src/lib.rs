pub mod config;
pub mod error;
pub mod liveness;
pub mod monitor;
pub mod pidfile;
pub mod process;
pub mod status;
pub mod supervisor;

pub use config::SupervisorConfig;
pub use error::SupervisorError;
pub use supervisor::Supervisor;
