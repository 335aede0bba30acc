pub mod worker;

pub use worker::{BadMessageCounters, Worker};
