pub mod backend;
pub mod batcher;
pub mod consumer;
pub mod error;
pub mod producer;

pub use backend::RedisBus;
pub use batcher::MicroBatcher;
pub use consumer::{BusConsumer, BusHealth, BusMessage};
pub use error::BusError;
pub use producer::BusProducer;
