pub mod error;
pub mod normalize;
pub mod primary;
pub mod secondary;
pub mod traits;

pub use error::AdapterError;
pub use primary::ProxyAdapter;
pub use secondary::KeyedAdapter;
pub use traits::QuoteSource;
