mod error;
pub use error::Error;
pub type Result<T> = std::result::Result<T, Error>;

pub mod kline;
pub mod pipeline;
pub mod reference;
pub mod stocks;
pub mod store;
