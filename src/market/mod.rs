//! Historical price data access.

pub mod loader;

pub use loader::{CsvPriceLoader, InMemoryPriceLoader, PriceLoader};
