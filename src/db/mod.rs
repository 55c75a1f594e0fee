mod columns;
pub mod connection;
pub mod notifications;
pub mod price_history;
pub mod products;
pub mod stats;
pub mod store;

pub use connection::{init_db, Database};
pub use stats::Statistics;
pub use store::{CheckWrite, PriceStore};
