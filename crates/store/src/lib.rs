pub mod error;
pub mod memory;
pub mod postgres;
pub mod store;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use postgres::PostgresStore;
pub use store::{Datastore, OrderStore, PaymentLedger, ProductCatalog, TrackingStore, UserDirectory};
