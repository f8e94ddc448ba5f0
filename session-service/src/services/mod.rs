pub mod aggregator;
pub mod fetcher;
pub mod memory;
pub mod metrics;
pub mod mongo;
pub mod postgres;
pub mod store;

pub use aggregator::ResponseAggregator;
pub use fetcher::SessionFetcher;
pub use memory::InMemorySessionStore;
pub use self::metrics::{get_metrics, init_metrics};
pub use mongo::MongoSessionStore;
pub use postgres::PostgresSessionStore;
pub use store::SessionStore;
