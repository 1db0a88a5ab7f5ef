pub mod metrics;
pub mod movie;
pub mod store;

pub use metrics::{get_metrics, init_metrics, record_rating};
pub use movie::{demo_movies, MovieService};
pub use store::{DocumentStore, MemoryStore, MongoStore, StoreError};
