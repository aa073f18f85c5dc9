// storage/mod.rs
// Database operations module

pub mod models;
pub mod pool;
pub mod queries;
pub mod schema;

// Re-export commonly used items
pub use models::{Channel, LinkRecord};
pub use pool::init_db_pool;
pub use queries::{fetch_link, insert_candidate, query_links_for_check, record_probe_history};
pub use schema::create_tables;
