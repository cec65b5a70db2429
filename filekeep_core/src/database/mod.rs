pub mod connection;
pub mod migrations;

pub use connection::{get_database_pool, get_database_pool_with_config, DatabaseManager};
pub use migrations::run_migrations;
