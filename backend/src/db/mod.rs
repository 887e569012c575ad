pub mod connection;
pub mod migrations;
pub mod profiles;
pub mod connections;
pub mod store;
pub mod memory;

pub use connection::{get_db_pool, DatabaseConfig};
pub use memory::MemoryStore;
pub use store::{MatchStore, PgStore};
