pub mod config;
pub mod logging;
pub mod validation;

pub use config::{Config, SupabaseConfig};
pub use logging::init_logging;
pub use validation::ProfileRules;
