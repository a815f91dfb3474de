mod loader;
pub mod types;

pub use loader::{default_config_path, load_config};
pub use types::{ConfigError, ListConfig};
