pub mod loader;
pub mod types;

pub use loader::{ConfigLoader, resolve_env_vars};
pub use types::{SeedConfig, SeedSettings};
