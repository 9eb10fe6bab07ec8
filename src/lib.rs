pub mod config;
pub mod descriptor;
pub mod error;
pub mod http;
pub mod logger;
pub mod runner;
pub mod template;

// Re-export commonly used types
pub use descriptor::{Backend, RequestDescriptor};
pub use error::{ReseedError, Result};
pub use runner::{Direction, RunOptions, RunOutcome, SeedReport, SeedRunner};
