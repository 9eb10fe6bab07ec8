pub mod executor;
pub mod reporter;
pub mod scanner;
pub mod types;

use std::path::Path;

pub use executor::{RunObserver, RunOptions, SeedRunner};
pub use reporter::SeedReporter;
pub use scanner::discover;
pub use types::{
    AbortRecord, Direction, FileReport, OperationOutcome, OperationReport, RunOutcome, SeedFile,
    SeedReport, SeedSummary,
};

use crate::Result;

/// 用一个新的 runner 执行一次 `dir` 中的 seed 文件
pub async fn run(direction: Direction, dir: &Path, options: RunOptions) -> Result<RunOutcome> {
    SeedRunner::new(options)?.run(direction, dir).await
}
