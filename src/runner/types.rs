use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};
use uuid::Uuid;

use crate::descriptor::Backend;
use crate::ReseedError;

/// 执行哪一组 seed 文件
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }

    /// 文件名后缀，例如 `.up.json`
    pub fn suffix(&self, backend: Backend) -> String {
        format!(".{}.{}", self.as_str(), backend.extension())
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 本次运行选中的 seed 文件
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeedFile {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum OperationOutcome {
    Applied,

    /// 开启 skip_error 时被容忍的错误响应
    Skipped { error: String },
}

/// 单个已发送请求的结果
#[derive(Debug, Clone, Serialize)]
pub struct OperationReport {
    /// 在 seed 文件中的位置（从 1 开始）
    pub index: usize,

    pub method: String,

    pub url: String,

    pub status: u16,

    #[serde(rename = "duration_ms", serialize_with = "as_millis")]
    pub duration: Duration,

    #[serde(flatten)]
    pub outcome: OperationOutcome,
}

impl OperationReport {
    pub fn is_skipped(&self) -> bool {
        matches!(self.outcome, OperationOutcome::Skipped { .. })
    }
}

/// 一个 seed 文件的全部操作
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub name: String,
    pub operations: Vec<OperationReport>,
}

impl FileReport {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            operations: Vec::new(),
        }
    }

    pub fn applied(&self) -> usize {
        self.operations.iter().filter(|o| !o.is_skipped()).count()
    }

    pub fn skipped(&self) -> usize {
        self.operations.iter().filter(|o| o.is_skipped()).count()
    }

    pub fn duration(&self) -> Duration {
        self.operations.iter().map(|o| o.duration).sum()
    }
}

/// 一次运行做过的所有事情，按执行顺序
#[derive(Debug, Clone, Serialize)]
pub struct SeedReport {
    pub run_id: Uuid,
    pub direction: Direction,
    pub backend: Backend,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub files: Vec<FileReport>,
    /// 致命错误中止时的位置和原因
    pub aborted: Option<AbortRecord>,
}

impl SeedReport {
    pub fn new(direction: Direction, backend: Backend) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            direction,
            backend,
            started_at: Utc::now(),
            finished_at: None,
            files: Vec::new(),
            aborted: None,
        }
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn operations(&self) -> impl Iterator<Item = &OperationReport> {
        self.files.iter().flat_map(|f| f.operations.iter())
    }
}

/// 中止运行的那个错误出现在哪里
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AbortRecord {
    pub file: String,

    /// 操作序号（从 1 开始），文件级错误（读取、解码）时为 `None`
    pub index: Option<usize>,

    pub error: String,
}

impl AbortRecord {
    pub fn from_error(error: &ReseedError) -> Self {
        let (file, index) = match error {
            ReseedError::OperationError { file, index, .. } => (file.clone(), Some(*index)),
            ReseedError::FileError { file, .. } => (file.clone(), None),
            _ => (String::new(), None),
        };

        Self {
            file,
            index,
            error: error.root().to_string(),
        }
    }
}

/// 一次运行的结果
#[derive(Debug)]
pub enum RunOutcome {
    /// 没有匹配方向的 seed 文件
    NoChange,

    Applied(SeedReport),

    /// 致命错误中止，`report` 里是中止前已经执行的部分
    Aborted {
        report: SeedReport,
        error: ReseedError,
    },
}

impl RunOutcome {
    pub fn is_no_change(&self) -> bool {
        matches!(self, RunOutcome::NoChange)
    }

    pub fn is_aborted(&self) -> bool {
        matches!(self, RunOutcome::Aborted { .. })
    }

    pub fn report(&self) -> Option<&SeedReport> {
        match self {
            RunOutcome::NoChange => None,
            RunOutcome::Applied(report) | RunOutcome::Aborted { report, .. } => Some(report),
        }
    }

    /// 中止视为错误，其余原样返回
    pub fn into_result(self) -> crate::Result<Self> {
        match self {
            RunOutcome::Aborted { error, .. } => Err(error),
            other => Ok(other),
        }
    }
}

/// 报告汇总
#[derive(Debug, Clone, PartialEq)]
pub struct SeedSummary {
    pub files: usize,
    pub total: usize,
    pub applied: usize,
    pub skipped: usize,
    pub total_duration: Duration,
}

impl SeedSummary {
    pub fn from_report(report: &SeedReport) -> Self {
        let skipped = report.operations().filter(|o| o.is_skipped()).count();
        let total = report.operations().count();

        Self {
            files: report.files.len(),
            total,
            applied: total - skipped,
            skipped,
            total_duration: report.operations().map(|o| o.duration).sum(),
        }
    }
}

fn as_millis<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_u64(duration.as_millis() as u64)
}
