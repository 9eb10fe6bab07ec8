use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReseedError {
    #[error("配置错误: {0}")]
    ConfigurationError(String),

    #[error("读取文件失败 {}: {source}", path.display())]
    FileSystemError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("解码失败 {}: {message}", path.display())]
    DecodingError { path: PathBuf, message: String },

    #[error("网络错误: {0}")]
    TransportError(#[from] reqwest::Error),

    #[error("请求失败，状态码 {status}: {body}")]
    RequestFailure { status: u16, body: String },

    #[error("URL 解析错误: {0}")]
    UrlParseError(#[from] url::ParseError),

    #[error("配置文件错误: {0}")]
    ConfigFileError(String),

    /// 准备整个 seed 文件时的错误
    #[error("{file}: {source}")]
    FileError {
        file: String,
        #[source]
        source: Box<ReseedError>,
    },

    /// 单个操作的错误，`index` 从 1 开始
    #[error("{file} 第 {index} 个操作: {source}")]
    OperationError {
        file: String,
        index: usize,
        #[source]
        source: Box<ReseedError>,
    },

    #[error("{0}")]
    Other(String),
}

impl ReseedError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ReseedError::ConfigurationError(message.into())
    }

    pub fn file_system(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ReseedError::FileSystemError {
            path: path.into(),
            source,
        }
    }

    /// 附加出错的 seed 文件
    pub fn in_file(self, file: impl Into<String>) -> Self {
        ReseedError::FileError {
            file: file.into(),
            source: Box::new(self),
        }
    }

    /// 附加出错的 seed 文件和操作位置
    pub fn at_operation(self, file: impl Into<String>, index: usize) -> Self {
        ReseedError::OperationError {
            file: file.into(),
            index,
            source: Box::new(self),
        }
    }

    /// 只有 HTTP 错误响应可以跳过，其他错误都会中止运行
    pub fn is_skippable(&self) -> bool {
        matches!(self, ReseedError::RequestFailure { .. })
    }

    /// 去掉文件/操作上下文后的最内层错误
    pub fn root(&self) -> &ReseedError {
        match self {
            ReseedError::FileError { source, .. } | ReseedError::OperationError { source, .. } => {
                source.root()
            }
            other => other,
        }
    }
}

impl From<anyhow::Error> for ReseedError {
    fn from(err: anyhow::Error) -> Self {
        ReseedError::Other(err.to_string())
    }
}

/// Result type for reseed crate
pub type Result<T> = std::result::Result<T, ReseedError>;
