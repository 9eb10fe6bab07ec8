pub mod elasticsearch;
pub mod generic;
pub mod influx;
pub mod types;

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{ReseedError, Result};

// 常用类型再导出
pub use elasticsearch::DocumentSeed;
pub use generic::{GenericParser, cast_to_string};
pub use types::{
    BodyType, INDEX_PLACEHOLDER, MultiMap, RequestDescriptor, ResolvedBody, ResolvedDescriptor,
};

/// 目标服务类型，决定 seed 格式和文件扩展名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    #[default]
    Http,
    Elasticsearch,
    Influx,
}

impl Backend {
    pub fn as_str(&self) -> &'static str {
        match self {
            Backend::Http => "http",
            Backend::Elasticsearch => "elasticsearch",
            Backend::Influx => "influx",
        }
    }

    /// seed 文件扩展名，不含方向部分
    pub fn extension(&self) -> &'static str {
        match self {
            Backend::Http | Backend::Elasticsearch => "json",
            Backend::Influx => "txt",
        }
    }

    /// 把一个 seed 文件的原始内容解码为描述
    pub fn decode(
        &self,
        path: &Path,
        content: &[u8],
        token: Option<&str>,
    ) -> Result<Vec<RequestDescriptor>> {
        match self {
            Backend::Http => GenericParser::parse_seed(path, content),
            Backend::Elasticsearch => DocumentSeed::parse_seed(path, content),
            Backend::Influx => {
                let text =
                    std::str::from_utf8(content).map_err(|e| ReseedError::DecodingError {
                        path: path.to_path_buf(),
                        message: e.to_string(),
                    })?;
                Ok(influx::parse_lines(text, token))
            }
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 把 seed 文件的 `serde_json` 错误归类
///
/// JSON 本身损坏是解码错误，JSON 合法但结构不对是配置错误
pub(crate) fn decode_error(path: &Path, err: serde_json::Error) -> ReseedError {
    match err.classify() {
        serde_json::error::Category::Data => {
            ReseedError::configuration(format!("{}: {}", path.display(), err))
        }
        _ => ReseedError::DecodingError {
            path: path.to_path_buf(),
            message: err.to_string(),
        },
    }
}

/// 解析一个通用 seed 对象，供嵌入方调用
pub fn parse_descriptor(
    params: &serde_json::Map<String, serde_json::Value>,
) -> Result<RequestDescriptor> {
    GenericParser::parse(params)
}
