use std::fs;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::descriptor::{
    BodyType, INDEX_PLACEHOLDER, RequestDescriptor, ResolvedBody, ResolvedDescriptor,
};
use crate::{ReseedError, Result};

/// 替换 index 占位符并加载文件来源的 body
#[derive(Debug, Clone, Default)]
pub struct TemplateResolver {
    index: Option<String>,
}

impl TemplateResolver {
    /// 没有 index 时占位符保持原样
    pub fn new(index: Option<String>) -> Self {
        Self { index }
    }

    /// 替换 `text` 中所有的 `${index}`
    pub fn substitute(&self, text: &str) -> String {
        match &self.index {
            Some(index) => text.replace(INDEX_PLACEHOLDER, index),
            None => text.to_string(),
        }
    }

    /// 解析一个描述的 path、header 和 body
    ///
    /// 相对路径的 body 文件在描述的 `migration_path` 中查找
    pub fn resolve(&self, desc: RequestDescriptor) -> Result<ResolvedDescriptor> {
        let path = self.substitute(&desc.path);

        let headers = desc
            .headers
            .iter()
            .map(|(k, vals)| (k.clone(), vals.iter().map(|v| self.substitute(v)).collect()))
            .collect();

        let body = match desc.body_type {
            BodyType::Bulk => {
                let file = body_file_path(&desc)?;
                let content = fs::read_to_string(&file)
                    .map_err(|e| ReseedError::file_system(&file, e))?;
                ResolvedBody::Ndjson(self.substitute(&to_ndjson(&content)))
            }
            BodyType::Binary => {
                let file = body_file_path(&desc)?;
                let bytes = fs::read(&file).map_err(|e| ReseedError::file_system(&file, e))?;
                ResolvedBody::Binary(bytes)
            }
            BodyType::Inline => match &desc.body {
                None => ResolvedBody::Empty,
                Some(serde_json::Value::String(text)) => ResolvedBody::Text(self.substitute(text)),
                Some(value) => {
                    let json = serde_json::to_string(value)
                        .map_err(|e| ReseedError::Other(e.to_string()))?;
                    ResolvedBody::Json(self.substitute(&json))
                }
            },
        };

        trace!(path = %path, body_bytes = body.byte_len(), "descriptor resolved");

        Ok(ResolvedDescriptor {
            method: desc.method,
            url: desc.url.map(|u| self.substitute(&u)),
            path,
            headers,
            query_params: desc.query_params,
            body,
        })
    }
}

fn body_file_path(desc: &RequestDescriptor) -> Result<PathBuf> {
    let relative = desc
        .body_file
        .as_deref()
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| {
            ReseedError::configuration(format!(
                "body_type {:?} requires a body file reference",
                desc.body_type
            ))
        })?;

    Ok(join_relative(&desc.migration_path, relative))
}

/// 把相对 seed 的路径拼接到 seed 目录
pub fn join_relative(dir: &Path, relative: &str) -> PathBuf {
    dir.join(relative.trim_start_matches('/'))
}

/// 保留非空行，每行以换行结尾
fn to_ndjson(content: &str) -> String {
    let mut out = String::with_capacity(content.len() + 1);
    for line in content.lines().filter(|l| !l.trim().is_empty()) {
        out.push_str(line);
        out.push('\n');
    }
    out
}
