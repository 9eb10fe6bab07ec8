use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;

use crate::{ReseedError, Result};

/// 会被替换为 index 名称的占位符
pub const INDEX_PLACEHOLDER: &str = "${index}";

/// header 或查询参数名到一个或多个值的映射
pub type MultiMap = BTreeMap<String, Vec<String>>;

/// 解析时如何生成请求 body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BodyType {
    /// 内联 `body`，序列化为 JSON 后做模板替换
    #[default]
    Inline,

    /// 从 `body_file` 加载的按行分隔内容
    Bulk,

    /// 从 `body_file` 加载的原始字节，原样发送
    Binary,
}

impl BodyType {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_ascii_lowercase().as_str() {
            "bulk" => BodyType::Bulk,
            "binary" => BodyType::Binary,
            _ => BodyType::Inline,
        }
    }
}

/// seed 文件描述的一个 HTTP 操作
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RequestDescriptor {
    pub method: String,

    /// 设置后替换本操作的 base URL
    pub url: Option<String>,

    /// 可以包含 `${index}`
    pub path: String,

    pub headers: MultiMap,

    pub query_params: MultiMap,

    pub body: Option<Value>,

    pub body_type: BodyType,

    /// 相对于 `migration_path`，bulk 和 binary body 使用
    pub body_file: Option<String>,

    /// seed 文件所在目录，由 runner 注入
    pub migration_path: PathBuf,
}

impl RequestDescriptor {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.add_header(key, value);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    pub fn add_header(&mut self, key: &str, value: &str) {
        self.headers
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    pub fn add_query_param(&mut self, key: &str, value: &str) {
        self.query_params
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    /// 判断 header 是否存在（不区分大小写）
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.keys().any(|k| k.eq_ignore_ascii_case(name))
    }

    pub fn is_valid(&self) -> bool {
        !self.method.trim().is_empty() && !self.path.trim().is_empty()
    }

    pub fn validate(&self) -> Result<()> {
        if self.is_valid() {
            Ok(())
        } else {
            Err(ReseedError::configuration("method and path must be required"))
        }
    }
}

/// 模板替换和文件加载之后的 body
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResolvedBody {
    #[default]
    Empty,
    Json(String),
    Text(String),
    Ndjson(String),
    Binary(Vec<u8>),
}

impl ResolvedBody {
    /// body 的字节数，用于日志
    pub fn byte_len(&self) -> usize {
        match self {
            ResolvedBody::Empty => 0,
            ResolvedBody::Json(s) | ResolvedBody::Text(s) | ResolvedBody::Ndjson(s) => s.len(),
            ResolvedBody::Binary(b) => b.len(),
        }
    }

    /// 描述没有设置时由 body 推断的 Content-Type
    pub fn default_content_type(&self) -> Option<&'static str> {
        match self {
            ResolvedBody::Json(_) => Some("application/json"),
            ResolvedBody::Ndjson(_) => Some("application/x-ndjson"),
            _ => None,
        }
    }

    pub fn into_bytes(self) -> Option<Vec<u8>> {
        match self {
            ResolvedBody::Empty => None,
            ResolvedBody::Json(s) | ResolvedBody::Text(s) | ResolvedBody::Ndjson(s) => {
                Some(s.into_bytes())
            }
            ResolvedBody::Binary(b) => Some(b),
        }
    }
}

/// 可以直接转换为 HTTP 请求的描述
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedDescriptor {
    pub method: String,
    pub url: Option<String>,
    pub path: String,
    pub headers: MultiMap,
    pub query_params: MultiMap,
    pub body: ResolvedBody,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_type_parse() {
        assert_eq!(BodyType::parse("bulk"), BodyType::Bulk);
        assert_eq!(BodyType::parse("BINARY"), BodyType::Binary);
        assert_eq!(BodyType::parse(""), BodyType::Inline);
        assert_eq!(BodyType::parse("json"), BodyType::Inline);
    }

    #[test]
    fn test_validate_requires_method_and_path() {
        assert!(RequestDescriptor::new("PUT", "products").validate().is_ok());
        assert!(RequestDescriptor::new("", "products").validate().is_err());
        assert!(RequestDescriptor::new("GET", "").validate().is_err());
        assert!(!RequestDescriptor::new("  ", "x").is_valid());
    }

    #[test]
    fn test_add_header_accumulates_values() {
        let mut desc = RequestDescriptor::new("GET", "/");
        desc.add_header("Accept", "text/plain");
        desc.add_header("Accept", "application/json");

        assert_eq!(
            desc.headers.get("Accept"),
            Some(&vec!["text/plain".to_string(), "application/json".to_string()])
        );
        assert!(desc.has_header("accept"));
        assert!(!desc.has_header("Content-Type"));
    }

    #[test]
    fn test_resolved_body_content_type() {
        assert_eq!(
            ResolvedBody::Json("{}".into()).default_content_type(),
            Some("application/json")
        );
        assert_eq!(ResolvedBody::Text("x".into()).default_content_type(), None);
        assert_eq!(ResolvedBody::Binary(vec![1, 2]).byte_len(), 2);
        assert!(ResolvedBody::Empty.into_bytes().is_none());
    }
}
