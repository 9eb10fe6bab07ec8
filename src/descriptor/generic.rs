use std::path::Path;

use serde_json::{Map, Value};

use crate::descriptor::decode_error;
use crate::descriptor::types::{BodyType, MultiMap, RequestDescriptor};
use crate::{ReseedError, Result};

/// 通用 REST seed 格式的解析器
///
/// 数组里每个元素是任意 JSON 对象，只读取固定的几个 key，其余忽略
pub struct GenericParser;

impl GenericParser {
    /// 解码整个 seed 文件：一个 JSON 对象数组
    pub fn parse_seed(path: &Path, content: &[u8]) -> Result<Vec<RequestDescriptor>> {
        let items: Vec<Map<String, Value>> =
            serde_json::from_slice(content).map_err(|e| decode_error(path, e))?;

        items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                Self::parse(item).map_err(|e| match e {
                    ReseedError::ConfigurationError(msg) => {
                        ReseedError::configuration(format!("descriptor #{}: {}", i + 1, msg))
                    }
                    other => other,
                })
            })
            .collect()
    }

    /// 从一个无类型对象构建描述
    ///
    /// 标量一律转为字符串，不会失败；只有结构不匹配（例如 `header` 不是对象）才报错
    pub fn parse(params: &Map<String, Value>) -> Result<RequestDescriptor> {
        let mut desc = RequestDescriptor::default();

        for (key, val) in params {
            match key.as_str() {
                "method" => desc.method = cast_to_string(val),
                "url" => {
                    let url = cast_to_string(val);
                    if !url.is_empty() {
                        desc.url = Some(url);
                    }
                }
                "path" => desc.path = cast_to_string(val),
                "query_params" => collect_multi(key, val, &mut desc.query_params)?,
                "header" => collect_multi(key, val, &mut desc.headers)?,
                "file_path" | "body_path_file" => {
                    if !val.is_null() {
                        desc.body_file = Some(cast_to_string(val));
                    }
                }
                "body_type" => {
                    if !val.is_null() {
                        desc.body_type = BodyType::parse(&cast_to_string(val));
                    }
                }
                "body" => {
                    if !val.is_null() {
                        desc.body = Some(val.clone());
                    }
                }
                _ => {}
            }
        }

        Ok(desc)
    }
}

/// 宽松的标量转字符串
///
/// 字符串原样返回，数字和布尔值取文本形式，null 和容器变成空字符串
pub fn cast_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    }
}

fn collect_multi(field: &str, value: &Value, target: &mut MultiMap) -> Result<()> {
    let entries = match value {
        Value::Null => return Ok(()),
        Value::Object(map) => map,
        _ => {
            return Err(ReseedError::configuration(format!(
                "`{}` must be an object",
                field
            )));
        }
    };

    for (key, vals) in entries {
        match vals {
            Value::Null => {}
            Value::Array(items) => {
                let slot = target.entry(key.clone()).or_default();
                slot.extend(items.iter().map(cast_to_string));
            }
            other => target
                .entry(key.clone())
                .or_default()
                .push(cast_to_string(other)),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn object(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_parse_full_descriptor() {
        let desc = GenericParser::parse(&object(json!({
            "method": "POST",
            "url": "http://other:8080",
            "path": "/api/items",
            "query_params": {"page": 1, "tag": ["a", "b"]},
            "header": {"Authorization": "Bearer x"},
            "file_path": "data/logo.png",
            "body_type": "binary",
            "body": {"name": "foo"}
        })))
        .unwrap();

        assert_eq!(desc.method, "POST");
        assert_eq!(desc.url.as_deref(), Some("http://other:8080"));
        assert_eq!(desc.path, "/api/items");
        assert_eq!(desc.query_params["page"], vec!["1"]);
        assert_eq!(desc.query_params["tag"], vec!["a", "b"]);
        assert_eq!(desc.headers["Authorization"], vec!["Bearer x"]);
        assert_eq!(desc.body_file.as_deref(), Some("data/logo.png"));
        assert_eq!(desc.body_type, BodyType::Binary);
        assert_eq!(desc.body, Some(json!({"name": "foo"})));
    }

    #[test]
    fn test_unknown_keys_ignored() {
        let desc = GenericParser::parse(&object(json!({
            "method": "GET",
            "path": "/",
            "comment": "ignored",
            "retries": 3
        })))
        .unwrap();
        assert_eq!(desc.method, "GET");
        assert!(desc.headers.is_empty());
    }

    #[test]
    fn test_missing_fields_leave_defaults() {
        let desc = GenericParser::parse(&object(json!({"body": null}))).unwrap();
        assert_eq!(desc.method, "");
        assert_eq!(desc.path, "");
        assert_eq!(desc.body, None);
        assert!(!desc.is_valid());
    }

    #[test]
    fn test_cast_to_string() {
        assert_eq!(cast_to_string(&json!("x")), "x");
        assert_eq!(cast_to_string(&json!(42)), "42");
        assert_eq!(cast_to_string(&json!(1.5)), "1.5");
        assert_eq!(cast_to_string(&json!(true)), "true");
        assert_eq!(cast_to_string(&json!(null)), "");
        assert_eq!(cast_to_string(&json!({"a": 1})), "");
    }

    #[test]
    fn test_header_must_be_object() {
        let err = GenericParser::parse(&object(json!({
            "method": "GET",
            "path": "/",
            "header": "X-Debug: true"
        })))
        .unwrap_err();
        assert!(matches!(err, ReseedError::ConfigurationError(_)));
    }

    #[test]
    fn test_parse_seed_array() {
        let content = br#"[{"method":"PUT","path":"${index}"},{"method":"DELETE","path":"x"}]"#;
        let descs = GenericParser::parse_seed(Path::new("0001.up.json"), content).unwrap();
        assert_eq!(descs.len(), 2);
        assert_eq!(descs[1].method, "DELETE");
    }

    #[test]
    fn test_parse_seed_rejects_non_array() {
        let path = Path::new("0001.up.json");
        let err = GenericParser::parse_seed(path, br#"{"method":"GET"}"#).unwrap_err();
        assert!(matches!(err, ReseedError::ConfigurationError(_)));

        let err = GenericParser::parse_seed(path, b"not json").unwrap_err();
        assert!(matches!(err, ReseedError::DecodingError { .. }));
    }
}
