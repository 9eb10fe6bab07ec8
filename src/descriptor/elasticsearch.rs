use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value;

use crate::Result;
use crate::descriptor::decode_error;
use crate::descriptor::types::{BodyType, RequestDescriptor};

pub const DEFAULT_CONTENT_TYPE: &str = "application/json; charset=UTF-8";

/// Elasticsearch seed 文件中的一项
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DocumentSeed {
    pub method: String,
    pub path: String,
    pub header: Option<HashMap<String, String>>,
    pub body: Option<Value>,
    pub body_type: Option<String>,
    pub body_path_file: Option<String>,
}

impl DocumentSeed {
    /// 严格解码 seed 文件，字段类型不对时报配置错误
    pub fn parse_seed(path: &Path, content: &[u8]) -> Result<Vec<RequestDescriptor>> {
        let seeds: Vec<DocumentSeed> =
            serde_json::from_slice(content).map_err(|e| decode_error(path, e))?;

        Ok(seeds.into_iter().map(RequestDescriptor::from).collect())
    }
}

impl From<DocumentSeed> for RequestDescriptor {
    fn from(seed: DocumentSeed) -> Self {
        let mut desc = RequestDescriptor::new(seed.method, seed.path);

        // 单值 map，用户的 Content-Type 替换默认值
        for (key, value) in seed.header.unwrap_or_default() {
            desc.add_header(&key, &value);
        }
        if !desc.has_header("Content-Type") {
            desc.add_header("Content-Type", DEFAULT_CONTENT_TYPE);
        }

        desc.body = seed.body.filter(|b| !b.is_null());
        desc.body_type = seed
            .body_type
            .as_deref()
            .map(BodyType::parse)
            .unwrap_or_default();
        desc.body_file = seed.body_path_file.filter(|p| !p.is_empty());
        desc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ReseedError;
    use serde_json::json;

    #[test]
    fn test_parse_document_seed() {
        let content = br#"[
            {"method": "PUT", "path": "${index}", "body": {"settings": {}}},
            {"method": "POST", "path": "_bulk", "body_type": "bulk", "body_path_file": "data.ndjson"}
        ]"#;

        let descs = DocumentSeed::parse_seed(Path::new("0001.up.json"), content).unwrap();
        assert_eq!(descs.len(), 2);
        assert_eq!(descs[0].method, "PUT");
        assert_eq!(descs[0].body, Some(json!({"settings": {}})));
        assert_eq!(descs[0].headers["Content-Type"], vec![DEFAULT_CONTENT_TYPE]);
        assert_eq!(descs[1].body_type, BodyType::Bulk);
        assert_eq!(descs[1].body_file.as_deref(), Some("data.ndjson"));
    }

    #[test]
    fn test_user_content_type_overrides_default() {
        let seed = DocumentSeed {
            method: "POST".into(),
            path: "_bulk".into(),
            header: Some(HashMap::from([(
                "content-type".to_string(),
                "application/x-ndjson".to_string(),
            )])),
            ..DocumentSeed::default()
        };

        let desc = RequestDescriptor::from(seed);
        assert_eq!(desc.headers.len(), 1);
        assert_eq!(desc.headers["content-type"], vec!["application/x-ndjson"]);
    }

    #[test]
    fn test_wrong_field_type_is_configuration_error() {
        let content = br#"[{"method": "PUT", "path": "x", "header": {"X-Count": 3}}]"#;
        let err = DocumentSeed::parse_seed(Path::new("bad.up.json"), content).unwrap_err();
        assert!(matches!(err, ReseedError::ConfigurationError(_)));

        let err = DocumentSeed::parse_seed(Path::new("bad.up.json"), b"[{").unwrap_err();
        assert!(matches!(err, ReseedError::DecodingError { .. }));
    }
}
