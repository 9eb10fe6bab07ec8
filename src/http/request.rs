use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use url::Url;

use crate::descriptor::ResolvedDescriptor;
use crate::http::types::parse_method;
use crate::{ReseedError, Result};

pub struct Request {
    pub method: reqwest::Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<Vec<u8>>,
}

impl Request {
    pub fn new(method: &str, url: &str) -> Result<Self> {
        Ok(Self {
            method: parse_method(method)?,
            url: Url::parse(url)?,
            headers: HeaderMap::new(),
            body: None,
        })
    }

    /// 根据解析后的描述构建请求
    ///
    /// 描述自己的 `url` 优先于 `base_url`
    pub fn from_descriptor(desc: ResolvedDescriptor, base_url: &str) -> Result<Self> {
        let base = desc.url.as_deref().unwrap_or(base_url);
        let mut request = Self::new(&desc.method, &join_url(base, &desc.path))?;

        for (key, values) in &desc.query_params {
            for value in values {
                request.add_query(key, value);
            }
        }

        for (key, values) in &desc.headers {
            for value in values {
                request.append_header(key, value)?;
            }
        }

        if !request.headers.contains_key(CONTENT_TYPE)
            && let Some(content_type) = desc.body.default_content_type()
        {
            request.append_header(CONTENT_TYPE.as_str(), content_type)?;
        }

        request.body = desc.body.into_bytes();
        Ok(request)
    }

    fn append_header(&mut self, key: &str, value: &str) -> Result<()> {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| ReseedError::configuration(format!("invalid header name: {}", key)))?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            ReseedError::configuration(format!("invalid value for header {}", key))
        })?;
        self.headers.append(name, value);
        Ok(())
    }

    fn add_query(&mut self, key: &str, value: &str) {
        self.url.query_pairs_mut().append_pair(key, value);
    }
}

/// 拼接 base 和 path：去掉 base 尾部和 path 两端的 `/` 后用一个 `/` 连接
///
/// path 为空时原样返回 base（保留 base 里已有的查询参数）
pub fn join_url(base: &str, path: &str) -> String {
    let path = path.trim_matches('/');
    if path.is_empty() {
        return base.to_string();
    }
    format!("{}/{}", base.trim_end_matches('/'), path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::ResolvedBody;
    use std::collections::BTreeMap;

    fn resolved(method: &str, path: &str, body: ResolvedBody) -> ResolvedDescriptor {
        ResolvedDescriptor {
            method: method.to_string(),
            url: None,
            path: path.to_string(),
            headers: BTreeMap::new(),
            query_params: BTreeMap::new(),
            body,
        }
    }

    #[test]
    fn test_join_url() {
        assert_eq!(join_url("http://es:9200", "products"), "http://es:9200/products");
        assert_eq!(join_url("http://es:9200/", "/products/"), "http://es:9200/products");
        assert_eq!(
            join_url("http://influx:8086/api/v2/write?bucket=b", "/"),
            "http://influx:8086/api/v2/write?bucket=b"
        );
    }

    #[test]
    fn test_from_descriptor_json_body() {
        let desc = resolved("PUT", "products", ResolvedBody::Json("{}".into()));
        let req = Request::from_descriptor(desc, "http://es:9200").unwrap();

        assert_eq!(req.method, reqwest::Method::PUT);
        assert_eq!(req.url.as_str(), "http://es:9200/products");
        assert_eq!(req.headers[CONTENT_TYPE], "application/json");
        assert_eq!(req.body.as_deref(), Some(&b"{}"[..]));
    }

    #[test]
    fn test_from_descriptor_query_and_headers() {
        let mut desc = resolved("get", "search", ResolvedBody::Empty);
        desc.query_params
            .insert("tag".into(), vec!["a".into(), "b".into()]);
        desc.headers
            .insert("Accept".into(), vec!["text/plain".into(), "application/json".into()]);

        let req = Request::from_descriptor(desc, "http://api").unwrap();
        assert_eq!(req.url.query(), Some("tag=a&tag=b"));
        assert_eq!(req.headers.get_all("accept").iter().count(), 2);
        assert!(!req.headers.contains_key(CONTENT_TYPE));
        assert!(req.body.is_none());
    }

    #[test]
    fn test_descriptor_url_overrides_base() {
        let mut desc = resolved("GET", "health", ResolvedBody::Empty);
        desc.url = Some("http://other:8080".into());
        let req = Request::from_descriptor(desc, "http://api").unwrap();
        assert_eq!(req.url.as_str(), "http://other:8080/health");
    }

    #[test]
    fn test_invalid_header_name() {
        let mut desc = resolved("GET", "x", ResolvedBody::Empty);
        desc.headers.insert("Bad Header".into(), vec!["v".into()]);
        let err = Request::from_descriptor(desc, "http://api").err().unwrap();
        assert!(matches!(err, ReseedError::ConfigurationError(_)));
    }

    #[test]
    fn test_extension_method_passes_through() {
        let desc = resolved("propfind", "dav", ResolvedBody::Empty);
        let req = Request::from_descriptor(desc, "http://api").unwrap();
        assert_eq!(req.method.as_str(), "PROPFIND");
    }

    #[test]
    fn test_invalid_method() {
        let desc = resolved("NOT A METHOD", "x", ResolvedBody::Empty);
        let err = Request::from_descriptor(desc, "http://api").err().unwrap();
        assert!(matches!(err, ReseedError::ConfigurationError(_)));
    }
}
