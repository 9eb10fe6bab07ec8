use crate::{ReseedError, Result};

/// 解析 HTTP 方法，大小写不敏感
///
/// 任何合法的 token 都可以（包括 PROPFIND、PURGE 之类的扩展方法）
pub fn parse_method(s: &str) -> Result<reqwest::Method> {
    reqwest::Method::from_bytes(s.trim().to_ascii_uppercase().as_bytes())
        .map_err(|_| ReseedError::configuration(format!("invalid HTTP method: {}", s)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(u16);

impl Status {
    pub fn new(code: u16) -> Result<Self> {
        if (100..600).contains(&code) {
            Ok(Self(code))
        } else {
            Err(ReseedError::Other(format!("Invalid HTTP status code: {}", code)))
        }
    }

    pub fn code(&self) -> u16 {
        self.0
    }

    /// 4xx 和 5xx 都算作失败的 seed 操作
    pub fn is_failure(&self) -> bool {
        self.0 >= 400
    }
}
