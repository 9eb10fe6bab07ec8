use crate::Result;
use crate::http::types::Status;
use std::time::Duration;

pub struct Response {
    pub status: Status,
    pub body: String,
    pub duration: Duration,
}

impl Response {
    pub fn new(status: u16, body: String, duration: Duration) -> Result<Self> {
        Ok(Self {
            status: Status::new(status)?,
            body,
            duration,
        })
    }

    pub fn is_failure(&self) -> bool {
        self.status.is_failure()
    }

    /// 截取 body 前 `limit` 个字符，用于日志
    pub fn body_preview(&self, limit: usize) -> String {
        if self.body.chars().count() <= limit {
            self.body.clone()
        } else {
            let cut: String = self.body.chars().take(limit).collect();
            format!("{}...", cut)
        }
    }
}
