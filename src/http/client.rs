use std::time::{Duration, Instant};

use crate::Result;
use crate::http::request::Request;
use crate::http::response::Response;

#[derive(Clone)]
pub struct Client {
    inner: reqwest::Client,
}

impl Client {
    /// 创建客户端，`timeout` 为 `None` 时不设置整体超时
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            inner: builder.build()?,
        })
    }

    /// 发送请求并读取完整响应体
    ///
    /// 只有连接层面的问题才返回错误，HTTP 错误状态码作为正常 `Response` 返回
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let mut req = self
            .inner
            .request(request.method, request.url)
            .headers(request.headers);

        if let Some(body) = request.body {
            req = req.body(body);
        }

        let start = Instant::now();
        let response = req.send().await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        let duration = start.elapsed();

        Response::new(status, body, duration)
    }
}
