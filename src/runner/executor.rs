use std::fs;
use std::path::Path;
use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderMap, PROXY_AUTHORIZATION};
use tracing::{Instrument, debug, info, info_span, warn};

use crate::descriptor::{Backend, RequestDescriptor};
use crate::http::{Client, Request};
use crate::runner::scanner;
use crate::runner::types::{
    AbortRecord, Direction, FileReport, OperationOutcome, OperationReport, RunOutcome, SeedFile,
    SeedReport,
};
use crate::template::{HeaderRules, TemplateResolver};
use crate::{ReseedError, Result};

const DEBUG_BODY_PREVIEW: usize = 512;
const REDACTED: &str = "<redacted>";

/// 一次 seed 运行的参数
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub base_url: String,
    pub backend: Backend,
    /// `${index}` 的值
    pub index: Option<String>,
    /// `key:value,key:value`，追加到每个请求的 header
    pub exclude_header: String,
    pub skip_error: bool,
    pub debug: bool,
    /// Influx API token
    pub token: Option<String>,
    /// 请求超时，`None` 表示只受底层传输限制
    pub timeout: Option<Duration>,
}

impl RunOptions {
    pub fn new(base_url: impl Into<String>, backend: Backend) -> Self {
        Self {
            base_url: base_url.into(),
            backend,
            index: None,
            exclude_header: String::new(),
            skip_error: false,
            debug: false,
            token: None,
            timeout: None,
        }
    }

    pub fn with_index(mut self, index: impl Into<String>) -> Self {
        self.index = Some(index.into());
        self
    }

    pub fn with_exclude_header(mut self, rule: impl Into<String>) -> Self {
        self.exclude_header = rule.into();
        self
    }

    pub fn with_skip_error(mut self, skip: bool) -> Self {
        self.skip_error = skip;
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// 运行进度回调，默认什么都不做
pub trait RunObserver {
    /// 文件准备完成，即将发送 `operations` 个请求
    fn on_file_start(&self, _file: &SeedFile, _operations: usize) {}

    fn on_operation(&self, _file: &SeedFile, _operation: &OperationReport) {}

    fn on_file_done(&self, _file: &SeedFile, _report: &FileReport) {}

    fn on_abort(&self, _abort: &AbortRecord) {}
}

impl RunObserver for () {}

/// 把 seed 文件逐个请求地回放到服务端
pub struct SeedRunner {
    client: Client,
    resolver: TemplateResolver,
    options: RunOptions,
}

impl SeedRunner {
    pub fn new(options: RunOptions) -> Result<Self> {
        Ok(Self {
            client: Client::new(options.timeout)?,
            resolver: TemplateResolver::new(options.index.clone()),
            options,
        })
    }

    /// 执行 `dir` 中 `direction` 方向的所有 seed 文件
    ///
    /// 遇到第一个致命错误就停止并返回该错误。错误响应只有在
    /// `skip_error` 打开时才会被跳过。
    pub async fn run(&self, direction: Direction, dir: &Path) -> Result<RunOutcome> {
        self.execute(direction, dir, &()).await?.into_result()
    }

    /// 和 `run` 一样，但致命错误以 `RunOutcome::Aborted` 返回，带着中止前的
    /// 部分报告；进度通过 `observer` 实时通知
    ///
    /// 规则解析和目录扫描失败仍然是 `Err`，此时还没有发送任何请求
    pub async fn execute(
        &self,
        direction: Direction,
        dir: &Path,
        observer: &dyn RunObserver,
    ) -> Result<RunOutcome> {
        let rules = HeaderRules::parse(&self.options.exclude_header)?;
        let files = scanner::discover(dir, direction, self.options.backend)?;

        if files.is_empty() {
            info!(dir = %dir.display(), direction = %direction, "no seed files to apply");
            return Ok(RunOutcome::NoChange);
        }

        let report = SeedReport::new(direction, self.options.backend);
        let span = info_span!("seed", run_id = %report.run_id, direction = %direction);

        Ok(self
            .run_files(report, &files, &rules, observer)
            .instrument(span)
            .await)
    }

    async fn run_files(
        &self,
        mut report: SeedReport,
        files: &[SeedFile],
        rules: &HeaderRules,
        observer: &dyn RunObserver,
    ) -> RunOutcome {
        for file in files {
            let mut file_report = FileReport::new(&file.name);
            let result = self.run_file(file, rules, &mut file_report, observer).await;
            report.files.push(file_report);

            if let Err(error) = result {
                let abort = AbortRecord::from_error(&error);
                warn!(file = %abort.file, index = ?abort.index, error = %abort.error, "seed run aborted");
                observer.on_abort(&abort);

                report.aborted = Some(abort);
                report.finish();
                return RunOutcome::Aborted { report, error };
            }
        }

        report.finish();
        RunOutcome::Applied(report)
    }

    async fn run_file(
        &self,
        file: &SeedFile,
        rules: &HeaderRules,
        report: &mut FileReport,
        observer: &dyn RunObserver,
    ) -> Result<()> {
        let requests = self.prepare_file(file, rules)?;
        info!(file = %file.name, operations = requests.len(), "applying seed file");
        observer.on_file_start(file, requests.len());

        for (i, request) in requests.into_iter().enumerate() {
            let index = i + 1;
            let operation = self
                .execute_one(index, request)
                .await
                .map_err(|e| e.at_operation(&file.name, index))?;
            observer.on_operation(file, &operation);
            report.operations.push(operation);
        }

        info!(
            file = %file.name,
            applied = report.applied(),
            skipped = report.skipped(),
            "seed file done"
        );
        observer.on_file_done(file, report);
        Ok(())
    }

    /// 先解码、校验、解析整个文件的描述，全部成功后才会发送请求
    fn prepare_file(&self, file: &SeedFile, rules: &HeaderRules) -> Result<Vec<Request>> {
        let content = fs::read(&file.path)
            .map_err(|e| ReseedError::file_system(&file.path, e).in_file(&file.name))?;

        let descriptors = self
            .options
            .backend
            .decode(&file.path, &content, self.options.token.as_deref())
            .map_err(|e| e.in_file(&file.name))?;

        let dir = file.path.parent().unwrap_or(Path::new("."));

        descriptors
            .into_iter()
            .enumerate()
            .map(|(i, desc)| {
                self.prepare_one(desc, dir, rules)
                    .map_err(|e| e.at_operation(&file.name, i + 1))
            })
            .collect()
    }

    fn prepare_one(
        &self,
        mut desc: RequestDescriptor,
        dir: &Path,
        rules: &HeaderRules,
    ) -> Result<Request> {
        desc.validate()?;
        desc.migration_path = dir.to_path_buf();

        // 规则在模板替换之后合并，值按字面使用
        let mut resolved = self.resolver.resolve(desc)?;
        rules.apply(&mut resolved.headers);

        Request::from_descriptor(resolved, &self.options.base_url)
    }

    async fn execute_one(&self, index: usize, request: Request) -> Result<OperationReport> {
        let method = request.method.to_string();
        let url = request.url.to_string();

        if self.options.debug {
            info!(
                %method,
                %url,
                headers = ?redacted_headers(&request.headers),
                body = %body_preview(request.body.as_deref()),
                "sending request"
            );
        }

        let response = self.client.execute(request).await?;
        let status = response.status.code();

        debug!(
            %method,
            %url,
            status,
            elapsed_ms = response.duration.as_millis() as u64,
            "request done"
        );
        if self.options.debug {
            info!(status, body = %response.body_preview(DEBUG_BODY_PREVIEW), "response received");
        }

        let outcome = if response.is_failure() {
            let failure = ReseedError::RequestFailure {
                status,
                body: response.body.clone(),
            };
            if !self.options.skip_error {
                return Err(failure);
            }
            warn!(index, %method, %url, status, body = %response.body, "skipping failed request");
            OperationOutcome::Skipped {
                error: failure.to_string(),
            }
        } else {
            OperationOutcome::Applied
        };

        Ok(OperationReport {
            index,
            method,
            url,
            status,
            duration: response.duration,
            outcome,
        })
    }
}

/// 用于调试日志的 header 列表，凭证类 header 的值被隐藏
fn redacted_headers(headers: &HeaderMap) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let value = if name == AUTHORIZATION || name == PROXY_AUTHORIZATION {
                REDACTED.to_string()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            (name.to_string(), value)
        })
        .collect()
}

fn body_preview(body: Option<&[u8]>) -> String {
    match body {
        None => String::new(),
        Some(bytes) => match std::str::from_utf8(bytes) {
            Ok(text) if text.chars().count() > DEBUG_BODY_PREVIEW => {
                let cut: String = text.chars().take(DEBUG_BODY_PREVIEW).collect();
                format!("{}...", cut)
            }
            Ok(text) => text.to_string(),
            Err(_) => format!("<{} bytes of binary data>", bytes.len()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{CONTENT_TYPE, HeaderValue};

    #[test]
    fn test_body_preview() {
        assert_eq!(body_preview(None), "");
        assert_eq!(body_preview(Some(b"{}")), "{}");
        assert_eq!(body_preview(Some(&[0xff, 0x00])), "<2 bytes of binary data>");

        let long = "a".repeat(DEBUG_BODY_PREVIEW + 10);
        assert!(body_preview(Some(long.as_bytes())).ends_with("..."));
    }

    #[test]
    fn test_redacted_headers_hide_credentials() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token s3cret"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        let logged = redacted_headers(&headers);
        assert!(logged.contains(&("authorization".to_string(), REDACTED.to_string())));
        assert!(logged.contains(&("content-type".to_string(), "text/plain".to_string())));
        assert!(!format!("{:?}", logged).contains("s3cret"));
    }

    #[test]
    fn test_run_options_builder() {
        let options = RunOptions::new("http://es:9200", Backend::Elasticsearch)
            .with_index("products")
            .with_exclude_header("X-Env:test")
            .with_skip_error(true)
            .with_timeout(Duration::from_secs(5));

        assert_eq!(options.index.as_deref(), Some("products"));
        assert_eq!(options.exclude_header, "X-Env:test");
        assert!(options.skip_error);
        assert!(!options.debug);
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_no_timeout_by_default() {
        let options = RunOptions::new("http://es:9200", Backend::Elasticsearch);
        assert_eq!(options.timeout, None);
    }

    #[tokio::test]
    async fn test_invalid_rule_fails_before_scanning() {
        let options =
            RunOptions::new("http://localhost:1", Backend::Http).with_exclude_header("broken");
        let runner = SeedRunner::new(options).unwrap();
        let err = runner
            .run(Direction::Up, Path::new("/definitely/not/here"))
            .await
            .unwrap_err();
        assert!(matches!(err, ReseedError::ConfigurationError(_)));
    }
}
