use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::descriptor::Backend;
use crate::runner::RunOptions;
use crate::{ReseedError, Result};

/// seed 运行配置，所有字段可选以便逐层合并
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct SeedSettings {
    /// 后端 base URL
    pub database: Option<String>,

    /// seed 文件所在目录
    pub path: Option<PathBuf>,

    pub backend: Option<Backend>,

    pub index: Option<String>,

    pub exclude_header: Option<String>,

    pub skip_error: Option<bool>,

    pub debug: Option<bool>,

    pub token: Option<String>,

    pub timeout_secs: Option<u64>,
}

impl SeedSettings {
    /// `other` 中设置的字段覆盖 `self`
    pub fn overlay(self, other: SeedSettings) -> SeedSettings {
        SeedSettings {
            database: other.database.or(self.database),
            path: other.path.or(self.path),
            backend: other.backend.or(self.backend),
            index: other.index.or(self.index),
            exclude_header: other.exclude_header.or(self.exclude_header),
            skip_error: other.skip_error.or(self.skip_error),
            debug: other.debug.or(self.debug),
            token: other.token.or(self.token),
            timeout_secs: other.timeout_secs.or(self.timeout_secs),
        }
    }

    /// 把合并后的配置转换为 seed 目录和运行参数
    pub fn into_run_options(self) -> Result<(PathBuf, RunOptions)> {
        let database = self
            .database
            .filter(|d| !d.trim().is_empty())
            .ok_or_else(|| ReseedError::configuration("database URL is required"))?;
        let path = self
            .path
            .ok_or_else(|| ReseedError::configuration("seed path is required"))?;

        let mut options = RunOptions::new(database, self.backend.unwrap_or_default())
            .with_exclude_header(self.exclude_header.unwrap_or_default())
            .with_skip_error(self.skip_error.unwrap_or(false))
            .with_debug(self.debug.unwrap_or(false));

        if let Some(index) = self.index {
            options = options.with_index(index);
        }
        if let Some(token) = self.token {
            options = options.with_token(token);
        }
        if let Some(secs) = self.timeout_secs {
            options = options.with_timeout(Duration::from_secs(secs));
        }

        Ok((path, options))
    }
}

/// `reseed.toml` 的内容：顶层默认值加上命名环境
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeedConfig {
    #[serde(flatten)]
    pub defaults: SeedSettings,

    #[serde(default)]
    pub environments: HashMap<String, SeedSettings>,
}

impl SeedConfig {
    pub fn get_environment(&self, env_name: &str) -> Option<&SeedSettings> {
        self.environments.get(env_name)
    }

    /// 默认值叠加指定环境，未知环境名报错
    pub fn settings_for(&self, env_name: Option<&str>) -> Result<SeedSettings> {
        let Some(name) = env_name else {
            return Ok(self.defaults.clone());
        };

        let env = self.get_environment(name).ok_or_else(|| {
            ReseedError::configuration(format!("unknown environment: {}", name))
        })?;
        Ok(self.defaults.clone().overlay(env.clone()))
    }
}
