use crate::config::types::{SeedConfig, SeedSettings};
use crate::{ReseedError, Result};
use regex::{Captures, Regex};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::debug;

/// 配置文件加载器
pub struct ConfigLoader;

impl ConfigLoader {
    /// 配置文件名
    pub const CONFIG_FILE: &'static str = "reseed.toml";

    /// 从指定路径加载配置文件
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<SeedConfig> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            ReseedError::ConfigFileError(format!("读取 {} 失败: {}", path.display(), e))
        })?;

        let mut config: SeedConfig = toml::from_str(&content).map_err(|e| {
            ReseedError::ConfigFileError(format!("解析 {} 失败: {}", path.display(), e))
        })?;

        resolve_settings_env(&mut config.defaults);
        for settings in config.environments.values_mut() {
            resolve_settings_env(settings);
        }

        debug!(path = %path.display(), "config loaded");
        Ok(config)
    }

    /// 查找并加载配置文件
    ///
    /// 查找顺序：
    /// 1. `start` 及其各级父目录
    /// 2. `~/.config/reseed/reseed.toml`
    pub fn find_and_load(start: &Path) -> Result<Option<SeedConfig>> {
        match Self::find(start) {
            Some(path) => Self::load_from_path(path).map(Some),
            None => Ok(None),
        }
    }

    pub fn find(start: &Path) -> Option<PathBuf> {
        Self::find_upwards(start).or_else(Self::user_config_path)
    }

    fn find_upwards(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();

        loop {
            let config_path = current.join(Self::CONFIG_FILE);
            if config_path.is_file() {
                return Some(config_path);
            }

            if !current.pop() {
                return None;
            }
        }
    }

    fn user_config_path() -> Option<PathBuf> {
        let home = dirs::home_dir()?;
        let config_path = home.join(".config").join("reseed").join(Self::CONFIG_FILE);
        config_path.is_file().then_some(config_path)
    }
}

/// 用系统环境变量替换 `${VAR}`，未设置的保持原样
///
/// 只匹配大写名称，所以 seed 模板里的 `${index}` 不受影响
pub fn resolve_env_vars(text: &str) -> String {
    static ENV_REGEX: OnceLock<Regex> = OnceLock::new();
    let re = ENV_REGEX.get_or_init(|| Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap());

    re.replace_all(text, |caps: &Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
    })
    .to_string()
}

fn resolve_settings_env(settings: &mut SeedSettings) {
    for field in [
        &mut settings.database,
        &mut settings.index,
        &mut settings.exclude_header,
        &mut settings.token,
    ]
    .into_iter()
    .flatten()
    {
        *field = resolve_env_vars(field);
    }
}
