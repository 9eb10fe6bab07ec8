use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use reseed::config::{ConfigLoader, SeedSettings};
use reseed::runner::{RunObserver, SeedReporter};
use reseed::{Backend, Direction, SeedRunner};

pub type Result<T> = std::result::Result<T, anyhow::Error>;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// 配置文件（默认按 reseed.toml 查找）
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// 使用配置文件中的哪个环境
    #[arg(long, global = true)]
    pub env: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 按升序执行 *.up seed 文件
    Up(SeedArgs),
    /// 按降序执行 *.down seed 文件
    Down(SeedArgs),
}

#[derive(Args, Debug, Default)]
pub struct SeedArgs {
    /// 后端类型
    #[arg(long, value_enum)]
    pub backend: Option<Backend>,

    /// 目标服务的 base URL
    #[arg(long)]
    pub database: Option<String>,

    /// seed 文件目录
    #[arg(long)]
    pub path: Option<PathBuf>,

    /// 替换 ${index} 的值
    #[arg(long)]
    pub index: Option<String>,

    /// 额外的 header，格式 key:value,key:value
    #[arg(long)]
    pub exclude_header: Option<String>,

    /// 请求失败时记录并继续
    #[arg(long)]
    pub skip_error: bool,

    /// 输出请求和响应详情
    #[arg(long)]
    pub debug: bool,

    /// Influx API token
    #[arg(long)]
    pub token: Option<String>,

    /// 请求超时秒数（默认不设置）
    #[arg(long)]
    pub timeout: Option<u64>,

    /// 以 JSON 输出运行报告
    #[arg(long)]
    pub json: bool,
}

impl SeedArgs {
    /// 只取实际给出的参数，未设置的布尔值不覆盖配置
    fn to_settings(&self) -> SeedSettings {
        SeedSettings {
            database: self.database.clone(),
            path: self.path.clone(),
            backend: self.backend,
            index: self.index.clone(),
            exclude_header: self.exclude_header.clone(),
            skip_error: self.skip_error.then_some(true),
            debug: self.debug.then_some(true),
            token: self.token.clone(),
            timeout_secs: self.timeout,
        }
    }
}

impl Commands {
    fn split(&self) -> (Direction, &SeedArgs) {
        match self {
            Commands::Up(args) => (Direction::Up, args),
            Commands::Down(args) => (Direction::Down, args),
        }
    }
}

/// 合并配置：文件默认值、环境，最后是命令行参数
pub fn resolve_settings(
    config_path: Option<&Path>,
    env_name: Option<&str>,
    args: &SeedArgs,
) -> Result<SeedSettings> {
    let config = match config_path {
        Some(path) => Some(ConfigLoader::load_from_path(path)?),
        None => ConfigLoader::find_and_load(&std::env::current_dir()?)?,
    };

    let base = match &config {
        Some(config) => config.settings_for(env_name)?,
        None if env_name.is_some() => {
            anyhow::bail!("--env given but no {} was found", ConfigLoader::CONFIG_FILE)
        }
        None => SeedSettings::default(),
    };

    Ok(base.overlay(args.to_settings()))
}

pub async fn run(cli: Cli) -> Result<()> {
    let (direction, args) = cli.command.split();
    let settings = resolve_settings(cli.config.as_deref(), cli.env.as_deref(), args)?;

    reseed::logger::init_logger(settings.debug.unwrap_or(false));

    let (dir, options) = settings.into_run_options()?;
    let reporter = SeedReporter::new(options.debug);
    let runner = SeedRunner::new(options)?;

    // JSON 模式下不输出实时进度，只输出最终报告
    let observer: &dyn RunObserver = if args.json { &() } else { &reporter };
    let outcome = runner
        .execute(direction, &dir, observer)
        .await
        .with_context(|| format!("seed {} failed for {}", direction, dir.display()))?;

    if args.json {
        reporter.print_json(&outcome)?;
    } else {
        reporter.print_outcome(&outcome);
    }

    // 中止时先输出已执行的部分，再返回错误
    outcome
        .into_result()
        .with_context(|| format!("seed {} aborted for {}", direction, dir.display()))?;
    Ok(())
}
