use tracing_subscriber::{EnvFilter, fmt};

/// 初始化 tracing subscriber
///
/// 设置了 `RUST_LOG` 时以它为准，否则是 `info`，`--debug` 时是 `debug`
///
/// 示例：
/// - RUST_LOG=debug reseed up ...
/// - RUST_LOG=reseed::runner=trace reseed down ...
pub fn init_logger(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // 重复初始化时什么都不做
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .try_init();

    tracing::debug!("Logger initialized");
}
