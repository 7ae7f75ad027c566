use crate::config::toml_config::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// `RUST_LOG` 優先；否則只放行本 crate 的指定等級，verbose 時降到 debug
fn lookup_filter(level: &str, verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("court_lookup=debug,info")
        } else {
            EnvFilter::new(format!("court_lookup={},warn", level))
        }
    })
}

/// 日誌一律寫到 stderr，stdout 只留給查詢結果
pub fn init_logger(format: LogFormat, level: &str, verbose: bool) {
    let filter = lookup_filter(level, verbose);
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_file(false)
        .with_line_number(false);

    match format {
        LogFormat::Compact => tracing_subscriber::registry()
            .with(filter)
            .with(layer.compact())
            .init(),
        LogFormat::Json => tracing_subscriber::registry()
            .with(filter)
            .with(layer.json().flatten_event(true))
            .init(),
    }
}

pub fn init_cli_logger(verbose: bool) {
    init_logger(LogFormat::Compact, "info", verbose);
}
