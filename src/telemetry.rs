//! 日志初始化
//! 认证结果按策略记录，提供方 HTTP 客户端的噪声默认压低

use crate::config::LoggingConfig;
use tracing_subscriber::{
    fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer,
};

/// 与提供方通信的底层库只保留警告
const QUIET_TARGETS: [&str; 3] = ["hyper_util=warn", "reqwest=warn", "rustls=warn"];

/// RUST_LOG 优先；否则使用配置级别并压低 HTTP 客户端日志
fn build_filter(level: &str) -> EnvFilter {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return filter;
    }

    QUIET_TARGETS
        .iter()
        .filter_map(|directive| directive.parse().ok())
        .fold(EnvFilter::new(level), |filter, directive| {
            filter.add_directive(directive)
        })
}

pub fn init_telemetry(config: &LoggingConfig) {
    let filter = build_filter(&config.level);

    let layer = if config.format.eq_ignore_ascii_case("pretty") {
        tracing_subscriber::fmt::layer()
            .pretty()
            .with_target(true)
            .boxed()
    } else {
        // 每个请求 span 关闭时输出一次，带上 trace_id 便于串联回调链路
        tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .with_span_events(FmtSpan::CLOSE)
            .boxed()
    };

    tracing_subscriber::registry().with(filter).with(layer).init();

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        level = %config.level,
        format = %config.format,
        "authgate telemetry ready"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_filter_quiets_http_client() {
        std::env::remove_var("RUST_LOG");

        let filter = build_filter("debug").to_string().to_lowercase();
        assert!(filter.contains("debug"));
        for directive in QUIET_TARGETS {
            assert!(filter.contains(directive), "missing {}", directive);
        }
    }
}
