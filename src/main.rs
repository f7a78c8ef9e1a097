//! 认证网关主入口

use authgate::{
    auth,
    config::AppConfig,
    handlers::health,
    middleware::AppState,
    routes,
    services::InMemoryUserService,
    telemetry,
};
use secrecy::ExposeSecret;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::signal;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ===== CLI 参数处理 =====
    let args: Vec<String> = std::env::args().collect();

    if args.len() > 1 {
        match args[1].as_str() {
            "--version" => {
                println!("authgate {}", env!("CARGO_PKG_VERSION"));
                return Ok(());
            }
            "--help" => {
                print_help();
                return Ok(());
            }
            _ => {
                eprintln!("未知参数: {}", args[1]);
                print_help();
                std::process::exit(1);
            }
        }
    }

    // 加载 .env 文件（开发环境）
    // 按优先级加载：.env.local > .env
    dotenv::from_filename(".env.local").ok();
    dotenv::dotenv().ok();

    // 设置应用启动时间
    health::set_start_time();

    // 1. 加载配置
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        anyhow::anyhow!("Failed to load configuration: {}", e)
    })?;

    // 2. 初始化日志
    telemetry::init_telemetry(&config.logging);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Auth gateway starting...");

    // 3. 用户目录
    let user_service = Arc::new(InMemoryUserService::new());
    if let Some(account) = &config.bootstrap {
        user_service
            .register_password_account(&account.username, account.password.expose_secret())
            .await?;
        tracing::info!(username = %account.username, "Bootstrap account registered");
    }

    // 4. 注册认证策略
    let authenticator = Arc::new(auth::configure(&config.oauth, user_service)?);

    let app_state = Arc::new(AppState {
        config: config.clone(),
        authenticator,
    });

    // 5. 构建路由
    let app = routes::create_router(app_state);

    // 6. 启动服务器
    let addr = &config.server.addr;
    let listener = TcpListener::bind(addr).await?;

    tracing::info!(addr = %addr, "Server listening");

    // 7. 优雅关闭，超时后强制退出
    let shutdown_timeout = Duration::from_secs(config.server.graceful_shutdown_timeout_secs);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown_timeout))
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

/// 优雅关闭信号处理
async fn shutdown_signal(timeout: Duration) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install signal handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Ctrl+C received, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Terminate signal received, starting graceful shutdown");
        },
    }

    tokio::spawn(async move {
        tokio::time::sleep(timeout).await;
        tracing::warn!("Graceful shutdown timeout reached, forcing exit");
        std::process::exit(1);
    });
}

/// 打印帮助信息
fn print_help() {
    println!("authgate {}", env!("CARGO_PKG_VERSION"));
    println!();
    println!("用法: authgate [选项]");
    println!();
    println!("选项:");
    println!("  --version     打印版本信息并退出");
    println!("  --help        打印此帮助信息并退出");
    println!();
    println!("环境变量:");
    println!("  AUTHGATE_SERVER__ADDR              监听地址（默认 0.0.0.0:3000）");
    println!("  AUTHGATE_OAUTH__CALLBACK_BASE_URL  回调地址前缀（默认 http://localhost:3000）");
    println!("  GOOGLE_CLIENT_ID / GOOGLE_CLIENT_SECRET");
    println!("  FACEBOOK_CLIENT_ID / FACEBOOK_CLIENT_SECRET");
    println!("  KAKAO_CLIENT_ID / KAKAO_CLIENT_SECRET");
    println!("  NAVER_CLIENT_ID / NAVER_CLIENT_SECRET");
}
