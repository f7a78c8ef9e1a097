//! 配置系统
//! 从环境变量加载所有配置，使用 Secret 包装敏感信息

use crate::models::StrategyName;
use config::{Config, ConfigError, Environment};
use secrecy::Secret;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址，例如 "0.0.0.0:3000"
    pub addr: String,
    /// 优雅关闭超时时间（秒）
    pub graceful_shutdown_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// 日志级别: trace, debug, info, warn, error
    pub level: String,
    /// 日志格式: json, pretty
    pub format: String,
}

/// 单个 OAuth 提供方的客户端凭据
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderCredentials {
    pub client_id: String,
    /// Kakao 允许不配置 client secret
    pub client_secret: Option<Secret<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OAuthConfig {
    /// 回调地址前缀，最终地址为 <base>/auth/<provider>/callback
    pub callback_base_url: String,
    /// 与提供方通信的超时时间（秒）
    pub http_timeout_secs: u64,
    pub google: Option<ProviderCredentials>,
    pub facebook: Option<ProviderCredentials>,
    pub kakao: Option<ProviderCredentials>,
    pub naver: Option<ProviderCredentials>,
}

impl OAuthConfig {
    /// 获取提供方凭据，未配置时返回 None
    pub fn credentials(&self, name: StrategyName) -> Option<&ProviderCredentials> {
        match name {
            StrategyName::Google => self.google.as_ref(),
            StrategyName::Facebook => self.facebook.as_ref(),
            StrategyName::Kakao => self.kakao.as_ref(),
            StrategyName::Naver => self.naver.as_ref(),
            StrategyName::Basic | StrategyName::Bearer => None,
        }
    }

    /// 提供方回调地址
    pub fn callback_url(&self, name: StrategyName) -> String {
        format!(
            "{}/auth/{}/callback",
            self.callback_base_url.trim_end_matches('/'),
            name
        )
    }
}

/// 启动时写入内存用户目录的密码账户（可选）
#[derive(Debug, Clone, Deserialize)]
pub struct BootstrapAccount {
    pub username: String,
    pub password: Secret<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub oauth: OAuthConfig,
    pub bootstrap: Option<BootstrapAccount>,
}

impl AppConfig {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut settings = Config::builder();

        // 添加默认配置
        settings = settings
            .set_default("server.addr", "0.0.0.0:3000")?
            .set_default("server.graceful_shutdown_timeout_secs", 30)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("oauth.callback_base_url", "http://localhost:3000")?
            .set_default("oauth.http_timeout_secs", 10)?;

        // 从环境变量加载配置（前缀为 AUTHGATE_）
        settings = settings.add_source(
            Environment::with_prefix("AUTHGATE")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        // 提供方凭据沿用无前缀的变量名，例如 GOOGLE_CLIENT_ID
        // 没有 client id（或为空）时整个提供方视为未配置，单独的 secret 被忽略
        for name in StrategyName::OAUTH {
            let upper = name.as_str().to_uppercase();
            let Some(client_id) = plain_env(&format!("{}_CLIENT_ID", upper)) else {
                continue;
            };
            settings = settings
                .set_override(format!("oauth.{}.client_id", name), client_id)?
                .set_override_option(
                    format!("oauth.{}.client_secret", name),
                    plain_env(&format!("{}_CLIENT_SECRET", upper)),
                )?;
        }

        let config: AppConfig = settings.build()?.try_deserialize()?;

        // 验证配置
        config.validate()?;

        Ok(config)
    }

    /// 验证配置合法性
    pub fn validate(&self) -> Result<(), ConfigError> {
        // 验证日志级别
        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log level: {}. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        // 验证日志格式
        match self.logging.format.to_lowercase().as_str() {
            "json" | "pretty" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid log format: {}. Must be one of: json, pretty",
                    self.logging.format
                )))
            }
        }

        // 回调地址必须是绝对的 http(s) URL
        match url::Url::parse(&self.oauth.callback_base_url) {
            Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
            _ => {
                return Err(ConfigError::Message(format!(
                    "Invalid callback base URL: {}",
                    self.oauth.callback_base_url
                )))
            }
        }

        if self.oauth.http_timeout_secs == 0 {
            return Err(ConfigError::Message(
                "http_timeout_secs must be greater than 0".to_string(),
            ));
        }

        for name in StrategyName::OAUTH {
            if let Some(credentials) = self.oauth.credentials(name) {
                if credentials.client_id.trim().is_empty() {
                    return Err(ConfigError::Message(format!(
                        "{} client id must not be empty",
                        name
                    )));
                }
            }
        }

        Ok(())
    }
}

/// 读取环境变量，空白值按未设置处理
fn plain_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
