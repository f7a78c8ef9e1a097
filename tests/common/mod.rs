//! 测试公共模块
//! 提供记录调用的用户服务、桩 OAuth 客户端和测试路由

#![allow(dead_code)]

use async_trait::async_trait;
use authgate::{
    auth::{
        Authenticator, BasicStrategy, OAuth2Strategy, OAuthClient, OAuthGrant, StrategyError,
    },
    config::{AppConfig, LoggingConfig, OAuthConfig, ServerConfig},
    middleware::AppState,
    models::{Credentials, OAuthProfile, Provider, ProviderTokens, StrategyName},
    routes,
    services::{CertificationError, UserService},
};
use axum::{body::Body, http::Request, Router};
use http_body_util::BodyExt;
use secrecy::Secret;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use url::Url;

/// 测试用户
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestUser {
    pub id: String,
    pub provider: String,
}

/// 用户服务的固定行为
#[derive(Clone, Copy)]
pub enum Behavior {
    Accept,
    Reject,
}

/// 记录每次 certification 调用的用户服务
pub struct RecordingUserService {
    behavior: Behavior,
    calls: Mutex<Vec<(Credentials, Provider)>>,
}

impl RecordingUserService {
    pub fn new(behavior: Behavior) -> Arc<Self> {
        Arc::new(Self {
            behavior,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<(Credentials, Provider)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn user_for(provider: Provider) -> TestUser {
        TestUser {
            id: format!("{}-user", provider),
            provider: provider.to_string(),
        }
    }
}

#[async_trait]
impl UserService for RecordingUserService {
    type User = TestUser;

    async fn certification(
        &self,
        credentials: Credentials,
        provider: Provider,
    ) -> Result<TestUser, CertificationError> {
        self.calls.lock().unwrap().push((credentials, provider));
        match self.behavior {
            Behavior::Accept => Ok(Self::user_for(provider)),
            Behavior::Reject => Err(CertificationError::InvalidCredentials),
        }
    }
}

/// 桩 OAuth 客户端：不访问网络，记录请求的 scope
pub struct StubOAuthClient {
    name: StrategyName,
    scopes: Mutex<Vec<Vec<String>>>,
}

/// 触发交换失败的授权码
pub const BAD_CODE: &str = "bad-code";

impl StubOAuthClient {
    pub fn new(name: StrategyName) -> Arc<Self> {
        Arc::new(Self {
            name,
            scopes: Mutex::new(Vec::new()),
        })
    }

    pub fn requested_scopes(&self) -> Vec<Vec<String>> {
        self.scopes.lock().unwrap().clone()
    }

    pub fn profile_for(name: StrategyName) -> OAuthProfile {
        OAuthProfile {
            provider: name.provider().unwrap(),
            id: format!("{}-profile-id", name),
            display_name: Some("Test Person".to_string()),
            emails: vec![format!("person@{}.example", name)],
            photos: vec![],
            raw: serde_json::json!({ "id": format!("{}-profile-id", name) }),
        }
    }
}

#[async_trait]
impl OAuthClient for StubOAuthClient {
    fn authorize_url(&self, scope: &[String]) -> Result<Url, StrategyError> {
        self.scopes.lock().unwrap().push(scope.to_vec());

        let mut url = Url::parse(&format!("https://{}.provider.test/authorize", self.name))
            .map_err(|e| StrategyError::InvalidRequest(e.to_string()))?;
        if !scope.is_empty() {
            url.query_pairs_mut().append_pair("scope", &scope.join(" "));
        }
        Ok(url)
    }

    async fn exchange(&self, code: &str, _state: Option<&str>) -> Result<OAuthGrant, StrategyError> {
        if code == BAD_CODE {
            return Err(StrategyError::Exchange("invalid_grant".to_string()));
        }

        Ok(OAuthGrant {
            tokens: ProviderTokens {
                access_token: Secret::new(format!("{}-access", code)),
                refresh_token: None,
            },
            profile: Self::profile_for(self.name),
        })
    }
}

/// 创建测试配置
pub fn create_test_config() -> AppConfig {
    AppConfig {
        server: ServerConfig {
            addr: "127.0.0.1:0".to_string(), // 使用随机端口
            graceful_shutdown_timeout_secs: 5,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
            format: "pretty".to_string(),
        },
        oauth: OAuthConfig {
            callback_base_url: "http://localhost:3000".to_string(),
            http_timeout_secs: 5,
            google: None,
            facebook: None,
            kakao: None,
            naver: None,
        },
        bootstrap: None,
    }
}

/// 测试环境：路由 + 可检查的协作者
pub struct TestApp {
    pub router: Router,
    pub authenticator: Arc<Authenticator<TestUser>>,
    pub user_service: Arc<RecordingUserService>,
    pub clients: Vec<(StrategyName, Arc<StubOAuthClient>)>,
}

impl TestApp {
    pub fn client(&self, name: StrategyName) -> Arc<StubOAuthClient> {
        self.clients
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, c)| c.clone())
            .unwrap()
    }
}

/// 注册 basic 和全部 OAuth 策略（使用桩客户端）
pub fn create_test_authenticator(
    user_service: Arc<RecordingUserService>,
) -> (Authenticator<TestUser>, Vec<(StrategyName, Arc<StubOAuthClient>)>) {
    let mut authenticator = Authenticator::new();
    authenticator.use_strategy(BasicStrategy::new(user_service.clone()));

    let mut clients = Vec::new();
    for name in StrategyName::OAUTH {
        let client = StubOAuthClient::new(name);
        let strategy = OAuth2Strategy::new(name, client.clone(), user_service.clone()).unwrap();
        authenticator.use_strategy(strategy);
        clients.push((name, client));
    }

    (authenticator, clients)
}

pub fn create_test_app(behavior: Behavior) -> TestApp {
    let user_service = RecordingUserService::new(behavior);
    let (authenticator, clients) = create_test_authenticator(user_service.clone());
    let authenticator = Arc::new(authenticator);

    let state = Arc::new(AppState {
        config: create_test_config(),
        authenticator: authenticator.clone(),
    });

    TestApp {
        router: routes::create_router(state),
        authenticator,
        user_service,
        clients,
    }
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder().method("GET").uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
