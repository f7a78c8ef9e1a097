//! 认证网关库
//! 将用户名/密码与 OAuth2 提供方认证接入 axum 请求管道

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod telemetry;
