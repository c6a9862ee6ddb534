//! CLI 명령어 구현 모듈.

pub mod call;
pub mod serve;
pub mod tools;

use anyhow::Context;
use okx_core::{AppConfig, Credentials};
use okx_exchange::{OkxApi, OkxClient, OkxConfig};
use okx_mcp::Dispatcher;
use std::sync::Arc;
use tracing::info;

/// 환경 변수의 자격증명으로 클라이언트와 디스패처를 생성합니다.
pub fn build_dispatcher(config: &AppConfig) -> anyhow::Result<Dispatcher> {
    let credentials = Credentials::from_env().context(
        "OKX credentials are not configured (set API_KEY, SECRET_KEY, PASSPHRASE or use --env-file)",
    )?;

    let client = OkxClient::new(OkxConfig::from_settings(&config.okx), Arc::new(credentials))?;

    info!(
        exchange = client.name(),
        base_url = %config.okx.base_url,
        timestamp_source = ?config.okx.timestamp_source,
        "OKX client ready"
    );

    Ok(Dispatcher::new(Arc::new(client)))
}
