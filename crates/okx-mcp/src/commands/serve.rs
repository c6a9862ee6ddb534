//! `serve` 명령: MCP 서버 (stdio 또는 SSE).

use okx_core::AppConfig;
use okx_mcp::OkxMcpServer;
use std::net::SocketAddr;

/// MCP 서버를 실행합니다.
///
/// 자격증명 확인은 전송을 열기 전에 끝나므로, 설정 오류는 바로 종료됩니다.
pub async fn run(config: &AppConfig, transport: &str, bind: SocketAddr) -> anyhow::Result<()> {
    let transport = transport.trim().to_lowercase();
    if transport != "stdio" && transport != "sse" {
        anyhow::bail!("Unknown transport '{}', expected 'stdio' or 'sse'", transport);
    }

    let server = OkxMcpServer::new(super::build_dispatcher(config)?);
    if transport == "sse" {
        server.serve_sse(bind).await
    } else {
        server.serve_stdio().await
    }
}
