//! MCP 서버 핸들러.
//!
//! `tools/list`는 레지스트리에서, `tools/call`은 디스패처로 처리합니다.
//! 전송은 stdio 또는 SSE(HTTP)입니다. stdio에서 stdout은 프로토콜 메시지
//! 전용이므로 로그는 모두 stderr로 보냅니다.

use crate::dispatcher::Dispatcher;
use crate::registry::{ToolSpec, TOOLS};
use rmcp::model::{
    CallToolRequestParam, CallToolResult, Content, Implementation, ListToolsResult,
    PaginatedRequestParam, ServerCapabilities, ServerInfo, Tool,
};
use rmcp::service::RequestContext;
use rmcp::transport::sse_server::{SseServer, SseServerConfig};
use rmcp::{ErrorData as McpError, RoleServer, ServerHandler, ServiceExt};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// SSE 스트림 경로.
pub const SSE_PATH: &str = "/sse";

/// SSE 세션의 클라이언트 메시지 POST 경로.
pub const SSE_MESSAGE_PATH: &str = "/messages/";

/// SSE 기본 바인드 주소.
pub const DEFAULT_SSE_BIND: &str = "127.0.0.1:8000";

const INSTRUCTIONS: &str = "OKX exchange tools. get_balance, get_ticker and get_kline are read-only. \
create_order places a real order (or a demo order when simulated trading is enabled) and is not \
idempotent: after a NetworkError check open orders before resubmitting.";

/// OKX MCP 서버.
#[derive(Clone)]
pub struct OkxMcpServer {
    dispatcher: Arc<Dispatcher>,
}

impl OkxMcpServer {
    /// 새 서버 생성.
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }

    /// 레지스트리의 도구 정의를 MCP `Tool`로 변환.
    pub fn tool_definitions() -> Vec<Tool> {
        TOOLS.iter().map(to_mcp_tool).collect()
    }

    /// stdio 전송으로 서버를 실행하고 클라이언트 연결이 끝날 때까지 기다립니다.
    pub async fn serve_stdio(self) -> anyhow::Result<()> {
        info!("Starting OKX MCP server on stdio");

        let service = self.serve(rmcp::transport::stdio()).await?;
        info!("MCP server ready");

        service.waiting().await?;
        info!("MCP server shutdown complete");

        Ok(())
    }

    /// SSE 전송으로 서버를 시작하고 실제 바인드 주소를 반환합니다.
    ///
    /// 연결(세션)마다 같은 디스패처를 공유하는 핸들러가 붙습니다.
    /// 반환된 토큰을 취소하면 HTTP 서버와 모든 세션이 종료됩니다.
    pub async fn start_sse(
        self,
        bind: SocketAddr,
    ) -> anyhow::Result<(SocketAddr, CancellationToken)> {
        let listener = tokio::net::TcpListener::bind(bind).await?;
        let local_addr = listener.local_addr()?;
        let ct = CancellationToken::new();

        let (sse_server, router) = SseServer::new(SseServerConfig {
            bind: local_addr,
            sse_path: SSE_PATH.to_string(),
            post_path: SSE_MESSAGE_PATH.to_string(),
            ct: ct.clone(),
            sse_keep_alive: None,
        });

        let shutdown = ct.child_token();
        tokio::spawn(async move {
            let result = axum::serve(listener, router)
                .with_graceful_shutdown(async move { shutdown.cancelled().await })
                .await;
            if let Err(e) = result {
                error!("SSE server stopped with error: {}", e);
            }
        });

        sse_server.with_service(move || self.clone());
        info!(
            "OKX MCP server listening on http://{}{} (messages: {})",
            local_addr, SSE_PATH, SSE_MESSAGE_PATH
        );

        Ok((local_addr, ct))
    }

    /// SSE 전송으로 서버를 실행하고 Ctrl-C를 받을 때까지 기다립니다.
    pub async fn serve_sse(self, bind: SocketAddr) -> anyhow::Result<()> {
        let (_, ct) = self.start_sse(bind).await?;

        tokio::signal::ctrl_c().await?;
        info!("Shutdown signal received");
        ct.cancel();

        info!("MCP server shutdown complete");
        Ok(())
    }
}

fn to_mcp_tool(spec: &ToolSpec) -> Tool {
    Tool::new(spec.name, spec.description, Arc::new(spec.input_schema()))
}

impl ServerHandler for OkxMcpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(INSTRUCTIONS.to_string()),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self,
        _request: Option<PaginatedRequestParam>,
        _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, McpError> {
        Ok(ListToolsResult::with_all_items(Self::tool_definitions()))
    }

    async fn call_tool(
        &self,
        request: CallToolRequestParam,
        _context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, McpError> {
        let result = self
            .dispatcher
            .call(&request.name, request.arguments)
            .await
            .map_err(|e| McpError::invalid_params(e.to_string(), None))?;

        let content = vec![Content::text(result.to_text())];
        Ok(if result.is_error() {
            CallToolResult::error(content)
        } else {
            CallToolResult::success(content)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use okx_core::Credentials;
    use okx_exchange::{OkxClient, OkxConfig};
    use std::time::Duration;

    fn idle_server() -> OkxMcpServer {
        let credentials = Arc::new(Credentials::new("key", "secret", "pass").unwrap());
        let client = OkxClient::new(
            OkxConfig::default().with_base_url("http://127.0.0.1:9"),
            credentials,
        )
        .unwrap();
        OkxMcpServer::new(Dispatcher::new(Arc::new(client)))
    }

    #[tokio::test]
    async fn test_sse_stream_announces_message_endpoint() {
        let (addr, ct) = idle_server()
            .start_sse("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();
        assert_ne!(addr.port(), 0);

        let mut response = reqwest::get(format!("http://{}{}", addr, SSE_PATH))
            .await
            .unwrap();
        assert!(response.status().is_success());

        // 첫 이벤트는 세션별 메시지 경로
        let mut received = String::new();
        while !received.contains("\n\n") {
            let chunk = tokio::time::timeout(Duration::from_secs(5), response.chunk())
                .await
                .unwrap()
                .unwrap()
                .unwrap();
            received.push_str(&String::from_utf8_lossy(&chunk));
        }
        assert!(received.contains("event: endpoint"));
        assert!(received.contains("/messages/?sessionId="));

        ct.cancel();
    }

    #[tokio::test]
    async fn test_sse_message_without_session_is_rejected() {
        let (addr, ct) = idle_server()
            .start_sse("127.0.0.1:0".parse().unwrap())
            .await
            .unwrap();

        let response = reqwest::Client::new()
            .post(format!("http://{}{}?sessionId=unknown", addr, SSE_MESSAGE_PATH))
            .json(&serde_json::json!({"jsonrpc": "2.0", "id": 1, "method": "ping"}))
            .send()
            .await
            .unwrap();
        assert!(response.status().is_client_error());

        ct.cancel();
    }

    #[test]
    fn test_tool_definitions() {
        let tools = OkxMcpServer::tool_definitions();
        assert_eq!(tools.len(), 4);

        let order = tools.iter().find(|t| t.name == "create_order").unwrap();
        assert_eq!(order.input_schema["type"], "object");
        assert!(order
            .description
            .as_deref()
            .unwrap_or_default()
            .contains("idempotent"));
    }
}
