//! OKX MCP 도구 서버.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - 정적 도구 레지스트리 (`get_balance`, `get_ticker`, `get_kline`, `create_order`)
//! - 인자 검증 및 결과 봉투를 담당하는 디스패처
//! - `rmcp` 기반 MCP 서버 (stdio, SSE)

pub mod dispatcher;
pub mod handlers;
pub mod registry;
pub mod server;

pub use dispatcher::{Dispatcher, ToolFailure, ToolResult, UnknownTool};
pub use registry::{find_tool, JsonObject, ParamKind, ParamSpec, ToolArgs, ToolSpec, TOOLS};
pub use server::{OkxMcpServer, DEFAULT_SSE_BIND, SSE_MESSAGE_PATH, SSE_PATH};
