//! 도구 디스패처.
//!
//! 호출 하나 = 검증 → 클라이언트 작업 한 번 → 결과 봉투.
//! 호출 사이에 공유하는 상태는 읽기 전용 클라이언트뿐이며 캐시하지 않습니다.

use crate::registry::{find_tool, JsonObject, ToolSpec, TOOLS};
use okx_exchange::{ErrorKind, ExchangeError, OkxApi};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn, Instrument};

/// 등록되지 않은 도구 이름 (프로토콜 수준 에러).
#[derive(Debug, Error)]
#[error("Unknown tool: {0}")]
pub struct UnknownTool(pub String);

/// 도구 실패 정보.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolFailure {
    /// 에러 분류
    pub kind: ErrorKind,
    /// 거래소 에러 코드
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// 메시지
    pub message: String,
}

impl From<&ExchangeError> for ToolFailure {
    fn from(err: &ExchangeError) -> Self {
        Self {
            kind: err.kind(),
            code: err.code().map(str::to_string),
            message: err.message().to_string(),
        }
    }
}

/// 도구 호출 결과.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    /// 클라이언트 결과
    Success(Value),
    /// 분류된 실패
    Failure(ToolFailure),
}

impl ToolResult {
    /// 실패 여부.
    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Failure(_))
    }

    /// 실패 정보.
    pub fn failure(&self) -> Option<&ToolFailure> {
        match self {
            ToolResult::Failure(failure) => Some(failure),
            ToolResult::Success(_) => None,
        }
    }

    /// 응답 봉투 JSON. 실패는 `{"error": {...}}`.
    pub fn to_json(&self) -> Value {
        match self {
            ToolResult::Success(value) => value.clone(),
            ToolResult::Failure(failure) => json!({ "error": failure }),
        }
    }

    /// 도구 응답 텍스트 (보기 좋게 들여쓴 JSON).
    pub fn to_text(&self) -> String {
        let value = self.to_json();
        serde_json::to_string_pretty(&value).unwrap_or_else(|_| value.to_string())
    }
}

/// 정적 레지스트리로 도구 호출을 클라이언트에 연결합니다.
#[derive(Clone)]
pub struct Dispatcher {
    api: Arc<dyn OkxApi>,
}

impl Dispatcher {
    /// 새 디스패처 생성.
    pub fn new(api: Arc<dyn OkxApi>) -> Self {
        Self { api }
    }

    /// 등록된 도구 목록.
    pub fn tools(&self) -> &'static [ToolSpec] {
        &TOOLS
    }

    /// 도구를 호출합니다.
    ///
    /// 검증 실패는 거래소에 요청하지 않고 `InvalidArgument` 실패로 반환합니다.
    /// 거래소/네트워크 에러도 실패 결과로 감싸며, 재시도하지 않습니다.
    ///
    /// # Errors
    /// 등록되지 않은 도구 이름이면 `UnknownTool`을 반환합니다.
    pub async fn call(
        &self,
        name: &str,
        args: Option<JsonObject>,
    ) -> Result<ToolResult, UnknownTool> {
        let tool = find_tool(name).ok_or_else(|| UnknownTool(name.to_string()))?;
        let span = okx_core::tool_span!(tool.name);

        async move {
            let outcome = match tool.validate(args.as_ref()) {
                Ok(args) => {
                    if let Some(inst_id) = args.text("instId") {
                        tracing::Span::current().record("inst_id", inst_id);
                    }
                    (tool.handler())(&*self.api, args).await
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(value) => {
                    debug!("Tool call succeeded");
                    Ok(ToolResult::Success(value))
                }
                Err(e) => {
                    match e.kind() {
                        ErrorKind::InvalidArgument => debug!("Rejected arguments: {}", e),
                        kind => warn!(%kind, "Tool call failed: {}", e),
                    }
                    Ok(ToolResult::Failure(ToolFailure::from(&e)))
                }
            }
        }
        .instrument(span)
        .await
    }
}
