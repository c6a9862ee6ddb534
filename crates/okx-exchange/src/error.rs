//! 거래소 에러 타입.
//!
//! 내부 에러 변형은 도구 호출자에게 네 가지 종류(`ErrorKind`)로만 노출됩니다.

use okx_core::CoreError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// 도구 호출자에게 노출되는 에러 분류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ErrorKind {
    /// 로컬 검증 실패 - 거래소에 요청하지 않음
    InvalidArgument,
    /// 서명/타임스탬프/자격증명 거부
    AuthError,
    /// 전송 계층 실패 (타임아웃, 연결 거부, DNS)
    NetworkError,
    /// 거래소가 정상 형식의 실패 응답을 반환
    ExchangeError,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::AuthError => "AuthError",
            ErrorKind::NetworkError => "NetworkError",
            ErrorKind::ExchangeError => "ExchangeError",
        };
        f.write_str(name)
    }
}

/// 거래소 관련 에러.
#[derive(Debug, Error)]
pub enum ExchangeError {
    /// 잘못된 호출 인자
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// 인증/권한 에러
    #[error("Unauthorized: {message}")]
    Unauthorized {
        code: Option<String>,
        message: String,
    },

    /// 네트워크/연결 에러
    #[error("Network error: {0}")]
    NetworkError(String),

    /// 타임아웃
    #[error("Request timeout: {0}")]
    Timeout(String),

    /// 거래소 API 에러 코드
    #[error("API error {code}: {message}")]
    ApiError { code: String, message: String },

    /// 파싱/역직렬화 에러
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl ExchangeError {
    /// 호출자에게 노출할 에러 분류.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ExchangeError::InvalidArgument(_) => ErrorKind::InvalidArgument,
            ExchangeError::Unauthorized { .. } => ErrorKind::AuthError,
            ExchangeError::NetworkError(_) | ExchangeError::Timeout(_) => ErrorKind::NetworkError,
            ExchangeError::ApiError { .. } | ExchangeError::ParseError(_) => {
                ErrorKind::ExchangeError
            }
        }
    }

    /// 거래소 에러 코드 (있는 경우).
    pub fn code(&self) -> Option<&str> {
        match self {
            ExchangeError::ApiError { code, .. } => Some(code),
            ExchangeError::Unauthorized { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// 사람이 읽을 메시지 (분류 접두사 없이).
    pub fn message(&self) -> &str {
        match self {
            ExchangeError::InvalidArgument(m)
            | ExchangeError::NetworkError(m)
            | ExchangeError::Timeout(m)
            | ExchangeError::ParseError(m) => m,
            ExchangeError::Unauthorized { message, .. } | ExchangeError::ApiError { message, .. } => {
                message
            }
        }
    }

    /// 인증 에러인지 확인.
    pub fn is_auth_error(&self) -> bool {
        self.kind() == ErrorKind::AuthError
    }

    /// 요청이 거래소에 도달했는지 알 수 없는 에러인지 확인.
    ///
    /// 주문 요청에서 이 에러가 나면 주문이 접수되었을 수도 있습니다.
    pub fn is_outcome_unknown(&self) -> bool {
        self.kind() == ErrorKind::NetworkError
    }
}

impl From<reqwest::Error> for ExchangeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ExchangeError::Timeout(err.to_string())
        } else {
            ExchangeError::NetworkError(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ExchangeError {
    fn from(err: serde_json::Error) -> Self {
        ExchangeError::ParseError(err.to_string())
    }
}

impl From<CoreError> for ExchangeError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidInput(msg) => ExchangeError::InvalidArgument(msg),
            CoreError::Serialization(msg) => ExchangeError::ParseError(msg),
            CoreError::MissingCredential(name) => ExchangeError::Unauthorized {
                code: None,
                message: format!("{} is not configured", name),
            },
            CoreError::Config(msg) => ExchangeError::InvalidArgument(msg),
        }
    }
}
