//! 브리지 공통 에러 타입.

use thiserror::Error;

/// 설정 로딩 및 입력 검증 에러.
#[derive(Debug, Error)]
pub enum CoreError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 필수 자격증명 누락 (변수 이름만 담고 값은 담지 않음)
    #[error("자격증명 누락: {0} 가 설정되지 않았거나 비어 있습니다")]
    MissingCredential(&'static str),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 코어 작업을 위한 Result 타입.
pub type CoreResult<T> = Result<T, CoreError>;

impl CoreError {
    /// 호출자 입력 문제로 발생한 에러인지 확인합니다.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, CoreError::InvalidInput(_))
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for CoreError {
    fn from(err: config::ConfigError) -> Self {
        CoreError::Config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_names_variable_only() {
        let err = CoreError::MissingCredential("SECRET_KEY");
        let msg = err.to_string();
        assert!(msg.contains("SECRET_KEY"));
        assert!(!err.is_invalid_input());
    }

    #[test]
    fn test_invalid_input() {
        let err = CoreError::InvalidInput("instId is empty".to_string());
        assert!(err.is_invalid_input());
    }
}
