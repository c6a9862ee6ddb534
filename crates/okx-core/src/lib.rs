//! # OKX Core
//!
//! OKX MCP 브리지의 핵심 도메인 모델 및 공통 인프라를 제공합니다.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 심볼, 캔들 주기, 소수 문자열 등 검증된 입력 타입
//! - 잔고, 시세, 캔들, 주문 응답 도메인 구조체
//! - 설정 및 자격증명 로딩
//! - 로깅 인프라

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
