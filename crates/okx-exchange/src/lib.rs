//! OKX 거래소 연결.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - `OkxApi` trait: 도구 디스패처가 사용하는 거래소 인터페이스
//! - OKX v5 REST 커넥터 (HMAC-SHA256 서명, base64 인코딩)
//! - 거래소 에러 코드를 네 가지 도구 에러 종류로 매핑

pub mod connector;
pub mod error;
pub mod traits;

pub use connector::*;
pub use error::*;
pub use traits::*;
