//! OKX 요청 서명.
//!
//! 서명 대상 문자열(prehash):
//! `timestamp + METHOD + requestPath(쿼리 포함) + body`
//!
//! 서명: `base64(HMAC-SHA256(secret_key, prehash))`
//!
//! 타임스탬프와 서명은 요청마다 새로 만들며 재사용하지 않습니다.
//! 거래소는 허용 범위(수 초)를 벗어난 타임스탬프를 거부하고,
//! 클라이언트는 시계 오차를 보정하지 않습니다.

use base64::Engine;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use okx_core::Credentials;
use reqwest::Method;
use sha2::Sha256;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// API 키 헤더.
pub const HEADER_ACCESS_KEY: &str = "OK-ACCESS-KEY";
/// 서명 헤더.
pub const HEADER_ACCESS_SIGN: &str = "OK-ACCESS-SIGN";
/// 타임스탬프 헤더.
pub const HEADER_ACCESS_TIMESTAMP: &str = "OK-ACCESS-TIMESTAMP";
/// 패스프레이즈 헤더.
pub const HEADER_ACCESS_PASSPHRASE: &str = "OK-ACCESS-PASSPHRASE";
/// 모의투자 헤더.
pub const HEADER_SIMULATED_TRADING: &str = "x-simulated-trading";

/// OKX 타임스탬프 형식 (`2024-06-07T12:34:56.789Z`).
pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S%.3fZ").to_string()
}

/// 서명이 끝난 단일 요청.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedRequest {
    /// HTTP 메서드
    pub method: Method,
    /// 쿼리 문자열을 포함한 요청 경로
    pub request_path: String,
    /// 요청 본문 (GET은 빈 문자열)
    pub body: String,
    /// 서명에 사용한 타임스탬프
    pub timestamp: String,
    /// base64 서명
    pub signature: String,
}

/// 자격증명을 보관하고 요청을 서명합니다.
#[derive(Debug, Clone)]
pub struct OkxSigner {
    credentials: Arc<Credentials>,
}

impl OkxSigner {
    /// 새 서명기 생성.
    pub fn new(credentials: Arc<Credentials>) -> Self {
        Self { credentials }
    }

    /// 자격증명 참조.
    pub fn credentials(&self) -> &Credentials {
        &self.credentials
    }

    /// 서명 대상 문자열 생성.
    pub fn prehash(timestamp: &str, method: &str, request_path: &str, body: &str) -> String {
        format!(
            "{}{}{}{}",
            timestamp,
            method.to_uppercase(),
            request_path,
            body
        )
    }

    /// prehash를 HMAC-SHA256으로 서명하고 base64로 인코딩.
    pub fn sign(&self, timestamp: &str, method: &str, request_path: &str, body: &str) -> String {
        let prehash = Self::prehash(timestamp, method, request_path, body);
        let mut mac = HmacSha256::new_from_slice(self.credentials.secret_key().as_bytes())
            .expect("HMAC accepts keys of any length");
        mac.update(prehash.as_bytes());
        base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
    }

    /// 주어진 타임스탬프로 요청 하나를 서명합니다.
    pub fn sign_request(
        &self,
        method: Method,
        request_path: &str,
        body: &str,
        timestamp: String,
    ) -> SignedRequest {
        let signature = self.sign(&timestamp, method.as_str(), request_path, body);
        SignedRequest {
            method,
            request_path: request_path.to_string(),
            body: body.to_string(),
            timestamp,
            signature,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signer(secret: &str) -> OkxSigner {
        OkxSigner::new(Arc::new(
            Credentials::new("test-api-key", secret, "test-passphrase").unwrap(),
        ))
    }

    #[test]
    fn test_format_timestamp_millis() {
        let at = Utc.with_ymd_and_hms(2024, 6, 7, 12, 34, 56).unwrap()
            + chrono::Duration::milliseconds(789);
        assert_eq!(format_timestamp(at), "2024-06-07T12:34:56.789Z");

        let whole = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        assert_eq!(format_timestamp(whole), "2024-01-02T03:04:05.000Z");
    }

    #[test]
    fn test_prehash_layout() {
        assert_eq!(
            OkxSigner::prehash("2024-06-07T12:34:56.789Z", "get", "/api/v5/account/balance", ""),
            "2024-06-07T12:34:56.789ZGET/api/v5/account/balance"
        );
    }

    #[test]
    fn test_sign_get() {
        let signature = signer("secret").sign(
            "2024-06-07T12:34:56.789Z",
            "GET",
            "/api/v5/account/balance",
            "",
        );
        assert_eq!(signature, "DTRlw0yHWRQaMcdtA8+yGGHqMWmyRkW2/57di3XlOZ0=");
    }

    #[test]
    fn test_sign_get_with_query() {
        let signature = signer("22582BD0CFF14C41EDBF1AB98506286D").sign(
            "2020-12-08T09:08:57.715Z",
            "GET",
            "/api/v5/account/balance?ccy=BTC",
            "",
        );
        assert_eq!(signature, "HiZhvSfMtWJA3uUIVXV3a/bSXNPCWvYFXoGCVS8V4zY=");
    }

    #[test]
    fn test_sign_post_body() {
        let body = r#"{"instId":"BTC-USDT","tdMode":"cash","side":"buy","ordType":"market","sz":"0.001"}"#;
        let signed = signer("secret").sign_request(
            Method::POST,
            "/api/v5/trade/order",
            body,
            "2024-06-07T12:34:56.789Z".to_string(),
        );

        assert_eq!(signed.signature, "ujoFB7nNZJrLUXH73i3gbW4hThJfI+CHu2giDYv8WnQ=");
        assert_eq!(signed.body, body);
        assert_eq!(signed.method, Method::POST);
    }

    #[test]
    fn test_signature_depends_on_secret() {
        let a = signer("secret-a").sign("t", "GET", "/p", "");
        let b = signer("secret-b").sign("t", "GET", "/p", "");
        assert_ne!(a, b);
    }
}
