//! OKX 거래소 커넥터.
//!
//! OKX v5 REST API 클라이언트. 계좌 잔고, 시세, 캔들, 주문 접수를 지원합니다.
//!
//! # 인증
//!
//! 비공개 엔드포인트는 요청마다 새 타임스탬프로 서명합니다 ([`auth`] 참고).
//! 공개 시장 데이터(시세, 캔들)는 서명 없이 보냅니다.
//!
//! # API 문서
//!
//! 공식 API 문서: <https://www.okx.com/docs-v5/en/>
//!
//! # 사용 예제
//!
//! ```rust,ignore
//! use okx_core::{Credentials, InstrumentId};
//! use okx_exchange::{OkxApi, OkxClient, OkxConfig};
//! use std::sync::Arc;
//!
//! let credentials = Arc::new(Credentials::from_env()?);
//! let client = OkxClient::new(OkxConfig::default(), credentials)?;
//!
//! let ticker = client.get_ticker(&InstrumentId::parse("BTC-USDT")?).await?;
//! println!("last = {}", ticker.last);
//! ```

pub mod auth;
mod types;

pub use auth::{format_timestamp, OkxSigner, SignedRequest};

use crate::traits::{ExchangeResult, OkxApi};
use crate::ExchangeError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use okx_core::{
    BalanceSnapshot, Candle, Credentials, InstrumentId, KlineRequest, OkxSettings, OrderAck,
    OrderRequest, TickerSnapshot, TimestampSource, DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS,
};
use reqwest::{Client, Method, StatusCode};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use auth::{
    HEADER_ACCESS_KEY, HEADER_ACCESS_PASSPHRASE, HEADER_ACCESS_SIGN, HEADER_ACCESS_TIMESTAMP,
    HEADER_SIMULATED_TRADING,
};
use types::{
    candle_from_row, parse_millis, OkxBalance, OkxCandleRow, OkxEnvelope, OkxOrderBody,
    OkxOrderResult, OkxServerTime, OkxTicker,
};

/// 엔드포인트 경로.
pub mod endpoint {
    /// 계좌 잔고 (서명 필요)
    pub const ACCOUNT_BALANCE: &str = "/api/v5/account/balance";
    /// 단일 시세 (공개)
    pub const MARKET_TICKER: &str = "/api/v5/market/ticker";
    /// 캔들 (공개)
    pub const MARKET_CANDLES: &str = "/api/v5/market/candles";
    /// 주문 접수 (서명 필요)
    pub const TRADE_ORDER: &str = "/api/v5/trade/order";
    /// 서버 시간 (공개)
    pub const PUBLIC_TIME: &str = "/api/v5/public/time";
}

/// 인증 관련 에러 코드 범위 (API 키, 패스프레이즈, 타임스탬프, 서명).
const AUTH_ERROR_CODES: std::ops::RangeInclusive<u32> = 50100..=50119;

// ============================================================================
// 설정
// ============================================================================

/// OKX 클라이언트 설정 (비밀 정보 없음).
#[derive(Debug, Clone)]
pub struct OkxConfig {
    /// REST API 기본 URL
    pub base_url: String,
    /// 요청 타임아웃
    pub timeout: Duration,
    /// 모의투자 모드
    pub simulated_trading: bool,
    /// 서명 타임스탬프 소스
    pub timestamp_source: TimestampSource,
}

impl Default for OkxConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            simulated_trading: false,
            timestamp_source: TimestampSource::Local,
        }
    }
}

impl OkxConfig {
    /// 애플리케이션 설정에서 생성.
    pub fn from_settings(settings: &OkxSettings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            timeout: Duration::from_secs(settings.timeout_secs),
            simulated_trading: settings.simulated_trading,
            timestamp_source: settings.timestamp_source,
        }
    }

    /// 기본 URL 설정 (끝의 `/`는 제거).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// 요청 타임아웃 설정.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// 모의투자 모드 설정.
    pub fn with_simulated_trading(mut self, enabled: bool) -> Self {
        self.simulated_trading = enabled;
        self
    }

    /// 타임스탬프 소스 설정.
    pub fn with_timestamp_source(mut self, source: TimestampSource) -> Self {
        self.timestamp_source = source;
        self
    }
}

// ============================================================================
// OKX 클라이언트
// ============================================================================

/// OKX 거래소 클라이언트.
///
/// 읽기 전용 상태만 가지므로 `Arc`로 감싸 동시 호출에 공유할 수 있습니다.
pub struct OkxClient {
    config: OkxConfig,
    client: Client,
    signer: OkxSigner,
}

impl OkxClient {
    /// 새 OKX 클라이언트 생성.
    ///
    /// # Errors
    /// HTTP 클라이언트 생성에 실패하면 `ExchangeError::NetworkError`를 반환합니다.
    pub fn new(config: OkxConfig, credentials: Arc<Credentials>) -> Result<Self, ExchangeError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                ExchangeError::NetworkError(format!("HTTP 클라이언트 생성 실패: {}", e))
            })?;

        Ok(Self {
            config,
            client,
            signer: OkxSigner::new(credentials),
        })
    }

    /// 거래소 서버 시간 조회.
    pub async fn server_time(&self) -> ExchangeResult<DateTime<Utc>> {
        let data: Vec<OkxServerTime> = self.public_get(endpoint::PUBLIC_TIME).await?;
        data.first()
            .and_then(|t| parse_millis(&t.ts))
            .ok_or_else(|| ExchangeError::ParseError("server time missing in response".into()))
    }

    /// 서명용 타임스탬프 생성.
    async fn timestamp(&self) -> ExchangeResult<String> {
        let now = match self.config.timestamp_source {
            TimestampSource::Local => Utc::now(),
            TimestampSource::Server => self.server_time().await?,
        };
        Ok(format_timestamp(now))
    }

    /// 파라미터에서 요청 경로(쿼리 포함) 생성.
    ///
    /// 값은 호출 전에 영숫자/`-`/`,`로 검증되므로 인코딩하지 않습니다.
    /// 서명한 경로와 실제 전송 경로가 바이트 단위로 같아야 합니다.
    fn build_path(endpoint: &str, params: &[(&str, String)]) -> String {
        if params.is_empty() {
            return endpoint.to_string();
        }
        let query = params
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", endpoint, query)
    }

    /// 공개 API 요청 (인증 불필요).
    async fn public_get<T: DeserializeOwned>(&self, request_path: &str) -> ExchangeResult<Vec<T>> {
        let url = format!("{}{}", self.config.base_url, request_path);

        debug!("GET {}", request_path);

        let response = self.client.get(&url).send().await?;
        self.handle_response(response).await
    }

    /// 서명된 GET 요청.
    async fn signed_get<T: DeserializeOwned>(&self, request_path: &str) -> ExchangeResult<Vec<T>> {
        self.send_signed(Method::GET, request_path, String::new())
            .await
    }

    /// 서명된 POST 요청 (JSON 본문).
    async fn signed_post<T: DeserializeOwned>(
        &self,
        request_path: &str,
        body: String,
    ) -> ExchangeResult<Vec<T>> {
        self.send_signed(Method::POST, request_path, body).await
    }

    /// 요청 하나를 서명하고 전송. 재시도하지 않습니다.
    async fn send_signed<T: DeserializeOwned>(
        &self,
        method: Method,
        request_path: &str,
        body: String,
    ) -> ExchangeResult<Vec<T>> {
        let timestamp = self.timestamp().await?;
        let signed = self
            .signer
            .sign_request(method, request_path, &body, timestamp);
        let url = format!("{}{}", self.config.base_url, signed.request_path);

        debug!("{} (signed) {}", signed.method, signed.request_path);

        let credentials = self.signer.credentials();
        let mut builder = self
            .client
            .request(signed.method.clone(), &url)
            .header("Content-Type", "application/json")
            .header(HEADER_ACCESS_KEY, credentials.api_key())
            .header(HEADER_ACCESS_SIGN, &signed.signature)
            .header(HEADER_ACCESS_TIMESTAMP, &signed.timestamp)
            .header(HEADER_ACCESS_PASSPHRASE, credentials.passphrase());

        if self.config.simulated_trading {
            builder = builder.header(HEADER_SIMULATED_TRADING, "1");
        }
        if !signed.body.is_empty() {
            builder = builder.body(signed.body);
        }

        let response = builder.send().await?;
        self.handle_response(response).await
    }

    /// API 응답 처리.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        response: reqwest::Response,
    ) -> ExchangeResult<Vec<T>> {
        let status = response.status();
        let body = response.text().await?;

        let envelope = match serde_json::from_str::<OkxEnvelope>(&body) {
            Ok(envelope) => envelope,
            Err(e) => {
                return Err(if status == StatusCode::UNAUTHORIZED {
                    ExchangeError::Unauthorized {
                        code: None,
                        message: body,
                    }
                } else if status.is_success() {
                    error!("Failed to parse response: {} - Body: {}", e, body);
                    ExchangeError::ParseError(e.to_string())
                } else {
                    ExchangeError::ApiError {
                        code: status.as_u16().to_string(),
                        message: body,
                    }
                });
            }
        };

        if status.is_success() && envelope.is_success() {
            return serde_json::from_value(envelope.data).map_err(|e| {
                error!("Failed to parse response data: {} - Body: {}", e, body);
                ExchangeError::ParseError(e.to_string())
            });
        }

        let (code, message) = envelope
            .item_error()
            .unwrap_or_else(|| (envelope.code(), envelope.msg.clone()));

        let err = if code.is_empty() || code == "0" {
            // HTTP 에러인데 봉투 코드는 성공인 경우
            ExchangeError::ApiError {
                code: status.as_u16().to_string(),
                message: body,
            }
        } else {
            Self::map_error_code(&code, &message)
        };

        if status == StatusCode::UNAUTHORIZED && !err.is_auth_error() {
            return Err(ExchangeError::Unauthorized {
                code: err.code().map(str::to_string),
                message: err.message().to_string(),
            });
        }

        Err(err)
    }

    /// OKX 에러 코드를 ExchangeError로 매핑.
    fn map_error_code(code: &str, msg: &str) -> ExchangeError {
        let is_auth = code
            .parse::<u32>()
            .map(|c| AUTH_ERROR_CODES.contains(&c))
            .unwrap_or(false);

        if is_auth {
            ExchangeError::Unauthorized {
                code: Some(code.to_string()),
                message: msg.to_string(),
            }
        } else {
            ExchangeError::ApiError {
                code: code.to_string(),
                message: msg.to_string(),
            }
        }
    }
}

#[async_trait]
impl OkxApi for OkxClient {
    fn name(&self) -> &str {
        if self.config.simulated_trading {
            "okx-demo"
        } else {
            "okx"
        }
    }

    async fn get_balance(&self, currencies: Option<&[String]>) -> ExchangeResult<BalanceSnapshot> {
        let params: Vec<(&str, String)> = match currencies {
            Some(ccys) if !ccys.is_empty() => vec![("ccy", ccys.join(","))],
            _ => vec![],
        };
        let path = Self::build_path(endpoint::ACCOUNT_BALANCE, &params);

        let data: Vec<OkxBalance> = self.signed_get(&path).await?;

        data.into_iter()
            .next()
            .map(BalanceSnapshot::from)
            .ok_or_else(|| ExchangeError::ParseError("balance missing in response".into()))
    }

    async fn get_ticker(&self, instrument_id: &InstrumentId) -> ExchangeResult<TickerSnapshot> {
        let path = Self::build_path(
            endpoint::MARKET_TICKER,
            &[("instId", instrument_id.to_string())],
        );

        let data: Vec<OkxTicker> = self.public_get(&path).await?;

        data.into_iter().next().map(TickerSnapshot::from).ok_or_else(|| {
            ExchangeError::ParseError(format!("no ticker returned for {}", instrument_id))
        })
    }

    async fn get_kline(&self, request: &KlineRequest) -> ExchangeResult<Vec<Candle>> {
        request.validate()?;

        let mut params = vec![
            ("instId", request.instrument_id.to_string()),
            ("bar", request.bar.as_okx_param()),
            ("limit", request.limit.to_string()),
        ];
        if let Some(after) = &request.after {
            params.push(("after", after.clone()));
        }
        if let Some(before) = &request.before {
            params.push(("before", before.clone()));
        }
        let path = Self::build_path(endpoint::MARKET_CANDLES, &params);

        let rows: Vec<OkxCandleRow> = self.public_get(&path).await?;

        rows.into_iter()
            .map(|row| {
                let raw = row.join(",");
                candle_from_row(row)
                    .ok_or_else(|| ExchangeError::ParseError(format!("malformed candle row: [{}]", raw)))
            })
            .collect()
    }

    async fn create_order(&self, request: &OrderRequest) -> ExchangeResult<OrderAck> {
        request.validate()?;

        let body = OkxOrderBody {
            inst_id: request.instrument_id.as_str(),
            td_mode: request.trade_mode.as_str(),
            side: request.side.as_str(),
            ord_type: request.order_type.as_str(),
            sz: request.size.as_str(),
            px: request.price.as_ref().map(|p| p.as_str()),
            cl_ord_id: request.client_order_id.as_deref(),
        };
        let body = serde_json::to_string(&body)?;

        info!(
            "Placing {} {} order for {} {} @ {:?}",
            request.side,
            request.order_type,
            request.size,
            request.instrument_id,
            request.price.as_ref().map(|p| p.as_str())
        );

        let data: Vec<OkxOrderResult> = match self.signed_post(endpoint::TRADE_ORDER, body).await {
            Ok(data) => data,
            Err(e) if e.is_outcome_unknown() => {
                warn!(
                    inst_id = %request.instrument_id,
                    "Order outcome unknown ({}); not retried, check open orders before resubmitting",
                    e
                );
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let result = data
            .into_iter()
            .next()
            .ok_or_else(|| ExchangeError::ParseError("order result missing in response".into()))?;

        if !result.s_code.is_empty() && result.s_code != "0" {
            return Err(Self::map_error_code(&result.s_code, &result.s_msg));
        }

        let ack = OrderAck::from(result);
        info!("Order placed successfully: {}", ack.order_id);
        Ok(ack)
    }
}
