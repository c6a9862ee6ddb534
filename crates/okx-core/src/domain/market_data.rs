//! 시장 데이터 타입.
//!
//! - `TickerSnapshot` - 단일 상품 시세
//! - `Candle` - OHLCV 캔들
//! - `KlineRequest` - 캔들 조회 요청
//!
//! 가격/수량 필드는 거래소가 보낸 문자열을 그대로 보관합니다.

use crate::error::{CoreError, CoreResult};
use crate::types::{Bar, InstrumentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 캔들 조회 시 최대 개수.
pub const MAX_KLINE_LIMIT: u32 = 300;

/// 캔들 조회 기본 개수.
pub const DEFAULT_KLINE_LIMIT: u32 = 100;

/// 시세 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerSnapshot {
    /// 상품 ID
    pub instrument_id: String,
    /// 상품 유형 (SPOT, SWAP, FUTURES, OPTION)
    pub instrument_type: String,
    /// 최근 체결가
    pub last: String,
    /// 최근 체결 수량
    pub last_size: String,
    /// 최우선 매도 호가
    pub ask_price: String,
    /// 최우선 매도 잔량
    pub ask_size: String,
    /// 최우선 매수 호가
    pub bid_price: String,
    /// 최우선 매수 잔량
    pub bid_size: String,
    /// 24시간 시가
    pub open_24h: String,
    /// 24시간 고가
    pub high_24h: String,
    /// 24시간 저가
    pub low_24h: String,
    /// 24시간 거래량 (계약/기준 자산 단위)
    pub volume_24h: String,
    /// 24시간 거래량 (통화 단위)
    pub volume_currency_24h: String,
    /// 데이터 생성 시각
    pub timestamp: Option<DateTime<Utc>>,
}

/// OHLCV 캔들.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// 캔들 시작 시각
    pub timestamp: DateTime<Utc>,
    /// 시가
    pub open: String,
    /// 고가
    pub high: String,
    /// 저가
    pub low: String,
    /// 종가
    pub close: String,
    /// 거래량 (계약/기준 자산 단위)
    pub volume: String,
    /// 거래량 (기준 통화 단위)
    pub volume_currency: String,
    /// 거래대금 (호가 통화 단위)
    pub volume_quote: String,
    /// 확정 여부 (false면 진행 중인 캔들)
    pub confirmed: bool,
}

/// 캔들 조회 요청.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KlineRequest {
    /// 상품 ID
    pub instrument_id: InstrumentId,
    /// 캔들 주기
    pub bar: Bar,
    /// 조회 개수 (1..=300)
    pub limit: u32,
    /// 이 시각(ms) 이전 데이터 페이지 커서
    pub after: Option<String>,
    /// 이 시각(ms) 이후 데이터 페이지 커서
    pub before: Option<String>,
}

impl KlineRequest {
    /// 새 캔들 조회 요청을 생성합니다.
    ///
    /// `limit`이 1..=300 범위를 벗어나면 `CoreError::InvalidInput`입니다.
    pub fn new(instrument_id: InstrumentId, bar: Bar, limit: u32) -> CoreResult<Self> {
        let request = Self {
            instrument_id,
            bar,
            limit,
            after: None,
            before: None,
        };
        request.validate()?;
        Ok(request)
    }

    /// `limit` 범위와 커서 형식을 검사합니다.
    ///
    /// 필드가 공개되어 있으므로 전송 직전에 다시 호출합니다.
    pub fn validate(&self) -> CoreResult<()> {
        if self.limit == 0 || self.limit > MAX_KLINE_LIMIT {
            return Err(CoreError::InvalidInput(format!(
                "limit must be between 1 and {}, got {}",
                MAX_KLINE_LIMIT, self.limit
            )));
        }
        if let Some(after) = &self.after {
            parse_cursor("after", after)?;
        }
        if let Some(before) = &self.before {
            parse_cursor("before", before)?;
        }
        Ok(())
    }

    /// `after` 페이지 커서 설정 (밀리초 타임스탬프).
    pub fn with_after(mut self, after: &str) -> CoreResult<Self> {
        self.after = Some(parse_cursor("after", after)?);
        Ok(self)
    }

    /// `before` 페이지 커서 설정 (밀리초 타임스탬프).
    pub fn with_before(mut self, before: &str) -> CoreResult<Self> {
        self.before = Some(parse_cursor("before", before)?);
        Ok(self)
    }
}

fn parse_cursor(field: &str, raw: &str) -> CoreResult<String> {
    let raw = raw.trim();
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::InvalidInput(format!(
            "{} must be a millisecond timestamp, got '{}'",
            field, raw
        )));
    }
    Ok(raw.to_string())
}
