//! OKX v5 REST 응답 타입 (와이어 형식).

use chrono::{DateTime, Utc};
use okx_core::{AssetBalance, BalanceSnapshot, Candle, OrderAck, TickerSnapshot};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 모든 응답 공통 봉투: `{"code":"0","msg":"","data":[...]}`.
#[derive(Debug, Deserialize)]
pub(crate) struct OkxEnvelope {
    /// 문자열이 정상이지만 일부 게이트웨이 에러는 숫자로 옵니다
    pub code: Value,
    #[serde(default)]
    pub msg: String,
    #[serde(default)]
    pub data: Value,
}

impl OkxEnvelope {
    /// 응답 코드 문자열.
    pub fn code(&self) -> String {
        match &self.code {
            Value::String(s) => s.clone(),
            Value::Null => String::new(),
            other => other.to_string(),
        }
    }

    /// 성공 응답 여부.
    pub fn is_success(&self) -> bool {
        self.code() == "0"
    }

    /// 항목별 실패 코드 (`data[0].sCode`가 "0"이 아닌 경우).
    pub fn item_error(&self) -> Option<(String, String)> {
        let first = self.data.as_array()?.first()?;
        let code = match first.get("sCode")? {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        if code.is_empty() || code == "0" {
            return None;
        }
        let message = first
            .get("sMsg")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        Some((code, message))
    }
}

/// 주문 요청 본문. 필드 순서가 곧 직렬화 순서입니다.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OkxOrderBody<'a> {
    pub inst_id: &'a str,
    pub td_mode: &'a str,
    pub side: &'a str,
    pub ord_type: &'a str,
    pub sz: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub px: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cl_ord_id: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OkxServerTime {
    pub ts: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OkxBalanceDetail {
    pub ccy: String,
    #[serde(default)]
    pub eq: String,
    #[serde(default)]
    pub cash_bal: String,
    #[serde(default)]
    pub avail_bal: String,
    #[serde(default)]
    pub frozen_bal: String,
    #[serde(default)]
    pub eq_usd: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OkxBalance {
    #[serde(default)]
    pub total_eq: String,
    #[serde(default)]
    pub u_time: String,
    #[serde(default)]
    pub details: Vec<OkxBalanceDetail>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OkxTicker {
    #[serde(default)]
    pub inst_type: String,
    pub inst_id: String,
    #[serde(default)]
    pub last: String,
    #[serde(default)]
    pub last_sz: String,
    #[serde(default)]
    pub ask_px: String,
    #[serde(default)]
    pub ask_sz: String,
    #[serde(default)]
    pub bid_px: String,
    #[serde(default)]
    pub bid_sz: String,
    #[serde(default)]
    pub open24h: String,
    #[serde(default)]
    pub high24h: String,
    #[serde(default)]
    pub low24h: String,
    #[serde(default)]
    pub vol_ccy24h: String,
    #[serde(default)]
    pub vol24h: String,
    #[serde(default)]
    pub ts: String,
}

/// 캔들 행: `[ts, o, h, l, c, vol, volCcy, volCcyQuote, confirm]`.
pub(crate) type OkxCandleRow = Vec<String>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct OkxOrderResult {
    #[serde(default)]
    pub ord_id: String,
    #[serde(default)]
    pub cl_ord_id: String,
    #[serde(default)]
    pub tag: String,
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub s_code: String,
    #[serde(default)]
    pub s_msg: String,
}

/// 밀리초 문자열을 UTC 시각으로 변환.
pub(crate) fn parse_millis(raw: &str) -> Option<DateTime<Utc>> {
    raw.parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
}

impl From<OkxBalance> for BalanceSnapshot {
    fn from(raw: OkxBalance) -> Self {
        BalanceSnapshot {
            total_equity: raw.total_eq,
            update_time: parse_millis(&raw.u_time),
            details: raw
                .details
                .into_iter()
                .map(|d| AssetBalance {
                    currency: d.ccy,
                    equity: d.eq,
                    cash_balance: d.cash_bal,
                    available: d.avail_bal,
                    frozen: d.frozen_bal,
                    equity_usd: d.eq_usd,
                })
                .collect(),
        }
    }
}

impl From<OkxTicker> for TickerSnapshot {
    fn from(raw: OkxTicker) -> Self {
        TickerSnapshot {
            timestamp: parse_millis(&raw.ts),
            instrument_id: raw.inst_id,
            instrument_type: raw.inst_type,
            last: raw.last,
            last_size: raw.last_sz,
            ask_price: raw.ask_px,
            ask_size: raw.ask_sz,
            bid_price: raw.bid_px,
            bid_size: raw.bid_sz,
            open_24h: raw.open24h,
            high_24h: raw.high24h,
            low_24h: raw.low24h,
            volume_24h: raw.vol24h,
            volume_currency_24h: raw.vol_ccy24h,
        }
    }
}

impl From<OkxOrderResult> for OrderAck {
    fn from(raw: OkxOrderResult) -> Self {
        OrderAck {
            timestamp: parse_millis(&raw.ts),
            order_id: raw.ord_id,
            client_order_id: raw.cl_ord_id,
            tag: raw.tag,
            status_code: raw.s_code,
            status_message: raw.s_msg,
        }
    }
}

/// 캔들 행을 `Candle`로 변환. 타임스탬프나 OHLCV가 빠진 행은 `None`.
pub(crate) fn candle_from_row(row: OkxCandleRow) -> Option<Candle> {
    if row.len() < 6 {
        return None;
    }
    let timestamp = parse_millis(&row[0])?;
    let field = |i: usize| row.get(i).cloned().unwrap_or_default();

    Some(Candle {
        timestamp,
        open: field(1),
        high: field(2),
        low: field(3),
        close: field(4),
        volume: field(5),
        volume_currency: field(6),
        volume_quote: field(7),
        // confirm 필드가 없으면 확정된 캔들로 취급
        confirmed: row.get(8).map(|c| c == "1").unwrap_or(true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_item_error() {
        let env: OkxEnvelope = serde_json::from_str(
            r#"{"code":"1","msg":"Operation failed.","data":[{"ordId":"","sCode":"51008","sMsg":"Order failed. Insufficient USDT balance in account."}]}"#,
        )
        .unwrap();
        assert!(!env.is_success());
        let (code, msg) = env.item_error().unwrap();
        assert_eq!(code, "51008");
        assert!(msg.contains("Insufficient"));
    }

    #[test]
    fn test_envelope_numeric_code() {
        let env: OkxEnvelope = serde_json::from_str(r#"{"code":50113,"msg":"Invalid Sign"}"#).unwrap();
        assert_eq!(env.code(), "50113");
        assert!(env.item_error().is_none());
    }

    #[test]
    fn test_candle_row() {
        let row: OkxCandleRow = serde_json::from_str(
            r#"["1717750800000","65000.1","65100","64900.5","65050.25","12.5","12.5","812345.6","0"]"#,
        )
        .unwrap();
        let candle = candle_from_row(row).unwrap();
        assert_eq!(candle.open, "65000.1");
        assert_eq!(candle.close, "65050.25");
        assert!(!candle.confirmed);
        assert_eq!(candle.timestamp.timestamp_millis(), 1717750800000);
    }

    #[test]
    fn test_candle_row_too_short() {
        assert!(candle_from_row(vec!["1717750800000".to_string(), "1".to_string()]).is_none());
        assert!(candle_from_row(vec!["x".to_string(); 9]).is_none());
    }

    #[test]
    fn test_order_body_field_order() {
        let body = OkxOrderBody {
            inst_id: "BTC-USDT",
            td_mode: "cash",
            side: "buy",
            ord_type: "limit",
            sz: "0.001",
            px: Some("65000.1"),
            cl_ord_id: None,
        };
        assert_eq!(
            serde_json::to_string(&body).unwrap(),
            r#"{"instId":"BTC-USDT","tdMode":"cash","side":"buy","ordType":"limit","sz":"0.001","px":"65000.1"}"#
        );
    }
}
