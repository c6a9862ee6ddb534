//! 주문 타입.
//!
//! - `Side` - 주문 방향 (buy/sell)
//! - `OrderType` - 주문 유형 (market/limit)
//! - `TradeMode` - 거래 모드 (`tdMode`)
//! - `OrderRequest` - 검증된 주문 요청
//! - `OrderAck` - 주문 접수 응답
//!
//! 주문은 멱등하지 않습니다. 같은 요청을 다시 보내면 주문이 하나 더 생길 수 있습니다.

use crate::error::{CoreError, CoreResult};
use crate::types::{DecimalString, InstrumentId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `clOrdId` 최대 길이.
pub const MAX_CLIENT_ORDER_ID_LEN: usize = 32;

/// 주문 방향.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// 매수
    Buy,
    /// 매도
    Sell,
}

impl Side {
    /// OKX 파라미터 값.
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Buy => "buy",
            Side::Sell => "sell",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Side {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buy" => Ok(Side::Buy),
            "sell" => Ok(Side::Sell),
            other => Err(CoreError::InvalidInput(format!(
                "side must be 'buy' or 'sell', got '{}'",
                other
            ))),
        }
    }
}

/// 주문 유형.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderType {
    /// 시장가 주문
    Market,
    /// 지정가 주문 - 가격 필수
    Limit,
}

impl OrderType {
    /// OKX 파라미터 값.
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderType::Market => "market",
            OrderType::Limit => "limit",
        }
    }
}

impl fmt::Display for OrderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "market" => Ok(OrderType::Market),
            "limit" => Ok(OrderType::Limit),
            other => Err(CoreError::InvalidInput(format!(
                "ordType must be 'market' or 'limit', got '{}'",
                other
            ))),
        }
    }
}

/// 거래 모드 (`tdMode`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TradeMode {
    /// 현물 (비마진)
    #[default]
    Cash,
    /// 교차 마진
    Cross,
    /// 격리 마진
    Isolated,
}

impl TradeMode {
    /// OKX 파라미터 값.
    pub fn as_str(&self) -> &'static str {
        match self {
            TradeMode::Cash => "cash",
            TradeMode::Cross => "cross",
            TradeMode::Isolated => "isolated",
        }
    }
}

impl fmt::Display for TradeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TradeMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cash" => Ok(TradeMode::Cash),
            "cross" => Ok(TradeMode::Cross),
            "isolated" => Ok(TradeMode::Isolated),
            other => Err(CoreError::InvalidInput(format!(
                "tdMode must be 'cash', 'cross' or 'isolated', got '{}'",
                other
            ))),
        }
    }
}

/// 검증된 주문 요청.
///
/// 가격 규칙: `Limit`이면 가격 필수, `Market`이면 가격을 받지 않습니다.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderRequest {
    /// 상품 ID
    pub instrument_id: InstrumentId,
    /// 주문 방향
    pub side: Side,
    /// 주문 유형
    pub order_type: OrderType,
    /// 주문 수량 (원문 그대로 전달)
    pub size: DecimalString,
    /// 지정가
    pub price: Option<DecimalString>,
    /// 거래 모드
    pub trade_mode: TradeMode,
    /// 클라이언트 주문 ID (중복 제거에는 사용하지 않음)
    pub client_order_id: Option<String>,
}

impl OrderRequest {
    /// 새 주문 요청을 생성합니다.
    pub fn new(
        instrument_id: InstrumentId,
        side: Side,
        order_type: OrderType,
        size: DecimalString,
        price: Option<DecimalString>,
    ) -> CoreResult<Self> {
        let request = Self {
            instrument_id,
            side,
            order_type,
            size,
            price,
            trade_mode: TradeMode::default(),
            client_order_id: None,
        };
        request.validate()?;
        Ok(request)
    }

    /// 가격 규칙과 `clOrdId` 형식을 검사합니다.
    ///
    /// 필드가 공개되어 있으므로 전송 직전에 다시 호출합니다.
    pub fn validate(&self) -> CoreResult<()> {
        match (self.order_type, &self.price) {
            (OrderType::Limit, None) => {
                return Err(CoreError::InvalidInput(
                    "px is required for limit orders".to_string(),
                ))
            }
            (OrderType::Market, Some(_)) => {
                return Err(CoreError::InvalidInput(
                    "px must not be set for market orders".to_string(),
                ))
            }
            _ => {}
        }
        if let Some(id) = &self.client_order_id {
            check_client_order_id(id)?;
        }
        Ok(())
    }

    /// 시장가 주문 생성.
    pub fn market(instrument_id: InstrumentId, side: Side, size: DecimalString) -> Self {
        Self {
            instrument_id,
            side,
            order_type: OrderType::Market,
            size,
            price: None,
            trade_mode: TradeMode::default(),
            client_order_id: None,
        }
    }

    /// 지정가 주문 생성.
    pub fn limit(
        instrument_id: InstrumentId,
        side: Side,
        size: DecimalString,
        price: DecimalString,
    ) -> Self {
        Self {
            instrument_id,
            side,
            order_type: OrderType::Limit,
            size,
            price: Some(price),
            trade_mode: TradeMode::default(),
            client_order_id: None,
        }
    }

    /// 거래 모드 설정.
    pub fn with_trade_mode(mut self, trade_mode: TradeMode) -> Self {
        self.trade_mode = trade_mode;
        self
    }

    /// 클라이언트 주문 ID 설정 (영숫자 1~32자).
    pub fn with_client_order_id(mut self, id: &str) -> CoreResult<Self> {
        let id = id.trim();
        check_client_order_id(id)?;
        self.client_order_id = Some(id.to_string());
        Ok(self)
    }
}

fn check_client_order_id(id: &str) -> CoreResult<()> {
    if id.is_empty()
        || id.len() > MAX_CLIENT_ORDER_ID_LEN
        || !id.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return Err(CoreError::InvalidInput(format!(
            "clOrdId must be 1-{} alphanumeric characters, got '{}'",
            MAX_CLIENT_ORDER_ID_LEN, id
        )));
    }
    Ok(())
}

/// 주문 접수 응답.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    /// 거래소 주문 ID
    pub order_id: String,
    /// 클라이언트 주문 ID
    pub client_order_id: String,
    /// 주문 태그
    pub tag: String,
    /// 항목별 처리 코드 ("0" = 성공)
    pub status_code: String,
    /// 항목별 처리 메시지
    pub status_message: String,
    /// 거래소 처리 시각
    pub timestamp: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btc() -> InstrumentId {
        InstrumentId::parse("BTC-USDT").unwrap()
    }

    fn dec(raw: &str) -> DecimalString {
        DecimalString::parse_positive("sz", raw).unwrap()
    }

    #[test]
    fn test_enum_parsing() {
        assert_eq!("BUY".parse::<Side>().unwrap(), Side::Buy);
        assert_eq!("sell".parse::<Side>().unwrap(), Side::Sell);
        assert!("hold".parse::<Side>().is_err());

        assert_eq!("Limit".parse::<OrderType>().unwrap(), OrderType::Limit);
        assert!("stop".parse::<OrderType>().is_err());

        assert_eq!("cross".parse::<TradeMode>().unwrap(), TradeMode::Cross);
        assert_eq!(TradeMode::default(), TradeMode::Cash);
    }

    #[test]
    fn test_limit_requires_price() {
        let err = OrderRequest::new(btc(), Side::Buy, OrderType::Limit, dec("1"), None)
            .unwrap_err();
        assert!(err.is_invalid_input());

        let ok = OrderRequest::new(
            btc(),
            Side::Buy,
            OrderType::Limit,
            dec("1"),
            Some(dec("65000.1")),
        )
        .unwrap();
        assert_eq!(ok.price.as_ref().map(|p| p.as_str()), Some("65000.1"));
    }

    #[test]
    fn test_market_rejects_price() {
        let err = OrderRequest::new(
            btc(),
            Side::Sell,
            OrderType::Market,
            dec("1"),
            Some(dec("1")),
        )
        .unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_client_order_id_validation() {
        let order = OrderRequest::market(btc(), Side::Buy, dec("0.001"));
        assert!(order.clone().with_client_order_id("abc123").is_ok());
        assert!(order.clone().with_client_order_id("").is_err());
        assert!(order.clone().with_client_order_id("has-dash").is_err());
        assert!(order.with_client_order_id(&"a".repeat(33)).is_err());
    }

    #[test]
    fn test_validate_catches_mutated_fields() {
        let mut order = OrderRequest::market(btc(), Side::Buy, dec("0.001"));
        assert!(order.validate().is_ok());

        order.order_type = OrderType::Limit;
        assert!(order.validate().unwrap_err().is_invalid_input());

        order.price = Some(dec("65000"));
        assert!(order.validate().is_ok());

        order.client_order_id = Some("bad id".to_string());
        assert!(order.validate().is_err());
    }
}
