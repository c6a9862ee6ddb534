//! 도구 핸들러.
//!
//! 검증된 인자를 도메인 요청으로 변환한 뒤 클라이언트를 한 번 호출합니다.
//! 도메인 검증(상품 ID, 가격 규칙 등)에 실패하면 거래소에 요청하지 않습니다.

use crate::registry::ToolArgs;
use futures::future::BoxFuture;
use okx_core::{
    parse_currencies, Bar, DecimalString, InstrumentId, KlineRequest, OrderRequest, OrderType,
    Side, TradeMode, DEFAULT_KLINE_LIMIT,
};
use okx_exchange::{ExchangeError, ExchangeResult, OkxApi};
use serde::Serialize;
use serde_json::Value;

fn to_value<T: Serialize>(result: &T) -> ExchangeResult<Value> {
    serde_json::to_value(result).map_err(ExchangeError::from)
}

/// `get_balance { ccy? }`
pub fn get_balance(api: &dyn OkxApi, args: ToolArgs) -> BoxFuture<'_, ExchangeResult<Value>> {
    Box::pin(async move {
        let currencies = match args.text("ccy") {
            Some(raw) => parse_currencies(raw)?,
            None => None,
        };

        let snapshot = api.get_balance(currencies.as_deref()).await?;
        to_value(&snapshot)
    })
}

/// `get_ticker { instId }`
pub fn get_ticker(api: &dyn OkxApi, args: ToolArgs) -> BoxFuture<'_, ExchangeResult<Value>> {
    Box::pin(async move {
        let instrument_id = InstrumentId::parse(args.require_text("instId")?)?;

        let ticker = api.get_ticker(&instrument_id).await?;
        to_value(&ticker)
    })
}

/// `get_kline { instId, bar?, limit?, after?, before? }`
pub fn get_kline(api: &dyn OkxApi, args: ToolArgs) -> BoxFuture<'_, ExchangeResult<Value>> {
    Box::pin(async move {
        let instrument_id = InstrumentId::parse(args.require_text("instId")?)?;
        let bar = match args.text("bar") {
            Some(raw) => Bar::parse(raw)?,
            None => Bar::DEFAULT,
        };
        let limit = match args.integer("limit") {
            Some(n) => u32::try_from(n).map_err(|_| {
                ExchangeError::InvalidArgument(format!("limit {} is out of range", n))
            })?,
            None => DEFAULT_KLINE_LIMIT,
        };

        let mut request = KlineRequest::new(instrument_id, bar, limit)?;
        if let Some(after) = args.text("after") {
            request = request.with_after(after)?;
        }
        if let Some(before) = args.text("before") {
            request = request.with_before(before)?;
        }

        let candles = api.get_kline(&request).await?;
        to_value(&candles)
    })
}

/// `create_order { instId, side, ordType?, sz, px?, tdMode?, clOrdId? }`
pub fn create_order(api: &dyn OkxApi, args: ToolArgs) -> BoxFuture<'_, ExchangeResult<Value>> {
    Box::pin(async move {
        let instrument_id = InstrumentId::parse(args.require_text("instId")?)?;
        let side: Side = args.require_text("side")?.parse()?;
        let order_type: OrderType = args.text("ordType").unwrap_or("market").parse()?;
        let size = DecimalString::parse_positive("sz", args.require_text("sz")?)?;
        let price = args
            .text("px")
            .map(|px| DecimalString::parse_positive("px", px))
            .transpose()?;
        let trade_mode: TradeMode = args.text("tdMode").unwrap_or("cash").parse()?;

        let mut request = OrderRequest::new(instrument_id, side, order_type, size, price)?
            .with_trade_mode(trade_mode);
        if let Some(id) = args.text("clOrdId") {
            request = request.with_client_order_id(id)?;
        }

        let ack = api.create_order(&request).await?;
        to_value(&ack)
    })
}
