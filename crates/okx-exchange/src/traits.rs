//! 거래소 trait 정의.

use async_trait::async_trait;
use okx_core::{
    BalanceSnapshot, Candle, InstrumentId, KlineRequest, OrderAck, OrderRequest, TickerSnapshot,
};

use crate::ExchangeError;

/// 거래소 작업을 위한 Result 타입.
pub type ExchangeResult<T> = Result<T, ExchangeError>;

/// 도구 디스패처가 호출하는 거래소 인터페이스.
///
/// 모든 메서드는 요청을 정확히 한 번 보냅니다. 재시도는 호출자가 결정합니다.
#[async_trait]
pub trait OkxApi: Send + Sync {
    /// 거래소 이름 반환.
    fn name(&self) -> &str;

    // === 계좌 ===

    /// 계좌 잔고 조회. `currencies`가 `None`이면 전체 통화.
    async fn get_balance(&self, currencies: Option<&[String]>) -> ExchangeResult<BalanceSnapshot>;

    // === 시장 데이터 ===

    /// 상품의 현재 시세 조회.
    async fn get_ticker(&self, instrument_id: &InstrumentId) -> ExchangeResult<TickerSnapshot>;

    /// 캔들 조회 (최신순).
    async fn get_kline(&self, request: &KlineRequest) -> ExchangeResult<Vec<Candle>>;

    // === 주문 ===

    /// 새 주문 제출. 멱등하지 않습니다.
    async fn create_order(&self, request: &OrderRequest) -> ExchangeResult<OrderAck>;
}
