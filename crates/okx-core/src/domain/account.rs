//! 계좌 잔고 타입.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 통화별 잔고.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetBalance {
    /// 통화 (예: "BTC", "USDT")
    pub currency: String,
    /// 통화 평가액
    pub equity: String,
    /// 현금 잔고
    pub cash_balance: String,
    /// 사용 가능 잔고
    pub available: String,
    /// 주문 등에 묶인 잔고
    pub frozen: String,
    /// USD 환산 평가액
    pub equity_usd: String,
}

/// 계좌 잔고 스냅샷.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceSnapshot {
    /// USD 환산 총 평가액
    pub total_equity: String,
    /// 마지막 갱신 시각
    pub update_time: Option<DateTime<Utc>>,
    /// 통화별 상세
    pub details: Vec<AssetBalance>,
}

impl BalanceSnapshot {
    /// 특정 통화 잔고를 찾습니다 (대소문자 무시).
    pub fn find(&self, currency: &str) -> Option<&AssetBalance> {
        self.details
            .iter()
            .find(|b| b.currency.eq_ignore_ascii_case(currency))
    }
}
