//! 상품 ID 및 통화 코드.
//!
//! OKX 상품 ID는 `-`로 구분된 영숫자 세그먼트로 구성됩니다:
//! - 현물: `BTC-USDT`
//! - 무기한 스왑: `BTC-USDT-SWAP`
//! - 선물: `BTC-USD-240628`

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `ccy` 필터에 허용되는 최대 통화 수.
pub const MAX_CURRENCIES: usize = 20;

/// 검증된 OKX 상품 ID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstrumentId(String);

impl InstrumentId {
    /// 문자열을 검증해 상품 ID를 생성합니다.
    ///
    /// 앞뒤 공백은 제거하고 대문자로 정규화합니다.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let normalized = raw.trim().to_ascii_uppercase();

        if normalized.is_empty() {
            return Err(CoreError::InvalidInput("instId must not be empty".to_string()));
        }

        let segments: Vec<&str> = normalized.split('-').collect();
        let well_formed = segments.len() >= 2
            && segments
                .iter()
                .all(|s| !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric()));

        if !well_formed {
            return Err(CoreError::InvalidInput(format!(
                "instId '{}' is malformed, expected e.g. BTC-USDT",
                raw.trim()
            )));
        }

        Ok(Self(normalized))
    }

    /// 문자열 표현.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for InstrumentId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for InstrumentId {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InstrumentId> for String {
    fn from(id: InstrumentId) -> Self {
        id.0
    }
}

/// 쉼표로 구분된 통화 목록(`"BTC,usdt"`)을 파싱합니다.
///
/// 빈 항목은 무시하고, 결과가 비어 있으면 `None`(전체 통화)을 반환합니다.
pub fn parse_currencies(raw: &str) -> CoreResult<Option<Vec<String>>> {
    let currencies: Vec<String> = raw
        .split(',')
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if currencies.is_empty() {
        return Ok(None);
    }

    if currencies.len() > MAX_CURRENCIES {
        return Err(CoreError::InvalidInput(format!(
            "ccy accepts at most {} currencies, got {}",
            MAX_CURRENCIES,
            currencies.len()
        )));
    }

    if let Some(bad) = currencies
        .iter()
        .find(|c| !c.chars().all(|ch| ch.is_ascii_alphanumeric()))
    {
        return Err(CoreError::InvalidInput(format!("invalid currency code '{}'", bad)));
    }

    Ok(Some(currencies))
}
