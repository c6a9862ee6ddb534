//! 호출자가 보낸 소수 문자열.
//!
//! 주문 수량/가격은 `Decimal`로 형식만 검증하고, 거래소에는 원문 그대로 전달합니다.
//! 정밀도(lot size, tick size) 위반은 거래소가 판단합니다.

use crate::error::{CoreError, CoreResult};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 양수임이 검증된 소수 문자열.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecimalString(String);

impl DecimalString {
    /// 양의 소수 문자열인지 검증합니다. `field`는 에러 메시지에 사용됩니다.
    pub fn parse_positive(field: &str, raw: &str) -> CoreResult<Self> {
        let trimmed = raw.trim();

        let value = Decimal::from_str(trimmed).map_err(|_| {
            CoreError::InvalidInput(format!("{} '{}' is not a decimal number", field, trimmed))
        })?;

        if value <= Decimal::ZERO {
            return Err(CoreError::InvalidInput(format!(
                "{} must be positive, got '{}'",
                field, trimmed
            )));
        }

        Ok(Self(trimmed.to_string()))
    }

    /// 원문 문자열.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DecimalString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
