//! 캔들스틱 주기(bar) 정의.
//!
//! OKX는 시간 단위 이상 주기를 대문자(`1H`, `1D`)로 표기하고,
//! 6시간 이상 주기에는 UTC 기준 변형(`1Dutc`)이 있습니다.

use crate::error::{CoreError, CoreResult};
use std::fmt;
use std::str::FromStr;

/// OKX 캔들 주기. 변형 이름은 OKX 표기를 따릅니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timeframe {
    Min1,
    Min3,
    Min5,
    Min15,
    Min30,
    Hour1,
    Hour2,
    Hour4,
    Hour6,
    Hour12,
    Day1,
    Day2,
    Day3,
    Week1,
    Month1,
    Month3,
}

/// (주기, OKX 표기, 분 단위 길이). 월 길이는 30일 근사.
const BAR_TABLE: [(Timeframe, &str, u32); 16] = [
    (Timeframe::Min1, "1m", 1),
    (Timeframe::Min3, "3m", 3),
    (Timeframe::Min5, "5m", 5),
    (Timeframe::Min15, "15m", 15),
    (Timeframe::Min30, "30m", 30),
    (Timeframe::Hour1, "1H", 60),
    (Timeframe::Hour2, "2H", 2 * 60),
    (Timeframe::Hour4, "4H", 4 * 60),
    (Timeframe::Hour6, "6H", 6 * 60),
    (Timeframe::Hour12, "12H", 12 * 60),
    (Timeframe::Day1, "1D", 24 * 60),
    (Timeframe::Day2, "2D", 2 * 24 * 60),
    (Timeframe::Day3, "3D", 3 * 24 * 60),
    (Timeframe::Week1, "1W", 7 * 24 * 60),
    (Timeframe::Month1, "1M", 30 * 24 * 60),
    (Timeframe::Month3, "3M", 90 * 24 * 60),
];

impl Timeframe {
    fn entry(&self) -> &'static (Timeframe, &'static str, u32) {
        // 테이블은 변형 선언 순서와 같음
        &BAR_TABLE[*self as usize]
    }

    /// 주기 길이 (분).
    pub fn minutes(&self) -> u32 {
        self.entry().2
    }

    /// OKX `bar` 문자열로 변환합니다.
    pub fn to_okx_bar(&self) -> &'static str {
        self.entry().1
    }

    /// OKX `bar` 문자열에서 파싱합니다.
    ///
    /// 분봉(`m`)과 월봉(`M`)은 대소문자로만 구분되므로 그대로 비교하고,
    /// 시간/일/주 단위는 소문자 표기(`1h`, `1d`, `1w`)도 허용합니다.
    pub fn from_okx_bar(s: &str) -> Option<Self> {
        let normalized = match s.as_bytes().last() {
            Some(b'h' | b'd' | b'w') => s.to_ascii_uppercase(),
            _ => s.to_string(),
        };
        BAR_TABLE
            .iter()
            .find(|(_, bar, _)| *bar == normalized)
            .map(|(tf, _, _)| *tf)
    }

    /// UTC 기준 변형(`...utc`)이 존재하는 주기인지 확인합니다 (6H 이상).
    pub fn supports_utc(&self) -> bool {
        self.minutes() >= Timeframe::Hour6.minutes()
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_okx_bar())
    }
}

/// 캔들 요청용 bar: 타임프레임 + UTC 기준 여부.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bar {
    /// 타임프레임
    pub timeframe: Timeframe,
    /// UTC 0시 기준 여부 (기본은 홍콩 시간 기준)
    pub utc: bool,
}

impl Bar {
    /// 기본 bar (`1H`).
    pub const DEFAULT: Bar = Bar {
        timeframe: Timeframe::Hour1,
        utc: false,
    };

    /// 문자열을 검증해 bar를 생성합니다.
    pub fn parse(raw: &str) -> CoreResult<Self> {
        let raw = raw.trim();
        let invalid = || {
            CoreError::InvalidInput(format!(
                "bar '{}' is not supported, expected one of 1m/3m/5m/15m/30m/1H/2H/4H/6H/12H/1D/2D/3D/1W/1M/3M (optionally with 'utc' for 6H and above)",
                raw
            ))
        };

        let (base, utc) = match raw.strip_suffix("utc") {
            Some(base) => (base, true),
            None => (raw, false),
        };

        let timeframe = Timeframe::from_okx_bar(base).ok_or_else(invalid)?;
        if utc && !timeframe.supports_utc() {
            return Err(invalid());
        }

        Ok(Self { timeframe, utc })
    }

    /// OKX `bar` 파라미터 값.
    pub fn as_okx_param(&self) -> String {
        if self.utc {
            format!("{}utc", self.timeframe.to_okx_bar())
        } else {
            self.timeframe.to_okx_bar().to_string()
        }
    }
}

impl Default for Bar {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl fmt::Display for Bar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_okx_param())
    }
}

impl FromStr for Bar {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bar_table_matches_variant_order() {
        for (i, (tf, _, _)) in BAR_TABLE.iter().enumerate() {
            assert_eq!(*tf as usize, i);
        }
        assert_eq!(Timeframe::Hour1.minutes(), 60);
        assert_eq!(Timeframe::Day1.minutes(), 1440);
    }

    #[test]
    fn okx_bar_spelling() {
        assert_eq!(Timeframe::Min15.to_okx_bar(), "15m");
        assert_eq!(Timeframe::from_okx_bar("4H"), Some(Timeframe::Hour4));
        assert_eq!(Timeframe::from_okx_bar("4h"), Some(Timeframe::Hour4));
        // 1m(분)과 1M(월)은 다른 주기
        assert_eq!(Timeframe::from_okx_bar("1m"), Some(Timeframe::Min1));
        assert_eq!(Timeframe::from_okx_bar("1M"), Some(Timeframe::Month1));
        assert_eq!(Timeframe::from_okx_bar("7H"), None);
        assert_eq!(Timeframe::from_okx_bar(""), None);
    }

    #[test]
    fn bar_parse() {
        assert_eq!(Bar::parse("1H").unwrap(), Bar::DEFAULT);
        assert_eq!(Bar::parse("1d").unwrap().as_okx_param(), "1D");

        let utc = Bar::parse("1Dutc").unwrap();
        assert!(utc.utc);
        assert_eq!(utc.as_okx_param(), "1Dutc");
        assert_eq!(Bar::parse("6Hutc").unwrap().as_okx_param(), "6Hutc");
    }

    #[test]
    fn bar_rejects_unsupported() {
        assert!(Bar::parse("").is_err());
        assert!(Bar::parse("2W").is_err());
        assert!(Bar::parse("1Hutc").is_err());
        assert!(Bar::parse("15mutc").is_err());
    }
}
