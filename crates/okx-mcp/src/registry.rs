//! 도구 레지스트리.
//!
//! 도구 이름 → (설명, 파라미터 표, 핸들러) 정적 테이블입니다.
//! `tools/list`의 JSON Schema와 호출 인자 검증이 같은 파라미터 표에서 나옵니다.

use crate::handlers;
use futures::future::BoxFuture;
use okx_exchange::{ExchangeError, ExchangeResult, OkxApi};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;

/// JSON 객체 (도구 인자, 스키마).
pub type JsonObject = Map<String, Value>;

/// 도구 핸들러. 검증된 인자로 클라이언트 작업 하나를 호출합니다.
pub type ToolHandler =
    for<'a> fn(&'a dyn OkxApi, ToolArgs) -> BoxFuture<'a, ExchangeResult<Value>>;

/// 파라미터 값 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamKind {
    /// 문자열
    String,
    /// 음이 아닌 정수 (JSON 숫자 또는 숫자 문자열)
    Integer,
    /// 소수 문자열 (JSON 숫자도 허용, 원문 유지)
    Decimal,
}

/// 도구 파라미터 정의.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    /// 인자 이름 (OKX 파라미터 이름과 동일)
    pub name: &'static str,
    /// 값 종류
    pub kind: ParamKind,
    /// 설명
    pub description: &'static str,
    /// 필수 여부
    pub required: bool,
    /// 생략 시 기본값
    pub default: Option<&'static str>,
    /// 허용 값 목록 (비어 있으면 제한 없음)
    pub choices: &'static [&'static str],
    /// 정수 범위 (포함)
    pub range: Option<(u64, u64)>,
}

impl ParamSpec {
    const fn new(name: &'static str, kind: ParamKind, description: &'static str) -> Self {
        Self {
            name,
            kind,
            description,
            required: false,
            default: None,
            choices: &[],
            range: None,
        }
    }

    /// 문자열 파라미터.
    pub const fn string(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::String, description)
    }

    /// 정수 파라미터.
    pub const fn integer(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Integer, description)
    }

    /// 소수 문자열 파라미터.
    pub const fn decimal(name: &'static str, description: &'static str) -> Self {
        Self::new(name, ParamKind::Decimal, description)
    }

    /// 필수로 지정.
    pub const fn required(self) -> Self {
        Self {
            required: true,
            ..self
        }
    }

    /// 기본값 지정.
    pub const fn with_default(self, default: &'static str) -> Self {
        Self {
            default: Some(default),
            ..self
        }
    }

    /// 허용 값 지정 (대소문자 무시).
    pub const fn one_of(self, choices: &'static [&'static str]) -> Self {
        Self { choices, ..self }
    }

    /// 정수 범위 지정.
    pub const fn between(self, min: u64, max: u64) -> Self {
        Self {
            range: Some((min, max)),
            ..self
        }
    }

    /// 이 파라미터의 JSON Schema.
    pub fn schema(&self) -> Value {
        let mut schema = JsonObject::new();
        match self.kind {
            ParamKind::String => {
                schema.insert("type".into(), json!("string"));
            }
            ParamKind::Integer => {
                schema.insert("type".into(), json!("integer"));
                if let Some((min, max)) = self.range {
                    schema.insert("minimum".into(), json!(min));
                    schema.insert("maximum".into(), json!(max));
                }
            }
            ParamKind::Decimal => {
                schema.insert("type".into(), json!(["string", "number"]));
            }
        }
        schema.insert("description".into(), json!(self.description));
        if !self.choices.is_empty() {
            schema.insert("enum".into(), json!(self.choices));
        }
        if let Some(default) = self.default {
            let value = match self.kind {
                ParamKind::Integer => default
                    .parse::<u64>()
                    .map(|n| json!(n))
                    .unwrap_or_else(|_| json!(default)),
                _ => json!(default),
            };
            schema.insert("default".into(), value);
        }
        Value::Object(schema)
    }

    /// 인자 값을 검증하고 정규화합니다. 빈 선택 문자열은 생략으로 취급합니다.
    fn coerce(&self, value: &Value) -> ExchangeResult<Option<ArgValue>> {
        match self.kind {
            ParamKind::String => {
                let Value::String(raw) = value else {
                    return Err(self.type_error("a string", value));
                };
                let raw = raw.trim();
                if raw.is_empty() {
                    return if self.required {
                        Err(ExchangeError::InvalidArgument(format!(
                            "{} must not be empty",
                            self.name
                        )))
                    } else {
                        Ok(None)
                    };
                }
                if self.choices.is_empty() {
                    return Ok(Some(ArgValue::Text(raw.to_string())));
                }
                self.choices
                    .iter()
                    .find(|c| c.eq_ignore_ascii_case(raw))
                    .map(|c| Some(ArgValue::Text(c.to_string())))
                    .ok_or_else(|| {
                        ExchangeError::InvalidArgument(format!(
                            "{} must be one of {}, got '{}'",
                            self.name,
                            self.choices.join("/"),
                            raw
                        ))
                    })
            }
            ParamKind::Integer => {
                let number = match value {
                    Value::Number(n) => n.as_u64(),
                    Value::String(s) => s.trim().parse::<u64>().ok(),
                    _ => None,
                }
                .ok_or_else(|| self.type_error("a non-negative integer", value))?;

                if let Some((min, max)) = self.range {
                    if number < min || number > max {
                        return Err(ExchangeError::InvalidArgument(format!(
                            "{} must be between {} and {}, got {}",
                            self.name, min, max, number
                        )));
                    }
                }
                Ok(Some(ArgValue::Integer(number)))
            }
            ParamKind::Decimal => match value {
                Value::String(s) if !s.trim().is_empty() => {
                    Ok(Some(ArgValue::Text(s.trim().to_string())))
                }
                Value::Number(n) => Ok(Some(ArgValue::Text(n.to_string()))),
                _ => Err(self.type_error("a decimal string", value)),
            },
        }
    }

    fn type_error(&self, expected: &str, got: &Value) -> ExchangeError {
        ExchangeError::InvalidArgument(format!(
            "{} must be {}, got {}",
            self.name, expected, got
        ))
    }
}

/// 검증된 인자 값.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgValue {
    /// 문자열 / 소수 문자열
    Text(String),
    /// 정수
    Integer(u64),
}

/// 파라미터 표로 검증한 도구 인자 (기본값 적용 완료).
#[derive(Debug, Clone, Default)]
pub struct ToolArgs {
    values: BTreeMap<&'static str, ArgValue>,
}

impl ToolArgs {
    /// 문자열 인자.
    pub fn text(&self, name: &str) -> Option<&str> {
        match self.values.get(name) {
            Some(ArgValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    /// 필수 문자열 인자.
    pub fn require_text(&self, name: &str) -> ExchangeResult<&str> {
        self.text(name)
            .ok_or_else(|| ExchangeError::InvalidArgument(format!("{} is required", name)))
    }

    /// 정수 인자.
    pub fn integer(&self, name: &str) -> Option<u64> {
        match self.values.get(name) {
            Some(ArgValue::Integer(n)) => Some(*n),
            _ => None,
        }
    }
}

/// 도구 정의 (컴파일 타임 상수).
#[derive(Clone, Copy)]
pub struct ToolSpec {
    /// 도구 이름
    pub name: &'static str,
    /// 설명 (LLM에 노출)
    pub description: &'static str,
    /// 파라미터 표
    pub params: &'static [ParamSpec],
    /// 핸들러 함수
    handler: ToolHandler,
}

impl std::fmt::Debug for ToolSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ToolSpec")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("params", &self.params)
            .field("handler", &"<fn>")
            .finish()
    }
}

impl ToolSpec {
    /// 핸들러 참조.
    pub fn handler(&self) -> ToolHandler {
        self.handler
    }

    /// 입력 JSON Schema (`type: object`).
    pub fn input_schema(&self) -> JsonObject {
        let properties: JsonObject = self
            .params
            .iter()
            .map(|p| (p.name.to_string(), p.schema()))
            .collect();
        let required: Vec<&str> = self
            .params
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name)
            .collect();

        let mut schema = JsonObject::new();
        schema.insert("type".into(), json!("object"));
        schema.insert("properties".into(), Value::Object(properties));
        schema.insert("required".into(), json!(required));
        schema.insert("additionalProperties".into(), json!(false));
        schema
    }

    /// 호출 인자를 검증합니다.
    ///
    /// 알 수 없는 인자, 누락된 필수 인자, 타입 불일치는 모두 `InvalidArgument`입니다.
    pub fn validate(&self, args: Option<&JsonObject>) -> ExchangeResult<ToolArgs> {
        let empty = JsonObject::new();
        let args = args.unwrap_or(&empty);

        if let Some(unknown) = args
            .keys()
            .find(|k| !self.params.iter().any(|p| p.name == k.as_str()))
        {
            return Err(ExchangeError::InvalidArgument(format!(
                "unknown argument '{}' for {}",
                unknown, self.name
            )));
        }

        let mut values = BTreeMap::new();
        for param in self.params {
            let supplied = match args.get(param.name) {
                None | Some(Value::Null) => None,
                Some(value) => param.coerce(value)?,
            };
            let value = match (supplied, param.default) {
                (Some(value), _) => Some(value),
                (None, Some(default)) => param.coerce(&Value::String(default.to_string()))?,
                (None, None) => None,
            };

            match value {
                Some(value) => {
                    values.insert(param.name, value);
                }
                None if param.required => {
                    return Err(ExchangeError::InvalidArgument(format!(
                        "{} is required",
                        param.name
                    )));
                }
                None => {}
            }
        }

        Ok(ToolArgs { values })
    }
}

const GET_BALANCE_PARAMS: &[ParamSpec] = &[ParamSpec::string(
    "ccy",
    "Comma separated currencies, e.g. \"BTC,USDT\". Omit for all currencies.",
)];

const GET_TICKER_PARAMS: &[ParamSpec] =
    &[ParamSpec::string("instId", "Instrument ID, e.g. \"BTC-USDT\".").required()];

const GET_KLINE_PARAMS: &[ParamSpec] = &[
    ParamSpec::string("instId", "Instrument ID, e.g. \"BTC-USDT\".").required(),
    ParamSpec::string(
        "bar",
        "Bar size: 1m/3m/5m/15m/30m/1H/2H/4H/6H/12H/1D/2D/3D/1W/1M/3M, 'utc' suffix for 6H and above.",
    )
    .with_default("1H"),
    ParamSpec::integer("limit", "Number of candles to return, newest first.")
        .with_default("100")
        .between(1, 300),
    ParamSpec::string(
        "after",
        "Pagination: return records earlier than this millisecond timestamp.",
    ),
    ParamSpec::string(
        "before",
        "Pagination: return records newer than this millisecond timestamp.",
    ),
];

const CREATE_ORDER_PARAMS: &[ParamSpec] = &[
    ParamSpec::string("instId", "Instrument ID, e.g. \"BTC-USDT\".").required(),
    ParamSpec::string("side", "Order side.")
        .required()
        .one_of(&["buy", "sell"]),
    ParamSpec::string("ordType", "Order type. Limit orders require px.")
        .with_default("market")
        .one_of(&["market", "limit"]),
    ParamSpec::decimal("sz", "Order size as a decimal string, e.g. \"0.001\".").required(),
    ParamSpec::decimal("px", "Limit price. Required for limit orders, rejected for market orders."),
    ParamSpec::string("tdMode", "Trade mode.")
        .with_default("cash")
        .one_of(&["cash", "cross", "isolated"]),
    ParamSpec::string("clOrdId", "Client order ID, 1-32 alphanumeric characters."),
];

/// 등록된 도구 전체. 실행 중에 바뀌지 않습니다.
pub static TOOLS: [ToolSpec; 4] = [
    ToolSpec {
        name: "get_balance",
        description: "Get trading account balances. Returns total equity and per-currency equity, cash, available and frozen amounts.",
        params: GET_BALANCE_PARAMS,
        handler: handlers::get_balance,
    },
    ToolSpec {
        name: "get_ticker",
        description: "Get the latest ticker for an instrument: last price, best bid/ask and 24h statistics.",
        params: GET_TICKER_PARAMS,
        handler: handlers::get_ticker,
    },
    ToolSpec {
        name: "get_kline",
        description: "Get candlesticks (OHLCV) for an instrument, newest first.",
        params: GET_KLINE_PARAMS,
        handler: handlers::get_kline,
    },
    ToolSpec {
        name: "create_order",
        description: "Place a spot or margin order. Not idempotent: resubmitting after a network error may create a duplicate order. Balance is not checked before submitting; an insufficient balance comes back as an ExchangeError from OKX (e.g. code 51008).",
        params: CREATE_ORDER_PARAMS,
        handler: handlers::create_order,
    },
];

/// 이름으로 도구를 찾습니다.
pub fn find_tool(name: &str) -> Option<&'static ToolSpec> {
    TOOLS.iter().find(|t| t.name == name)
}
