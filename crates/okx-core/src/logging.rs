//! tracing 로깅 초기화.
//!
//! MCP stdio 전송은 stdout을 프로토콜 메시지 전용으로 쓰므로
//! 로그 출력 대상은 항상 stderr입니다.

use crate::config::LoggingConfig;
use std::str::FromStr;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter, Layer, Registry,
};

/// 로깅 초기화 에러 타입.
pub type LogInitError = Box<dyn std::error::Error + Send + Sync>;

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// 로그 출력 형식.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// 사람이 읽기 쉬운 여러 줄 형식
    #[default]
    Pretty,
    /// 한 줄 JSON (로그 수집기용)
    Json,
    /// 간결한 한 줄 형식
    Compact,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            "compact" => Ok(Self::Compact),
            _ => Err(format!("Unknown log format: {}", s)),
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// `EnvFilter` 지시어 (예: "info", "okx_exchange=debug")
    pub level: String,
    /// 출력 형식
    pub format: LogFormat,
    /// 도구 호출 span의 시작/종료 기록 여부
    pub span_events: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
            span_events: false,
        }
    }
}

impl LogConfig {
    /// `[logging]` 설정에서 생성. 알 수 없는 형식은 pretty.
    pub fn from_settings(settings: &LoggingConfig) -> Self {
        Self {
            level: settings.level.clone(),
            format: settings.format.parse().unwrap_or_default(),
            span_events: settings.span_events,
        }
    }

    fn fmt_layer(&self) -> BoxedLayer {
        let span_events = if self.span_events {
            FmtSpan::NEW | FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        };
        let base = fmt::layer()
            .with_writer(std::io::stderr)
            .with_span_events(span_events);

        match self.format {
            LogFormat::Pretty => base.pretty().boxed(),
            LogFormat::Json => base.json().with_current_span(true).boxed(),
            LogFormat::Compact => base.compact().with_ansi(false).boxed(),
        }
    }
}

/// 전역 subscriber를 설치합니다. 프로세스당 한 번만 호출합니다.
///
/// `RUST_LOG`가 있으면 설정의 레벨보다 우선합니다.
///
/// ```no_run
/// use okx_core::logging::{init_logging, LogConfig, LogFormat};
///
/// let config = LogConfig {
///     level: "okx_exchange=debug".into(),
///     format: LogFormat::Json,
///     span_events: true,
/// };
/// init_logging(config).unwrap();
/// ```
pub fn init_logging(config: LogConfig) -> Result<(), LogInitError> {
    let filter =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(&config.level))?;

    tracing_subscriber::registry()
        .with(config.fmt_layer())
        .with(filter)
        .try_init()?;

    tracing::debug!(format = ?config.format, level = %config.level, "Logging initialized");
    Ok(())
}

/// 도구 호출 span. `inst_id`는 인자 검증 후 `Span::record`로 채웁니다.
#[macro_export]
macro_rules! tool_span {
    ($tool:expr) => {
        tracing::info_span!(
            "tool_call",
            tool = %$tool,
            inst_id = tracing::field::Empty
        )
    };
}
