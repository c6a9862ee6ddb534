//! 설정 관리.
//!
//! 비밀이 아닌 설정(거래소 URL, 타임아웃, 로깅)은 `config` 크레이트로
//! 기본값 → TOML 파일 → 환경 변수 순으로 병합합니다.
//! 자격증명은 `key.env` 파일(`dotenvy`)과 프로세스 환경 변수에서 한 번만 읽습니다.

use crate::error::{CoreError, CoreResult};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// OKX REST API 기본 URL.
pub const DEFAULT_API_BASE: &str = "https://www.okx.com";

/// 자격증명 파일 기본 경로.
pub const DEFAULT_ENV_FILE: &str = "key.env";

/// 요청 타임아웃 기본값 (초).
pub const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// 설정 오버라이드용 환경 변수 접두사 (예: `OKX_MCP__OKX__TIMEOUT_SECS`).
pub const ENV_PREFIX: &str = "OKX_MCP";

/// 서명 타임스탬프를 어디서 가져올지.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampSource {
    /// 로컬 시스템 시계 (시계 동기화는 운영자 책임)
    #[default]
    Local,
    /// 매 서명 요청 전에 `/api/v5/public/time` 조회
    Server,
}

impl std::str::FromStr for TimestampSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "local" => Ok(Self::Local),
            "server" => Ok(Self::Server),
            _ => Err(format!("Unknown timestamp source: {}", s)),
        }
    }
}

/// 애플리케이션 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    /// 거래소 연결 설정
    pub okx: OkxSettings,
    /// 로깅 설정
    pub logging: LoggingConfig,
}

/// OKX 연결 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OkxSettings {
    /// REST API 기본 URL
    pub base_url: String,
    /// 요청 타임아웃 (초)
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// 모의투자(데모) 모드 - `x-simulated-trading: 1` 헤더 전송
    #[serde(default)]
    pub simulated_trading: bool,
    /// 서명 타임스탬프 소스
    #[serde(default)]
    pub timestamp_source: TimestampSource,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

impl Default for OkxSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_BASE.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            simulated_trading: false,
            timestamp_source: TimestampSource::Local,
        }
    }
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// 도구 호출 span 시작/종료 기록
    #[serde(default)]
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
            span_events: false,
        }
    }
}

impl AppConfig {
    /// 기본값, 선택적 설정 파일, 환경 변수를 병합해 설정을 로드합니다.
    ///
    /// `API_BASE` 환경 변수가 있으면 `okx.base_url`을 덮어씁니다.
    pub fn load(path: Option<&Path>) -> CoreResult<Self> {
        let mut builder = config::Config::builder()
            .set_default("okx.base_url", DEFAULT_API_BASE)?
            .set_default("okx.timeout_secs", DEFAULT_TIMEOUT_SECS as i64)?
            .set_default("okx.simulated_trading", false)?
            .set_default("okx.timestamp_source", "local")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            .set_default("logging.span_events", false)?;

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut app: AppConfig = config.try_deserialize()?;

        if let Some(base) = std::env::var("API_BASE")
            .ok()
            .filter(|v| !v.trim().is_empty())
        {
            app.okx.base_url = base;
        }
        app.okx.base_url = app.okx.base_url.trim().trim_end_matches('/').to_string();

        if app.okx.timeout_secs == 0 {
            return Err(CoreError::Config(
                "okx.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(app)
    }
}

/// `key.env` 같은 dotenv 파일을 프로세스 환경에 로드합니다.
///
/// 이미 설정된 환경 변수는 덮어쓰지 않습니다.
/// 파일이 없으면 `Ok(false)`를 반환합니다.
pub fn load_env_file(path: impl AsRef<Path>) -> CoreResult<bool> {
    match dotenvy::from_path(path.as_ref()) {
        Ok(()) => Ok(true),
        Err(e) if e.not_found() => Ok(false),
        Err(e) => Err(CoreError::Config(format!(
            "{} 로드 실패: {}",
            path.as_ref().display(),
            e
        ))),
    }
}

/// OKX API 자격증명.
///
/// 시작 시 한 번 생성되고 이후 읽기 전용으로 공유됩니다.
///
/// # 보안
/// - 모든 값은 `SecretString`으로 보관합니다.
/// - `Debug` 구현은 API 키 일부만 보여주고 나머지는 마스킹합니다.
#[derive(Clone)]
pub struct Credentials {
    api_key: SecretString,
    secret_key: SecretString,
    passphrase: SecretString,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let key = self.api_key.expose_secret();
        let masked_key = if key.len() > 8 && key.is_ascii() {
            format!("{}...{}", &key[..4], &key[key.len() - 4..])
        } else {
            "***REDACTED***".to_string()
        };

        f.debug_struct("Credentials")
            .field("api_key", &masked_key)
            .field("secret_key", &"***REDACTED***")
            .field("passphrase", &"***REDACTED***")
            .finish()
    }
}

impl Credentials {
    /// 환경 변수 이름: API 키
    pub const API_KEY_VAR: &'static str = "API_KEY";
    /// 환경 변수 이름: 시크릿 키
    pub const SECRET_KEY_VAR: &'static str = "SECRET_KEY";
    /// 환경 변수 이름: 패스프레이즈
    pub const PASSPHRASE_VAR: &'static str = "PASSPHRASE";

    /// 값을 직접 지정해 자격증명을 생성합니다.
    ///
    /// 빈 값(공백만 있는 경우 포함)은 `CoreError::MissingCredential`입니다.
    pub fn new(
        api_key: impl Into<String>,
        secret_key: impl Into<String>,
        passphrase: impl Into<String>,
    ) -> CoreResult<Self> {
        Ok(Self {
            api_key: Self::secret(Self::API_KEY_VAR, api_key.into())?,
            secret_key: Self::secret(Self::SECRET_KEY_VAR, secret_key.into())?,
            passphrase: Self::secret(Self::PASSPHRASE_VAR, passphrase.into())?,
        })
    }

    /// 프로세스 환경 변수에서 자격증명을 읽습니다.
    pub fn from_env() -> CoreResult<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// 임의의 키-값 소스에서 자격증명을 읽습니다.
    pub fn from_lookup<F>(lookup: F) -> CoreResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| {
            lookup(name).ok_or(CoreError::MissingCredential(name))
        };

        Self::new(
            read(Self::API_KEY_VAR)?,
            read(Self::SECRET_KEY_VAR)?,
            read(Self::PASSPHRASE_VAR)?,
        )
    }

    fn secret(name: &'static str, value: String) -> CoreResult<SecretString> {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            return Err(CoreError::MissingCredential(name));
        }
        Ok(SecretString::new(trimmed.to_string().into()))
    }

    /// API 키 (`OK-ACCESS-KEY` 헤더).
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// HMAC 서명용 시크릿 키.
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }

    /// 패스프레이즈 (`OK-ACCESS-PASSPHRASE` 헤더).
    pub fn passphrase(&self) -> &str {
        self.passphrase.expose_secret()
    }
}
