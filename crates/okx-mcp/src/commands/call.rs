//! `call` 명령: 도구 한 번 호출.

use anyhow::{bail, Context};
use okx_core::AppConfig;
use serde_json::Value;

/// 도구를 호출하고 결과 봉투를 stdout에 출력합니다.
///
/// 도구가 실패하면 봉투를 출력한 뒤 에러를 반환합니다.
pub async fn run(config: &AppConfig, tool: &str, args: Option<&str>) -> anyhow::Result<()> {
    let args = match args {
        Some(raw) => match serde_json::from_str::<Value>(raw).context("--args is not valid JSON")? {
            Value::Object(map) => Some(map),
            other => bail!("--args must be a JSON object, got {}", other),
        },
        None => None,
    };

    let dispatcher = super::build_dispatcher(config)?;
    let result = dispatcher.call(tool, args).await?;

    println!("{}", result.to_text());

    if let Some(failure) = result.failure() {
        bail!("{} failed with {}", tool, failure.kind);
    }
    Ok(())
}
