//! `tools` 명령: 도구 목록 출력 (자격증명 불필요).

use okx_mcp::TOOLS;
use serde_json::{json, Value};

/// 레지스트리를 JSON 배열로 출력합니다.
pub fn run() -> anyhow::Result<()> {
    let tools: Vec<Value> = TOOLS
        .iter()
        .map(|tool| {
            json!({
                "name": tool.name,
                "description": tool.description,
                "inputSchema": tool.input_schema(),
            })
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&tools)?);
    Ok(())
}
