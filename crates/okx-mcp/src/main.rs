//! OKX MCP 서버 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # MCP 서버 실행 (stdio, 기본 명령)
//! okx-mcp serve
//!
//! # SSE(HTTP)로 실행
//! okx-mcp serve --transport sse --bind 127.0.0.1:8000
//!
//! # 도구 목록과 입력 스키마 출력
//! okx-mcp tools
//!
//! # 도구 한 번 호출 (운영 점검용)
//! okx-mcp call get_ticker --args '{"instId":"BTC-USDT"}'
//! ```

use clap::{Parser, Subcommand};
use okx_core::{init_logging, load_env_file, AppConfig, LogConfig, DEFAULT_ENV_FILE};
use okx_mcp::DEFAULT_SSE_BIND;
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::{debug, error};

mod commands;

#[derive(Parser)]
#[command(name = "okx-mcp")]
#[command(about = "OKX MCP server - OKX v5 REST API 도구 브리지", long_about = None)]
#[command(version)]
struct Cli {
    /// 자격증명 파일 (API_KEY, SECRET_KEY, PASSPHRASE)
    #[arg(long, global = true, default_value = DEFAULT_ENV_FILE)]
    env_file: PathBuf,

    /// 설정 파일 (TOML)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 로그 레벨 (예: info, okx_exchange=debug)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// 로그 형식 (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<String>,

    /// 도구 호출 span 시작/종료 기록
    #[arg(long, global = true)]
    log_spans: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// MCP 서버 실행
    Serve {
        /// 전송 방식 (stdio, sse)
        #[arg(short, long, default_value = "stdio")]
        transport: String,

        /// SSE 바인드 주소
        #[arg(short, long, default_value = DEFAULT_SSE_BIND)]
        bind: SocketAddr,
    },

    /// 도구 목록과 입력 스키마를 JSON으로 출력
    Tools,

    /// 도구 한 번 호출 후 결과 봉투 출력
    Call {
        /// 도구 이름 (get_balance, get_ticker, get_kline, create_order)
        tool: String,

        /// 인자 JSON 객체
        #[arg(short, long)]
        args: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // 설정 로드 전에 읽어야 API_BASE가 반영됨
    let env_loaded = load_env_file(&cli.env_file)?;

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(level) = cli.log_level {
        config.logging.level = level;
    }
    if let Some(format) = cli.log_format {
        config.logging.format = format;
    }
    if cli.log_spans {
        config.logging.span_events = true;
    }

    init_logging(LogConfig::from_settings(&config.logging))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    if env_loaded {
        debug!("Loaded environment from {}", cli.env_file.display());
    }

    let command = cli.command.unwrap_or(Commands::Serve {
        transport: "stdio".to_string(),
        bind: DEFAULT_SSE_BIND.parse()?,
    });

    let result = match command {
        Commands::Serve { transport, bind } => {
            commands::serve::run(&config, &transport, bind).await
        }
        Commands::Tools => commands::tools::run(),
        Commands::Call { tool, args } => commands::call::run(&config, &tool, args.as_deref()).await,
    };

    if let Err(e) = &result {
        error!("{:#}", e);
    }
    result
}
