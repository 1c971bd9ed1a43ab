//! Mock 积分计算服务入口

use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;

use accrual_mock::routes::{mock_routes, MockState};

/// Mock 积分计算服务
///
/// 用于本地开发与端到端测试，数据保存在内存中，进程退出即丢失。
#[derive(Parser, Debug)]
#[command(name = "accrual-mock", version, about = "Mock 积分计算服务")]
struct Cli {
    /// 监听地址
    #[arg(short, long, default_value = "localhost:7979")]
    listen: String,

    /// 日志级别 (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.log_level.clone())),
        )
        .init();

    let app = mock_routes(MockState::new());

    let listener = TcpListener::bind(&cli.listen).await?;
    info!("accrual-mock listening on {}", cli.listen);

    axum::serve(listener, app).await?;

    Ok(())
}
