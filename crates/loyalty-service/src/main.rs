//! 积分服务入口
//!
//! 启动顺序：配置（命令行 > 环境变量 > 配置文件 > 默认值）-> 日志 ->
//! 数据库连接与表结构初始化 -> 后台积分轮询器 -> HTTP 服务。
//! 收到 SIGTERM/Ctrl+C 后优雅关闭：在途请求最多再处理 5 秒，
//! 随后连同轮询器一起强制终止。

use std::future::IntoFuture;
use std::pin::pin;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

use loyalty_service::accrual::AccrualClient;
use loyalty_service::routes;
use loyalty_service::state::AppState;
use loyalty_service::worker::AccrualWorker;
use loyalty_shared::{config::AppConfig, database::Database, observability};

/// 关闭信号之后留给在途请求的宽限期
const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// 电商积分服务
///
/// 短旗标与既有部署脚本保持一致：-a 监听地址、-d 数据库 DSN、
/// -r 积分计算服务地址。
#[derive(Parser, Debug)]
#[command(name = "loyalty-service", version, about = "电商积分服务")]
struct Cli {
    /// HTTP 监听地址
    #[arg(short = 'a', long)]
    run_address: Option<String>,

    /// PostgreSQL DSN
    #[arg(short = 'd', long)]
    database_uri: Option<String>,

    /// 积分计算服务基础地址
    #[arg(short = 'r', long)]
    accrual_system_address: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = AppConfig::load()?;
    // 命令行参数优先级最高
    if let Some(address) = cli.run_address {
        config.run_address = address;
    }
    if let Some(uri) = cli.database_uri {
        config.database_uri = uri;
    }
    if let Some(address) = cli.accrual_system_address {
        config.accrual_system_address = address;
    }

    observability::init(&config.observability)?;

    info!("Starting loyalty-service on {}", config.run_address);

    let db = Database::connect(&config).await?;
    db.init_schema().await?;

    let state = AppState::new(&db, &config);

    // 启动积分轮询器：单任务串行访问外部服务，限流语义由其自身处理。
    // 保留 JoinHandle，关闭时显式中止，避免它在宽限期内继续外呼
    let accrual_client = Arc::new(AccrualClient::new(&config.accrual_system_address));
    let worker_db = db.clone();
    let poller = tokio::spawn(async move {
        let worker = AccrualWorker::new(worker_db, accrual_client);
        worker.run().await;
    });

    let app = routes::app(state);

    let listener = TcpListener::bind(&config.run_address).await?;
    info!("Listening on {}", config.run_address);

    // 优雅关闭：收到信号后停止接收新连接，在途请求最多再处理
    // SHUTDOWN_GRACE；宽限期一到，丢弃 serve future 强制断开剩余连接。
    // oneshot 用来得知信号触发的时刻，宽限期从那一刻起算
    let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
    let mut server = pin!(axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            let _ = shutdown_tx.send(());
        })
        .into_future());

    tokio::select! {
        result = &mut server => result?,
        _ = shutdown_rx => {
            match tokio::time::timeout(SHUTDOWN_GRACE, &mut server).await {
                Ok(result) => result?,
                Err(_) => warn!(
                    grace = ?SHUTDOWN_GRACE,
                    "宽限期已到，强制断开仍在处理的连接"
                ),
            }
        }
    }

    // 轮询器没有独立的取消通道，在此显式中止并等待落地，
    // 保证进程退出前它不再访问数据库或外部服务
    poller.abort();
    if let Err(e) = poller.await {
        if e.is_cancelled() {
            info!("积分轮询器已随关闭中止");
        } else {
            error!(error = %e, "积分轮询器异常退出");
        }
    }

    db.close().await;
    info!("Server shutdown complete");

    Ok(())
}

/// 监听关闭信号
///
/// 收到 SIGTERM（容器编排停止实例）或 Ctrl+C 后返回，触发 axum 的
/// 优雅关闭流程。
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("注册 Ctrl+C 处理器失败");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("注册 SIGTERM 处理器失败")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown..."),
        _ = terminate => info!("Received SIGTERM, initiating graceful shutdown..."),
    }
}
