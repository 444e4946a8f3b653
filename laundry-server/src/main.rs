use anyhow::anyhow;
use laundry_server::{Config, Server, ServerState, init_logger_with_file};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. 环境变量 (.env 可选)
    dotenv::dotenv().ok();

    // 2. 加载配置
    let config = Config::from_env().map_err(|e| anyhow!("Invalid configuration: {e}"))?;

    // 3. 日志 (guard 持有到进程结束)
    let _log_guard = init_logger_with_file(Some(&config.log_level), config.log_dir.as_deref());

    tracing::info!(environment = %config.environment, "Laundry server starting...");

    // 4. 初始化服务器状态 (数据库 + 迁移)
    let state = ServerState::initialize(&config)
        .await
        .map_err(|e| anyhow!("Failed to initialize server state: {e}"))?;

    // 5. 启动 HTTP 服务器
    if let Err(e) = Server::new(state).run().await {
        tracing::error!("Server error: {}", e);
        return Err(anyhow!("Server error: {e}"));
    }

    Ok(())
}
