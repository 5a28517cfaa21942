use std::future::Future;
use std::io;

use tokio::signal;
use tracing::{info, warn};

/// 等待 Ctrl+C（SIGINT）信号
///
/// 注册信号失败时永不返回，服务器只能由其他方式停止。
pub async fn listen_for_shutdown() {
    wait_for_signal(signal::ctrl_c()).await
}

async fn wait_for_signal<F>(signal: F)
where
    F: Future<Output = io::Result<()>>,
{
    match signal.await {
        Ok(()) => {
            info!("Shutdown signal received, stopping server...");
        }
        Err(e) => {
            warn!(
                "Failed to listen for Ctrl+C: {}. Server will keep running without signal handling.",
                e
            );
            std::future::pending::<()>().await;
        }
    }
}
