// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use crate::utils::retry_policy::RetryPolicy;
use crate::workers::worker::Worker;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// 工作管理器
///
/// 在监督任务中运行已注册的工作器，异常退出时按重试策略重启，
/// 关闭时通知所有工作器并在限定时间内等待在途任务完成。
pub struct WorkerManager {
    workers: Vec<Arc<dyn Worker>>,
    handles: Vec<JoinHandle<()>>,
    shutdown_tx: watch::Sender<bool>,
    restart_policy: RetryPolicy,
    drain_timeout: Duration,
}

impl WorkerManager {
    /// 创建新的工作管理器
    ///
    /// # 参数
    ///
    /// * `restart_policy` - 工作器异常退出后的重启策略
    /// * `drain_timeout` - 关闭时等待工作器退出的最长时间
    pub fn new(restart_policy: RetryPolicy, drain_timeout: Duration) -> Self {
        let (shutdown_tx, _) = watch::channel(false);
        Self {
            workers: Vec::new(),
            handles: Vec::new(),
            shutdown_tx,
            restart_policy,
            drain_timeout,
        }
    }

    /// 注册工作器，需在 `start` 之前调用
    pub fn register(&mut self, worker: Arc<dyn Worker>) {
        self.workers.push(worker);
    }

    /// 是否已启动
    pub fn is_running(&self) -> bool {
        !self.handles.is_empty()
    }

    /// 启动所有已注册的工作器
    pub fn start(&mut self) {
        if self.is_running() {
            warn!("Worker manager already started");
            return;
        }

        for worker in &self.workers {
            let handle = tokio::spawn(supervise(
                worker.clone(),
                self.shutdown_tx.subscribe(),
                self.restart_policy.clone(),
            ));
            self.handles.push(handle);
        }

        info!(count = self.handles.len(), "Workers started");
    }

    /// 停止所有工作器
    ///
    /// # 返回值
    ///
    /// 所有工作器都在等待时间内退出时返回 true；超时的工作器会被强制中止
    pub async fn stop(&mut self) -> bool {
        if !self.is_running() {
            return true;
        }

        info!("Shutting down workers...");
        self.shutdown_tx.send_replace(true);

        let handles: Vec<JoinHandle<()>> = self.handles.drain(..).collect();
        let abort_handles: Vec<_> = handles.iter().map(|h| h.abort_handle()).collect();

        match tokio::time::timeout(self.drain_timeout, join_all(handles)).await {
            Ok(_) => {
                info!("Workers shut down successfully");
                true
            }
            Err(_) => {
                warn!(
                    timeout_secs = self.drain_timeout.as_secs_f64(),
                    "Workers did not drain in time, aborting"
                );
                for handle in abort_handles {
                    handle.abort();
                }
                false
            }
        }
    }

    /// 等待关闭信号并关闭工作进程
    ///
    /// 监听关闭信号并优雅地关闭所有工作进程
    pub async fn wait_for_shutdown(&mut self) {
        match signal::ctrl_c().await {
            Ok(()) => info!("Shutdown signal received"),
            Err(err) => error!("Unable to listen for shutdown signal: {}", err),
        }

        self.stop().await;
    }
}

/// 中止时同时中止内部任务
struct AbortOnDrop<T>(JoinHandle<T>);

impl<T> Drop for AbortOnDrop<T> {
    fn drop(&mut self) {
        self.0.abort();
    }
}

async fn supervise(
    worker: Arc<dyn Worker>,
    mut shutdown: watch::Receiver<bool>,
    policy: RetryPolicy,
) {
    let name = worker.name().to_string();
    let mut restarts = 0u32;

    loop {
        let mut run = {
            let worker = worker.clone();
            let shutdown = shutdown.clone();
            AbortOnDrop(tokio::spawn(async move { worker.run(shutdown).await }))
        };

        let failure = match (&mut run.0).await {
            Ok(Ok(())) => None,
            Ok(Err(e)) => Some(e.to_string()),
            Err(e) if e.is_panic() => Some("worker panicked".to_string()),
            Err(e) => Some(e.to_string()),
        };

        if *shutdown.borrow() {
            break;
        }

        let Some(reason) = failure else {
            info!(worker = %name, "Worker exited");
            break;
        };

        if !policy.should_retry(restarts) {
            error!(worker = %name, restarts, %reason, "Worker failed, restart limit reached");
            break;
        }

        restarts += 1;
        let delay = policy.calculate_backoff(restarts);
        warn!(
            worker = %name,
            attempt = restarts,
            delay_ms = delay.as_millis() as u64,
            %reason,
            "Worker failed, restarting"
        );

        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = tokio::time::sleep(delay) => {}
        }
    }
}
