// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;
use tracing::info;

/// 分发结果计数器，标签 `outcome` 取 sent、failed、deferred、skipped
pub const DISPATCH_TOTAL: &str = "notification_dispatch_total";
/// 单次发送耗时直方图
pub const SEND_DURATION_SECONDS: &str = "notification_send_duration_seconds";

/// 安装 Prometheus 导出器
///
/// # 参数
///
/// * `addr` - HTTP 监听地址
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    info!("Metrics exporter listening on {}", addr);
    Ok(())
}
