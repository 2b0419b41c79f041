// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use metrics::{describe_counter, describe_histogram};
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use tracing::{info, warn};

use crate::config::settings::MetricsSettings;

/// 初始化指标系统
///
/// 未启用时不安装导出器，`metrics` 宏调用退化为空操作
pub fn init_metrics(settings: &MetricsSettings) {
    if !settings.enabled {
        return;
    }

    let addr: SocketAddr = match settings.listen_addr.parse() {
        Ok(addr) => addr,
        Err(e) => {
            warn!(addr = %settings.listen_addr, error = %e, "invalid metrics listen address");
            return;
        }
    };

    // Ignore error if address is already in use (for development/testing)
    if let Err(e) = PrometheusBuilder::new().with_http_listener(addr).install() {
        warn!("Failed to install Prometheus recorder: {}", e);
        return;
    }

    describe_metrics();
    info!("Metrics exporter listening on {}", addr);
}

fn describe_metrics() {
    describe_counter!("chat_turns_total", "Chat turns answered by the assistant");
    describe_counter!("chat_turn_failures_total", "Chat turns whose reply failed");
    describe_histogram!("chat_turn_duration_seconds", "End-to-end chat turn latency");
    describe_counter!(
        "extraction_failures_total",
        "Field extraction calls that failed or returned malformed output"
    );
    describe_counter!("invite_redemptions_total", "Invite redemption attempts by outcome");
    describe_counter!("organizations_provisioned_total", "Organizations provisioned by plan");
    describe_counter!("billing_webhooks_total", "Payment webhook events by type and outcome");
    describe_counter!("signups_total", "Accounts created through signup");
    describe_counter!("login_failures_total", "Rejected login attempts");
    describe_counter!("asset_uploads_total", "Uploaded assets by storage tier");
    describe_counter!("storage_fallbacks_total", "Storage tier failures that fell through");
    describe_counter!("jobs_processed_total", "Background jobs processed by kind and outcome");
    describe_histogram!("job_duration_seconds", "Background job execution time");
    describe_counter!("llm_requests_total", "Completion requests sent to the AI provider");
}
