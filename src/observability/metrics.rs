//! Metrics collection and exposition.
//!
//! # Metrics
//! - `rollout_policy_updates_total` (counter): policy deliveries by outcome
//!   (`applied`, `unchanged`, `rejected`)
//! - `rollout_windows` (gauge): windows in the active schedule
//! - `rollout_subscribers` (gauge): registered schedule subscribers
//! - `rollout_active_rate_per_hour` (gauge): active quota normalized per
//!   hour; -1 for unlimited, 0 for blocked
//!
//! # Design Decisions
//! - Recording goes through the `metrics` facade and is a no-op until a
//!   recorder is installed, so library users and tests pay nothing
//! - The Prometheus exporter is installed only by the binary

use std::net::SocketAddr;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

use crate::window::RateSpec;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

pub fn record_policy_update(outcome: &'static str) {
    metrics::counter!("rollout_policy_updates_total", "outcome" => outcome).increment(1);
}

pub fn record_windows(count: usize) {
    metrics::gauge!("rollout_windows").set(count as f64);
}

pub fn record_subscribers(count: usize) {
    metrics::gauge!("rollout_subscribers").set(count as f64);
}

pub fn record_active_rate(rate: &RateSpec) {
    let per_hour = match rate {
        RateSpec::Unlimited => -1.0,
        RateSpec::Blocked => 0.0,
        RateSpec::Limited { count, unit } => {
            count.get() as f64 * 3600.0 / unit.duration().as_secs_f64()
        }
    };
    metrics::gauge!("rollout_active_rate_per_hour").set(per_hour);
}
