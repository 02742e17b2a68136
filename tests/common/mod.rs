//! Shared utilities for integration tests.

use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use rollout_window::manager::Subscription;
use rollout_window::{Schedule, WindowConfig};
use std::sync::Arc;

/// 2024-01-01 was a Monday; `day_offset` 0..7 walks Monday to Sunday.
pub fn at(day_offset: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1 + day_offset, hour, minute, 0)
        .unwrap()
}

/// Broad default first, weekend override after it.
pub fn weekend_policy() -> Vec<WindowConfig> {
    vec![
        WindowConfig::new("unlimited"),
        WindowConfig::new("5/hour").days(["saturday", "sunday"]),
    ]
}

/// Write a policy file as JSON.
#[allow(dead_code)]
pub fn write_policy(path: &Path, policy: &[WindowConfig]) {
    let json = serde_json::to_string_pretty(policy).unwrap();
    std::fs::write(path, json).unwrap();
}

/// Wait for the next notification, failing the test after `timeout`.
#[allow(dead_code)]
pub async fn next_schedule(sub: &mut Subscription, timeout: Duration) -> Arc<Schedule> {
    tokio::time::timeout(timeout, sub.changed())
        .await
        .expect("timed out waiting for schedule notification")
        .expect("manager dropped")
}
