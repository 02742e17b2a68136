//! Hot reload behaviour of the rollout manager.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rollout_window::config::PolicyFormat;
use rollout_window::window::RateUnit;
use rollout_window::{delay_for, Delay, RateSpec, RolloutManager, UpdateOutcome, WindowConfig};

mod common;

#[test]
fn test_weekend_policy_end_to_end() {
    let manager = RolloutManager::with_policy(common::weekend_policy()).unwrap();

    // Tuesday noon
    assert_eq!(manager.active_rate(common::at(1, 12, 0)), RateSpec::Unlimited);

    // Saturday 3am
    let rate = manager.active_rate(common::at(5, 3, 0));
    assert_eq!(rate.to_string(), "5/hour");
    assert_eq!(delay_for(&rate, 5), Delay::Wait(Duration::from_secs(12 * 60)));
}

#[test]
fn test_business_hours_override() {
    let manager = RolloutManager::with_policy(vec![
        WindowConfig::new("unlimited").days(["monday"]),
        WindowConfig::new("10/hour").days(["monday"]).start("09:00").end("17:00"),
    ])
    .unwrap();
    assert_eq!(
        manager.active_rate(common::at(0, 10, 0)),
        RateSpec::limited(10, RateUnit::Hour)
    );
    assert_eq!(manager.active_rate(common::at(0, 8, 0)), RateSpec::Unlimited);
}

#[test]
fn test_identical_policy_notifies_once() {
    let manager = RolloutManager::new();
    let mut sub = manager.subscribe();

    manager.update(common::weekend_policy()).unwrap();
    let json = r#"[ {"rate":"unlimited"},
                    {"days":["saturday","sunday"], "rate":"5/hour"} ]"#;
    assert_eq!(
        manager.update_from_str(json, PolicyFormat::Json).unwrap(),
        UpdateOutcome::Unchanged
    );

    let mut notifications = 0;
    while sub.has_changed() {
        sub.latest();
        notifications += 1;
    }
    assert_eq!(notifications, 1);
}

#[test]
fn test_rejected_policy_is_isolated() {
    let manager = RolloutManager::with_policy(vec![WindowConfig::new("20/minute")]).unwrap();
    let mut sub = manager.subscribe();

    assert!(manager.update(vec![WindowConfig::new("20/minute").days(["someday"])]).is_err());
    assert!(manager.update_from_str("[[windows]]\nrate = 5", PolicyFormat::Toml).is_err());

    assert!(!sub.has_changed());
    assert_eq!(sub.latest().windows().len(), 1);
    assert_eq!(manager.current_rate(), RateSpec::limited(20, RateUnit::Minute));
}

#[tokio::test]
async fn test_subscriber_receives_whole_schedule() {
    let manager = Arc::new(RolloutManager::new());
    let mut sub = manager.subscribe();

    let writer = manager.clone();
    tokio::spawn(async move {
        writer
            .update(vec![WindowConfig::new("blocked").start("22:00").end("06:00")])
            .unwrap();
    });

    let schedule = common::next_schedule(&mut sub, Duration::from_secs(5)).await;
    assert_eq!(schedule.windows().len(), 1);
    assert_eq!(schedule.active(common::at(2, 23, 30)), RateSpec::Blocked);
    assert_eq!(schedule.active(common::at(2, 12, 0)), RateSpec::Unlimited);
}

#[tokio::test]
async fn test_changed_returns_none_after_manager_dropped() {
    let manager = RolloutManager::new();
    let mut sub = manager.subscribe();
    drop(manager);
    assert!(sub.changed().await.is_none());
}

#[test]
fn test_concurrent_reads_never_tear() {
    let manager = RolloutManager::new();
    let slow = vec![WindowConfig::new("1/hour")];
    let fast = vec![WindowConfig::new("unlimited"), WindowConfig::new("60/minute")];
    manager.update(slow.clone()).unwrap();

    let allowed = [
        RateSpec::limited(1, RateUnit::Hour),
        RateSpec::limited(60, RateUnit::Minute),
    ];
    let done = AtomicBool::new(false);

    std::thread::scope(|scope| {
        for _ in 0..4 {
            scope.spawn(|| {
                let now = common::at(3, 9, 0);
                while !done.load(Ordering::Relaxed) {
                    let schedule = manager.schedule();
                    // A snapshot is always one whole policy.
                    assert!(schedule.windows().len() == 1 || schedule.windows().len() == 2);
                    assert!(allowed.contains(&manager.active_rate(now)));
                }
            });
        }

        for i in 0..500 {
            let policy = if i % 2 == 0 { fast.clone() } else { slow.clone() };
            manager.update(policy).unwrap();
        }
        done.store(true, Ordering::Relaxed);
    });
}

#[test]
fn test_reads_after_update_see_it() {
    let manager = Arc::new(RolloutManager::new());
    manager.update(vec![WindowConfig::new("blocked")]).unwrap();

    let reader = manager.clone();
    let rate = std::thread::spawn(move || reader.current_rate()).join().unwrap();
    assert_eq!(rate, RateSpec::Blocked);
}
