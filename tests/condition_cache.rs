mod common;

use common::MockHost;
use qol_bar::conditions::{ConditionCache, DEFAULT_CONDITIONS};
use std::time::Duration;

#[test]
fn install_registers_defaults_and_samples_once() {
    let mut cache = ConditionCache::new(Duration::from_secs(3600));
    let mut host = MockHost::new();
    host.conditions_true.insert("l".into());

    cache.install(&host);
    assert_eq!(
        host.condition_samples.get() as usize,
        DEFAULT_CONDITIONS.len()
    );
    assert!(cache.check("l"));
    assert!(!cache.check("c"));
}

#[test]
fn reads_are_cache_hits_until_the_interval_elapses() {
    let mut cache = ConditionCache::new(Duration::from_secs(3600));
    let mut host = MockHost::new();
    cache.install(&host);

    host.conditions_true.insert("l".into());
    for _ in 0..5 {
        cache.update_cache(&host);
    }
    // The new value is not observed yet; no re-sampling happened.
    assert!(!cache.check("l"));
    assert_eq!(
        host.condition_samples.get() as usize,
        DEFAULT_CONDITIONS.len()
    );

    cache.force_refresh(&host);
    assert!(cache.check("l"));
}

#[test]
fn unknown_codes_read_false() {
    let cache = ConditionCache::new(Duration::from_millis(100));
    assert!(!cache.check("nope"));
}

#[test]
fn register_deduplicates_codes() {
    let mut cache = ConditionCache::new(Duration::from_millis(100));
    let host = MockHost::new();
    cache.register("x");
    cache.register("x");
    cache.force_refresh(&host);
    assert_eq!(host.condition_samples.get(), 1);
}
