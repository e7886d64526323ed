use crate::host::Host;
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Condition codes every installation registers. "l" is logged-in.
pub const DEFAULT_CONDITIONS: [&str; 4] = ["l", "c", "i", "w"];

/// Named boolean conditions sampled from host state on a bounded cadence.
/// Reads are O(1) cache hits; sampling happens at most once per interval no
/// matter how often the update tick runs.
pub struct ConditionCache {
    codes: Vec<String>,
    cache: HashMap<String, bool>,
    interval: Duration,
    last_refresh: Option<Instant>,
}

impl ConditionCache {
    pub fn new(interval: Duration) -> Self {
        Self {
            codes: Vec::new(),
            cache: HashMap::new(),
            interval,
            last_refresh: None,
        }
    }

    /// Register the default condition set and take an initial sample.
    pub fn install(&mut self, host: &dyn Host) {
        for code in DEFAULT_CONDITIONS {
            self.register(code);
        }
        self.force_refresh(host);
    }

    pub fn register(&mut self, code: impl Into<String>) {
        let code = code.into();
        if !self.codes.contains(&code) {
            self.codes.push(code);
        }
    }

    /// Cached value for `code`. Unregistered or never-sampled codes read
    /// `false`.
    pub fn check(&self, code: &str) -> bool {
        self.cache.get(code).copied().unwrap_or(false)
    }

    /// Re-sample all registered conditions if the refresh interval elapsed.
    pub fn update_cache(&mut self, host: &dyn Host) {
        if let Some(last) = self.last_refresh {
            if last.elapsed() < self.interval {
                return;
            }
        }
        self.force_refresh(host);
    }

    pub fn force_refresh(&mut self, host: &dyn Host) {
        for code in &self.codes {
            self.cache.insert(code.clone(), host.sample_condition(code));
        }
        self.last_refresh = Some(Instant::now());
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }
}
