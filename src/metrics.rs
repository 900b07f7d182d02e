//! Registration counter.

use std::sync::atomic::{AtomicU64, Ordering};

/// Name the dynamic route counter is reported under.
pub const DYNAMIC_ROUTES_COUNTER: &str = "dynamic_routes.counter";

/// Sink for the number of registered dynamic routes.
pub trait RouteCounter: Send + Sync {
    fn add(&self, value: u64);
}

/// Counter used when metrics are disabled.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopCounter;

impl RouteCounter for NoopCounter {
    fn add(&self, _value: u64) {}
}

/// In-process counter.
#[derive(Debug, Default)]
pub struct AtomicCounter {
    value: AtomicU64,
}

impl AtomicCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

impl RouteCounter for AtomicCounter {
    fn add(&self, value: u64) {
        self.value.fetch_add(value, Ordering::Relaxed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_atomic_counter() {
        let counter = AtomicCounter::new();
        assert_eq!(counter.get(), 0);
        counter.add(1);
        counter.add(2);
        assert_eq!(counter.get(), 3);
    }
}
