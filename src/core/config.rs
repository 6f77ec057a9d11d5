//! # Global runtime configuration.
//!
//! Provides [`Config`] centralized settings for the alarm runtime.
//!
//! ## Sentinel values
//! - `bus_capacity = 0` → clamped to 1
//! - `time_unit = 0s` → clamped to 1ms (a zero unit would make every worker spin)

use std::time::Duration;

/// Global configuration for the alarm runtime.
///
/// ## Field semantics
/// - `bus_capacity`: Event bus ring buffer size (min 1)
/// - `time_unit`: Wall-clock length of one interval "second"
/// - `wake_on_cancel`: Wake a worker as soon as its alarm is cancelled
///
/// ## Notes
/// All fields are public for flexibility. Prefer the helper accessors to avoid
/// sprinkling sentinel checks across the codebase.
#[derive(Clone, Debug)]
pub struct Config {
    /// Capacity of the event bus broadcast channel ring buffer.
    ///
    /// Receivers that lag behind more than `bus_capacity` events
    /// receive `Lagged` and skip older items.
    pub bus_capacity: usize,

    /// Duration one interval unit maps to.
    ///
    /// `Message(id)` requests specify their interval in seconds; a worker sleeps
    /// `interval * time_unit` between ticks.
    pub time_unit: Duration,

    /// Whether cancelling an alarm interrupts its worker's sleep.
    ///
    /// - `false` = cooperative: the worker notices at its next tick boundary
    ///   (worst-case latency one interval)
    /// - `true` = the dispatcher signals the worker right after removing its record
    pub wake_on_cancel: bool,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns the time unit clamped to a minimum of 1ms.
    #[inline]
    pub fn time_unit_clamped(&self) -> Duration {
        self.time_unit.max(Duration::from_millis(1))
    }

    /// Returns the sleep period for an interval expressed in seconds.
    #[inline]
    pub fn period(&self, interval: u32) -> Duration {
        self.time_unit_clamped().saturating_mul(interval)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `bus_capacity = 1024`
    /// - `time_unit = 1s`
    /// - `wake_on_cancel = false` (cooperative tick-granularity cancellation)
    fn default() -> Self {
        Self {
            bus_capacity: 1024,
            time_unit: Duration::from_secs(1),
            wake_on_cancel: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_scales_with_unit() {
        let cfg = Config {
            time_unit: Duration::from_millis(10),
            ..Config::default()
        };
        assert_eq!(cfg.period(5), Duration::from_millis(50));
        assert_eq!(Config::default().period(3), Duration::from_secs(3));
    }

    #[test]
    fn test_sentinels_are_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            time_unit: Duration::ZERO,
            wake_on_cancel: false,
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.period(2), Duration::from_millis(2));
    }
}
