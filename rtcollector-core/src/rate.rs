//! Counter-to-rate conversion.
//!
//! Ports `utils/metrics.py`'s `calculate_rate`/`create_key` module-level
//! functions into an owned, explicitly-passed object instead of a
//! process-wide map: callers own one [`RateHelper`] and thread it through
//! each cycle.

use std::collections::HashMap;

/// Stable per-counter state: the last observed value and timestamp.
#[derive(Debug, Clone, Copy)]
struct Observation {
    value: f64,
    timestamp_ms: i64,
}

/// Converts monotonically non-decreasing counter samples into a per-second
/// rate across successive calls, keyed by [`compose_key`].
#[derive(Debug, Default)]
pub struct RateHelper {
    last: HashMap<String, Observation>,
}

impl RateHelper {
    /// Create an empty rate helper.
    #[must_use]
    pub fn new() -> Self {
        Self {
            last: HashMap::new(),
        }
    }

    /// Feed one observation for `key`, returning the derived rate per
    /// second, or `None` when a rate cannot yet be derived (first
    /// observation, non-positive elapsed time, or an unflagged counter
    /// reset).
    ///
    /// `reset_ceiling`, when given, is the counter's wraparound ceiling: a
    /// decreasing value is then treated as a wrap (`ceiling - prev + value`)
    /// rather than a reset.
    pub fn rate(
        &mut self,
        key: &str,
        value: f64,
        timestamp_ms: i64,
        reset_ceiling: Option<f64>,
    ) -> Option<f64> {
        let Some(prev) = self.last.get(key).copied() else {
            self.last.insert(
                key.to_string(),
                Observation {
                    value,
                    timestamp_ms,
                },
            );
            return None;
        };

        let delta_t = (timestamp_ms - prev.timestamp_ms) as f64 / 1000.0;
        if delta_t <= 0.0 {
            // Clock regressed: skip this sample without updating state.
            return None;
        }

        let mut delta_v = value - prev.value;
        if delta_v < 0.0 {
            match reset_ceiling {
                Some(ceiling) => {
                    delta_v = (ceiling - prev.value) + value;
                }
                None => {
                    self.last.insert(
                        key.to_string(),
                        Observation {
                            value,
                            timestamp_ms,
                        },
                    );
                    return None;
                }
            }
        }

        self.last.insert(
            key.to_string(),
            Observation {
                value,
                timestamp_ms,
            },
        );
        Some(delta_v / delta_t)
    }
}

/// Build a stable rate key from a metric name and its (already-merged)
/// labels: labels are sorted by name so label insertion order never affects
/// the key.
#[must_use]
pub fn compose_key(metric_name: &str, labels: &HashMap<String, String>) -> String {
    let mut pairs: Vec<(&str, &str)> = labels
        .iter()
        .map(|(k, v)| (k.as_str(), v.as_str()))
        .collect();
    pairs.sort_unstable_by_key(|(k, _)| *k);
    let joined = pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(",");
    format!("{metric_name}|{joined}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_observation_yields_no_rate() {
        let mut helper = RateHelper::new();
        assert_eq!(helper.rate("k", 100.0, 1_000, None), None);
    }

    /// A sequence of (100, t0), (110, t0+1000), (5, t0+2000) yields none,
    /// 10.0, none (the third sample is a counter reset), and the stored
    /// state after the third call is (5, t0+2000) — verified by feeding a
    /// fourth sample that reads off of it.
    #[test]
    fn counter_increase_then_reset() {
        let mut helper = RateHelper::new();
        let t0 = 1_000_i64;
        assert_eq!(helper.rate("k", 100.0, t0, None), None);
        assert_eq!(helper.rate("k", 110.0, t0 + 1_000, None), Some(10.0));
        assert_eq!(helper.rate("k", 5.0, t0 + 2_000, None), None);
        // Stored state is now (5, t0+2000); a later sample 3s on at 35
        // yields (35-5)/3 = 10/s.
        assert_eq!(
            helper.rate("k", 35.0, t0 + 5_000, None),
            Some(10.0)
        );
    }

    /// With ceiling = 100, (95, t), (5, t+1000) wraps to 10.0/s.
    #[test]
    fn counter_wrap_with_ceiling() {
        let mut helper = RateHelper::new();
        let t = 0_i64;
        assert_eq!(helper.rate("k", 95.0, t, Some(100.0)), None);
        assert_eq!(helper.rate("k", 5.0, t + 1_000, Some(100.0)), Some(10.0));
    }

    #[test]
    fn clock_regression_is_skipped_without_state_update() {
        let mut helper = RateHelper::new();
        assert_eq!(helper.rate("k", 100.0, 2_000, None), None);
        // timestamp goes backwards relative to the stored observation.
        assert_eq!(helper.rate("k", 110.0, 1_000, None), None);
        // state is unchanged, so a sample after the *original* timestamp
        // still computes relative to (100, 2000).
        assert_eq!(helper.rate("k", 110.0, 3_000, None), Some(10.0));
    }

    #[test]
    fn ceiling_with_increasing_value_is_the_normal_case() {
        let mut helper = RateHelper::new();
        assert_eq!(helper.rate("k", 10.0, 0, Some(100.0)), None);
        assert_eq!(helper.rate("k", 20.0, 1_000, Some(100.0)), Some(10.0));
    }

    #[test]
    fn compose_key_sorts_labels() {
        let mut a = HashMap::new();
        a.insert("b".to_string(), "2".to_string());
        a.insert("a".to_string(), "1".to_string());
        let mut b = HashMap::new();
        b.insert("a".to_string(), "1".to_string());
        b.insert("b".to_string(), "2".to_string());
        assert_eq!(compose_key("m", &a), compose_key("m", &b));
        assert_eq!(compose_key("m", &a), "m|a=1,b=2");
    }
}
