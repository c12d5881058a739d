//! Per-key alert debounce store, sharded by vehicle.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use ft_protocol::{AlertSeverity, AlertType};

/// Number of lock shards. Keys for one vehicle always land in the same shard.
pub const SHARD_COUNT: usize = 16;

/// Identity of a debounced alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CooldownKey {
    pub vehicle_id: i64,
    pub alert_type: AlertType,
    pub severity: AlertSeverity,
}

impl CooldownKey {
    pub fn new(vehicle_id: i64, alert_type: AlertType, severity: AlertSeverity) -> Self {
        Self {
            vehicle_id,
            alert_type,
            severity,
        }
    }
}

type Shard = HashMap<CooldownKey, DateTime<Utc>>;

/// Last-fired timestamps for every alert key seen.
///
/// A key is *eligible* when it has never fired or fired at least one window
/// ago; otherwise it is *suppressed*. Safe to share across tasks.
#[derive(Debug)]
pub struct CooldownStore {
    window: Duration,
    shards: Vec<Mutex<Shard>>,
}

impl CooldownStore {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            shards: (0..SHARD_COUNT).map(|_| Mutex::new(HashMap::new())).collect(),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Fire `key` at `now` if it is eligible.
    ///
    /// Returns `true` and records `now` when the alert may be emitted.
    /// A suppressed key is left untouched, so its window is not extended.
    pub fn try_fire(&self, key: CooldownKey, now: DateTime<Utc>) -> bool {
        let mut shard = self.shard(key.vehicle_id);
        if let Some(last) = shard.get(&key) {
            if now.signed_duration_since(*last) < self.window {
                return false;
            }
        }
        shard.insert(key, now);
        true
    }

    /// Whether `key` would be suppressed at `now`.
    pub fn is_suppressed(&self, key: &CooldownKey, now: DateTime<Utc>) -> bool {
        self.shard(key.vehicle_id)
            .get(key)
            .is_some_and(|last| now.signed_duration_since(*last) < self.window)
    }

    /// Drop entries that are already eligible again. Returns how many were removed.
    pub fn sweep(&self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        for shard in &self.shards {
            let mut shard = lock(shard);
            let before = shard.len();
            shard.retain(|_, last| now.signed_duration_since(*last) < self.window);
            removed += before - shard.len();
        }
        if removed > 0 {
            tracing::debug!(removed, remaining = self.len(), "cooldown sweep");
        }
        removed
    }

    /// Number of tracked keys.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|s| lock(s).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn shard(&self, vehicle_id: i64) -> MutexGuard<'_, Shard> {
        let idx = vehicle_id.rem_euclid(SHARD_COUNT as i64) as usize;
        lock(&self.shards[idx])
    }
}

// A panic while holding a shard cannot leave a timestamp half-written.
fn lock(shard: &Mutex<Shard>) -> MutexGuard<'_, Shard> {
    shard.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap()
    }

    fn key(vehicle_id: i64) -> CooldownKey {
        CooldownKey::new(vehicle_id, AlertType::Speeding, AlertSeverity::Warning)
    }

    #[test]
    fn first_fire_is_eligible() {
        let store = CooldownStore::new(Duration::seconds(300));
        assert!(store.try_fire(key(1), t0()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn suppressed_inside_window() {
        let store = CooldownStore::new(Duration::seconds(300));
        assert!(store.try_fire(key(1), t0()));
        assert!(!store.try_fire(key(1), t0() + Duration::seconds(299)));
        assert!(store.is_suppressed(&key(1), t0() + Duration::seconds(10)));
    }

    #[test]
    fn eligible_exactly_at_window() {
        let store = CooldownStore::new(Duration::seconds(300));
        assert!(store.try_fire(key(1), t0()));
        assert!(store.try_fire(key(1), t0() + Duration::seconds(300)));
    }

    #[test]
    fn suppression_does_not_extend_window() {
        let store = CooldownStore::new(Duration::seconds(300));
        assert!(store.try_fire(key(1), t0()));
        assert!(!store.try_fire(key(1), t0() + Duration::seconds(200)));
        // Measured from the first fire, not the suppressed attempt.
        assert!(store.try_fire(key(1), t0() + Duration::seconds(301)));
    }

    #[test]
    fn keys_are_independent() {
        let store = CooldownStore::new(Duration::seconds(300));
        assert!(store.try_fire(key(1), t0()));
        assert!(store.try_fire(key(2), t0()));
        assert!(store.try_fire(
            CooldownKey::new(1, AlertType::Speeding, AlertSeverity::Critical),
            t0()
        ));
        assert!(store.try_fire(
            CooldownKey::new(1, AlertType::LowFuel, AlertSeverity::Warning),
            t0()
        ));
        assert_eq!(store.len(), 4);
    }

    #[test]
    fn negative_vehicle_ids_shard() {
        let store = CooldownStore::new(Duration::seconds(60));
        assert!(store.try_fire(key(-17), t0()));
        assert!(!store.try_fire(key(-17), t0()));
    }

    #[test]
    fn sweep_removes_only_eligible() {
        let store = CooldownStore::new(Duration::seconds(300));
        store.try_fire(key(1), t0());
        store.try_fire(key(2), t0() + Duration::seconds(200));
        assert_eq!(store.sweep(t0() + Duration::seconds(300)), 1);
        assert_eq!(store.len(), 1);
        assert!(store.is_suppressed(&key(2), t0() + Duration::seconds(300)));
        assert_eq!(store.sweep(t0() + Duration::seconds(500)), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn concurrent_fires_emit_once() {
        let store = Arc::new(CooldownStore::new(Duration::seconds(300)));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || store.try_fire(key(7), t0()))
            })
            .collect();
        let fired = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|fired| *fired)
            .count();
        assert_eq!(fired, 1);
    }
}
