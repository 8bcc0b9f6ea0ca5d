use std::collections::VecDeque;

use dashmap::DashMap;

type LedgerKey = (u64, u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerResult {
    NotTriggered,
    /// Threshold reached with this many actions inside the window.
    Triggered(usize),
}

impl TriggerResult {
    pub fn is_triggered(self) -> bool {
        matches!(self, TriggerResult::Triggered(_))
    }
}

/// Recent action timestamps (unix seconds) per `(guild, executor)`.
///
/// Each key lives in a `DashMap` shard, so appending, pruning and checking
/// one executor happens under a single shard lock while other keys proceed
/// independently. Nothing here is persisted.
#[derive(Debug, Default)]
pub struct ActionLedger {
    entries: DashMap<LedgerKey, VecDeque<u64>>,
}

impl ActionLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `timestamp`, drop entries older than `timestamp - window_seconds`
    /// and compare what is left against `threshold`.
    ///
    /// The window is inclusive: an entry exactly `window_seconds` old still
    /// counts. A triggered key is cleared before returning so one burst
    /// produces one trigger.
    pub fn record(
        &self,
        guild_id: u64,
        executor_id: u64,
        timestamp: u64,
        window_seconds: u64,
        threshold: u32,
    ) -> TriggerResult {
        let key = (guild_id, executor_id);
        let cutoff = timestamp.saturating_sub(window_seconds);

        let count = {
            let mut timestamps = self.entries.entry(key).or_default();
            timestamps.push_back(timestamp);
            timestamps.retain(|&at| at >= cutoff);

            let count = timestamps.len();
            if count < threshold as usize {
                return TriggerResult::NotTriggered;
            }

            timestamps.clear();
            count
        };

        // Another registration may have landed between the two locks.
        self.entries.remove_if(&key, |_, timestamps| timestamps.is_empty());

        TriggerResult::Triggered(count)
    }

    /// Number of timestamps currently held for one executor.
    pub fn len_for(&self, guild_id: u64, executor_id: u64) -> usize {
        self.entries
            .get(&(guild_id, executor_id))
            .map_or(0, |timestamps| timestamps.len())
    }

    /// Number of timestamps held across every executor of a guild.
    pub fn len_for_guild(&self, guild_id: u64) -> usize {
        self.entries
            .iter()
            .filter(|entry| entry.key().0 == guild_id)
            .map(|entry| entry.value().len())
            .sum()
    }

    pub fn tracked_keys(&self) -> usize {
        self.entries.len()
    }

    /// Remove every executor of `guild_id`. Returns how many keys were dropped.
    pub fn clear_guild(&self, guild_id: u64) -> usize {
        let mut removed = 0;
        self.entries.retain(|(entry_guild, _), _| {
            let keep = *entry_guild != guild_id;
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }

    /// Drop keys whose newest entry has already left the window returned by
    /// `window_for(guild_id)`. Returns how many keys were dropped.
    ///
    /// Entries are not ordered: a delayed event can append an older
    /// timestamp after a newer one.
    pub fn sweep<F>(&self, now: u64, window_for: F) -> usize
    where
        F: Fn(u64) -> u64,
    {
        let mut removed = 0;
        self.entries.retain(|(guild_id, _), timestamps| {
            let cutoff = now.saturating_sub(window_for(*guild_id));
            let keep = timestamps.iter().max().is_some_and(|&newest| newest >= cutoff);
            if !keep {
                removed += 1;
            }
            keep
        });
        removed
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::{ActionLedger, TriggerResult};

    #[test]
    fn triggers_at_threshold_not_before() {
        let ledger = ActionLedger::new();
        assert_eq!(ledger.record(1, 2, 0, 10, 3), TriggerResult::NotTriggered);
        assert_eq!(ledger.record(1, 2, 1, 10, 3), TriggerResult::NotTriggered);
        assert_eq!(ledger.record(1, 2, 2, 10, 3), TriggerResult::Triggered(3));
    }

    #[test]
    fn trigger_clears_the_executor() {
        let ledger = ActionLedger::new();
        ledger.record(1, 2, 0, 10, 2);
        assert!(ledger.record(1, 2, 1, 10, 2).is_triggered());
        assert_eq!(ledger.len_for(1, 2), 0);
        assert_eq!(ledger.tracked_keys(), 0);
        assert_eq!(ledger.record(1, 2, 2, 10, 2), TriggerResult::NotTriggered);
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let ledger = ActionLedger::new();
        ledger.record(1, 2, 100, 10, 5);
        // 110 - 10 == 100, so the first entry sits exactly on the cutoff.
        ledger.record(1, 2, 110, 10, 5);
        assert_eq!(ledger.len_for(1, 2), 2);

        ledger.record(1, 2, 111, 10, 5);
        assert_eq!(ledger.len_for(1, 2), 2);
    }

    #[test]
    fn length_never_exceeds_actions_inside_window() {
        let ledger = ActionLedger::new();
        let window = 5;
        let times = [0_u64, 1, 1, 3, 7, 8, 12, 13, 13, 20];

        for (index, &now) in times.iter().enumerate() {
            ledger.record(9, 9, now, window, u32::MAX);
            let in_window = times[..=index]
                .iter()
                .filter(|&&at| at >= now.saturating_sub(window))
                .count();
            assert_eq!(ledger.len_for(9, 9), in_window);
        }
    }

    #[test]
    fn keys_are_independent() {
        let ledger = ActionLedger::new();
        ledger.record(1, 10, 0, 10, 3);
        ledger.record(1, 10, 1, 10, 3);
        assert_eq!(ledger.record(1, 11, 2, 10, 3), TriggerResult::NotTriggered);
        assert_eq!(ledger.record(2, 10, 2, 10, 3), TriggerResult::NotTriggered);
        assert_eq!(ledger.record(1, 10, 2, 10, 3), TriggerResult::Triggered(3));
    }

    #[test]
    fn clear_guild_only_touches_that_guild() {
        let ledger = ActionLedger::new();
        ledger.record(1, 10, 0, 10, 5);
        ledger.record(1, 11, 0, 10, 5);
        ledger.record(2, 10, 0, 10, 5);

        assert_eq!(ledger.clear_guild(1), 2);
        assert_eq!(ledger.len_for_guild(1), 0);
        assert_eq!(ledger.len_for_guild(2), 1);
    }

    #[test]
    fn sweep_drops_idle_keys() {
        let ledger = ActionLedger::new();
        ledger.record(1, 10, 0, 10, 5);
        ledger.record(1, 11, 25, 10, 5);
        ledger.record(2, 10, 0, 10, 5);

        // Guild 2 uses a long window and keeps its entry.
        let removed = ledger.sweep(30, |guild_id| if guild_id == 2 { 60 } else { 10 });
        assert_eq!(removed, 1);
        assert_eq!(ledger.len_for(1, 10), 0);
        assert_eq!(ledger.len_for(1, 11), 1);
        assert_eq!(ledger.len_for(2, 10), 1);
    }

    #[test]
    fn sweep_keeps_keys_with_late_arriving_older_entries() {
        let ledger = ActionLedger::new();
        ledger.record(1, 2, 100, 10, 5);
        // Delayed event, appended after the newer one.
        ledger.record(1, 2, 95, 10, 5);

        assert_eq!(ledger.sweep(106, |_| 10), 0);
        assert_eq!(ledger.len_for(1, 2), 2);

        assert_eq!(ledger.sweep(111, |_| 10), 1);
        assert_eq!(ledger.tracked_keys(), 0);
    }

    #[test]
    fn concurrent_records_on_one_key_are_never_lost() {
        const THREADS: usize = 8;
        const RECORDS_PER_THREAD: usize = 3_000;
        const THRESHOLD: u32 = 4;

        let ledger = ActionLedger::new();

        let triggers: usize = thread::scope(|scope| {
            let handles: Vec<_> = (0..THREADS)
                .map(|_| {
                    scope.spawn(|| {
                        (0..RECORDS_PER_THREAD)
                            .filter(|_| ledger.record(1, 2, 0, 10, THRESHOLD).is_triggered())
                            .count()
                    })
                })
                .collect();

            handles.into_iter().map(|handle| handle.join().unwrap()).sum()
        });

        let leftover = ledger.len_for(1, 2);
        assert!(leftover < THRESHOLD as usize);
        assert_eq!(
            triggers * THRESHOLD as usize + leftover,
            THREADS * RECORDS_PER_THREAD
        );
    }
}
