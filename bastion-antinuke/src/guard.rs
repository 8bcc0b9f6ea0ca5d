use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::action::DestructiveAction;
use crate::config::{DEFAULT_WINDOW_SECONDS, GuardConfig, GuardConfigPatch, PunishmentKind};
use crate::directive::Verdict;
use crate::error::GuardError;
use crate::ledger::{ActionLedger, TriggerResult};
use crate::store::GuardConfigStore;

/// Antinuke service: owns the action ledger and a write-through cache of
/// guild configs backed by `S`.
///
/// Built once at startup and shared behind an `Arc`. The decision methods
/// (`is_exempt`, `register_action`, `observe`) only read the cache and never
/// await, so call [`ActionRateGuard::config`] first to hydrate a guild that
/// may not have been loaded yet.
#[derive(Debug)]
pub struct ActionRateGuard<S> {
    store: S,
    configs: DashMap<u64, GuardConfig>,
    config_locks: DashMap<u64, Arc<Mutex<()>>>,
    ledger: ActionLedger,
}

impl<S: GuardConfigStore> ActionRateGuard<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            configs: DashMap::new(),
            config_locks: DashMap::new(),
            ledger: ActionLedger::new(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn ledger(&self) -> &ActionLedger {
        &self.ledger
    }

    /// Current config for a guild, loading it from the store on a cache miss.
    /// Guilds without a stored config get (and cache) the defaults.
    pub async fn config(&self, guild_id: u64) -> Result<GuardConfig, GuardError> {
        if let Some(config) = self.configs.get(&guild_id) {
            return Ok(config.clone());
        }

        let loaded = self.store.load(guild_id).await?.unwrap_or_default();

        // A concurrent `configure` may have filled the slot while we loaded.
        let config = self.configs.entry(guild_id).or_insert(loaded).clone();
        Ok(config)
    }

    /// Cached config without touching the store; defaults on a miss.
    pub fn cached_config(&self, guild_id: u64) -> GuardConfig {
        self.configs
            .get(&guild_id)
            .map(|config| config.clone())
            .unwrap_or_default()
    }

    /// Merge `patch` into the guild's config, persist it and publish it to
    /// the cache. Validation or store failures leave the previous config in
    /// place.
    pub async fn configure(
        &self,
        guild_id: u64,
        patch: &GuardConfigPatch,
    ) -> Result<GuardConfig, GuardError> {
        let lock = self
            .config_locks
            .entry(guild_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let _serialized = lock.lock().await;

        let current = self.config(guild_id).await?;
        let next = current.apply(patch)?;

        self.store.save(guild_id, &next).await?;
        self.configs.insert(guild_id, next.clone());

        debug!(
            guild_id,
            enabled = next.enabled,
            threshold = next.threshold,
            window_seconds = next.window_seconds,
            punishment = %next.punishment,
            "antinuke config updated"
        );

        Ok(next)
    }

    /// Drop everything known about a guild, persisted config included.
    pub async fn remove_guild(&self, guild_id: u64) -> Result<(), GuardError> {
        self.store.delete(guild_id).await?;
        self.configs.remove(&guild_id);
        self.config_locks.remove(&guild_id);
        self.ledger.clear_guild(guild_id);
        Ok(())
    }

    pub fn is_exempt(
        &self,
        guild_id: u64,
        executor_id: u64,
        role_ids: &[u64],
        is_bot: bool,
    ) -> bool {
        self.configs
            .get(&guild_id)
            .is_some_and(|config| config.is_exempt(executor_id, role_ids, is_bot))
    }

    /// Record one destructive action and report whether the executor crossed
    /// the threshold. A disabled guard records nothing.
    pub fn register_action(&self, guild_id: u64, executor_id: u64, timestamp: u64) -> TriggerResult {
        let Some((threshold, window_seconds)) = self
            .configs
            .get(&guild_id)
            .filter(|config| config.enabled)
            .map(|config| (config.threshold, config.window_seconds))
        else {
            return TriggerResult::NotTriggered;
        };

        self.ledger
            .record(guild_id, executor_id, timestamp, window_seconds, threshold)
    }

    pub fn resolve_punishment(&self, guild_id: u64) -> PunishmentKind {
        self.configs
            .get(&guild_id)
            .map(|config| config.punishment)
            .unwrap_or_default()
    }

    /// Forget every executor's recent actions in a guild.
    pub fn reset_counters(&self, guild_id: u64) -> usize {
        let removed = self.ledger.clear_guild(guild_id);
        debug!(guild_id, removed, "antinuke counters reset");
        removed
    }

    /// Full pipeline for one event: exemption check, registration and, on a
    /// trigger, the directives to carry out.
    pub fn observe(&self, action: &DestructiveAction) -> Option<Verdict> {
        let config = self.configs.get(&action.guild_id)?.clone();
        if !config.enabled {
            return None;
        }

        if config.is_exempt(
            action.executor_id,
            &action.executor_role_ids,
            action.executor_is_bot,
        ) {
            debug!(
                guild_id = action.guild_id,
                executor_id = action.executor_id,
                kind = %action.kind,
                "exempt executor; action not counted"
            );
            return None;
        }

        match self.register_action(action.guild_id, action.executor_id, action.timestamp) {
            TriggerResult::NotTriggered => None,
            TriggerResult::Triggered(count) => {
                info!(
                    guild_id = action.guild_id,
                    executor_id = action.executor_id,
                    kind = %action.kind,
                    count,
                    punishment = %config.punishment,
                    "antinuke threshold reached"
                );
                Some(Verdict::new(&config, action, count))
            }
        }
    }

    /// Drop ledger keys that have gone idle. Returns how many were dropped.
    pub fn sweep(&self, now: u64) -> usize {
        self.ledger.sweep(now, |guild_id| {
            self.configs
                .get(&guild_id)
                .map_or(DEFAULT_WINDOW_SECONDS, |config| config.window_seconds)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;
    use crate::config::{EditOp, ExemptionKind};
    use crate::store::MemoryGuardStore;

    const GUILD: u64 = 1_000;
    const OTHER_GUILD: u64 = 2_000;
    const EXECUTOR: u64 = 42;

    async fn enabled_guard(threshold: u32, window_seconds: u64) -> ActionRateGuard<MemoryGuardStore> {
        let guard = ActionRateGuard::new(MemoryGuardStore::new());
        let patch = GuardConfigPatch {
            enabled: Some(true),
            threshold: Some(threshold),
            window_seconds: Some(window_seconds),
            ..Default::default()
        };
        guard.configure(GUILD, &patch).await.unwrap();
        guard
    }

    fn ban(executor_id: u64, timestamp: u64) -> DestructiveAction {
        DestructiveAction {
            guild_id: GUILD,
            executor_id,
            kind: ActionKind::MemberBan,
            timestamp,
            executor_role_ids: Vec::new(),
            executor_is_bot: false,
        }
    }

    struct FailingStore;

    impl GuardConfigStore for FailingStore {
        async fn load(&self, _guild_id: u64) -> anyhow::Result<Option<GuardConfig>> {
            Ok(None)
        }

        async fn save(&self, _guild_id: u64, _config: &GuardConfig) -> anyhow::Result<()> {
            Err(anyhow::anyhow!("database unavailable"))
        }

        async fn delete(&self, _guild_id: u64) -> anyhow::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn burst_triggers_then_window_expires() {
        let guard = enabled_guard(3, 10).await;

        assert_eq!(guard.register_action(GUILD, EXECUTOR, 0), TriggerResult::NotTriggered);
        assert_eq!(guard.register_action(GUILD, EXECUTOR, 1), TriggerResult::NotTriggered);
        assert_eq!(guard.register_action(GUILD, EXECUTOR, 2), TriggerResult::Triggered(3));
        assert_eq!(guard.register_action(GUILD, EXECUTOR, 15), TriggerResult::NotTriggered);
        assert_eq!(guard.ledger().len_for(GUILD, EXECUTOR), 1);
    }

    #[tokio::test]
    async fn threshold_of_one_triggers_every_action() {
        let guard = enabled_guard(1, 10).await;
        assert_eq!(guard.register_action(GUILD, EXECUTOR, 5), TriggerResult::Triggered(1));
        assert_eq!(guard.register_action(GUILD, EXECUTOR, 5), TriggerResult::Triggered(1));
    }

    #[tokio::test]
    async fn disabled_guard_never_records() {
        let guard = ActionRateGuard::new(MemoryGuardStore::new());
        guard.config(GUILD).await.unwrap();

        for at in 0..10 {
            assert_eq!(guard.register_action(GUILD, EXECUTOR, at), TriggerResult::NotTriggered);
        }
        assert_eq!(guard.ledger().len_for(GUILD, EXECUTOR), 0);

        let guard = enabled_guard(2, 10).await;
        guard
            .configure(GUILD, &GuardConfigPatch::enabled(false))
            .await
            .unwrap();
        for at in 0..5 {
            assert!(guard.observe(&ban(EXECUTOR, at)).is_none());
        }
        assert_eq!(guard.ledger().tracked_keys(), 0);
    }

    #[tokio::test]
    async fn invalid_configure_keeps_previous_config() {
        let guard = enabled_guard(4, 30).await;
        let before = guard.config(GUILD).await.unwrap();

        let err = guard
            .configure(GUILD, &GuardConfigPatch::threshold(0))
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::InvalidConfig { field: "threshold", .. }));

        let err = guard
            .configure(GUILD, &GuardConfigPatch::window_seconds(0))
            .await
            .unwrap_err();
        assert!(matches!(err, GuardError::InvalidConfig { field: "window_seconds", .. }));

        let err = guard
            .configure(GUILD, &GuardConfigPatch::threshold(u32::MAX))
            .await
            .unwrap_err();
        assert!(err.is_user_error());

        assert_eq!(guard.config(GUILD).await.unwrap(), before);
        assert_eq!(guard.store().load(GUILD).await.unwrap(), Some(before));
    }

    #[tokio::test]
    async fn store_failure_leaves_cache_untouched() {
        let guard = ActionRateGuard::new(FailingStore);
        let err = guard
            .configure(GUILD, &GuardConfigPatch::enabled(true))
            .await
            .unwrap_err();

        assert!(matches!(err, GuardError::Store(_)));
        assert!(!err.is_user_error());
        assert!(!guard.cached_config(GUILD).enabled);
    }

    #[tokio::test]
    async fn exempt_executors_are_not_recorded() {
        let guard = enabled_guard(1, 10).await;
        guard
            .configure(
                GUILD,
                &GuardConfigPatch::exemption(ExemptionKind::User, EditOp::Add, EXECUTOR),
            )
            .await
            .unwrap();
        guard
            .configure(GUILD, &GuardConfigPatch::exemption(ExemptionKind::Role, EditOp::Add, 77))
            .await
            .unwrap();

        assert!(guard.is_exempt(GUILD, EXECUTOR, &[], false));
        assert!(guard.observe(&ban(EXECUTOR, 0)).is_none());
        assert_eq!(guard.ledger().len_for(GUILD, EXECUTOR), 0);

        let mut with_role = ban(7, 0);
        with_role.executor_role_ids = vec![3, 77];
        assert!(guard.is_exempt(GUILD, 7, &with_role.executor_role_ids, false));
        assert!(guard.observe(&with_role).is_none());
        assert_eq!(guard.ledger().len_for(GUILD, 7), 0);
    }

    #[tokio::test]
    async fn observe_builds_directives_from_config() {
        let guard = enabled_guard(2, 60).await;
        let patch = GuardConfigPatch {
            punishment: Some(PunishmentKind::Ban),
            notify_channel_id: Some(Some(555)),
            notify_role_id: Some(Some(666)),
            notify_owner: Some(true),
            ..Default::default()
        };
        guard.configure(GUILD, &patch).await.unwrap();

        assert!(guard.observe(&ban(EXECUTOR, 100)).is_none());
        let verdict = guard.observe(&ban(EXECUTOR, 101)).expect("second ban triggers");

        assert_eq!(verdict.punishment.kind, PunishmentKind::Ban);
        assert_eq!(verdict.punishment.executor_id, EXECUTOR);
        assert_eq!(verdict.notification.count, 2);
        assert_eq!(verdict.notification.window_seconds, 60);
        assert_eq!(verdict.notification.channel_id, Some(555));
        assert_eq!(verdict.notification.role_id, Some(666));
        assert!(verdict.notification.notify_owner);
        assert_eq!(verdict.notification.action, ActionKind::MemberBan);

        // The burst was consumed; the next action starts a fresh count.
        assert!(guard.observe(&ban(EXECUTOR, 102)).is_none());
        assert_eq!(guard.resolve_punishment(GUILD), PunishmentKind::Ban);
    }

    #[tokio::test]
    async fn reset_counters_is_scoped_to_one_guild() {
        let guard = enabled_guard(10, 60).await;
        guard
            .configure(OTHER_GUILD, &GuardConfigPatch::enabled(true))
            .await
            .unwrap();

        guard.register_action(GUILD, 1, 0);
        guard.register_action(GUILD, 2, 0);
        guard.register_action(OTHER_GUILD, 1, 0);

        assert_eq!(guard.reset_counters(GUILD), 2);
        assert_eq!(guard.ledger().len_for_guild(GUILD), 0);
        assert_eq!(guard.ledger().len_for(OTHER_GUILD, 1), 1);
    }

    #[tokio::test]
    async fn config_is_loaded_from_store_on_miss() {
        let store = MemoryGuardStore::new();
        let stored = GuardConfig {
            enabled: true,
            threshold: 2,
            ..Default::default()
        };
        store.save(GUILD, &stored).await.unwrap();

        let guard = ActionRateGuard::new(store);
        assert!(!guard.cached_config(GUILD).enabled);
        assert_eq!(guard.config(GUILD).await.unwrap(), stored);
        assert!(guard.cached_config(GUILD).enabled);
    }

    #[tokio::test]
    async fn remove_guild_forgets_config_and_ledger() {
        let guard = enabled_guard(5, 60).await;
        guard.register_action(GUILD, EXECUTOR, 0);

        guard.remove_guild(GUILD).await.unwrap();

        assert!(guard.store().is_empty());
        assert_eq!(guard.ledger().tracked_keys(), 0);
        assert_eq!(guard.cached_config(GUILD), GuardConfig::default());
    }

    #[tokio::test]
    async fn sweep_uses_each_guilds_window() {
        let guard = enabled_guard(10, 5).await;
        guard.register_action(GUILD, EXECUTOR, 0);
        guard.register_action(GUILD, 43, 98);

        assert_eq!(guard.sweep(100), 1);
        assert_eq!(guard.ledger().len_for(GUILD, 43), 1);
    }
}
