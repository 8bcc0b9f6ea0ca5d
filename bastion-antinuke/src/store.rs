use std::future::Future;
use std::sync::Arc;

use dashmap::DashMap;

use crate::config::GuardConfig;

/// Where guard configs are persisted. `load` returning `Ok(None)` means the
/// guild was never configured and defaults apply.
pub trait GuardConfigStore: Send + Sync {
    fn load(
        &self,
        guild_id: u64,
    ) -> impl Future<Output = anyhow::Result<Option<GuardConfig>>> + Send;

    fn save(
        &self,
        guild_id: u64,
        config: &GuardConfig,
    ) -> impl Future<Output = anyhow::Result<()>> + Send;

    fn delete(&self, guild_id: u64) -> impl Future<Output = anyhow::Result<()>> + Send;
}

/// Process-local store, used in tests and when running without a database.
#[derive(Clone, Debug, Default)]
pub struct MemoryGuardStore {
    configs: Arc<DashMap<u64, GuardConfig>>,
}

impl MemoryGuardStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.configs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.configs.is_empty()
    }
}

impl GuardConfigStore for MemoryGuardStore {
    async fn load(&self, guild_id: u64) -> anyhow::Result<Option<GuardConfig>> {
        Ok(self.configs.get(&guild_id).map(|config| config.clone()))
    }

    async fn save(&self, guild_id: u64, config: &GuardConfig) -> anyhow::Result<()> {
        self.configs.insert(guild_id, config.clone());
        Ok(())
    }

    async fn delete(&self, guild_id: u64) -> anyhow::Result<()> {
        self.configs.remove(&guild_id);
        Ok(())
    }
}
