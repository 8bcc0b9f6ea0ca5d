use std::collections::BTreeSet;

use anyhow::Context as _;
use tracing::warn;

use bastion_antinuke::{ExemptionKind, GuardConfig, GuardConfigStore, PunishmentKind};

use crate::cache::{CONFIG_CACHE_TTL, CacheService, antinuke_config_key, invalidate_antinuke_config};
use crate::database::Database;
use crate::model::antinuke::{AntinukeConfigRow, AntinukeExemptionRow};

const EXEMPTION_KINDS: [ExemptionKind; 3] =
    [ExemptionKind::Bot, ExemptionKind::User, ExemptionKind::Role];

// ---------------------------------------------------------------------------
// Reads
// ---------------------------------------------------------------------------

/// Load a guild's antinuke config. `None` means the guild was never configured.
pub async fn get_antinuke_config(
    db: &Database,
    guild_id: u64,
) -> anyhow::Result<Option<GuardConfig>> {
    let cache_key = antinuke_config_key(db.cache(), guild_id);
    db.cache()
        .get_or_load_json(&cache_key, CONFIG_CACHE_TTL, || {
            load_antinuke_config(db, guild_id)
        })
        .await
}

async fn load_antinuke_config(db: &Database, guild_id: u64) -> anyhow::Result<Option<GuardConfig>> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    let row = sqlx::query_as::<_, AntinukeConfigRow>(
        "SELECT guild_id, enabled, threshold, window_seconds, punishment, \
         notify_channel_id, notify_role_id, notify_owner \
         FROM antinuke_config WHERE guild_id = $1",
    )
    .bind(guild_id_i64)
    .fetch_optional(db.pool())
    .await?;

    let Some(row) = row else {
        return Ok(None);
    };

    let exemptions = sqlx::query_as::<_, AntinukeExemptionRow>(
        "SELECT kind, target_id FROM antinuke_exemptions WHERE guild_id = $1",
    )
    .bind(guild_id_i64)
    .fetch_all(db.pool())
    .await?;

    config_from_rows(row, exemptions).map(Some)
}

fn config_from_rows(
    row: AntinukeConfigRow,
    exemptions: Vec<AntinukeExemptionRow>,
) -> anyhow::Result<GuardConfig> {
    let punishment = row
        .punishment
        .parse::<PunishmentKind>()
        .context("stored antinuke punishment is invalid")?;

    let mut config = GuardConfig {
        enabled: row.enabled,
        threshold: u32::try_from(row.threshold).context("threshold out of u32 range")?,
        window_seconds: u64::try_from(row.window_seconds)
            .context("window_seconds out of u64 range")?,
        punishment,
        bot_allowlist: BTreeSet::new(),
        user_allowlist: BTreeSet::new(),
        exempt_roles: BTreeSet::new(),
        notify_channel_id: row
            .notify_channel_id
            .map(u64::try_from)
            .transpose()
            .context("notify_channel_id out of u64 range")?,
        notify_role_id: row
            .notify_role_id
            .map(u64::try_from)
            .transpose()
            .context("notify_role_id out of u64 range")?,
        notify_owner: row.notify_owner,
    };

    for exemption in exemptions {
        let Some(kind) = ExemptionKind::parse(&exemption.kind) else {
            anyhow::bail!("unknown antinuke exemption kind `{}`", exemption.kind);
        };
        let target_id = u64::try_from(exemption.target_id).context("target_id out of u64 range")?;

        match kind {
            ExemptionKind::Bot => config.bot_allowlist.insert(target_id),
            ExemptionKind::User => config.user_allowlist.insert(target_id),
            ExemptionKind::Role => config.exempt_roles.insert(target_id),
        };
    }

    config.validate()?;
    Ok(config)
}

// ---------------------------------------------------------------------------
// Writes
// ---------------------------------------------------------------------------

/// Replace the stored config for a guild. The row and its exemptions are
/// written in one transaction.
pub async fn save_antinuke_config(
    db: &Database,
    guild_id: u64,
    config: &GuardConfig,
) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;
    let threshold = i32::try_from(config.threshold).context("threshold out of i32 range")?;
    let window_seconds =
        i64::try_from(config.window_seconds).context("window_seconds out of i64 range")?;
    let notify_channel_id = config
        .notify_channel_id
        .map(i64::try_from)
        .transpose()
        .context("notify_channel_id out of i64 range")?;
    let notify_role_id = config
        .notify_role_id
        .map(i64::try_from)
        .transpose()
        .context("notify_role_id out of i64 range")?;

    let (kinds, target_ids) = exemption_columns(config)?;

    let mut tx = db.pool().begin().await?;

    sqlx::query(
        "INSERT INTO antinuke_config \
         (guild_id, enabled, threshold, window_seconds, punishment, \
          notify_channel_id, notify_role_id, notify_owner) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
         ON CONFLICT (guild_id) DO UPDATE SET \
         enabled = EXCLUDED.enabled, \
         threshold = EXCLUDED.threshold, \
         window_seconds = EXCLUDED.window_seconds, \
         punishment = EXCLUDED.punishment, \
         notify_channel_id = EXCLUDED.notify_channel_id, \
         notify_role_id = EXCLUDED.notify_role_id, \
         notify_owner = EXCLUDED.notify_owner",
    )
    .bind(guild_id_i64)
    .bind(config.enabled)
    .bind(threshold)
    .bind(window_seconds)
    .bind(config.punishment.as_str())
    .bind(notify_channel_id)
    .bind(notify_role_id)
    .bind(config.notify_owner)
    .execute(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM antinuke_exemptions WHERE guild_id = $1")
        .bind(guild_id_i64)
        .execute(&mut *tx)
        .await?;

    if !kinds.is_empty() {
        sqlx::query(
            "INSERT INTO antinuke_exemptions (guild_id, kind, target_id) \
             SELECT $1, kind, target_id FROM UNNEST($2::TEXT[], $3::BIGINT[]) AS t(kind, target_id)",
        )
        .bind(guild_id_i64)
        .bind(kinds)
        .bind(target_ids)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    invalidate_after_write(db.cache(), guild_id).await;

    Ok(())
}

/// Remove a guild's config; exemptions cascade.
pub async fn delete_antinuke_config(db: &Database, guild_id: u64) -> anyhow::Result<()> {
    let guild_id_i64 = i64::try_from(guild_id).context("guild_id out of i64 range")?;

    sqlx::query("DELETE FROM antinuke_config WHERE guild_id = $1")
        .bind(guild_id_i64)
        .execute(db.pool())
        .await?;

    invalidate_after_write(db.cache(), guild_id).await;

    Ok(())
}

/// Drop the cached config once Postgres has committed. The write already
/// happened, so a cache failure is logged rather than returned; the stale
/// entry expires with [`CONFIG_CACHE_TTL`]. Returns whether the key was dropped.
async fn invalidate_after_write(cache: &CacheService, guild_id: u64) -> bool {
    match invalidate_antinuke_config(cache, guild_id).await {
        Ok(()) => true,
        Err(e) => {
            warn!(?e, guild_id, "antinuke config cache invalidation failed after commit");
            false
        }
    }
}

fn exemption_columns(config: &GuardConfig) -> anyhow::Result<(Vec<String>, Vec<i64>)> {
    let mut kinds = Vec::new();
    let mut target_ids = Vec::new();

    for kind in EXEMPTION_KINDS {
        for &target_id in config.exemptions(kind) {
            kinds.push(kind.as_str().to_owned());
            target_ids.push(i64::try_from(target_id).context("target_id out of i64 range")?);
        }
    }

    Ok((kinds, target_ids))
}

impl GuardConfigStore for Database {
    async fn load(&self, guild_id: u64) -> anyhow::Result<Option<GuardConfig>> {
        get_antinuke_config(self, guild_id).await
    }

    async fn save(&self, guild_id: u64, config: &GuardConfig) -> anyhow::Result<()> {
        save_antinuke_config(self, guild_id, config).await
    }

    async fn delete(&self, guild_id: u64) -> anyhow::Result<()> {
        delete_antinuke_config(self, guild_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> AntinukeConfigRow {
        AntinukeConfigRow {
            guild_id: 1,
            enabled: true,
            threshold: 4,
            window_seconds: 20,
            punishment: "ban".to_owned(),
            notify_channel_id: Some(10),
            notify_role_id: None,
            notify_owner: true,
        }
    }

    fn exemption(kind: &str, target_id: i64) -> AntinukeExemptionRow {
        AntinukeExemptionRow {
            kind: kind.to_owned(),
            target_id,
        }
    }

    #[test]
    fn rows_map_onto_guard_config() {
        let config = config_from_rows(
            row(),
            vec![exemption("bot", 1), exemption("user", 2), exemption("role", 3)],
        )
        .unwrap();

        assert!(config.enabled);
        assert_eq!(config.threshold, 4);
        assert_eq!(config.window_seconds, 20);
        assert_eq!(config.punishment, PunishmentKind::Ban);
        assert_eq!(config.notify_channel_id, Some(10));
        assert!(config.bot_allowlist.contains(&1));
        assert!(config.user_allowlist.contains(&2));
        assert!(config.exempt_roles.contains(&3));
    }

    #[test]
    fn rejects_corrupt_rows() {
        let mut bad = row();
        bad.punishment = "mute".to_owned();
        assert!(config_from_rows(bad, Vec::new()).is_err());

        assert!(config_from_rows(row(), vec![exemption("channel", 1)]).is_err());

        let mut negative = row();
        negative.threshold = -1;
        assert!(config_from_rows(negative, Vec::new()).is_err());
    }

    #[tokio::test]
    async fn cache_failure_after_commit_is_not_an_error() {
        // Nothing listens on port 1, so every Redis call fails.
        let cache = CacheService::redis("redis://127.0.0.1:1", "bastion:test").unwrap();
        assert!(!invalidate_after_write(&cache, 42).await);

        let disabled = CacheService::disabled("bastion:test");
        assert!(invalidate_after_write(&disabled, 42).await);
    }

    #[test]
    fn exemption_columns_line_up() {
        let mut config = GuardConfig::default();
        config.user_allowlist.insert(5);
        config.exempt_roles.insert(6);
        config.exempt_roles.insert(7);

        let (kinds, ids) = exemption_columns(&config).unwrap();
        assert_eq!(kinds, vec!["user", "role", "role"]);
        assert_eq!(ids, vec![5, 6, 7]);
    }
}
