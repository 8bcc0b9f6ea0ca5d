use ::serenity::model::guild::audit_log::{
    Action, AuditLogEntry, ChannelAction, MemberAction, RoleAction,
};
use ::serenity::model::id::AuditLogEntryId;
use poise::serenity_prelude as serenity;
use tracing::{debug, error, warn};

use bastion_antinuke::{ActionKind, DestructiveAction};
use bastion_core::Data;
use bastion_utils::time::now_unix_secs;

use crate::enforcement::{enforce, notify};

/// Audit entries older than this are not attributed to a fresh gateway event.
const MAX_AUDIT_ENTRY_AGE_SECS: u64 = 30;
const AUDIT_LOG_LOOKUP_LIMIT: u8 = 5;

fn audit_action(kind: ActionKind) -> Action {
    match kind {
        ActionKind::MemberBan => Action::Member(MemberAction::BanAdd),
        ActionKind::MemberKick => Action::Member(MemberAction::Kick),
        ActionKind::RoleDelete => Action::Role(RoleAction::Delete),
        ActionKind::ChannelDelete => Action::Channel(ChannelAction::Delete),
    }
}

/// When the audit entry was written, in unix seconds.
fn entry_unix_secs(id: AuditLogEntryId) -> u64 {
    u64::try_from(id.created_at().unix_timestamp()).unwrap_or(0)
}

/// Newest entry whose target matches and that is recent enough to belong to
/// the event being handled.
fn matching_entry(entries: &[AuditLogEntry], target_id: u64, now: u64) -> Option<&AuditLogEntry> {
    entries
        .iter()
        .filter(|entry| entry.target_id.is_some_and(|id| id.get() == target_id))
        .filter(|entry| {
            now.saturating_sub(entry_unix_secs(entry.id)) <= MAX_AUDIT_ENTRY_AGE_SECS
        })
        .max_by_key(|entry| entry.id)
}

/// Feed one gateway event through the guard and carry out the verdict.
pub async fn handle_destructive_event(
    ctx: &serenity::Context,
    data: &Data,
    guild_id: serenity::GuildId,
    kind: ActionKind,
    target_id: u64,
) {
    // Hydrates the guard's cache; the decision path below never awaits the store.
    let config = match data.guard.config(guild_id.get()).await {
        Ok(config) => config,
        Err(source) => {
            error!(?source, guild_id = %guild_id, "failed to load antinuke config");
            return;
        }
    };

    if !config.enabled {
        return;
    }

    let logs = match guild_id
        .audit_logs(
            &ctx.http,
            Some(audit_action(kind)),
            None,
            None,
            Some(AUDIT_LOG_LOOKUP_LIMIT),
        )
        .await
    {
        Ok(logs) => logs,
        Err(source) => {
            warn!(?source, guild_id = %guild_id, %kind, "failed to read audit log");
            return;
        }
    };

    let Some(entry) = matching_entry(&logs.entries, target_id, now_unix_secs()) else {
        debug!(guild_id = %guild_id, %kind, target_id, "no matching audit entry");
        return;
    };

    let executor_id = entry.user_id;
    if executor_id == ctx.cache.current_user().id {
        return;
    }

    let (executor_role_ids, executor_is_bot) = executor_details(ctx, guild_id, executor_id).await;

    let action = DestructiveAction {
        guild_id: guild_id.get(),
        executor_id: executor_id.get(),
        kind,
        timestamp: entry_unix_secs(entry.id),
        executor_role_ids,
        executor_is_bot,
    };

    let Some(verdict) = data.guard.observe(&action) else {
        return;
    };

    let applied = enforce(ctx, &verdict.punishment).await;
    notify(ctx, &verdict.notification, applied).await;
}

/// Role ids and bot flag of the executor. An executor that already left the
/// guild is treated as holding no roles.
async fn executor_details(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    executor_id: serenity::UserId,
) -> (Vec<u64>, bool) {
    match guild_id.member(ctx, executor_id).await {
        Ok(member) => (
            member.roles.iter().map(|role| role.get()).collect(),
            member.user.bot,
        ),
        Err(member_error) => match executor_id.to_user(ctx).await {
            Ok(user) => (Vec::new(), user.bot),
            Err(source) => {
                warn!(
                    ?member_error,
                    ?source,
                    executor_id = %executor_id,
                    "failed to resolve antinuke executor"
                );
                (Vec::new(), false)
            }
        },
    }
}

/// The bot was removed from a guild; forget its antinuke state.
pub async fn handle_guild_removed(data: &Data, guild_id: serenity::GuildId) {
    if let Err(source) = data.guard.remove_guild(guild_id.get()).await {
        error!(?source, guild_id = %guild_id, "failed to drop antinuke state for guild");
    }
}

#[cfg(test)]
mod tests {
    use super::{AuditLogEntryId, entry_unix_secs};

    #[test]
    fn audit_entry_time_comes_from_its_id() {
        // Example id from the Discord developer docs.
        let id = AuditLogEntryId::new(175_928_847_299_117_063);
        assert_eq!(entry_unix_secs(id), 1_462_015_105);
    }
}
