use poise::serenity_prelude as serenity;
use tracing::{error, info, warn};

use bastion_antinuke::{NotificationDirective, PunishmentDirective, PunishmentKind};
use bastion_utils::embed::{alert_embed, labelled_lines};
use bastion_utils::formatting::{format_compact_duration, role_mention, user_mention};

const ENFORCEMENT_REASON: &str = "Antinuke triggered";

/// Carry out a punishment. Failures are logged and never retried; the return
/// value reports whether Discord accepted the request.
pub async fn enforce(ctx: &serenity::Context, directive: &PunishmentDirective) -> bool {
    let guild_id = serenity::GuildId::new(directive.guild_id);
    let user_id = serenity::UserId::new(directive.executor_id);

    let result = match directive.kind {
        PunishmentKind::Kick => guild_id
            .kick_with_reason(&ctx.http, user_id, ENFORCEMENT_REASON)
            .await,
        PunishmentKind::Ban => guild_id
            .ban_with_reason(&ctx.http, user_id, 0, ENFORCEMENT_REASON)
            .await,
        PunishmentKind::Demote => demote(ctx, guild_id, user_id).await,
    };

    match result {
        Ok(()) => {
            info!(
                guild_id = %guild_id,
                executor_id = %user_id,
                punishment = %directive.kind,
                "antinuke punishment applied"
            );
            true
        }
        Err(source) if is_missing_permissions(&source) => {
            warn!(
                guild_id = %guild_id,
                executor_id = %user_id,
                punishment = %directive.kind,
                "missing permissions to apply antinuke punishment"
            );
            false
        }
        Err(source) => {
            error!(
                ?source,
                guild_id = %guild_id,
                executor_id = %user_id,
                punishment = %directive.kind,
                "failed to apply antinuke punishment"
            );
            false
        }
    }
}

/// Strip every role Discord lets us remove. Managed (integration) roles stay.
async fn demote(
    ctx: &serenity::Context,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> Result<(), serenity::Error> {
    let member = guild_id.member(ctx, user_id).await?;
    let guild_roles = guild_id.roles(&ctx.http).await?;

    let kept: Vec<serenity::RoleId> = member
        .roles
        .iter()
        .copied()
        .filter(|role_id| guild_roles.get(role_id).is_some_and(|role| role.managed))
        .collect();

    guild_id
        .edit_member(
            ctx,
            user_id,
            serenity::EditMember::new()
                .roles(kept)
                .audit_log_reason(ENFORCEMENT_REASON),
        )
        .await?;

    Ok(())
}

fn is_missing_permissions(source: &serenity::Error) -> bool {
    matches!(
        source,
        serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response))
            if response.status_code.as_u16() == 403 || response.error.code == 50013
    )
}

/// Post the alert to the notify channel (or the system channel when none is
/// set) and DM the owner when asked to. Best effort throughout.
pub async fn notify(ctx: &serenity::Context, directive: &NotificationDirective, applied: bool) {
    let guild_id = serenity::GuildId::new(directive.guild_id);

    let needs_guild = directive.channel_id.is_none() || directive.notify_owner;
    let guild = if needs_guild {
        match guild_id.to_partial_guild(ctx).await {
            Ok(guild) => Some(guild),
            Err(source) => {
                warn!(?source, guild_id = %guild_id, "failed to fetch guild for antinuke alert");
                None
            }
        }
    } else {
        None
    };

    let embed = alert_embed("Antinuke Triggered", alert_description(directive, applied));

    let channel_id = directive
        .channel_id
        .map(serenity::ChannelId::new)
        .or_else(|| guild.as_ref().and_then(|guild| guild.system_channel_id));

    if let Some(channel_id) = channel_id {
        let mut message = serenity::CreateMessage::new().embed(embed.clone());
        if let Some(role_id) = directive.role_id {
            message = message.content(role_mention(role_id));
        }

        if let Err(source) = channel_id.send_message(&ctx.http, message).await {
            warn!(?source, guild_id = %guild_id, channel_id = %channel_id, "failed to post antinuke alert");
        }
    }

    if directive.notify_owner
        && let Some(guild) = guild
    {
        let dm = serenity::CreateMessage::new().embed(embed);
        if let Err(source) = guild.owner_id.direct_message(ctx, dm).await {
            warn!(?source, guild_id = %guild_id, "failed to DM guild owner about antinuke alert");
        }
    }
}

fn alert_description(directive: &NotificationDirective, applied: bool) -> String {
    let outcome = if applied {
        directive.punishment.past_tense().to_owned()
    } else {
        format!("could not be {}", directive.punishment.past_tense())
    };

    let summary = format!(
        "{} was punished for {}.",
        user_mention(directive.executor_id),
        directive.action.label()
    );

    let details = labelled_lines(&[
        (
            "Executor",
            format!("{} ({})", user_mention(directive.executor_id), directive.executor_id),
        ),
        (
            "Trigger",
            format!(
                "{} {} within {}",
                directive.count,
                directive.action.label(),
                format_compact_duration(directive.window_seconds)
            ),
        ),
        ("Punishment", outcome),
    ]);

    format!("{summary}\n\n{details}")
}

#[cfg(test)]
mod tests {
    use super::alert_description;
    use bastion_antinuke::{ActionKind, NotificationDirective, PunishmentKind};

    fn directive() -> NotificationDirective {
        NotificationDirective {
            guild_id: 1,
            executor_id: 42,
            punishment: PunishmentKind::Ban,
            action: ActionKind::RoleDelete,
            count: 3,
            window_seconds: 10,
            channel_id: None,
            role_id: None,
            notify_owner: false,
        }
    }

    #[test]
    fn describes_applied_punishment() {
        let description = alert_description(&directive(), true);

        assert!(description.starts_with("<@42> was punished for role deletions."));
        assert!(description.contains("**Executor :** <@42> (42)"));
        assert!(description.contains("**Trigger :** 3 role deletions within 10s"));
        assert!(description.contains("**Punishment :** banned"));
    }

    #[test]
    fn describes_failed_punishment() {
        let description = alert_description(&directive(), false);
        assert!(description.contains("**Punishment :** could not be banned"));
    }
}
