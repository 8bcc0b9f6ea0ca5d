use std::time::Duration;

use poise::serenity_prelude as serenity;
use tracing::info;

use bastion_antinuke::GuardConfig;
use bastion_core::{Context, Error};
use bastion_utils::confirmation::{Confirmation, confirm_action};
use bastion_utils::embed::{alert_embed, info_embed, labelled_lines};
use bastion_utils::formatting::{format_compact_duration, user_mention};
use bastion_utils::parse::parse_user_id;

use super::embeds::usage_message;
use super::{argument, command_guild, manager_check};
use crate::CommandMeta;

const RESET_CONFIRM_TIMEOUT: Duration = Duration::from_secs(30);

pub const RESET_COUNTS_META: CommandMeta = CommandMeta {
    name: "antinuke reset_counts",
    desc: "Forget every recorded action in this server.",
    category: "antinuke",
    usage: "!antinuke reset_counts",
};

pub const TEST_META: CommandMeta = CommandMeta {
    name: "antinuke test",
    desc: "Dry run: show what antinuke would do to a member.",
    category: "antinuke",
    usage: "!antinuke test [member]",
};

/// Forget every recorded action in this server.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
)]
pub async fn reset_counts(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = command_guild(ctx)?;

    let tracked = ctx.data().guard.ledger().len_for_guild(guild_id.get());
    let prompt = alert_embed(
        "Reset antinuke counters?",
        format!(
            "This forgets **{tracked}** recorded action(s) in this server. \
             Executors start again from zero."
        ),
    );

    let outcome = confirm_action(
        ctx,
        prompt,
        RESET_CONFIRM_TIMEOUT,
        "Antinuke counters have been reset.",
    )
    .await?;

    if outcome == Confirmation::Confirmed {
        let cleared = ctx.data().guard.reset_counters(guild_id.get());
        info!(
            guild_id = %guild_id,
            moderator_id = %ctx.author().id,
            cleared,
            "antinuke counters reset"
        );
    }

    Ok(())
}

/// Dry run: show what antinuke would do to a member.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
)]
pub async fn test(
    ctx: Context<'_>,
    #[description = "Member mention or id (defaults to you)"] member: Option<String>,
) -> Result<(), Error> {
    let guild_id = command_guild(ctx)?;

    let target_id = match argument(member.as_deref()) {
        None => ctx.author().id,
        Some(raw) => {
            let Some(id) = parse_user_id(raw) else {
                ctx.say(usage_message(TEST_META.usage)).await?;
                return Ok(());
            };
            serenity::UserId::new(id)
        }
    };

    let Ok(target) = guild_id.member(ctx.http(), target_id).await else {
        ctx.say("I couldn't find that member in this server.").await?;
        return Ok(());
    };

    let config = ctx.data().guard.config(guild_id.get()).await?;
    let role_ids: Vec<u64> = target.roles.iter().map(|role| role.get()).collect();
    let recorded = ctx
        .data()
        .guard
        .ledger()
        .len_for(guild_id.get(), target_id.get());

    let embed = info_embed(
        "Antinuke Dry Run",
        dry_run_description(&config, target_id.get(), &role_ids, target.user.bot, recorded),
        Some("Nothing was changed."),
    );
    ctx.send(poise::CreateReply::default().embed(embed)).await?;

    Ok(())
}

fn dry_run_description(
    config: &GuardConfig,
    member_id: u64,
    role_ids: &[u64],
    is_bot: bool,
    recorded: usize,
) -> String {
    let mention = user_mention(member_id);
    let window = format_compact_duration(config.window_seconds);
    let exempt = config.is_exempt(member_id, role_ids, is_bot);

    let verdict = if !config.enabled {
        "Antinuke is disabled, so no action would be taken.".to_owned()
    } else if exempt {
        format!("{mention} is exempt. Their actions are never counted.")
    } else {
        let threshold = usize::try_from(config.threshold).unwrap_or(usize::MAX);
        let remaining = threshold.saturating_sub(recorded).max(1);
        format!(
            "{remaining} more destructive action(s) within {window} would get {mention} **{}**.",
            config.punishment.past_tense()
        )
    };

    let details = labelled_lines(&[
        ("Member", mention.clone()),
        ("Exempt", if exempt { "Yes" } else { "No" }.to_owned()),
        ("Recorded Actions", format!("{recorded} in the last {window}")),
        ("Punishment", config.punishment.to_string()),
    ]);

    format!("{details}\n\n{verdict}")
}

#[cfg(test)]
mod tests {
    use super::dry_run_description;
    use bastion_antinuke::{GuardConfig, PunishmentKind};

    fn enabled() -> GuardConfig {
        GuardConfig {
            enabled: true,
            ..GuardConfig::default()
        }
    }

    #[test]
    fn disabled_guard_takes_no_action() {
        let description = dry_run_description(&GuardConfig::default(), 7, &[], false, 0);
        assert!(description.contains("no action would be taken"));
    }

    #[test]
    fn reports_remaining_actions() {
        let description = dry_run_description(&enabled(), 7, &[], false, 1);
        assert!(description.contains("2 more destructive action(s) within 10s"));
        assert!(description.contains("**kicked**"));
        assert!(description.contains("**Recorded Actions :** 1 in the last 10s"));
    }

    #[test]
    fn exempt_roles_are_reported() {
        let mut config = enabled();
        config.exempt_roles.insert(99);
        config.punishment = PunishmentKind::Ban;

        let description = dry_run_description(&config, 7, &[99], false, 0);
        assert!(description.contains("**Exempt :** Yes"));
        assert!(description.contains("is exempt"));
    }

    #[test]
    fn bots_need_the_bot_allowlist() {
        let mut config = enabled();
        config.user_allowlist.insert(7);

        let description = dry_run_description(&config, 7, &[], true, 0);
        assert!(description.contains("**Exempt :** No"));
    }
}
