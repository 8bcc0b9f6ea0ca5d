pub mod embeds;
pub mod lists;
pub mod maintenance;
pub mod settings;

use poise::serenity_prelude as serenity;

use crate::CommandMeta;
use bastion_antinuke::{GuardConfig, GuardConfigPatch};
use bastion_core::{Context, Error};
use bastion_utils::permissions::has_user_permission;
use embeds::{missing_permission_message, status_embed};
use lists::{add, bot, exadd, exlist, exremove, list, remove};
use maintenance::{reset_counts, test};
use settings::{disable, enable, notifychannel, notifyowner, notifyrole, punish, threshold, window};

pub const META: CommandMeta = CommandMeta {
    name: "antinuke",
    desc: "Show the antinuke configuration for this server.",
    category: "antinuke",
    usage: "!antinuke",
};

/// Show the antinuke configuration for this server.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    subcommands(
        "enable",
        "disable",
        "threshold",
        "window",
        "punish",
        "bot",
        "add",
        "remove",
        "list",
        "exadd",
        "exremove",
        "exlist",
        "notifychannel",
        "notifyrole",
        "notifyowner",
        "reset_counts",
        "test"
    )
)]
pub async fn antinuke(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = command_guild(ctx)?;

    let config = ctx.data().guard.config(guild_id.get()).await?;
    let tracked = ctx.data().guard.ledger().len_for_guild(guild_id.get());

    ctx.send(poise::CreateReply::default().embed(status_embed(&config, tracked)))
        .await?;

    Ok(())
}

/// Guild of the invocation. Every antinuke command is `guild_only`, so poise
/// rejects DM invocations before the body runs.
pub(crate) fn command_guild(ctx: Context<'_>) -> Result<serenity::GuildId, Error> {
    ctx.guild_id().ok_or_else(|| {
        anyhow::anyhow!("antinuke command `{}` ran outside a guild", ctx.command().name)
    })
}

/// Gate for commands that change antinuke state. Read-only commands skip it.
pub(crate) async fn manager_check(ctx: Context<'_>) -> Result<bool, Error> {
    let Some(guild_id) = ctx.guild_id() else {
        return Ok(false);
    };

    let allowed = has_user_permission(
        ctx.http(),
        guild_id,
        ctx.author().id,
        serenity::Permissions::MANAGE_GUILD,
    )
    .await?;

    if !allowed {
        ctx.say(missing_permission_message()).await?;
    }

    Ok(allowed)
}

/// Apply `patch` through the guard. Rejected input is reported back to the
/// admin; backend failures propagate to `on_error`.
pub(crate) async fn apply_patch<F>(
    ctx: Context<'_>,
    guild_id: serenity::GuildId,
    patch: GuardConfigPatch,
    confirmation: F,
) -> Result<(), Error>
where
    F: FnOnce(&GuardConfig) -> String,
{
    match ctx.data().guard.configure(guild_id.get(), &patch).await {
        Ok(config) => {
            ctx.say(confirmation(&config)).await?;
        }
        Err(source) if source.is_user_error() => {
            ctx.say(source.to_string()).await?;
        }
        Err(source) => return Err(source.into()),
    }

    Ok(())
}

/// Trimmed, non-empty free-text argument.
pub(crate) fn argument(input: Option<&str>) -> Option<&str> {
    input.map(str::trim).filter(|raw| !raw.is_empty())
}
