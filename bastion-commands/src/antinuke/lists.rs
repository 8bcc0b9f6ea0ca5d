use bastion_antinuke::{EditOp, ExemptionKind, GuardConfigPatch};
use bastion_core::{Context, Error};
use bastion_utils::embed::info_embed;
use bastion_utils::formatting::{mention_list, role_mention, user_mention};
use bastion_utils::parse::{parse_role_id, parse_user_id};

use super::embeds::usage_message;
use super::{apply_patch, argument, command_guild, manager_check};
use crate::CommandMeta;

pub const BOT_META: CommandMeta = CommandMeta {
    name: "antinuke bot",
    desc: "Manage bots that may perform destructive actions freely.",
    category: "antinuke",
    usage: "!antinuke bot <add|remove|list> [bot]",
};

pub const USER_META: CommandMeta = CommandMeta {
    name: "antinuke add",
    desc: "Manage users that may perform destructive actions freely (add/remove/list).",
    category: "antinuke",
    usage: "!antinuke <add|remove> <user> | !antinuke list",
};

pub const ROLE_META: CommandMeta = CommandMeta {
    name: "antinuke exadd",
    desc: "Manage roles whose members are exempt (exadd/exremove/exlist).",
    category: "antinuke",
    usage: "!antinuke <exadd|exremove> <role> | !antinuke exlist",
};

fn list_title(kind: ExemptionKind) -> &'static str {
    match kind {
        ExemptionKind::Bot => "Allowlisted Bots",
        ExemptionKind::User => "Allowlisted Users",
        ExemptionKind::Role => "Exempt Roles",
    }
}

fn mention_for(kind: ExemptionKind) -> fn(u64) -> String {
    match kind {
        ExemptionKind::Bot | ExemptionKind::User => user_mention,
        ExemptionKind::Role => role_mention,
    }
}

fn parse_target(kind: ExemptionKind, raw: &str) -> Option<u64> {
    match kind {
        ExemptionKind::Bot | ExemptionKind::User => parse_user_id(raw),
        ExemptionKind::Role => parse_role_id(raw),
    }
}

async fn edit_exemption(
    ctx: Context<'_>,
    kind: ExemptionKind,
    op: EditOp,
    input: Option<&str>,
    usage: &str,
) -> Result<(), Error> {
    let guild_id = command_guild(ctx)?;

    let Some(id) = argument(input).and_then(|raw| parse_target(kind, raw)) else {
        ctx.say(usage_message(usage)).await?;
        return Ok(());
    };

    let mention = mention_for(kind)(id);
    let current = ctx.data().guard.config(guild_id.get()).await?;
    let listed = current.exemptions(kind).contains(&id);
    let title = list_title(kind).to_lowercase();

    match (op, listed) {
        (EditOp::Add, true) => {
            ctx.say(format!("{mention} is already in {title}.")).await?;
            return Ok(());
        }
        (EditOp::Remove, false) => {
            ctx.say(format!("{mention} is not in {title}.")).await?;
            return Ok(());
        }
        _ => {}
    }

    apply_patch(ctx, guild_id, GuardConfigPatch::exemption(kind, op, id), |_| match op {
        EditOp::Add => format!("Added {mention} to {title}."),
        EditOp::Remove => format!("Removed {mention} from {title}."),
    })
    .await
}

async fn show_exemptions(ctx: Context<'_>, kind: ExemptionKind) -> Result<(), Error> {
    let guild_id = command_guild(ctx)?;

    let config = ctx.data().guard.config(guild_id.get()).await?;
    let entries = config.exemptions(kind);
    let description = mention_list(entries, mention_for(kind), "Nothing here yet.");

    ctx.send(poise::CreateReply::default().embed(info_embed(
        list_title(kind),
        description,
        Some(&format!("{} entr{}", entries.len(), if entries.len() == 1 { "y" } else { "ies" })),
    )))
    .await?;

    Ok(())
}

/// Manage bots that may perform destructive actions freely.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    subcommands("bot_add", "bot_remove", "bot_list")
)]
pub async fn bot(ctx: Context<'_>) -> Result<(), Error> {
    show_exemptions(ctx, ExemptionKind::Bot).await
}

/// Allowlist a bot.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
    rename = "add",
)]
pub async fn bot_add(
    ctx: Context<'_>,
    #[description = "Bot mention or id"] bot: Option<String>,
) -> Result<(), Error> {
    edit_exemption(ctx, ExemptionKind::Bot, EditOp::Add, bot.as_deref(), BOT_META.usage).await
}

/// Remove a bot from the allowlist.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
    rename = "remove",
)]
pub async fn bot_remove(
    ctx: Context<'_>,
    #[description = "Bot mention or id"] bot: Option<String>,
) -> Result<(), Error> {
    edit_exemption(ctx, ExemptionKind::Bot, EditOp::Remove, bot.as_deref(), BOT_META.usage).await
}

/// List allowlisted bots.
#[poise::command(prefix_command, slash_command, category = "Antinuke", guild_only, rename = "list")]
pub async fn bot_list(ctx: Context<'_>) -> Result<(), Error> {
    show_exemptions(ctx, ExemptionKind::Bot).await
}

/// Allowlist a user.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "User mention or id"] user: Option<String>,
) -> Result<(), Error> {
    edit_exemption(ctx, ExemptionKind::User, EditOp::Add, user.as_deref(), USER_META.usage).await
}

/// Remove a user from the allowlist.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "User mention or id"] user: Option<String>,
) -> Result<(), Error> {
    edit_exemption(ctx, ExemptionKind::User, EditOp::Remove, user.as_deref(), USER_META.usage).await
}

/// List allowlisted users.
#[poise::command(prefix_command, slash_command, category = "Antinuke", guild_only)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    show_exemptions(ctx, ExemptionKind::User).await
}

/// Exempt a role.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
)]
pub async fn exadd(
    ctx: Context<'_>,
    #[description = "Role mention or id"] role: Option<String>,
) -> Result<(), Error> {
    edit_exemption(ctx, ExemptionKind::Role, EditOp::Add, role.as_deref(), ROLE_META.usage).await
}

/// Remove a role exemption.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
)]
pub async fn exremove(
    ctx: Context<'_>,
    #[description = "Role mention or id"] role: Option<String>,
) -> Result<(), Error> {
    edit_exemption(ctx, ExemptionKind::Role, EditOp::Remove, role.as_deref(), ROLE_META.usage).await
}

/// List exempt roles.
#[poise::command(prefix_command, slash_command, category = "Antinuke", guild_only)]
pub async fn exlist(ctx: Context<'_>) -> Result<(), Error> {
    show_exemptions(ctx, ExemptionKind::Role).await
}
