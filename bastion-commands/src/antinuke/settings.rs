use bastion_antinuke::{GuardConfigPatch, PunishmentKind};
use bastion_core::{Context, Error};
use bastion_utils::formatting::{channel_mention, format_compact_duration, role_mention};
use bastion_utils::parse::{
    is_clear_keyword, parse_channel_id, parse_duration_seconds, parse_role_id, parse_toggle,
};

use super::embeds::usage_message;
use super::{apply_patch, argument, command_guild, manager_check};
use crate::CommandMeta;

pub const ENABLE_META: CommandMeta = CommandMeta {
    name: "antinuke enable",
    desc: "Start watching for mass destructive actions.",
    category: "antinuke",
    usage: "!antinuke enable",
};

pub const DISABLE_META: CommandMeta = CommandMeta {
    name: "antinuke disable",
    desc: "Stop watching for mass destructive actions.",
    category: "antinuke",
    usage: "!antinuke disable",
};

pub const THRESHOLD_META: CommandMeta = CommandMeta {
    name: "antinuke threshold",
    desc: "Set how many actions inside the window trigger a punishment.",
    category: "antinuke",
    usage: "!antinuke threshold <count>",
};

pub const WINDOW_META: CommandMeta = CommandMeta {
    name: "antinuke window",
    desc: "Set the sliding window actions are counted in.",
    category: "antinuke",
    usage: "!antinuke window <duration>",
};

pub const PUNISH_META: CommandMeta = CommandMeta {
    name: "antinuke punish",
    desc: "Choose what happens to an executor who trips the guard.",
    category: "antinuke",
    usage: "!antinuke punish <kick|ban|demote>",
};

pub const NOTIFY_CHANNEL_META: CommandMeta = CommandMeta {
    name: "antinuke notifychannel",
    desc: "Set or clear the channel antinuke alerts are posted in.",
    category: "antinuke",
    usage: "!antinuke notifychannel [#channel|clear]",
};

pub const NOTIFY_ROLE_META: CommandMeta = CommandMeta {
    name: "antinuke notifyrole",
    desc: "Set or clear the role pinged on antinuke alerts.",
    category: "antinuke",
    usage: "!antinuke notifyrole [@role|clear]",
};

pub const NOTIFY_OWNER_META: CommandMeta = CommandMeta {
    name: "antinuke notifyowner",
    desc: "Toggle DMing the server owner on antinuke alerts.",
    category: "antinuke",
    usage: "!antinuke notifyowner <on|off>",
};

/// Start watching for mass destructive actions.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
)]
pub async fn enable(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = command_guild(ctx)?;

    apply_patch(ctx, guild_id, GuardConfigPatch::enabled(true), |config| {
        format!(
            "Antinuke has been **enabled**. Executors performing {} action(s) within {} will be {}.",
            config.threshold,
            format_compact_duration(config.window_seconds),
            config.punishment.past_tense(),
        )
    })
    .await
}

/// Stop watching for mass destructive actions.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
)]
pub async fn disable(ctx: Context<'_>) -> Result<(), Error> {
    let guild_id = command_guild(ctx)?;

    apply_patch(ctx, guild_id, GuardConfigPatch::enabled(false), |_| {
        "Antinuke has been **disabled**.".to_owned()
    })
    .await
}

/// Set how many actions inside the window trigger a punishment.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
)]
pub async fn threshold(
    ctx: Context<'_>,
    #[description = "Number of actions (at least 1)"] count: Option<String>,
) -> Result<(), Error> {
    let guild_id = command_guild(ctx)?;

    let Some(raw) = argument(count.as_deref()) else {
        ctx.say(usage_message(THRESHOLD_META.usage)).await?;
        return Ok(());
    };

    let Ok(count) = raw.parse::<u32>() else {
        ctx.say(format!(
            "Invalid number. {}",
            usage_message(THRESHOLD_META.usage)
        ))
        .await?;
        return Ok(());
    };

    apply_patch(ctx, guild_id, GuardConfigPatch::threshold(count), |config| {
        format!("Threshold set to **{}** action(s).", config.threshold)
    })
    .await
}

/// Set the sliding window actions are counted in.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
)]
pub async fn window(
    ctx: Context<'_>,
    #[description = "Duration (e.g. 10s, 1m)"]
    #[rest]
    duration: Option<String>,
) -> Result<(), Error> {
    let guild_id = command_guild(ctx)?;

    let Some(raw) = argument(duration.as_deref()) else {
        ctx.say(usage_message(WINDOW_META.usage)).await?;
        return Ok(());
    };

    let Some(seconds) = parse_duration_seconds(raw) else {
        ctx.say("Invalid duration. Examples: `10`, `30s`, `2m`, `1h`")
            .await?;
        return Ok(());
    };

    apply_patch(ctx, guild_id, GuardConfigPatch::window_seconds(seconds), |config| {
        format!(
            "Window set to **{}**.",
            format_compact_duration(config.window_seconds)
        )
    })
    .await
}

/// Choose what happens to an executor who trips the guard.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
)]
pub async fn punish(
    ctx: Context<'_>,
    #[description = "kick, ban or demote"] punishment: Option<String>,
) -> Result<(), Error> {
    let guild_id = command_guild(ctx)?;

    let Some(raw) = argument(punishment.as_deref()) else {
        ctx.say(usage_message(PUNISH_META.usage)).await?;
        return Ok(());
    };

    let punishment = match raw.parse::<PunishmentKind>() {
        Ok(punishment) => punishment,
        Err(source) => {
            ctx.say(source.to_string()).await?;
            return Ok(());
        }
    };

    apply_patch(ctx, guild_id, GuardConfigPatch::punishment(punishment), |config| {
        format!("Punishment set to **{}**.", config.punishment)
    })
    .await
}

/// Set or clear the channel antinuke alerts are posted in.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
)]
pub async fn notifychannel(
    ctx: Context<'_>,
    #[description = "Channel mention or id, or `clear`"] channel: Option<String>,
) -> Result<(), Error> {
    let guild_id = command_guild(ctx)?;

    let Some(raw) = argument(channel.as_deref()) else {
        let current = ctx.data().guard.config(guild_id.get()).await?;
        let shown = current
            .notify_channel_id
            .map(channel_mention)
            .unwrap_or_else(|| "not set (alerts go to the system channel)".to_owned());
        ctx.say(format!("Notify channel: {shown}\n{}", usage_message(NOTIFY_CHANNEL_META.usage)))
            .await?;
        return Ok(());
    };

    let channel_id = if is_clear_keyword(raw) {
        None
    } else {
        let Some(id) = parse_channel_id(raw) else {
            ctx.say(usage_message(NOTIFY_CHANNEL_META.usage)).await?;
            return Ok(());
        };
        Some(id)
    };

    apply_patch(ctx, guild_id, GuardConfigPatch::notify_channel(channel_id), |config| {
        match config.notify_channel_id {
            Some(id) => format!("Antinuke alerts will be posted in {}.", channel_mention(id)),
            None => "Cleared the notify channel. Alerts go to the system channel.".to_owned(),
        }
    })
    .await
}

/// Set or clear the role pinged on antinuke alerts.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
)]
pub async fn notifyrole(
    ctx: Context<'_>,
    #[description = "Role mention or id, or `clear`"] role: Option<String>,
) -> Result<(), Error> {
    let guild_id = command_guild(ctx)?;

    let Some(raw) = argument(role.as_deref()) else {
        let current = ctx.data().guard.config(guild_id.get()).await?;
        let shown = current
            .notify_role_id
            .map(role_mention)
            .unwrap_or_else(|| "not set".to_owned());
        ctx.say(format!("Notify role: {shown}\n{}", usage_message(NOTIFY_ROLE_META.usage)))
            .await?;
        return Ok(());
    };

    let role_id = if is_clear_keyword(raw) {
        None
    } else {
        let Some(id) = parse_role_id(raw) else {
            ctx.say(usage_message(NOTIFY_ROLE_META.usage)).await?;
            return Ok(());
        };
        Some(id)
    };

    apply_patch(ctx, guild_id, GuardConfigPatch::notify_role(role_id), |config| {
        match config.notify_role_id {
            Some(id) => format!("{} will be pinged on antinuke alerts.", role_mention(id)),
            None => "Cleared the notify role.".to_owned(),
        }
    })
    .await
}

/// Toggle DMing the server owner on antinuke alerts.
#[poise::command(
    prefix_command,
    slash_command,
    category = "Antinuke",
    guild_only,
    check = "manager_check",
)]
pub async fn notifyowner(
    ctx: Context<'_>,
    #[description = "on or off"] flag: Option<String>,
) -> Result<(), Error> {
    let guild_id = command_guild(ctx)?;

    let Some(notify_owner) = argument(flag.as_deref()).and_then(parse_toggle) else {
        ctx.say(usage_message(NOTIFY_OWNER_META.usage)).await?;
        return Ok(());
    };

    apply_patch(ctx, guild_id, GuardConfigPatch::notify_owner(notify_owner), |config| {
        if config.notify_owner {
            "The server owner will be DMed on antinuke alerts.".to_owned()
        } else {
            "The server owner will no longer be DMed on antinuke alerts.".to_owned()
        }
    })
    .await
}
