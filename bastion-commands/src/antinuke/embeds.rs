use poise::serenity_prelude as serenity;

use bastion_antinuke::GuardConfig;
use bastion_utils::embed::{info_embed, labelled_lines};
use bastion_utils::formatting::{channel_mention, format_compact_duration, role_mention};

pub fn guild_only_message() -> &'static str {
    "This command only works in servers."
}

pub fn missing_permission_message() -> &'static str {
    "You need the **Manage Server** permission to configure antinuke."
}

pub fn usage_message(usage: &str) -> String {
    format!("Usage: `{usage}`")
}

pub fn status_embed(config: &GuardConfig, tracked_actions: usize) -> serenity::CreateEmbed {
    info_embed(
        "Antinuke Config",
        status_description(config, tracked_actions),
        Some("Subcommands: enable, disable, threshold, window, punish, bot, add, exadd, notifychannel, notifyrole, notifyowner, reset_counts, test"),
    )
}

fn status_description(config: &GuardConfig, tracked_actions: usize) -> String {
    let status = if config.enabled { "Enabled" } else { "Disabled" };
    let notify_channel = config
        .notify_channel_id
        .map(channel_mention)
        .unwrap_or_else(|| "System channel".to_owned());
    let notify_role = config
        .notify_role_id
        .map(role_mention)
        .unwrap_or_else(|| "None".to_owned());
    let notify_owner = if config.notify_owner { "On" } else { "Off" };

    let settings = labelled_lines(&[
        ("Status", status.to_owned()),
        ("Threshold", format!("{} action(s)", config.threshold)),
        ("Window", format_compact_duration(config.window_seconds)),
        ("Punishment", config.punishment.to_string()),
        ("Notify Channel", notify_channel),
        ("Notify Role", notify_role),
        ("Notify Owner", notify_owner.to_owned()),
        ("Allowlisted Bots", config.bot_allowlist.len().to_string()),
        ("Allowlisted Users", config.user_allowlist.len().to_string()),
        ("Exempt Roles", config.exempt_roles.len().to_string()),
        ("Tracked Actions", tracked_actions.to_string()),
    ]);

    format!(
        "{settings}\n\n\
         Anyone who performs **{}** destructive action(s) within **{}** is {} \
         automatically.",
        config.threshold,
        format_compact_duration(config.window_seconds),
        config.punishment.past_tense(),
    )
}

#[cfg(test)]
mod tests {
    use super::status_description;
    use bastion_antinuke::{GuardConfig, PunishmentKind};

    #[test]
    fn status_lists_defaults() {
        let description = status_description(&GuardConfig::default(), 0);

        assert!(description.contains("**Status :** Disabled"));
        assert!(description.contains("**Threshold :** 3 action(s)"));
        assert!(description.contains("**Window :** 10s"));
        assert!(description.contains("**Notify Channel :** System channel"));
        assert!(description.contains("is kicked automatically"));
    }

    #[test]
    fn status_reflects_overrides() {
        let mut config = GuardConfig {
            enabled: true,
            punishment: PunishmentKind::Ban,
            window_seconds: 90,
            notify_channel_id: Some(55),
            notify_role_id: Some(66),
            ..GuardConfig::default()
        };
        config.user_allowlist.insert(1);

        let description = status_description(&config, 4);

        assert!(description.contains("**Status :** Enabled"));
        assert!(description.contains("**Window :** 1m 30s"));
        assert!(description.contains("<#55>"));
        assert!(description.contains("<@&66>"));
        assert!(description.contains("**Allowlisted Users :** 1"));
        assert!(description.contains("**Tracked Actions :** 4"));
        assert!(description.contains("is banned automatically"));
    }
}
