pub mod antinuke;
pub mod utility;

use bastion_core::{Data, Error};

pub struct CommandMeta {
    pub name: &'static str,
    pub desc: &'static str,
    pub category: &'static str,
    pub usage: &'static str,
}

pub const COMMANDS: &[CommandMeta] = &[
    utility::ping::META,
    utility::help::META,
    utility::usage::META,
    antinuke::META,
    antinuke::settings::ENABLE_META,
    antinuke::settings::DISABLE_META,
    antinuke::settings::THRESHOLD_META,
    antinuke::settings::WINDOW_META,
    antinuke::settings::PUNISH_META,
    antinuke::settings::NOTIFY_CHANNEL_META,
    antinuke::settings::NOTIFY_ROLE_META,
    antinuke::settings::NOTIFY_OWNER_META,
    antinuke::lists::BOT_META,
    antinuke::lists::USER_META,
    antinuke::lists::ROLE_META,
    antinuke::maintenance::RESET_COUNTS_META,
    antinuke::maintenance::TEST_META,
];

pub fn commands() -> Vec<poise::Command<Data, Error>> {
    vec![
        utility::ping::ping(),
        utility::help::help(),
        utility::usage::usage(),
        antinuke::antinuke(),
    ]
}

#[cfg(test)]
mod tests {
    use super::{COMMANDS, commands};

    #[test]
    fn command_names_are_unique() {
        let mut names: Vec<&str> = COMMANDS.iter().map(|meta| meta.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }

    #[test]
    fn antinuke_group_registers_every_subcommand() {
        let registered = commands();
        let antinuke = registered
            .iter()
            .find(|command| command.name == "antinuke")
            .unwrap();

        let subcommands: Vec<&str> = antinuke
            .subcommands
            .iter()
            .map(|command| command.name.as_str())
            .collect();

        for expected in [
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
            "test",
        ] {
            assert!(subcommands.contains(&expected), "missing `{expected}`");
        }

        let bot = antinuke
            .subcommands
            .iter()
            .find(|command| command.name == "bot")
            .unwrap();
        let bot_subcommands: Vec<&str> = bot.subcommands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(bot_subcommands, vec!["add", "remove", "list"]);
    }

    #[test]
    fn only_mutating_antinuke_commands_are_gated() {
        let registered = commands();
        let antinuke = registered
            .iter()
            .find(|command| command.name == "antinuke")
            .unwrap();
        let bot = antinuke
            .subcommands
            .iter()
            .find(|command| command.name == "bot")
            .unwrap();

        let mut gated = Vec::new();
        let mut open = Vec::new();
        let everything = std::iter::once(("", antinuke))
            .chain(antinuke.subcommands.iter().map(|command| ("antinuke ", command)))
            .chain(bot.subcommands.iter().map(|command| ("antinuke bot ", command)));
        for (parent, command) in everything {
            let name = format!("{parent}{}", command.name);
            assert!(command.guild_only, "`{name}` must be guild only");
            if command.checks.is_empty() {
                open.push(name);
            } else {
                gated.push(name);
            }
        }

        open.sort_unstable();
        assert_eq!(
            open,
            [
                "antinuke",
                "antinuke bot",
                "antinuke bot list",
                "antinuke exlist",
                "antinuke list",
            ]
        );
        assert_eq!(gated.len(), 16);
        for name in ["antinuke threshold", "antinuke bot add", "antinuke reset_counts"] {
            assert!(gated.iter().any(|gated| gated == name), "`{name}` must be gated");
        }
    }
}
