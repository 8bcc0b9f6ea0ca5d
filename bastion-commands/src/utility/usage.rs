use bastion_core::{Context, Error};
use bastion_utils::COMMAND_PREFIX;

use crate::{COMMANDS, CommandMeta};

pub const META: CommandMeta = CommandMeta {
    name: "usage",
    desc: "Show usage syntax for a specific command.",
    category: "utility",
    usage: "!usage <command>",
};

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn usage(
    ctx: Context<'_>,
    #[description = "Command name"]
    #[rest]
    command: Option<String>,
) -> Result<(), Error> {
    let Some(raw_name) = command.as_deref() else {
        ctx.say(format!("Usage: `{}`", META.usage)).await?;
        return Ok(());
    };

    let lookup = normalize_command_name(raw_name);

    let Some(command) = COMMANDS.iter().find(|command| command.name == lookup) else {
        ctx.say(format!("Unknown command: `{}`", lookup)).await?;
        return Ok(());
    };

    ctx.say(format!("Usage: `{}`", command.usage)).await?;
    Ok(())
}

/// `!Antinuke   Enable` -> `antinuke enable`
fn normalize_command_name(raw: &str) -> String {
    raw.trim()
        .trim_start_matches(COMMAND_PREFIX)
        .split_whitespace()
        .map(str::to_ascii_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::normalize_command_name;

    #[test]
    fn normalizes_prefix_case_and_spacing() {
        assert_eq!(normalize_command_name("!Antinuke   Enable"), "antinuke enable");
        assert_eq!(normalize_command_name(" ping "), "ping");
    }
}
