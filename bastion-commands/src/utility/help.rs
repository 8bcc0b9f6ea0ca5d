use crate::utility::embeds::{grouped_help_description, no_commands_message, unknown_category_message};
use crate::{COMMANDS, CommandMeta};
use bastion_core::{Context, Error};
use bastion_utils::COMMAND_PREFIX;
use bastion_utils::embed::info_embed;

pub const META: CommandMeta = CommandMeta {
    name: "help",
    desc: "Lists out all available commands.",
    category: "utility",
    usage: "!help [category]",
};

#[poise::command(prefix_command, slash_command, category = "Utility")]
pub async fn help(
    ctx: Context<'_>,
    #[description = "Category (antinuke, utility)"] category: Option<String>,
) -> Result<(), Error> {
    let category = category
        .as_deref()
        .map(|raw| raw.trim().to_ascii_lowercase())
        .filter(|raw| !raw.is_empty());

    let mut categories: Vec<&str> = COMMANDS.iter().map(|c| c.category).collect();
    categories.sort_unstable();
    categories.dedup();

    if let Some(wanted) = category.as_deref()
        && !categories.contains(&wanted)
    {
        ctx.say(unknown_category_message(wanted, &categories)).await?;
        return Ok(());
    }

    let commands = sorted_commands(category.as_deref());
    if commands.is_empty() {
        ctx.say(no_commands_message(category.as_deref())).await?;
        return Ok(());
    }

    let footer = format!("Use {COMMAND_PREFIX}usage <command> for syntax.");
    ctx.send(poise::CreateReply::default().embed(info_embed(
        "Available Commands",
        grouped_help_description(&commands),
        Some(&footer),
    )))
    .await?;

    Ok(())
}

fn sorted_commands(category: Option<&str>) -> Vec<&'static CommandMeta> {
    let mut filtered: Vec<&'static CommandMeta> = COMMANDS
        .iter()
        .filter(|cmd| category.is_none_or(|wanted| cmd.category == wanted))
        .collect();

    filtered.sort_unstable_by(|left, right| {
        left.category
            .cmp(right.category)
            .then_with(|| left.name.cmp(right.name))
    });

    filtered
}

#[cfg(test)]
mod tests {
    use super::sorted_commands;

    #[test]
    fn filters_by_category() {
        let utility = sorted_commands(Some("utility"));
        assert!(!utility.is_empty());
        assert!(utility.iter().all(|cmd| cmd.category == "utility"));
    }

    #[test]
    fn sorts_by_category_then_name() {
        let all = sorted_commands(None);
        assert!(all.windows(2).all(|pair| {
            (pair[0].category, pair[0].name) <= (pair[1].category, pair[1].name)
        }));
        assert_eq!(all[0].category, "antinuke");
    }
}
