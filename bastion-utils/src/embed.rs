use poise::serenity_prelude as serenity;

/// Default embed color used across the bot UI.
pub const DEFAULT_EMBED_COLOR: u32 = 0x90_55_30;

/// Color for antinuke alerts and failed command replies.
pub const ALERT_EMBED_COLOR: u32 = 0xED_42_45;

/// Render `**Label :** value` lines, one per field.
pub fn labelled_lines(fields: &[(&str, String)]) -> String {
    fields
        .iter()
        .map(|(label, value)| format!("**{label} :** {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Standard embed with the default color and an optional footer.
pub fn info_embed(
    title: impl Into<String>,
    description: impl Into<String>,
    footer: Option<&str>,
) -> serenity::CreateEmbed {
    let embed = serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(DEFAULT_EMBED_COLOR);

    match footer {
        Some(text) if !text.is_empty() => embed.footer(serenity::CreateEmbedFooter::new(text)),
        _ => embed,
    }
}

pub fn alert_embed(title: impl Into<String>, description: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .description(description)
        .color(ALERT_EMBED_COLOR)
}

#[cfg(test)]
mod tests {
    use super::labelled_lines;

    #[test]
    fn labelled_lines_join_with_newlines() {
        let out = labelled_lines(&[("Status", "Enabled".to_owned()), ("Threshold", "3".to_owned())]);
        assert_eq!(out, "**Status :** Enabled\n**Threshold :** 3");
    }

    #[test]
    fn labelled_lines_empty() {
        assert_eq!(labelled_lines(&[]), "");
    }
}
