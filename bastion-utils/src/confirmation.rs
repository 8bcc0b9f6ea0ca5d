use std::time::Duration;

use poise::serenity_prelude as serenity;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Confirmation {
    Confirmed,
    Declined,
    TimedOut,
}

/// Post `embed` with Confirm/Cancel buttons that only the invoking author can
/// press, then collapse the prompt into the matching status line.
pub async fn confirm_action<U, E>(
    ctx: poise::Context<'_, U, E>,
    embed: serenity::CreateEmbed,
    timeout: Duration,
    confirmed_text: &str,
) -> Result<Confirmation, serenity::Error>
where
    U: Send + Sync,
    E: Send + Sync,
{
    let confirm_id = format!("{}_confirm", ctx.id());
    let cancel_id = format!("{}_cancel", ctx.id());

    let reply = ctx
        .send(
            poise::CreateReply::default()
                .embed(embed)
                .components(vec![serenity::CreateActionRow::Buttons(vec![
                    serenity::CreateButton::new(&confirm_id)
                        .label("Confirm")
                        .style(serenity::ButtonStyle::Danger),
                    serenity::CreateButton::new(&cancel_id)
                        .label("Cancel")
                        .style(serenity::ButtonStyle::Secondary),
                ])]),
        )
        .await?;

    let message = reply.message().await?.into_owned();
    let pressed = message
        .await_component_interaction(ctx)
        .author_id(ctx.author().id)
        .timeout(timeout)
        .await;

    let Some(interaction) = pressed else {
        message
            .channel_id
            .edit_message(
                ctx.http(),
                message.id,
                serenity::EditMessage::new()
                    .content("Timed out. Nothing was changed.")
                    .embeds(vec![])
                    .components(vec![]),
            )
            .await?;
        return Ok(Confirmation::TimedOut);
    };

    let (outcome, text) = if interaction.data.custom_id == confirm_id {
        (Confirmation::Confirmed, confirmed_text)
    } else {
        (Confirmation::Declined, "Cancelled. Nothing was changed.")
    };

    interaction
        .create_response(
            ctx.http(),
            serenity::CreateInteractionResponse::UpdateMessage(
                serenity::CreateInteractionResponseMessage::new()
                    .content(text)
                    .embeds(vec![])
                    .components(vec![]),
            ),
        )
        .await?;

    Ok(outcome)
}
