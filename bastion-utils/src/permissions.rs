use poise::serenity_prelude as serenity;

/// Effective guild-level permissions of a member: the owner gets everything,
/// everyone else the union of `@everyone` and their roles.
pub async fn resolve_user_permissions(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
) -> anyhow::Result<serenity::Permissions> {
    let guild = guild_id.to_partial_guild(http).await?;
    if guild.owner_id == user_id {
        return Ok(serenity::Permissions::all());
    }

    let member = guild_id.member(http, user_id).await?;
    Ok(combine_role_permissions(
        guild_id,
        guild.roles.values(),
        &member.roles,
    ))
}

fn combine_role_permissions<'a>(
    guild_id: serenity::GuildId,
    roles: impl IntoIterator<Item = &'a serenity::Role>,
    member_roles: &[serenity::RoleId],
) -> serenity::Permissions {
    let everyone_role_id = serenity::RoleId::new(guild_id.get());

    roles
        .into_iter()
        .filter(|role| role.id == everyone_role_id || member_roles.contains(&role.id))
        .fold(serenity::Permissions::empty(), |acc, role| acc | role.permissions)
}

pub async fn has_user_permission(
    http: &serenity::Http,
    guild_id: serenity::GuildId,
    user_id: serenity::UserId,
    required: serenity::Permissions,
) -> anyhow::Result<bool> {
    let perms = resolve_user_permissions(http, guild_id, user_id).await?;

    Ok(perms.contains(serenity::Permissions::ADMINISTRATOR) || perms.contains(required))
}
