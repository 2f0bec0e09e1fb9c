use serenity::all::{Context, GuildId, Permissions, UserId};
use tracing::debug;

/// Permissions and role ids of a guild member.
///
/// Lookup failures resolve to no permissions and no roles, which means the
/// member is checked like anyone else.
pub async fn member_context(
    ctx: &Context,
    guild_id: GuildId,
    user_id: UserId,
) -> (Permissions, Vec<u64>) {
    match guild_id.member(ctx, user_id).await {
        Ok(member) => {
            let permissions = member.permissions(ctx).unwrap_or_else(|e| {
                debug!("Could not resolve permissions for {} in {}: {:?}", user_id, guild_id, e);
                Permissions::empty()
            });
            let roles = member.roles.iter().map(|r| r.get()).collect();
            (permissions, roles)
        }
        Err(e) => {
            debug!("Could not fetch member {} in {}: {:?}", user_id, guild_id, e);
            (Permissions::empty(), Vec::new())
        }
    }
}
