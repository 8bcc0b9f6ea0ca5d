use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ActionKind {
    MemberBan,
    MemberKick,
    RoleDelete,
    ChannelDelete,
}

impl ActionKind {
    /// Plural phrase used in alerts, e.g. "punished for mass bans".
    pub fn label(self) -> &'static str {
        match self {
            ActionKind::MemberBan => "mass bans",
            ActionKind::MemberKick => "mass kicks",
            ActionKind::RoleDelete => "role deletions",
            ActionKind::ChannelDelete => "channel deletions",
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::MemberBan => "member_ban",
            ActionKind::MemberKick => "member_kick",
            ActionKind::RoleDelete => "role_delete",
            ActionKind::ChannelDelete => "channel_delete",
        };
        f.write_str(name)
    }
}

/// A destructive action attributed to an executor through the audit log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DestructiveAction {
    pub guild_id: u64,
    pub executor_id: u64,
    pub kind: ActionKind,
    /// Unix seconds.
    pub timestamp: u64,
    pub executor_role_ids: Vec<u64>,
    pub executor_is_bot: bool,
}
