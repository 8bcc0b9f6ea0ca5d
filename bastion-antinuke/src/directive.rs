use crate::action::{ActionKind, DestructiveAction};
use crate::config::{GuardConfig, PunishmentKind};

/// Punishment the enforcement layer should apply. Applied once, never retried.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PunishmentDirective {
    pub guild_id: u64,
    pub executor_id: u64,
    pub kind: PunishmentKind,
}

/// Alert payload describing a trigger and where to send it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NotificationDirective {
    pub guild_id: u64,
    pub executor_id: u64,
    pub punishment: PunishmentKind,
    pub action: ActionKind,
    pub count: usize,
    pub window_seconds: u64,
    pub channel_id: Option<u64>,
    pub role_id: Option<u64>,
    pub notify_owner: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verdict {
    pub punishment: PunishmentDirective,
    pub notification: NotificationDirective,
}

impl Verdict {
    pub(crate) fn new(config: &GuardConfig, action: &DestructiveAction, count: usize) -> Self {
        Self {
            punishment: PunishmentDirective {
                guild_id: action.guild_id,
                executor_id: action.executor_id,
                kind: config.punishment,
            },
            notification: NotificationDirective {
                guild_id: action.guild_id,
                executor_id: action.executor_id,
                punishment: config.punishment,
                action: action.kind,
                count,
                window_seconds: config.window_seconds,
                channel_id: config.notify_channel_id,
                role_id: config.notify_role_id,
                notify_owner: config.notify_owner,
            },
        }
    }
}
