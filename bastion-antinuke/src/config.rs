use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GuardError;

pub const DEFAULT_THRESHOLD: u32 = 3;
pub const DEFAULT_WINDOW_SECONDS: u64 = 10;
/// Largest threshold the Postgres `INTEGER` column can hold.
pub const MAX_THRESHOLD: u32 = i32::MAX as u32;
/// Largest window the Postgres `BIGINT` column can hold.
pub const MAX_WINDOW_SECONDS: u64 = i64::MAX as u64;

/// What happens to an executor once they cross the threshold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PunishmentKind {
    #[default]
    Kick,
    Ban,
    /// Strip every role except `@everyone`.
    Demote,
}

impl PunishmentKind {
    pub const ALL: [PunishmentKind; 3] =
        [PunishmentKind::Kick, PunishmentKind::Ban, PunishmentKind::Demote];

    pub fn as_str(self) -> &'static str {
        match self {
            PunishmentKind::Kick => "kick",
            PunishmentKind::Ban => "ban",
            PunishmentKind::Demote => "demote",
        }
    }

    pub fn past_tense(self) -> &'static str {
        match self {
            PunishmentKind::Kick => "kicked",
            PunishmentKind::Ban => "banned",
            PunishmentKind::Demote => "demoted",
        }
    }
}

impl fmt::Display for PunishmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PunishmentKind {
    type Err = GuardError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let wanted = raw.trim();
        PunishmentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| GuardError::UnknownPunishment(wanted.to_owned()))
    }
}

/// Which exemption list an id belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExemptionKind {
    Bot,
    User,
    Role,
}

impl ExemptionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ExemptionKind::Bot => "bot",
            ExemptionKind::User => "user",
            ExemptionKind::Role => "role",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "bot" => Some(ExemptionKind::Bot),
            "user" => Some(ExemptionKind::User),
            "role" => Some(ExemptionKind::Role),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EditOp {
    Add,
    Remove,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ExemptionEdit {
    pub kind: ExemptionKind,
    pub op: EditOp,
    pub id: u64,
}

/// Antinuke settings for a single guild.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    pub enabled: bool,
    pub threshold: u32,
    pub window_seconds: u64,
    pub punishment: PunishmentKind,
    pub bot_allowlist: BTreeSet<u64>,
    pub user_allowlist: BTreeSet<u64>,
    pub exempt_roles: BTreeSet<u64>,
    pub notify_channel_id: Option<u64>,
    pub notify_role_id: Option<u64>,
    pub notify_owner: bool,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: DEFAULT_THRESHOLD,
            window_seconds: DEFAULT_WINDOW_SECONDS,
            punishment: PunishmentKind::default(),
            bot_allowlist: BTreeSet::new(),
            user_allowlist: BTreeSet::new(),
            exempt_roles: BTreeSet::new(),
            notify_channel_id: None,
            notify_role_id: None,
            notify_owner: false,
        }
    }
}

impl GuardConfig {
    pub fn validate(&self) -> Result<(), GuardError> {
        if !(1..=MAX_THRESHOLD).contains(&self.threshold) {
            return Err(GuardError::InvalidConfig {
                field: "threshold",
                value: u64::from(self.threshold),
                max: u64::from(MAX_THRESHOLD),
            });
        }

        if !(1..=MAX_WINDOW_SECONDS).contains(&self.window_seconds) {
            return Err(GuardError::InvalidConfig {
                field: "window_seconds",
                value: self.window_seconds,
                max: MAX_WINDOW_SECONDS,
            });
        }

        Ok(())
    }

    pub fn exemptions(&self, kind: ExemptionKind) -> &BTreeSet<u64> {
        match kind {
            ExemptionKind::Bot => &self.bot_allowlist,
            ExemptionKind::User => &self.user_allowlist,
            ExemptionKind::Role => &self.exempt_roles,
        }
    }

    fn exemptions_mut(&mut self, kind: ExemptionKind) -> &mut BTreeSet<u64> {
        match kind {
            ExemptionKind::Bot => &mut self.bot_allowlist,
            ExemptionKind::User => &mut self.user_allowlist,
            ExemptionKind::Role => &mut self.exempt_roles,
        }
    }

    /// Bots are matched against the bot allowlist, everyone else against the
    /// user allowlist. Holding any exempt role exempts both.
    pub fn is_exempt(&self, executor_id: u64, role_ids: &[u64], is_bot: bool) -> bool {
        let allowlist = if is_bot {
            &self.bot_allowlist
        } else {
            &self.user_allowlist
        };

        allowlist.contains(&executor_id)
            || role_ids.iter().any(|role_id| self.exempt_roles.contains(role_id))
    }

    /// Return a copy with `patch` applied. `self` is never touched, so a
    /// rejected patch leaves the previous config intact.
    pub fn apply(&self, patch: &GuardConfigPatch) -> Result<GuardConfig, GuardError> {
        let mut next = self.clone();

        if let Some(enabled) = patch.enabled {
            next.enabled = enabled;
        }
        if let Some(threshold) = patch.threshold {
            next.threshold = threshold;
        }
        if let Some(window_seconds) = patch.window_seconds {
            next.window_seconds = window_seconds;
        }
        if let Some(punishment) = patch.punishment {
            next.punishment = punishment;
        }
        for edit in &patch.exemptions {
            let list = next.exemptions_mut(edit.kind);
            match edit.op {
                EditOp::Add => list.insert(edit.id),
                EditOp::Remove => list.remove(&edit.id),
            };
        }
        if let Some(channel_id) = patch.notify_channel_id {
            next.notify_channel_id = channel_id;
        }
        if let Some(role_id) = patch.notify_role_id {
            next.notify_role_id = role_id;
        }
        if let Some(notify_owner) = patch.notify_owner {
            next.notify_owner = notify_owner;
        }

        next.validate()?;
        Ok(next)
    }
}

/// Partial update for a [`GuardConfig`]. `None` leaves a field untouched;
/// the nested options on the notify targets distinguish "keep" from "clear".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuardConfigPatch {
    pub enabled: Option<bool>,
    pub threshold: Option<u32>,
    pub window_seconds: Option<u64>,
    pub punishment: Option<PunishmentKind>,
    pub exemptions: Vec<ExemptionEdit>,
    pub notify_channel_id: Option<Option<u64>>,
    pub notify_role_id: Option<Option<u64>>,
    pub notify_owner: Option<bool>,
}

impl GuardConfigPatch {
    pub fn enabled(enabled: bool) -> Self {
        Self {
            enabled: Some(enabled),
            ..Default::default()
        }
    }

    pub fn threshold(threshold: u32) -> Self {
        Self {
            threshold: Some(threshold),
            ..Default::default()
        }
    }

    pub fn window_seconds(window_seconds: u64) -> Self {
        Self {
            window_seconds: Some(window_seconds),
            ..Default::default()
        }
    }

    pub fn punishment(punishment: PunishmentKind) -> Self {
        Self {
            punishment: Some(punishment),
            ..Default::default()
        }
    }

    pub fn exemption(kind: ExemptionKind, op: EditOp, id: u64) -> Self {
        Self {
            exemptions: vec![ExemptionEdit { kind, op, id }],
            ..Default::default()
        }
    }

    pub fn notify_channel(channel_id: Option<u64>) -> Self {
        Self {
            notify_channel_id: Some(channel_id),
            ..Default::default()
        }
    }

    pub fn notify_role(role_id: Option<u64>) -> Self {
        Self {
            notify_role_id: Some(role_id),
            ..Default::default()
        }
    }

    pub fn notify_owner(notify_owner: bool) -> Self {
        Self {
            notify_owner: Some(notify_owner),
            ..Default::default()
        }
    }
}
