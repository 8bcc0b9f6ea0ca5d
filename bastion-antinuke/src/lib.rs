//! Antinuke decision engine.
//!
//! Counts destructive actions per `(guild, executor)` inside a sliding
//! window and decides when an executor has to be punished. Nothing in this
//! crate talks to Discord: callers feed [`DestructiveAction`]s in and apply
//! the returned [`Verdict`] themselves.

/// Destructive action events fed into the guard.
pub mod action;
/// Per-guild guard configuration and patches.
pub mod config;
/// Punishment and notification directives.
pub mod directive;
pub mod error;
/// The guard service tying config, ledger and store together.
pub mod guard;
/// In-memory sliding-window action ledger.
pub mod ledger;
/// Persistence seam for guard configs.
pub mod store;

pub use action::{ActionKind, DestructiveAction};
pub use config::{
    DEFAULT_THRESHOLD, DEFAULT_WINDOW_SECONDS, EditOp, ExemptionEdit, ExemptionKind, GuardConfig,
    GuardConfigPatch, MAX_THRESHOLD, MAX_WINDOW_SECONDS, PunishmentKind,
};
pub use directive::{NotificationDirective, PunishmentDirective, Verdict};
pub use error::GuardError;
pub use guard::ActionRateGuard;
pub use ledger::{ActionLedger, TriggerResult};
pub use store::{GuardConfigStore, MemoryGuardStore};
