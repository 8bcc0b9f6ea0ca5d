/// Confirm/decline button prompts.
pub mod confirmation;
/// Embed colors and layout helpers shared across commands.
pub mod embed;
/// Durations and mentions.
pub mod formatting;
/// Single source of truth for the message-command prefix.
pub const COMMAND_PREFIX: char = '!';
/// Pure parser helpers.
pub mod parse;
/// Permission helper utilities.
pub mod permissions;
pub mod time;
