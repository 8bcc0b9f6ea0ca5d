use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct AntinukeConfigRow {
    pub guild_id: i64,
    pub enabled: bool,
    pub threshold: i32,
    pub window_seconds: i64,
    pub punishment: String,
    pub notify_channel_id: Option<i64>,
    pub notify_role_id: Option<i64>,
    pub notify_owner: bool,
}

#[derive(Debug, Clone, FromRow)]
pub struct AntinukeExemptionRow {
    pub kind: String,
    pub target_id: i64,
}
