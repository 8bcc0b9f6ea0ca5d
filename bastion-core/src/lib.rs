use std::sync::Arc;

use bastion_antinuke::ActionRateGuard;
use bastion_database::Database;

pub type Error = anyhow::Error;

/// Antinuke guard persisting its configs through the shared database.
pub type Guard = ActionRateGuard<Database>;

#[derive(Clone, Debug)]
pub struct Data {
    pub db: Database,
    pub guard: Arc<Guard>,
}

impl Data {
    pub fn new(db: Database) -> Self {
        let guard = Arc::new(ActionRateGuard::new(db.clone()));
        Self { db, guard }
    }
}

pub type Context<'a> = poise::Context<'a, Data, Error>;
