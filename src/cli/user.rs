use crate::services::users::UserRepository;
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

use super::UserCommand;

pub async fn run(config_path: &Path, command: UserCommand) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open_with_pool_size(&config.database.path, config.database.pool_size)?;
    db.migrate()?;
    let users = UserRepository::new(&db);

    match command {
        UserCommand::Add { username, staff } => {
            users.create(&username, staff)?;
            tracing::info!("User '{}' created (staff: {})", username, staff);
        }
        UserCommand::List => {
            println!("{:<30} {:<6} {:<20}", "USERNAME", "STAFF", "CREATED");
            println!("{}", "-".repeat(58));
            for user in users.list()? {
                println!(
                    "{:<30} {:<6} {:<20}",
                    user.username,
                    if user.is_staff { "yes" } else { "no" },
                    user.created_at
                );
            }
        }
    }

    Ok(())
}
