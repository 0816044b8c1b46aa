use crate::services::fixtures::{self, Fixture};
use crate::{Config, Database};
use anyhow::Result;
use std::path::Path;

pub async fn run(config_path: &Path, file: &Path) -> Result<()> {
    let config = Config::load(config_path)?;
    let db = Database::open_with_pool_size(&config.database.path, config.database.pool_size)?;
    db.migrate()?;

    if !file.exists() {
        anyhow::bail!("Fixture file not found: {}", file.display());
    }
    let fixture = Fixture::from_toml(&std::fs::read_to_string(file)?)?;
    let report = fixtures::import(&db, &fixture)?;

    tracing::info!(
        "Import complete: {} users, {} tags, {} posts ({} skipped), {} likes, {} comments",
        report.users,
        report.tags,
        report.posts,
        report.skipped_posts,
        report.likes,
        report.comments
    );
    Ok(())
}
