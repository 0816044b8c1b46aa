use anyhow::Result;
use std::path::PathBuf;

pub async fn run(path: PathBuf, name: Option<String>) -> Result<()> {
    let site_name = name.unwrap_or_else(|| "Sensive".to_string());

    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(path.join("data"))?;

    let config_path = path.join("sensive.toml");
    if config_path.exists() {
        anyhow::bail!("{} already exists", config_path.display());
    }

    let config = format!(
        r#"[site]
title = "{}"
description = "A blog about everything"

[server]
host = "127.0.0.1"
port = 3000

[database]
path = "./data/sensive.db"
pool_size = 10

[listing]
popular_limit = 5
fresh_limit = 5
tag_posts_limit = 20
teaser_length = 200

[media]
url_prefix = "/media/"
"#,
        site_name
    );

    std::fs::write(&config_path, config)?;

    tracing::info!("Created new site at {:?}", path);
    tracing::info!("Run 'sensive migrate' to set up the database");
    tracing::info!("Run 'sensive serve' to start the server");

    Ok(())
}
