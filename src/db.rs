//! db.rs
//! Conexión a SQLite y migraciones.

use std::path::Path;
use std::str::FromStr;

use anyhow::{Context, Result};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};

pub async fn setup_database(database_url: &str) -> Result<Pool<Sqlite>> {
    let options = SqliteConnectOptions::from_str(database_url)
        .with_context(|| format!("Invalid DATABASE_URL: {database_url}"))?
        .create_if_missing(true)
        .foreign_keys(true);

    // La carpeta del archivo tiene que existir antes de conectar
    if let Some(parent) = database_file(database_url).and_then(|f| f.parent()) {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    log::info!("Conectando a SQLite en {}", database_url);

    let db_pool = SqlitePoolOptions::new()
        .max_connections(4)
        .connect_with(options)
        .await
        .context("Failed to connect to SQLite")?;

    run_migrations(&db_pool).await?;
    Ok(db_pool)
}

/// `sqlite:data/x.db?mode=rwc` -> `data/x.db`; `None` para bases en memoria.
fn database_file(database_url: &str) -> Option<&Path> {
    let rest = database_url.strip_prefix("sqlite:")?;
    let rest = rest.strip_prefix("//").unwrap_or(rest);
    let file = rest.split('?').next().unwrap_or_default();
    if file.is_empty() || file == ":memory:" {
        return None;
    }
    Some(Path::new(file))
}

/// Corre migraciones con sqlx
pub async fn run_migrations(db_pool: &Pool<Sqlite>) -> Result<()> {
    sqlx::migrate!("./migrations")
        .run(db_pool)
        .await
        .context("Failed to run migrations")?;
    Ok(())
}

/// Pool en memoria para tests. Una sola conexión: cada conexión nueva
/// a `sqlite::memory:` abriría una base distinta.
#[cfg(test)]
pub async fn memory_pool() -> Pool<Sqlite> {
    let db_pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .expect("in-memory sqlite");
    run_migrations(&db_pool).await.expect("migrations");
    db_pool
}
