//! Schema setup and teardown from the crate's SQL files.
//!
//! `migrations/` holds the schema in ascending file-name order and `cleanup/`
//! the matching drops, executed in descending order.

use sqlx::PgPool;
use std::fs;
use std::path::{Path, PathBuf};

/// Creates the lead tables.
///
/// # Example
///
/// ```rust,no_run
/// use sqlx::PgPool;
/// use lead_core_postgres::repository::db_init::init_database;
///
/// # async fn example(pool: &PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// init_database(pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn init_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    execute_sql_files_in_order(pool, &migrations_dir, true).await
}

/// Drops the lead tables.
pub async fn cleanup_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    let cleanup_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("cleanup");
    execute_sql_files_in_order(pool, &cleanup_dir, false).await
}

fn sql_files_in_order(dir: &Path, ascending: bool) -> std::io::Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("sql"))
        .collect();

    files.sort_by(|a, b| {
        let ordering = a.file_name().cmp(&b.file_name());
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });
    Ok(files)
}

async fn execute_sql_files_in_order(
    pool: &PgPool,
    dir: &Path,
    ascending: bool,
) -> Result<(), sqlx::Error> {
    for path in sql_files_in_order(dir, ascending)? {
        let sql = fs::read_to_string(&path)?;
        tracing::debug!(file = %path.display(), "executing schema script");
        sqlx::raw_sql(&sql).execute(pool).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    #[test]
    fn test_cleanup_runs_in_reverse_order() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("cleanup");

        let names: Vec<String> = sql_files_in_order(&dir, false)
            .unwrap()
            .iter()
            .filter_map(|path| path.file_name()?.to_str().map(str::to_string))
            .collect();

        assert_eq!(
            names,
            vec![
                "20250101000002_drop_lead_status_history.sql".to_string(),
                "20250101000001_drop_lead.sql".to_string(),
            ]
        );
    }

    #[tokio::test]
    #[ignore]
    #[serial_test::serial]
    async fn test_init_and_cleanup() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let pool = DatabaseConfig::from_env().with_max_connections(1).connect().await?;

        init_database(&pool).await?;
        cleanup_database(&pool).await?;
        init_database(&pool).await?;

        Ok(())
    }
}
