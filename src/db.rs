//! SQLite database module
//!
//! Pool construction, schema initialization and the audio asset queries for
//! the SQLite backend. db_postgres.rs mirrors this module for PostgreSQL.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use sqlx::{Executor, Row};
use std::path::Path;

use crate::asset::AudioAsset;
use crate::constants::EXPECTED_DB_VERSION;
use crate::profile::MatchPolicy;
use crate::queries::{assets, ddl, metadata};

pub type DynError = Box<dyn std::error::Error + Send + Sync>;

/// Open a file-based SQLite pool, creating the file and its parent directory if missing
/// Enables WAL mode
pub async fn open_database(db_path: &Path) -> Result<SqlitePool, DynError> {
    if let Some(parent) = db_path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                format!(
                    "Failed to create database directory '{}': {}",
                    parent.display(),
                    e
                )
            })?;
        }
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create a pool backed by a file inside a fresh temporary directory (for tests)
/// Keep the returned TempDir alive for as long as the pool is used
pub async fn create_test_connection_in_temporary_file(
) -> Result<(SqlitePool, tempfile::TempDir), DynError> {
    let temp_dir = tempfile::tempdir()?;
    let pool = open_database(&temp_dir.path().join("test.sqlite")).await?;
    Ok((pool, temp_dir))
}

/// Initialize database schema
/// Creates the metadata table and one table per collection, then checks the schema version
pub async fn init_database_schema(
    pool: &SqlitePool,
    collections: &[&str],
) -> Result<(), DynError> {
    sqlx::query(&ddl::create_metadata_table())
        .execute(pool)
        .await?;

    for collection in collections {
        sqlx::query(&ddl::create_assets_table(collection))
            .execute(pool)
            .await?;
        sqlx::query(&ddl::create_language_index(collection))
            .execute(pool)
            .await?;
        sqlx::query(&ddl::create_folded_language_index(collection))
            .execute(pool)
            .await?;
    }

    match query_metadata(pool, "version").await? {
        Some(version) if version != EXPECTED_DB_VERSION => {
            return Err(format!(
                "Unsupported database version: '{}'. This application only supports version '{}'",
                version, EXPECTED_DB_VERSION
            )
            .into());
        }
        Some(_) => {}
        None => {
            let sql = metadata::insert("version", EXPECTED_DB_VERSION);
            sqlx::query(&sql).execute(pool).await?;
        }
    }

    Ok(())
}

/// Query a single metadata value by key
pub async fn query_metadata<'e, E>(executor: E, key: &str) -> Result<Option<String>, DynError>
where
    E: Executor<'e, Database = sqlx::Sqlite>,
{
    let sql = metadata::select_by_key(key);
    let result = sqlx::query(&sql).fetch_optional(executor).await?;

    Ok(result.map(|row| row.get::<String, _>(0)))
}

/// Insert one audio asset record into a collection
pub async fn insert_asset(
    pool: &SqlitePool,
    collection: &str,
    asset: &AudioAsset,
) -> Result<(), DynError> {
    let sql = assets::insert(collection, asset);
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}

/// Find the oldest record of a collection matching a language tag
pub async fn find_first_by_language(
    pool: &SqlitePool,
    collection: &str,
    language: &str,
    policy: MatchPolicy,
) -> Result<Option<AudioAsset>, DynError> {
    let sql = assets::select_first_by_language(collection, language, policy);
    let row = sqlx::query(&sql).fetch_optional(pool).await?;

    Ok(row.map(|row| {
        AudioAsset::from_row(
            row.get(0),
            row.get(1),
            row.get(2),
            row.get(3),
            row.get(4),
            row.get(5),
        )
    }))
}

/// Count the records of a collection
pub async fn count_assets(pool: &SqlitePool, collection: &str) -> Result<i64, DynError> {
    let sql = assets::count(collection);
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[tokio::test]
    async fn test_schema_init_is_idempotent_and_versioned() {
        let (pool, _guard) = create_test_connection_in_temporary_file().await.unwrap();

        init_database_schema(&pool, &["audioFiles"]).await.unwrap();
        init_database_schema(&pool, &["audioFiles"]).await.unwrap();

        let version = query_metadata(&pool, "version").await.unwrap();
        assert_eq!(version.as_deref(), Some(EXPECTED_DB_VERSION));
    }

    #[tokio::test]
    async fn test_schema_init_rejects_other_version() {
        let (pool, _guard) = create_test_connection_in_temporary_file().await.unwrap();
        sqlx::query(&ddl::create_metadata_table())
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query(&metadata::insert("version", "999"))
            .execute(&pool)
            .await
            .unwrap();

        let err = init_database_schema(&pool, &["audioFiles"])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Unsupported database version"));
    }

    #[tokio::test]
    async fn test_find_returns_oldest_match() {
        let (pool, _guard) = create_test_connection_in_temporary_file().await.unwrap();
        init_database_schema(&pool, &["audioFiles"]).await.unwrap();

        let mut first = AudioAsset::new(
            "en-us".to_string(),
            "/uploads/audio/1-first.mp3".to_string(),
            "1-first.mp3".to_string(),
            Some("first.mp3".to_string()),
        );
        first.created_at = Utc.timestamp_millis_opt(1_000).unwrap();
        let second = AudioAsset::new(
            "en-us".to_string(),
            "/uploads/audio/2-second.mp3".to_string(),
            "2-second.mp3".to_string(),
            Some("second.mp3".to_string()),
        );

        insert_asset(&pool, "audioFiles", &second).await.unwrap();
        insert_asset(&pool, "audioFiles", &first).await.unwrap();

        let found = find_first_by_language(&pool, "audioFiles", "en-us", MatchPolicy::Exact)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found, first);
        assert_eq!(count_assets(&pool, "audioFiles").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_case_insensitive_lookup() {
        let (pool, _guard) = create_test_connection_in_temporary_file().await.unwrap();
        init_database_schema(&pool, &["audio_files"]).await.unwrap();

        let asset = AudioAsset::new(
            "EN-US".to_string(),
            "/uploads/audio/1-a.mp3".to_string(),
            "1-a.mp3".to_string(),
            None,
        );
        insert_asset(&pool, "audio_files", &asset).await.unwrap();

        let exact = find_first_by_language(&pool, "audio_files", "en-us", MatchPolicy::Exact)
            .await
            .unwrap();
        assert!(exact.is_none());

        let found =
            find_first_by_language(&pool, "audio_files", "en-us", MatchPolicy::CaseInsensitive)
                .await
                .unwrap();
        assert_eq!(found.map(|a| a.url), Some(asset.url));
    }

    #[tokio::test]
    async fn test_case_insensitive_lookup_folds_non_ascii() {
        let (pool, _guard) = create_test_connection_in_temporary_file().await.unwrap();
        init_database_schema(&pool, &["audio_files"]).await.unwrap();

        let asset = AudioAsset::new(
            "DÉ-Ü".to_string(),
            "/uploads/audio/1-b.mp3".to_string(),
            "1-b.mp3".to_string(),
            None,
        );
        insert_asset(&pool, "audio_files", &asset).await.unwrap();

        for tag in ["dé-ü", "DÉ-Ü", "Dé-Ü"] {
            let found =
                find_first_by_language(&pool, "audio_files", tag, MatchPolicy::CaseInsensitive)
                    .await
                    .unwrap();
            assert_eq!(found.map(|a| a.url), Some(asset.url.clone()), "tag {}", tag);
        }
    }
}
