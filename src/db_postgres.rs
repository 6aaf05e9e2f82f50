//! PostgreSQL database module
//!
//! Mirrors db.rs using PgPool instead of SqlitePool.

use sqlx::postgres::{PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::{Executor, Row};
use std::str::FromStr;

use crate::asset::AudioAsset;
use crate::constants::EXPECTED_DB_VERSION;
use crate::db::DynError;
use crate::profile::MatchPolicy;
use crate::queries::{assets, ddl, metadata};

/// Build a full PostgreSQL connection URL with password and database
///
/// Takes a base URL like `postgres://user@host:5432` and inserts the password
/// and appends the database name.
pub fn build_postgres_url(
    base_url: &str,
    password: &str,
    database: &str,
) -> Result<String, DynError> {
    let url = url::Url::parse(base_url)?;

    let user = url.username();
    let host = url.host_str().ok_or("Missing host in postgres_url")?;
    let port = url.port().unwrap_or(5432);

    let full_url = format!(
        "postgres://{}:{}@{}:{}/{}",
        user,
        urlencoding::encode(password),
        host,
        port,
        database
    );

    Ok(full_url)
}

/// Open a PostgreSQL connection pool
pub async fn open_postgres_connection(
    base_url: &str,
    password: &str,
    database: &str,
) -> Result<PgPool, DynError> {
    let full_url = build_postgres_url(base_url, password, database)?;

    let options = PgConnectOptions::from_str(&full_url)?;

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await?;

    Ok(pool)
}

/// Create a PostgreSQL database if it doesn't exist
pub async fn create_database_if_not_exists(
    base_url: &str,
    password: &str,
    database: &str,
) -> Result<(), DynError> {
    // The target database may not exist yet, so connect to 'postgres' to create it
    let admin_url = build_postgres_url(base_url, password, "postgres")?;
    let admin_options = PgConnectOptions::from_str(&admin_url)?;

    let admin_pool = PgPoolOptions::new()
        .max_connections(1)
        .connect_with(admin_options)
        .await?;

    let exists: bool =
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM pg_database WHERE datname = $1)")
            .bind(database)
            .fetch_one(&admin_pool)
            .await?;

    if !exists {
        // CREATE DATABASE cannot use prepared statements
        let create_sql = format!("CREATE DATABASE \"{}\"", database.replace('"', "\"\""));
        if let Err(e) = sqlx::query(&create_sql).execute(&admin_pool).await {
            // 42P04 (duplicate_database): another process created it between EXISTS and CREATE
            let err_str = e.to_string();
            if !err_str.contains("already exists") && !err_str.contains("42P04") {
                admin_pool.close().await;
                return Err(e.into());
            }
        }
    }

    admin_pool.close().await;
    Ok(())
}

/// Open a PostgreSQL connection pool, creating the database if it doesn't exist
pub async fn open_postgres_connection_create_if_needed(
    base_url: &str,
    password: &str,
    database: &str,
) -> Result<PgPool, DynError> {
    create_database_if_not_exists(base_url, password, database).await?;
    open_postgres_connection(base_url, password, database).await
}

/// Initialize database schema for PostgreSQL
pub async fn init_database_schema_pg(
    pool: &PgPool,
    collections: &[&str],
) -> Result<(), DynError> {
    sqlx::query(&ddl::create_metadata_table_pg())
        .execute(pool)
        .await?;

    for collection in collections {
        sqlx::query(&ddl::create_assets_table_pg(collection))
            .execute(pool)
            .await?;
        sqlx::query(&ddl::create_language_index_pg(collection))
            .execute(pool)
            .await?;
        sqlx::query(&ddl::create_folded_language_index_pg(collection))
            .execute(pool)
            .await?;
    }

    match query_metadata_pg(pool, "version").await? {
        Some(version) if version != EXPECTED_DB_VERSION => {
            return Err(format!(
                "Unsupported database version: '{}'. This application only supports version '{}'",
                version, EXPECTED_DB_VERSION
            )
            .into());
        }
        Some(_) => {}
        None => {
            let sql = metadata::insert_pg("version", EXPECTED_DB_VERSION);
            sqlx::query(&sql).execute(pool).await?;
        }
    }

    Ok(())
}

/// Query a single metadata value by key (PostgreSQL version)
pub async fn query_metadata_pg<'e, E>(executor: E, key: &str) -> Result<Option<String>, DynError>
where
    E: Executor<'e, Database = sqlx::Postgres>,
{
    let sql = metadata::select_by_key_pg(key);
    let result = sqlx::query(&sql).fetch_optional(executor).await?;

    Ok(result.map(|row| row.get::<String, _>(0)))
}

/// Insert one audio asset record into a collection (PostgreSQL version)
pub async fn insert_asset_pg(
    pool: &PgPool,
    collection: &str,
    asset: &AudioAsset,
) -> Result<(), DynError> {
    let sql = assets::insert_pg(collection, asset);
    sqlx::query(&sql).execute(pool).await?;
    Ok(())
}

/// Find the oldest record of a collection matching a language tag (PostgreSQL version)
pub async fn find_first_by_language_pg(
    pool: &PgPool,
    collection: &str,
    language: &str,
    policy: MatchPolicy,
) -> Result<Option<AudioAsset>, DynError> {
    let sql = assets::select_first_by_language_pg(collection, language, policy);
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

/// Count the records of a collection (PostgreSQL version)
pub async fn count_assets_pg(pool: &PgPool, collection: &str) -> Result<i64, DynError> {
    let sql = assets::count_pg(collection);
    let count: i64 = sqlx::query_scalar(&sql).fetch_one(pool).await?;
    Ok(count)
}
