use log::info;
use sqlx::postgres::PgPool;
use sqlx::sqlite::SqlitePool;

use crate::asset::AudioAsset;
use crate::config::{DatabaseBackend, DatabaseConfig};
use crate::credentials::{get_postgres_password, Credentials};
use crate::db::{self, DynError};
use crate::db_postgres;
use crate::profile::MatchPolicy;

/// Audio asset record store, backed by SQLite or PostgreSQL
///
/// Built once at startup and shared by all handlers. Cloning is cheap (the
/// pools are reference counted).
#[derive(Clone)]
pub enum AssetStore {
    Sqlite(SqlitePool),
    Postgres(PgPool),
}

impl AssetStore {
    /// Connect to the configured backend
    pub async fn connect(
        config: &DatabaseConfig,
        credentials: &Option<Credentials>,
    ) -> Result<Self, DynError> {
        match config.backend {
            DatabaseBackend::Sqlite => {
                let path = config.sqlite_path();
                let pool = db::open_database(&path).await?;
                info!("SQLite database: {}", path.display());
                Ok(AssetStore::Sqlite(pool))
            }
            DatabaseBackend::Postgres => {
                let base_url = config
                    .postgres_url
                    .as_deref()
                    .ok_or("database.postgres_url is required for the postgres backend")?;
                let database = config
                    .database
                    .as_deref()
                    .ok_or("database.database is required for the postgres backend")?;
                let profile = config
                    .credential_profile
                    .as_deref()
                    .ok_or("database.credential_profile is required for the postgres backend")?;
                let password = get_postgres_password(credentials, profile)?;
                let pool = db_postgres::open_postgres_connection_create_if_needed(
                    base_url, &password, database,
                )
                .await?;
                info!("PostgreSQL database: {}", database);
                Ok(AssetStore::Postgres(pool))
            }
        }
    }

    /// Create the metadata table and one table per collection
    pub async fn init_schema(&self, collections: &[&str]) -> Result<(), DynError> {
        match self {
            AssetStore::Sqlite(pool) => db::init_database_schema(pool, collections).await,
            AssetStore::Postgres(pool) => {
                db_postgres::init_database_schema_pg(pool, collections).await
            }
        }
    }

    pub async fn insert(&self, collection: &str, asset: &AudioAsset) -> Result<(), DynError> {
        match self {
            AssetStore::Sqlite(pool) => db::insert_asset(pool, collection, asset).await,
            AssetStore::Postgres(pool) => {
                db_postgres::insert_asset_pg(pool, collection, asset).await
            }
        }
    }

    /// First (oldest) record whose language matches `language` under `policy`
    pub async fn find_first(
        &self,
        collection: &str,
        language: &str,
        policy: MatchPolicy,
    ) -> Result<Option<AudioAsset>, DynError> {
        match self {
            AssetStore::Sqlite(pool) => {
                db::find_first_by_language(pool, collection, language, policy).await
            }
            AssetStore::Postgres(pool) => {
                db_postgres::find_first_by_language_pg(pool, collection, language, policy).await
            }
        }
    }

    pub async fn count(&self, collection: &str) -> Result<i64, DynError> {
        match self {
            AssetStore::Sqlite(pool) => db::count_assets(pool, collection).await,
            AssetStore::Postgres(pool) => db_postgres::count_assets_pg(pool, collection).await,
        }
    }

    /// Close the underlying pool, waiting for checked-out connections
    pub async fn close(&self) {
        match self {
            AssetStore::Sqlite(pool) => pool.close().await,
            AssetStore::Postgres(pool) => pool.close().await,
        }
    }
}
