use sea_query::{ColumnDef, Index, PostgresQueryBuilder, SqliteQueryBuilder, Table};

use crate::schema::{
    collection_table, folded_language_index_name, language_index_name, AudioAssets, Metadata,
};

/// CREATE TABLE IF NOT EXISTS metadata (key TEXT PRIMARY KEY, value TEXT NOT NULL)
pub fn create_metadata_table() -> String {
    Table::create()
        .table(Metadata::Table)
        .if_not_exists()
        .col(ColumnDef::new(Metadata::Key).string().primary_key())
        .col(ColumnDef::new(Metadata::Value).string().not_null())
        .to_string(SqliteQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS <collection> (
///     id TEXT PRIMARY KEY,
///     language TEXT NOT NULL,
///     language_folded TEXT NOT NULL,
///     url TEXT NOT NULL,
///     file_name TEXT NOT NULL,
///     original_name TEXT,
///     created_at_ms INTEGER NOT NULL
/// )
pub fn create_assets_table(collection: &str) -> String {
    Table::create()
        .table(collection_table(collection))
        .if_not_exists()
        .col(ColumnDef::new(AudioAssets::Id).string().primary_key())
        .col(ColumnDef::new(AudioAssets::Language).string().not_null())
        .col(ColumnDef::new(AudioAssets::LanguageFolded).string().not_null())
        .col(ColumnDef::new(AudioAssets::Url).string().not_null())
        .col(ColumnDef::new(AudioAssets::FileName).string().not_null())
        .col(ColumnDef::new(AudioAssets::OriginalName).string().null())
        .col(
            ColumnDef::new(AudioAssets::CreatedAtMs)
                .big_integer()
                .not_null(),
        )
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_<collection>_language ON <collection>(language)
pub fn create_language_index(collection: &str) -> String {
    Index::create()
        .if_not_exists()
        .name(language_index_name(collection))
        .table(collection_table(collection))
        .col(AudioAssets::Language)
        .to_string(SqliteQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_<collection>_language_folded ON <collection>(language_folded)
pub fn create_folded_language_index(collection: &str) -> String {
    Index::create()
        .if_not_exists()
        .name(folded_language_index_name(collection))
        .table(collection_table(collection))
        .col(AudioAssets::LanguageFolded)
        .to_string(SqliteQueryBuilder)
}

// ============================================================================
// PostgreSQL variants
// ============================================================================

/// CREATE TABLE IF NOT EXISTS metadata - PostgreSQL
pub fn create_metadata_table_pg() -> String {
    Table::create()
        .table(Metadata::Table)
        .if_not_exists()
        .col(ColumnDef::new(Metadata::Key).text().primary_key())
        .col(ColumnDef::new(Metadata::Value).text().not_null())
        .to_string(PostgresQueryBuilder)
}

/// CREATE TABLE IF NOT EXISTS <collection> - PostgreSQL
pub fn create_assets_table_pg(collection: &str) -> String {
    Table::create()
        .table(collection_table(collection))
        .if_not_exists()
        .col(ColumnDef::new(AudioAssets::Id).text().primary_key())
        .col(ColumnDef::new(AudioAssets::Language).text().not_null())
        .col(ColumnDef::new(AudioAssets::LanguageFolded).text().not_null())
        .col(ColumnDef::new(AudioAssets::Url).text().not_null())
        .col(ColumnDef::new(AudioAssets::FileName).text().not_null())
        .col(ColumnDef::new(AudioAssets::OriginalName).text().null())
        .col(
            ColumnDef::new(AudioAssets::CreatedAtMs)
                .big_integer()
                .not_null(),
        )
        .to_string(PostgresQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_<collection>_language - PostgreSQL
pub fn create_language_index_pg(collection: &str) -> String {
    Index::create()
        .if_not_exists()
        .name(language_index_name(collection))
        .table(collection_table(collection))
        .col(AudioAssets::Language)
        .to_string(PostgresQueryBuilder)
}

/// CREATE INDEX IF NOT EXISTS idx_<collection>_language_folded - PostgreSQL
pub fn create_folded_language_index_pg(collection: &str) -> String {
    Index::create()
        .if_not_exists()
        .name(folded_language_index_name(collection))
        .table(collection_table(collection))
        .col(AudioAssets::LanguageFolded)
        .to_string(PostgresQueryBuilder)
}
