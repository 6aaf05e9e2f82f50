use sea_query::{
    Expr, Func, InsertStatement, Order, PostgresQueryBuilder, Query, SelectStatement,
    SqliteQueryBuilder,
};

use crate::asset::AudioAsset;
use crate::profile::{fold_case, MatchPolicy};
use crate::schema::{collection_table, AudioAssets};

/// Columns in the order expected by the row mappers in db.rs / db_postgres.rs
const SELECT_COLUMNS: [AudioAssets; 6] = [
    AudioAssets::Id,
    AudioAssets::Language,
    AudioAssets::Url,
    AudioAssets::FileName,
    AudioAssets::OriginalName,
    AudioAssets::CreatedAtMs,
];

fn insert_statement(collection: &str, asset: &AudioAsset) -> InsertStatement {
    Query::insert()
        .into_table(collection_table(collection))
        .columns([
            AudioAssets::Id,
            AudioAssets::Language,
            AudioAssets::LanguageFolded,
            AudioAssets::Url,
            AudioAssets::FileName,
            AudioAssets::OriginalName,
            AudioAssets::CreatedAtMs,
        ])
        .values_panic([
            asset.id.as_str().into(),
            asset.language.as_str().into(),
            fold_case(&asset.language).into(),
            asset.url.as_str().into(),
            asset.file_name.as_str().into(),
            asset.original_name.clone().into(),
            asset.created_at_ms().into(),
        ])
        .to_owned()
}

fn select_first_statement(
    collection: &str,
    language: &str,
    policy: MatchPolicy,
) -> SelectStatement {
    let mut query = Query::select();
    query
        .columns(SELECT_COLUMNS)
        .from(collection_table(collection));

    match policy {
        MatchPolicy::Exact => {
            query.and_where(Expr::col(AudioAssets::Language).eq(language));
        }
        MatchPolicy::CaseInsensitive => {
            // Folded in Rust; SQLite's LOWER only folds ASCII
            query.and_where(Expr::col(AudioAssets::LanguageFolded).eq(fold_case(language)));
        }
    }

    query
        .order_by(AudioAssets::CreatedAtMs, Order::Asc)
        .order_by(AudioAssets::Id, Order::Asc)
        .limit(1)
        .to_owned()
}

/// INSERT INTO <collection> (id, language, language_folded, url, file_name, original_name,
/// created_at_ms) VALUES (...)
pub fn insert(collection: &str, asset: &AudioAsset) -> String {
    insert_statement(collection, asset).to_string(SqliteQueryBuilder)
}

/// SELECT ... FROM <collection> WHERE language = ? ORDER BY created_at_ms, id LIMIT 1
///
/// With [`MatchPolicy::CaseInsensitive`] the condition becomes
/// `language_folded = ?` with the tag folded by [`fold_case`].
pub fn select_first_by_language(collection: &str, language: &str, policy: MatchPolicy) -> String {
    select_first_statement(collection, language, policy).to_string(SqliteQueryBuilder)
}

/// SELECT COUNT(*) FROM <collection>
pub fn count(collection: &str) -> String {
    Query::select()
        .expr(Func::count(Expr::col(AudioAssets::Id)))
        .from(collection_table(collection))
        .to_string(SqliteQueryBuilder)
}

// ============================================================================
// PostgreSQL variants
// ============================================================================

/// INSERT INTO <collection> ... - PostgreSQL
pub fn insert_pg(collection: &str, asset: &AudioAsset) -> String {
    insert_statement(collection, asset).to_string(PostgresQueryBuilder)
}

/// SELECT ... FROM <collection> WHERE language = ? LIMIT 1 - PostgreSQL
pub fn select_first_by_language_pg(
    collection: &str,
    language: &str,
    policy: MatchPolicy,
) -> String {
    select_first_statement(collection, language, policy).to_string(PostgresQueryBuilder)
}

/// SELECT COUNT(*) FROM <collection> - PostgreSQL
pub fn count_pg(collection: &str) -> String {
    Query::select()
        .expr(Func::count(Expr::col(AudioAssets::Id)))
        .from(collection_table(collection))
        .to_string(PostgresQueryBuilder)
}
