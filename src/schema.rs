use sea_query::{Alias, Iden};

/// Metadata table - key-value store for database configuration
#[derive(Iden)]
pub enum Metadata {
    Table,
    Key,
    Value,
}

/// Columns shared by every audio asset collection.
///
/// Each endpoint profile owns its own table, so the table name is not part
/// of this enum; use [`collection_table`] to build it.
#[derive(Iden)]
pub enum AudioAssets {
    Id,
    Language,
    /// Case-folded language, see `profile::fold_case`
    LanguageFolded,
    Url,
    FileName,
    OriginalName,
    CreatedAtMs,
}

/// Table identifier for a collection name (e.g. `audioFiles`)
pub fn collection_table(collection: &str) -> Alias {
    Alias::new(collection)
}

/// Name of the language index for a collection
pub fn language_index_name(collection: &str) -> String {
    format!("idx_{}_language", collection)
}

/// Name of the folded-language index for a collection
pub fn folded_language_index_name(collection: &str) -> String {
    format!("idx_{}_language_folded", collection)
}
