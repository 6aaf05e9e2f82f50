// Library interface for testing

pub mod api;
pub mod asset;
pub mod config;
pub mod constants;
pub mod credentials;
pub mod db;
pub mod db_postgres;
pub mod error;
pub mod profile;
pub mod queries;
pub mod schema;
pub mod serve;
pub mod storage;
pub mod store;

// Re-export the expected database version for convenience
pub use constants::EXPECTED_DB_VERSION;
