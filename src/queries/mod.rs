//! SQL builders for SQLite and PostgreSQL.
//!
//! Functions return SQL strings with inlined, escaped values. PostgreSQL
//! variants carry a `_pg` suffix.

pub mod assets;
pub mod ddl;
pub mod metadata;
