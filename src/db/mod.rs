//! Database layer (SQLite).
//!
//! Two tables, both keyed by group: `members` (one row per user per group)
//! and `runs` (append-only run log). Schema lives in `migrations/`.

pub mod sqlite;

pub use sqlite::RunStore;
