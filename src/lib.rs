//! Flatten provider match-sheet JSON documents into relational SQLite
//! tables: one referee row, one game row, player-game rows for both sides,
//! and the player-id/name roster.

pub mod document;
pub mod error;
pub mod extract;
pub mod identity;
pub mod ingest;
pub mod match_db;
