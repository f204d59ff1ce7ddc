use std::path::Path;

use anyhow::Result;
use log::{info, warn};
use rusqlite::Connection;

use crate::document;
use crate::error::ExtractError;
use crate::extract;
use crate::identity::{self, MatchIdentity};
use crate::match_db::{self, IfExists};

/// Per-document outcome: row counts per table plus the failures that were
/// logged along the way. A table missing from the counts failed; consult
/// `errors` rather than inferring success from a returned summary.
#[derive(Debug, Clone)]
pub struct IngestSummary {
    pub identity: MatchIdentity,
    pub referee_rows: usize,
    pub game_rows: usize,
    pub player_game_rows: usize,
    pub roster_rows: usize,
    pub errors: Vec<String>,
}

impl IngestSummary {
    fn new(identity: MatchIdentity) -> Self {
        IngestSummary {
            identity,
            referee_rows: 0,
            game_rows: 0,
            player_game_rows: 0,
            roster_rows: 0,
            errors: Vec::new(),
        }
    }

    pub fn rows_written(&self) -> usize {
        self.referee_rows + self.game_rows + self.player_game_rows + self.roster_rows
    }
}

/// Flatten one match-sheet file into the four tables. Identity derivation
/// and document parsing abort the run; a failed extractor or a failed table
/// write is logged, recorded, and skips only its own table.
pub fn ingest_match_file(
    conn: &mut Connection,
    path: &Path,
    mode: IfExists,
) -> Result<IngestSummary> {
    let source_name = path.display().to_string();
    let identity = identity::derive_identity(&source_name)?;
    let doc = document::load_document(path)?;
    info!(
        "ingesting match {} (league {}, season {})",
        identity.match_id, identity.league, identity.season
    );

    let mut summary = IngestSummary::new(identity.clone());

    match extract::extract_referee(&doc, &identity) {
        Ok(row) => match match_db::append_referee(conn, &row, mode) {
            Ok(n) => summary.referee_rows = n,
            Err(err) => record_failure(&mut summary, match_db::REFEREES_TABLE, &format!("{err:#}")),
        },
        Err(err) => record_extract_failure(&mut summary, match_db::REFEREES_TABLE, &err),
    }

    match extract::extract_game(&doc, &identity) {
        Ok(row) => match match_db::append_game(conn, &row, mode) {
            Ok(n) => summary.game_rows = n,
            Err(err) => record_failure(&mut summary, match_db::GAMES_TABLE, &format!("{err:#}")),
        },
        Err(err) => record_extract_failure(&mut summary, match_db::GAMES_TABLE, &err),
    }

    match extract::extract_player_games(&doc, &identity) {
        Ok(rows) => match match_db::append_player_games(conn, &rows, mode) {
            Ok(n) => summary.player_game_rows = n,
            Err(err) => {
                record_failure(&mut summary, match_db::PLAYER_GAMES_TABLE, &format!("{err:#}"))
            }
        },
        Err(err) => record_extract_failure(&mut summary, match_db::PLAYER_GAMES_TABLE, &err),
    }

    match extract::extract_roster(&doc) {
        Ok(rows) => match match_db::append_roster(conn, &rows, mode) {
            Ok(n) => summary.roster_rows = n,
            Err(err) => {
                record_failure(&mut summary, match_db::PLAYER_ROSTER_TABLE, &format!("{err:#}"))
            }
        },
        Err(err) => record_extract_failure(&mut summary, match_db::PLAYER_ROSTER_TABLE, &err),
    }

    info!(
        "match {} done: {} rows across 4 tables, {} errors",
        summary.identity.match_id,
        summary.rows_written(),
        summary.errors.len()
    );
    Ok(summary)
}

fn record_extract_failure(summary: &mut IngestSummary, table: &str, err: &ExtractError) {
    warn!("{table} extraction failed: {err}");
    summary.errors.push(format!("{table}: {err}"));
}

fn record_failure(summary: &mut IngestSummary, table: &str, detail: &str) {
    warn!("{table} write failed: {detail}");
    summary.errors.push(format!("{table}: {detail}"));
}
