use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow};
use chrono::Utc;
use log::info;
use rusqlite::{Connection, params};

use crate::extract::{GameRecord, PlayerGameRecord, PlayerRosterRecord, RefereeRecord};

pub const REFEREES_TABLE: &str = "referees";
pub const GAMES_TABLE: &str = "games";
pub const PLAYER_GAMES_TABLE: &str = "player_games";
pub const PLAYER_ROSTER_TABLE: &str = "player_roster";

/// What to do when the target table already holds rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IfExists {
    #[default]
    Append,
    Replace,
    Fail,
}

impl IfExists {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "append" => Some(IfExists::Append),
            "replace" => Some(IfExists::Replace),
            "fail" => Some(IfExists::Fail),
            _ => None,
        }
    }
}

pub fn default_db_path() -> PathBuf {
    std::env::var("MATCHSHEET_DB")
        .ok()
        .filter(|raw| !raw.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("matches.sqlite"))
}

pub fn open_db(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).ok();
    }
    let conn =
        Connection::open(path).with_context(|| format!("open sqlite db {}", path.display()))?;
    init_schema(&conn)?;
    info!("opened match db {}", path.display());
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory().context("open in-memory sqlite db")?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        PRAGMA journal_mode = WAL;
        CREATE TABLE IF NOT EXISTS referees (
            match_id TEXT NOT NULL,
            referee_id INTEGER NOT NULL,
            referee_name TEXT NOT NULL,
            ingested_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS games (
            match_id TEXT NOT NULL,
            league TEXT NOT NULL,
            season TEXT NOT NULL,
            venue_name TEXT NOT NULL,
            attendance INTEGER NOT NULL,
            start_date TEXT NOT NULL,
            start_time TEXT NOT NULL,
            weather_code TEXT NOT NULL,
            home_team_id INTEGER NOT NULL,
            home_team_name TEXT NOT NULL,
            home_team_manager TEXT NOT NULL,
            home_avg_age REAL NOT NULL,
            away_team_id INTEGER NOT NULL,
            away_team_name TEXT NOT NULL,
            away_team_manager TEXT NOT NULL,
            away_avg_age REAL NOT NULL,
            home_goals INTEGER NOT NULL,
            away_goals INTEGER NOT NULL,
            home_ht_goals INTEGER NOT NULL,
            away_ht_goals INTEGER NOT NULL,
            home_ft_goals INTEGER NOT NULL,
            away_ft_goals INTEGER NOT NULL,
            ingested_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS player_games (
            match_id TEXT NOT NULL,
            player_id INTEGER NOT NULL,
            shirt_no INTEGER NOT NULL,
            name TEXT NOT NULL,
            position TEXT NOT NULL,
            started INTEGER NOT NULL,
            sub_out_player_id INTEGER NULL,
            sub_in_minute INTEGER NULL,
            sub_in_half TEXT NULL,
            height REAL NOT NULL,
            weight REAL NOT NULL,
            age INTEGER NOT NULL,
            man_of_match INTEGER NOT NULL,
            field TEXT NOT NULL,
            ingested_at TEXT NOT NULL
        );
        CREATE TABLE IF NOT EXISTS player_roster (
            player_id TEXT NOT NULL,
            player_name TEXT NOT NULL,
            ingested_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_referees_match ON referees(match_id);
        CREATE INDEX IF NOT EXISTS idx_games_match ON games(match_id);
        CREATE INDEX IF NOT EXISTS idx_player_games_match ON player_games(match_id);
        CREATE INDEX IF NOT EXISTS idx_player_roster_player ON player_roster(player_id);
        "#,
    )
    .context("create sqlite schema")?;
    Ok(())
}

/// Raw statement passthrough for callers managing their own tables.
pub fn execute(conn: &Connection, sql: &str) -> Result<usize> {
    conn.execute(sql, [])
        .with_context(|| format!("execute statement {sql:?}"))
}

pub fn close_db(conn: Connection) -> Result<()> {
    conn.close().map_err(|(_, err)| err).context("close sqlite db")
}

fn prepare_table(conn: &Connection, table: &str, mode: IfExists) -> Result<()> {
    match mode {
        IfExists::Append => Ok(()),
        IfExists::Replace => {
            conn.execute(&format!("DELETE FROM {table}"), [])
                .with_context(|| format!("clear table {table}"))?;
            Ok(())
        }
        IfExists::Fail => {
            let rows: i64 = conn
                .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
                    row.get(0)
                })
                .with_context(|| format!("count rows in {table}"))?;
            if rows > 0 {
                return Err(anyhow!("table {table} already holds {rows} rows"));
            }
            Ok(())
        }
    }
}

pub fn append_referee(conn: &Connection, row: &RefereeRecord, mode: IfExists) -> Result<usize> {
    prepare_table(conn, REFEREES_TABLE, mode)?;
    conn.execute(
        "INSERT INTO referees (match_id, referee_id, referee_name, ingested_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            row.match_id,
            row.referee_id,
            row.referee_name,
            Utc::now().to_rfc3339()
        ],
    )
    .context("append referee row")?;
    Ok(1)
}

pub fn append_game(conn: &Connection, row: &GameRecord, mode: IfExists) -> Result<usize> {
    prepare_table(conn, GAMES_TABLE, mode)?;
    conn.execute(
        r#"
        INSERT INTO games (
            match_id, league, season, venue_name, attendance,
            start_date, start_time, weather_code,
            home_team_id, home_team_name, home_team_manager, home_avg_age,
            away_team_id, away_team_name, away_team_manager, away_avg_age,
            home_goals, away_goals, home_ht_goals, away_ht_goals,
            home_ft_goals, away_ft_goals, ingested_at
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5,
            ?6, ?7, ?8,
            ?9, ?10, ?11, ?12,
            ?13, ?14, ?15, ?16,
            ?17, ?18, ?19, ?20,
            ?21, ?22, ?23
        )
        "#,
        params![
            row.match_id,
            row.league,
            row.season,
            row.venue_name,
            row.attendance,
            row.start_date,
            row.start_time,
            row.weather_code,
            row.home_team_id,
            row.home_team_name,
            row.home_team_manager,
            row.home_avg_age,
            row.away_team_id,
            row.away_team_name,
            row.away_team_manager,
            row.away_avg_age,
            row.home_goals,
            row.away_goals,
            row.home_ht_goals,
            row.away_ht_goals,
            row.home_ft_goals,
            row.away_ft_goals,
            Utc::now().to_rfc3339(),
        ],
    )
    .context("append game row")?;
    Ok(1)
}

pub fn append_player_games(
    conn: &mut Connection,
    rows: &[PlayerGameRecord],
    mode: IfExists,
) -> Result<usize> {
    prepare_table(conn, PLAYER_GAMES_TABLE, mode)?;
    let tx = conn.transaction().context("begin player-games append")?;
    let stamp = Utc::now().to_rfc3339();
    for row in rows {
        tx.execute(
            r#"
            INSERT INTO player_games (
                match_id, player_id, shirt_no, name, position, started,
                sub_out_player_id, sub_in_minute, sub_in_half,
                height, weight, age, man_of_match, field, ingested_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6,
                ?7, ?8, ?9,
                ?10, ?11, ?12, ?13, ?14, ?15
            )
            "#,
            params![
                row.match_id,
                row.player_id,
                row.shirt_no,
                row.name,
                row.position,
                bool_to_i64(row.started),
                row.sub_out_player_id,
                row.sub_in_minute,
                row.sub_in_half,
                row.height,
                row.weight,
                row.age,
                bool_to_i64(row.man_of_match),
                row.field,
                stamp,
            ],
        )
        .context("append player-game row")?;
    }
    tx.commit().context("commit player-games append")?;
    Ok(rows.len())
}

pub fn append_roster(
    conn: &mut Connection,
    rows: &[PlayerRosterRecord],
    mode: IfExists,
) -> Result<usize> {
    prepare_table(conn, PLAYER_ROSTER_TABLE, mode)?;
    let tx = conn.transaction().context("begin roster append")?;
    let stamp = Utc::now().to_rfc3339();
    for row in rows {
        tx.execute(
            "INSERT INTO player_roster (player_id, player_name, ingested_at)
             VALUES (?1, ?2, ?3)",
            params![row.player_id, row.player_name, stamp],
        )
        .context("append roster row")?;
    }
    tx.commit().context("commit roster append")?;
    Ok(rows.len())
}

pub fn count_rows(conn: &Connection, table: &str) -> Result<i64> {
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| {
        row.get(0)
    })
    .with_context(|| format!("count rows in {table}"))
}

fn bool_to_i64(v: bool) -> i64 {
    if v { 1 } else { 0 }
}
