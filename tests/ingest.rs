use std::path::PathBuf;

use matchsheet::extract::RefereeRecord;
use matchsheet::ingest::ingest_match_file;
use matchsheet::match_db::{self, IfExists};

fn fixture_path() -> PathBuf {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push("EPL1_123456_2019-2020.json");
    path
}

#[test]
fn ingests_fixture_into_all_tables() {
    let mut conn = match_db::open_in_memory().unwrap();
    let summary = ingest_match_file(&mut conn, &fixture_path(), IfExists::Append).unwrap();

    assert_eq!(summary.identity.match_id, "123456");
    assert!(summary.errors.is_empty());
    assert_eq!(summary.referee_rows, 1);
    assert_eq!(summary.game_rows, 1);
    assert_eq!(summary.player_game_rows, 2);
    assert_eq!(summary.roster_rows, 5);

    assert_eq!(match_db::count_rows(&conn, match_db::REFEREES_TABLE).unwrap(), 1);
    assert_eq!(match_db::count_rows(&conn, match_db::GAMES_TABLE).unwrap(), 1);
    assert_eq!(
        match_db::count_rows(&conn, match_db::PLAYER_GAMES_TABLE).unwrap(),
        2
    );
    assert_eq!(
        match_db::count_rows(&conn, match_db::PLAYER_ROSTER_TABLE).unwrap(),
        5
    );

    let started: i64 = conn
        .query_row(
            "SELECT started FROM player_games WHERE player_id = 42",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(started, 0);
    let sub_out: i64 = conn
        .query_row(
            "SELECT sub_out_player_id FROM player_games WHERE player_id = 42",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(sub_out, 10);
}

#[test]
fn append_mode_accumulates_rows() {
    let mut conn = match_db::open_in_memory().unwrap();
    ingest_match_file(&mut conn, &fixture_path(), IfExists::Append).unwrap();
    ingest_match_file(&mut conn, &fixture_path(), IfExists::Append).unwrap();
    assert_eq!(match_db::count_rows(&conn, match_db::GAMES_TABLE).unwrap(), 2);
    assert_eq!(
        match_db::count_rows(&conn, match_db::PLAYER_GAMES_TABLE).unwrap(),
        4
    );
}

#[test]
fn replace_mode_clears_previous_rows() {
    let mut conn = match_db::open_in_memory().unwrap();
    ingest_match_file(&mut conn, &fixture_path(), IfExists::Append).unwrap();
    ingest_match_file(&mut conn, &fixture_path(), IfExists::Replace).unwrap();
    assert_eq!(match_db::count_rows(&conn, match_db::GAMES_TABLE).unwrap(), 1);
    assert_eq!(
        match_db::count_rows(&conn, match_db::PLAYER_ROSTER_TABLE).unwrap(),
        5
    );
}

#[test]
fn fail_mode_records_errors_but_finishes_the_run() {
    let mut conn = match_db::open_in_memory().unwrap();
    ingest_match_file(&mut conn, &fixture_path(), IfExists::Append).unwrap();
    let summary = ingest_match_file(&mut conn, &fixture_path(), IfExists::Fail).unwrap();

    assert_eq!(summary.rows_written(), 0);
    assert_eq!(summary.errors.len(), 4);
    assert_eq!(match_db::count_rows(&conn, match_db::GAMES_TABLE).unwrap(), 1);
}

#[test]
fn fail_mode_writes_into_empty_tables() {
    let conn = match_db::open_in_memory().unwrap();
    let row = RefereeRecord {
        match_id: "123456".to_string(),
        referee_id: 71,
        referee_name: "Martin Atkinson".to_string(),
    };
    assert_eq!(match_db::append_referee(&conn, &row, IfExists::Fail).unwrap(), 1);
    assert!(match_db::append_referee(&conn, &row, IfExists::Fail).is_err());
}

#[test]
fn bad_source_name_aborts_before_touching_the_db() {
    let mut conn = match_db::open_in_memory().unwrap();
    let path = PathBuf::from("no_patterns_here.json");
    assert!(ingest_match_file(&mut conn, &path, IfExists::Append).is_err());
    assert_eq!(match_db::count_rows(&conn, match_db::GAMES_TABLE).unwrap(), 0);
}

#[test]
fn missing_file_is_a_parse_error() {
    let mut conn = match_db::open_in_memory().unwrap();
    let path = PathBuf::from("/nonexistent/EPL1_123456_2019-2020.json");
    assert!(ingest_match_file(&mut conn, &path, IfExists::Append).is_err());
}
