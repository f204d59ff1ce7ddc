use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};

use matchsheet::ingest;
use matchsheet::match_db::{self, IfExists};

fn main() -> Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
    env_logger::init();

    let file = parse_file_arg().ok_or_else(|| {
        anyhow!("usage: matchsheet <match.json> [--db <path>] [--if-exists append|replace|fail]")
    })?;
    if file.extension().and_then(|ext| ext.to_str()) != Some("json") {
        return Err(anyhow!("input {} is not a .json file", file.display()));
    }
    if !file.is_file() {
        return Err(anyhow!("input {} does not exist", file.display()));
    }

    let db_path = parse_db_path_arg().unwrap_or_else(match_db::default_db_path);
    let mode = parse_if_exists_arg()?.unwrap_or_default();

    let mut conn = match_db::open_db(&db_path)?;
    let summary = ingest::ingest_match_file(&mut conn, &file, mode)
        .with_context(|| format!("ingest {}", file.display()))?;
    match_db::close_db(conn)?;

    println!("Match ingest complete");
    println!("DB: {}", db_path.display());
    println!(
        "Match: {} league={} season={}",
        summary.identity.match_id, summary.identity.league, summary.identity.season
    );
    println!(
        "Rows: referees={} games={} player_games={} roster={}",
        summary.referee_rows, summary.game_rows, summary.player_game_rows, summary.roster_rows
    );
    if !summary.errors.is_empty() {
        println!("  errors: {}", summary.errors.len());
        for err in summary.errors.iter().take(6) {
            println!("   - {err}");
        }
    }

    Ok(())
}

fn parse_file_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut skip_next = false;
    for arg in &args {
        if skip_next {
            skip_next = false;
            continue;
        }
        if arg == "--db" || arg == "--if-exists" {
            skip_next = true;
            continue;
        }
        if arg.starts_with("--") {
            continue;
        }
        return Some(PathBuf::from(arg));
    }
    None
}

fn parse_db_path_arg() -> Option<PathBuf> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        if let Some(path) = arg.strip_prefix("--db=") {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                return Some(PathBuf::from(trimmed));
            }
        }
        if arg == "--db" {
            let Some(next) = args.get(idx + 1) else {
                continue;
            };
            if !next.trim().is_empty() {
                return Some(PathBuf::from(next));
            }
        }
    }
    None
}

fn parse_if_exists_arg() -> Result<Option<IfExists>> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    for (idx, arg) in args.iter().enumerate() {
        let raw = if let Some(raw) = arg.strip_prefix("--if-exists=") {
            Some(raw.to_string())
        } else if arg == "--if-exists" {
            args.get(idx + 1).cloned()
        } else {
            None
        };
        if let Some(raw) = raw {
            return IfExists::parse(&raw)
                .map(Some)
                .ok_or_else(|| anyhow!("unknown --if-exists mode {raw:?}"));
        }
    }
    Ok(None)
}
