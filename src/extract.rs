use chrono::NaiveDateTime;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ExtractError;
use crate::identity::MatchIdentity;

/// One referee row per document.
#[derive(Debug, Clone, PartialEq)]
pub struct RefereeRecord {
    pub match_id: String,
    pub referee_id: i64,
    pub referee_name: String,
}

/// One game row per document: identity triple plus the derived fields.
#[derive(Debug, Clone, PartialEq)]
pub struct GameRecord {
    pub match_id: String,
    pub league: String,
    pub season: String,
    pub venue_name: String,
    pub attendance: i64,
    pub start_date: String,
    pub start_time: String,
    pub weather_code: String,
    pub home_team_id: i64,
    pub home_team_name: String,
    pub home_team_manager: String,
    pub home_avg_age: f64,
    pub away_team_id: i64,
    pub away_team_name: String,
    pub away_team_manager: String,
    pub away_avg_age: f64,
    pub home_goals: i64,
    pub away_goals: i64,
    pub home_ht_goals: i64,
    pub away_ht_goals: i64,
    pub home_ft_goals: i64,
    pub away_ft_goals: i64,
}

/// One row per player who appeared, both sides.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerGameRecord {
    pub match_id: String,
    pub player_id: i64,
    pub shirt_no: i64,
    pub name: String,
    pub position: String,
    pub started: bool,
    pub sub_out_player_id: Option<i64>,
    pub sub_in_minute: Option<i64>,
    pub sub_in_half: Option<String>,
    pub height: f64,
    pub weight: f64,
    pub age: i64,
    pub man_of_match: bool,
    pub field: String,
}

/// One row per (player id, name) pair of the document's name dictionary.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRosterRecord {
    pub player_id: String,
    pub player_name: String,
}

pub fn extract_referee(
    doc: &Value,
    identity: &MatchIdentity,
) -> Result<RefereeRecord, ExtractError> {
    Ok(RefereeRecord {
        match_id: identity.match_id.clone(),
        referee_id: i64_field(doc, "referee.officialId")?,
        referee_name: str_field(doc, "referee.name")?,
    })
}

pub fn extract_game(doc: &Value, identity: &MatchIdentity) -> Result<GameRecord, ExtractError> {
    let (home_goals, away_goals) = split_score(&str_field(doc, "score")?)?;
    let (home_ht_goals, away_ht_goals) = split_score(&str_field(doc, "htScore")?)?;
    let (home_ft_goals, away_ft_goals) = split_score(&str_field(doc, "ftScore")?)?;

    let start_time = kickoff_part(&str_field(doc, "startTime")?, "%H:%M:%S")?;
    let start_date = kickoff_part(&str_field(doc, "startDate")?, "%Y-%m-%d")?;

    Ok(GameRecord {
        match_id: identity.match_id.clone(),
        league: identity.league.clone(),
        season: identity.season.clone(),
        venue_name: str_field(doc, "venueName")?,
        attendance: i64_field(doc, "attendance")?,
        start_date,
        start_time,
        weather_code: scalar_field(doc, "weatherCode")?,
        home_team_id: i64_field(doc, "home.teamId")?,
        home_team_name: str_field(doc, "home.name")?,
        home_team_manager: str_field(doc, "home.managerName")?,
        home_avg_age: f64_field(doc, "home.averageAge")?,
        away_team_id: i64_field(doc, "away.teamId")?,
        away_team_name: str_field(doc, "away.name")?,
        away_team_manager: str_field(doc, "away.managerName")?,
        away_avg_age: f64_field(doc, "away.averageAge")?,
        home_goals,
        away_goals,
        home_ht_goals,
        away_ht_goals,
        home_ft_goals,
        away_ft_goals,
    })
}

/// Both sides in one pass each, home rows first, source order within a side.
pub fn extract_player_games(
    doc: &Value,
    identity: &MatchIdentity,
) -> Result<Vec<PlayerGameRecord>, ExtractError> {
    let mut rows = side_player_games(doc, "home", &identity.match_id)?;
    rows.extend(side_player_games(doc, "away", &identity.match_id)?);
    Ok(rows)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlayerEntry {
    player_id: i64,
    shirt_no: i64,
    name: String,
    position: String,
    height: f64,
    weight: f64,
    age: i64,
    #[serde(default)]
    is_man_of_the_match: bool,
    field: String,
    subbed_out_player_id: Option<i64>,
    subbed_in_expanded_minute: Option<i64>,
    subbed_in_period: Option<PeriodRef>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PeriodRef {
    display_name: String,
}

fn side_player_games(
    doc: &Value,
    side: &'static str,
    match_id: &str,
) -> Result<Vec<PlayerGameRecord>, ExtractError> {
    let Some(players) = lookup(doc, side)?.get("players").and_then(|v| v.as_array()) else {
        return Err(missing(&format!("{side}.players")));
    };

    let mut rows = Vec::with_capacity(players.len());
    for (idx, raw) in players.iter().enumerate() {
        let entry: PlayerEntry = serde_json::from_value(raw.clone()).map_err(|err| {
            ExtractError::MissingField {
                field: format!("{side}.players[{idx}]: {err}"),
            }
        })?;

        // A subbedOutPlayerId marks a substitute; starters carry no sub fields.
        let started = entry.subbed_out_player_id.is_none();
        let (sub_out_player_id, sub_in_minute, sub_in_half) = if started {
            (None, None, None)
        } else {
            (
                entry.subbed_out_player_id,
                entry.subbed_in_expanded_minute,
                entry.subbed_in_period.map(|p| p.display_name),
            )
        };

        rows.push(PlayerGameRecord {
            match_id: match_id.to_string(),
            player_id: entry.player_id,
            shirt_no: entry.shirt_no,
            name: entry.name,
            position: entry.position,
            started,
            sub_out_player_id,
            sub_in_minute,
            sub_in_half,
            height: entry.height,
            weight: entry.weight,
            age: entry.age,
            man_of_match: entry.is_man_of_the_match,
            field: entry.field,
        });
    }
    Ok(rows)
}

/// The provider may bind one id to a list of alternate names; each name
/// becomes its own row carrying the same id.
pub fn extract_roster(doc: &Value) -> Result<Vec<PlayerRosterRecord>, ExtractError> {
    let Some(dict) = lookup(doc, "playerIdNameDictionary")?.as_object() else {
        return Err(missing("playerIdNameDictionary"));
    };

    let mut rows = Vec::with_capacity(dict.len());
    for (player_id, value) in dict {
        match value {
            Value::Array(names) => {
                for name in names {
                    if let Some(name) = scalar_string(name) {
                        rows.push(PlayerRosterRecord {
                            player_id: player_id.clone(),
                            player_name: name,
                        });
                    }
                }
            }
            other => {
                if let Some(name) = scalar_string(other) {
                    rows.push(PlayerRosterRecord {
                        player_id: player_id.clone(),
                        player_name: name,
                    });
                }
            }
        }
    }
    Ok(rows)
}

/// Split an `"H:A"` score string into its two integer halves.
pub fn split_score(raw: &str) -> Result<(i64, i64), ExtractError> {
    let mut parts = raw.split(':');
    let (Some(home), Some(away), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(score_error(raw));
    };
    let home = home.trim().parse::<i64>().map_err(|_| score_error(raw))?;
    let away = away.trim().parse::<i64>().map_err(|_| score_error(raw))?;
    Ok((home, away))
}

fn score_error(raw: &str) -> ExtractError {
    ExtractError::ScoreFormat {
        raw: raw.to_string(),
    }
}

/// Kickoff stamps arrive as `"%Y-%m-%dT%H:%M:%S"`; re-render one part.
fn kickoff_part(raw: &str, render: &str) -> Result<String, ExtractError> {
    let cleaned = raw.replace('T', " ");
    let parsed = NaiveDateTime::parse_from_str(&cleaned, "%Y-%m-%d %H:%M:%S").map_err(|_| {
        ExtractError::TimestampFormat {
            raw: raw.to_string(),
        }
    })?;
    Ok(parsed.format(render).to_string())
}

fn lookup<'a>(doc: &'a Value, path: &str) -> Result<&'a Value, ExtractError> {
    let mut current = doc;
    for key in path.split('.') {
        current = current.get(key).ok_or_else(|| missing(path))?;
    }
    Ok(current)
}

fn missing(field: &str) -> ExtractError {
    ExtractError::MissingField {
        field: field.to_string(),
    }
}

fn str_field(doc: &Value, path: &str) -> Result<String, ExtractError> {
    lookup(doc, path)?
        .as_str()
        .map(|s| s.to_string())
        .ok_or_else(|| missing(path))
}

fn scalar_field(doc: &Value, path: &str) -> Result<String, ExtractError> {
    scalar_string(lookup(doc, path)?).ok_or_else(|| missing(path))
}

fn i64_field(doc: &Value, path: &str) -> Result<i64, ExtractError> {
    as_i64_any(lookup(doc, path)?).ok_or_else(|| missing(path))
}

fn f64_field(doc: &Value, path: &str) -> Result<f64, ExtractError> {
    as_f64_any(lookup(doc, path)?).ok_or_else(|| missing(path))
}

fn as_i64_any(v: &Value) -> Option<i64> {
    if let Some(n) = v.as_i64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<i64>().ok()
}

fn as_f64_any(v: &Value) -> Option<f64> {
    if let Some(n) = v.as_f64() {
        return Some(n);
    }
    v.as_str()?.trim().parse::<f64>().ok()
}

fn scalar_string(v: &Value) -> Option<String> {
    match v {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn identity() -> MatchIdentity {
        MatchIdentity {
            match_id: "123456".to_string(),
            league: "EPL1".to_string(),
            season: "2019-2020".to_string(),
        }
    }

    #[test]
    fn split_score_inverts_concatenation() {
        for (home, away) in [(0, 0), (2, 1), (10, 3)] {
            assert_eq!(split_score(&format!("{home}:{away}")).unwrap(), (home, away));
        }
        assert_eq!(split_score(" 2 : 1 ").unwrap(), (2, 1));
    }

    #[test]
    fn split_score_rejects_malformed() {
        for raw in ["", "21", "a:b", "2:1:0", "2:"] {
            assert!(matches!(
                split_score(raw),
                Err(ExtractError::ScoreFormat { .. })
            ));
        }
    }

    #[test]
    fn kickoff_parts_normalize() {
        assert_eq!(
            kickoff_part("2020-05-01T18:30:00", "%Y-%m-%d").unwrap(),
            "2020-05-01"
        );
        assert_eq!(
            kickoff_part("2020-05-01T18:30:00", "%H:%M:%S").unwrap(),
            "18:30:00"
        );
        assert!(matches!(
            kickoff_part("01/05/2020 18:30", "%H:%M:%S"),
            Err(ExtractError::TimestampFormat { .. })
        ));
    }

    #[test]
    fn referee_requires_both_keys() {
        let doc = json!({"referee": {"officialId": 71, "name": "Martin Atkinson"}});
        let row = extract_referee(&doc, &identity()).unwrap();
        assert_eq!(row.match_id, "123456");
        assert_eq!(row.referee_id, 71);
        assert_eq!(row.referee_name, "Martin Atkinson");

        let doc = json!({"referee": {"officialId": 71}});
        assert!(matches!(
            extract_referee(&doc, &identity()),
            Err(ExtractError::MissingField { .. })
        ));
    }

    #[test]
    fn roster_explodes_alternate_names() {
        let doc = json!({
            "playerIdNameDictionary": {
                "42": ["Danny Rose", "Daniel Rose"],
                "77": "Lukasz Fabianski"
            }
        });
        let rows = extract_roster(&doc).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(
            rows.iter()
                .filter(|r| r.player_id == "42")
                .map(|r| r.player_name.as_str())
                .eq(["Danny Rose", "Daniel Rose"])
        );
    }

    #[test]
    fn empty_side_yields_no_rows() {
        let doc = json!({
            "home": {"players": []},
            "away": {"players": []}
        });
        assert!(extract_player_games(&doc, &identity()).unwrap().is_empty());
    }
}
