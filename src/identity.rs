use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::ExtractError;

static MATCH_ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{6}").unwrap());
static LEAGUE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[A-Z]{3}\d").unwrap());
// TODO: single-year seasons ("2021") never match and fail derivation.
static SEASON_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{4}-\d{4}").unwrap());

/// The identity triple every extracted row is keyed on. Derived once per
/// document from the source path; the first match of each pattern wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchIdentity {
    pub match_id: String,
    pub league: String,
    pub season: String,
}

pub fn derive_identity(source_name: &str) -> Result<MatchIdentity, ExtractError> {
    Ok(MatchIdentity {
        match_id: first_match(&MATCH_ID_RE, "match id", source_name)?,
        league: first_match(&LEAGUE_RE, "league code", source_name)?,
        season: first_match(&SEASON_RE, "season", source_name)?,
    })
}

fn first_match(re: &Regex, what: &'static str, name: &str) -> Result<String, ExtractError> {
    re.find(name)
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ExtractError::IdentityDerivation {
            what,
            name: name.to_string(),
        })
}
