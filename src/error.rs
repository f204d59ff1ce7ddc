use thiserror::Error;

/// Failures raised while turning one match-sheet document into tables.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("source name {name:?} has no {what} pattern match")]
    IdentityDerivation { what: &'static str, name: String },

    #[error("cannot parse document {origin}: {detail}")]
    DocumentParse { origin: String, detail: String },

    #[error("document is missing required field {field}")]
    MissingField { field: String },

    #[error("score {raw:?} is not two ':'-separated integers")]
    ScoreFormat { raw: String },

    #[error("timestamp {raw:?} does not match %Y-%m-%dT%H:%M:%S")]
    TimestampFormat { raw: String },
}
