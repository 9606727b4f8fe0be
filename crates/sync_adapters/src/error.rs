//! Adapter-local failures: malformed provider payloads or a jersey-number
//! mapping that couldn't be resolved. These never reach `sync_core` — a
//! provider adapter either produces a full `Vec<Event>` or fails outright.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error("raw {provider} event is missing required field `{field}`")]
    MissingField { provider: &'static str, field: &'static str },

    #[error("raw {provider} event has malformed field `{field}`: {detail}")]
    MalformedField { provider: &'static str, field: &'static str, detail: String },

    #[error("could not map {provider} team/jersey identities onto the match catalogue: {detail}")]
    PlayerMappingFailed { provider: &'static str, detail: String },

    #[error("{provider} home team id {raw_id} matches no team in the provider lineup")]
    UnknownHomeTeam { provider: &'static str, raw_id: i64 },
}

pub type Result<T> = std::result::Result<T, AdapterError>;
