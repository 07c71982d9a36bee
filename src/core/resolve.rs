//! Resolve user input to API ids using the cached reference data
//!
//! Pure lookups over a loaded [`CacheDocument`]; no I/O.

use miette::Diagnostic;
use thiserror::Error;

use crate::core::cache::CacheDocument;

/// State used when none is given
pub const DEFAULT_STATE: &str = "Todo";

/// Assignee alias for the authenticated user
pub const VIEWER_ALIAS: &str = "me";

#[derive(Debug, Error, Diagnostic)]
pub enum ResolveError {
    #[error("No API key configured")]
    #[diagnostic(
        code(lincli::resolve::missing_credential),
        help("run `linear init <apikey>` first")
    )]
    MissingCredential,

    #[error("No team given and no default team set")]
    #[diagnostic(
        code(lincli::resolve::no_default_team),
        help("pass --team-id, run `linear sync teams`, or set one with `linear config default_team <team_id>`")
    )]
    NoDefaultTeam,

    #[error("Team {team_id} has no state named '{state}'")]
    #[diagnostic(
        code(lincli::resolve::missing_state),
        help("pass --state, or refresh states with `linear sync states`")
    )]
    MissingState { team_id: String, state: String },

    #[error("Viewer id is not cached")]
    #[diagnostic(
        code(lincli::resolve::viewer_not_synced),
        help("run `linear sync me`")
    )]
    ViewerNotSynced,
}

/// The stored API key, or `MissingCredential`
pub fn api_key(doc: &CacheDocument) -> Result<&str, ResolveError> {
    doc.apikey
        .as_deref()
        .filter(|key| !key.trim().is_empty())
        .ok_or(ResolveError::MissingCredential)
}

/// Explicit team id, else the cached default team
pub fn resolve_team(doc: &CacheDocument, explicit: Option<&str>) -> Result<String, ResolveError> {
    explicit
        .or(doc.default_team.as_deref())
        .map(str::to_string)
        .ok_or(ResolveError::NoDefaultTeam)
}

/// Explicit state id, else the team's state named exactly "Todo"
pub fn resolve_state(
    doc: &CacheDocument,
    team_id: &str,
    explicit: Option<&str>,
) -> Result<String, ResolveError> {
    if let Some(id) = explicit {
        return Ok(id.to_string());
    }

    doc.states_by_team
        .get(team_id)
        .and_then(|states| states.get(DEFAULT_STATE))
        .cloned()
        .ok_or_else(|| ResolveError::MissingState {
            team_id: team_id.to_string(),
            state: DEFAULT_STATE.to_string(),
        })
}

/// Map the assignee argument to a user id
///
/// Only the `me` alias is resolved. Anything else is passed through verbatim
/// and treated as a user id; names are not looked up.
pub fn resolve_assignee(
    doc: &CacheDocument,
    alias: Option<&str>,
) -> Result<Option<String>, ResolveError> {
    match alias {
        None => Ok(None),
        Some(VIEWER_ALIAS) => doc
            .me
            .clone()
            .map(Some)
            .ok_or(ResolveError::ViewerNotSynced),
        Some(other) => Ok(Some(other.to_string())),
    }
}
