//! Cache synchronization with the remote API
//!
//! Each category is fetched in full into local buffers; derived indexes are
//! rebuilt and the document updated only after every page or sub-request of
//! that category succeeded. The document is saved after each category, so a
//! failure later in an `all` sync keeps the categories already completed.

use std::fmt;
use std::fs;

use clap::ValueEnum;
use miette::Diagnostic;
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use super::{ReferenceCache, StoreError, Team, User, WorkflowState};
use crate::core::config::Settings;
use crate::core::queries::{self, Connection, Nodes, ProjectNode, StateNode};
use crate::core::transport::{extract, GraphqlRequest, Transport, TransportError};

/// Page size for cursor-paginated queries
pub const PAGE_SIZE: u32 = 100;

/// What to sync, as chosen on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum SyncScope {
    /// Everything, in dependency order
    All,
    /// The authenticated user's id
    #[value(alias = "me")]
    Viewer,
    Teams,
    /// Workflow states for every cached team
    States,
    Users,
    /// Avatar images for cached users
    Avatars,
    Projects,
}

/// One unit of sync work; each is fetched and saved on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Viewer,
    Teams,
    States,
    Users,
    Avatars,
    Projects,
}

impl SyncScope {
    /// Categories to run, in order
    ///
    /// Teams precede states (states are fetched per team) and users precede
    /// avatars (avatars come from user records).
    pub fn categories(self) -> &'static [Category] {
        match self {
            SyncScope::All => &[
                Category::Viewer,
                Category::Teams,
                Category::States,
                Category::Users,
                Category::Avatars,
                Category::Projects,
            ],
            SyncScope::Viewer => &[Category::Viewer],
            SyncScope::Teams => &[Category::Teams],
            SyncScope::States => &[Category::States],
            SyncScope::Users => &[Category::Users],
            SyncScope::Avatars => &[Category::Avatars],
            SyncScope::Projects => &[Category::Projects],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Viewer => write!(f, "viewer"),
            Category::Teams => write!(f, "teams"),
            Category::States => write!(f, "states"),
            Category::Users => write!(f, "users"),
            Category::Avatars => write!(f, "avatars"),
            Category::Projects => write!(f, "projects"),
        }
    }
}

/// Errors that abort a sync
#[derive(Debug, Error, Diagnostic)]
pub enum SyncError {
    #[error("Failed to sync {category}")]
    #[diagnostic(code(lincli::sync::request))]
    Request {
        category: Category,
        #[source]
        #[diagnostic_source]
        source: TransportError,
    },

    #[error("No teams cached")]
    #[diagnostic(
        code(lincli::sync::teams_not_synced),
        help("run `linear sync teams` before syncing states")
    )]
    TeamsNotSynced,

    #[error(transparent)]
    #[diagnostic(transparent)]
    Store(#[from] StoreError),
}

/// A single avatar that could not be saved; logged and skipped
#[derive(Debug, Error)]
pub enum AvatarFetchError {
    #[error("download failed: {0}")]
    Fetch(#[from] TransportError),

    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),
}

/// Summary of one sync invocation
#[derive(Debug, Default, Clone)]
pub struct SyncReport {
    pub categories: Vec<Category>,
    pub teams: usize,
    pub states: usize,
    pub users: usize,
    pub projects: usize,
    pub avatars_saved: usize,
    pub avatars_failed: usize,
    /// Set when a teams sync picked a default team
    pub default_team: Option<Team>,
    /// Number of API requests issued (avatar downloads excluded)
    pub requests: usize,
    pub duration_ms: u64,
}

/// Runs sync categories against a transport and writes them into the cache
pub struct Synchronizer<'a, T: Transport> {
    transport: &'a T,
    settings: &'a Settings,
}

impl<'a, T: Transport> Synchronizer<'a, T> {
    pub fn new(transport: &'a T, settings: &'a Settings) -> Self {
        Self {
            transport,
            settings,
        }
    }

    /// Sync every category in `scope`, saving after each one
    pub fn run(&self, cache: &mut ReferenceCache, scope: SyncScope) -> Result<SyncReport, SyncError> {
        let start = std::time::Instant::now();
        let mut report = SyncReport::default();

        for &category in scope.categories() {
            tracing::info!("syncing {}", category);
            self.sync_category(cache, category, &mut report)?;
            cache.save()?;
            report.categories.push(category);
        }

        report.duration_ms = start.elapsed().as_millis() as u64;
        Ok(report)
    }

    fn sync_category(
        &self,
        cache: &mut ReferenceCache,
        category: Category,
        report: &mut SyncReport,
    ) -> Result<(), SyncError> {
        let wrap = |source| SyncError::Request { category, source };

        match category {
            Category::Viewer => {
                let id: String = self.query(report, GraphqlRequest::new(queries::VIEWER), &["viewer", "id"]).map_err(wrap)?;
                cache.document_mut().set_viewer(id);
            }
            Category::Teams => {
                let teams: Nodes<Team> = self.query(report, GraphqlRequest::new(queries::TEAMS), &["teams"]).map_err(wrap)?;
                report.teams = teams.nodes.len();
                if let Some(team) = cache.document_mut().replace_teams(teams.nodes) {
                    tracing::info!("default team set to {} ({})", team.name, team.id);
                    report.default_team = Some(team);
                }
            }
            Category::States => {
                let teams = cache
                    .document()
                    .teams
                    .clone()
                    .ok_or(SyncError::TeamsNotSynced)?;
                let states = self.fetch_states(&teams, report).map_err(wrap)?;
                report.states = states.len();
                cache.document_mut().replace_states(&teams, states);
            }
            Category::Users => {
                let users: Vec<User> = self.fetch_all_pages(queries::USERS, "users", report).map_err(wrap)?;
                report.users = users.len();
                cache.document_mut().replace_users(users);
            }
            Category::Avatars => {
                self.fetch_avatars(&cache.document().users, report);
            }
            Category::Projects => {
                let nodes: Vec<ProjectNode> = self.fetch_all_pages(queries::PROJECTS, "projects", report).map_err(wrap)?;
                report.projects = nodes.len();
                cache
                    .document_mut()
                    .replace_projects(nodes.into_iter().map(Into::into).collect());
            }
        }

        Ok(())
    }

    fn query<N: DeserializeOwned>(
        &self,
        report: &mut SyncReport,
        request: GraphqlRequest,
        path: &[&str],
    ) -> Result<N, TransportError> {
        report.requests += 1;
        let body = self.transport.send(&request)?;
        extract(&body, path)
    }

    /// One request per team; states are assumed to fit a single page
    fn fetch_states(&self, teams: &[Team], report: &mut SyncReport) -> Result<Vec<WorkflowState>, TransportError> {
        let mut states = Vec::new();
        for team in teams {
            let request = GraphqlRequest::new(queries::STATES).with_variables(json!({ "teamId": team.id }));
            let page: Nodes<StateNode> = self.query(report, request, &["workflowStates"])?;
            tracing::debug!(team = %team.id, count = page.nodes.len(), "fetched states");
            states.extend(page.nodes.into_iter().map(WorkflowState::from));
        }
        Ok(states)
    }

    /// Follow `pageInfo.endCursor` until `hasNextPage` is false
    ///
    /// Nodes are concatenated in response order.
    fn fetch_all_pages<N: DeserializeOwned>(
        &self,
        query: &str,
        field: &str,
        report: &mut SyncReport,
    ) -> Result<Vec<N>, TransportError> {
        let mut nodes = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let request = GraphqlRequest::new(query).with_variables(json!({
                "first": PAGE_SIZE,
                "after": after,
            }));
            let page: Connection<N> = self.query(report, request, &[field])?;
            nodes.extend(page.nodes);

            if !page.page_info.has_next_page {
                break;
            }
            match page.page_info.end_cursor {
                Some(cursor) => after = Some(cursor),
                None => {
                    return Err(TransportError::MissingField(format!(
                        "data.{}.pageInfo.endCursor",
                        field
                    )))
                }
            }
        }

        Ok(nodes)
    }

    /// Download avatars one by one; a failure skips that user only
    fn fetch_avatars(&self, users: &[User], report: &mut SyncReport) {
        for user in users {
            let Some(url) = user.avatar_url.as_deref() else {
                continue;
            };

            match self.save_avatar(&user.id, url) {
                Ok(()) => report.avatars_saved += 1,
                Err(e) => {
                    tracing::warn!("skipping avatar for {} ({}): {}", user.name, user.id, e);
                    report.avatars_failed += 1;
                }
            }
        }
    }

    fn save_avatar(&self, user_id: &str, url: &str) -> Result<(), AvatarFetchError> {
        let bytes = self.transport.download(url)?;
        fs::create_dir_all(self.settings.icons_dir())?;
        fs::write(self.settings.icon_path(user_id), bytes)?;
        Ok(())
    }
}
