//! Cache type definitions
//!
//! Reference entities, the on-disk document that holds them, and the derived
//! indexes rebuilt from them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =========================================================================
// Reference entities
// =========================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
}

/// Workflow state; names are unique within a team, not globally
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StateRecord")]
pub struct WorkflowState {
    pub id: String,
    pub name: String,
    pub team_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    #[serde(rename = "avatarUrl", default)]
    pub avatar_url: Option<String>,
}

/// Project; may belong to several teams
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ProjectRecord")]
pub struct Project {
    pub id: String,
    pub name: String,
    #[serde(rename = "slugId")]
    pub slug_id: String,
    #[serde(default)]
    pub team_ids: Vec<String>,
}

// Documents written by older releases keep the API's nesting
// (`team: { id }` on states, `teams: { nodes: [...] }` on projects). Both
// shapes are read; only the flat one is written.

#[derive(Deserialize)]
struct TeamRef {
    id: String,
}

#[derive(Deserialize)]
struct TeamRefs {
    #[serde(default)]
    nodes: Vec<TeamRef>,
}

#[derive(Deserialize)]
struct StateRecord {
    id: String,
    name: String,
    #[serde(default)]
    team_id: Option<String>,
    #[serde(default)]
    team: Option<TeamRef>,
}

impl TryFrom<StateRecord> for WorkflowState {
    type Error = String;

    fn try_from(record: StateRecord) -> Result<Self, Self::Error> {
        let team_id = record
            .team_id
            .or(record.team.map(|t| t.id))
            .ok_or_else(|| format!("state {} has no team", record.id))?;
        Ok(WorkflowState {
            id: record.id,
            name: record.name,
            team_id,
        })
    }
}

#[derive(Deserialize)]
struct ProjectRecord {
    id: String,
    name: String,
    #[serde(rename = "slugId")]
    slug_id: String,
    #[serde(default)]
    team_ids: Option<Vec<String>>,
    #[serde(default)]
    teams: Option<TeamRefs>,
}

impl From<ProjectRecord> for Project {
    fn from(record: ProjectRecord) -> Self {
        let team_ids = match (record.team_ids, record.teams) {
            (Some(ids), _) => ids,
            (None, Some(teams)) => teams.nodes.into_iter().map(|t| t.id).collect(),
            (None, None) => Vec::new(),
        };
        Project {
            id: record.id,
            name: record.name,
            slug_id: record.slug_id,
            team_ids,
        }
    }
}

/// Team id -> state name -> state id
pub type StatesByTeam = BTreeMap<String, BTreeMap<String, String>>;

/// Team id -> project ids, in project sync order
pub type TeamsToProjects = BTreeMap<String, Vec<String>>;

// =========================================================================
// Cached document
// =========================================================================

/// Everything persisted in `data.json`
///
/// Each sync category overwrites only its own fields. Keys that are not part of
/// this shape (written by `linear config`) are kept in `extra` and written back
/// untouched; nothing else reads them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub apikey: Option<String>,

    /// Viewer (authenticated user) id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub me: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_team: Option<String>,

    /// `None` until teams have been synced at least once
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub teams: Option<Vec<Team>>,

    #[serde(default)]
    pub users: Vec<User>,

    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub states: Vec<WorkflowState>,

    #[serde(default)]
    pub teams_to_projects: TeamsToProjects,

    #[serde(default)]
    pub projects_by_id: BTreeMap<String, Project>,

    #[serde(default)]
    pub states_by_team: StatesByTeam,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl CacheDocument {
    /// Cached teams, empty if never synced
    pub fn teams(&self) -> &[Team] {
        self.teams.as_deref().unwrap_or(&[])
    }

    pub fn set_viewer(&mut self, id: String) {
        self.me = Some(id);
    }

    /// Replace the team collection
    ///
    /// When no default team is set, the first team in response order becomes
    /// the default and is returned.
    pub fn replace_teams(&mut self, teams: Vec<Team>) -> Option<Team> {
        let promoted = match (&self.default_team, teams.first()) {
            (None, Some(first)) => {
                self.default_team = Some(first.id.clone());
                Some(first.clone())
            }
            _ => None,
        };
        self.teams = Some(teams);
        promoted
    }

    /// Replace all states and rebuild `states_by_team` from scratch
    pub fn replace_states(&mut self, teams: &[Team], states: Vec<WorkflowState>) {
        self.states_by_team = index_states(teams, &states);
        self.states = states;
    }

    pub fn replace_users(&mut self, users: Vec<User>) {
        self.users = users;
    }

    /// Replace all projects and rebuild both project indexes from scratch
    pub fn replace_projects(&mut self, projects: Vec<Project>) {
        let (teams_to_projects, projects_by_id) = index_projects(&projects);
        self.teams_to_projects = teams_to_projects;
        self.projects_by_id = projects_by_id;
        self.projects = projects;
    }

    /// Projects attached to a team, in sync order
    pub fn projects_for_team(&self, team_id: &str) -> Vec<&Project> {
        self.teams_to_projects
            .get(team_id)
            .map(|ids| ids.iter().filter_map(|id| self.projects_by_id.get(id)).collect())
            .unwrap_or_default()
    }
}

/// Build the team -> name -> state id index
///
/// Every team passed in gets an entry, even when it has no states.
pub fn index_states(teams: &[Team], states: &[WorkflowState]) -> StatesByTeam {
    let mut index: StatesByTeam = teams
        .iter()
        .map(|team| (team.id.clone(), BTreeMap::new()))
        .collect();

    for state in states {
        index
            .entry(state.team_id.clone())
            .or_default()
            .insert(state.name.clone(), state.id.clone());
    }

    index
}

/// Build the team -> project ids and project id -> project indexes
pub fn index_projects(projects: &[Project]) -> (TeamsToProjects, BTreeMap<String, Project>) {
    let mut teams_to_projects = TeamsToProjects::new();
    let mut projects_by_id = BTreeMap::new();

    for project in projects {
        projects_by_id.insert(project.id.clone(), project.clone());
        for team_id in &project.team_ids {
            teams_to_projects
                .entry(team_id.clone())
                .or_default()
                .push(project.id.clone());
        }
    }

    (teams_to_projects, projects_by_id)
}
