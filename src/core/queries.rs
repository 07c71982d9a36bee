//! GraphQL documents and the response shapes they decode into
//!
//! Every document takes its inputs as variables.

use serde::Deserialize;

use crate::core::cache::{Project, WorkflowState};

pub const VIEWER: &str = r#"
query Viewer {
    viewer {
        id
    }
}
"#;

pub const TEAMS: &str = r#"
query Teams {
    teams {
        nodes {
            id
            name
        }
    }
}
"#;

pub const STATES: &str = r#"
query States($teamId: ID!) {
    workflowStates(filter: { team: { id: { eq: $teamId } } }) {
        nodes {
            id
            name
            team {
                id
            }
        }
    }
}
"#;

pub const USERS: &str = r#"
query Users($first: Int!, $after: String) {
    users(first: $first, after: $after) {
        nodes {
            id
            name
            avatarUrl
        }
        pageInfo {
            hasNextPage
            endCursor
        }
    }
}
"#;

pub const PROJECTS: &str = r#"
query Projects($first: Int!, $after: String) {
    projects(first: $first, after: $after) {
        nodes {
            id
            name
            slugId
            teams {
                nodes {
                    id
                }
            }
        }
        pageInfo {
            hasNextPage
            endCursor
        }
    }
}
"#;

pub const ISSUE_CREATE: &str = r#"
mutation IssueCreate($input: IssueCreateInput!) {
    issueCreate(input: $input) {
        success
        issue {
            id
            title
            identifier
            url
        }
    }
}
"#;

pub const ISSUE_LABELS: &str = r#"
query IssueLabels($names: [String!]!) {
    issueLabels(filter: { name: { in: $names } }) {
        nodes {
            id
            name
        }
    }
}
"#;

pub const ISSUE_SEARCH: &str = r#"
query IssueSearch($term: String!) {
    issueSearch(first: 100, query: $term) {
        nodes {
            id
            title
            description
            identifier
            project {
                id
                name
            }
        }
    }
}
"#;

pub const ISSUE: &str = r#"
query Issue($id: String!) {
    issue(id: $id) {
        identifier
        title
        description
        url
    }
}
"#;

/// Build the batched label mutation for `count` labels
///
/// Fields are aliased `label0..labelN`; only indexes are interpolated, the
/// ids travel as `$issueId` and `$label<N>` variables.
pub fn add_labels_mutation(count: usize) -> String {
    let params: Vec<String> = (0..count).map(|i| format!("$label{}: String!", i)).collect();
    let fields: Vec<String> = (0..count)
        .map(|i| {
            format!(
                "    label{i}: issueAddLabel(id: $issueId, labelId: $label{i}) {{ success }}",
                i = i
            )
        })
        .collect();

    format!(
        "mutation IssueAddLabels($issueId: String!, {}) {{\n{}\n}}",
        params.join(", "),
        fields.join("\n")
    )
}

// =========================================================================
// Response shapes
// =========================================================================

/// `{ nodes: [...] }`
#[derive(Debug, Deserialize)]
pub struct Nodes<T> {
    pub nodes: Vec<T>,
}

/// A cursor-paginated connection
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub nodes: Vec<T>,
    pub page_info: PageInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    #[serde(default)]
    pub end_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct IdRef {
    pub id: String,
}

#[derive(Debug, Deserialize)]
pub struct StateNode {
    pub id: String,
    pub name: String,
    pub team: IdRef,
}

impl From<StateNode> for WorkflowState {
    fn from(node: StateNode) -> Self {
        WorkflowState {
            id: node.id,
            name: node.name,
            team_id: node.team.id,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectNode {
    pub id: String,
    pub name: String,
    pub slug_id: String,
    pub teams: Nodes<IdRef>,
}

impl From<ProjectNode> for Project {
    fn from(node: ProjectNode) -> Self {
        Project {
            id: node.id,
            name: node.name,
            slug_id: node.slug_id,
            team_ids: node.teams.nodes.into_iter().map(|t| t.id).collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LabelNode {
    pub id: String,
    pub name: String,
}

/// Result of one aliased `issueAddLabel`
#[derive(Debug, Deserialize)]
pub struct MutationResult {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreatedIssue {
    pub id: String,
    pub identifier: String,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct IssueCreatePayload {
    #[serde(default)]
    pub success: bool,
    pub issue: Option<CreatedIssue>,
}

#[derive(Debug, Deserialize)]
pub struct ProjectRef {
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchNode {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub identifier: String,
    #[serde(default)]
    pub project: Option<ProjectRef>,
}

#[derive(Debug, Deserialize)]
pub struct IssueNode {
    pub identifier: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub url: String,
}
