//! Issue creation, search and lookup

use miette::Diagnostic;
use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::core::cache::CacheDocument;
use crate::core::queries::{self, IssueCreatePayload, IssueNode, LabelNode, MutationResult, Nodes, SearchNode};
use crate::core::resolve::{self, ResolveError};
use crate::core::transport::{extract, GraphqlRequest, Transport, TransportError};

#[derive(Debug, Error, Diagnostic)]
pub enum IssueError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Resolve(#[from] ResolveError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Transport(#[from] TransportError),

    #[error("Issue was not created")]
    #[diagnostic(code(lincli::issue::not_created))]
    NotCreated,

    #[error("Label {0} was not attached")]
    #[diagnostic(code(lincli::issue::label_not_attached))]
    LabelNotAttached(String),

    #[error("Issue '{0}' not found")]
    #[diagnostic(code(lincli::issue::not_found))]
    NotFound(String),
}

/// Everything the user supplied for a new issue
#[derive(Debug, Clone, Default)]
pub struct IssueDraft {
    pub title: String,
    pub description: String,
    pub project_id: Option<String>,
    pub team_id: Option<String>,
    pub assignee: Option<String>,
    pub state_id: Option<String>,
    pub labels: Vec<String>,
}

/// A created issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueRef {
    pub id: String,
    pub identifier: String,
    pub url: String,
}

/// `IssueCreateInput`, with optional fields left out entirely when absent
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct IssueCreateInput<'a> {
    title: &'a str,
    description: &'a str,
    team_id: &'a str,
    state_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    assignee_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    project_id: Option<&'a str>,
}

/// Create an issue, then attach labels by name
///
/// Label attachment runs after the issue exists; if it fails the error is
/// logged and the created issue is still returned.
pub fn create_issue<T: Transport>(
    transport: &T,
    doc: &CacheDocument,
    draft: &IssueDraft,
) -> Result<IssueRef, IssueError> {
    let team_id = resolve::resolve_team(doc, draft.team_id.as_deref())?;
    let state_id = resolve::resolve_state(doc, &team_id, draft.state_id.as_deref())?;
    let assignee_id = resolve::resolve_assignee(doc, draft.assignee.as_deref())?;

    let input = IssueCreateInput {
        title: &draft.title,
        description: &draft.description,
        team_id: &team_id,
        state_id: &state_id,
        assignee_id: assignee_id.as_deref(),
        project_id: draft.project_id.as_deref(),
    };

    let request = GraphqlRequest::new(queries::ISSUE_CREATE).with_variables(json!({ "input": input }));
    let body = transport.send(&request)?;
    let payload: IssueCreatePayload = extract(&body, &["issueCreate"])?;

    let created = match payload.issue {
        Some(issue) if payload.success => issue,
        _ => return Err(IssueError::NotCreated),
    };
    let issue = IssueRef {
        id: created.id,
        identifier: created.identifier,
        url: created.url,
    };
    tracing::debug!(issue = %issue.identifier, "issue created");

    if !draft.labels.is_empty() {
        match attach_labels(transport, &issue.id, &draft.labels) {
            Ok(count) => tracing::debug!(issue = %issue.identifier, count, "labels attached"),
            Err(e) => tracing::warn!("couldn't add labels to {}: {}", issue.identifier, e),
        }
    }

    Ok(issue)
}

/// Look up label ids by exact name and attach them in one batched mutation
///
/// Names with no exact (case-sensitive) match are dropped. Returns how many
/// labels were attached; any alias reporting `success: false` (or missing from
/// the response) is an error.
fn attach_labels<T: Transport>(
    transport: &T,
    issue_id: &str,
    names: &[String],
) -> Result<usize, IssueError> {
    let request = GraphqlRequest::new(queries::ISSUE_LABELS).with_variables(json!({ "names": names }));
    let body = transport.send(&request)?;
    let labels: Nodes<LabelNode> = extract(&body, &["issueLabels"])?;

    let ids: Vec<String> = labels
        .nodes
        .into_iter()
        .filter(|label| names.iter().any(|name| name == &label.name))
        .map(|label| label.id)
        .collect();

    if ids.is_empty() {
        tracing::info!("no matching labels for {}", names.join(", "));
        return Ok(0);
    }

    let mut variables = Map::new();
    variables.insert("issueId".to_string(), Value::String(issue_id.to_string()));
    for (i, id) in ids.iter().enumerate() {
        variables.insert(format!("label{}", i), Value::String(id.clone()));
    }

    let request = GraphqlRequest::new(queries::add_labels_mutation(ids.len()))
        .with_variables(Value::Object(variables));
    let body = transport.send(&request)?;

    for (i, id) in ids.iter().enumerate() {
        let alias = format!("label{}", i);
        let result: MutationResult = extract(&body, &[alias.as_str()])?;
        if !result.success {
            return Err(IssueError::LabelNotAttached(id.clone()));
        }
    }
    Ok(ids.len())
}

/// Split a comma-separated label list, dropping empty entries
pub fn parse_labels(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// One search hit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueSummary {
    pub id: String,
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub project_name: Option<String>,
}

impl IssueSummary {
    /// Project name (or "No Project") followed by the description
    pub fn subtitle(&self) -> String {
        format!(
            "{} {}",
            self.project_name.as_deref().unwrap_or("No Project"),
            self.description.as_deref().unwrap_or("")
        )
    }
}

/// Full-text issue search (first 100 hits)
pub fn search_issues<T: Transport>(transport: &T, term: &str) -> Result<Vec<IssueSummary>, IssueError> {
    let request = GraphqlRequest::new(queries::ISSUE_SEARCH).with_variables(json!({ "term": term }));
    let body = transport.send(&request)?;
    let hits: Nodes<SearchNode> = extract(&body, &["issueSearch"])?;

    Ok(hits
        .nodes
        .into_iter()
        .map(|node| IssueSummary {
            id: node.id,
            identifier: node.identifier,
            title: node.title,
            description: node.description.filter(|d| !d.is_empty()),
            project_name: node
                .project
                .and_then(|p| p.name)
                .filter(|n| !n.is_empty()),
        })
        .collect())
}

/// Details for `linear info`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssueDetail {
    pub identifier: String,
    pub title: String,
    pub description: Option<String>,
    pub url: String,
}

/// Fetch one issue by id or identifier (e.g. `ENG-123`)
pub fn issue_info<T: Transport>(transport: &T, id: &str) -> Result<IssueDetail, IssueError> {
    let request = GraphqlRequest::new(queries::ISSUE).with_variables(json!({ "id": id }));
    let body = transport.send(&request)?;
    let node: IssueNode = match extract(&body, &["issue"]) {
        Ok(node) => node,
        Err(TransportError::MissingField(_)) => return Err(IssueError::NotFound(id.to_string())),
        Err(e) => return Err(e.into()),
    };

    Ok(IssueDetail {
        identifier: node.identifier,
        title: node.title,
        description: node.description,
        url: node.url,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::{Team, WorkflowState};
    use crate::core::transport::testing::ScriptedTransport;

    fn cached() -> CacheDocument {
        let mut doc = CacheDocument {
            apikey: Some("lin_api_test".to_string()),
            me: Some("U1".to_string()),
            ..Default::default()
        };
        let teams = vec![Team { id: "T1".into(), name: "Eng".into() }];
        doc.replace_teams(teams.clone());
        doc.replace_states(
            &teams,
            vec![WorkflowState { id: "S1".into(), name: "Todo".into(), team_id: "T1".into() }],
        );
        doc
    }

    fn created(url: &str) -> Value {
        json!({
            "issueCreate": {
                "success": true,
                "issue": { "id": "I1", "title": "Fix bug", "identifier": "ENG-1", "url": url }
            }
        })
    }

    fn draft(title: &str) -> IssueDraft {
        IssueDraft {
            title: title.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_with_defaults() {
        let transport = ScriptedTransport::new().respond(created("https://linear.app/acme/issue/ENG-1/fix-bug"));

        let issue = create_issue(&transport, &cached(), &draft("Fix bug")).unwrap();
        assert_eq!(issue.url, "https://linear.app/acme/issue/ENG-1/fix-bug");
        assert_eq!(issue.identifier, "ENG-1");

        assert_eq!(transport.request_count(), 1);
        let input = &transport.request(0).variables["input"];
        assert_eq!(input["title"], "Fix bug");
        assert_eq!(input["teamId"], "T1");
        assert_eq!(input["stateId"], "S1");
        assert!(input.get("projectId").is_none());
        assert!(input.get("assigneeId").is_none());
    }

    #[test]
    fn test_create_keeps_quotes_out_of_query_text() {
        let transport = ScriptedTransport::new().respond(created("u"));
        let mut d = draft(r#"Handle "quoted" input"#);
        d.description = "line one\n\"two\"".to_string();

        create_issue(&transport, &cached(), &d).unwrap();
        let request = transport.request(0);
        assert!(!request.query.contains("quoted"));
        assert_eq!(request.variables["input"]["title"], r#"Handle "quoted" input"#);
    }

    #[test]
    fn test_create_with_explicit_fields() {
        let transport = ScriptedTransport::new().respond(created("u"));
        let d = IssueDraft {
            title: "Ship".into(),
            project_id: Some("P1".into()),
            team_id: Some("T2".into()),
            assignee: Some("me".into()),
            state_id: Some("S7".into()),
            ..Default::default()
        };

        create_issue(&transport, &cached(), &d).unwrap();
        let input = &transport.request(0).variables["input"];
        assert_eq!(input["teamId"], "T2");
        assert_eq!(input["stateId"], "S7");
        assert_eq!(input["assigneeId"], "U1");
        assert_eq!(input["projectId"], "P1");
    }

    #[test]
    fn test_create_without_default_team_sends_nothing() {
        let transport = ScriptedTransport::new();
        let err = create_issue(&transport, &CacheDocument::default(), &draft("x")).unwrap_err();
        assert!(matches!(err, IssueError::Resolve(ResolveError::NoDefaultTeam)));
        assert_eq!(transport.request_count(), 0);
    }

    #[test]
    fn test_create_failure_propagates() {
        let transport = ScriptedTransport::new().fail(400);
        let err = create_issue(&transport, &cached(), &draft("x")).unwrap_err();
        assert!(matches!(err, IssueError::Transport(TransportError::Status { status: 400, .. })));
    }

    #[test]
    fn test_labels_attached_by_exact_name() {
        let transport = ScriptedTransport::new()
            .respond(created("u"))
            .respond(json!({
                "issueLabels": { "nodes": [
                    { "id": "L1", "name": "bug" },
                    { "id": "L2", "name": "Bug" },
                    { "id": "L3", "name": "infra" }
                ] }
            }))
            .respond(json!({ "label0": { "success": true }, "label1": { "success": true } }));

        let mut d = draft("x");
        d.labels = parse_labels("bug, infra,missing");
        create_issue(&transport, &cached(), &d).unwrap();

        assert_eq!(transport.request_count(), 3);
        assert_eq!(
            transport.request(1).variables["names"],
            json!(["bug", "infra", "missing"])
        );
        let attach = transport.request(2);
        assert_eq!(attach.variables["issueId"], "I1");
        assert_eq!(attach.variables["label0"], "L1");
        assert_eq!(attach.variables["label1"], "L3");
        assert!(attach.variables.get("label2").is_none());
    }

    #[test]
    fn test_label_failure_still_returns_issue() {
        let transport = ScriptedTransport::new()
            .respond(created("https://linear.app/acme/issue/ENG-1"))
            .respond(json!({ "issueLabels": { "nodes": [{ "id": "L1", "name": "bug" }] } }))
            .fail(500);

        let mut d = draft("x");
        d.labels = vec!["bug".to_string()];
        let issue = create_issue(&transport, &cached(), &d).unwrap();
        assert_eq!(issue.url, "https://linear.app/acme/issue/ENG-1");
    }

    #[test]
    fn test_rejected_label_is_reported() {
        let transport = ScriptedTransport::new()
            .respond(json!({ "issueLabels": { "nodes": [{ "id": "L1", "name": "bug" }] } }))
            .respond(json!({ "label0": { "success": false } }));

        let err = attach_labels(&transport, "I1", &["bug".to_string()]).unwrap_err();
        assert!(matches!(err, IssueError::LabelNotAttached(ref id) if id == "L1"));
    }

    #[test]
    fn test_label_errors_with_null_data_are_reported() {
        let transport = ScriptedTransport::new()
            .respond(json!({ "issueLabels": { "nodes": [{ "id": "L1", "name": "bug" }] } }))
            .reply(json!({ "data": null, "errors": [{ "message": "Entity not found" }] }));

        let err = attach_labels(&transport, "I1", &["bug".to_string()]).unwrap_err();
        assert!(matches!(err, IssueError::Transport(TransportError::Graphql(ref m)) if m == "Entity not found"));
    }

    #[test]
    fn test_partially_attached_labels_are_reported() {
        let transport = ScriptedTransport::new()
            .respond(json!({ "issueLabels": { "nodes": [
                { "id": "L1", "name": "bug" },
                { "id": "L2", "name": "infra" }
            ] } }))
            .respond(json!({ "label0": { "success": true } }));

        let names = vec!["bug".to_string(), "infra".to_string()];
        let err = attach_labels(&transport, "I1", &names).unwrap_err();
        assert!(matches!(err, IssueError::Transport(TransportError::MissingField(ref p)) if p == "data.label1"));
    }

    #[test]
    fn test_rejected_label_still_returns_issue() {
        let transport = ScriptedTransport::new()
            .respond(created("https://linear.app/acme/issue/ENG-1"))
            .respond(json!({ "issueLabels": { "nodes": [{ "id": "L1", "name": "bug" }] } }))
            .respond(json!({ "label0": { "success": false } }));

        let mut d = draft("x");
        d.labels = vec!["bug".to_string()];
        let issue = create_issue(&transport, &cached(), &d).unwrap();
        assert_eq!(issue.identifier, "ENG-1");
        assert_eq!(transport.request_count(), 3);
    }

    #[test]
    fn test_label_lookup_failure_still_returns_issue() {
        let transport = ScriptedTransport::new().respond(created("u")).fail(503);

        let mut d = draft("x");
        d.labels = vec!["bug".to_string()];
        assert!(create_issue(&transport, &cached(), &d).is_ok());
        assert_eq!(transport.request_count(), 2);
    }

    #[test]
    fn test_no_matching_labels_skips_mutation() {
        let transport = ScriptedTransport::new()
            .respond(created("u"))
            .respond(json!({ "issueLabels": { "nodes": [] } }));

        let mut d = draft("x");
        d.labels = vec!["nope".to_string()];
        create_issue(&transport, &cached(), &d).unwrap();
        assert_eq!(transport.request_count(), 2);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(parse_labels("a,b , ,c"), vec!["a", "b", "c"]);
        assert!(parse_labels("").is_empty());
    }

    #[test]
    fn test_search_issues() {
        let transport = ScriptedTransport::new().respond(json!({
            "issueSearch": { "nodes": [
                { "id": "I1", "title": "Crash", "description": "on start", "identifier": "ENG-1",
                  "project": { "id": "P1", "name": "Mobile" } },
                { "id": "I2", "title": "Typo", "description": null, "identifier": "ENG-2", "project": null }
            ] }
        }));

        let hits = search_issues(&transport, "crash \"now\"").unwrap();
        assert_eq!(transport.request(0).variables["term"], "crash \"now\"");
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].subtitle(), "Mobile on start");
        assert_eq!(hits[1].subtitle(), "No Project ");
    }

    #[test]
    fn test_issue_info() {
        let transport = ScriptedTransport::new().respond(json!({
            "issue": { "identifier": "ENG-7", "title": "Slow", "description": "p99", "url": "https://x/ENG-7" }
        }));
        let detail = issue_info(&transport, "ENG-7").unwrap();
        assert_eq!(detail.identifier, "ENG-7");
        assert_eq!(detail.url, "https://x/ENG-7");

        let transport = ScriptedTransport::new().respond(json!({ "issue": null }));
        assert!(matches!(issue_info(&transport, "ENG-8"), Err(IssueError::NotFound(_))));
    }
}
