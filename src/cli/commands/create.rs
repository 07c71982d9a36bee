//! `linear create` command - Create an issue

use miette::Result;

use crate::cli::helpers;
use crate::core::issue::{self, IssueDraft};
use crate::core::Settings;

#[derive(clap::Args, Debug)]
pub struct CreateArgs {
    /// Issue title
    #[arg(long, short = 't')]
    pub title: String,

    /// Issue description (markdown)
    #[arg(long, short = 'd', default_value = "")]
    pub description: String,

    /// Project id
    #[arg(long, short = 'p')]
    pub project_id: Option<String>,

    /// Team id (default: the cached default team)
    #[arg(long)]
    pub team_id: Option<String>,

    /// Assignee: `me`, or a user id
    #[arg(long, short = 'a')]
    pub assignee: Option<String>,

    /// Workflow state id (default: the team's "Todo" state)
    #[arg(long, short = 's')]
    pub state: Option<String>,

    /// Comma-separated label names
    #[arg(long, short = 'l')]
    pub labels: Option<String>,
}

pub fn run(args: CreateArgs, settings: &Settings) -> Result<()> {
    let cache = helpers::open_authenticated(settings)?;
    let transport = helpers::connect(settings, &cache)?;

    let draft = IssueDraft {
        title: args.title,
        description: args.description,
        project_id: args.project_id,
        team_id: args.team_id,
        assignee: args.assignee,
        state_id: args.state,
        labels: args.labels.as_deref().map(issue::parse_labels).unwrap_or_default(),
    };

    let created = issue::create_issue(&transport, cache.document(), &draft)?;

    if settings.json {
        let value = serde_json::json!({
            "id": created.id,
            "identifier": created.identifier,
            "url": created.url,
        });
        println!("{}", value);
    } else {
        println!("{}", created.url);
    }

    Ok(())
}
