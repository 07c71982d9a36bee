//! `linear list` command - Cached reference data as launcher items
//!
//! Reads only the local cache; nothing here talks to the API.

use clap::Subcommand;
use miette::Result;

use crate::cli::helpers;
use crate::cli::output::{print_items, LauncherItem};
use crate::core::{CacheDocument, Settings};

#[derive(Subcommand, Debug)]
pub enum ListCommands {
    /// Cached teams
    Teams,

    /// Projects belonging to a team
    Projects {
        /// Team id
        #[arg(long = "team", value_name = "TEAM_ID")]
        team_id: String,
    },

    /// All projects, with their slug as the argument
    ProjectSlugs,

    /// Cached users, with avatar paths
    Users,
}

pub fn run(cmd: ListCommands, settings: &Settings) -> Result<()> {
    let cache = helpers::open_authenticated(settings)?;
    let items = items_for(&cmd, cache.document(), settings);
    print_items(&items, None)
}

fn items_for(cmd: &ListCommands, doc: &CacheDocument, settings: &Settings) -> Vec<LauncherItem> {
    match cmd {
        ListCommands::Teams => doc
            .teams()
            .iter()
            .map(|team| LauncherItem::new(&team.id, &team.name, &team.id))
            .collect(),
        ListCommands::Projects { team_id } => doc
            .projects_for_team(team_id)
            .into_iter()
            .map(|project| LauncherItem::new(&project.id, &project.name, &project.id))
            .collect(),
        ListCommands::ProjectSlugs => doc
            .projects
            .iter()
            .map(|project| LauncherItem::new(&project.id, &project.name, &project.slug_id))
            .collect(),
        ListCommands::Users => doc
            .users
            .iter()
            .map(|user| {
                LauncherItem::new(&user.id, &user.name, &user.id)
                    .with_icon(settings.icon_path(&user.id).to_string_lossy())
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::cache::{Project, Team, User};
    use std::path::Path;

    fn doc() -> CacheDocument {
        let mut doc = CacheDocument::default();
        doc.replace_teams(vec![
            Team { id: "T1".into(), name: "Eng".into() },
            Team { id: "T2".into(), name: "Ops".into() },
        ]);
        doc.replace_projects(vec![
            Project { id: "P1".into(), name: "Alpha".into(), slug_id: "a1".into(), team_ids: vec!["T1".into()] },
            Project { id: "P2".into(), name: "Beta".into(), slug_id: "b2".into(), team_ids: vec!["T2".into()] },
        ]);
        doc.replace_users(vec![User { id: "U1".into(), name: "Ann".into(), avatar_url: None }]);
        doc
    }

    #[test]
    fn test_list_teams_in_cache_order() {
        let settings = Settings::default();
        let items = items_for(&ListCommands::Teams, &doc(), &settings);
        let titles: Vec<&str> = items.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles, vec!["Eng", "Ops"]);
        assert_eq!(items[0].arg, "T1");
    }

    #[test]
    fn test_list_projects_for_team() {
        let settings = Settings::default();
        let items = items_for(&ListCommands::Projects { team_id: "T2".into() }, &doc(), &settings);
        assert_eq!(items, vec![LauncherItem::new("P2", "Beta", "P2")]);

        let none = items_for(&ListCommands::Projects { team_id: "T9".into() }, &doc(), &settings);
        assert!(none.is_empty());
    }

    #[test]
    fn test_list_project_slugs() {
        let settings = Settings::default();
        let items = items_for(&ListCommands::ProjectSlugs, &doc(), &settings);
        assert_eq!(items[0].arg, "a1");
        assert_eq!(items[1].arg, "b2");
    }

    #[test]
    fn test_list_users_with_icon() {
        let settings = Settings::default().with_home(Path::new("/tmp/lin"));
        let items = items_for(&ListCommands::Users, &doc(), &settings);
        assert_eq!(
            items[0].icon.as_ref().map(|i| i.path.as_str()),
            Some("/tmp/lin/icons/U1.png")
        );
    }
}
