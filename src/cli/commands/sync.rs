//! `linear sync` command - Refresh cached reference data

use console::style;
use miette::Result;

use crate::cli::helpers;
use crate::core::{Category, ReferenceCache, Settings, SyncReport, SyncScope, Synchronizer};

#[derive(clap::Args, Debug)]
pub struct SyncArgs {
    /// What to sync
    #[arg(value_enum, default_value = "all")]
    pub scope: SyncScope,
}

pub fn run(args: SyncArgs, settings: &Settings) -> Result<()> {
    let mut cache = helpers::open_authenticated(settings)?;
    sync_and_report(settings, &mut cache, args.scope)
}

/// Run a sync against the live API and print a summary
pub fn sync_and_report(settings: &Settings, cache: &mut ReferenceCache, scope: SyncScope) -> Result<()> {
    let transport = helpers::connect(settings, cache)?;
    let report = Synchronizer::new(&transport, settings).run(cache, scope)?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &SyncReport) {
    if let Some(team) = &report.default_team {
        println!(
            "{} Default team set to {} ({})",
            style("→").blue(),
            style(&team.name).cyan(),
            team.id
        );
        println!(
            "  Change with {}",
            style("linear config default_team <team_id>").yellow()
        );
    }

    println!(
        "{} Synced {} in {}ms",
        style("✓").green(),
        report
            .categories
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", "),
        report.duration_ms
    );

    for category in &report.categories {
        match category {
            Category::Teams => println!("  Teams:    {}", style(report.teams).cyan()),
            Category::States => println!("  States:   {}", style(report.states).cyan()),
            Category::Users => println!("  Users:    {}", style(report.users).cyan()),
            Category::Projects => println!("  Projects: {}", style(report.projects).cyan()),
            Category::Avatars => {
                println!("  Avatars:  {}", style(report.avatars_saved).cyan());
                if report.avatars_failed > 0 {
                    println!("  Skipped:  {}", style(report.avatars_failed).yellow());
                }
            }
            Category::Viewer => {}
        }
    }
}
