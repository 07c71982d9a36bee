//! `linear init` command - Store an API key and sync all reference data

use console::style;
use miette::Result;

use crate::cli::commands::sync::sync_and_report;
use crate::core::{ReferenceCache, Settings, SyncScope};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Personal API key (Settings → API in Linear)
    pub apikey: String,

    /// Only store the key, skip the initial sync
    #[arg(long)]
    pub no_sync: bool,
}

pub fn run(args: InitArgs, settings: &Settings) -> Result<()> {
    let apikey = args.apikey.trim();
    if apikey.is_empty() {
        return Err(miette::miette!("API key must not be empty"));
    }

    let mut cache = ReferenceCache::open(settings)?;
    cache.set_field("apikey", apikey)?;
    println!(
        "{} Stored API key in {}",
        style("✓").green(),
        style(cache.path().display()).cyan()
    );

    if args.no_sync {
        println!();
        println!(
            "Run {} to fetch teams, states, users and projects",
            style("linear sync").yellow()
        );
        return Ok(());
    }

    sync_and_report(settings, &mut cache, SyncScope::All)
}
