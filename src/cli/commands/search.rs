//! `linear search` command - Full-text issue search

use console::style;
use miette::Result;

use crate::cli::helpers;
use crate::cli::output::{print_items, LauncherItem};
use crate::core::issue::{self, IssueSummary};
use crate::core::Settings;

#[derive(clap::Args, Debug)]
pub struct SearchArgs {
    /// Search terms
    pub terms: String,
}

pub fn run(args: SearchArgs, settings: &Settings) -> Result<()> {
    let cache = helpers::open_authenticated(settings)?;
    let transport = helpers::connect(settings, &cache)?;

    let hits = issue::search_issues(&transport, &args.terms)?;

    if settings.json {
        let items: Vec<LauncherItem> = hits.iter().map(to_item).collect();
        return print_items(&items, Some(&args.terms));
    }

    for hit in &hits {
        println!("{} {}", style(&hit.identifier).cyan(), hit.title);
    }
    Ok(())
}

fn to_item(hit: &IssueSummary) -> LauncherItem {
    LauncherItem::new(&hit.id, &hit.title, &hit.identifier).with_subtitle(hit.subtitle())
}
