//! `linear info` command - Show one issue

use console::style;
use miette::Result;

use crate::cli::helpers;
use crate::core::issue;
use crate::core::Settings;

#[derive(clap::Args, Debug)]
pub struct InfoArgs {
    /// Issue identifier (e.g. ENG-123) or id
    pub key: String,
}

pub fn run(args: InfoArgs, settings: &Settings) -> Result<()> {
    let cache = helpers::open_authenticated(settings)?;
    let transport = helpers::connect(settings, &cache)?;

    let detail = issue::issue_info(&transport, &args.key)?;

    if settings.json {
        let value = serde_json::json!({
            "identifier": detail.identifier,
            "title": detail.title,
            "description": detail.description,
            "url": detail.url,
        });
        println!("{}", value);
        return Ok(());
    }

    println!("{} {}", style(&detail.identifier).cyan().bold(), detail.title);
    println!();
    println!("{}", detail.description.as_deref().unwrap_or(""));
    println!();
    println!("{}", detail.url);
    Ok(())
}
