//! `linear config` command - Set a value in the cached configuration
//!
//! Writes any top-level key of `data.json`. The common use is changing the
//! default team (`linear config default_team <team_id>`). Unknown keys are
//! stored without complaint but nothing reads them.

use console::style;
use miette::Result;

use crate::cli::helpers;
use crate::core::Settings;

#[derive(clap::Args, Debug)]
pub struct ConfigArgs {
    /// Key to set (e.g. default_team)
    pub key: String,

    /// Value to set
    pub value: String,
}

/// Keys the tool itself reads
const KNOWN_KEYS: &[&str] = &["apikey", "me", "default_team"];

pub fn run(args: ConfigArgs, settings: &Settings) -> Result<()> {
    let mut cache = helpers::open_authenticated(settings)?;
    cache.set_field(&args.key, &args.value)?;

    println!(
        "{} Set {} {} {}",
        style("✓").green(),
        style(&args.key).cyan(),
        style("→").dim(),
        style(&args.value).yellow()
    );

    if !KNOWN_KEYS.contains(&args.key.as_str()) {
        tracing::warn!("'{}' is not a key linear reads; it was stored anyway", args.key);
    }

    if args.key == "default_team"
        && !cache.document().teams().iter().any(|t| t.id == args.value)
    {
        tracing::warn!("team {} is not in the cached team list", args.value);
    }

    Ok(())
}
