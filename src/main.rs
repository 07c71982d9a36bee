use clap::Parser;
use lincli::cli::commands;
use lincli::cli::{Cli, Commands};
use lincli::core::Settings;
use miette::Result;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    // Reset SIGPIPE to default behavior (terminate silently) for proper Unix piping.
    // Without this, piping to `head`, `jq`, etc. causes a panic on broken pipe.
    #[cfg(unix)]
    {
        unsafe {
            libc::signal(libc::SIGPIPE, libc::SIG_DFL);
        }
    }
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let global = cli.global;
    init_tracing(global.debug);

    let settings = Settings::load().with_flags(global.json, global.debug, global.timeout);

    match cli.command {
        Commands::Init(args) => commands::init::run(args, &settings),
        Commands::Sync(args) => commands::sync::run(args, &settings),
        Commands::Config(args) => commands::config::run(args, &settings),
        Commands::Create(args) => commands::create::run(args, &settings),
        Commands::Search(args) => commands::search::run(args, &settings),
        Commands::Info(args) => commands::info::run(args, &settings),
        Commands::List(cmd) => commands::list::run(cmd, &settings),
        Commands::Completions(args) => commands::completions::run(args),
    }
}

/// Logs go to stderr; stdout is reserved for command output
fn init_tracing(debug: bool) {
    let filter = EnvFilter::try_from_env("LINEAR_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if debug { "lincli=debug,info" } else { "lincli=info,warn" })
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .compact()
        .init();
}
