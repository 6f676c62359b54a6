use clap::Parser;
use passhero::cli::{Cli, Commands};
use tracing_subscriber::EnvFilter;

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Init => passhero::cli::commands::init::execute(&cli),
        Commands::List => passhero::cli::commands::list::execute(&cli),
        Commands::Add { ref app } => passhero::cli::commands::add::execute(&cli, app),
        Commands::Get { ref app, copy } => passhero::cli::commands::get::execute(&cli, app, copy),
        Commands::Change { ref app } => passhero::cli::commands::change::execute(&cli, app),
        Commands::Delete { ref app, force } => {
            passhero::cli::commands::delete::execute(&cli, app, force)
        }
        Commands::Rekey => passhero::cli::commands::rekey::execute(&cli),
        Commands::Version => passhero::cli::commands::version::execute(),
        Commands::Completions { shell } => passhero::cli::commands::completions::execute(shell),
    };

    if let Err(e) = result {
        passhero::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Log to stderr.  `PASSHERO_LOG` takes precedence over `--verbose`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "passhero=debug" } else { "warn" };
    let filter = EnvFilter::try_from_env("PASSHERO_LOG")
        .unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
