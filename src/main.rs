use clap::Parser;
use evalfleet::cli::{execute_command, get_log_level, Cli};
use evalfleet::config::FleetConfig;
use evalfleet::error::FleetError;
use tracing::{debug, error, trace};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // RUST_LOG wins over -v when set
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(get_log_level(cli.verbose)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(cli.verbose >= 2) // Show target module for -vv and above
        .with_thread_ids(cli.verbose >= 3) // Show thread IDs for -vvv
        .with_line_number(cli.verbose >= 3) // Show line numbers for -vvv
        .init();

    debug!("evalfleet started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    let result = match FleetConfig::load_or_default(cli.config.as_deref()) {
        Ok(config) => execute_command(cli.command, &config).await,
        Err(e) => Err(e.into()),
    };

    if let Err(e) = result {
        error!("Fatal error: {:#}", e);
        let exit_code = match e.downcast_ref::<FleetError>() {
            Some(fleet_error) => {
                eprintln!("Error: {}", fleet_error.user_message());
                fleet_error.exit_code()
            }
            None => {
                eprintln!("Error: {e:#}");
                1
            }
        };
        std::process::exit(exit_code);
    }
}
