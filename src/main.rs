use clap::Parser;
use pacemaker::app::{handle_fatal_error, init_logging, AppConfig};
use pacemaker::cli::{execute, Cli};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let app = AppConfig::new(cli.verbose).with_config_path(cli.config);
    init_logging(&app);

    if let Err(e) = execute(cli.command, &app).await {
        handle_fatal_error(e, app.verbose);
    }
}
