use clap::Parser;
use env_logger::Env;
use log::{error, info};

use emergency_fanout::cli::{Cli, Command};
use emergency_fanout::config::Settings;
use emergency_fanout::setup;

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let settings = Settings::load(&cli.config).map_err(|e| {
        error!("Failed to load configuration from {}: {}", cli.config, e);
        e
    })?;

    info!(
        "Loaded configuration: directory backend {:?}, proximity {:?}, max in flight {}",
        settings.directory.backend, settings.fanout.proximity, settings.fanout.max_in_flight
    );

    match cli.command() {
        Command::Serve => setup::setup_and_run(settings).await?,
        Command::InitDb => setup::init_directory(&settings).await?,
        Command::SetLocation(args) => {
            setup::register_location(&settings, &args.user, args.token.as_deref(), args.lat, args.lng).await?;
        }
    }

    Ok(())
}
