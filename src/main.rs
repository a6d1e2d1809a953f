use clap::Parser;
use mobterm::core::config::{self, CliOverrides};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "mobterm", about = "Terminal client for a store-driven multiplayer game")]
struct Args {
    /// Store connection string (overrides DATABASE_URL and the config file)
    #[arg(long)]
    database_url: Option<String>,

    /// Player name; prompted for when not set anywhere
    #[arg(short, long)]
    name: Option<String>,

    /// Single-character minimap icon; prompted for when not set anywhere
    #[arg(short, long)]
    icon: Option<String>,

    /// Submit/render interval in milliseconds
    #[arg(long)]
    frame_ms: Option<u64>,

    /// Log file (the terminal belongs to the game view)
    #[arg(long, default_value = "mobterm.log")]
    log_file: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();
    dotenv::dotenv().ok();

    // Initialize file logger
    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&args.log_file) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    let resolved = config::resolve(
        &file_config,
        &CliOverrides {
            database_url: args.database_url,
            player_name: args.name,
            icon: args.icon,
            frame_ms: args.frame_ms,
        },
    );

    log::info!("mobterm starting up, frame interval {:?}", resolved.timing.frame_interval);

    // `run` has already restored the terminal by the time it returns.
    let result = mobterm::tui::run(resolved).await;
    println!("\nExiting...");
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Session ended with error: {}", e);
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}
