use clap::Parser;
use tracing::info;
use wisdomrag::cli::*;
use wisdomrag::AppConfig;
use wisdomrag::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config = match &cli.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging
    if cli.verbose {
        wisdomrag::logging::init_logging_with_level("debug")?;
    } else {
        wisdomrag::logging::init_logging_with_config(Some(&config))?;
    }

    config.validate()?;
    info!("Configuration loaded successfully");

    let outcome = match cli.command {
        Commands::Download {
            all,
            tradition,
            list,
            force,
        } => handle_download(&config, all, tradition, list, force).await,
        Commands::Index { clear } => handle_index(&config, clear).await,
        Commands::Ask {
            question,
            traditions,
            mode,
            multi_agent,
            verbose,
        } => handle_ask(&config, question, traditions, mode, multi_agent, verbose).await,
        Commands::Compare { topic, traditions } => handle_compare(&config, topic, traditions).await,
        Commands::Wisdom { tradition } => handle_wisdom(&config, tradition).await,
        Commands::Journal { entry, session } => handle_journal(&config, entry, session).await,
        Commands::Traditions => handle_traditions(&config),
        Commands::Config => handle_config(&config),
        Commands::Serve { host, port, cors } => handle_serve_api(&config, host, port, cors).await,
    };

    if let Err(e) = &outcome {
        print_error(&e.to_string());
    }
    outcome
}
