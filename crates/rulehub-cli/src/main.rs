//! Rulehub CLI - entrypoint for the API server and maintenance commands

mod commands;

use clap::{Parser, Subcommand};
use commands::{ReconcileMediaCommand, ServeCommand};
use tracing_subscriber::{layer::SubscriberExt, Layer};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "LOG_LEVEL", global = true)]
    log_level: String,

    /// Log format: compact, full
    #[arg(long, default_value = "compact", env = "LOG_FORMAT", global = true)]
    log_format: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP API server
    Serve(ServeCommand),
    /// Promote uploaded objects behind pending media rows
    ReconcileMedia(ReconcileMediaCommand),
}

fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; the real environment still applies
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(&cli.log_level, &cli.log_format)?;

    match cli.command {
        Commands::Serve(serve_cmd) => serve_cmd.execute(),
        Commands::ReconcileMedia(reconcile_cmd) => reconcile_cmd.execute(),
    }
}

fn init_tracing(log_level: &str, log_format: &str) -> anyhow::Result<()> {
    // RUST_LOG wins when set; otherwise our crates at the requested level
    // and noisy dependencies at warn
    let filter = match std::env::var("RUST_LOG") {
        Ok(_) => tracing_subscriber::EnvFilter::try_from_default_env()?,
        Err(_) => tracing_subscriber::EnvFilter::try_new(format!(
            "rulehub={level},\
             rulehub_cli={level},\
             rulehub_core={level},\
             rulehub_database={level},\
             rulehub_storage={level},\
             rulehub_auth={level},\
             rulehub_articles={level},\
             tower_http={level},\
             sqlx=warn,\
             sea_orm=warn,\
             sea_orm_migration=warn,\
             aws_config=warn,\
             aws_smithy_runtime=warn,\
             aws_sdk_s3=warn,\
             h2=warn,\
             hyper=warn",
            level = log_level
        ))?,
    };

    let fmt_layer = match log_format {
        "full" => tracing_subscriber::fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
        _ => tracing_subscriber::fmt::layer()
            .compact()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .boxed(),
    };

    let subscriber = tracing_subscriber::registry().with(filter).with(fmt_layer);
    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}
