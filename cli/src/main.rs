mod commands;
mod handlers;

use std::time::Duration;

use clap::Parser;
use posts_core::{ClientConfig, PostClient, PostFields, PostStore, ResourceStore};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use commands::{Cli, Commands};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = ClientConfig::from_env();
    if let Some(url) = &cli.url {
        config = ClientConfig {
            timeout: config.timeout,
            ..ClientConfig::new(url)
        };
    }
    if let Some(ms) = cli.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    let store: PostStore = ResourceStore::new(PostClient::from_config(&config));
    debug!(endpoint = store.client().endpoint(), timeout = ?config.timeout, "using service");
    store.subscribe(|state| {
        debug!(
            version = state.version,
            status = ?state.status,
            pending = state.is_pending(),
            records = state.records.len(),
            "state changed"
        );
    });

    let result = match cli.command {
        Commands::List => handlers::handle_list(&store),
        Commands::Create {
            date,
            title,
            read_time,
        } => handlers::handle_create(&store, PostFields::new(date, title, read_time)),
        Commands::Update {
            id,
            date,
            title,
            read_time,
        } => handlers::handle_update(&store, &id, date, title, read_time),
        Commands::Delete { id, yes } => handlers::handle_delete(&store, &id, yes),
    };

    store.dispose();

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
