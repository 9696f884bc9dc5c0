//! Membridge - Stable record adapter for loosely-specified memory-storage APIs
//!
//! Command-line front end exercising the gateway operation set against a
//! configured upstream deployment.

use anyhow::Result;
use clap::{Parser, Subcommand};
use membridge::{
    config::BridgeConfig,
    gateway::MemoryGateway,
    identity::{FilePreferenceStore, MemoryPreferenceStore, Preferences, PreferenceStore},
    query::{QueryOptions, SortDirection},
    record::MemoryState,
    upstream::HttpTransport,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "membridge")]
#[command(author = "A3S Lab Team")]
#[command(version)]
#[command(about = "Stable record adapter for loosely-specified memory-storage APIs")]
struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "MEMBRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Identity to use, overriding stored preferences
    #[arg(short, long, env = "MEMBRIDGE_USER")]
    user: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List memories, with optional search and client-side querying
    List {
        /// Search query (routes to the upstream search endpoint)
        #[arg(short, long)]
        query: Option<String>,

        /// Page number (1-based)
        #[arg(long, default_value = "1")]
        page: usize,

        /// Page size
        #[arg(long, default_value = "10")]
        page_size: usize,

        /// Keep only these source applications (repeatable)
        #[arg(long)]
        app: Vec<String>,

        /// Keep only records with one of these categories (repeatable)
        #[arg(long)]
        category: Vec<String>,

        /// Sort column: text, created_at, or source_app
        #[arg(long)]
        sort: Option<String>,

        /// Sort direction: asc or desc
        #[arg(long, default_value = "asc")]
        direction: String,
    },

    /// Fetch one memory by id
    Get {
        /// Memory id
        id: String,
    },

    /// Create a memory
    Create {
        /// Memory content
        text: String,
    },

    /// Replace the content of a memory
    Update {
        /// Memory id
        id: String,

        /// New content
        content: String,
    },

    /// Delete memories
    Delete {
        /// Memory ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Change the state of memories
    SetState {
        /// Target state: active, paused, archived, or deleted
        state: String,

        /// Memory ids
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show memories related to one memory
    Related {
        /// Memory id
        id: String,
    },

    /// Show aggregate statistics
    Stats,

    /// List applications
    Apps,

    /// Show or change the stored identity
    User {
        /// Identity to select and persist
        set: Option<String>,
    },

    /// Show configuration
    Config {
        /// Show default configuration
        #[arg(long)]
        default: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = if let Some(path) = &cli.config {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)?
    } else {
        BridgeConfig::default()
    };

    if let Commands::Config { default } = &cli.command {
        let shown = if *default { BridgeConfig::default() } else { config };
        println!("{}", toml::to_string_pretty(&shown)?);
        return Ok(());
    }

    let prefs_store = preference_store(&config);
    if let Commands::User { set } = &cli.command {
        return handle_user(&config, prefs_store.as_ref(), set.as_deref());
    }

    let user = resolve_user(&cli, &config, prefs_store.as_ref());
    let transport = Arc::new(HttpTransport::new(&config.upstream)?);
    let gateway = MemoryGateway::new(transport);

    match cli.command {
        Commands::List {
            query,
            page,
            page_size,
            app,
            category,
            sort,
            direction,
        } => {
            let opts = QueryOptions {
                apps: app,
                categories: category,
                sort_column: sort,
                sort_direction: SortDirection::parse(&direction),
                page,
                page_size: Some(page_size),
            };
            let result = gateway.fetch_memories(&user, query.as_deref(), &opts).await?;
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "memories": result.records,
                    "total": result.total,
                    "pages": result.page_count,
                }))?
            );
        }
        Commands::Get { id } => match gateway.fetch_memory(&id).await? {
            Some(record) => println!("{}", serde_json::to_string_pretty(&record)?),
            None => println!("memory {} not found or unrecognized", id),
        },
        Commands::Create { text } => {
            gateway.create_memory(&user, &text).await?;
            println!("created");
        }
        Commands::Update { id, content } => {
            gateway.update_memory(&id, &content).await?;
            println!("updated {}", id);
        }
        Commands::Delete { ids } => {
            gateway.delete_memories(&ids).await?;
            println!("deleted {} memories", ids.len());
        }
        Commands::SetState { state, ids } => {
            let state: MemoryState = state.parse()?;
            gateway.update_memory_state(&ids, state).await?;
            println!("set {} memories to {}", ids.len(), state);
        }
        Commands::Related { id } => {
            // Populate the canonical set so the source record is resolvable
            gateway
                .fetch_memories(&user, None, &QueryOptions::default())
                .await?;
            let related = gateway.fetch_related(&user, &id).await?;
            println!("{}", serde_json::to_string_pretty(&related)?);
        }
        Commands::Stats => {
            let stats = gateway.fetch_stats(&user).await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        Commands::Apps => {
            let apps = gateway.list_apps().await?;
            println!("{}", serde_json::to_string_pretty(&apps)?);
        }
        Commands::User { .. } | Commands::Config { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// File-backed preferences at the configured or platform path, in-memory
/// when neither resolves
fn preference_store(config: &BridgeConfig) -> Box<dyn PreferenceStore> {
    let path = config
        .identity
        .preferences_path
        .clone()
        .or_else(FilePreferenceStore::default_path);

    match path {
        Some(path) => Box::new(FilePreferenceStore::new(path)),
        None => Box::new(MemoryPreferenceStore::new()),
    }
}

fn resolve_user(cli: &Cli, config: &BridgeConfig, store: &dyn PreferenceStore) -> String {
    if let Some(user) = &cli.user {
        return user.clone();
    }
    match store.load() {
        Ok(Some(prefs)) => prefs.current_user,
        _ => config.identity.default_user.clone(),
    }
}

fn handle_user(
    config: &BridgeConfig,
    store: &dyn PreferenceStore,
    set: Option<&str>,
) -> Result<()> {
    let mut prefs = store
        .load()?
        .unwrap_or_else(|| Preferences::new(&config.identity.default_user));

    if let Some(user) = set {
        prefs.select_user(user)?;
        store.save(&prefs)?;
        println!("switched to user: {}", prefs.current_user);
    } else {
        println!("current user: {}", prefs.current_user);
        let candidates = prefs.quick_select(&config.identity.common_users);
        if !candidates.is_empty() {
            println!("quick select: {}", candidates.join(", "));
        }
    }
    Ok(())
}
