use clap::{Parser, Subcommand};
use randm::cli::{format_millis, render_detail, render_list};
use randm::{
    BrowseSession, CharacterFilter, ClientBuilder, Config, DetailSession, LoadState, LocalStore,
    ManualReachability, PageOutcome, Reachability, Synchronizer, TcpProbe,
};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "randm")]
#[command(about = "Browse Rick and Morty characters, online or from the local cache", long_about = None)]
struct Args {
    /// Configuration file (defaults to ./randm.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding the cache database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Base URL of the character API
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Never touch the network; answer from the cache
    #[arg(long, global = true)]
    offline: bool,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List characters, optionally filtered
    List {
        /// Substring of the character name
        #[arg(long)]
        name: Option<String>,
        /// alive, dead or unknown
        #[arg(long)]
        status: Option<String>,
        #[arg(long)]
        species: Option<String>,
        /// female, male, genderless or unknown
        #[arg(long)]
        gender: Option<String>,
        /// Number of pages to load
        #[arg(long, default_value_t = 1)]
        pages: u32,
    },
    /// Show one character
    Show { id: i64 },
    /// Re-download the character list and replace the cache
    Refresh,
    /// Show cache statistics
    Cache,
    /// Delete every cached character
    Clear,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let args = Args::parse();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "randm=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(dir) = args.data_dir {
        config.data_dir = Some(dir);
    }
    if let Some(url) = args.api_url {
        config.api_url = url;
    }
    config.offline |= args.offline;

    std::fs::create_dir_all(config.data_dir())?;
    let store = LocalStore::open(config.database_path())?;
    tracing::debug!("Cache database at {}", config.database_path().display());

    let client = ClientBuilder::new(&config.api_url)
        .timeout_ms(config.timeout_ms)
        .build()?;
    let reachability: Arc<dyn Reachability> = if config.offline {
        Arc::new(ManualReachability::new(false))
    } else {
        Arc::new(TcpProbe::for_url(client.base_url(), config.probe_timeout())?)
    };

    let sync = Arc::new(Synchronizer::new(
        Arc::new(Mutex::new(store)),
        Arc::new(client),
        reachability,
        config.sync_config(),
    ));

    let ok = match args.command {
        Command::List {
            name,
            status,
            species,
            gender,
            pages,
        } => {
            let filter = CharacterFilter::new(name, status, species, gender);
            let browse = BrowseSession::new(sync);
            browse.query(&filter).await;

            for _ in 1..pages {
                if !matches!(browse.load_next_page().await, PageOutcome::Appended(_)) {
                    break;
                }
            }

            let state = browse.state();
            if args.json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                match &state {
                    LoadState::Success(records) => print!("{}", render_list(records)),
                    LoadState::Error(msg) => eprintln!("Error: {}", msg),
                    LoadState::Loading => {}
                }
            }
            state.error().is_none()
        }
        Command::Show { id } => {
            let detail = DetailSession::new(sync);
            let state = detail.load(id).await;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&state)?);
            } else {
                match &state {
                    LoadState::Success(record) => print!("{}", render_detail(record)),
                    LoadState::Error(msg) => eprintln!("Error: {}", msg),
                    LoadState::Loading => {}
                }
            }
            state.error().is_none()
        }
        Command::Refresh => match sync.refresh().await {
            Ok(count) => {
                println!("Cached {} characters", count);
                true
            }
            Err(e) => {
                eprintln!("Refresh failed: {}", e);
                false
            }
        },
        Command::Cache => {
            let store = sync.store();
            let store = store.lock().await;
            let count = store.count()?;
            let last_refresh = store.last_refresh_at()?;
            if args.json {
                println!(
                    "{}",
                    serde_json::json!({
                        "path": config.database_path(),
                        "count": count,
                        "last_refresh_at": last_refresh,
                    })
                );
            } else {
                println!("Database:     {}", config.database_path().display());
                println!("Characters:   {}", count);
                println!(
                    "Last refresh: {}",
                    last_refresh.map(format_millis).unwrap_or_else(|| "never".to_string())
                );
            }
            true
        }
        Command::Clear => {
            sync.store().lock().await.clear_all()?;
            println!("Cache cleared");
            true
        }
    };

    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
