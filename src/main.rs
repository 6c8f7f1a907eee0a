use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bankd::api::{self, handlers::open_account};
use bankd::cli::{self, AccountCommands, SeedArgs};
use bankd::config::{self, Config, LogFormat};
use bankd::models::account::AccountView;
use bankd::store::memory::MemoryStore;
use bankd::store::postgres::PgStore;
use bankd::store::AccountStore;
use bankd::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing JWT_SECRET is fatal here, before anything binds or connects.
    let cfg = config::load()?;
    init_tracing(&cfg.log_format);

    let args = cli::Cli::parse();

    let result = match args.command {
        Some(cli::Commands::Serve {
            port,
            seed,
            in_memory,
        }) => run_server(cfg, port, seed, in_memory).await,
        Some(cli::Commands::Seed(seed_args)) => {
            let state = connect_state(cfg).await?;
            seed_accounts(&state, &seed_args).await
        }
        Some(cli::Commands::Account { command }) => {
            let state = connect_state(cfg).await?;
            handle_account_command(command, &state).await
        }
        None => run_server(cfg, None, false, false).await,
    };

    if let Err(ref e) = result {
        eprintln!("Error: {:?}", e);
    }
    result
}

fn init_tracing(format: &LogFormat) {
    let filter = tracing_subscriber::EnvFilter::new(
        std::env::var("RUST_LOG").unwrap_or_else(|_| "bankd=debug,tower_http=debug".into()),
    );
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Json => registry.with(tracing_subscriber::fmt::layer().json()).init(),
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Connect to PostgreSQL, apply migrations and build the shared state.
async fn connect_state(cfg: Config) -> anyhow::Result<Arc<AppState>> {
    tracing::info!("Connecting to database...");
    let db = PgStore::connect(&cfg.database_url)
        .await
        .context("failed to connect to the account database")?;

    tracing::info!("Running migrations...");
    db.migrate().await.context("failed to create account table")?;

    let store: Arc<dyn AccountStore> = Arc::new(db);
    Ok(Arc::new(AppState::new(cfg, store)?))
}

async fn run_server(
    cfg: Config,
    port: Option<u16>,
    seed: bool,
    in_memory: bool,
) -> anyhow::Result<()> {
    let port = port.unwrap_or(cfg.port);

    let state = if in_memory {
        tracing::warn!("Using in-memory account store; data is lost on exit");
        let store: Arc<dyn AccountStore> = Arc::new(MemoryStore::new());
        Arc::new(AppState::new(cfg, store)?)
    } else {
        connect_state(cfg).await?
    };

    if seed {
        tracing::info!("Seeding the database");
        seed_accounts(&state, &SeedArgs::default()).await?;
    }

    let app = api::app(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("bankd listening on {}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("bankd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}

async fn seed_accounts(state: &AppState, args: &SeedArgs) -> anyhow::Result<()> {
    let account = open_account(state, &args.first_name, &args.last_name, &args.password)
        .await
        .context("failed to seed account")?;
    println!(
        "Seeded account:\n  ID:     {}\n  Number: {}\n  Name:   {} {}",
        account.id, account.number, account.first_name, account.last_name
    );
    Ok(())
}

async fn handle_account_command(cmd: AccountCommands, state: &AppState) -> anyhow::Result<()> {
    match cmd {
        AccountCommands::Create {
            first_name,
            last_name,
            password,
        } => {
            let account = open_account(state, &first_name, &last_name, &password).await?;
            println!(
                "Account created:\n  ID:      {}\n  Number:  {}\n  Balance: {}",
                account.id, account.number, account.balance
            );
        }
        AccountCommands::List => {
            let accounts = state.store.list_accounts().await?;
            if accounts.is_empty() {
                println!("No accounts found.");
                return Ok(());
            }
            println!(
                "{:<8} {:<10} {:<30} {:>10} CREATED",
                "ID", "NUMBER", "NAME", "BALANCE"
            );
            for a in accounts.into_iter().map(AccountView::from) {
                println!(
                    "{:<8} {:<10} {:<30} {:>10} {}",
                    a.id,
                    a.number,
                    format!("{} {}", a.first_name, a.last_name),
                    a.balance,
                    a.created_at.format("%Y-%m-%d")
                );
            }
        }
        AccountCommands::Delete { id } => {
            if state.store.delete_account(id).await? {
                println!("Account {} deleted.", id);
            } else {
                println!("Account {} not found.", id);
            }
        }
    }
    Ok(())
}
