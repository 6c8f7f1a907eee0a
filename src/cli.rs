use clap::{Parser, Subcommand};

/// bankd: account management HTTP service
#[derive(Parser)]
#[command(name = "bankd", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the HTTP server
    Serve {
        /// Port to bind (defaults to BANKD_PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Seed a demo account before serving
        #[arg(long)]
        seed: bool,

        /// Keep accounts in process memory instead of PostgreSQL
        #[arg(long)]
        in_memory: bool,
    },

    /// Create the demo account and exit
    Seed(SeedArgs),

    /// Manage accounts directly against the database
    Account {
        #[command(subcommand)]
        command: AccountCommands,
    },
}

#[derive(clap::Args, Clone)]
pub struct SeedArgs {
    #[arg(long, default_value = "Ahmed")]
    pub first_name: String,
    #[arg(long, default_value = "GG")]
    pub last_name: String,
    #[arg(long, env = "BANKD_SEED_PASSWORD", default_value = "Hunter69")]
    pub password: String,
}

impl Default for SeedArgs {
    fn default() -> Self {
        Self {
            first_name: "Ahmed".into(),
            last_name: "GG".into(),
            password: std::env::var("BANKD_SEED_PASSWORD").unwrap_or_else(|_| "Hunter69".into()),
        }
    }
}

#[derive(Subcommand)]
pub enum AccountCommands {
    /// Open a new account
    Create {
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long)]
        password: String,
    },
    /// List all accounts
    List,
    /// Delete an account by id
    Delete {
        #[arg(long)]
        id: i64,
    },
}
