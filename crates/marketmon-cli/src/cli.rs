//! CLI argument definitions for marketmon.
//!
//! Every page of the dashboard maps to a command; running the command is the
//! equivalent of opening the page.
//!
//! # Commands
//!
//! | Command | Page / action |
//! |---------|---------------|
//! | `login`, `register` | `/login`, `/register` |
//! | `logout`, `whoami` | session |
//! | `instruments` | `/` |
//! | `show <id>` | `/instrument/:id` |
//! | `favorites` | `/favorites` |
//! | `favorite add\|remove\|toggle <id>` | star button |
//! | `admin users` | `/admin/users` |
//! | `admin refresh-market-data`, `admin init-instruments` | admin maintenance |
//! | `health` | backend status |
//! | `route <path>`, `nav` | guard decision and menu |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `table` | Output format (table, json) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--api-url` | `MARKETMON_API_URL` or `http://localhost:8080` | Backend base URL |
//! | `--timeout-ms` | `MARKETMON_TIMEOUT_MS` or `10000` | Request timeout |
//! | `--credentials` | `MARKETMON_CREDENTIALS` or `~/.marketmon/credentials.json` | Credential file |
//! | `--verbose` | `false` | Debug logging on stderr |

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Terminal client for the market monitor dashboard.
#[derive(Debug, Parser)]
#[command(
    name = "marketmon",
    author,
    version,
    about = "Terminal client for the market monitor dashboard"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Backend base URL. Overrides MARKETMON_API_URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Request timeout in milliseconds. Overrides MARKETMON_TIMEOUT_MS.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Credential file. Overrides MARKETMON_CREDENTIALS.
    #[arg(long, global = true)]
    pub credentials: Option<PathBuf>,

    /// Log debug output to stderr (RUST_LOG takes precedence).
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable columns.
    Table,
    /// Single JSON envelope.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Sign in and store the credential.
    Login(LoginArgs),

    /// Create an account and sign in.
    Register(RegisterArgs),

    /// Forget the stored credential.
    Logout,

    /// Show the signed-in user.
    Whoami,

    /// List instruments.
    ///
    /// # Examples
    ///
    ///   marketmon instruments
    ///   marketmon instruments --search apple
    ///   marketmon instruments --search "s&p" --remote
    Instruments(InstrumentsArgs),

    /// Show one instrument in detail.
    Show(ShowArgs),

    /// List favorite instruments.
    Favorites,

    /// Mark or unmark a favorite.
    #[command(subcommand)]
    Favorite(FavoriteCommand),

    /// Administrator pages and maintenance.
    #[command(subcommand)]
    Admin(AdminCommand),

    /// Backend health check.
    Health,

    /// Evaluate the route guard for a client path.
    Route(RouteArgs),

    /// Show the navigation menu for the current session.
    Nav,
}

#[derive(Debug, Args)]
pub struct LoginArgs {
    #[arg(long)]
    pub email: String,

    #[arg(long, env = "MARKETMON_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct RegisterArgs {
    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub email: String,

    #[arg(long, env = "MARKETMON_PASSWORD", hide_env_values = true)]
    pub password: String,
}

#[derive(Debug, Args)]
pub struct InstrumentsArgs {
    /// Keep only instruments whose symbol or name contains this text.
    #[arg(long)]
    pub search: Option<String>,

    /// Ask the backend to search instead of filtering locally.
    #[arg(long, requires = "search", default_value_t = false)]
    pub remote: bool,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Instrument id.
    pub id: String,
}

#[derive(Debug, Subcommand)]
pub enum FavoriteCommand {
    /// Mark an instrument as favorite.
    Add(FavoriteArgs),
    /// Unmark an instrument.
    Remove(FavoriteArgs),
    /// Flip the current flag.
    Toggle(FavoriteArgs),
}

#[derive(Debug, Args)]
pub struct FavoriteArgs {
    /// Instrument id.
    pub id: String,
}

#[derive(Debug, Subcommand)]
pub enum AdminCommand {
    /// List registered users.
    Users,
    /// Pull fresh market data on the backend.
    RefreshMarketData,
    /// Seed the default instrument set on the backend.
    InitInstruments,
}

#[derive(Debug, Args)]
pub struct RouteArgs {
    /// Client path such as `/favorites` or `/instrument/3`.
    pub path: String,
}
