//! Foody CLI - Browse restaurants and fill a cart from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Log in (credentials are remembered for the next login)
//! foody login -e budi@example.com -p secret1
//!
//! # Create an account and log it in
//! foody register -n Budi -e budi@example.com --phone 08123456789 -p secret1 --confirm secret1
//!
//! # List nearby restaurants matching "bakso", best rated first
//! foody restaurants --category nearby --search bakso --sort rating
//!
//! # Add restaurants to the cart
//! foody cart add 12 15
//! ```
//!
//! # Environment Variables
//!
//! - `FOODY_API_BASE_URL` - Base URL of the REST API (required)
//! - `FOODY_LOG_FORMAT` - `json` for JSON logs, text otherwise
//! - `RUST_LOG` - Log filter (default: `foody_client=info,foody_cli=info`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::io::Write;

use clap::{Parser, Subcommand};
use foody_client::validation::{LoginForm, RegisterForm};
use foody_client::{ClientConfig, ClientError, FoodyClient};
use foody_core::{Category, RestaurantId, SortOption};
use secrecy::SecretString;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

use commands::CliError;

#[derive(Parser)]
#[command(name = "foody")]
#[command(author, version, about = "Foody restaurant client")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in with email and password
    Login {
        #[arg(short, long)]
        email: String,

        #[arg(short, long)]
        password: String,

        /// Do not remember the credentials for the next login
        #[arg(long)]
        no_remember: bool,
    },
    /// Create an account and log it in
    Register {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        email: String,

        #[arg(long)]
        phone: String,

        #[arg(short, long)]
        password: String,

        /// Password confirmation
        #[arg(long)]
        confirm: String,
    },
    /// Log out and forget the stored token
    Logout,
    /// Show the logged-in user
    Profile,
    /// List restaurants
    Restaurants {
        /// all, nearby, discount, best-seller, delivery, lunch
        #[arg(short, long, default_value = "all")]
        category: Category,

        /// Case-insensitive name search
        #[arg(short, long)]
        search: Option<String>,

        /// rating, price-asc, price-desc
        #[arg(long)]
        sort: Option<SortOption>,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add restaurants to the cart
    Add {
        /// Restaurant ids
        #[arg(required = true)]
        ids: Vec<RestaurantId>,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before the filter reads RUST_LOG
    let _ = dotenvy::dotenv();
    init_tracing();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::debug!(error = %e, "Command failed");
        let _ = writeln!(std::io::stderr().lock(), "Error: {}", e.user_message());
        std::process::exit(1);
    }
}

/// Install the log subscriber. Logs go to stderr so command output stays
/// clean on stdout.
fn init_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "foody_client=info,foody_cli=info".into());

    let json = std::env::var("FOODY_LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("json"));
    let json_layer = json.then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .flatten_event(true)
            .with_writer(std::io::stderr)
    });
    let text_layer = (!json).then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .init();
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let config = ClientConfig::from_env().map_err(ClientError::from)?;
    let client = FoodyClient::from_config(config)?;
    client.auth().restore().await.map_err(ClientError::from)?;

    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Login {
            email,
            password,
            no_remember,
        } => {
            let form = LoginForm {
                remember_me: !no_remember,
                ..LoginForm::new(email, password)
            };
            commands::auth::login(&client, &mut out, &form).await?;
        }
        Commands::Register {
            name,
            email,
            phone,
            password,
            confirm,
        } => {
            let form = RegisterForm {
                name,
                email,
                phone,
                password: SecretString::from(password),
                confirm_password: SecretString::from(confirm),
            };
            commands::auth::register(&client, &mut out, &form).await?;
        }
        Commands::Logout => commands::auth::logout(&client, &mut out).await?,
        Commands::Profile => commands::auth::profile(&client, &mut out).await?,
        Commands::Restaurants {
            category,
            search,
            sort,
        } => commands::restaurants::list(&client, &mut out, category, search, sort).await?,
        Commands::Cart { action } => match action {
            CartAction::Add { ids } => commands::cart::add(&client, &mut out, ids).await?,
        },
    }
    Ok(())
}
