//! sessiongate command-line client
//!
//! Drives the session library the way a single-page app would: restore the
//! token at startup, then log in, register, log out, inspect the current user
//! or ask the navigation guard about a route.

mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use cli::{apply_cli, Cli, Commands};
use sessiongate::auth::{
    FileTokenStorage, HttpAuthGateway, LoginPayload, NavigationGuard, NavigationIntent,
    RegisterPayload, RouteTable, SessionStore, LOGIN_FAILED, REGISTRATION_FAILED,
};
use sessiongate::config::Config;
use tracing_subscriber::EnvFilter;

type Store = SessionStore<HttpAuthGateway, FileTokenStorage>;

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::from_env().context("Error loading configuration")?;
    let config = apply_cli(&cli, config);

    let gateway =
        HttpAuthGateway::with_options(&config.api_url, config.endpoints.clone(), config.timeout())
            .context("Failed to create HTTP client")?;
    let storage = FileTokenStorage::new(&config.token_path);
    let store = SessionStore::new(gateway, storage).context("Failed to read stored session")?;

    match cli.command {
        Commands::Login { email, password } => {
            let payload = LoginPayload { email, password };
            if let Err(e) = store.login(&payload).await {
                bail!(e.reason(LOGIN_FAILED));
            }
            print_signed_in(&store);
        }
        Commands::Register {
            username,
            email,
            password,
        } => {
            let payload = RegisterPayload {
                username,
                email,
                password,
            };
            if let Err(e) = store.register(&payload).await {
                bail!(e.reason(REGISTRATION_FAILED));
            }
            print_signed_in(&store);
        }
        Commands::Logout => {
            store.logout();
            println!("Logged out");
        }
        Commands::Whoami => whoami(&store).await?,
        Commands::Navigate { path } => navigate(&store, &path).await?,
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_signed_in(store: &Store) {
    match store.user() {
        Some(user) => println!("Logged in as: {} <{}>", user.display_name(), user.email),
        None => println!("Logged in (profile unavailable)"),
    }
}

async fn whoami(store: &Store) -> Result<()> {
    if store.token().is_none() {
        bail!("Not logged in");
    }

    if let Err(e) = store.fetch_current_user().await {
        if e.is_unauthorized() {
            bail!("Session expired, please log in again");
        }
        bail!("Failed to fetch current user: {}", e);
    }

    let Some(user) = store.user() else {
        bail!("Not logged in");
    };
    println!("{} <{}>", user.display_name(), user.email);
    println!("id: {}", user.id);
    println!("username: {}", user.username);
    if !user.groups.is_empty() {
        let groups: Vec<&str> = user.groups.iter().map(|g| g.name.as_str()).collect();
        println!("groups: {}", groups.join(", "));
    }
    if !user.user_permissions.is_empty() {
        let perms: Vec<&str> = user.user_permissions.iter().map(|p| p.name.as_str()).collect();
        println!("permissions: {}", perms.join(", "));
    }
    Ok(())
}

async fn navigate(store: &Store, path: &str) -> Result<()> {
    let routes = RouteTable::with_defaults();
    let Some(route) = routes.resolve(path) else {
        bail!("Unknown route: {}", path);
    };

    let guard = NavigationGuard::default();
    let decision = guard.before_each(store, &NavigationIntent::from(route)).await;
    println!("{}", decision);
    Ok(())
}
