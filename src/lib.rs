pub mod api;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod db;
pub mod engine;
pub mod entities;
pub mod models;
pub mod state;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};
pub use config::Config;
use models::reservation::{ListFilter, ReservationStatus};
use models::user::Role;
use state::SharedState;

pub async fn run() -> anyhow::Result<()> {
    let config = Config::load()?;
    config.validate()?;

    init_tracing(&config);

    let cli = Cli::parse();

    match cli.command {
        None | Some(Commands::Daemon) => run_daemon(config).await,
        Some(Commands::Reservations { status }) => cmd_list_reservations(config, status).await,
        Some(Commands::Board { date }) => cmd_board(config, date).await,
        Some(Commands::Users) => cmd_list_users(config).await,
        Some(Commands::AddUser {
            username,
            password,
            role,
        }) => cmd_add_user(config, &username, &password, &role).await,
        Some(Commands::DelUser { username }) => cmd_del_user(config, &username).await,
        Some(Commands::Init) => cmd_init(),
    }
}

fn init_tracing(config: &Config) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.general.log_level));

    let fmt_layer = tracing_subscriber::fmt::layer();

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .init();
}

async fn run_daemon(config: Config) -> anyhow::Result<()> {
    let port = config.server.port;
    let state = api::create_app_state_from_config(config).await?;
    let app = api::router(state);

    let listener = tokio::net::TcpListener::bind((std::net::Ipv4Addr::UNSPECIFIED, port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;

    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .await
        .context("Unexpected error in server")
}

async fn cmd_list_reservations(config: Config, status: Option<String>) -> anyhow::Result<()> {
    let status = match status.as_deref() {
        None => None,
        Some(raw) => Some(
            ReservationStatus::parse(&raw.to_uppercase())
                .with_context(|| format!("Unknown status: {raw}"))?,
        ),
    };

    let shared = SharedState::new(config).await?;
    let filter = ListFilter {
        status,
        ..ListFilter::default()
    };
    let reservations = shared.engine.list(&filter).await?;

    if reservations.is_empty() {
        println!("No reservations.");
        return Ok(());
    }

    for r in reservations {
        println!(
            "#{:<4} {:<10} {:<8} {} -> {}  {}-{}  {}",
            r.id,
            r.requester,
            r.machine_id,
            r.slot.dates.start,
            r.slot.dates.end,
            r.slot.window.start.format("%H:%M"),
            r.slot.window.end.format("%H:%M"),
            r.status
        );
    }

    Ok(())
}

async fn cmd_board(config: Config, date: Option<String>) -> anyhow::Result<()> {
    let as_of = match date {
        Some(raw) => raw
            .parse()
            .with_context(|| format!("Invalid date: {raw}. Expected YYYY-MM-DD"))?,
        None => chrono::Local::now().date_naive(),
    };

    let shared = SharedState::new(config).await?;
    let board = shared.engine.availability(as_of).await?;

    println!("Availability on {as_of}:");
    for (machine_id, availability) in board {
        let spec = shared
            .catalog
            .get(&machine_id)
            .map_or("", |m| m.specification.as_str());
        println!("  {:<8} {:<13} {}", machine_id, availability.as_str(), spec);
    }

    Ok(())
}

async fn cmd_list_users(config: Config) -> anyhow::Result<()> {
    let shared = SharedState::new(config).await?;
    let users = shared.store.list_users().await?;

    for user in users {
        println!("{:<32} {}", user.username, user.role);
    }

    Ok(())
}

async fn cmd_add_user(
    config: Config,
    username: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<()> {
    let role = Role::parse(role).with_context(|| format!("Unknown role: {role}"))?;

    let security = config.security.clone();
    let shared = SharedState::new(config).await?;
    let user = shared
        .store
        .create_user(username, password, role, &security)
        .await?;

    println!("Added {} ({})", user.username, user.role);
    Ok(())
}

async fn cmd_del_user(config: Config, username: &str) -> anyhow::Result<()> {
    let shared = SharedState::new(config).await?;
    shared.store.delete_user(username).await?;

    println!("Removed {username}");
    Ok(())
}

fn cmd_init() -> anyhow::Result<()> {
    if Config::create_default_if_missing()? {
        println!("Created config.toml");
    } else {
        println!("config.toml already exists");
    }
    Ok(())
}
