use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use clap::{Parser, Subcommand};
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use sea_orm::Database;
use tower_http::cors::CorsLayer;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use shareplate::config::AppConfig;
use shareplate::domain::ports::{ImageStore, MailSender};
use shareplate::domain::repo::{
    ListingRepository, OtpRepository, ReservationRepository, UserRepository,
};
use shareplate::domain::{ListingService, ReservationCoordinator, UserDirectory};
use shareplate::infra::mail::{ConsoleMailer, SmtpMailer};
use shareplate::infra::object_store::{InMemoryImageStore, S3ImageStore};
use shareplate::infra::storage::{
    InMemoryStore, SeaOrmListingRepository, SeaOrmOtpRepository, SeaOrmReservationRepository,
    SeaOrmUserRepository,
};
use shareplate::security::TokenSigner;
use shareplate::state::AppState;
use shareplate::sweeper::ExpirySweeper;

/// SharePlate Server - food donation marketplace backend
#[derive(Parser)]
#[command(name = "shareplate-server")]
#[command(about = "SharePlate Server - food donation marketplace backend")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port override for the HTTP server (overrides config)
    #[arg(short, long)]
    port: Option<u16>,

    /// Print effective configuration (JSON) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Use in-memory storage, console mail and in-memory image store
    #[arg(long)]
    mock: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the server
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(ref path) = cli.config {
        if !Path::new(path).is_file() {
            anyhow::bail!("config file does not exist: {}", path.to_string_lossy());
        }
    }

    // Layered config: defaults -> YAML (if provided) -> env (SHAREPLATE__*)
    // -> CLI overrides.
    let mut config = load_config(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.bind_addr = override_port(&config.server.bind_addr, port)?;
    }

    init_tracing(cli.verbose);

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_server(config, cli.mock).await,
        Commands::Check => {
            println!("Configuration is valid");
            println!("{}", serde_json::to_string_pretty(&config)?);
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));
    if let Some(path) = path {
        figment = figment.merge(Yaml::file(path));
    }
    figment = figment.merge(Env::prefixed("SHAREPLATE__").split("__"));
    figment.extract().context("invalid configuration")
}

fn override_port(bind_addr: &str, port: u16) -> Result<String> {
    let host = bind_addr
        .rsplit_once(':')
        .map_or(bind_addr, |(host, _)| host);
    Ok(format!("{host}:{port}"))
}

fn init_tracing(verbosity: u8) {
    let default = match verbosity {
        0 => "shareplate=info,shareplate_server=info,tower_http=warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

struct Repositories {
    users: Arc<dyn UserRepository>,
    listings: Arc<dyn ListingRepository>,
    reservations: Arc<dyn ReservationRepository>,
    otps: Arc<dyn OtpRepository>,
}

async fn connect_repositories(config: &AppConfig, mock: bool) -> Result<Repositories> {
    if mock {
        tracing::info!("mock mode: using in-memory storage");
        let store = Arc::new(InMemoryStore::new());
        return Ok(Repositories {
            users: store.clone(),
            listings: store.clone(),
            reservations: store.clone(),
            otps: store,
        });
    }

    let db = Database::connect(&config.database.url)
        .await
        .context("database connection failed")?;
    shareplate::infra::storage::run_migrations(&db)
        .await
        .context("migration failed")?;
    tracing::info!(url = %config.database.url, "database ready");

    Ok(Repositories {
        users: Arc::new(SeaOrmUserRepository::new(db.clone())),
        listings: Arc::new(SeaOrmListingRepository::new(db.clone())),
        reservations: Arc::new(SeaOrmReservationRepository::new(db.clone())),
        otps: Arc::new(SeaOrmOtpRepository::new(db)),
    })
}

fn build_mailer(config: &AppConfig, mock: bool) -> Result<Arc<dyn MailSender>> {
    if mock || config.mail.smtp_host.is_empty() {
        tracing::info!("no SMTP host configured, using console mailer");
        return Ok(Arc::new(ConsoleMailer));
    }
    Ok(Arc::new(SmtpMailer::new(&config.mail)?))
}

fn build_image_store(config: &AppConfig, mock: bool) -> Arc<dyn ImageStore> {
    if mock || config.images.endpoint.is_empty() {
        tracing::info!("no object storage endpoint configured, using in-memory image store");
        return Arc::new(InMemoryImageStore::new());
    }
    Arc::new(S3ImageStore::new(&config.images))
}

fn build_cors(config: &AppConfig) -> Result<CorsLayer> {
    let origins = config
        .cors
        .allowed_origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .with_context(|| format!("invalid CORS origin: {origin}"))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_origin(origins)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]))
}

async fn run_server(config: AppConfig, mock: bool) -> Result<()> {
    let repos = connect_repositories(&config, mock).await?;
    let mailer = build_mailer(&config, mock)?;
    let images = build_image_store(&config, mock);

    let signer = Arc::new(TokenSigner::new(
        &config.auth.jwt_secret,
        config.auth.token_ttl_hours,
    ));
    let users = Arc::new(UserDirectory::new(
        repos.users.clone(),
        repos.otps,
        mailer,
        config.otp.ttl_minutes,
    ));
    let listings = Arc::new(ListingService::new(repos.listings.clone()));
    let reservations = Arc::new(ReservationCoordinator::new(
        repos.reservations,
        repos.listings,
        repos.users,
    ));

    let state = AppState {
        users,
        listings: listings.clone(),
        reservations,
        images,
        signer,
    };

    let sweeper = ExpirySweeper::new(
        listings,
        std::time::Duration::from_secs(config.sweeper.interval_secs),
    )
    .spawn();

    let app = shareplate::api::rest::router(state)
        .layer(TraceLayer::new_for_http())
        .layer(build_cors(&config)?)
        .layer(RequestBodyLimitLayer::new(config.server.max_body_bytes));

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("cannot bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "SharePlate server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.shutdown().await;
    tracing::info!("shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
    }
}
