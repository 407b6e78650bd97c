use anyhow::{Context, Result};
use clap::{Arg, ArgAction};
use nexgo_seeder::{
    backend::SupabaseBackend,
    config::{fixtures::FixtureSet, Settings},
    create_router, AppState,
};
use std::{net::SocketAddr, path::PathBuf, sync::Arc};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nexgo_seeder=info,tower_http=info")),
        )
        .init();

    // Env vars can also be set externally
    dotenvy::dotenv().ok();

    let matches = clap::Command::new("nexgo-seeder")
        .about("Seeds test accounts, a vendor store and a student balance into a Supabase project")
        .arg(
            Arg::new("fixtures")
                .short('f')
                .long("fixtures")
                .value_name("FIXTURES")
                .help("Path to a YAML file with fixture data (defaults to the bundled set)"),
        )
        .arg(
            Arg::new("bind")
                .short('b')
                .long("bind")
                .value_name("ADDR")
                .help("Address to listen on, overrides SEEDER_BIND"),
        )
        .arg(
            Arg::new("once")
                .long("once")
                .action(ArgAction::SetTrue)
                .help("Run one seeding pass, print the report and exit"),
        )
        .get_matches();

    let mut settings = Settings::from_env()?;
    if let Some(bind) = matches.get_one::<String>("bind") {
        settings.bind_addr = bind
            .parse::<SocketAddr>()
            .with_context(|| format!("Invalid bind address: {}", bind))?;
    }

    let fixtures_path = matches.get_one::<String>("fixtures").map(PathBuf::from);
    let fixtures = FixtureSet::load(fixtures_path.as_deref())?;
    info!(
        identities = fixtures.identities.len(),
        catalog_items = fixtures.catalog.len(),
        "Loaded fixtures"
    );

    let backend = SupabaseBackend::new(&settings).context("Failed to build HTTP client")?;
    let state = Arc::new(AppState::new(Arc::new(backend), fixtures));

    if matches.get_flag("once") {
        let report = state
            .seed_service
            .run()
            .await
            .context("Seeding run failed")?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    let listener = tokio::net::TcpListener::bind(settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", settings.bind_addr))?;
    info!("Seeder listening on {}", settings.bind_addr);

    axum::serve(listener, create_router(state))
        .await
        .context("Server error")?;

    Ok(())
}
