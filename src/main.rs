use std::{process, sync::Arc};

use chess_stats::{
    application::{
        error::AppError,
        import::ImportService,
        players::PlayerService,
        repos::{PlayersRepo, PlayersWriteRepo},
        stats::StatsService,
    },
    cache::{CacheConfig, SystemClock},
    config,
    infra::{
        db::PostgresRepositories,
        error::InfraError,
        http::{self, ApiKey, ApiState},
        telemetry,
    },
};
use tracing::{Dispatch, Level, dispatcher, error, info};
use tracing_subscriber::fmt as tracing_fmt;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        report_application_error(&error);
        process::exit(1);
    }
}

fn report_application_error(error: &AppError) {
    if dispatcher::has_been_set() {
        error!(error = %error, "application error");
        return;
    }

    let subscriber = tracing_fmt().with_max_level(Level::ERROR).finish();
    let dispatch = Dispatch::new(subscriber);
    dispatcher::with_default(&dispatch, || {
        error!(error = %error, "application error");
    });
}

async fn run() -> Result<(), AppError> {
    let (cli_args, settings) = config::load_with_cli()?;

    let command = cli_args
        .command
        .unwrap_or(config::Command::Serve(Box::<config::ServeArgs>::default()));

    telemetry::init(&settings.logging).map_err(AppError::from)?;

    match command {
        config::Command::Serve(_) => run_serve(settings).await,
        config::Command::Import(args) => run_import(settings, args).await,
        config::Command::Migrate(_) => run_migrate(settings).await,
    }
}

async fn init_repositories(
    settings: &config::Settings,
) -> Result<Arc<PostgresRepositories>, AppError> {
    let database_url = settings
        .database
        .url
        .as_ref()
        .ok_or_else(|| InfraError::configuration("database url is not configured"))
        .map_err(AppError::from)?;

    let pool = PostgresRepositories::connect(database_url, settings.database.max_connections.get())
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    PostgresRepositories::run_migrations(&pool)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    Ok(Arc::new(PostgresRepositories::new(pool)))
}

async fn run_serve(settings: config::Settings) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let players_repo: Arc<dyn PlayersRepo> = repositories.clone();

    let cache_config = CacheConfig::from(&settings.cache);
    let stats = StatsService::from_config(
        players_repo.clone(),
        &cache_config,
        Arc::new(SystemClock),
    );
    let state = ApiState {
        players: Arc::new(PlayerService::new(players_repo)),
        stats: Arc::new(stats),
        api_key: settings.api.key.clone().map(ApiKey::new),
    };

    let router = http::build_router(state, &settings.api.cors_origins);
    let listener = tokio::net::TcpListener::bind(settings.server.addr)
        .await
        .map_err(|err| AppError::from(InfraError::from(err)))?;

    info!(
        target = "chess_stats::serve",
        addr = %settings.server.addr,
        cache_enabled = cache_config.is_enabled(),
        cache_ttl_secs = cache_config.ttl.as_secs(),
        auth = settings.api.key.is_some(),
        "Listening"
    );

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|err| AppError::unexpected(format!("server error: {err}")))?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(
            target = "chess_stats::serve",
            error = %err,
            "Failed to listen for shutdown signal"
        );
        return;
    }
    info!(target = "chess_stats::serve", "Shutting down");
}

async fn run_import(settings: config::Settings, args: config::ImportArgs) -> Result<(), AppError> {
    let repositories = init_repositories(&settings).await?;
    let writer: Arc<dyn PlayersWriteRepo> = repositories;

    let service = ImportService::new(writer, settings.import.batch_size);
    let summary = service
        .import_file(&args.file, args.resolved_format(), args.replace)
        .await?;

    let rendered = serde_json::to_string_pretty(&summary)
        .map_err(|err| AppError::unexpected(format!("failed to render summary: {err}")))?;
    println!("{rendered}");
    Ok(())
}

async fn run_migrate(settings: config::Settings) -> Result<(), AppError> {
    init_repositories(&settings).await?;
    info!(target = "chess_stats::migrate", "Migrations applied");
    Ok(())
}
