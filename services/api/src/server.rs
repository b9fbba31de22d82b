use crate::cli::ServeArgs;
use crate::infra::{demo_board, AppState};
use crate::routes::with_board_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use jobboard::board::postgres::{connect, run_migrations};
use jobboard::board::{
    BoardServiceError, EmployerMailer, EmployerNotifier, JobBoardRepository, JobBoardService,
    PgJobBoard,
};
use jobboard::config::{AppConfig, ConfigError};
use jobboard::error::AppError;
use jobboard::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let mailer = Arc::new(EmployerMailer::from_config(&config.mail)?);
    if matches!(mailer.as_ref(), EmployerMailer::Log { .. }) {
        warn!("APP_SMTP_HOST not set, employer notifications are logged instead of sent");
    }

    match &config.database {
        Some(database) => {
            let pool = connect(database).await?;
            let repository = Arc::new(PgJobBoard::new(pool));
            serve(&config, JobBoardService::new(repository, mailer)).await
        }
        None => {
            warn!("APP_DATABASE_URL not set, serving the seeded in-memory board");
            let repository = Arc::new(demo_board().map_err(BoardServiceError::from)?);
            serve(&config, JobBoardService::new(repository, mailer)).await
        }
    }
}

async fn serve<R, N>(config: &AppConfig, service: JobBoardService<R, N>) -> Result<(), AppError>
where
    R: JobBoardRepository + 'static,
    N: EmployerNotifier + 'static,
{
    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let app = with_board_routes(Arc::new(service))
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "job board ready");

    axum::serve(listener, app).await?;
    Ok(())
}

pub(crate) async fn migrate() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let database = config
        .database
        .as_ref()
        .ok_or(ConfigError::MissingDatabaseUrl)?;
    let pool = connect(database).await?;
    run_migrations(&pool).await?;

    info!("database migrations applied");
    Ok(())
}
