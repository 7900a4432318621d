use crate::cli::ServeArgs;
use crate::infra::AppState;
use crate::routes::{cors_layer, with_property_routes};
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use property_details::config::AppConfig;
use property_details::error::AppError;
use property_details::property::HttpPropertyService;
use property_details::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let service = Arc::new(HttpPropertyService::from_config(&config.upstream)?);

    let app = with_property_routes(service)
        .layer(Extension(app_state))
        .layer(cors_layer(&config.cors))
        .layer(TraceLayer::new_for_http())
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        origins = ?config.cors.allowed_origins,
        "property details service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
