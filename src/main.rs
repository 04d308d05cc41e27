mod config;
mod delivery;
mod domain;
mod repository;
mod telemetry;
mod usecase;

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    extract::State,
    middleware,
    routing::{delete, get, patch, post},
};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::delivery::http::v1::middleware::auth_middleware;
use crate::delivery::http::v1::notifications::{
    clear_notifications, create_notification, list_notifications, mark_notifications_read,
};
use crate::delivery::http::v1::orders::{
    create_order, delete_order, get_order, list_orders, list_staff_orders, update_order,
    update_order_status,
};
use crate::delivery::http::v1::products::{adjust_stock, get_product, list_products};
use crate::delivery::http::v1::settings::{get_settings, reset_settings, update_settings};
use crate::delivery::http::v1::users::{create_user, delete_user, get_user, list_users, update_user};
use crate::repository::postgres::{
    PostgresNotificationRepository, PostgresOrderRepository, PostgresProductRepository,
    PostgresSettingsRepository, PostgresUserRepository, create_pool,
};
use crate::usecase::jwt::JwtService;
use crate::usecase::notifications::NotificationsUseCase;
use crate::usecase::orders::OrdersUseCase;
use crate::usecase::products::ProductsUseCase;
use crate::usecase::settings::SettingsUseCase;
use crate::usecase::users::UsersUseCase;

pub struct AppState {
    pub notifications_usecase:
        NotificationsUseCase<PostgresNotificationRepository, PostgresUserRepository>,
    pub users_usecase: UsersUseCase<PostgresUserRepository>,
    pub orders_usecase: OrdersUseCase<PostgresOrderRepository>,
    pub products_usecase: ProductsUseCase<PostgresProductRepository>,
    pub settings_usecase: SettingsUseCase<PostgresSettingsRepository>,
    pub jwt_service: JwtService,
    pub metrics_handle: PrometheusHandle,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = config::AppConfig::from_env();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    // Initialize tracing subscriber with optional OpenTelemetry layer
    if config.telemetry_enabled {
        let telemetry_config = telemetry::TelemetryConfig {
            service_name: config.telemetry_service_name.clone(),
            service_version: config.telemetry_service_version.clone(),
            environment: config.telemetry_environment.clone(),
            otlp_endpoint: config.telemetry_otlp_endpoint.clone(),
        };

        telemetry::init_telemetry_with_subscriber(&telemetry_config, env_filter)
            .expect("failed to initialize telemetry");
    } else {
        telemetry::init_subscriber_without_telemetry(env_filter);
    }

    tracing::info!("starting the inventory service");

    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");
    metrics_process::Collector::default().describe();
    tracing::info!("prometheus metrics initialized");

    tracing::info!("config loaded, telemetry_enabled={}", config.telemetry_enabled);

    let pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .expect("failed to create database pool");
    tracing::info!("database pool created");

    sqlx::migrate!().run(&pool).await?;
    tracing::info!("database migrations applied");

    let jwt_service = JwtService::new(config.jwt_secret);

    let shared_state = Arc::new(AppState {
        notifications_usecase: NotificationsUseCase::new(
            PostgresNotificationRepository::new(pool.clone()),
            PostgresUserRepository::new(pool.clone()),
        ),
        users_usecase: UsersUseCase::new(PostgresUserRepository::new(pool.clone())),
        orders_usecase: OrdersUseCase::new(PostgresOrderRepository::new(pool.clone())),
        products_usecase: ProductsUseCase::new(PostgresProductRepository::new(pool.clone())),
        settings_usecase: SettingsUseCase::new(PostgresSettingsRepository::new(pool)),
        jwt_service,
        metrics_handle,
    });

    // Time-based retention: periodically delete notifications older than the
    // configured window, read or not.
    let purge_state = shared_state.clone();
    let retention_days = config.notification_retention_days;
    let purge_interval = Duration::from_secs(config.notification_purge_interval_secs);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(purge_interval);
        loop {
            interval.tick().await;
            let cutoff = chrono::Utc::now() - chrono::Duration::days(retention_days);
            if let Err(e) = purge_state.notifications_usecase.purge_expired(cutoff).await {
                tracing::error!(error = %e, "notification purge failed");
            }
        }
    });

    // All routes require authentication
    let api = Router::new()
        .route(
            "/api/v1/notifications",
            get(list_notifications).post(create_notification),
        )
        .route("/api/v1/notifications/read", patch(mark_notifications_read))
        .route("/api/v1/notifications/clear", delete(clear_notifications))
        .route("/api/v1/orders", get(list_orders).post(create_order))
        .route(
            "/api/v1/orders/{id}",
            get(get_order).put(update_order).delete(delete_order),
        )
        .route("/api/v1/orders/{id}/status", post(update_order_status))
        .route("/api/v1/orders/staff/{staff_id}", get(list_staff_orders))
        .route("/api/v1/products", get(list_products))
        .route("/api/v1/products/{id}", get(get_product))
        .route("/api/v1/products/{id}/stock", patch(adjust_stock))
        .route("/api/v1/users", get(list_users).post(create_user))
        .route(
            "/api/v1/users/{id}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route("/api/v1/settings", get(get_settings).put(update_settings))
        .route("/api/v1/settings/reset", post(reset_settings))
        .layer(middleware::from_fn_with_state(
            shared_state.clone(),
            auth_middleware,
        ));

    let router = Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .merge(api)
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state);

    let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await?;
    tracing::info!("inventory service running on 0.0.0.0:8080");
    axum::serve(listener, router).await?;

    // Shutdown telemetry on exit
    if config.telemetry_enabled {
        telemetry::shutdown_telemetry();
    }

    Ok(())
}

async fn metrics(State(state): State<Arc<AppState>>) -> String {
    metrics_process::Collector::default().collect();
    state.metrics_handle.render()
}

#[tracing::instrument]
async fn healthz() -> &'static str {
    "OK"
}
