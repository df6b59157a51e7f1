mod api;
mod auth;
mod commands;
mod config;
mod db;
mod models;
mod schema;
mod store;

use anyhow::Context;
use axum::extract::{FromRef, MatchedPath};
use axum::http::Request;
use axum::Router;
use clap::{Parser, Subcommand};
use foodgram_core::ShortLinkCodec;
use opentelemetry::trace::TracerProvider;
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::logs::SdkLoggerProvider;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::env;
use std::net::{TcpStream, ToSocketAddrs};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::Span;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use utoipa_swagger_ui::SwaggerUi;

/// Application state shared across all handlers. Handlers extract the part
/// they need, e.g. `State<Arc<DbPool>>`.
#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: Arc<db::DbPool>,
    pub config: Arc<config::Config>,
    pub short_links: Arc<ShortLinkCodec>,
}

#[derive(Parser)]
#[command(name = "foodgram-server")]
#[command(about = "Foodgram API server and management commands", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Print the OpenAPI spec as JSON and exit
    Openapi,
    /// Import ingredients from a CSV file with a name,measurement_unit header
    LoadIngredients {
        /// Path to the CSV file
        path: PathBuf,
    },
    /// Delete ingredients not used by any recipe
    DeleteIngredients,
    /// Create a recipe tag
    CreateTag {
        #[arg(long)]
        name: String,
        #[arg(long)]
        slug: String,
    },
    /// Give a user staff rights
    PromoteStaff {
        /// Email of the user to promote
        email: String,
    },
}

/// Initialize telemetry with optional OpenTelemetry export.
/// If OTEL_EXPORTER_OTLP_ENDPOINT is set and reachable, traces are sent to the collector.
/// Otherwise, only console logging is used.
fn init_telemetry() -> anyhow::Result<()> {
    let fmt_layer = tracing_subscriber::fmt::layer();
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    // Check if OTLP endpoint is configured
    let otel_endpoint = env::var("OTEL_EXPORTER_OTLP_ENDPOINT").ok();

    let Some(endpoint) = otel_endpoint else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();

        tracing::debug!("OTEL_EXPORTER_OTLP_ENDPOINT not set, using console logging only");
        return Ok(());
    };

    let host_port = endpoint
        .trim_start_matches("http://")
        .trim_start_matches("https://");

    // Quick TCP check to see if the collector is up (resolve hostname first)
    let is_reachable = host_port
        .to_socket_addrs()
        .ok()
        .and_then(|mut addrs| addrs.next())
        .map(|addr| TcpStream::connect_timeout(&addr, Duration::from_millis(100)).is_ok())
        .unwrap_or(false);

    if !is_reachable {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt_layer)
            .init();

        tracing::info!(
            "OpenTelemetry endpoint {} not reachable, using console logging only",
            endpoint
        );
        return Ok(());
    }

    let service_name =
        env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "foodgram-server".to_string());

    let resource = opentelemetry_sdk::Resource::builder()
        .with_service_name(service_name.clone())
        .build();

    let trace_exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build()
        .context("Failed to create OTLP trace exporter")?;

    let trace_provider = SdkTracerProvider::builder()
        .with_batch_exporter(trace_exporter)
        .with_resource(resource.clone())
        .build();

    let tracer = trace_provider.tracer("foodgram-server");
    opentelemetry::global::set_tracer_provider(trace_provider);

    let otel_trace_layer = tracing_opentelemetry::layer().with_tracer(tracer);

    let log_exporter = opentelemetry_otlp::LogExporter::builder()
        .with_tonic()
        .with_endpoint(&endpoint)
        .build()
        .context("Failed to create OTLP log exporter")?;

    let log_provider = SdkLoggerProvider::builder()
        .with_batch_exporter(log_exporter)
        .with_resource(resource)
        .build();

    let otel_log_layer = OpenTelemetryTracingBridge::new(&log_provider);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .with(otel_trace_layer)
        .with(otel_log_layer)
        .init();

    tracing::info!(
        "OpenTelemetry enabled, exporting traces and logs to {} as {}",
        endpoint,
        service_name
    );
    Ok(())
}

fn app(state: AppState) -> Router {
    let swagger_ui = SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", api::openapi());

    Router::new()
        .merge(api::auth::router())
        .merge(api::users::router())
        .merge(api::tags::router())
        .merge(api::ingredients::router())
        .merge(api::recipes::router())
        .merge(api::short_links::router())
        .merge(api::media::router())
        .merge(swagger_ui)
        .with_state(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let matched_path = request
                        .extensions()
                        .get::<MatchedPath>()
                        .map(MatchedPath::as_str)
                        .unwrap_or(request.uri().path());

                    // Image fetches are noisy; keep them out of the info log
                    if matched_path.starts_with("/media/") {
                        tracing::trace_span!("http_request")
                    } else {
                        tracing::info_span!(
                            "http_request",
                            method = %request.method(),
                            path = %matched_path,
                        )
                    }
                })
                .on_request(|_request: &Request<_>, _span: &Span| {})
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        // Skip logging for noisy endpoints (trace-level spans)
                        if span.metadata().map(|m| m.level()) == Some(&tracing::Level::TRACE) {
                            return;
                        }
                        let status = response.status().as_u16();
                        if status >= 500 {
                            tracing::error!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request failed with server error"
                            );
                        } else {
                            tracing::info!(
                                status = %status,
                                latency_ms = %latency.as_millis(),
                                "request completed"
                            );
                        }
                    },
                )
                .on_failure(
                    |error: tower_http::classify::ServerErrorsFailureClass,
                     latency: std::time::Duration,
                     _span: &Span| {
                        tracing::error!(
                            error = %error,
                            latency_ms = %latency.as_millis(),
                            "request failed"
                        );
                    },
                ),
        )
}

async fn serve(config: config::Config, pool: db::DbPool) -> anyhow::Result<()> {
    let bind_addr = config.bind_addr.clone();
    let public_base_url = config.public_base_url.clone();

    let state = AppState {
        pool: Arc::new(pool),
        short_links: Arc::new(ShortLinkCodec::new(config.short_link_prefix.clone())),
        config: Arc::new(config),
    };

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;

    tracing::info!("Server listening on {}", listener.local_addr()?);
    tracing::info!("Swagger UI available at {}/swagger-ui/", public_base_url);
    tracing::info!("OpenAPI spec available at {}/api-docs/openapi.json", public_base_url);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Serve);

    // Dump the OpenAPI document without touching telemetry or the database
    if let Commands::Openapi = command {
        println!("{}", api::openapi().to_pretty_json()?);
        return Ok(());
    }

    init_telemetry()?;

    let config = config::Config::from_env()?;
    let pool = db::create_pool(&config.database_url)?;

    match command {
        Commands::Serve | Commands::Openapi => serve(config, pool).await?,
        Commands::LoadIngredients { path } => {
            commands::load_ingredients(&pool, &path)?;
        }
        Commands::DeleteIngredients => {
            commands::delete_unused_ingredients(&pool)?;
        }
        Commands::CreateTag { name, slug } => {
            commands::create_tag(&pool, &name, &slug)?;
        }
        Commands::PromoteStaff { email } => commands::promote_staff(&pool, &email)?,
    }

    Ok(())
}
