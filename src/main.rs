use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use tracing::info;
use vigil_trainer::config::AppConfig;
use vigil_trainer::error::AppError;
use vigil_trainer::telemetry;
use vigil_trainer::trainer::{
    trainer_router, MemorySessionStore, ScenarioCatalog, TrainerOptions, TrainerService,
};

#[derive(Clone)]
struct OpsState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Vigil Training Simulator",
    about = "Serve scripted interview training sessions over HTTP",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Work with a scenario catalog without starting the service
    Catalog {
        #[command(subcommand)]
        command: CatalogCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Override the configured scenario catalog path
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum CatalogCommand {
    /// Validate a catalog and print a summary
    Inspect(CatalogInspectArgs),
}

#[derive(Args, Debug)]
struct CatalogInspectArgs {
    /// Scenario catalog path (defaults to the configured one)
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Also list each scenario's script questions and protocols
    #[arg(long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Catalog {
            command: CatalogCommand::Inspect(args),
        } => run_catalog_inspect(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }
    if let Some(catalog) = args.catalog.take() {
        config.trainer.catalog_path = catalog;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = ScenarioCatalog::load_from_path(&config.trainer.catalog_path)?;
    info!(
        scenarios = catalog.len(),
        path = %config.trainer.catalog_path.display(),
        "scenario catalog loaded"
    );

    let options = TrainerOptions {
        policy: config.trainer.policy.clone(),
        reset_conversation_on_switch: config.trainer.reset_conversation_on_switch,
    };
    let service = Arc::new(TrainerService::new(
        Arc::new(catalog),
        Arc::new(MemorySessionStore::default()),
        options,
    ));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let ops_state = OpsState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let ops = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(ops_state);

    let app = trainer_router(service).merge(ops).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "training simulator ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_catalog_inspect(args: CatalogInspectArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let path = args.catalog.unwrap_or(config.trainer.catalog_path);
    let catalog = ScenarioCatalog::load_from_path(&path)?;

    println!("Scenario catalog: {}", path.display());
    println!("Scenarios: {}", catalog.len());

    let protocols = catalog.all_protocols();
    println!("Protocol universe: {} entries", protocols.len());
    for protocol in &protocols {
        println!("- {protocol}");
    }

    println!("\nScenarios by id");
    for scenario in catalog.scenarios() {
        println!(
            "- [{}] {} ({} script entries, {} red flags, {} protocols)",
            scenario.id,
            scenario.name,
            scenario.script.len(),
            scenario.red_flags.len(),
            scenario.required_protocols.len()
        );
        if args.verbose {
            for entry in &scenario.script {
                println!("    Q: {}", entry.question);
            }
            for protocol in &scenario.required_protocols {
                println!("    P: {}", protocol);
            }
        }
    }

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<OpsState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
