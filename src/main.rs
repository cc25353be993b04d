use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use chrono::{Duration as ChronoDuration, Utc};
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use permit_engine::config::AppConfig;
use permit_engine::error::AppError;
use permit_engine::telemetry;
use permit_engine::workflows::permits::{
    permit_router, AcceptingTransport, AlwaysApprove, ApplicantInfo, ApplicationId, DocumentInput,
    EngineerDiscipline, JurisdictionDirectory, JurisdictionId, MemoryRepository, NewApplication,
    PermitApi, PermitService, PermitWorkflowError, ProjectDetails, PropertyInfo, StampInput,
    StampVerifier, SubmissionOutcome, TracingSink,
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Permit Workflow Engine",
    about = "Run the permit workflow engine or walk a demo application through it",
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
    /// Walk a demo building-permit application through the full workflow
    Demo,
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
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
        Command::Demo => run_demo().await,
    }
}

fn build_api(config: &AppConfig) -> PermitApi<MemoryRepository, TracingSink> {
    let directory = Arc::new(JurisdictionDirectory::with_defaults());
    let repository = Arc::new(MemoryRepository::default());
    let notifications = Arc::new(TracingSink);
    let verifier = StampVerifier::new(Arc::new(AlwaysApprove), config.verification.delay());
    let service = Arc::new(PermitService::new(
        directory,
        repository,
        notifications,
        verifier,
    ));
    PermitApi {
        service,
        transport: Arc::new(AcceptingTransport),
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

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let api = build_api(&config);

    let app = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
        .merge(permit_router(api))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "permit workflow engine ready");

    axum::serve(listener, app).await?;
    Ok(())
}

async fn run_demo() -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry).ok();

    let api = build_api(&config);
    let service = &api.service;

    println!("Permit workflow demo");
    println!("====================");
    println!(
        "Registered jurisdictions: {}",
        service.directory().len()
    );

    let jurisdiction = service
        .directory()
        .find_by_address("6800 Comanche Trail, Austin, TX 78732")
        .cloned()
        .ok_or_else(|| {
            AppError::Workflow(PermitWorkflowError::JurisdictionNotFound(
                "austin-city".to_string(),
            ))
        })?;
    println!(
        "Jurisdiction: {} ({} day review)",
        jurisdiction.name, jurisdiction.requirements.estimated_review_days
    );

    let application = service.create_application(NewApplication {
        project_id: "proj-demo-01".to_string(),
        user_id: "user-demo".to_string(),
        jurisdiction_id: JurisdictionId(jurisdiction.id.0.clone()),
        permit_type: "building".to_string(),
        applicant: ApplicantInfo {
            name: "Dana Whitfield".to_string(),
            email: "dana@example.com".to_string(),
            phone: "512-555-0119".to_string(),
        },
        property: PropertyInfo {
            address: "6800 Comanche Trail, Austin, TX 78732".to_string(),
            parcel_number: "0141-2203-0047".to_string(),
            zoning: "R1-D".to_string(),
            lot_size_sqft: 9600,
            existing_structures: vec!["detached garage".to_string()],
        },
        project_details: ProjectDetails {
            description: "Three-story single-family residence".to_string(),
            construction_type: "V-B".to_string(),
            occupancy_type: "R-3".to_string(),
            square_footage: 2400,
            stories: 3,
            estimated_cost: 620_000,
        },
    })?;
    let id = ApplicationId(application.id.0.clone());
    println!(
        "Created {} ({}): permit ${} + plan check ${} = ${}",
        application.id.0,
        application.status.label(),
        application.fees.permit_fee,
        application.fees.plan_check_fee,
        application.fees.total
    );

    service.add_document(
        &id,
        DocumentInput {
            doc_type: "site_plan".to_string(),
            name: "Site plan".to_string(),
            url: "https://uploads.example.com/demo/site-plan.pdf".to_string(),
            required: true,
        },
    )?;

    let checks = service.run_compliance_checks(&id)?;
    println!("Compliance checks: {} recorded", checks.len());
    for check in &checks {
        println!(
            "  [{:?}] {} ({})",
            check.status,
            check.description,
            check.category.label()
        );
    }
    let summary = service.compliance_summary(&id)?;
    println!(
        "Summary: {}/{} passed ({:.0}% pass rate)",
        summary.passed, summary.total, summary.pass_rate
    );

    service.add_engineer_stamp(
        &id,
        StampInput {
            engineer_name: "Priya Raman, PE".to_string(),
            license_number: "TX-88214".to_string(),
            license_state: "Texas".to_string(),
            license_expiration: (Utc::now() + ChronoDuration::days(365)).date_naive(),
            discipline: EngineerDiscipline::Structural,
            signature_kind: "digital".to_string(),
            signature_payload: "sig:demo".to_string(),
            ip_address: "203.0.113.40".to_string(),
        },
    )?;
    println!("Engineer stamp attached (verification pending)");

    tokio::time::sleep(config.verification.delay() + std::time::Duration::from_millis(250)).await;
    let verified = service
        .application_status(&id)?
        .and_then(|application| application.stamp)
        .map(|stamp| stamp.verified)
        .unwrap_or(false);
    println!("License verification complete: verified={verified}");

    let package = service.generate_permit_package(&id)?;
    println!(
        "Package {} generated: {} sheets, {} elevation views",
        package.id.0,
        package.cover_sheet.sheet_index.len(),
        package.drawings.elevations.len()
    );

    service.mark_fees_paid(&id)?;
    match service.submit_application(&id, api.transport.as_ref())? {
        SubmissionOutcome::Accepted {
            confirmation,
            advisory,
        } => {
            println!("Submitted: confirmation {confirmation}");
            if let Some(advisory) = advisory {
                println!("Advisory: {advisory}");
            }
        }
        SubmissionOutcome::Rejected { reason } => println!("Submission rejected: {reason}"),
    }

    let final_state = service.application_status(&id)?.ok_or_else(|| {
        AppError::Workflow(PermitWorkflowError::ApplicationNotFound(id.0.clone()))
    })?;
    println!("Final status: {}", final_state.status.label());

    Ok(())
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
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

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
