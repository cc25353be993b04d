use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::Deserialize;
use serde_json::json;

use super::domain::{ApplicationId, DocumentInput, NewApplication, StampInput};
use super::repository::{ApplicationRepository, NotificationSink, RepositoryError};
use super::service::{PermitService, PermitWorkflowError};
use super::stamp::StampError;
use super::submission::SubmissionTransport;

/// Shared state for the permit endpoints: the service plus the outbound
/// transport used by API-integrated jurisdictions.
pub struct PermitApi<R, N> {
    pub service: Arc<PermitService<R, N>>,
    pub transport: Arc<dyn SubmissionTransport>,
}

impl<R, N> Clone for PermitApi<R, N> {
    fn clone(&self) -> Self {
        Self {
            service: Arc::clone(&self.service),
            transport: Arc::clone(&self.transport),
        }
    }
}

/// Router builder exposing the permit workflow over HTTP.
pub fn permit_router<R, N>(api: PermitApi<R, N>) -> Router
where
    R: ApplicationRepository + 'static,
    N: NotificationSink + 'static,
{
    Router::new()
        .route(
            "/api/v1/permits/jurisdictions",
            get(find_jurisdiction_handler::<R, N>),
        )
        .route(
            "/api/v1/permits/applications",
            post(create_application_handler::<R, N>),
        )
        .route(
            "/api/v1/permits/applications/:application_id",
            get(application_status_handler::<R, N>),
        )
        .route(
            "/api/v1/permits/users/:user_id/applications",
            get(user_applications_handler::<R, N>),
        )
        .route(
            "/api/v1/permits/applications/:application_id/documents",
            post(add_document_handler::<R, N>),
        )
        .route(
            "/api/v1/permits/applications/:application_id/compliance",
            post(run_compliance_handler::<R, N>),
        )
        .route(
            "/api/v1/permits/applications/:application_id/compliance/summary",
            get(compliance_summary_handler::<R, N>),
        )
        .route(
            "/api/v1/permits/applications/:application_id/stamp",
            post(add_stamp_handler::<R, N>),
        )
        .route(
            "/api/v1/permits/applications/:application_id/package",
            post(generate_package_handler::<R, N>),
        )
        .route(
            "/api/v1/permits/applications/:application_id/fees/payment",
            post(mark_paid_handler::<R, N>),
        )
        .route(
            "/api/v1/permits/applications/:application_id/submit",
            post(submit_handler::<R, N>),
        )
        .with_state(api)
}

#[derive(Debug, Deserialize)]
pub(crate) struct JurisdictionQuery {
    address: String,
}

fn error_response(error: PermitWorkflowError) -> Response {
    let status = match &error {
        PermitWorkflowError::JurisdictionNotFound(_)
        | PermitWorkflowError::ApplicationNotFound(_) => StatusCode::NOT_FOUND,
        PermitWorkflowError::Stamp(StampError::LicenseExpired { .. })
        | PermitWorkflowError::Package(_) => StatusCode::UNPROCESSABLE_ENTITY,
        PermitWorkflowError::InvalidTransition { .. } => StatusCode::CONFLICT,
        PermitWorkflowError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        PermitWorkflowError::Repository(_) | PermitWorkflowError::Notification(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    let payload = json!({ "error": error.to_string() });
    (status, axum::Json(payload)).into_response()
}

pub(crate) async fn find_jurisdiction_handler<R, N>(
    State(api): State<PermitApi<R, N>>,
    Query(query): Query<JurisdictionQuery>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSink + 'static,
{
    match api.service.directory().find_by_address(&query.address) {
        Some(jurisdiction) => (StatusCode::OK, axum::Json(jurisdiction.clone())).into_response(),
        None => {
            let payload = json!({ "error": "no registered jurisdiction matches the address" });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
    }
}

pub(crate) async fn create_application_handler<R, N>(
    State(api): State<PermitApi<R, N>>,
    axum::Json(spec): axum::Json<NewApplication>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSink + 'static,
{
    match api.service.create_application(spec) {
        Ok(application) => (StatusCode::CREATED, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn application_status_handler<R, N>(
    State(api): State<PermitApi<R, N>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSink + 'static,
{
    let id = ApplicationId(application_id);
    match api.service.application_status(&id) {
        Ok(Some(application)) => (StatusCode::OK, axum::Json(application)).into_response(),
        Ok(None) => {
            let payload = json!({ "error": format!("application {} not found", id.0) });
            (StatusCode::NOT_FOUND, axum::Json(payload)).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub(crate) async fn user_applications_handler<R, N>(
    State(api): State<PermitApi<R, N>>,
    Path(user_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSink + 'static,
{
    match api.service.user_applications(&user_id) {
        Ok(applications) => (StatusCode::OK, axum::Json(applications)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_document_handler<R, N>(
    State(api): State<PermitApi<R, N>>,
    Path(application_id): Path<String>,
    axum::Json(document): axum::Json<DocumentInput>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSink + 'static,
{
    let id = ApplicationId(application_id);
    match api.service.add_document(&id, document) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn run_compliance_handler<R, N>(
    State(api): State<PermitApi<R, N>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSink + 'static,
{
    let id = ApplicationId(application_id);
    match api.service.run_compliance_checks(&id) {
        Ok(checks) => (StatusCode::OK, axum::Json(checks)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn compliance_summary_handler<R, N>(
    State(api): State<PermitApi<R, N>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSink + 'static,
{
    let id = ApplicationId(application_id);
    match api.service.compliance_summary(&id) {
        Ok(summary) => (StatusCode::OK, axum::Json(summary)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn add_stamp_handler<R, N>(
    State(api): State<PermitApi<R, N>>,
    Path(application_id): Path<String>,
    axum::Json(input): axum::Json<StampInput>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSink + 'static,
{
    let id = ApplicationId(application_id);
    match api.service.add_engineer_stamp(&id, input) {
        // Verification is still pending when this returns; callers poll.
        Ok(application) => (StatusCode::ACCEPTED, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn generate_package_handler<R, N>(
    State(api): State<PermitApi<R, N>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSink + 'static,
{
    let id = ApplicationId(application_id);
    match api.service.generate_permit_package(&id) {
        Ok(package) => (StatusCode::OK, axum::Json(package)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn mark_paid_handler<R, N>(
    State(api): State<PermitApi<R, N>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSink + 'static,
{
    let id = ApplicationId(application_id);
    match api.service.mark_fees_paid(&id) {
        Ok(application) => (StatusCode::OK, axum::Json(application)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<R, N>(
    State(api): State<PermitApi<R, N>>,
    Path(application_id): Path<String>,
) -> Response
where
    R: ApplicationRepository + 'static,
    N: NotificationSink + 'static,
{
    let id = ApplicationId(application_id);
    match api
        .service
        .submit_application(&id, api.transport.as_ref())
    {
        // Business rejections ride a 200: they are outcomes, not HTTP errors.
        Ok(outcome) => (StatusCode::OK, axum::Json(outcome.view())).into_response(),
        Err(error) => error_response(error),
    }
}
