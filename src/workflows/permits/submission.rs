use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::domain::PermitApplication;

/// Error from the outbound submission transport. Surfaces to callers as a
/// rejected outcome, never a crash; the application stays `Ready` so the
/// caller may retry.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("submission transport failed: {0}")]
    Failed(String),
}

/// Single outbound call used by the API submission path. Returns the
/// jurisdiction's receipt token on success.
pub trait SubmissionTransport: Send + Sync {
    fn submit(
        &self,
        endpoint: &str,
        application: &PermitApplication,
    ) -> Result<String, TransportError>;
}

/// Transport used in dev and demo environments: accepts everything and
/// issues a sequential receipt.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptingTransport;

impl SubmissionTransport for AcceptingTransport {
    fn submit(
        &self,
        _endpoint: &str,
        application: &PermitApplication,
    ) -> Result<String, TransportError> {
        Ok(format!("{}-{}", application.permit_type, next_confirmation_serial()))
    }
}

static CONFIRMATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

pub(crate) fn next_confirmation_serial() -> String {
    let id = CONFIRMATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    format!("{id:08}")
}

pub(crate) fn api_confirmation(receipt: &str) -> String {
    format!("API-{receipt}")
}

pub(crate) fn manual_confirmation() -> String {
    format!("MANUAL-{}", next_confirmation_serial())
}

/// Advisory attached to successful manual-path submissions. Informational,
/// not a failure: the local transition has already happened.
pub(crate) const MANUAL_ADVISORY: &str =
    "Jurisdiction requires manual submission; deliver the permit package to the counter or portal";

pub(crate) const NOT_READY_REASON: &str = "Application not ready for submission";
pub(crate) const FEES_UNPAID_REASON: &str = "Fees not paid";
pub(crate) const JURISDICTION_GONE_REASON: &str = "Jurisdiction not found";

/// Outcome of a submission attempt. Business rejections are values, not
/// errors; "succeeded with a caveat" and "failed" are distinct arms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Accepted {
        confirmation: String,
        advisory: Option<String>,
    },
    Rejected {
        reason: String,
    },
}

impl SubmissionOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SubmissionOutcome::Accepted { .. })
    }

    pub fn view(&self) -> SubmissionResultView {
        match self {
            SubmissionOutcome::Accepted {
                confirmation,
                advisory,
            } => SubmissionResultView {
                success: true,
                confirmation_number: Some(confirmation.clone()),
                error: advisory.clone(),
            },
            SubmissionOutcome::Rejected { reason } => SubmissionResultView {
                success: false,
                confirmation_number: None,
                error: Some(reason.clone()),
            },
        }
    }
}

/// Wire shape exposed to callers: `error` doubles as the advisory string on
/// successful manual submissions, which is intentional and load-bearing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionResultView {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmation_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
