use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use super::compliance::{self, ComplianceSummary};
use super::directory::JurisdictionDirectory;
use super::domain::{
    ApplicationId, ApplicationStatus, ComplianceCheck, Document, DocumentInput, NewApplication,
    PermitApplication, StampInput,
};
use super::fees;
use super::package::{self, PackageError, PermitPackage};
use super::repository::{
    ApplicationRepository, NotificationError, NotificationSink, PermitEvent, RepositoryError,
};
use super::stamp::{self, StampError, StampVerifier};
use super::submission::{
    api_confirmation, manual_confirmation, SubmissionOutcome, SubmissionTransport,
    FEES_UNPAID_REASON, JURISDICTION_GONE_REASON, MANUAL_ADVISORY, NOT_READY_REASON,
};

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    let id = APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    ApplicationId(format!("permit-{id:06}"))
}

/// Hard failures raised by the permit workflow. Business rejections from
/// submission are not here; they come back as [`SubmissionOutcome`] values.
#[derive(Debug, thiserror::Error)]
pub enum PermitWorkflowError {
    #[error("jurisdiction {0} is not registered")]
    JurisdictionNotFound(String),
    #[error("application {0} not found")]
    ApplicationNotFound(String),
    #[error(transparent)]
    Stamp(#[from] StampError),
    #[error(transparent)]
    Package(#[from] PackageError),
    #[error("cannot move application from {from} to {to}")]
    InvalidTransition {
        from: &'static str,
        to: &'static str,
    },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Notification(#[from] NotificationError),
}

/// Review outcome handed down by the surrounding system. The core accepts
/// and preserves these states; it never drives them itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewDecision {
    UnderReview,
    Approved,
    Rejected { reason: String },
    Resubmit,
}

impl ReviewDecision {
    fn status(&self) -> ApplicationStatus {
        match self {
            ReviewDecision::UnderReview => ApplicationStatus::UnderReview,
            ReviewDecision::Approved => ApplicationStatus::Approved,
            ReviewDecision::Rejected { .. } => ApplicationStatus::Rejected,
            ReviewDecision::Resubmit => ApplicationStatus::Resubmit,
        }
    }
}

/// Coordination hub owning the application state machine. Composes the
/// jurisdiction directory, fee quoting, the compliance rule set, the stamp
/// verifier, the package assembler, and the submission router.
pub struct PermitService<R, N> {
    directory: Arc<JurisdictionDirectory>,
    repository: Arc<R>,
    notifications: Arc<N>,
    verifier: StampVerifier,
}

impl<R, N> PermitService<R, N>
where
    R: ApplicationRepository + 'static,
    N: NotificationSink + 'static,
{
    pub fn new(
        directory: Arc<JurisdictionDirectory>,
        repository: Arc<R>,
        notifications: Arc<N>,
        verifier: StampVerifier,
    ) -> Self {
        Self {
            directory,
            repository,
            notifications,
            verifier,
        }
    }

    pub fn directory(&self) -> &JurisdictionDirectory {
        &self.directory
    }

    /// Open a new application in `Draft`, quoting fees from the resolved
    /// jurisdiction's schedule.
    pub fn create_application(
        &self,
        spec: NewApplication,
    ) -> Result<PermitApplication, PermitWorkflowError> {
        let jurisdiction = self
            .directory
            .get(&spec.jurisdiction_id)
            .ok_or_else(|| PermitWorkflowError::JurisdictionNotFound(spec.jurisdiction_id.0.clone()))?;

        let fees = fees::quote(jurisdiction, &spec.permit_type);
        let now = Utc::now();
        let application = PermitApplication {
            id: next_application_id(),
            project_id: spec.project_id,
            user_id: spec.user_id,
            jurisdiction_id: spec.jurisdiction_id,
            permit_type: spec.permit_type,
            status: ApplicationStatus::Draft,
            applicant: spec.applicant,
            property: spec.property,
            project_details: spec.project_details,
            documents: Vec::new(),
            stamp: None,
            compliance_checks: Vec::new(),
            fees,
            created_at: now,
            updated_at: now,
            submitted_at: None,
            review_started_at: None,
            approved_at: None,
            rejected_at: None,
            rejection_reason: None,
        };

        let stored = self.repository.insert(application)?;
        self.notify(
            "application_created",
            &stored.id,
            [
                ("permit_type", stored.permit_type.clone()),
                ("jurisdiction", stored.jurisdiction_id.0.clone()),
            ],
        )?;
        info!(application_id = %stored.id.0, permit_type = %stored.permit_type, "application created");
        Ok(stored)
    }

    /// Append a document with an upload timestamp assigned at attachment.
    pub fn add_document(
        &self,
        application_id: &ApplicationId,
        input: DocumentInput,
    ) -> Result<PermitApplication, PermitWorkflowError> {
        let mut application = self.require(application_id)?;
        let document = Document {
            doc_type: input.doc_type,
            name: input.name.clone(),
            url: input.url,
            required: input.required,
            uploaded_at: Utc::now(),
        };
        application.documents.push(document);
        application.updated_at = Utc::now();
        self.repository.update(application.clone())?;
        self.notify(
            "document_added",
            application_id,
            [("document", input.name)],
        )?;
        Ok(application)
    }

    /// Read-only status query. Missing ids are `None`, not an error.
    pub fn application_status(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<PermitApplication>, PermitWorkflowError> {
        Ok(self.repository.fetch(application_id)?)
    }

    /// All of a user's applications, newest created first.
    pub fn user_applications(
        &self,
        user_id: &str,
    ) -> Result<Vec<PermitApplication>, PermitWorkflowError> {
        Ok(self.repository.for_user(user_id)?)
    }

    /// Evaluate the fixed rule set and replace the stored check list
    /// wholesale with the fresh results.
    pub fn run_compliance_checks(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Vec<ComplianceCheck>, PermitWorkflowError> {
        let mut application = self.require(application_id)?;
        let checks = compliance::evaluate(&application);
        application.compliance_checks = checks.clone();
        application.updated_at = Utc::now();
        self.repository.update(application)?;
        self.notify(
            "compliance_checks_complete",
            application_id,
            [("checks", checks.len().to_string())],
        )?;
        Ok(checks)
    }

    /// Aggregate over the currently stored check list; does not re-run.
    pub fn compliance_summary(
        &self,
        application_id: &ApplicationId,
    ) -> Result<ComplianceSummary, PermitWorkflowError> {
        let application = self.require(application_id)?;
        Ok(compliance::summarize(&application.compliance_checks))
    }

    /// Capture an engineer stamp and schedule the detached license check.
    /// An expired license rejects synchronously and attaches nothing; a
    /// later valid call replaces any prior stamp entirely.
    pub fn add_engineer_stamp(
        &self,
        application_id: &ApplicationId,
        input: StampInput,
    ) -> Result<PermitApplication, PermitWorkflowError> {
        let mut application = self.require(application_id)?;
        let stamp = stamp::capture(input)?;
        let license_number = stamp.license_number.clone();
        let license_state = stamp.license_state.clone();
        application.stamp = Some(stamp);
        application.updated_at = Utc::now();
        self.repository.update(application.clone())?;
        self.notify(
            "engineer_stamp_added",
            application_id,
            [("license", license_number.clone())],
        )?;

        self.verifier.schedule(
            Arc::clone(&self.repository),
            application_id.clone(),
            license_number,
            license_state,
        );
        Ok(application)
    }

    /// Assemble the permit package behind its two gates (stamp first, then
    /// compliance) and move the application to `Ready`. Regeneration after
    /// submission reprints the package without touching the status, which
    /// only ever advances.
    pub fn generate_permit_package(
        &self,
        application_id: &ApplicationId,
    ) -> Result<PermitPackage, PermitWorkflowError> {
        let mut application = self.require(application_id)?;
        let package = package::assemble(&application)?;
        if application.status.rank() < ApplicationStatus::Ready.rank() {
            application.status = ApplicationStatus::Ready;
        }
        application.updated_at = Utc::now();
        self.repository.update(application)?;
        self.notify(
            "package_generated",
            application_id,
            [("package", package.id.0.clone())],
        )?;
        info!(application_id = %application_id.0, package_id = %package.id.0, "permit package generated");
        Ok(package)
    }

    /// Record the fee payment the submission gate requires.
    pub fn mark_fees_paid(
        &self,
        application_id: &ApplicationId,
    ) -> Result<PermitApplication, PermitWorkflowError> {
        let mut application = self.require(application_id)?;
        application.fees.paid = true;
        application.fees.paid_at = Some(Utc::now());
        application.updated_at = Utc::now();
        self.repository.update(application.clone())?;
        Ok(application)
    }

    /// Route the submission by jurisdiction capability. Gate failures and
    /// transport failures come back as `Rejected` values; only an unknown
    /// application id raises an error. A transport failure leaves the
    /// application `Ready`, so the caller may retry without limit.
    pub fn submit_application<T>(
        &self,
        application_id: &ApplicationId,
        transport: &T,
    ) -> Result<SubmissionOutcome, PermitWorkflowError>
    where
        T: SubmissionTransport + ?Sized,
    {
        let mut application = self.require(application_id)?;

        if application.status != ApplicationStatus::Ready {
            return Ok(SubmissionOutcome::Rejected {
                reason: NOT_READY_REASON.to_string(),
            });
        }
        if !application.fees.paid {
            return Ok(SubmissionOutcome::Rejected {
                reason: FEES_UNPAID_REASON.to_string(),
            });
        }
        let Some(jurisdiction) = self.directory.get(&application.jurisdiction_id) else {
            return Ok(SubmissionOutcome::Rejected {
                reason: JURISDICTION_GONE_REASON.to_string(),
            });
        };

        let endpoint = jurisdiction
            .api_endpoint
            .as_deref()
            .filter(|_| jurisdiction.api_integration);

        let (confirmation, advisory) = match endpoint {
            Some(endpoint) => match transport.submit(endpoint, &application) {
                Ok(receipt) => (api_confirmation(&receipt), None),
                Err(err) => {
                    return Ok(SubmissionOutcome::Rejected {
                        reason: err.to_string(),
                    })
                }
            },
            None => (manual_confirmation(), Some(MANUAL_ADVISORY.to_string())),
        };

        let now = Utc::now();
        application.status = ApplicationStatus::Submitted;
        application.submitted_at = Some(now);
        application.updated_at = now;
        self.repository.update(application)?;
        info!(
            application_id = %application_id.0,
            confirmation = %confirmation,
            manual = advisory.is_some(),
            "application submitted"
        );

        Ok(SubmissionOutcome::Accepted {
            confirmation,
            advisory,
        })
    }

    /// Accept a review outcome from the surrounding system. Requires the
    /// application to have been submitted and refuses to move backwards.
    pub fn record_review_decision(
        &self,
        application_id: &ApplicationId,
        decision: ReviewDecision,
    ) -> Result<PermitApplication, PermitWorkflowError> {
        let mut application = self.require(application_id)?;
        let next = decision.status();
        if application.status.rank() < ApplicationStatus::Submitted.rank()
            || next.rank() <= application.status.rank()
        {
            return Err(PermitWorkflowError::InvalidTransition {
                from: application.status.label(),
                to: next.label(),
            });
        }

        let now = Utc::now();
        match decision {
            ReviewDecision::UnderReview => application.review_started_at = Some(now),
            ReviewDecision::Approved => application.approved_at = Some(now),
            ReviewDecision::Rejected { reason } => {
                application.rejected_at = Some(now);
                application.rejection_reason = Some(reason);
            }
            ReviewDecision::Resubmit => {}
        }
        application.status = next;
        application.updated_at = now;
        self.repository.update(application.clone())?;
        Ok(application)
    }

    fn require(
        &self,
        application_id: &ApplicationId,
    ) -> Result<PermitApplication, PermitWorkflowError> {
        self.repository
            .fetch(application_id)?
            .ok_or_else(|| PermitWorkflowError::ApplicationNotFound(application_id.0.clone()))
    }

    fn notify<const K: usize>(
        &self,
        template: &str,
        application_id: &ApplicationId,
        details: [(&str, String); K],
    ) -> Result<(), PermitWorkflowError> {
        let details: BTreeMap<String, String> = details
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect();
        self.notifications.publish(PermitEvent {
            template: template.to_string(),
            application_id: application_id.clone(),
            details,
        })?;
        Ok(())
    }
}
