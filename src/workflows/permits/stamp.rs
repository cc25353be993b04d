use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};
use tracing::warn;

use super::domain::{ApplicationId, EngineerDiscipline, EngineerStamp, Signature, StampInput};
use super::repository::ApplicationRepository;

/// Validation errors raised while capturing an engineer stamp.
#[derive(Debug, thiserror::Error)]
pub enum StampError {
    #[error("license {license_number} expired on {expired_on}")]
    LicenseExpired {
        license_number: String,
        expired_on: NaiveDate,
    },
}

/// Boundary to the external licensing authority consulted by the detached
/// verification task. The bundled implementation always approves; the
/// trait allows a negative answer, which simply leaves the stamp
/// unverified (no failure policy is defined upstream).
pub trait LicenseAuthority: Send + Sync {
    fn verify_license(&self, license_number: &str, license_state: &str) -> bool;
}

/// Reference authority: every license checks out.
#[derive(Debug, Default, Clone, Copy)]
pub struct AlwaysApprove;

impl LicenseAuthority for AlwaysApprove {
    fn verify_license(&self, _license_number: &str, _license_state: &str) -> bool {
        true
    }
}

pub(crate) fn certification_statement(discipline: EngineerDiscipline, state: &str) -> String {
    format!(
        "I hereby certify that the plans and specifications herein were prepared by me or \
         under my direct supervision and that I am a duly Licensed {} Engineer under the laws \
         of the State of {}.",
        discipline.display_name(),
        state
    )
}

/// Synchronous portion of stamp capture: reject expired licenses, then
/// build the stored stamp with `verified = false` and a signature block
/// stamped with the current time and submitting IP.
pub fn capture(input: StampInput) -> Result<EngineerStamp, StampError> {
    let today = Utc::now().date_naive();
    if input.license_expiration < today {
        return Err(StampError::LicenseExpired {
            license_number: input.license_number,
            expired_on: input.license_expiration,
        });
    }

    let certification = certification_statement(input.discipline, &input.license_state);

    Ok(EngineerStamp {
        engineer_name: input.engineer_name,
        license_number: input.license_number,
        license_state: input.license_state,
        license_expiration: input.license_expiration,
        discipline: input.discipline,
        signature: Signature {
            kind: input.signature_kind,
            payload: input.signature_payload,
            signed_at: Utc::now(),
            ip_address: input.ip_address,
        },
        certification,
        verified: false,
        verified_at: None,
    })
}

/// Schedules the detached license checks that complete captured stamps.
#[derive(Clone)]
pub struct StampVerifier {
    authority: Arc<dyn LicenseAuthority>,
    delay: Duration,
}

impl StampVerifier {
    pub fn new(authority: Arc<dyn LicenseAuthority>, delay: Duration) -> Self {
        Self { authority, delay }
    }

    /// Fire-and-forget relative to the caller: after a bounded fixed delay
    /// the task consults the authority and, if it approves, writes back
    /// only the verification fields by id. The application's `updated_at`
    /// is not bumped and no notification is emitted; callers poll. Once
    /// scheduled the task is never cancelled.
    pub fn schedule<R>(
        &self,
        repository: Arc<R>,
        application_id: ApplicationId,
        license_number: String,
        license_state: String,
    ) where
        R: ApplicationRepository + 'static,
    {
        let authority = Arc::clone(&self.authority);
        let delay = self.delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if !authority.verify_license(&license_number, &license_state) {
                warn!(
                    application_id = %application_id.0,
                    license_number = %license_number,
                    "licensing authority declined verification"
                );
                return;
            }
            if let Err(err) = repository.confirm_stamp_verification(&application_id, Utc::now()) {
                warn!(
                    application_id = %application_id.0,
                    error = %err,
                    "stamp verification write-back skipped"
                );
            }
        });
    }
}
