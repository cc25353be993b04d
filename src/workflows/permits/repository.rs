use std::collections::{BTreeMap, HashMap};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::domain::{ApplicationId, PermitApplication};

/// Storage abstraction so the service module can be exercised in isolation.
///
/// `confirm_stamp_verification` exists so the detached license check writes
/// back only the verification fields instead of a whole snapshot, bounding
/// the blast radius of a lost race with a concurrent editor.
pub trait ApplicationRepository: Send + Sync {
    fn insert(&self, application: PermitApplication) -> Result<PermitApplication, RepositoryError>;
    fn update(&self, application: PermitApplication) -> Result<(), RepositoryError>;
    fn fetch(&self, id: &ApplicationId) -> Result<Option<PermitApplication>, RepositoryError>;
    fn for_user(&self, user_id: &str) -> Result<Vec<PermitApplication>, RepositoryError>;

    /// Set `verified = true` and `verified_at` on the stored stamp, touching
    /// nothing else (`updated_at` included). A missing application or stamp
    /// is reported as `NotFound`; the caller is a fire-and-forget task that
    /// ignores it.
    fn confirm_stamp_verification(
        &self,
        id: &ApplicationId,
        verified_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("application already exists")]
    Conflict,
    #[error("application not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// In-process store backing the engine: a mutex-guarded map keyed by
/// application id. Individual operations read, compute, and write back
/// whole records; no cross-operation serialization is promised.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    applications: Mutex<HashMap<String, PermitApplication>>,
}

impl ApplicationRepository for MemoryRepository {
    fn insert(&self, application: PermitApplication) -> Result<PermitApplication, RepositoryError> {
        let mut applications = self
            .applications
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store poisoned".to_string()))?;
        if applications.contains_key(&application.id.0) {
            return Err(RepositoryError::Conflict);
        }
        applications.insert(application.id.0.clone(), application.clone());
        Ok(application)
    }

    fn update(&self, application: PermitApplication) -> Result<(), RepositoryError> {
        let mut applications = self
            .applications
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store poisoned".to_string()))?;
        if !applications.contains_key(&application.id.0) {
            return Err(RepositoryError::NotFound);
        }
        applications.insert(application.id.0.clone(), application);
        Ok(())
    }

    fn fetch(&self, id: &ApplicationId) -> Result<Option<PermitApplication>, RepositoryError> {
        let applications = self
            .applications
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store poisoned".to_string()))?;
        Ok(applications.get(&id.0).cloned())
    }

    fn for_user(&self, user_id: &str) -> Result<Vec<PermitApplication>, RepositoryError> {
        let applications = self
            .applications
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store poisoned".to_string()))?;
        let mut matching: Vec<PermitApplication> = applications
            .values()
            .filter(|application| application.user_id == user_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(matching)
    }

    fn confirm_stamp_verification(
        &self,
        id: &ApplicationId,
        verified_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let mut applications = self
            .applications
            .lock()
            .map_err(|_| RepositoryError::Unavailable("store poisoned".to_string()))?;
        let application = applications.get_mut(&id.0).ok_or(RepositoryError::NotFound)?;
        let stamp = application.stamp.as_mut().ok_or(RepositoryError::NotFound)?;
        stamp.verified = true;
        stamp.verified_at = Some(verified_at);
        Ok(())
    }
}

/// Trait describing the outbound notification boundary. Any structured
/// logging or event-bus target satisfies it.
pub trait NotificationSink: Send + Sync {
    fn publish(&self, event: PermitEvent) -> Result<(), NotificationError>;
}

/// Event payload emitted on workflow milestones so routes and tests can
/// assert integration boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermitEvent {
    pub template: String,
    pub application_id: ApplicationId,
    pub details: BTreeMap<String, String>,
}

/// Notification dispatch error.
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Sink used by the service binary: events land in the tracing pipeline.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(&self, event: PermitEvent) -> Result<(), NotificationError> {
        info!(
            template = %event.template,
            application_id = %event.application_id.0,
            details = ?event.details,
            "permit workflow event"
        );
        Ok(())
    }
}
