//! Permit workflow engine: jurisdiction directory, application lifecycle,
//! compliance rules, engineer stamps, package assembly, and submission
//! routing.

pub(crate) mod compliance;
pub mod directory;
pub mod domain;
pub(crate) mod fees;
pub mod package;
pub mod repository;
pub mod router;
pub mod service;
pub mod stamp;
pub mod submission;

#[cfg(test)]
mod tests;

pub use compliance::ComplianceSummary;
pub use directory::JurisdictionDirectory;
pub use domain::{
    ApplicantInfo, ApplicationId, ApplicationStatus, CheckCategory, CheckStatus, ComplianceCheck,
    ContactBlock, Document, DocumentInput, EngineerDiscipline, EngineerStamp, Fees, Jurisdiction,
    JurisdictionId, JurisdictionLevel, JurisdictionLocation, JurisdictionRequirements,
    NewApplication, PackageId, PermitApplication, ProjectDetails, PropertyInfo, Signature,
    StampInput,
};
pub use package::{CoverSheet, DrawingSet, PackageError, PermitPackage};
pub use repository::{
    ApplicationRepository, MemoryRepository, NotificationError, NotificationSink, PermitEvent,
    RepositoryError, TracingSink,
};
pub use router::{permit_router, PermitApi};
pub use service::{PermitService, PermitWorkflowError, ReviewDecision};
pub use stamp::{AlwaysApprove, LicenseAuthority, StampError, StampVerifier};
pub use submission::{
    AcceptingTransport, SubmissionOutcome, SubmissionResultView, SubmissionTransport,
    TransportError,
};
