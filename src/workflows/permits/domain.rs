use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Identifier wrapper for permit applications.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApplicationId(pub String);

/// Identifier wrapper for registered jurisdictions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JurisdictionId(pub String);

/// Identifier wrapper for generated permit packages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageId(pub String);

/// Governing authority level for a registered jurisdiction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JurisdictionLevel {
    City,
    County,
    State,
}

/// Geographic descriptor used for address matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionLocation {
    pub state: String,
    pub county: String,
    pub city: String,
}

/// Public contact block published by the jurisdiction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactBlock {
    pub phone: String,
    pub email: String,
    pub address: String,
}

/// Permit-type support and the fee schedule for a jurisdiction.
///
/// Fees are flat per-permit-type amounts in whole dollars; a permit type
/// absent from the map quotes at zero rather than erroring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JurisdictionRequirements {
    pub permit_types: Vec<String>,
    pub review_process: String,
    pub estimated_review_days: u32,
    pub fees: BTreeMap<String, u64>,
}

/// Immutable reference record for a governing jurisdiction. Registered once
/// at directory construction and never mutated by application workflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jurisdiction {
    pub id: JurisdictionId,
    pub name: String,
    pub level: JurisdictionLevel,
    pub location: JurisdictionLocation,
    pub contact: ContactBlock,
    pub requirements: JurisdictionRequirements,
    pub online_submission: bool,
    pub api_integration: bool,
    pub api_endpoint: Option<String>,
}

/// Lifecycle status tracked throughout the permit application workflow.
///
/// `Ready` is only reachable via package assembly and `Submitted` only via
/// the submission router; the review states are set by the surrounding
/// system and merely preserved here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Draft,
    Ready,
    Submitted,
    UnderReview,
    Approved,
    Rejected,
    Resubmit,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            ApplicationStatus::Draft => "draft",
            ApplicationStatus::Ready => "ready",
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::UnderReview => "under_review",
            ApplicationStatus::Approved => "approved",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Resubmit => "resubmit",
        }
    }

    /// Position in the workflow used to enforce monotonic transitions.
    /// The three review outcomes share a rank; the workflow never moves
    /// backwards from any of them within this core.
    pub const fn rank(self) -> u8 {
        match self {
            ApplicationStatus::Draft => 0,
            ApplicationStatus::Ready => 1,
            ApplicationStatus::Submitted => 2,
            ApplicationStatus::UnderReview => 3,
            ApplicationStatus::Approved
            | ApplicationStatus::Rejected
            | ApplicationStatus::Resubmit => 4,
        }
    }
}

/// Applicant contact details captured at intake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicantInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// Description of the property the permit concerns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyInfo {
    pub address: String,
    pub parcel_number: String,
    pub zoning: String,
    pub lot_size_sqft: u32,
    pub existing_structures: Vec<String>,
}

/// Description of the proposed work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectDetails {
    pub description: String,
    pub construction_type: String,
    pub occupancy_type: String,
    pub square_footage: u32,
    pub stories: u8,
    pub estimated_cost: u64,
}

/// Supporting document attached to an application. Append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub doc_type: String,
    pub name: String,
    pub url: String,
    pub required: bool,
    pub uploaded_at: DateTime<Utc>,
}

/// Inbound document descriptor before the upload timestamp is assigned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInput {
    pub doc_type: String,
    pub name: String,
    pub url: String,
    pub required: bool,
}

/// Rule family a compliance check belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckCategory {
    BuildingCode,
    Zoning,
    EnergyCode,
    FireSafety,
}

impl CheckCategory {
    pub const fn label(self) -> &'static str {
        match self {
            CheckCategory::BuildingCode => "Building Code",
            CheckCategory::Zoning => "Zoning",
            CheckCategory::EnergyCode => "Energy Code",
            CheckCategory::FireSafety => "Fire Safety",
        }
    }
}

/// Verdict of a single evaluated rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
    Warning,
    NotApplicable,
}

/// One evaluated compliance rule. A full run replaces the application's
/// stored list wholesale; individual checks are never edited in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceCheck {
    pub id: String,
    pub category: CheckCategory,
    pub code_reference: String,
    pub description: String,
    pub status: CheckStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub checked_at: DateTime<Utc>,
}

/// Licensed discipline of the certifying engineer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineerDiscipline {
    Structural,
    Civil,
    Mechanical,
    Electrical,
}

impl EngineerDiscipline {
    pub const fn display_name(self) -> &'static str {
        match self {
            EngineerDiscipline::Structural => "Structural",
            EngineerDiscipline::Civil => "Civil",
            EngineerDiscipline::Mechanical => "Mechanical",
            EngineerDiscipline::Electrical => "Electrical",
        }
    }
}

/// Captured signature payload embedded in an engineer stamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    pub kind: String,
    pub payload: String,
    pub signed_at: DateTime<Utc>,
    pub ip_address: String,
}

/// A licensed engineer's certification attached to an application.
///
/// `verified` starts false; the detached license check flips it exactly
/// once after the authority responds. At most one stamp per application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineerStamp {
    pub engineer_name: String,
    pub license_number: String,
    pub license_state: String,
    pub license_expiration: NaiveDate,
    pub discipline: EngineerDiscipline,
    pub signature: Signature,
    pub certification: String,
    pub verified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<DateTime<Utc>>,
}

/// Inbound stamp details before certification text and signature metadata
/// are generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StampInput {
    pub engineer_name: String,
    pub license_number: String,
    pub license_state: String,
    pub license_expiration: NaiveDate,
    pub discipline: EngineerDiscipline,
    pub signature_kind: String,
    pub signature_payload: String,
    pub ip_address: String,
}

/// Fee breakdown for an application, in whole dollars.
///
/// Invariant: `total == permit_fee + plan_check_fee`. The optional school
/// and impact fees are informational and absent unless explicitly set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fees {
    pub permit_fee: u64,
    pub plan_check_fee: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_fee: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact_fee: Option<u64>,
    pub total: u64,
    pub paid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
}

/// Central aggregate owned by the permit service. Never deleted by this
/// core; archival is an external concern.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PermitApplication {
    pub id: ApplicationId,
    pub project_id: String,
    pub user_id: String,
    pub jurisdiction_id: JurisdictionId,
    pub permit_type: String,
    pub status: ApplicationStatus,
    pub applicant: ApplicantInfo,
    pub property: PropertyInfo,
    pub project_details: ProjectDetails,
    pub documents: Vec<Document>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stamp: Option<EngineerStamp>,
    pub compliance_checks: Vec<ComplianceCheck>,
    pub fees: Fees,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub approved_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

/// Intake payload used to open a new application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewApplication {
    pub project_id: String,
    pub user_id: String,
    pub jurisdiction_id: JurisdictionId,
    pub permit_type: String,
    pub applicant: ApplicantInfo,
    pub property: PropertyInfo,
    pub project_details: ProjectDetails,
}
