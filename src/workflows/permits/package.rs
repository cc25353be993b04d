use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::domain::{ApplicationId, CheckStatus, PackageId, PermitApplication};

static PACKAGE_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_package_id() -> PackageId {
    let id = PACKAGE_SEQUENCE.fetch_add(1, Ordering::Relaxed);
    PackageId(format!("pkg-{id:06}"))
}

/// Gate failures raised before a package is assembled. The stamp gate is
/// checked first: an application missing both a stamp and a passing
/// compliance run reports the stamp error.
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    #[error("engineer stamp required before package generation")]
    EngineerStampRequired,
    #[error("{failed} compliance check(s) failed")]
    ComplianceChecksFailed { failed: usize },
}

/// Drawing locators grouped by discipline. All locators are derived from
/// the package id; they look content-addressed but are deterministic paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawingSet {
    pub site_plan: Vec<String>,
    pub floor_plans: Vec<String>,
    /// Always the four compass-direction sheets.
    pub elevations: Vec<String>,
    pub sections: Vec<String>,
    pub details: Vec<String>,
    pub structural: Vec<String>,
    pub electrical: Vec<String>,
    pub plumbing: Vec<String>,
    pub mechanical: Vec<String>,
}

/// Cover sheet fronting the bundle, including the display-ordered index of
/// discipline sheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoverSheet {
    pub project_name: String,
    pub address: String,
    pub sheet_index: Vec<String>,
}

/// The assembled submission bundle. A value object generated on demand and
/// never persisted inside the application; callers regenerate when they
/// need it again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PermitPackage {
    pub id: PackageId,
    pub application_id: ApplicationId,
    pub generated_at: DateTime<Utc>,
    pub cover_sheet: CoverSheet,
    pub drawings: DrawingSet,
    pub specifications: Vec<String>,
    pub calculations: Vec<String>,
    pub energy_compliance: String,
}

const LOCATOR_HOST: &str = "https://plans.permit-engine.dev/packages";

fn locator(package_id: &PackageId, sheet: &str) -> String {
    format!("{LOCATOR_HOST}/{}/{sheet}.pdf", package_id.0)
}

/// Assemble the permit package for an application that has cleared both
/// gates. Pure over the application snapshot; the caller applies the
/// `Ready` transition.
pub fn assemble(application: &PermitApplication) -> Result<PermitPackage, PackageError> {
    if application.stamp.is_none() {
        return Err(PackageError::EngineerStampRequired);
    }

    let failed = application
        .compliance_checks
        .iter()
        .filter(|check| check.status == CheckStatus::Fail)
        .count();
    if failed > 0 {
        return Err(PackageError::ComplianceChecksFailed { failed });
    }

    let id = next_package_id();

    let drawings = DrawingSet {
        site_plan: vec![locator(&id, "A-001-site-plan")],
        floor_plans: vec![
            locator(&id, "A-101-floor-plan-level-1"),
            locator(&id, "A-102-floor-plan-level-2"),
        ],
        elevations: vec![
            locator(&id, "A-201-elevation-north"),
            locator(&id, "A-202-elevation-south"),
            locator(&id, "A-203-elevation-east"),
            locator(&id, "A-204-elevation-west"),
        ],
        sections: vec![locator(&id, "A-301-building-sections")],
        details: vec![locator(&id, "A-401-construction-details")],
        structural: vec![
            locator(&id, "S-101-foundation-plan"),
            locator(&id, "S-201-framing-plan"),
        ],
        electrical: vec![locator(&id, "E-101-electrical-plan")],
        plumbing: vec![locator(&id, "P-101-plumbing-plan")],
        mechanical: vec![locator(&id, "M-101-mechanical-plan")],
    };

    let cover_sheet = CoverSheet {
        project_name: application.project_details.description.clone(),
        address: application.property.address.clone(),
        sheet_index: vec![
            "A-000 Cover Sheet".to_string(),
            "A-001 Site Plan".to_string(),
            "A-101 Floor Plan - Level 1".to_string(),
            "A-102 Floor Plan - Level 2".to_string(),
            "A-201 Elevations".to_string(),
            "A-301 Building Sections".to_string(),
            "A-401 Construction Details".to_string(),
            "S-101 Foundation Plan".to_string(),
            "S-201 Framing Plan".to_string(),
            "E-101 Electrical Plan".to_string(),
            "P-101 Plumbing Plan".to_string(),
            "M-101 Mechanical Plan".to_string(),
            "SP-1 Specifications".to_string(),
            "C-1 Structural Calculations".to_string(),
            "C-2 Energy Calculations".to_string(),
            "EN-1 Energy Compliance".to_string(),
        ],
    };

    Ok(PermitPackage {
        application_id: application.id.clone(),
        generated_at: Utc::now(),
        cover_sheet,
        drawings,
        specifications: vec![locator(&id, "SP-1-specifications")],
        calculations: vec![
            locator(&id, "C-1-structural-calculations"),
            locator(&id, "C-2-energy-calculations"),
        ],
        energy_compliance: locator(&id, "EN-1-energy-compliance"),
        id,
    })
}
