use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};

use crate::workflows::permits::directory::JurisdictionDirectory;
use crate::workflows::permits::domain::{
    ApplicantInfo, ContactBlock, EngineerDiscipline, Jurisdiction, JurisdictionId,
    JurisdictionLevel, JurisdictionLocation, JurisdictionRequirements, NewApplication,
    ProjectDetails, PropertyInfo, StampInput,
};
use crate::workflows::permits::repository::{
    MemoryRepository, NotificationError, NotificationSink, PermitEvent,
};
use crate::workflows::permits::service::PermitService;
use crate::workflows::permits::stamp::{AlwaysApprove, LicenseAuthority, StampVerifier};
use crate::workflows::permits::submission::{SubmissionTransport, TransportError};

pub(super) const TEST_VERIFICATION_DELAY: Duration = Duration::from_millis(50);

pub(super) fn manual_jurisdiction() -> Jurisdiction {
    Jurisdiction {
        id: JurisdictionId("testville".to_string()),
        name: "City of Testville".to_string(),
        level: JurisdictionLevel::City,
        location: JurisdictionLocation {
            state: "CA".to_string(),
            county: "Mills".to_string(),
            city: "Testville".to_string(),
        },
        contact: ContactBlock {
            phone: "555-0100".to_string(),
            email: "permits@testville.gov".to_string(),
            address: "1 Civic Plaza, Testville, CA".to_string(),
        },
        requirements: JurisdictionRequirements {
            permit_types: vec!["building".to_string(), "electrical".to_string()],
            review_process: "Counter intake".to_string(),
            estimated_review_days: 20,
            fees: BTreeMap::from([
                ("building".to_string(), 500),
                ("electrical".to_string(), 120),
            ]),
        },
        online_submission: false,
        api_integration: false,
        api_endpoint: None,
    }
}

pub(super) fn api_jurisdiction() -> Jurisdiction {
    Jurisdiction {
        id: JurisdictionId("apiburg".to_string()),
        name: "City of Apiburg".to_string(),
        level: JurisdictionLevel::City,
        location: JurisdictionLocation {
            state: "CA".to_string(),
            county: "Mills".to_string(),
            city: "Apiburg".to_string(),
        },
        contact: ContactBlock {
            phone: "555-0101".to_string(),
            email: "permits@apiburg.gov".to_string(),
            address: "2 Civic Plaza, Apiburg, CA".to_string(),
        },
        requirements: JurisdictionRequirements {
            permit_types: vec!["building".to_string()],
            review_process: "Portal intake with routed review".to_string(),
            estimated_review_days: 35,
            fees: BTreeMap::from([("building".to_string(), 800)]),
        },
        online_submission: true,
        api_integration: true,
        api_endpoint: Some("https://permits.apiburg.gov/api/submissions".to_string()),
    }
}

pub(super) fn test_directory() -> JurisdictionDirectory {
    JurisdictionDirectory::new(vec![manual_jurisdiction(), api_jurisdiction()])
}

/// Notification recorder so tests can assert the boundary without a real
/// event bus.
#[derive(Default)]
pub(super) struct MemorySink {
    events: Mutex<Vec<PermitEvent>>,
}

impl MemorySink {
    pub(super) fn events(&self) -> Vec<PermitEvent> {
        self.events.lock().expect("sink mutex poisoned").clone()
    }

    pub(super) fn templates(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .map(|event| event.template)
            .collect()
    }
}

impl NotificationSink for MemorySink {
    fn publish(&self, event: PermitEvent) -> Result<(), NotificationError> {
        self.events.lock().expect("sink mutex poisoned").push(event);
        Ok(())
    }
}

/// Authority that refuses every license, for exercising the negative
/// verification path.
pub(super) struct DecliningAuthority;

impl LicenseAuthority for DecliningAuthority {
    fn verify_license(&self, _license_number: &str, _license_state: &str) -> bool {
        false
    }
}

/// Transport that always fails, for the outbound-failure path.
pub(super) struct FailingTransport;

impl SubmissionTransport for FailingTransport {
    fn submit(
        &self,
        _endpoint: &str,
        _application: &crate::workflows::permits::domain::PermitApplication,
    ) -> Result<String, TransportError> {
        Err(TransportError::Failed("portal returned 503".to_string()))
    }
}

/// Transport that accepts and records a fixed receipt.
pub(super) struct ReceiptTransport;

impl SubmissionTransport for ReceiptTransport {
    fn submit(
        &self,
        _endpoint: &str,
        _application: &crate::workflows::permits::domain::PermitApplication,
    ) -> Result<String, TransportError> {
        Ok("RCPT-7".to_string())
    }
}

pub(super) type TestService = PermitService<MemoryRepository, MemorySink>;

pub(super) fn test_router() -> axum::Router {
    let (service, _, _) = service();
    crate::workflows::permits::router::permit_router(crate::workflows::permits::router::PermitApi {
        service,
        transport: Arc::new(ReceiptTransport),
    })
}

pub(super) async fn read_json_body(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body readable");
    serde_json::from_slice(&bytes).expect("body is json")
}

pub(super) fn service() -> (Arc<TestService>, Arc<MemoryRepository>, Arc<MemorySink>) {
    service_with_authority(Arc::new(AlwaysApprove))
}

pub(super) fn service_with_authority(
    authority: Arc<dyn LicenseAuthority>,
) -> (Arc<TestService>, Arc<MemoryRepository>, Arc<MemorySink>) {
    let repository = Arc::new(MemoryRepository::default());
    let sink = Arc::new(MemorySink::default());
    let verifier = StampVerifier::new(authority, TEST_VERIFICATION_DELAY);
    let service = Arc::new(PermitService::new(
        Arc::new(test_directory()),
        Arc::clone(&repository),
        Arc::clone(&sink),
        verifier,
    ));
    (service, repository, sink)
}

pub(super) fn new_application(user_id: &str, jurisdiction: &str) -> NewApplication {
    NewApplication {
        project_id: format!("proj-{user_id}"),
        user_id: user_id.to_string(),
        jurisdiction_id: JurisdictionId(jurisdiction.to_string()),
        permit_type: "building".to_string(),
        applicant: ApplicantInfo {
            name: "Jordan Reyes".to_string(),
            email: "jordan@example.com".to_string(),
            phone: "555-0147".to_string(),
        },
        property: PropertyInfo {
            address: "100 Main St, Testville, CA".to_string(),
            parcel_number: "0042-1100-0008".to_string(),
            zoning: "R1-D".to_string(),
            lot_size_sqft: 7200,
            existing_structures: Vec::new(),
        },
        project_details: ProjectDetails {
            description: "Three-story single-family residence".to_string(),
            construction_type: "V-B".to_string(),
            occupancy_type: "R-3".to_string(),
            square_footage: 2400,
            stories: 3,
            estimated_cost: 480_000,
        },
    }
}

pub(super) fn valid_stamp() -> StampInput {
    StampInput {
        engineer_name: "Priya Raman, PE".to_string(),
        license_number: "C-88214".to_string(),
        license_state: "California".to_string(),
        license_expiration: (Utc::now() + ChronoDuration::days(365)).date_naive(),
        discipline: EngineerDiscipline::Structural,
        signature_kind: "digital".to_string(),
        signature_payload: "sig:test".to_string(),
        ip_address: "198.51.100.7".to_string(),
    }
}

pub(super) fn expired_stamp() -> StampInput {
    StampInput {
        license_expiration: (Utc::now() - ChronoDuration::days(30)).date_naive(),
        ..valid_stamp()
    }
}
