use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{Duration as ChronoDuration, Utc};
use permit_engine::workflows::permits::{
    AlwaysApprove, ApplicantInfo, ApplicationStatus, CheckCategory, CheckStatus, ContactBlock,
    EngineerDiscipline, Jurisdiction, JurisdictionDirectory, JurisdictionId, JurisdictionLevel,
    JurisdictionLocation, JurisdictionRequirements, MemoryRepository, NewApplication,
    NotificationError, NotificationSink, PermitEvent, PermitService, ProjectDetails, PropertyInfo,
    StampInput, StampVerifier, SubmissionOutcome, SubmissionTransport, TransportError,
};

const VERIFICATION_DELAY: Duration = Duration::from_millis(50);

struct SilentSink;

impl NotificationSink for SilentSink {
    fn publish(&self, _event: PermitEvent) -> Result<(), NotificationError> {
        Ok(())
    }
}

struct NoPortal;

impl SubmissionTransport for NoPortal {
    fn submit(
        &self,
        _endpoint: &str,
        _application: &permit_engine::workflows::permits::PermitApplication,
    ) -> Result<String, TransportError> {
        unreachable!("manual jurisdictions never reach the transport")
    }
}

fn riverbend() -> Jurisdiction {
    Jurisdiction {
        id: JurisdictionId("riverbend".to_string()),
        name: "City of Riverbend".to_string(),
        level: JurisdictionLevel::City,
        location: JurisdictionLocation {
            state: "CA".to_string(),
            county: "Alder".to_string(),
            city: "Riverbend".to_string(),
        },
        contact: ContactBlock {
            phone: "555-0188".to_string(),
            email: "permits@riverbend.gov".to_string(),
            address: "10 River Rd, Riverbend, CA".to_string(),
        },
        requirements: JurisdictionRequirements {
            permit_types: vec!["building".to_string()],
            review_process: "Counter intake with routed plan review".to_string(),
            estimated_review_days: 25,
            fees: BTreeMap::from([("building".to_string(), 500)]),
        },
        online_submission: false,
        api_integration: false,
        api_endpoint: None,
    }
}

fn three_story_application() -> NewApplication {
    NewApplication {
        project_id: "proj-e2e".to_string(),
        user_id: "user-e2e".to_string(),
        jurisdiction_id: JurisdictionId("riverbend".to_string()),
        permit_type: "building".to_string(),
        applicant: ApplicantInfo {
            name: "Sam Okafor".to_string(),
            email: "sam@example.com".to_string(),
            phone: "555-0102".to_string(),
        },
        property: PropertyInfo {
            address: "42 Alder Way, Riverbend, CA".to_string(),
            parcel_number: "0099-2301-0042".to_string(),
            zoning: "R1-D".to_string(),
            lot_size_sqft: 8400,
            existing_structures: Vec::new(),
        },
        project_details: ProjectDetails {
            description: "Three-story single-family residence".to_string(),
            construction_type: "V-B".to_string(),
            occupancy_type: "R-3".to_string(),
            square_footage: 2400,
            stories: 3,
            estimated_cost: 550_000,
        },
    }
}

#[tokio::test]
async fn building_permit_walks_the_full_workflow() {
    let directory = Arc::new(JurisdictionDirectory::new(vec![riverbend()]));
    let repository = Arc::new(MemoryRepository::default());
    let service = PermitService::new(
        directory,
        repository,
        Arc::new(SilentSink),
        StampVerifier::new(Arc::new(AlwaysApprove), VERIFICATION_DELAY),
    );

    // Draft with quoted fees.
    let application = service
        .create_application(three_story_application())
        .expect("application created");
    assert_eq!(application.status, ApplicationStatus::Draft);
    assert_eq!(application.fees.permit_fee, 500);
    assert_eq!(application.fees.plan_check_fee, 325);
    assert_eq!(application.fees.total, 825);
    assert!(!application.fees.paid);
    let id = application.id.clone();

    // Compliance: seismic pass (marker D), egress pass (multi-story),
    // sprinkler present and passing (three stories).
    let checks = service.run_compliance_checks(&id).expect("checks run");
    let seismic = checks
        .iter()
        .find(|check| check.code_reference == "IBC 1613")
        .expect("seismic check present");
    assert_eq!(seismic.status, CheckStatus::Pass);
    let egress = checks
        .iter()
        .find(|check| check.code_reference == "IBC 1009")
        .expect("egress check present");
    assert_eq!(egress.status, CheckStatus::Pass);
    let sprinkler = checks
        .iter()
        .find(|check| check.category == CheckCategory::FireSafety)
        .expect("sprinkler check present above two stories");
    assert_eq!(sprinkler.status, CheckStatus::Pass);

    // Stamp: unverified immediately, verified after the fixed delay.
    let stamped = service
        .add_engineer_stamp(
            &id,
            StampInput {
                engineer_name: "Priya Raman, PE".to_string(),
                license_number: "C-88214".to_string(),
                license_state: "California".to_string(),
                license_expiration: (Utc::now() + ChronoDuration::days(365)).date_naive(),
                discipline: EngineerDiscipline::Structural,
                signature_kind: "digital".to_string(),
                signature_payload: "sig:e2e".to_string(),
                ip_address: "198.51.100.9".to_string(),
            },
        )
        .expect("stamp attached");
    assert!(!stamped.stamp.expect("stamp present").verified);

    tokio::time::sleep(VERIFICATION_DELAY + Duration::from_millis(150)).await;
    let verified = service
        .application_status(&id)
        .expect("query succeeds")
        .expect("present")
        .stamp
        .expect("stamp present");
    assert!(verified.verified);
    assert!(verified.verified_at.is_some());

    // Package: four elevations, application becomes ready.
    let package = service.generate_permit_package(&id).expect("package generated");
    assert_eq!(package.drawings.elevations.len(), 4);
    let ready = service
        .application_status(&id)
        .expect("query succeeds")
        .expect("present");
    assert_eq!(ready.status, ApplicationStatus::Ready);

    // Manual submission after payment.
    service.mark_fees_paid(&id).expect("paid");
    let outcome = service
        .submit_application(&id, &NoPortal)
        .expect("submission evaluated");
    match outcome {
        SubmissionOutcome::Accepted {
            confirmation,
            advisory,
        } => {
            assert!(confirmation.starts_with("MANUAL-"));
            assert!(advisory.is_some());
        }
        other => panic!("expected accepted manual submission, got {other:?}"),
    }

    let submitted = service
        .application_status(&id)
        .expect("query succeeds")
        .expect("present");
    assert_eq!(submitted.status, ApplicationStatus::Submitted);
    assert!(submitted.submitted_at.is_some());
}
