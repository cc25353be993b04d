use super::common::*;
use crate::workflows::permits::directory::JurisdictionDirectory;
use crate::workflows::permits::domain::JurisdictionId;
use crate::workflows::permits::fees;

#[test]
fn finds_jurisdiction_by_city_substring() {
    let directory = test_directory();
    let found = directory
        .find_by_address("100 Main St, TESTVILLE, CA 90001")
        .expect("city matches case-insensitively");
    assert_eq!(found.id.0, "testville");
}

#[test]
fn finds_jurisdiction_by_county_when_no_city_matches() {
    let directory = JurisdictionDirectory::new(vec![{
        let mut jurisdiction = manual_jurisdiction();
        jurisdiction.location.city = String::new();
        jurisdiction
    }]);
    let found = directory
        .find_by_address("400 Rural Route 2, Mills County")
        .expect("county matches");
    assert_eq!(found.id.0, "testville");
}

#[test]
fn unregistered_address_resolves_to_none() {
    let directory = test_directory();
    assert!(directory.find_by_address("12 Nowhere Lane, Elsewhere").is_none());
}

#[test]
fn get_returns_registered_jurisdiction() {
    let directory = test_directory();
    assert!(directory.get(&JurisdictionId("apiburg".to_string())).is_some());
    assert!(directory.get(&JurisdictionId("ghost".to_string())).is_none());
}

#[test]
fn registry_size_reflects_the_seed() {
    assert!(JurisdictionDirectory::new(Vec::new()).is_empty());
    let directory = test_directory();
    assert!(!directory.is_empty());
    assert_eq!(directory.len(), 2);
}

#[test]
fn fee_quote_applies_plan_check_multiplier() {
    let jurisdiction = manual_jurisdiction();
    let quoted = fees::quote(&jurisdiction, "building");
    assert_eq!(quoted.permit_fee, 500);
    assert_eq!(quoted.plan_check_fee, 325);
    assert_eq!(quoted.total, 825);
    assert!(!quoted.paid);
    assert!(quoted.paid_at.is_none());
}

#[test]
fn fee_quote_floors_the_plan_check_fee() {
    let mut jurisdiction = manual_jurisdiction();
    jurisdiction
        .requirements
        .fees
        .insert("building".to_string(), 333);
    let quoted = fees::quote(&jurisdiction, "building");
    // floor(333 * 0.65) = floor(216.45)
    assert_eq!(quoted.plan_check_fee, 216);
    assert_eq!(quoted.total, 549);
}

#[test]
fn unknown_permit_type_quotes_zero() {
    let jurisdiction = manual_jurisdiction();
    let quoted = fees::quote(&jurisdiction, "helipad");
    assert_eq!(quoted.permit_fee, 0);
    assert_eq!(quoted.plan_check_fee, 0);
    assert_eq!(quoted.total, 0);
}
