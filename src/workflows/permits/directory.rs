use std::collections::BTreeMap;

use super::domain::{
    ContactBlock, Jurisdiction, JurisdictionId, JurisdictionLevel, JurisdictionLocation,
    JurisdictionRequirements,
};

/// Read-only registry of governing jurisdictions, seeded once at
/// construction. Lookup is a location match, not a geocoder: addresses
/// that match no registered city or county simply return `None`.
#[derive(Debug, Clone)]
pub struct JurisdictionDirectory {
    jurisdictions: BTreeMap<String, Jurisdiction>,
}

impl JurisdictionDirectory {
    pub fn new(seed: Vec<Jurisdiction>) -> Self {
        let jurisdictions = seed
            .into_iter()
            .map(|jurisdiction| (jurisdiction.id.0.clone(), jurisdiction))
            .collect();
        Self { jurisdictions }
    }

    /// Registry shipped with the service binary. Tests and embedders seed
    /// their own via [`JurisdictionDirectory::new`].
    pub fn with_defaults() -> Self {
        Self::new(default_registry())
    }

    pub fn get(&self, id: &JurisdictionId) -> Option<&Jurisdiction> {
        self.jurisdictions.get(&id.0)
    }

    /// Case-insensitive substring match of registered city and county names
    /// against the free-form address text. Unregistered or ambiguous
    /// addresses resolve to the first match or `None`, never an error.
    pub fn find_by_address(&self, address: &str) -> Option<&Jurisdiction> {
        let needle = address.to_ascii_lowercase();
        self.jurisdictions.values().find(|jurisdiction| {
            let city = jurisdiction.location.city.to_ascii_lowercase();
            let county = jurisdiction.location.county.to_ascii_lowercase();
            (!city.is_empty() && needle.contains(&city))
                || (!county.is_empty() && needle.contains(&county))
        })
    }

    pub fn len(&self) -> usize {
        self.jurisdictions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jurisdictions.is_empty()
    }
}

fn default_registry() -> Vec<Jurisdiction> {
    vec![
        Jurisdiction {
            id: JurisdictionId("sf-city".to_string()),
            name: "City and County of San Francisco".to_string(),
            level: JurisdictionLevel::City,
            location: JurisdictionLocation {
                state: "CA".to_string(),
                county: "San Francisco".to_string(),
                city: "San Francisco".to_string(),
            },
            contact: ContactBlock {
                phone: "628-652-3700".to_string(),
                email: "dbi@sfgov.org".to_string(),
                address: "49 South Van Ness Ave, San Francisco, CA 94103".to_string(),
            },
            requirements: JurisdictionRequirements {
                permit_types: vec![
                    "building".to_string(),
                    "electrical".to_string(),
                    "plumbing".to_string(),
                    "mechanical".to_string(),
                ],
                review_process: "Plan check with over-the-counter option for minor work"
                    .to_string(),
                estimated_review_days: 45,
                fees: BTreeMap::from([
                    ("building".to_string(), 1200),
                    ("electrical".to_string(), 350),
                    ("plumbing".to_string(), 300),
                    ("mechanical".to_string(), 400),
                ]),
            },
            online_submission: true,
            api_integration: true,
            api_endpoint: Some("https://permits.sfgov.org/api/v2/submissions".to_string()),
        },
        Jurisdiction {
            id: JurisdictionId("la-county".to_string()),
            name: "County of Los Angeles".to_string(),
            level: JurisdictionLevel::County,
            location: JurisdictionLocation {
                state: "CA".to_string(),
                county: "Los Angeles".to_string(),
                city: String::new(),
            },
            contact: ContactBlock {
                phone: "626-458-5100".to_string(),
                email: "permits@dpw.lacounty.gov".to_string(),
                address: "900 S Fremont Ave, Alhambra, CA 91803".to_string(),
            },
            requirements: JurisdictionRequirements {
                permit_types: vec!["building".to_string(), "grading".to_string()],
                review_process: "Counter intake followed by routed plan review".to_string(),
                estimated_review_days: 60,
                fees: BTreeMap::from([
                    ("building".to_string(), 950),
                    ("grading".to_string(), 700),
                ]),
            },
            online_submission: true,
            api_integration: false,
            api_endpoint: None,
        },
        Jurisdiction {
            id: JurisdictionId("austin-city".to_string()),
            name: "City of Austin".to_string(),
            level: JurisdictionLevel::City,
            location: JurisdictionLocation {
                state: "TX".to_string(),
                county: "Travis".to_string(),
                city: "Austin".to_string(),
            },
            contact: ContactBlock {
                phone: "512-978-4000".to_string(),
                email: "dsd@austintexas.gov".to_string(),
                address: "6310 Wilhelmina Delco Dr, Austin, TX 78752".to_string(),
            },
            requirements: JurisdictionRequirements {
                permit_types: vec![
                    "building".to_string(),
                    "electrical".to_string(),
                    "demolition".to_string(),
                ],
                review_process: "Consolidated review through the development services portal"
                    .to_string(),
                estimated_review_days: 30,
                fees: BTreeMap::from([
                    ("building".to_string(), 500),
                    ("electrical".to_string(), 180),
                    ("demolition".to_string(), 250),
                ]),
            },
            online_submission: false,
            api_integration: false,
            api_endpoint: None,
        },
    ]
}
