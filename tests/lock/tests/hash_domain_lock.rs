//! Hash domain governance lock tests.
//!
//! Proves:
//! 1. Canonical domain set has expected count (catches forgotten additions to ALL)
//! 2. All domain byte strings are unique (prevents domain collision)
//! 3. All domains follow the `CANOPY::*::V1\0` naming convention
//! 4. `canonical_hash` matches an independent SHA-256 over `domain || data`
//! 5. Report and trace digests are bound to their domains

use std::collections::BTreeSet;

use canopy_harness::runner::run_world;
use canopy_harness::worlds::queens::QueensWorld;
use canopy_kernel::proof::hash::{canonical_hash, HashDomain};
use canopy_search::policy::SearchConfig;
use sha2::{Digest, Sha256};

fn independent_hash(domain: &[u8], data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(domain);
    hasher.update(data);
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

#[test]
fn hash_domain_canonical_set_count() {
    assert_eq!(
        HashDomain::ALL.len(),
        4,
        "expected 4 domain variants; if you added a new domain, update this count"
    );
}

#[test]
fn hash_domain_all_unique_bytes() {
    let mut seen = BTreeSet::new();
    for domain in HashDomain::ALL {
        assert!(
            seen.insert(domain.as_bytes()),
            "duplicate domain bytes: {domain}"
        );
    }
}

#[test]
fn hash_domain_all_follow_naming_convention() {
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        assert!(
            bytes.starts_with(b"CANOPY::"),
            "{domain} does not start with CANOPY::"
        );
        assert!(
            bytes.ends_with(b"::V1\0"),
            "{domain} does not end with ::V1\\0"
        );
    }
}

#[test]
fn canonical_hash_matches_independent_sha256() {
    for domain in HashDomain::ALL {
        let data = br#"{"events":[],"schema_version":"search_trace.v1"}"#;
        assert_eq!(
            canonical_hash(*domain, data).as_str(),
            independent_hash(domain.as_bytes(), data),
            "{domain} digest drifted"
        );
    }
}

#[test]
fn report_digests_are_domain_bound() {
    let config = SearchConfig {
        record_trace: true,
        ..SearchConfig::default()
    };
    let report = run_world(QueensWorld::new(4), &config, None, None).unwrap();

    let bytes = report.to_canonical_json_bytes().unwrap();
    assert_eq!(
        report.digest().unwrap().as_str(),
        independent_hash(HashDomain::SearchReport.as_bytes(), &bytes)
    );

    let config_bytes = canopy_kernel::proof::canon::canonical_json_bytes(&config.to_json()).unwrap();
    assert_eq!(
        report.config_digest.as_str(),
        independent_hash(HashDomain::SearchConfig.as_bytes(), &config_bytes)
    );
    assert_ne!(
        report.config_digest,
        canonical_hash(HashDomain::SearchReport, &config_bytes),
        "same bytes under another domain must not collide"
    );
}
