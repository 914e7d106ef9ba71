//! Hash domain governance lock tests.
//!
//! Proves:
//! 1. The domain set has the expected count
//! 2. All domain byte strings are unique
//! 3. All domains are null-terminated
//! 4. All domains follow the `TRELLIS::*::V1\0` naming convention
//! 5. Digests over the same bytes differ across domains

use std::collections::BTreeSet;

use trellis_kernel::proof::hash::{canonical_hash, HashDomain};

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
fn hash_domain_all_null_terminated() {
    for domain in HashDomain::ALL {
        assert!(
            domain.as_bytes().ends_with(&[0]),
            "{domain} is not null-terminated"
        );
    }
}

#[test]
fn hash_domain_naming_convention() {
    for domain in HashDomain::ALL {
        let text = std::str::from_utf8(domain.as_bytes()).unwrap();
        assert!(text.starts_with("TRELLIS::"), "{domain}: {text}");
        assert!(text.ends_with("::V1\0"), "{domain}: {text}");
    }
}

#[test]
fn same_bytes_different_domains() {
    let digests: BTreeSet<String> = HashDomain::ALL
        .iter()
        .map(|domain| canonical_hash(*domain, b"{}").as_str().to_string())
        .collect();
    assert_eq!(digests.len(), HashDomain::ALL.len());
}
