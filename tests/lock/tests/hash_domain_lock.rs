//! Hash domain governance lock.
//!
//! Proves:
//! 1. The domain set has the expected count (catches forgotten additions to `ALL`)
//! 2. Domain byte strings are unique and null-terminated
//! 3. Domains follow the `CAUSAL::*::V1\0` naming convention
//! 4. No raw `CAUSAL::` literals appear in production source outside `hash_domain.rs`
//! 5. Each artifact digest is bound to its own domain

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use causal_kernel::knowledge::KnowledgeV1;
use causal_kernel::proof::hash::canonical_hash;
use causal_kernel::proof::hash_domain::HashDomain;
use causal_search::cancel::CancelToken;
use causal_search::permutation::PermutationSearch;
use causal_search::policy::PermutationPolicyV1;
use lock_tests::collider_table;

#[test]
fn hash_domain_canonical_set_count() {
    assert_eq!(
        HashDomain::ALL.len(),
        5,
        "expected 5 domain variants; if you added a new domain, update this count"
    );
}

#[test]
fn hash_domain_bytes_unique_and_terminated() {
    let mut seen = BTreeSet::new();
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        assert!(seen.insert(bytes), "duplicate domain bytes: {domain}");
        assert!(bytes.ends_with(&[0]), "{domain} is not null-terminated");
    }
}

#[test]
fn hash_domain_naming_convention() {
    for domain in HashDomain::ALL {
        let bytes = domain.as_bytes();
        assert!(bytes.starts_with(b"CAUSAL::"), "{domain}");
        assert!(bytes.ends_with(b"::V1\0"), "{domain}");
    }
}

#[test]
fn no_raw_domain_literals_outside_authority() {
    let production_dirs = [
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../kernel/src"),
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../search/src"),
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../harness/src"),
    ];
    let mut violations = Vec::new();
    let mut scanned = 0;
    for dir in production_dirs {
        for path in walk(Path::new(dir)) {
            if path.extension().and_then(|e| e.to_str()) != Some("rs")
                || path.file_name().and_then(|n| n.to_str()) == Some("hash_domain.rs")
            {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(&path) else {
                continue;
            };
            scanned += 1;
            for (i, line) in content.lines().enumerate() {
                let trimmed = line.trim();
                if !trimmed.starts_with("//") && trimmed.contains("b\"CAUSAL::") {
                    violations.push(format!("  {}:{}: {trimmed}", path.display(), i + 1));
                }
            }
        }
    }
    assert!(scanned > 0, "no production sources found");
    assert!(
        violations.is_empty(),
        "raw CAUSAL:: domain literals outside hash_domain.rs:\n{}",
        violations.join("\n")
    );
}

fn walk(dir: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    if let Ok(entries) = std::fs::read_dir(dir) {
        for entry in entries.flatten() {
            let path = entry.path();
            if path.is_dir() {
                out.extend(walk(&path));
            } else {
                out.push(path);
            }
        }
    }
    out
}

#[test]
fn report_digest_is_bound_to_its_domain() {
    let report = PermutationSearch::new(
        collider_table(),
        KnowledgeV1::new(),
        PermutationPolicyV1::default(),
    )
    .unwrap()
    .search(&CancelToken::new())
    .unwrap();
    let bytes = report.to_canonical_json_bytes().unwrap();
    assert_eq!(
        report.digest().unwrap(),
        canonical_hash(HashDomain::SearchReport, &bytes)
    );
    assert_ne!(
        report.digest().unwrap(),
        canonical_hash(HashDomain::Knowledge, &bytes)
    );

    // The collider is compelled: both edges stay directed in the CPDAG.
    assert_eq!(report.order.last(), Some(&2));
    assert_eq!(report.num_directed(), 2);
    assert_eq!(report.parents_of("C"), Some(vec!["A", "B"]));
}
