//! Report directories round-trip and fail closed on tampering.

use causal_harness::runner::{
    read_report_dir, run_search, write_report_dir, RunError, DIGEST_FILENAME, REPORT_FILENAME,
};
use causal_kernel::knowledge::KnowledgeV1;
use causal_search::cancel::CancelToken;
use causal_search::policy::PermutationPolicyV1;
use lock_tests::sem_fixture;

fn output() -> causal_harness::runner::RunOutputV1 {
    let (_, score) = sem_fixture(6, 300, 51);
    run_search(
        score,
        KnowledgeV1::new(),
        PermutationPolicyV1 {
            num_starts: 2,
            ..PermutationPolicyV1::default()
        },
        &CancelToken::new(),
    )
    .unwrap()
}

#[test]
fn written_report_reads_back_verified() {
    let out = output();
    let dir = tempfile::tempdir().unwrap();
    write_report_dir(dir.path(), &out).unwrap();
    let (bytes, digest) = read_report_dir(dir.path()).unwrap();
    assert_eq!(bytes, out.canonical_bytes);
    assert_eq!(digest, out.digest);

    let value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(value["schema_version"], "search_report.v1");
    assert_eq!(value["score_id"], "sem_bic");
    assert_eq!(value["sample_size"], 300);
    assert_eq!(value["order"].as_array().unwrap().len(), 6);
}

#[test]
fn tampered_report_is_rejected() {
    let out = output();
    let dir = tempfile::tempdir().unwrap();
    write_report_dir(dir.path(), &out).unwrap();

    let mut value: serde_json::Value = serde_json::from_slice(&out.canonical_bytes).unwrap();
    value["termination"] = "interrupted".into();
    let tampered = causal_kernel::proof::canon::canonical_json_bytes(&value).unwrap();
    std::fs::write(dir.path().join(REPORT_FILENAME), tampered).unwrap();

    let err = read_report_dir(dir.path()).unwrap_err();
    assert!(matches!(err, RunError::DigestMismatch { .. }), "{err}");
}

#[test]
fn pretty_printed_report_is_not_canonical() {
    let out = output();
    let dir = tempfile::tempdir().unwrap();
    write_report_dir(dir.path(), &out).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&out.canonical_bytes).unwrap();
    let pretty = serde_json::to_vec_pretty(&value).unwrap();
    std::fs::write(dir.path().join(REPORT_FILENAME), pretty).unwrap();

    let err = read_report_dir(dir.path()).unwrap_err();
    assert!(matches!(err, RunError::NotCanonical { .. }), "{err}");
}

#[test]
fn missing_digest_file_is_reported() {
    let out = output();
    let dir = tempfile::tempdir().unwrap();
    write_report_dir(dir.path(), &out).unwrap();
    std::fs::remove_file(dir.path().join(DIGEST_FILENAME)).unwrap();

    let err = read_report_dir(dir.path()).unwrap_err();
    assert!(
        matches!(&err, RunError::MissingFile { filename } if filename == DIGEST_FILENAME),
        "{err}"
    );
}
