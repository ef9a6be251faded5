//! Cross-process determinism of the search.
//!
//! Spawns the `search_fixture` binary under several environment variants
//! and asserts identical output. Results must not depend on process-level
//! state (cwd, locale, env vars, thread count).

use std::path::Path;
use std::process::Command;

fn workspace_root() -> String {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("workspace root exists")
        .to_string_lossy()
        .to_string()
}

/// Run the fixture with the given cwd, args, and environment overrides.
fn run_variant(work_dir: &str, args: &[&str], env_overrides: &[(&str, &str)]) -> String {
    let bin = env!("CARGO_BIN_EXE_search_fixture");
    let mut command = Command::new(bin);
    command
        .args(args)
        .current_dir(work_dir)
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE")
        .env_remove("RUST_LOG");
    for &(key, val) in env_overrides {
        command.env(key, val);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!("failed to spawn {bin} (work_dir={work_dir}, overrides={env_overrides:?}): {e}")
    });
    assert!(
        output.status.success(),
        "search_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

/// Output lines that do not mention the policy snapshot.
fn policy_independent(output: &str) -> Vec<&str> {
    output
        .lines()
        .filter(|l| !l.starts_with("report_digest=") && !l.starts_with("policy_digest="))
        .collect()
}

#[test]
fn crossproc_determinism_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[], &[]);
    assert!(baseline.contains("report_digest=sha256:"), "{baseline}");
    assert!(baseline.contains("termination=converged"), "{baseline}");

    let alt_cwd = if cfg!(target_os = "windows") {
        "C:\\"
    } else {
        "/tmp"
    };
    assert_eq!(baseline, run_variant(alt_cwd, &[], &[]), "cwd changed output");
    assert_eq!(
        baseline,
        run_variant(&root, &[], &[("LC_ALL", "C"), ("LANG", "C")]),
        "locale changed output"
    );
    assert_eq!(
        baseline,
        run_variant(
            &root,
            &[],
            &[
                ("CAUSAL_NOISE", "should_not_matter"),
                ("TZ", "America/New_York"),
                ("HOME", "/nonexistent"),
                ("RUST_LOG", "debug"),
            ],
        ),
        "spurious env vars changed output"
    );
}

#[test]
fn crossproc_parallel_matches_sequential() {
    let root = workspace_root();
    let sequential = run_variant(&root, &[], &[]);
    let parallel = run_variant(&root, &["--parallel"], &[]);
    assert_eq!(policy_independent(&sequential), policy_independent(&parallel));
    let tmp = std::env::temp_dir();
    assert_eq!(parallel, run_variant(&tmp.to_string_lossy(), &["--parallel"], &[]));
}
