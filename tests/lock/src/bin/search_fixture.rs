//! Binary that runs a seeded SEM search and prints deterministic output
//! lines for cross-process verification.
//!
//! Usage: `search_fixture [--parallel]`
//!
//! Output: key=value lines (see source for format).

use causal_harness::runner::run_search;
use causal_kernel::knowledge::KnowledgeV1;
use causal_kernel::proof::canon::f64_bits_hex;
use causal_search::cancel::CancelToken;
use causal_search::policy::PermutationPolicyV1;
use lock_tests::sem_fixture;

fn main() {
    let parallel = std::env::args().any(|a| a == "--parallel");
    let (sim, score) = sem_fixture(8, 500, 17);
    let policy = PermutationPolicyV1 {
        num_starts: 4,
        seed: 99,
        parallel_restarts: parallel,
        ..PermutationPolicyV1::default()
    };
    let out = run_search(score, KnowledgeV1::new(), policy, &CancelToken::new())
        .expect("search run failed");

    println!("report_digest={}", out.digest.as_str());
    println!("policy_digest={}", out.policy_digest.as_str());
    println!("knowledge_digest={}", out.knowledge_digest.as_str());
    println!("dataset_digest={}", sim.data.digest().expect("dataset digest").as_str());
    println!("total_score={}", f64_bits_hex(out.report.total_score));
    println!("order={:?}", out.report.order);
    println!("edges={}", out.report.edges.len());
    println!("transitions={}", out.report.transitions.len());
    println!("termination={}", out.report.termination.as_str());
}
