//! Typed domain separators for [`super::hash::canonical_hash`].
//!
//! The enum, `as_bytes()`, `ALL`, and `Display` are generated from one macro
//! invocation, so adding a domain is a single edit here.

macro_rules! define_hash_domains {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $bytes:expr
        ),+ $(,)?
    ) => {
        /// Domain separator prefixed to the hashed bytes.
        ///
        /// Every variant maps to a unique, null-terminated byte string.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HashDomain {
            $(
                $(#[$meta])*
                $variant,
            )+
        }

        impl HashDomain {
            #[must_use]
            pub const fn as_bytes(&self) -> &'static [u8] {
                match self {
                    $( Self::$variant => $bytes, )+
                }
            }

            /// All domains in declaration order.
            pub const ALL: &[HashDomain] = &[
                $( Self::$variant, )+
            ];
        }

        impl core::fmt::Display for HashDomain {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self {
                    $( Self::$variant => write!(f, stringify!($variant)), )+
                }
            }
        }
    };
}

define_hash_domains! {
    /// Final `SearchReportV1` canonical bytes.
    SearchReport => b"CAUSAL::SEARCH_REPORT::V1\0",

    /// `PermutationPolicyV1` snapshot.
    PermutationPolicy => b"CAUSAL::PERMUTATION_POLICY::V1\0",

    /// `KnowledgeV1` snapshot.
    Knowledge => b"CAUSAL::KNOWLEDGE::V1\0",

    /// Data matrix fed to a data-backed score.
    Dataset => b"CAUSAL::DATASET::V1\0",

    /// Benchmark input guard.
    BenchInput => b"CAUSAL::BENCH_INPUT::V1\0",
}
