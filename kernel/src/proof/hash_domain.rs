//! Typed domain separators for canonical hashing.
//!
//! Every digest Canopy produces selects a domain via [`HashDomain`], so a
//! trace digest can never collide with a report digest over the same bytes.

/// Declares `HashDomain`, `as_bytes()`, `ALL`, and `Display` from one list.
macro_rules! define_hash_domains {
    (
        $(
            $(#[$meta:meta])*
            $variant:ident => $bytes:expr
        ),+ $(,)?
    ) => {
        /// Typed domain separator for [`super::hash::canonical_hash`].
        ///
        /// Every variant maps to a unique, null-terminated byte string that is
        /// fed to SHA-256 ahead of the hashed data.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum HashDomain {
            $(
                $(#[$meta])*
                $variant,
            )+
        }

        impl HashDomain {
            /// The raw domain-separator bytes (null-terminated).
            #[must_use]
            pub const fn as_bytes(&self) -> &'static [u8] {
                match self {
                    $( Self::$variant => $bytes, )+
                }
            }

            /// All domain variants in declaration order.
            pub const ALL: &[HashDomain] = &[
                $( Self::$variant, )+
            ];
        }

        impl core::fmt::Display for HashDomain {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                match self {
                    $( Self::$variant => f.write_str(stringify!($variant)), )+
                }
            }
        }
    };
}

define_hash_domains! {
    /// Search trace (ordered event log of one driver run).
    SearchTrace => b"CANOPY::SEARCH_TRACE::V1\0",

    /// Search configuration snapshot.
    SearchConfig => b"CANOPY::SEARCH_CONFIG::V1\0",

    /// Ordered list of solution descriptions produced by a run.
    SolutionSet => b"CANOPY::SOLUTION_SET::V1\0",

    /// Complete harness report.
    SearchReport => b"CANOPY::SEARCH_REPORT::V1\0",
}
