pub const DEFAULT_COURT: &str = "Delhi High Court";

pub mod case_types {
    /// Canonical case-type abbreviations accepted as case-number prefixes.
    pub const KNOWN: &[&str] = &[
        "W.P.(C)",
        "W.P.(CRL)",
        "W.P.(MD)",
        "C.M.(M)",
        "C.M.(W)",
        "C.M.(MAIN)",
        "C.M.(APPL)",
        "CS(OS)",
        "CS(COMM)",
        "FAO(OS)",
        "RFA(OS)",
        "CONT.CAS(C)",
        "LPA",
        "FAO",
        "RFA",
        "CRL.A.",
        "CRL.M.C.",
        "CRL.REV.P.",
        "BAIL APPLN.",
        "ARB.P.",
        "O.M.P.",
        "MAT.APP.",
        "C.R.P.",
        "C.M.",
        "O.A.",
        "T.A.",
        "A.A.",
        "E.P.",
    ];

    /// Subset offered as search suggestions.
    pub const SUGGESTED: &[&str] = &[
        "W.P.(C)", "W.P.(CRL)", "LPA", "FAO", "RFA", "CRL.A.", "C.M.(M)", "C.M.(W)",
    ];
}

pub mod years {
    /// The court was established in 1966; earlier years cannot carry a case record.
    pub const FIRST_RECORD_YEAR: i32 = 1966;
}

pub mod limits {
    pub const MAX_SEARCH_RESULTS: u64 = 10;

    pub const DEFAULT_RECENT_LIMIT: u64 = 10;

    pub const MAX_SUGGESTIONS: usize = 5;

    pub const MIN_PARTY_NAME_LEN: usize = 2;
}
