pub mod block;
pub mod delhi_high_court;
pub mod extract;
pub mod fallback;
pub mod http;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::CaseRecord;

pub use block::{BlockReason, detect_block};
pub use delhi_high_court::{ConnectionReport, DelhiHighCourtScraper, ScraperSettings};
pub use extract::{ParseError, extract_record, extract_records};
pub use http::HttpSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMethod {
    Get,
    Post,
}

/// A single request against the court site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub method: FetchMethod,
    pub url: String,
    pub form: Vec<(String, String)>,
}

impl FetchRequest {
    #[must_use]
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: FetchMethod::Get,
            url: url.into(),
            form: Vec::new(),
        }
    }

    #[must_use]
    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: FetchMethod::Post,
            url: url.into(),
            form,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    /// URL after redirects.
    pub final_url: String,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Request timed out")]
    Timeout,

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Transport error: {0}")]
    Transport(String),
}

/// Network capability used by the scraper. Tests substitute fixed-response fakes.
#[async_trait]
pub trait CaseSource: Send + Sync {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError>;
}

/// Hook for an externally provided CAPTCHA solver.
///
/// Returns a replacement response when the challenge was solved.
#[async_trait]
pub trait ChallengeSolver: Send + Sync {
    async fn solve(
        &self,
        source: &dyn CaseSource,
        challenge: &FetchResponse,
    ) -> Option<FetchResponse>;
}

#[derive(Debug, Clone)]
pub enum SearchOutcome {
    Found {
        records: Vec<CaseRecord>,
        /// Rows on the result page that could not be parsed.
        skipped: usize,
    },
    Empty,
    Blocked {
        reason: BlockReason,
        /// Demonstration data. Never persisted.
        fallback: Option<Vec<CaseRecord>>,
    },
    NetworkError {
        attempts: u32,
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeKind {
    Found,
    Empty,
    Blocked,
    NetworkError,
}

impl OutcomeKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Found => "found",
            Self::Empty => "empty",
            Self::Blocked => "blocked",
            Self::NetworkError => "network_error",
        }
    }
}

impl SearchOutcome {
    #[must_use]
    pub const fn kind(&self) -> OutcomeKind {
        match self {
            Self::Found { .. } => OutcomeKind::Found,
            Self::Empty => OutcomeKind::Empty,
            Self::Blocked { .. } => OutcomeKind::Blocked,
            Self::NetworkError { .. } => OutcomeKind::NetworkError,
        }
    }

    #[must_use]
    pub fn record_count(&self) -> usize {
        match self {
            Self::Found { records, .. } => records.len(),
            Self::Blocked {
                fallback: Some(records),
                ..
            } => records.len(),
            _ => 0,
        }
    }
}
