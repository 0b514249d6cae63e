//! Domain service for case lookups.
//!
//! Validates queries, serves stored records, scrapes the court site on a miss and
//! persists what it finds.

use crate::models::{CaseRecord, CaseUpdate, Requester, SearchStatistics};
use crate::parser::ValidationError;
use crate::scraper::BlockReason;
use serde::Serialize;
use thiserror::Error;

/// Errors specific to case searches.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{reason}")]
    Blocked { reason: BlockReason },

    #[error("Court website unreachable after {attempts} attempt(s): {message}")]
    Unreachable { attempts: u32, message: String },

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sea_orm::DbErr> for SearchError {
    fn from(err: sea_orm::DbErr) -> Self {
        Self::Database(err.to_string())
    }
}

impl From<anyhow::Error> for SearchError {
    fn from(err: anyhow::Error) -> Self {
        Self::Database(err.to_string())
    }
}

/// Where the returned records came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultSource {
    Cache,
    Live,
    /// Sample data shown because the court site blocked the request.
    Fallback,
}

impl ResultSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Live => "live",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub cases: Vec<CaseRecord>,
    pub source: ResultSource,
    pub message: Option<String>,
    /// Result rows that could not be parsed.
    pub skipped: usize,
}

impl SearchResponse {
    #[must_use]
    pub const fn new(cases: Vec<CaseRecord>, source: ResultSource) -> Self {
        Self {
            cases,
            source,
            message: None,
            skipped: 0,
        }
    }

    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct CaseDetail {
    pub case: CaseRecord,
    pub updates: Vec<CaseUpdate>,
}

#[async_trait::async_trait]
pub trait CaseSearchService: Send + Sync {
    /// Looks up a single case by number.
    ///
    /// Stored records are served unless `refresh` is set. A blocked or failed
    /// refresh falls back to the stored record when one exists.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Validation`] before any network call for malformed input.
    /// Returns [`SearchError::Blocked`] when blocked and no fallback applies.
    /// Returns [`SearchError::Unreachable`] when retries are exhausted.
    async fn search_by_case_number(
        &self,
        raw: &str,
        refresh: bool,
        requester: &Requester,
    ) -> Result<SearchResponse, SearchError>;

    /// Finds cases where either party contains `raw`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Same as [`CaseSearchService::search_by_case_number`].
    async fn search_by_party_name(
        &self,
        raw: &str,
        refresh: bool,
        requester: &Requester,
    ) -> Result<SearchResponse, SearchError>;

    /// Stored case and its change history. Accepts loose case-number formats.
    async fn get_case(&self, case_number: &str) -> Result<Option<CaseDetail>, SearchError>;

    async fn recent_cases(&self, limit: u64) -> Result<Vec<CaseRecord>, SearchError>;

    async fn statistics(&self) -> Result<SearchStatistics, SearchError>;
}
