//! `SeaORM` implementation of the `CaseSearchService` trait.

use crate::constants::limits;
use crate::db::Store;
use crate::models::{CaseRecord, Requester, SearchStatistics, SearchType};
use crate::parser::{normalize_case_number, validate_party_name};
use crate::scraper::{DelhiHighCourtScraper, SearchOutcome};
use crate::services::case_search_service::{
    CaseDetail, CaseSearchService, ResultSource, SearchError, SearchResponse,
};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

const NO_CASES_FOUND: &str = "No cases found";

pub struct SeaOrmCaseSearchService {
    store: Store,
    scraper: Arc<DelhiHighCourtScraper>,
}

impl SeaOrmCaseSearchService {
    #[must_use]
    pub const fn new(store: Store, scraper: Arc<DelhiHighCourtScraper>) -> Self {
        Self { store, scraper }
    }

    /// Persists scraped records. Failures are logged and the unsaved record is returned.
    async fn persist(&self, records: Vec<CaseRecord>) -> Vec<CaseRecord> {
        let mut stored = Vec::with_capacity(records.len());
        for record in records {
            match self.store.upsert_case(&record).await {
                Ok(saved) => stored.push(saved),
                Err(e) => {
                    warn!(case = %record.case_number, error = %e, "Failed to save scraped case");
                    stored.push(record);
                }
            }
        }
        stored
    }

    /// Records one search request. Failed searches are logged with no results.
    async fn log(
        &self,
        search_type: SearchType,
        raw: &str,
        result: &Result<SearchResponse, SearchError>,
        requester: &Requester,
    ) {
        let results_count = result.as_ref().map_or(0, |response| response.cases.len());
        if let Err(e) = self
            .store
            .log_search(search_type, raw.trim(), results_count, requester)
            .await
        {
            warn!(error = %e, "Failed to write search log");
        }
    }

    async fn cached_by_number(&self, case_number: &str) -> Result<Vec<CaseRecord>, SearchError> {
        Ok(self
            .store
            .get_case_by_number(case_number)
            .await?
            .into_iter()
            .collect())
    }

    /// Maps a scrape outcome onto a response, using `cached` when the site could not answer.
    async fn resolve(
        &self,
        outcome: SearchOutcome,
        cached: Vec<CaseRecord>,
    ) -> Result<SearchResponse, SearchError> {
        match outcome {
            SearchOutcome::Found { records, skipped } => {
                let mut cases = self.persist(records).await;
                cases.truncate(usize::try_from(limits::MAX_SEARCH_RESULTS).unwrap_or(usize::MAX));
                Ok(SearchResponse {
                    cases,
                    source: ResultSource::Live,
                    message: None,
                    skipped,
                })
            }
            SearchOutcome::Empty => {
                Ok(SearchResponse::new(Vec::new(), ResultSource::Live).with_message(NO_CASES_FOUND))
            }
            SearchOutcome::Blocked { reason, fallback } => {
                if !cached.is_empty() {
                    return Ok(SearchResponse::new(cached, ResultSource::Cache)
                        .with_message(format!("{reason}. Showing stored results")));
                }
                match fallback {
                    Some(sample) => Ok(SearchResponse::new(sample, ResultSource::Fallback)
                        .with_message(format!("{reason}. Showing sample data"))),
                    None => Err(SearchError::Blocked { reason }),
                }
            }
            SearchOutcome::NetworkError { attempts, message } => {
                if cached.is_empty() {
                    Err(SearchError::Unreachable { attempts, message })
                } else {
                    Ok(SearchResponse::new(cached, ResultSource::Cache)
                        .with_message("Court website unreachable. Showing stored results"))
                }
            }
        }
    }

    async fn lookup_case_number(
        &self,
        raw: &str,
        refresh: bool,
    ) -> Result<SearchResponse, SearchError> {
        let normalized = normalize_case_number(raw)?;
        let key = normalized.to_string();

        if !refresh && let Some(stored) = self.store.get_case_by_number(&key).await? {
            return Ok(SearchResponse::new(vec![stored], ResultSource::Cache));
        }

        info!(case = %key, refresh, "Looking up case on court website");
        let outcome = self.scraper.search_by_case_number(&normalized).await;
        let cached = if refresh && outcome_needs_cache(&outcome) {
            self.cached_by_number(&key).await?
        } else {
            Vec::new()
        };
        self.resolve(outcome, cached).await
    }

    async fn lookup_party(&self, raw: &str, refresh: bool) -> Result<SearchResponse, SearchError> {
        let name = validate_party_name(raw)?;

        if !refresh {
            let cached = self
                .store
                .search_cases_by_party(&name, limits::MAX_SEARCH_RESULTS)
                .await?;
            if !cached.is_empty() {
                return Ok(SearchResponse::new(cached, ResultSource::Cache));
            }
        }

        info!(party = %name, refresh, "Searching court website by party");
        let outcome = self.scraper.search_by_party_name(&name).await;
        let fallback = if refresh && outcome_needs_cache(&outcome) {
            self.store
                .search_cases_by_party(&name, limits::MAX_SEARCH_RESULTS)
                .await?
        } else {
            Vec::new()
        };
        self.resolve(outcome, fallback).await
    }
}

#[async_trait]
impl CaseSearchService for SeaOrmCaseSearchService {
    async fn search_by_case_number(
        &self,
        raw: &str,
        refresh: bool,
        requester: &Requester,
    ) -> Result<SearchResponse, SearchError> {
        let result = self.lookup_case_number(raw, refresh).await;
        self.log(SearchType::CaseNumber, raw, &result, requester)
            .await;
        result
    }

    async fn search_by_party_name(
        &self,
        raw: &str,
        refresh: bool,
        requester: &Requester,
    ) -> Result<SearchResponse, SearchError> {
        let result = self.lookup_party(raw, refresh).await;
        self.log(SearchType::PartyName, raw, &result, requester)
            .await;
        result
    }

    async fn get_case(&self, case_number: &str) -> Result<Option<CaseDetail>, SearchError> {
        let key = normalize_case_number(case_number)
            .map_or_else(|_| case_number.trim().to_uppercase(), |n| n.to_string());

        let case = match self.store.get_case_by_number(&key).await? {
            Some(case) => case,
            None => {
                let mut loose = self.store.search_cases_by_number(&key, 2).await?;
                if loose.len() != 1 {
                    return Ok(None);
                }
                loose.remove(0)
            }
        };
        let updates = self.store.case_updates(&case.id).await?;

        Ok(Some(CaseDetail { case, updates }))
    }

    async fn recent_cases(&self, limit: u64) -> Result<Vec<CaseRecord>, SearchError> {
        Ok(self.store.recent_cases(limit).await?)
    }

    async fn statistics(&self) -> Result<SearchStatistics, SearchError> {
        Ok(self.store.search_statistics().await?)
    }
}

const fn outcome_needs_cache(outcome: &SearchOutcome) -> bool {
    matches!(
        outcome,
        SearchOutcome::Blocked { .. } | SearchOutcome::NetworkError { .. }
    )
}
