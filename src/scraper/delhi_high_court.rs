use rand::Rng;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};
use url::Url;

use super::block::{detect_block, find_captcha_marker};
use super::extract::{extract_records, form_count, page_title};
use super::fallback::mock_case_record;
use super::{
    CaseSource, ChallengeSolver, FetchError, FetchRequest, FetchResponse, HttpSource,
    SearchOutcome,
};
use crate::config::ScraperConfig;
use crate::models::sort_by_relevance;
use crate::parser::NormalizedCaseNumber;

#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub base_url: String,
    pub case_search_path: String,
    pub party_search_path: String,
    pub request_timeout: Duration,
    pub max_retries: u32,
    pub retry_backoff: Duration,
    pub use_mock_fallback: bool,
    /// Set when a CAPTCHA API key is configured.
    pub solver_enabled: bool,
}

impl ScraperSettings {
    #[must_use]
    pub fn from_config(config: &ScraperConfig) -> Self {
        Self {
            base_url: config.base_url.clone(),
            case_search_path: config.case_search_path.clone(),
            party_search_path: config.party_search_path.clone(),
            request_timeout: config.request_timeout(),
            max_retries: config.max_retries,
            retry_backoff: config.retry_backoff(),
            use_mock_fallback: config.use_mock_fallback,
            solver_enabled: config.captcha_api_key.is_some(),
        }
    }
}

impl Default for ScraperSettings {
    fn default() -> Self {
        Self::from_config(&ScraperConfig::default())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConnectionReport {
    pub url: String,
    pub reachable: bool,
    pub status: Option<u16>,
    pub has_captcha: bool,
    pub title: Option<String>,
    pub form_count: usize,
    pub elapsed_ms: u64,
    pub error: Option<String>,
}

/// Retries exhausted without a usable response.
struct RetriesExhausted {
    attempts: u32,
    last_error: FetchError,
}

pub struct DelhiHighCourtScraper {
    source: Arc<dyn CaseSource>,
    solver: Option<Arc<dyn ChallengeSolver>>,
    settings: ScraperSettings,
}

impl DelhiHighCourtScraper {
    #[must_use]
    pub fn new(source: Arc<dyn CaseSource>, settings: ScraperSettings) -> Self {
        Self {
            source,
            solver: None,
            settings,
        }
    }

    /// Builds a scraper talking to the live site over HTTP.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &ScraperConfig) -> anyhow::Result<Self> {
        let source = HttpSource::new(&config.user_agent, config.request_timeout())?;
        Ok(Self::new(
            Arc::new(source),
            ScraperSettings::from_config(config),
        ))
    }

    #[must_use]
    pub fn with_solver(mut self, solver: Arc<dyn ChallengeSolver>) -> Self {
        self.solver = Some(solver);
        self
    }

    #[must_use]
    pub const fn settings(&self) -> &ScraperSettings {
        &self.settings
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.settings.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    pub async fn search_by_case_number(&self, case: &NormalizedCaseNumber) -> SearchOutcome {
        let request = FetchRequest::post_form(
            self.endpoint(&self.settings.case_search_path),
            vec![
                ("case_type".to_string(), case.case_type.clone()),
                ("case_no".to_string(), case.serial_number.to_string()),
                ("year".to_string(), case.year.to_string()),
            ],
        );

        let outcome = match self.fetch_page(&request).await {
            Err(exhausted) => network_error(&exhausted),
            Ok(response) => {
                if let Some(reason) = detect_block(&request.url, &response) {
                    warn!(case = %case, reason = %reason, "Case lookup blocked");
                    let fallback = self
                        .settings
                        .use_mock_fallback
                        .then(|| vec![mock_case_record(case)]);
                    SearchOutcome::Blocked { reason, fallback }
                } else {
                    let (mut records, skipped) = extract_records(&response.body);
                    let target = case.to_string();
                    match records.iter().position(|r| r.case_number == target) {
                        Some(exact) => SearchOutcome::Found {
                            records: vec![records.swap_remove(exact)],
                            skipped,
                        },
                        None if records.is_empty() => SearchOutcome::Empty,
                        None => {
                            debug!(case = %case, "No exact match, using first result");
                            records.truncate(1);
                            SearchOutcome::Found { records, skipped }
                        }
                    }
                }
            }
        };

        record_outcome(&outcome);
        outcome
    }

    /// `query` must already be validated.
    pub async fn search_by_party_name(&self, query: &str) -> SearchOutcome {
        let folded = query.trim().to_lowercase();

        let mut url = match Url::parse(&self.endpoint(&self.settings.party_search_path)) {
            Ok(url) => url,
            Err(e) => {
                return SearchOutcome::NetworkError {
                    attempts: 0,
                    message: format!("Invalid party search URL: {e}"),
                };
            }
        };
        url.query_pairs_mut().append_pair("party_name", &folded);
        let request = FetchRequest::get(url.to_string());

        let outcome = match self.fetch_page(&request).await {
            Err(exhausted) => network_error(&exhausted),
            Ok(response) => {
                if let Some(reason) = detect_block(&request.url, &response) {
                    warn!(query = %folded, reason = %reason, "Party search blocked");
                    SearchOutcome::Blocked {
                        reason,
                        fallback: None,
                    }
                } else {
                    let (records, skipped) = extract_records(&response.body);
                    let mut matching: Vec<_> = records
                        .into_iter()
                        .filter(|r| r.involves_party(&folded))
                        .collect();

                    if matching.is_empty() {
                        SearchOutcome::Empty
                    } else {
                        sort_by_relevance(&mut matching);
                        SearchOutcome::Found {
                            records: matching,
                            skipped,
                        }
                    }
                }
            }
        };

        record_outcome(&outcome);
        outcome
    }

    /// Probes the base URL once and reports what came back.
    pub async fn test_connection(&self) -> ConnectionReport {
        let url = self.endpoint("/");
        let request = FetchRequest::get(url.clone());
        let start = Instant::now();

        let result = self.fetch_once(&request).await;
        let elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX);

        match result {
            Ok(response) => ConnectionReport {
                url,
                reachable: true,
                status: Some(response.status),
                has_captcha: find_captcha_marker(&response.body).is_some(),
                title: page_title(&response.body),
                form_count: form_count(&response.body),
                elapsed_ms,
                error: None,
            },
            Err(e) => ConnectionReport {
                url,
                reachable: false,
                status: None,
                has_captcha: false,
                title: None,
                form_count: 0,
                elapsed_ms,
                error: Some(e.to_string()),
            },
        }
    }

    async fn fetch_once(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        match tokio::time::timeout(self.settings.request_timeout, self.source.fetch(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout),
        }
    }

    /// Fetches with bounded retries, then hands CAPTCHA pages to the solver if one is enabled.
    async fn fetch_page(&self, request: &FetchRequest) -> Result<FetchResponse, RetriesExhausted> {
        let max_attempts = self.settings.max_retries.saturating_add(1);
        let mut delay = self.settings.retry_backoff;
        let mut attempt = 0;

        let response = loop {
            attempt += 1;
            let last = attempt >= max_attempts;

            match self.fetch_once(request).await {
                Ok(response) if is_retryable_status(response.status) && !last => {
                    warn!(
                        attempt,
                        status = response.status,
                        url = %request.url,
                        "Court site returned a transient status, retrying"
                    );
                }
                Ok(response) => break response,
                Err(e) if last => {
                    warn!(attempt, error = %e, url = %request.url, "Giving up on court site");
                    return Err(RetriesExhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                Err(e) => {
                    warn!(attempt, error = %e, url = %request.url, "Court site request failed, retrying");
                }
            }

            tokio::time::sleep(with_jitter(delay)).await;
            delay = delay.saturating_mul(2);
        };

        Ok(self.maybe_solve(response).await)
    }

    async fn maybe_solve(&self, response: FetchResponse) -> FetchResponse {
        if !self.settings.solver_enabled || find_captcha_marker(&response.body).is_none() {
            return response;
        }

        let Some(solver) = &self.solver else {
            return response;
        };

        info!("Challenge page detected, invoking solver");
        match solver.solve(self.source.as_ref(), &response).await {
            Some(solved) => solved,
            None => response,
        }
    }
}

const fn is_retryable_status(status: u16) -> bool {
    matches!(status, 408 | 429 | 500..=599)
}

fn with_jitter(delay: Duration) -> Duration {
    let max_jitter = u64::try_from(delay.as_millis() / 4).unwrap_or(0);
    if max_jitter == 0 {
        return delay;
    }
    delay + Duration::from_millis(rand::rng().random_range(0..=max_jitter))
}

fn network_error(exhausted: &RetriesExhausted) -> SearchOutcome {
    SearchOutcome::NetworkError {
        attempts: exhausted.attempts,
        message: exhausted.last_error.to_string(),
    }
}

fn record_outcome(outcome: &SearchOutcome) {
    metrics::counter!("scraper_requests_total", "outcome" => outcome.kind().as_str()).increment(1);
    debug!(outcome = outcome.kind().as_str(), records = outcome.record_count(), "Scrape finished");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_statuses() {
        assert!(is_retryable_status(503));
        assert!(is_retryable_status(429));
        assert!(!is_retryable_status(403));
        assert!(!is_retryable_status(200));
    }

    #[test]
    fn test_jitter_bounds() {
        let base = Duration::from_millis(400);
        for _ in 0..20 {
            let delay = with_jitter(base);
            assert!(delay >= base && delay <= base + Duration::from_millis(100));
        }
        assert_eq!(with_jitter(Duration::ZERO), Duration::ZERO);
    }

    #[test]
    fn test_settings_from_config() {
        let mut config = ScraperConfig::default();
        config.captcha_api_key = Some("key".to_string());
        let settings = ScraperSettings::from_config(&config);
        assert!(settings.solver_enabled);
        assert_eq!(settings.request_timeout, Duration::from_secs(30));
        assert_eq!(settings.max_retries, 2);
    }
}
