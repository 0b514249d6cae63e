use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use casefetch::api::{create_app_state_with_scraper, router};
use casefetch::config::Config;
use casefetch::db::Store;
use casefetch::models::SearchType;
use casefetch::scraper::{
    CaseSource, DelhiHighCourtScraper, FetchError, FetchRequest, FetchResponse, ScraperSettings,
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tower::ServiceExt;

const CAPTCHA_PAGE: &str =
    r#"<html><body><form><div class="g-recaptcha"></div></form></body></html>"#;

fn case_page(number: &str, petitioner: &str, respondent: &str, status: &str) -> String {
    format!(
        r#"<html><body><table>
        <tr class="case-row">
          <td class="case-number">{number}</td>
          <td class="petitioner">{petitioner}</td>
          <td class="respondent">{respondent}</td>
          <td class="filing-date">15/04/2023</td>
          <td class="status">{status}</td>
        </tr></table></body></html>"#
    )
}

/// Serves whatever page the test last set. `None` means the site hangs.
struct ScriptedSource {
    page: Mutex<Option<(u16, String)>>,
    calls: AtomicU32,
}

impl ScriptedSource {
    fn serving(body: &str) -> Arc<Self> {
        Arc::new(Self {
            page: Mutex::new(Some((200, body.to_string()))),
            calls: AtomicU32::new(0),
        })
    }

    fn hanging() -> Arc<Self> {
        Arc::new(Self {
            page: Mutex::new(None),
            calls: AtomicU32::new(0),
        })
    }

    fn set_page(&self, body: &str) {
        *self.page.lock().unwrap() = Some((200, body.to_string()));
    }

    fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CaseSource for ScriptedSource {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let page = self.page.lock().unwrap().clone();
        match page {
            Some((status, body)) => Ok(FetchResponse {
                status,
                final_url: request.url.clone(),
                body,
            }),
            None => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Err(FetchError::Timeout)
            }
        }
    }
}

struct TestApp {
    router: Router,
    store: Store,
    source: Arc<ScriptedSource>,
}

async fn spawn_app(source: Arc<ScriptedSource>) -> TestApp {
    let mut config = Config::default();
    config.general.database_path = "sqlite::memory:".to_string();

    let store = Store::new(&config.general.database_path)
        .await
        .expect("Failed to open store");

    let settings = ScraperSettings {
        base_url: "https://court.test".to_string(),
        request_timeout: Duration::from_millis(50),
        max_retries: 1,
        retry_backoff: Duration::from_millis(1),
        ..ScraperSettings::default()
    };
    let scraper = Arc::new(DelhiHighCourtScraper::new(source.clone(), settings));

    let state = create_app_state_with_scraper(config, store.clone(), scraper, None);
    TestApp {
        router: router(state),
        store,
        source,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(
        app,
        Request::builder().uri(uri).body(Body::empty()).unwrap(),
    )
    .await
}

async fn search(app: &Router, payload: Value) -> (StatusCode, Value) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri("/api/search")
            .header("Content-Type", "application/json")
            .header("X-Forwarded-For", "203.0.113.7, 10.0.0.1")
            .header("User-Agent", "api-test")
            .body(Body::from(payload.to_string()))
            .unwrap(),
    )
    .await
}

#[tokio::test]
async fn test_case_search_scrapes_then_serves_stored_record() {
    let app = spawn_app(ScriptedSource::serving(&case_page(
        "LPA 123/2023",
        "John Doe",
        "State",
        "Pending",
    )))
    .await;

    let (status, body) = search(&app.router, json!({ "case_number": " lpa  123 / 2023 " })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["source"], "live");
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["cases"][0]["case_number"], "LPA 123/2023");
    assert_eq!(body["data"]["cases"][0]["status_category"], "pending");
    assert_eq!(body["data"]["cases"][0]["filing_date"], "2023-04-15");

    let (status, body) = search(&app.router, json!({ "case_number": "LPA 123/2023" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source"], "cache");
    assert_eq!(app.source.calls(), 1);

    let logs = app.store.recent_searches(10).await.unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].ip_address.as_deref(), Some("203.0.113.7"));
    assert_eq!(logs[0].user_agent.as_deref(), Some("api-test"));
    assert_eq!(logs[0].results_count, 1);
}

#[tokio::test]
async fn test_invalid_case_number_is_rejected_before_network() {
    let app = spawn_app(ScriptedSource::serving(CAPTCHA_PAGE)).await;

    let (status, body) = search(&app.router, json!({ "case_number": "garbage text" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "unrecognized_format");

    let (status, body) = search(&app.router, json!({ "case_number": "LPA 123/1901" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_year");

    let (status, body) = search(&app.router, json!({ "party_name": " x " })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "invalid_party_name");

    let (status, body) = search(&app.router, json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "missing_query");

    assert_eq!(app.source.calls(), 0);
}

#[tokio::test]
async fn test_captcha_returns_sample_data_without_storing_it() {
    let app = spawn_app(ScriptedSource::serving(CAPTCHA_PAGE)).await;

    let (status, body) = search(&app.router, json!({ "case_number": "W.P.(C) 1234/2023" })).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source"], "fallback");
    assert_eq!(body["data"]["cases"][0]["case_number"], "W.P.(C) 1234/2023");
    assert_eq!(body["data"]["cases"][0]["petitioner"], "Party A");
    assert!(
        body["data"]["message"]
            .as_str()
            .unwrap()
            .contains("sample data")
    );

    let (status, _) = get(&app.router, "/api/case?number=W.P.(C)%201234%2F2023").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_blocked_party_search_is_service_unavailable() {
    let app = spawn_app(ScriptedSource::serving(CAPTCHA_PAGE)).await;

    let (status, body) = search(&app.router, json!({ "party_name": "john" })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "blocked");
    assert!(body["error"].as_str().unwrap().contains("CAPTCHA"));
}

#[tokio::test]
async fn test_unreachable_site_is_bad_gateway() {
    let app = spawn_app(ScriptedSource::hanging()).await;

    let (status, body) = search(&app.router, json!({ "case_number": "LPA 1/2023" })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["code"], "network_error");
    assert_eq!(app.source.calls(), 2);
}

#[tokio::test]
async fn test_failed_searches_are_logged() {
    let app = spawn_app(ScriptedSource::hanging()).await;

    let (status, _) = search(&app.router, json!({ "case_number": " LPA 1/2023 " })).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    app.source.set_page(CAPTCHA_PAGE);
    let (status, _) = search(&app.router, json!({ "party_name": "John   Smith" })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = search(&app.router, json!({ "case_number": "garbage text" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let logs = app.store.recent_searches(10).await.unwrap();
    assert_eq!(logs.len(), 3);
    assert!(logs.iter().all(|log| log.results_count == 0));

    let queries: Vec<(SearchType, &str)> = logs
        .iter()
        .map(|log| (log.search_type, log.search_query.as_str()))
        .collect();
    assert!(queries.contains(&(SearchType::CaseNumber, "LPA 1/2023")));
    assert!(queries.contains(&(SearchType::PartyName, "John Smith")));
    assert!(queries.contains(&(SearchType::CaseNumber, "garbage text")));
}

#[tokio::test]
async fn test_case_detail_accepts_partial_number() {
    let app = spawn_app(ScriptedSource::serving(&case_page(
        "LPA 77/2022",
        "Acme Ltd",
        "State",
        "Pending",
    )))
    .await;
    search(&app.router, json!({ "case_number": "LPA 77/2022" })).await;

    let (status, body) = get(&app.router, "/api/case?number=77%2F2022").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["case"]["case_number"], "LPA 77/2022");

    let (status, _) = get(&app.router, "/api/case?number=88%2F2022").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_refresh_falls_back_to_stored_record_when_blocked() {
    let app = spawn_app(ScriptedSource::serving(&case_page(
        "LPA 5/2022",
        "Acme Ltd",
        "State",
        "Pending",
    )))
    .await;

    let (status, _) = search(&app.router, json!({ "case_number": "LPA 5/2022" })).await;
    assert_eq!(status, StatusCode::OK);

    app.source.set_page(CAPTCHA_PAGE);
    let (status, body) = search(
        &app.router,
        json!({ "case_number": "LPA 5/2022", "refresh": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source"], "cache");
    assert_eq!(body["data"]["cases"][0]["petitioner"], "Acme Ltd");
    assert!(
        body["data"]["message"]
            .as_str()
            .unwrap()
            .contains("stored results")
    );
}

#[tokio::test]
async fn test_refresh_records_field_changes() {
    let app = spawn_app(ScriptedSource::serving(&case_page(
        "LPA 9/2023",
        "John Doe",
        "State",
        "Pending",
    )))
    .await;

    search(&app.router, json!({ "case_number": "LPA 9/2023" })).await;

    app.source
        .set_page(&case_page("LPA 9/2023", "John Doe", "State", "Disposed"));
    let (status, body) = search(
        &app.router,
        json!({ "case_number": "LPA 9/2023", "refresh": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source"], "live");
    assert_eq!(body["data"]["cases"][0]["status"], "Disposed");

    let (status, body) = get(&app.router, "/api/case?number=lpa%209%2F2023").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["case"]["status"], "Disposed");
    let updates = body["data"]["updates"].as_array().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0]["field_name"], "status");
    assert_eq!(updates[0]["old_value"], "Pending");
    assert_eq!(updates[0]["new_value"], "Disposed");

    let (_, stats) = get(&app.router, "/api/stats").await;
    assert_eq!(stats["data"]["total_cases"], 1);
}

#[tokio::test]
async fn test_party_search_ignores_case() {
    let page = format!(
        "{}{}",
        case_page("LPA 1/2020", "John Smith", "State", "Pending"),
        case_page("LPA 2/2021", "Union of India", "JOHN DOE", "Disposed"),
    );
    let app = spawn_app(ScriptedSource::serving(&page)).await;

    let (_, lower) = search(&app.router, json!({ "party_name": "john", "refresh": true })).await;
    let (_, upper) = search(&app.router, json!({ "party_name": "JOHN", "refresh": true })).await;

    assert_eq!(lower["data"]["count"], 2);
    let numbers = |body: &Value| -> Vec<String> {
        body["data"]["cases"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["case_number"].as_str().unwrap().to_string())
            .collect()
    };
    assert_eq!(numbers(&lower), numbers(&upper));

    let (_, stored) = search(&app.router, json!({ "party_name": "John" })).await;
    assert_eq!(stored["data"]["source"], "cache");
    assert_eq!(numbers(&stored), numbers(&lower));
    assert_eq!(app.source.calls(), 2);
}

#[tokio::test]
async fn test_party_name_with_apostrophe() {
    let app = spawn_app(ScriptedSource::serving(&case_page(
        "CS(OS) 14/2022",
        "O'Brien Ltd",
        "Union of India",
        "Pending",
    )))
    .await;

    let (status, body) = search(
        &app.router,
        json!({ "party_name": "O'Brien", "refresh": true }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["source"], "live");
    assert_eq!(body["data"]["count"], 1);
    assert_eq!(body["data"]["cases"][0]["petitioner"], "O'Brien Ltd");

    let (_, stored) = search(&app.router, json!({ "party_name": "o'brien" })).await;
    assert_eq!(stored["data"]["source"], "cache");
    assert_eq!(stored["data"]["count"], 1);
}

#[tokio::test]
async fn test_case_number_wins_when_both_fields_present() {
    let app = spawn_app(ScriptedSource::serving(&case_page(
        "FAO 3/2019",
        "A Kumar",
        "B Singh",
        "Pending",
    )))
    .await;

    let (status, body) = search(
        &app.router,
        json!({ "case_number": "FAO 3/2019", "party_name": "nobody" }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cases"][0]["case_number"], "FAO 3/2019");

    let stats = app.store.search_statistics().await.unwrap();
    assert_eq!(stats.case_number_searches, 1);
    assert_eq!(stats.party_name_searches, 0);
}

#[tokio::test]
async fn test_recent_cases_and_limits() {
    let app = spawn_app(ScriptedSource::serving(&case_page(
        "LPA 11/2023",
        "John Doe",
        "State",
        "Pending",
    )))
    .await;

    let (_, body) = get(&app.router, "/api/cases/recent").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    search(&app.router, json!({ "case_number": "LPA 11/2023" })).await;

    let (status, body) = get(&app.router, "/api/cases/recent?limit=5").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["case_number"], "LPA 11/2023");

    let (_, body) = get(&app.router, "/api/cases/recent?status=disposed").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);

    let (status, _) = get(&app.router, "/api/cases/recent?limit=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_suggestions() {
    let app = spawn_app(ScriptedSource::serving(CAPTCHA_PAGE)).await;

    let (status, body) = get(&app.router, "/api/suggest?q=W.P").await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert!(!items.is_empty());
    assert!(items.len() <= 5);
    assert!(items.iter().all(|i| i.as_str().unwrap().starts_with("W.P.")));

    let (_, body) = get(&app.router, "/api/suggest?q=W").await;
    assert_eq!(body["data"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_health_stats_and_scraper_check() {
    let app = spawn_app(ScriptedSource::serving(CAPTCHA_PAGE)).await;

    let (status, body) = get(&app.router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "healthy");
    assert_eq!(body["data"]["database"], "connected");

    let (status, body) = get(&app.router, "/api/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_searches"], 0);

    let (status, body) = get(&app.router, "/api/test-scraper").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["reachable"], true);
    assert_eq!(body["data"]["has_captcha"], true);
    assert_eq!(body["data"]["form_count"], 1);
}

#[tokio::test]
async fn test_ui_is_served_for_unknown_paths() {
    let app = spawn_app(ScriptedSource::serving(CAPTCHA_PAGE)).await;

    let response = app
        .router
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));
    assert_eq!(response.headers()["x-frame-options"], "DENY");

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/some/client/route")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
