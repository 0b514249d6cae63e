use serde::{Deserialize, Serialize};

use crate::models::{CaseRecord, CaseUpdate, SearchStatistics};
use crate::services::{CaseDetail, ResultSource, SearchResponse};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Machine-readable error reason, e.g. `unrecognized_format`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> ApiResponse<T> {
    pub const fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            code: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
            code: None,
        }
    }

    #[must_use]
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct SearchRequest {
    #[serde(default)]
    pub case_number: Option<String>,
    #[serde(default)]
    pub party_name: Option<String>,
    /// Skip stored results and query the court site.
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Serialize, Clone)]
pub struct CaseDto {
    pub id: String,
    pub case_number: String,
    pub petitioner: String,
    pub respondent: String,
    pub filing_date: Option<String>,
    pub status: String,
    pub status_category: &'static str,
    pub court: String,
    pub case_type: String,
    pub judge: Option<String>,
    pub next_hearing: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CaseRecord> for CaseDto {
    fn from(record: CaseRecord) -> Self {
        Self {
            status_category: record.status.category(),
            status: record.status.to_string(),
            id: record.id,
            case_number: record.case_number,
            petitioner: record.petitioner,
            respondent: record.respondent,
            filing_date: record.filing_date.map(|d| d.format("%Y-%m-%d").to_string()),
            court: record.court,
            case_type: record.case_type,
            judge: record.judge,
            next_hearing: record.next_hearing.map(|d| d.format("%Y-%m-%d").to_string()),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SearchResultDto {
    pub count: usize,
    pub cases: Vec<CaseDto>,
    pub source: ResultSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub skipped: usize,
}

impl From<SearchResponse> for SearchResultDto {
    fn from(response: SearchResponse) -> Self {
        Self {
            count: response.cases.len(),
            cases: response.cases.into_iter().map(CaseDto::from).collect(),
            source: response.source,
            message: response.message,
            skipped: response.skipped,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CaseDetailDto {
    pub case: CaseDto,
    pub updates: Vec<CaseUpdate>,
}

impl From<CaseDetail> for CaseDetailDto {
    fn from(detail: CaseDetail) -> Self {
        Self {
            case: detail.case.into(),
            updates: detail.updates,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthDto {
    pub status: &'static str,
    pub database: &'static str,
    pub uptime_secs: u64,
    pub version: &'static str,
    pub timestamp: String,
}

pub type StatsDto = SearchStatistics;
