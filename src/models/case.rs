use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::constants::DEFAULT_COURT;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CaseRecord {
    pub id: String,
    pub case_number: String,
    pub petitioner: String,
    pub respondent: String,
    pub filing_date: Option<NaiveDate>,
    pub status: CaseStatus,
    #[serde(default = "default_court")]
    pub court: String,
    pub case_type: String,
    pub judge: Option<String>,
    pub next_hearing: Option<NaiveDate>,
    pub created_at: String,
    pub updated_at: String,
}

fn default_court() -> String {
    DEFAULT_COURT.to_string()
}

impl CaseRecord {
    /// A fresh record with a new identifier and both timestamps set to now.
    #[must_use]
    pub fn new(
        case_number: impl Into<String>,
        petitioner: impl Into<String>,
        respondent: impl Into<String>,
        case_type: impl Into<String>,
    ) -> Self {
        let now = chrono::Utc::now().to_rfc3339();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            case_number: case_number.into(),
            petitioner: petitioner.into(),
            respondent: respondent.into(),
            filing_date: None,
            status: CaseStatus::Unknown,
            court: default_court(),
            case_type: case_type.into(),
            judge: None,
            next_hearing: None,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    /// This record with fields it lacks (`None` dates and judge, `Unknown`
    /// status) taken from `stored`.
    #[must_use]
    pub fn filled_from(&self, stored: &Self) -> Self {
        let mut merged = self.clone();
        merged.filing_date = self.filing_date.or(stored.filing_date);
        merged.next_hearing = self.next_hearing.or(stored.next_hearing);
        if merged.judge.is_none() {
            merged.judge.clone_from(&stored.judge);
        }
        if merged.status == CaseStatus::Unknown {
            merged.status = stored.status.clone();
        }
        merged
    }

    #[must_use]
    pub fn involves_party(&self, folded_query: &str) -> bool {
        self.petitioner.to_lowercase().contains(folded_query)
            || self.respondent.to_lowercase().contains(folded_query)
    }

    /// Field values as they are persisted, keyed by column name.
    ///
    /// Used to diff a stored record against a freshly scraped one.
    #[must_use]
    pub fn tracked_fields(&self) -> [(&'static str, Option<String>); 8] {
        [
            ("petitioner", Some(self.petitioner.clone())),
            ("respondent", Some(self.respondent.clone())),
            ("filing_date", self.filing_date.map(|d| d.to_string())),
            ("status", Some(self.status.to_string())),
            ("court", Some(self.court.clone())),
            ("case_type", Some(self.case_type.clone())),
            ("judge", self.judge.clone()),
            ("next_hearing", self.next_hearing.map(|d| d.to_string())),
        ]
    }
}

/// Newest filing first; undated records last; ties broken by case number.
pub fn sort_by_relevance(records: &mut [CaseRecord]) {
    records.sort_by(|a, b| {
        b.filing_date
            .cmp(&a.filing_date)
            .then_with(|| a.case_number.cmp(&b.case_number))
    });
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CaseStatus {
    Pending,
    Disposed,
    Dismissed,
    Closed,
    Active,
    Inactive,
    Withdrawn,
    Settled,
    #[default]
    Unknown,
    Other(String),
}

impl CaseStatus {
    const KEYWORDS: [(&'static str, CaseStatus); 8] = [
        ("pending", Self::Pending),
        ("disposed", Self::Disposed),
        ("dismissed", Self::Dismissed),
        ("closed", Self::Closed),
        ("inactive", Self::Inactive),
        ("active", Self::Active),
        ("withdrawn", Self::Withdrawn),
        ("settled", Self::Settled),
    ];

    /// Maps free-form status text from the court site onto a known status.
    #[must_use]
    pub fn from_raw(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("unknown") {
            return Self::Unknown;
        }

        let lower = trimmed.to_lowercase();
        for (keyword, status) in Self::KEYWORDS {
            if lower.contains(keyword) {
                return status;
            }
        }

        Self::Other(title_case(trimmed))
    }

    /// Coarse grouping used by the UI for colouring.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            Self::Pending | Self::Active => "pending",
            Self::Disposed | Self::Closed | Self::Settled => "disposed",
            Self::Dismissed | Self::Withdrawn => "dismissed",
            Self::Inactive | Self::Unknown => "unknown",
            Self::Other(text) => {
                let lower = text.to_lowercase();
                if lower.contains("ongoing") {
                    "pending"
                } else {
                    "unknown"
                }
            }
        }
    }
}

fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

impl fmt::Display for CaseStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "Pending",
            Self::Disposed => "Disposed",
            Self::Dismissed => "Dismissed",
            Self::Closed => "Closed",
            Self::Active => "Active",
            Self::Inactive => "Inactive",
            Self::Withdrawn => "Withdrawn",
            Self::Settled => "Settled",
            Self::Unknown => "Unknown",
            Self::Other(text) => text,
        };
        f.write_str(label)
    }
}

impl From<String> for CaseStatus {
    fn from(raw: String) -> Self {
        Self::from_raw(&raw)
    }
}

impl From<CaseStatus> for String {
    fn from(status: CaseStatus) -> Self {
        status.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_keywords() {
        assert_eq!(CaseStatus::from_raw("PENDING"), CaseStatus::Pending);
        assert_eq!(
            CaseStatus::from_raw("Disposed off on 12/03/2024"),
            CaseStatus::Disposed
        );
        assert_eq!(CaseStatus::from_raw("inactive"), CaseStatus::Inactive);
        assert_eq!(CaseStatus::from_raw(""), CaseStatus::Unknown);
        assert_eq!(
            CaseStatus::from_raw("reserved for JUDGMENT"),
            CaseStatus::Other("Reserved For Judgment".to_string())
        );
    }

    #[test]
    fn test_status_round_trips_through_display() {
        for status in [
            CaseStatus::Pending,
            CaseStatus::Settled,
            CaseStatus::Unknown,
            CaseStatus::Other("Reserved".to_string()),
        ] {
            assert_eq!(CaseStatus::from_raw(&status.to_string()), status);
        }
    }

    #[test]
    fn test_status_category() {
        assert_eq!(CaseStatus::Active.category(), "pending");
        assert_eq!(CaseStatus::Settled.category(), "disposed");
        assert_eq!(CaseStatus::Withdrawn.category(), "dismissed");
        assert_eq!(CaseStatus::Unknown.category(), "unknown");
    }

    #[test]
    fn test_sort_by_relevance() {
        let mut older = CaseRecord::new("LPA 2/2020", "A", "B", "LPA");
        older.filing_date = NaiveDate::from_ymd_opt(2020, 1, 1);
        let mut newer = CaseRecord::new("LPA 9/2023", "A", "B", "LPA");
        newer.filing_date = NaiveDate::from_ymd_opt(2023, 1, 1);
        let mut tie = CaseRecord::new("LPA 1/2023", "A", "B", "LPA");
        tie.filing_date = NaiveDate::from_ymd_opt(2023, 1, 1);
        let undated = CaseRecord::new("FAO 1/2024", "A", "B", "FAO");

        let mut records = vec![undated, older, newer, tie];
        sort_by_relevance(&mut records);

        let order: Vec<&str> = records.iter().map(|r| r.case_number.as_str()).collect();
        assert_eq!(
            order,
            vec!["LPA 1/2023", "LPA 9/2023", "LPA 2/2020", "FAO 1/2024"]
        );
    }

    #[test]
    fn test_filled_from_keeps_known_values() {
        let mut stored = CaseRecord::new("LPA 1/2023", "A", "B", "LPA");
        stored.judge = Some("Justice A".to_string());
        stored.status = CaseStatus::Pending;
        stored.filing_date = NaiveDate::from_ymd_opt(2023, 4, 15);

        let mut fresh = CaseRecord::new("LPA 1/2023", "A", "B", "LPA");
        fresh.next_hearing = NaiveDate::from_ymd_opt(2025, 1, 10);

        let merged = fresh.filled_from(&stored);
        assert_eq!(merged.judge.as_deref(), Some("Justice A"));
        assert_eq!(merged.status, CaseStatus::Pending);
        assert_eq!(merged.filing_date, stored.filing_date);
        assert_eq!(merged.next_hearing, fresh.next_hearing);
        assert_eq!(merged.id, fresh.id);
    }

    #[test]
    fn test_involves_party_is_case_insensitive() {
        let record = CaseRecord::new("LPA 1/2023", "John Doe", "Union of India", "LPA");
        assert!(record.involves_party("john"));
        assert!(record.involves_party("union"));
        assert!(!record.involves_party("smith"));
    }
}
