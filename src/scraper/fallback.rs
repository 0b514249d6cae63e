use chrono::NaiveDate;

use crate::models::{CaseRecord, CaseStatus};
use crate::parser::NormalizedCaseNumber;

pub const MOCK_PETITIONER: &str = "Party A";
pub const MOCK_RESPONDENT: &str = "Party B";

/// Demonstration record served when the court site blocks a case-number lookup.
///
/// Deterministic for a given case number apart from `id` and timestamps.
#[must_use]
pub fn mock_case_record(case: &NormalizedCaseNumber) -> CaseRecord {
    let mut record = CaseRecord::new(
        case.to_string(),
        MOCK_PETITIONER,
        MOCK_RESPONDENT,
        case.case_type.clone(),
    );
    record.filing_date = NaiveDate::from_ymd_opt(case.year, 4, 15);
    record.status = CaseStatus::Pending;
    record
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_record_mirrors_query() {
        let case = NormalizedCaseNumber {
            case_type: "LPA".to_string(),
            serial_number: 123,
            year: 2023,
        };
        let record = mock_case_record(&case);
        assert_eq!(record.case_number, "LPA 123/2023");
        assert_eq!(record.case_type, "LPA");
        assert_eq!(record.petitioner, MOCK_PETITIONER);
        assert_eq!(record.filing_date, NaiveDate::from_ymd_opt(2023, 4, 15));
        assert_eq!(record.status, CaseStatus::Pending);

        let again = mock_case_record(&case);
        assert_eq!(again.case_number, record.case_number);
        assert_eq!(again.filing_date, record.filing_date);
    }
}
