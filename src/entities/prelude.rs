pub use super::case_updates::Entity as CaseUpdates;
pub use super::court_cases::Entity as CourtCases;
pub use super::search_logs::Entity as SearchLogs;
