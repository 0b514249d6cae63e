pub mod case;
pub mod search;

pub use case::{CaseRecord, CaseStatus, sort_by_relevance};
pub use search::{CaseUpdate, Requester, SearchLogEntry, SearchStatistics, SearchType};
