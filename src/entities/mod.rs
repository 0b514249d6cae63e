pub mod prelude;

pub mod case_updates;
pub mod court_cases;
pub mod search_logs;
