pub mod cases;
pub mod search_logs;
