pub mod case_number;

pub use case_number::{
    NormalizedCaseNumber, ValidationError, current_year, normalize_case_number,
    normalize_case_number_at, suggest, validate_party_name,
};
