use super::ApiError;

const MAX_QUERY_LEN: usize = 200;

/// Drops control characters, trims and collapses whitespace. Quotes are kept.
pub fn sanitize_input(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| word.chars().filter(|c| !c.is_control()).collect::<String>())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn validate_limit(limit: u64) -> Result<u64, ApiError> {
    const MAX_LIMIT: u64 = 100;
    const MIN_LIMIT: u64 = 1;

    if !(MIN_LIMIT..=MAX_LIMIT).contains(&limit) {
        return Err(ApiError::validation(format!(
            "Invalid limit: {limit}. Limit must be between {MIN_LIMIT} and {MAX_LIMIT}"
        )));
    }
    Ok(limit)
}

pub fn validate_query_length(query: &str) -> Result<&str, ApiError> {
    if query.chars().count() > MAX_QUERY_LEN {
        return Err(ApiError::validation(format!(
            "Query must be {MAX_QUERY_LEN} characters or less"
        )));
    }
    Ok(query)
}
