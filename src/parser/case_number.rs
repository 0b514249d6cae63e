use chrono::Datelike;
use regex::{Captures, Regex};
use serde::Serialize;
use std::fmt;
use std::sync::OnceLock;

use crate::constants::{case_types, limits, years};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NormalizedCaseNumber {
    pub case_type: String,
    pub serial_number: u32,
    pub year: i32,
}

impl fmt::Display for NormalizedCaseNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}/{}", self.case_type, self.serial_number, self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid case number format. Use e.g. W.P.(C) 1234/2023 or LPA 123/2023")]
    UnrecognizedFormat,

    #[error("Invalid year {year}: must be between {first} and {current}")]
    InvalidYear { year: i32, first: i32, current: i32 },

    #[error("Party name must have at least {} characters and contain letters", limits::MIN_PARTY_NAME_LEN)]
    InvalidPartyName,

    #[error("Provide either a case number or a party name")]
    MissingQuery,
}

impl ValidationError {
    /// Stable machine-readable reason code.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::UnrecognizedFormat => "unrecognized_format",
            Self::InvalidYear { .. } => "invalid_year",
            Self::InvalidPartyName => "invalid_party_name",
            Self::MissingQuery => "missing_query",
        }
    }
}

#[must_use]
pub fn current_year() -> i32 {
    chrono::Local::now().year()
}

pub fn normalize_case_number(raw: &str) -> Result<NormalizedCaseNumber, ValidationError> {
    normalize_case_number_at(raw, current_year())
}

/// Normalizes against an explicit current year.
pub fn normalize_case_number_at(
    raw: &str,
    current_year: i32,
) -> Result<NormalizedCaseNumber, ValidationError> {
    let input = preprocess(raw);

    let parts = match_bracketed(&input)
        .or_else(|| match_slashed(&input))
        .or_else(|| match_dashed(&input))
        .ok_or(ValidationError::UnrecognizedFormat)?;

    let case_type = canonical_case_type(&parts.prefix_key())
        .ok_or(ValidationError::UnrecognizedFormat)?;

    let serial_number = parts
        .serial
        .parse::<u32>()
        .ok()
        .filter(|n| *n > 0)
        .ok_or(ValidationError::UnrecognizedFormat)?;

    let year = parts
        .year
        .parse::<i32>()
        .map_err(|_| ValidationError::UnrecognizedFormat)?;

    if !(years::FIRST_RECORD_YEAR..=current_year).contains(&year) {
        return Err(ValidationError::InvalidYear {
            year,
            first: years::FIRST_RECORD_YEAR,
            current: current_year,
        });
    }

    Ok(NormalizedCaseNumber {
        case_type: case_type.to_string(),
        serial_number,
        year,
    })
}

struct RawParts<'a> {
    head: &'a str,
    sub: Option<&'a str>,
    serial: &'a str,
    year: &'a str,
}

impl RawParts<'_> {
    fn prefix_key(&self) -> String {
        let mut key = compact(self.head);
        if let Some(sub) = self.sub {
            key.push('(');
            key.push_str(&compact(sub));
            key.push(')');
        }
        key
    }
}

fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

fn parts_from<'a>(caps: &Captures<'a>) -> Option<RawParts<'a>> {
    Some(RawParts {
        head: caps.name("head")?.as_str(),
        sub: caps.name("sub").map(|m| m.as_str()),
        serial: caps.name("num")?.as_str(),
        year: caps.name("year")?.as_str(),
    })
}

/// `W.P.(C) 1234/2023`, `CS(OS) 12-2020`, `W.P. (CRL) 7 OF 2021`
fn match_bracketed(input: &str) -> Option<RawParts<'_>> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^(?P<head>[A-Z][A-Z. ]*?) ?\((?P<sub>[A-Z. ]+)\) ?(?P<num>\d+) ?(?:/|-| OF ) ?(?P<year>\d{4})$",
    );
    parts_from(&re.captures(input)?)
}

/// `LPA 123/2023`, `CRL.A. 45 OF 2022`
fn match_slashed(input: &str) -> Option<RawParts<'_>> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^(?P<head>[A-Z][A-Z. ]*?) ?(?P<num>\d+) ?(?:/| OF ) ?(?P<year>\d{4})$",
    );
    parts_from(&re.captures(input)?)
}

/// `CRL.A. 45-2022`
fn match_dashed(input: &str) -> Option<RawParts<'_>> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = get_regex(
        &RE,
        r"^(?P<head>[A-Z][A-Z. ]*?) ?(?P<num>\d+) ?- ?(?P<year>\d{4})$",
    );
    parts_from(&re.captures(input)?)
}

fn preprocess(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

fn compact(text: &str) -> String {
    text.chars()
        .filter(|c| *c != '.' && !c.is_whitespace())
        .collect()
}

fn canonical_case_type(key: &str) -> Option<&'static str> {
    case_types::KNOWN
        .iter()
        .copied()
        .find(|known| compact(known) == key)
}

/// Trims and collapses a party name, rejecting ones too short or without letters.
pub fn validate_party_name(raw: &str) -> Result<String, ValidationError> {
    let name = raw.split_whitespace().collect::<Vec<_>>().join(" ");

    let significant = name.chars().filter(|c| !c.is_whitespace()).count();
    if significant < limits::MIN_PARTY_NAME_LEN || !name.chars().any(|c| c.is_ascii_alphabetic())
    {
        return Err(ValidationError::InvalidPartyName);
    }

    Ok(name)
}

/// Completions for a partially typed query: case types first, then recent years.
#[must_use]
pub fn suggest(query: &str, current_year: i32) -> Vec<String> {
    let query = query.trim();
    if query.chars().count() < 2 {
        return Vec::new();
    }

    let upper = query.to_uppercase();
    let compact_query = compact(&upper);

    let case_types = case_types::SUGGESTED
        .iter()
        .filter(|ct| ct.starts_with(&upper) || compact(ct).starts_with(&compact_query))
        .map(|ct| (*ct).to_string());

    let years = (current_year - 4..=current_year)
        .rev()
        .map(|y| y.to_string())
        .filter(|y| y.starts_with(query));

    case_types
        .chain(years)
        .take(limits::MAX_SUGGESTIONS)
        .collect()
}
