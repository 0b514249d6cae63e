use chrono::{Datelike, NaiveDate};
use regex::Regex;
use std::sync::OnceLock;
use tracing::debug;

use crate::models::{CaseRecord, CaseStatus};
use crate::parser::normalize_case_number;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },
}

impl ParseError {
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::MissingField { .. } => "missing_field",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    CaseNumber,
    CaseType,
    Petitioner,
    Respondent,
    Parties,
    FilingDate,
    Status,
    Judge,
    NextHearing,
}

/// (field, CSS class tokens that carry it on the result page)
const FIELD_RULES: &[(Field, &[&str])] = &[
    (Field::CaseNumber, &["case-number", "case_no", "caseno"]),
    (Field::CaseType, &["case-type", "case_type"]),
    (Field::Petitioner, &["petitioner", "pet-name"]),
    (Field::Respondent, &["respondent", "res-name"]),
    (Field::Parties, &["parties", "party-name"]),
    (Field::FilingDate, &["filing-date", "filing_date", "date-of-filing"]),
    (Field::Status, &["status", "case-status"]),
    (Field::Judge, &["judge", "coram", "bench"]),
    (Field::NextHearing, &["next-hearing", "next-date", "listing-date"]),
];

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%Y/%m/%d",
    "%d/%m/%y",
    "%d-%m-%y",
    "%d %B %Y",
    "%B %d, %Y",
];

struct ExtractRegex {
    fields: Vec<(Field, Vec<Regex>)>,
    element_tag: Regex,
    row_start: Regex,
    tag: Regex,
    parties_split: Regex,
    title: Regex,
    form: Regex,
}

impl ExtractRegex {
    fn get() -> Option<&'static Self> {
        static INSTANCE: OnceLock<Option<ExtractRegex>> = OnceLock::new();
        INSTANCE
            .get_or_init(|| {
                let mut fields = Vec::with_capacity(FIELD_RULES.len());
                for (field, classes) in FIELD_RULES {
                    let mut regexes = Vec::with_capacity(classes.len());
                    for class in *classes {
                        regexes.push(Regex::new(&class_open_pattern(class)).ok()?);
                    }
                    fields.push((*field, regexes));
                }

                Some(Self {
                    fields,
                    element_tag: Regex::new(&format!(r"(?i)<(/?)({FIELD_ELEMENTS})\b[^>]*>"))
                        .ok()?,
                    row_start: Regex::new(&format!(
                        r#"(?is)<(?:tr|div|li)\b[^>]*\bclass\s*=\s*["']{}["'][^>]*>"#,
                        class_token("(?:case-row|case-result|result-row)")
                    ))
                    .ok()?,
                    tag: Regex::new(r"(?s)<[^>]*>").ok()?,
                    parties_split: Regex::new(r"(?i)\s+(?:vs\.?|v\.|versus)\s+").ok()?,
                    title: Regex::new(r"(?is)<title[^>]*>(.*?)</title\s*>").ok()?,
                    form: Regex::new(r"(?i)<form\b").ok()?,
                })
            })
            .as_ref()
    }

    fn rules_for(&self, field: Field) -> &[Regex] {
        self.fields
            .iter()
            .find(|(f, _)| *f == field)
            .map(|(_, regexes)| regexes.as_slice())
            .unwrap_or_default()
    }
}

/// Matches `name` as one whitespace-separated token of a class attribute.
fn class_token(name: &str) -> String {
    format!(r#"(?:[^"']*\s)?{name}(?:\s[^"']*)?"#)
}

/// Elements that carry a field value on the result page.
const FIELD_ELEMENTS: &str = "td|th|span|div|p|li|dd";

/// Opening tag of a field element with `class`; group 1 is the element name.
fn class_open_pattern(class: &str) -> String {
    format!(
        r#"(?is)<({FIELD_ELEMENTS})\b[^>]*\bclass\s*=\s*["']{}["'][^>]*>"#,
        class_token(&regex::escape(class))
    )
}

/// Body of the `name` element whose opening tag ends at `from`, up to its own
/// closing tag. Nested elements of the same name are balanced.
fn element_body<'a>(
    re: &ExtractRegex,
    fragment: &'a str,
    from: usize,
    name: &str,
) -> Option<&'a str> {
    let rest = fragment.get(from..)?;
    let mut depth = 0usize;
    for caps in re.element_tag.captures_iter(rest) {
        let (Some(tag), Some(slash), Some(whole)) = (caps.get(2), caps.get(1), caps.get(0)) else {
            continue;
        };
        if !tag.as_str().eq_ignore_ascii_case(name) {
            continue;
        }
        if slash.as_str().is_empty() {
            depth += 1;
        } else if depth == 0 {
            return rest.get(..whole.start());
        } else {
            depth -= 1;
        }
    }
    None
}

/// Strips tags, decodes entities and collapses whitespace.
#[must_use]
pub fn clean_text(fragment: &str) -> String {
    let stripped = match ExtractRegex::get() {
        Some(re) => re.tag.replace_all(fragment, " ").into_owned(),
        None => fragment.to_string(),
    };
    let decoded = html_escape::decode_html_entities(&stripped);
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Parses the date layouts seen on the court site. Unknown layouts yield `None`.
#[must_use]
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .find(|date| date.year() >= 1900)
}

fn field_text(re: &ExtractRegex, fragment: &str, field: Field) -> Option<String> {
    re.rules_for(field).iter().find_map(|rule| {
        let caps = rule.captures(fragment)?;
        let (open, name) = (caps.get(0)?, caps.get(1)?);
        element_body(re, fragment, open.end(), name.as_str())
            .map(clean_text)
            .filter(|text| !text.is_empty())
    })
}

fn split_parties(re: &ExtractRegex, parties: &str) -> Option<(String, String)> {
    let mut parts = re.parties_split.splitn(parties, 2);
    let petitioner = parts.next()?.trim();
    let respondent = parts.next()?.trim();
    if petitioner.is_empty() || respondent.is_empty() {
        return None;
    }
    Some((petitioner.to_string(), respondent.to_string()))
}

fn case_type_prefix(case_number: &str) -> String {
    case_number
        .split(|c: char| c.is_ascii_digit())
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// Extracts one case record from a result-row fragment.
pub fn extract_record(fragment: &str) -> Result<CaseRecord, ParseError> {
    let Some(re) = ExtractRegex::get() else {
        return Err(ParseError::MissingField {
            field: "case_number",
        });
    };

    let raw_number = field_text(re, fragment, Field::CaseNumber).ok_or(ParseError::MissingField {
        field: "case_number",
    })?;

    let (case_number, case_type) = match normalize_case_number(&raw_number) {
        Ok(normalized) => (normalized.to_string(), normalized.case_type),
        Err(_) => {
            let number = raw_number.to_uppercase();
            let case_type = field_text(re, fragment, Field::CaseType)
                .unwrap_or_else(|| case_type_prefix(&number));
            (number, case_type)
        }
    };

    let parties = field_text(re, fragment, Field::Parties).and_then(|p| split_parties(re, &p));

    let petitioner = field_text(re, fragment, Field::Petitioner)
        .or_else(|| parties.as_ref().map(|(p, _)| p.clone()))
        .ok_or(ParseError::MissingField {
            field: "petitioner",
        })?;

    let respondent = field_text(re, fragment, Field::Respondent)
        .or_else(|| parties.as_ref().map(|(_, r)| r.clone()))
        .ok_or(ParseError::MissingField {
            field: "respondent",
        })?;

    let mut record = CaseRecord::new(case_number, petitioner, respondent, case_type);
    record.filing_date = field_text(re, fragment, Field::FilingDate).and_then(|d| parse_date(&d));
    record.next_hearing =
        field_text(re, fragment, Field::NextHearing).and_then(|d| parse_date(&d));
    record.status = field_text(re, fragment, Field::Status)
        .map(|s| CaseStatus::from_raw(&s))
        .unwrap_or_default();
    record.judge = field_text(re, fragment, Field::Judge);

    Ok(record)
}

/// Splits a result page into rows and extracts each.
///
/// Returns the parsed records and how many rows were skipped.
#[must_use]
pub fn extract_records(page: &str) -> (Vec<CaseRecord>, usize) {
    let Some(re) = ExtractRegex::get() else {
        return (Vec::new(), 0);
    };

    let starts: Vec<usize> = re.row_start.find_iter(page).map(|m| m.start()).collect();

    let fragments: Vec<&str> = if starts.is_empty() {
        if field_text(re, page, Field::CaseNumber).is_some() {
            vec![page]
        } else {
            Vec::new()
        }
    } else {
        starts
            .iter()
            .enumerate()
            .map(|(i, start)| {
                let end = starts.get(i + 1).copied().unwrap_or(page.len());
                &page[*start..end]
            })
            .collect()
    };

    let mut records = Vec::with_capacity(fragments.len());
    let mut skipped = 0;

    for fragment in fragments {
        match extract_record(fragment) {
            Ok(record) => records.push(record),
            Err(e) => {
                debug!(reason = e.reason(), error = %e, "Skipping unparseable result row");
                skipped += 1;
            }
        }
    }

    (records, skipped)
}

/// Contents of the page `<title>`, cleaned.
#[must_use]
pub fn page_title(page: &str) -> Option<String> {
    let re = ExtractRegex::get()?;
    re.title
        .captures(page)
        .and_then(|c| c.get(1))
        .map(|m| clean_text(m.as_str()))
        .filter(|t| !t.is_empty())
}

#[must_use]
pub fn form_count(page: &str) -> usize {
    ExtractRegex::get().map_or(0, |re| re.form.find_iter(page).count())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ROW: &str = r#"
        <tr class="case-row">
          <td class="case-number">w.p.(c) 1234/2023</td>
          <td class="petitioner">John&nbsp;Doe &amp; Ors.</td>
          <td class="respondent"><span>Union   of India</span></td>
          <td class="filing-date">15/04/2023</td>
          <td class="case-status">PENDING</td>
          <td class="judge">Hon'ble Mr. Justice A</td>
          <td class="next-hearing">2025-09-01</td>
        </tr>"#;

    #[test]
    fn test_extract_full_row() {
        let record = extract_record(ROW).unwrap();
        assert_eq!(record.case_number, "W.P.(C) 1234/2023");
        assert_eq!(record.case_type, "W.P.(C)");
        assert_eq!(record.petitioner, "John Doe & Ors.");
        assert_eq!(record.respondent, "Union of India");
        assert_eq!(record.filing_date, NaiveDate::from_ymd_opt(2023, 4, 15));
        assert_eq!(record.next_hearing, NaiveDate::from_ymd_opt(2025, 9, 1));
        assert_eq!(record.status, CaseStatus::Pending);
        assert_eq!(record.judge.as_deref(), Some("Hon'ble Mr. Justice A"));
        assert_eq!(record.court, "Delhi High Court");
    }

    #[test]
    fn test_missing_petitioner() {
        let fragment = r#"<div class="case-number">LPA 12/2022</div>
            <div class="respondent">State</div>"#;
        let err = extract_record(fragment).unwrap_err();
        assert_eq!(
            err,
            ParseError::MissingField {
                field: "petitioner"
            }
        );
        assert_eq!(err.reason(), "missing_field");
    }

    #[test]
    fn test_missing_case_number() {
        let fragment = r#"<div class="petitioner">A</div><div class="respondent">B</div>"#;
        assert_eq!(
            extract_record(fragment),
            Err(ParseError::MissingField {
                field: "case_number"
            })
        );
    }

    #[test]
    fn test_optional_fields_default() {
        let fragment = r#"<span class="case-number">LPA 12/2022</span>
            <span class="petitioner">A</span><span class="respondent">B</span>
            <span class="filing-date">sometime</span>"#;
        let record = extract_record(fragment).unwrap();
        assert_eq!(record.filing_date, None);
        assert_eq!(record.next_hearing, None);
        assert_eq!(record.status, CaseStatus::Unknown);
        assert_eq!(record.judge, None);
    }

    #[test]
    fn test_parties_fallback() {
        let fragment = r#"<td class="case-number">FAO 9/2021</td>
            <td class="parties">Party A vs Party B</td>"#;
        let record = extract_record(fragment).unwrap();
        assert_eq!(record.petitioner, "Party A");
        assert_eq!(record.respondent, "Party B");

        let fragment = r#"<td class="case-number">FAO 9/2021</td>
            <td class="parties">Ram Kumar versus State of NCT</td>"#;
        let record = extract_record(fragment).unwrap();
        assert_eq!(record.respondent, "State of NCT");
    }

    #[test]
    fn test_nested_markup_in_field() {
        let fragment = r#"<td class="case-number"><b>LPA</b> 3/2021</td>
            <td class="petitioner"><span>John Doe</span> &amp; Ors.</td>
            <td class="respondent"><div>State</div> of NCT</td>
            <div class="judge"><div><span></span></div>Justice <div>B</div></div>"#;
        let record = extract_record(fragment).unwrap();
        assert_eq!(record.case_number, "LPA 3/2021");
        assert_eq!(record.petitioner, "John Doe & Ors.");
        assert_eq!(record.respondent, "State of NCT");
        assert_eq!(record.judge.as_deref(), Some("Justice B"));
    }

    #[test]
    fn test_empty_child_does_not_hide_field() {
        let fragment = r#"<td class="case-number">LPA 4/2021</td>
            <td class="petitioner"><span class="icon"></span>Ram Kumar</td>
            <td class="respondent">State</td>"#;
        let record = extract_record(fragment).unwrap();
        assert_eq!(record.petitioner, "Ram Kumar");
    }

    #[test]
    fn test_class_token_is_exact() {
        let fragment = r#"<td class="case-number">LPA 1/2020</td>
            <td class="petitioner">A</td><td class="respondent">B</td>
            <td class="status-icon">X</td>"#;
        let record = extract_record(fragment).unwrap();
        assert_eq!(record.status, CaseStatus::Unknown);
    }

    #[test]
    fn test_unnormalizable_number_is_kept() {
        let fragment = r#"<td class="case-number">ITA 77/2020</td>
            <td class="petitioner">A</td><td class="respondent">B</td>"#;
        let record = extract_record(fragment).unwrap();
        assert_eq!(record.case_number, "ITA 77/2020");
        assert_eq!(record.case_type, "ITA");
    }

    #[test]
    fn test_extract_records_counts_skipped() {
        let page = format!(
            r#"<table>{ROW}
            <tr class="case-row"><td class="case-number">LPA 5/2020</td></tr>
            <tr class="case-row odd"><td class="case-number">LPA 6/2020</td>
              <td class="parties">X v. Y</td></tr>
            </table>"#
        );
        let (records, skipped) = extract_records(&page);
        assert_eq!(records.len(), 2);
        assert_eq!(skipped, 1);
        assert_eq!(records[1].case_number, "LPA 6/2020");
    }

    #[test]
    fn test_extract_records_empty_page() {
        let (records, skipped) = extract_records("<p>No records found</p>");
        assert!(records.is_empty());
        assert_eq!(skipped, 0);
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2023, 4, 15);
        for text in [
            "2023-04-15",
            "15/04/2023",
            "15-04-2023",
            "2023/04/15",
            "15/04/23",
            "15-04-23",
            "15 April 2023",
            "April 15, 2023",
        ] {
            assert_eq!(parse_date(text), expected, "format: {text}");
        }
        assert_eq!(parse_date("N/A"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_page_metadata() {
        let page = "<html><head><title> Delhi &amp; Court </title></head>\
                    <body><form></form><FORM id=x></FORM></body></html>";
        assert_eq!(page_title(page).as_deref(), Some("Delhi & Court"));
        assert_eq!(form_count(page), 2);
    }
}
