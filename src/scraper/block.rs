use serde::Serialize;
use std::fmt;
use url::Url;

use super::FetchResponse;

/// Lower-cased body substrings that identify a challenge page.
/// The specific markers come first so the reported marker is the most precise one.
pub const CAPTCHA_MARKERS: &[&str] = &[
    "g-recaptcha",
    "h-captcha",
    "cf-challenge",
    "please verify you are a human",
    "are you a robot",
    "captcha",
];

/// Path fragments the court site redirects to when it refuses a request.
const BLOCK_PATHS: &[&str] = &["/captcha", "/blocked", "/access-denied", "/error"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockReason {
    Captcha { marker: String },
    HttpStatus { status: u16 },
    Redirect { location: String },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Captcha { .. } => {
                write!(f, "The court website requires CAPTCHA verification")
            }
            Self::HttpStatus { status } => {
                write!(f, "The court website responded with HTTP {status}")
            }
            Self::Redirect { location } => {
                write!(f, "The court website redirected the request to {location}")
            }
        }
    }
}

/// First CAPTCHA marker present in `body`, if any.
#[must_use]
pub fn find_captcha_marker(body: &str) -> Option<&'static str> {
    let lower = body.to_lowercase();
    CAPTCHA_MARKERS
        .iter()
        .copied()
        .find(|marker| lower.contains(marker))
}

/// Classifies a response as blocked. Runs before any field extraction.
#[must_use]
pub fn detect_block(requested_url: &str, response: &FetchResponse) -> Option<BlockReason> {
    if response.status != 200 {
        return Some(BlockReason::HttpStatus {
            status: response.status,
        });
    }

    if is_unexpected_redirect(requested_url, &response.final_url) {
        return Some(BlockReason::Redirect {
            location: response.final_url.clone(),
        });
    }

    find_captcha_marker(&response.body).map(|marker| BlockReason::Captcha {
        marker: marker.to_string(),
    })
}

fn is_unexpected_redirect(requested: &str, landed: &str) -> bool {
    if requested == landed {
        return false;
    }

    let (Ok(requested), Ok(landed)) = (Url::parse(requested), Url::parse(landed)) else {
        return false;
    };

    if requested.host_str() != landed.host_str() {
        return true;
    }

    let path = landed.path().to_lowercase();
    BLOCK_PATHS.iter().any(|fragment| path.contains(fragment))
}
