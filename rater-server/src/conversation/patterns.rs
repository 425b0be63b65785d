//! Reply patterns accepted in each dialogue state.

use once_cell::sync::Lazy;
use rater_core::Rating;
use regex::Regex;

static EVALUATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bevaluate\b").expect("Valid pattern regex"));
static CANCEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bcancel\b").expect("Valid pattern regex"));
static YES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\byes\b").expect("Valid pattern regex"));
static NO: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bno\b").expect("Valid pattern regex"));
static SINGLE_DIGIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(\d)\s*$").expect("Valid pattern regex"));

pub fn is_evaluate(text: &str) -> bool {
    EVALUATE.is_match(text)
}

pub fn is_cancel(text: &str) -> bool {
    CANCEL.is_match(text)
}

pub fn is_yes(text: &str) -> bool {
    YES.is_match(text)
}

pub fn is_no(text: &str) -> bool {
    NO.is_match(text)
}

/// A lone digit on the 1–5 scale. `0` and `6`–`9` are not ratings.
pub fn parse_rating(text: &str) -> Option<Rating> {
    let digit = SINGLE_DIGIT.captures(text)?.get(1)?.as_str();
    digit.parse::<u8>().ok().and_then(Rating::new)
}
