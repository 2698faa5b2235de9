use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;

use crate::record::Field;

static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").unwrap());
static NUMERIC_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[/-](\d{1,2})[/-](\d{4}|\d{2})\b").unwrap());
static MONTH_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})\b").unwrap()
});
static DAY_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)?\s+(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?,?\s+(\d{4})\b").unwrap()
});
static MERIDIEM_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?::(\d{2}))?\s*([ap])\.?\s*m\b").unwrap()
});
static CLOCK_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2}):(\d{2})\b").unwrap());
static AMOUNT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d*)(?:\.(\d*))?$").unwrap());

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Clean one cell for the field it belongs to. Never fails: anything that
/// does not parse comes back as `None`.
pub fn normalize(field: Field, raw: Option<&str>) -> Option<String> {
    let raw = raw?;
    match field {
        Field::SaleDate | Field::ContinuedDate => normalize_date(raw),
        Field::SaleTime | Field::ContinuedTime => normalize_time(raw),
        Field::Bid => normalize_amount(raw),
        Field::CaseNumber
        | Field::County
        | Field::PropertyAddress
        | Field::MsFile
        | Field::AuctionVendor => normalize_text(raw),
    }
}

/// Trim and collapse whitespace runs; empty becomes `None`.
pub fn normalize_text(raw: &str) -> Option<String> {
    let collapsed = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        None
    } else {
        Some(collapsed)
    }
}

/// Any recognizable date in `raw`, as `M/D/YYYY`.
pub fn normalize_date(raw: &str) -> Option<String> {
    let date = parse_date(raw)?;
    Some(date.format("%-m/%-d/%Y").to_string())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    if let Some(caps) = ISO_DATE_RE.captures(raw) {
        return ymd(&caps[1], &caps[2], &caps[3]);
    }
    if let Some(caps) = NUMERIC_DATE_RE.captures(raw) {
        let year = &caps[3];
        return if year.len() == 2 {
            let yy: i32 = year.parse().ok()?;
            let full = if yy < 70 { 2000 + yy } else { 1900 + yy };
            ymd(&full.to_string(), &caps[1], &caps[2])
        } else {
            ymd(year, &caps[1], &caps[2])
        };
    }
    if let Some(caps) = MONTH_FIRST_RE.captures(raw) {
        let month = month_number(&caps[1])?;
        return ymd(&caps[3], &month.to_string(), &caps[2]);
    }
    if let Some(caps) = DAY_FIRST_RE.captures(raw) {
        let month = month_number(&caps[2])?;
        return ymd(&caps[3], &month.to_string(), &caps[1]);
    }
    None
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTHS
        .iter()
        .position(|m| *m == lower)
        .map(|i| i as u32 + 1)
}

/// Any recognizable clock time in `raw`, as `H:MM AM/PM`.
pub fn normalize_time(raw: &str) -> Option<String> {
    let time = parse_time(raw)?;
    Some(time.format("%-I:%M %p").to_string())
}

fn parse_time(raw: &str) -> Option<NaiveTime> {
    if let Some(caps) = MERIDIEM_TIME_RE.captures(raw) {
        let hour: u32 = caps[1].parse().ok()?;
        let minute: u32 = caps.get(2).map_or(Some(0), |m| m.as_str().parse().ok())?;
        if !(1..=12).contains(&hour) {
            return None;
        }
        let pm = caps[3].eq_ignore_ascii_case("p");
        let hour24 = match (hour, pm) {
            (12, false) => 0,
            (12, true) => 12,
            (h, false) => h,
            (h, true) => h + 12,
        };
        return NaiveTime::from_hms_opt(hour24, minute, 0);
    }
    let caps = CLOCK_TIME_RE.captures(raw)?;
    NaiveTime::from_hms_opt(caps[1].parse().ok()?, caps[2].parse().ok()?, 0)
}

/// `$146,881.95` → `146881.95`; `1200` → `1200`; non-numeric → `None`.
pub fn normalize_amount(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '$' && *c != ',' && !c.is_whitespace())
        .collect();
    let caps = AMOUNT_RE.captures(&cleaned)?;
    let whole = caps.get(1).map_or("", |m| m.as_str());
    let Some(fraction) = caps.get(2).map(|m| m.as_str()) else {
        return (!whole.is_empty()).then(|| whole.to_string());
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    Some(two_places(whole, fraction))
}

/// `whole.fraction` rounded half up to two decimals, digit by digit.
fn two_places(whole: &str, fraction: &str) -> String {
    let whole = if whole.is_empty() { "0" } else { whole };
    let mut digits: Vec<u8> = whole
        .bytes()
        .chain(fraction.bytes().chain(std::iter::repeat(b'0')).take(2))
        .map(|b| b - b'0')
        .collect();

    if fraction.as_bytes().get(2).is_some_and(|d| *d >= b'5') {
        let mut i = digits.len();
        loop {
            if i == 0 {
                digits.insert(0, 1);
                break;
            }
            i -= 1;
            if digits[i] == 9 {
                digits[i] = 0;
            } else {
                digits[i] += 1;
                break;
            }
        }
    }

    let text: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
    let (int, cents) = text.split_at(text.len() - 2);
    format!("{}.{}", int, cents)
}
