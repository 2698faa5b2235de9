use std::collections::HashMap;
use std::sync::LazyLock;

use crate::record::Field;

/// What a raw column header stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Header {
    /// Names exactly one canonical field.
    Field(Field),
    /// Combined "date & time" column; the cell carries both parts.
    DateTime { date: Field, time: Field },
    /// One fragment of a field split over several columns ("Auction" + "Vendor").
    Part(Field),
    Unknown,
}

const SALE_DATETIME: Header = Header::DateTime {
    date: Field::SaleDate,
    time: Field::SaleTime,
};
const CONTINUED_DATETIME: Header = Header::DateTime {
    date: Field::ContinuedDate,
    time: Field::ContinuedTime,
};

/// Synonym sets, keyed by the normalized spelling (see [`normalize_header`]).
const SYNONYMS: &[(Header, &[&str])] = &[
    (
        Header::Field(Field::SaleDate),
        &["sale date", "date of sale", "sale dt", "auction date", "date"],
    ),
    (
        Header::Field(Field::SaleTime),
        &["sale time", "time of sale", "auction time", "time"],
    ),
    (
        Header::Field(Field::ContinuedDate),
        &[
            "continued date",
            "continued to",
            "continued to date",
            "continued sale date",
            "continued",
            "contd date",
            "contd to",
            "contd",
            "cont date",
            "postponed date",
            "postponed to",
        ],
    ),
    (
        Header::Field(Field::ContinuedTime),
        &[
            "continued time",
            "continued to time",
            "continued sale time",
            "contd time",
            "cont time",
            "postponed time",
        ],
    ),
    (
        SALE_DATETIME,
        &[
            "sale date time",
            "sale date and time",
            "date time of sale",
            "date and time of sale",
            "date time",
        ],
    ),
    (
        CONTINUED_DATETIME,
        &[
            "continued date time",
            "continued date and time",
            "continued to date time",
            "contd date time",
            "cont date time",
        ],
    ),
    (
        Header::Field(Field::CaseNumber),
        &["case", "case no", "case number", "case num", "case nbr", "cause no", "cause number"],
    ),
    (Header::Field(Field::County), &["county", "county name", "sale county"]),
    (
        Header::Field(Field::PropertyAddress),
        &["property address", "address", "property", "property location", "street address"],
    ),
    (
        Header::Field(Field::MsFile),
        &["ms file", "ms file no", "ms file number", "ms file num", "msfile", "file no", "file number"],
    ),
    (
        Header::Field(Field::Bid),
        &["bid", "bid amount", "bid amt", "amount", "opening bid", "opening bid amount", "credit bid"],
    ),
    (
        Header::Field(Field::AuctionVendor),
        &["auction vendor", "auction company", "auctioneer"],
    ),
    (Header::Part(Field::AuctionVendor), &["auction", "vendor"]),
];

static LOOKUP: LazyLock<HashMap<&'static str, Header>> = LazyLock::new(|| {
    SYNONYMS
        .iter()
        .flat_map(|(header, spellings)| spellings.iter().map(move |s| (*s, *header)))
        .collect()
});

/// Lowercase, drop apostrophes and periods, turn other punctuation into
/// spaces, collapse whitespace.
pub fn normalize_header(raw: &str) -> String {
    let mapped: String = raw
        .chars()
        .filter(|c| !matches!(*c, '\'' | '\u{2019}' | '.'))
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect::<String>()
        .to_lowercase();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn map_header(raw: &str) -> Header {
    LOOKUP
        .get(normalize_header(raw).as_str())
        .copied()
        .unwrap_or(Header::Unknown)
}
