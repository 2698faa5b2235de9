use serde::Serialize;

/// One of the ten fixed output keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    SaleDate,
    SaleTime,
    ContinuedDate,
    ContinuedTime,
    CaseNumber,
    County,
    PropertyAddress,
    MsFile,
    Bid,
    AuctionVendor,
}

impl Field {
    /// All fields in output order.
    pub const ALL: [Field; 10] = [
        Field::SaleDate,
        Field::SaleTime,
        Field::ContinuedDate,
        Field::ContinuedTime,
        Field::CaseNumber,
        Field::County,
        Field::PropertyAddress,
        Field::MsFile,
        Field::Bid,
        Field::AuctionVendor,
    ];

    /// Output key, as serialized.
    #[cfg(test)]
    pub fn name(self) -> &'static str {
        match self {
            Field::SaleDate => "sale_date",
            Field::SaleTime => "sale_time",
            Field::ContinuedDate => "continued_date",
            Field::ContinuedTime => "continued_time",
            Field::CaseNumber => "case_number",
            Field::County => "county",
            Field::PropertyAddress => "property_address",
            Field::MsFile => "ms_file",
            Field::Bid => "bid",
            Field::AuctionVendor => "auction_vendor",
        }
    }
}

/// One sale entry. Serializes with every key present, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalRecord {
    pub sale_date: Option<String>,
    pub sale_time: Option<String>,
    pub continued_date: Option<String>,
    pub continued_time: Option<String>,
    pub case_number: Option<String>,
    pub county: Option<String>,
    pub property_address: Option<String>,
    pub ms_file: Option<String>,
    pub bid: Option<String>,
    pub auction_vendor: Option<String>,
}

impl CanonicalRecord {
    fn slot(&mut self, field: Field) -> &mut Option<String> {
        match field {
            Field::SaleDate => &mut self.sale_date,
            Field::SaleTime => &mut self.sale_time,
            Field::ContinuedDate => &mut self.continued_date,
            Field::ContinuedTime => &mut self.continued_time,
            Field::CaseNumber => &mut self.case_number,
            Field::County => &mut self.county,
            Field::PropertyAddress => &mut self.property_address,
            Field::MsFile => &mut self.ms_file,
            Field::Bid => &mut self.bid,
            Field::AuctionVendor => &mut self.auction_vendor,
        }
    }

    pub fn get(&self, field: Field) -> Option<&str> {
        let value = match field {
            Field::SaleDate => &self.sale_date,
            Field::SaleTime => &self.sale_time,
            Field::ContinuedDate => &self.continued_date,
            Field::ContinuedTime => &self.continued_time,
            Field::CaseNumber => &self.case_number,
            Field::County => &self.county,
            Field::PropertyAddress => &self.property_address,
            Field::MsFile => &self.ms_file,
            Field::Bid => &self.bid,
            Field::AuctionVendor => &self.auction_vendor,
        };
        value.as_deref()
    }

    /// Overwrite a field, null included.
    pub fn set(&mut self, field: Field, value: Option<String>) {
        *self.slot(field) = value;
    }

    /// Append a fragment to a field, space separated. Null fragments are ignored.
    pub fn append(&mut self, field: Field, fragment: Option<String>) {
        let Some(fragment) = fragment else { return };
        let slot = self.slot(field);
        *slot = match slot.take() {
            Some(existing) => Some(format!("{} {}", existing, fragment)),
            None => Some(fragment),
        };
    }

    pub fn is_empty(&self) -> bool {
        Field::ALL.iter().all(|f| self.get(*f).is_none())
    }
}

/// One extracted table row: `(header, cell)` pairs in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRow {
    pub cells: Vec<(String, Option<String>)>,
}

impl RawRow {
    pub fn push(&mut self, header: impl Into<String>, value: Option<String>) {
        self.cells.push((header.into(), value));
    }

    /// Build a row where every cell is present.
    #[cfg(test)]
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        RawRow {
            cells: pairs
                .into_iter()
                .map(|(h, v)| (h.to_string(), Some(v.to_string())))
                .collect(),
        }
    }
}
