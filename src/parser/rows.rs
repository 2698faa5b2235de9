use crate::record::{CanonicalRecord, Field, RawRow};

use super::headers::{map_header, Header};
use super::values::normalize;

/// Turn one raw row into a record. Unknown headers are skipped; a field seen
/// twice keeps the later value. Split columns ("Auction" + "Vendor") only
/// fill a field no whole column supplied.
pub fn assemble(row: &RawRow) -> CanonicalRecord {
    let mut record = CanonicalRecord::default();
    let mut fragments = CanonicalRecord::default();

    for (header, value) in &row.cells {
        let value = value.as_deref();
        match map_header(header) {
            Header::Field(field) => record.set(field, normalize(field, value)),
            Header::DateTime { date, time } => {
                if let Some(d) = normalize(date, value) {
                    record.set(date, Some(d));
                }
                if let Some(t) = normalize(time, value) {
                    record.set(time, Some(t));
                }
            }
            Header::Part(field) => fragments.append(field, normalize(field, value)),
            Header::Unknown => {}
        }
    }

    for field in Field::ALL {
        if record.get(field).is_none() {
            if let Some(joined) = fragments.get(field) {
                record.set(field, Some(joined.to_string()));
            }
        }
    }
    record
}
