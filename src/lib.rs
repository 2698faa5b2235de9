pub mod error;
pub mod extract;
pub mod fetch;
pub mod parser;
pub mod pipeline;
pub mod record;

pub use error::{Error, Result};
pub use record::{CanonicalRecord, Field, RawRow};
