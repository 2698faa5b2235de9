pub mod headers;
pub mod rows;
pub mod values;

pub use headers::{map_header, Header};
pub use rows::assemble;
pub use values::normalize;
