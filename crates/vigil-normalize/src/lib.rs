//! Vigil Normalize
//!
//! Converts the typed tabular output of a quality query into a flat record.
//! The queries vigil runs produce exactly two rows: row 0 carries column-name
//! labels, row 1 the values as strings. Normalization coerces each value to
//! its declared column type and keys it by the row-0 label.
//!
//! The contract is deliberately forgiving: the output is always a mapping,
//! possibly empty. Malformed input is logged and degrades to an empty (or
//! partial) mapping instead of raising, which lets the workflow continue and
//! route to its failure branch naturally.

mod normalize;

pub use normalize::{NormalizeInput, NormalizedResults, convert, normalize};
