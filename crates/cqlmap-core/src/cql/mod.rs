//! CQL naming primitives.
//!
//! `CqlIdentifier` follows the store's identifier rules (case folding and
//! quoting); `ColumnName` is the query-facing reference that may be either a
//! case-preserving literal or an identifier.

mod column;
mod identifier;


pub use column::ColumnName;
pub use identifier::CqlIdentifier;
