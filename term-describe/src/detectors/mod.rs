//! Structural detectors that look across a column's values for shape.
//!
//! - [`listlike`]: delimited lists packed into a string column
//! - [`keys`]: identifier columns and how often their values repeat
//! - [`temporal`]: date parsing, typed date ranges and year columns

pub mod keys;
pub mod listlike;
pub mod temporal;

pub use keys::{is_id_like_name, key_stats, select_candidates, KeyInput};
pub use listlike::DELIMITERS;
pub use temporal::{coverage, parse_date};
