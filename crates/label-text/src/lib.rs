//! Label Text - string hygiene for carton label input
//!
//! This crate provides:
//! - Total sanitizers for raw CSV cells (digits, trimmed text, filename parts)
//! - Header matching that maps free-form CSV column names onto the label
//!   fields, tolerant of case and accents
//!
//! # Example
//!
//! ```ignore
//! use label_text::{ColumnMap, Field, sanitize_numeric_keep_zeros};
//!
//! let columns = ColumnMap::from_header(&["Firma", "Artikel-Nr", "Stückzahl"]);
//! let row = ["Acme", "SKU123", "045"];
//! let qty = sanitize_numeric_keep_zeros(Some(columns.get(&row, Field::Quantity)), "0");
//! assert_eq!(qty, "045");
//! ```

mod columns;
mod sanitize;

pub use columns::{normalize_for_match, ColumnMap, Field};
pub use sanitize::{
    safe_filename_component, sanitize_any, sanitize_numeric_keep_zeros,
    strip_leading_zeros_keep_zero, truncate_component,
};
