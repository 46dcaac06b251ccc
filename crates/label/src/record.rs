//! Label records

use label_text::{
    safe_filename_component, sanitize_any, sanitize_numeric_keep_zeros,
    strip_leading_zeros_keep_zero, truncate_component, ColumnMap, Field,
};
use std::fmt;

/// Filename component limits, in characters
const COMPANY_MAX_LEN: usize = 40;
const ORDER_MAX_LEN: usize = 40;
const BATCH_MAX_LEN: usize = 20;

/// Barcode value `article|quantity|batch|carton`
///
/// The same string is encoded in the barcode and printed beneath it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BarcodePayload(String);

impl BarcodePayload {
    pub fn new(article: &str, quantity_digits: &str, batch: &str, carton_index: u32) -> Self {
        Self(format!("{article}|{quantity_digits}|{batch}|{carton_index}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BarcodePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Sanitized fields of one carton label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelRecord {
    /// Company shown in the header row
    pub company: String,
    /// Article number, trimmed only
    pub article: String,
    /// Quantity digits with leading zeros kept
    pub quantity: String,
    /// Order index; any text is allowed
    pub batch: String,
    /// Customer order number, may be empty
    pub order: String,
    /// 1-based carton number within the source row
    pub carton_index: u32,
}

impl LabelRecord {
    /// Build a record from a CSV data row
    ///
    /// Missing columns fall back to the field defaults; cells are sanitized
    /// but otherwise kept as written.
    pub fn from_row<S: AsRef<str>>(columns: &ColumnMap, row: &[S], carton_index: u32) -> Self {
        let text = |field: Field| sanitize_any(Some(columns.get(row, field)), field.default_value());

        Self {
            company: text(Field::Company),
            article: text(Field::Article),
            quantity: sanitize_numeric_keep_zeros(
                Some(columns.get(row, Field::Quantity)),
                Field::Quantity.default_value(),
            ),
            batch: text(Field::Batch),
            order: text(Field::Order),
            carton_index,
        }
    }

    /// Quantity as printed on the label, without leading zeros
    pub fn quantity_display(&self) -> String {
        strip_leading_zeros_keep_zero(&self.quantity)
    }

    /// Barcode value; keeps the quantity's leading zeros
    pub fn barcode_payload(&self) -> BarcodePayload {
        BarcodePayload::new(&self.article, &self.quantity, &self.batch, self.carton_index)
    }

    /// `"{company} - Order {order}, Batch {batch}, Box {carton}.pdf"`
    pub fn file_name(&self) -> String {
        let company = truncate_component(
            &safe_filename_component(Some(&self.company), "Company"),
            COMPANY_MAX_LEN,
        );
        let order = truncate_component(
            &safe_filename_component(Some(&self.order), "NoOrderNo"),
            ORDER_MAX_LEN,
        );
        let batch = truncate_component(
            &safe_filename_component(Some(&self.batch), "Batch"),
            BATCH_MAX_LEN,
        );

        format!(
            "{company} - Order {order}, Batch {batch}, Box {}.pdf",
            self.carton_index
        )
    }
}
