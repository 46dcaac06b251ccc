//! PDF Core - Low-level PDF generation
//!
//! This crate provides functionality for:
//! - Creating blank PDF documents with fixed page sizes
//! - Embedding TrueType fonts or using the built-in Helvetica pair
//! - Measuring and inserting text at specific coordinates
//! - Stroking rectangles
//! - Encoding and drawing Code128 barcodes
//!
//! All coordinates are in points with the origin at the top-left corner
//! of the page, y growing downward.
//!
//! # Example
//!
//! ```ignore
//! use pdf_core::{Align, FontData, FontFamily, PageSize, PdfDocument};
//!
//! let mut doc = PdfDocument::new(PageSize::A4)?;
//! doc.register_font_family("label", FontFamily::builtin_helvetica())?;
//! doc.set_font("label", 12.0)?;
//! doc.insert_text("Hello, World!", 1, 100.0, 100.0, Align::Left)?;
//! doc.save("output.pdf")?;
//! ```

mod barcode;
mod document;
mod font;
mod graphics;
mod text;

pub use barcode::{BarcodeSize, Code128, LinearBarcode, QUIET_ZONE_MODULES};
pub use document::{Color, PageSize, PdfDocument};
pub use font::{BuiltinFont, FontData, FontFamily, FontWeight};
pub use text::{generate_text_operators, TextRenderContext};

use thiserror::Error;

/// Errors that can occur during PDF operations
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("Failed to save PDF: {0}")]
    SaveError(String),

    #[error("Font not found: {0}")]
    FontNotFound(String),

    #[error("Font already exists: {0}")]
    FontAlreadyExists(String),

    #[error("Failed to parse font: {0}")]
    FontParseError(String),

    #[error("Invalid page number: {0} (document has {1} pages)")]
    InvalidPage(usize, usize),

    #[error("Barcode error: {0}")]
    Barcode(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Lopdf error: {0}")]
    LopdfError(#[from] lopdf::Error),
}

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Text alignment options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}
