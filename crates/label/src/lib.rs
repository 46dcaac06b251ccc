//! Label - carton label generation
//!
//! This crate provides:
//! - `LabelRecord`: one carton's sanitized fields, its barcode payload and
//!   output filename
//! - Shrink-to-fit text sizing and Code128 barcode fitting
//! - `LabelRenderer`: the fixed seven-row A4 label layout
//! - `LabelBatch`: semicolon CSV input expanded into one record per carton
//!
//! # Example
//!
//! ```ignore
//! use label::{LabelBatch, LabelFonts, LabelRenderer, LayoutGeometry};
//!
//! let renderer = LabelRenderer::new(LayoutGeometry::a4(), LabelFonts::resolve("."));
//! let batch = LabelBatch::from_path("cartons.csv")?;
//! let summary = batch.run(|record| renderer.write_to(".", record).map(|_| ()))?;
//! println!("{} labels from {} rows", summary.labels, summary.rows);
//! ```

mod batch;
mod fit;
mod fonts;
mod geometry;
mod layout;
mod record;

pub use batch::{carton_total, BatchSummary, LabelBatch};
pub use fit::{fit_barcode, shrink_to_fit, BarcodeFit};
pub use fonts::{LabelFonts, FONT_DIR};
pub use geometry::{BarcodeGeometry, FontRange, Frame, LayoutGeometry, Row};
pub use layout::LabelRenderer;
pub use record::{BarcodePayload, LabelRecord};

use thiserror::Error;

/// Errors that can occur while generating labels
#[derive(Debug, Error)]
pub enum LabelError {
    #[error("PDF error: {0}")]
    PdfError(#[from] pdf_core::PdfError),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Font error: {0}")]
    FontError(String),
}

/// Result type for label operations
pub type Result<T> = std::result::Result<T, LabelError>;
